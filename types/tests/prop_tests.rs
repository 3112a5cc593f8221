use proptest::prelude::*;

use well3_types::{Address, Timestamp, TxHash};

proptest! {
    /// Any 20 bytes render to an address that parses back regardless of case.
    #[test]
    fn address_parse_is_case_insensitive(bytes in prop::array::uniform20(0u8..)) {
        let lower = format!("0x{}", bytes.iter().map(|b| format!("{b:02x}")).collect::<String>());
        let upper = format!("0x{}", lower[2..].to_ascii_uppercase());
        let a = Address::parse(&lower).unwrap();
        let b = Address::parse(&upper).unwrap();
        prop_assert_eq!(a.as_str(), lower.as_str());
        prop_assert_eq!(a, b);
    }

    /// TxHash display output is accepted by from_hex.
    #[test]
    fn tx_hash_display_parses_back(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let parsed = TxHash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// secs_until never goes negative and rounds down to whole seconds.
    #[test]
    fn timestamp_secs_until(now in 0i64..1_000_000_000, offset in -1_000_000i64..1_000_000) {
        let target = Timestamp::from_millis(now + offset);
        let expected = if offset <= 0 { 0 } else { (offset / 1000) as u64 };
        prop_assert_eq!(target.secs_until(Timestamp::from_millis(now)), expected);
    }
}
