//! Wallet private keys.

use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::TypesError;

/// A 32-byte secp256k1 private key.
///
/// This type intentionally does not implement `Serialize` and its `Debug`
/// output is redacted. Key bytes are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex form (`0x` prefixed) for handing the key to a signing collaborator.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for PrivateKey {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let body = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = hex::decode(body).map_err(|_| TypesError::InvalidKey)?;
        let arr: Result<[u8; 32], _> = bytes.as_slice().try_into();
        bytes.zeroize();
        arr.map(Self).map_err(|_| TypesError::InvalidKey)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_prefix() {
        let hex = "11".repeat(32);
        let a: PrivateKey = hex.parse().unwrap();
        let b: PrivateKey = format!("0x{hex}").parse().unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.to_hex(), format!("0x{hex}"));
    }

    #[test]
    fn debug_is_redacted() {
        let key: PrivateKey = "22".repeat(32).parse().unwrap();
        assert!(!format!("{key:?}").contains("22"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!("abcd".parse::<PrivateKey>().unwrap_err(), TypesError::InvalidKey);
    }
}
