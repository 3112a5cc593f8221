//! Decoding of the claim result event.
//!
//! The event payload is six big-endian 32-byte words. The first two are
//! bookkeeping; words 2..6 are the uncommon, rare, legendary and mythical
//! insight quantities granted by the claim.

use std::fmt;
use well3_types::tx::Word;
use well3_types::Receipt;

const WORD: usize = 32;
const RESULT_WORDS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardKind {
    Uncommon,
    Rare,
    Legendary,
    Mythical,
}

impl RewardKind {
    const ORDER: [RewardKind; 4] = [
        RewardKind::Uncommon,
        RewardKind::Rare,
        RewardKind::Legendary,
        RewardKind::Mythical,
    ];
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RewardKind::Uncommon => "Uncommon",
            RewardKind::Rare => "Rare",
            RewardKind::Legendary => "Legendary",
            RewardKind::Mythical => "Mythical",
        };
        f.write_str(name)
    }
}

/// Non-zero quantities received from one confirmed claim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardSummary {
    pub entries: Vec<(RewardKind, u128)>,
}

impl RewardSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, kind: RewardKind) -> u128 {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
            .sum()
    }
}

impl fmt::Display for RewardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (kind, amount)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{amount} {kind}")?;
        }
        Ok(())
    }
}

/// Collect rewards from every log in `receipt` whose first topic is `topic`.
///
/// Logs with other topics, no topics, or a payload shorter than six words
/// are ignored.
pub fn decode_rewards(receipt: &Receipt, topic: &Word) -> RewardSummary {
    let mut summary = RewardSummary::default();
    for log in &receipt.logs {
        if log.topics.first() != Some(topic) {
            continue;
        }
        let Some(values) = decode_payload(&log.data) else {
            continue;
        };
        summary.entries.extend(
            RewardKind::ORDER
                .iter()
                .zip(values)
                .filter(|(_, v)| *v != 0)
                .map(|(k, v)| (*k, v)),
        );
    }
    summary
}

fn decode_payload(data: &[u8]) -> Option<[u128; 4]> {
    if data.len() < RESULT_WORDS * WORD {
        return None;
    }
    let mut out = [0u128; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let start = (i + 2) * WORD;
        *slot = word_to_u128(&data[start..start + WORD]);
    }
    Some(out)
}

/// Big-endian word to `u128`, saturating when the high half is set.
fn word_to_u128(word: &[u8]) -> u128 {
    let (high, low) = word.split_at(WORD - 16);
    if high.iter().any(|b| *b != 0) {
        return u128::MAX;
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(low);
    u128::from_be_bytes(bytes)
}
