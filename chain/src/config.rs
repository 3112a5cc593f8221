//! Transaction parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use well3_types::tx::Word;
use well3_utils::secs_to_duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxConfig {
    /// Fixed gas price (wei).
    pub gas_price: u64,
    /// Fixed gas limit attached after a successful simulation.
    pub gas_limit: u64,
    pub poll_interval_secs: f64,
    /// Receipt polling budget; past it the transaction is reported pending.
    pub confirm_timeout_secs: f64,
    /// Topic hash of the claim result event. Without it rewards are not decoded.
    pub reward_topic: Option<Word>,
    /// Block explorer base URL for transaction links.
    pub explorer_url: String,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            gas_price: 10_024,
            gas_limit: 300_000,
            poll_interval_secs: 1.0,
            confirm_timeout_secs: 150.0,
            reward_topic: None,
            explorer_url: "https://opbnbscan.com".to_string(),
        }
    }
}

impl TxConfig {
    pub fn poll_interval(&self) -> Duration {
        secs_to_duration(self.poll_interval_secs.max(0.01))
    }

    pub fn confirm_timeout(&self) -> Duration {
        secs_to_duration(self.confirm_timeout_secs)
    }

    pub fn tx_link(&self, hash: &well3_types::TxHash) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_topic_from_toml() {
        let topic = "ab".repeat(32);
        let cfg: TxConfig = toml::from_str(&format!("reward_topic = \"0x{topic}\"")).unwrap();
        assert_eq!(cfg.reward_topic, Some(Word([0xab; 32])));
        assert_eq!(cfg.gas_limit, 300_000);
    }

    #[test]
    fn bad_durations_saturate() {
        let cfg = TxConfig {
            poll_interval_secs: f64::NAN,
            confirm_timeout_secs: 1e300,
            ..TxConfig::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_millis(10));
        assert_eq!(cfg.confirm_timeout(), Duration::MAX);
    }

    #[test]
    fn tx_link_joins_cleanly() {
        let cfg = TxConfig {
            explorer_url: "https://scan.example/".into(),
            ..TxConfig::default()
        };
        let hash = well3_types::TxHash::new([1; 32]);
        assert_eq!(cfg.tx_link(&hash), format!("https://scan.example/tx/{hash}"));
    }
}
