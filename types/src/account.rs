//! Persisted per-account state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, InviteCode, Timestamp};

/// Everything the runner remembers about one wallet between runs.
///
/// One record per address in the snapshot file. Profile-derived fields are
/// overwritten on every profile refresh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: Address,
    /// Proxy URL, optionally followed by `|<ip rotation link>`.
    #[serde(default)]
    pub proxy: String,
    #[serde(default)]
    pub social_token: String,
    /// Unused invite codes owned by this account.
    #[serde(default)]
    pub invite_codes: Vec<InviteCode>,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub level: u64,
    #[serde(default)]
    pub pending_quests: usize,
    #[serde(default)]
    pub next_breathe: NextBreathe,
    #[serde(default)]
    pub insights: InsightCounts,
    #[serde(default)]
    pub insights_to_open: u64,
    #[serde(default)]
    pub daily_insight: DailyInsight,
}

impl AccountState {
    pub fn new(
        address: Address,
        proxy: impl Into<String>,
        social_token: impl Into<String>,
    ) -> Self {
        Self {
            address,
            proxy: proxy.into(),
            social_token: social_token.into(),
            invite_codes: Vec::new(),
            exp: 0,
            level: 0,
            pending_quests: 0,
            next_breathe: NextBreathe::Unknown,
            insights: InsightCounts::default(),
            insights_to_open: 0,
            daily_insight: DailyInsight::default(),
        }
    }

    /// The proxy URL without any rotation link.
    pub fn proxy_url(&self) -> &str {
        self.proxy.split('|').next().unwrap_or_default()
    }

    /// IP rotation link for mobile proxies (`proxy|link`).
    pub fn proxy_rotation_link(&self) -> Option<&str> {
        self.proxy.split_once('|').map(|(_, link)| link).filter(|l| !l.is_empty())
    }

    /// Multi-line human summary for logs.
    pub fn stats(&self) -> AccountStats<'_> {
        AccountStats(self)
    }
}

/// Display adapter returned by [`AccountState::stats`].
pub struct AccountStats<'a>(&'a AccountState);

impl fmt::Display for AccountStats<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(f, "  Exp: {} | Level: {}", s.exp, s.level)?;
        writeln!(f, "  Pending quests: {}", s.pending_quests)?;
        writeln!(f, "  Next breathe: {}", s.next_breathe)?;
        writeln!(f, "  Daily insight: {}", s.daily_insight)?;
        writeln!(f, "  Insights to open: {}", s.insights_to_open)?;
        writeln!(f, "  Insights: {}", s.insights)?;
        write!(f, "  Invite codes: {}", s.invite_codes.len())
    }
}

/// State of the once-per-interval timed activity ("breathe session").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextBreathe {
    #[default]
    Unknown,
    NotStarted,
    Completed,
    /// Next session becomes available at this time.
    At(Timestamp),
}

impl fmt::Display for NextBreathe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextBreathe::Unknown => f.write_str("Unknown"),
            NextBreathe::NotStarted => f.write_str("Not started"),
            NextBreathe::Completed => f.write_str("Completed"),
            NextBreathe::At(ts) => write!(f, "available at {ts} UTC"),
        }
    }
}

/// Opened insight counts per rarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightCounts {
    pub uncommon: u64,
    pub rare: u64,
    pub legendary: u64,
    pub mythical: u64,
}

impl InsightCounts {
    pub fn total(&self) -> u64 {
        self.uncommon + self.rare + self.legendary + self.mythical
    }
}

impl fmt::Display for InsightCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uncommon, {} rare, {} legendary, {} mythical",
            self.uncommon, self.rare, self.legendary, self.mythical
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyStatus {
    #[default]
    Unknown,
    Available,
    Claimed,
}

/// Daily insight claim status; `is_super` marks the boosted variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyInsight {
    pub status: DailyStatus,
    #[serde(default)]
    pub is_super: bool,
}

impl DailyInsight {
    pub fn is_available(&self) -> bool {
        self.status == DailyStatus::Available
    }
}

impl fmt::Display for DailyInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_super {
            f.write_str("SUPER ")?;
        }
        match self.status {
            DailyStatus::Unknown => f.write_str("unknown"),
            DailyStatus::Available => f.write_str("available"),
            DailyStatus::Claimed => f.write_str("claimed"),
        }
    }
}
