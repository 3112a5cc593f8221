//! The platform's view of one account, as returned by its profile endpoint.
//!
//! Only the fields the runner reads are modelled; everything else in the
//! response is ignored. Every section defaults so that partially populated
//! profiles (fresh registrations) still deserialize.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{Address, TaskDescriptor};

/// An opaque single-use invitation code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub referral_info: ReferralInfo,
    #[serde(default)]
    pub ygpz_questing: Questing,
    #[serde(default)]
    pub contract_info: ContractInfo,
    #[serde(default)]
    pub daily_bonus_info: DailyBonusInfo,
}

impl Profile {
    /// Referral codes that nobody has redeemed yet.
    pub fn unused_invite_codes(&self) -> Vec<InviteCode> {
        self.referral_info
            .my_referral_codes
            .iter()
            .filter(|rc| rc.used_at.is_none())
            .map(|rc| rc.code.clone())
            .collect()
    }

    /// Wallet currently linked to the account on-chain, if any.
    pub fn linked_address(&self) -> Option<&Address> {
        self.contract_info.linked_address.as_ref()
    }

    pub fn super_quest_eligible(&self) -> bool {
        self.daily_bonus_info.status.super_quest_eligible
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralInfo {
    #[serde(default)]
    pub my_referral_codes: Vec<ReferralCode>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub code: InviteCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questing {
    #[serde(default)]
    pub info: QuestInfo,
    #[serde(default)]
    pub pending_verify: PendingVerify,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestInfo {
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub rank: u64,
    #[serde(default)]
    pub daily_progress: BTreeMap<String, TaskDescriptor>,
    #[serde(default)]
    pub special_progress: BTreeMap<String, TaskDescriptor>,
}

/// Quests submitted for verification, keyed by quest id.
///
/// The platform has served this both as a list of ids and as an object keyed
/// by id; both shapes are accepted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PendingVerify {
    Ids(Vec<String>),
    Keyed(BTreeMap<String, serde_json::Value>),
}

impl Default for PendingVerify {
    fn default() -> Self {
        PendingVerify::Ids(Vec::new())
    }
}

impl PendingVerify {
    pub fn contains(&self, task_id: &str) -> bool {
        match self {
            PendingVerify::Ids(ids) => ids.iter().any(|id| id == task_id),
            PendingVerify::Keyed(map) => map.contains_key(task_id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PendingVerify::Ids(ids) => ids.len(),
            PendingVerify::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Server-issued claim parameters. Nonces and ranks are passed through to the
/// contract untouched, so they stay as raw JSON values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    #[serde(default)]
    pub linked_address: Option<Address>,
    #[serde(default)]
    pub daily_quest: Option<DailyQuest>,
    #[serde(default)]
    pub daily_quest_super: Option<SuperDailyQuest>,
    #[serde(default)]
    pub rankup_quest: Option<RankupQuest>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuest {
    pub nonce: serde_json::Value,
    pub signature: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperDailyQuest {
    pub nonces: Vec<serde_json::Value>,
    pub prob_set_number: serde_json::Value,
    pub signatures: Vec<String>,
    pub tags: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankupQuest {
    pub current_rank: serde_json::Value,
    pub signature: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBonusInfo {
    #[serde(default)]
    pub status: DailyBonusStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBonusStatus {
    #[serde(default)]
    pub super_quest_eligible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_codes_skip_redeemed_ones() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "referralInfo": { "myReferralCodes": [
                { "code": "AAA" },
                { "code": "BBB", "usedAt": 1700000000000i64 },
                { "code": "CCC" }
            ]}
        }))
        .unwrap();
        assert_eq!(
            profile.unused_invite_codes(),
            vec![InviteCode::new("AAA"), InviteCode::new("CCC")]
        );
    }

    #[test]
    fn pending_verify_accepts_both_shapes() {
        let list: PendingVerify = serde_json::from_value(serde_json::json!(["q1", "q2"])).unwrap();
        assert!(list.contains("q2"));
        assert_eq!(list.len(), 2);

        let keyed: PendingVerify =
            serde_json::from_value(serde_json::json!({ "q3": { "at": 1 } })).unwrap();
        assert!(keyed.contains("q3"));
        assert!(!keyed.contains("q1"));
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert!(profile.linked_address().is_none());
        assert!(!profile.super_quest_eligible());
        assert!(profile.ygpz_questing.pending_verify.is_empty());
    }
}
