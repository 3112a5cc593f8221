//! Insights contract calls.
//!
//! Claim parameters (nonces, ranks, signatures) are issued by the platform
//! and read from the account's current profile; they are forwarded to the
//! contract as-is.

use serde_json::{json, Value};
use well3_types::{Address, ContractCall, InsightCounts, Profile};

use crate::TxError;

/// Which insight claim to submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsightClaim {
    /// Regular daily insight.
    Daily,
    /// Daily insight for accounts eligible to the super bonus.
    SuperDaily,
    /// Open `amount` insights earned by ranking up.
    Rankup { amount: u64 },
}

impl InsightClaim {
    /// The daily claim kind matching the account's bonus status.
    pub fn daily_for(profile: &Profile) -> Self {
        if profile.super_quest_eligible() {
            InsightClaim::SuperDaily
        } else {
            InsightClaim::Daily
        }
    }

    /// Log label, e.g. `Claim SUPER daily insight`.
    pub fn action(&self) -> &'static str {
        match self {
            InsightClaim::Daily => "Claim daily insight",
            InsightClaim::SuperDaily => "Claim SUPER daily insight",
            InsightClaim::Rankup { .. } => "Claim rank insight",
        }
    }
}

/// Build the contract call for `claim` from the signatures in `profile`.
pub fn claim_call(profile: &Profile, claim: &InsightClaim) -> Result<ContractCall, TxError> {
    let info = &profile.contract_info;
    match claim {
        InsightClaim::Daily => {
            let quest = info
                .daily_quest
                .as_ref()
                .ok_or(TxError::MissingParams("dailyQuest"))?;
            Ok(ContractCall::new(
                "nonceQuest",
                vec![quest.nonce.clone(), json!(quest.signature)],
            ))
        }
        InsightClaim::SuperDaily => {
            let quest = info
                .daily_quest_super
                .as_ref()
                .ok_or(TxError::MissingParams("dailyQuestSuper"))?;
            Ok(ContractCall::new(
                "nonceQuests",
                vec![
                    json!(quest.nonces),
                    json!(quest.tags),
                    quest.prob_set_number.clone(),
                    json!(quest.signatures),
                ],
            ))
        }
        InsightClaim::Rankup { amount } => {
            let quest = info
                .rankup_quest
                .as_ref()
                .ok_or(TxError::MissingParams("rankupQuest"))?;
            Ok(ContractCall::new(
                "rankupQuestAmount",
                vec![quest.current_rank.clone(), json!(quest.signature), json!(amount)],
            ))
        }
    }
}

/// `nonceUsed(nonce)` for today's daily quest nonce.
pub fn nonce_used_call(profile: &Profile) -> Result<ContractCall, TxError> {
    let quest = profile
        .contract_info
        .daily_quest
        .as_ref()
        .ok_or(TxError::MissingParams("dailyQuest"))?;
    Ok(ContractCall::new("nonceUsed", vec![quest.nonce.clone()]))
}

/// `getQuests(rank, address)`: rank insights `address` can open.
pub fn get_quests_call(profile: &Profile, address: &Address) -> Result<ContractCall, TxError> {
    let quest = profile
        .contract_info
        .rankup_quest
        .as_ref()
        .ok_or(TxError::MissingParams("rankupQuest"))?;
    Ok(ContractCall::new(
        "getQuests",
        vec![quest.current_rank.clone(), json!(address.as_str())],
    ))
}

/// `questResults(address)`: opened insights per rarity.
pub fn quest_results_call(address: &Address) -> ContractCall {
    ContractCall::new("questResults", vec![json!(address.as_str())])
}

fn bad_view(method: &str, value: &Value) -> TxError {
    TxError::BadView {
        method: method.to_string(),
        value: value.to_string(),
    }
}

pub fn parse_bool(method: &str, value: &Value) -> Result<bool, TxError> {
    value.as_bool().ok_or_else(|| bad_view(method, value))
}

/// Unsigned integer result, as a JSON number or a decimal string.
pub fn parse_uint(method: &str, value: &Value) -> Result<u64, TxError> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| bad_view(method, value))
}

/// `questResults` tuple: at least four counts, uncommon first.
pub fn parse_results(value: &Value) -> Result<InsightCounts, TxError> {
    const METHOD: &str = "questResults";
    let items = value
        .as_array()
        .filter(|items| items.len() >= 4)
        .ok_or_else(|| bad_view(METHOD, value))?;
    Ok(InsightCounts {
        uncommon: parse_uint(METHOD, &items[0])?,
        rare: parse_uint(METHOD, &items[1])?,
        legendary: parse_uint(METHOD, &items[2])?,
        mythical: parse_uint(METHOD, &items[3])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        serde_json::from_value(json!({
            "contractInfo": {
                "dailyQuest": { "nonce": 42, "signature": "0xaa" },
                "dailyQuestSuper": {
                    "nonces": [1, 2],
                    "probSetNumber": 7,
                    "signatures": ["0x01", "0x02"],
                    "tags": ["a", "b"]
                },
                "rankupQuest": { "currentRank": 3, "signature": "0xbb" }
            },
            "dailyBonusInfo": { "status": { "superQuestEligible": true } }
        }))
        .unwrap()
    }

    #[test]
    fn builds_each_claim_kind() {
        let p = profile();
        let daily = claim_call(&p, &InsightClaim::Daily).unwrap();
        assert_eq!(daily.method, "nonceQuest");
        assert_eq!(daily.args, vec![json!(42), json!("0xaa")]);

        let sup = claim_call(&p, &InsightClaim::SuperDaily).unwrap();
        assert_eq!(sup.method, "nonceQuests");
        assert_eq!(
            sup.args,
            vec![json!([1, 2]), json!(["a", "b"]), json!(7), json!(["0x01", "0x02"])]
        );

        let rank = claim_call(&p, &InsightClaim::Rankup { amount: 5 }).unwrap();
        assert_eq!(rank.method, "rankupQuestAmount");
        assert_eq!(rank.args, vec![json!(3), json!("0xbb"), json!(5)]);

        assert_eq!(InsightClaim::daily_for(&p), InsightClaim::SuperDaily);
    }

    #[test]
    fn missing_params_are_reported() {
        let empty = Profile::default();
        assert!(matches!(
            claim_call(&empty, &InsightClaim::Daily),
            Err(TxError::MissingParams("dailyQuest"))
        ));
        assert!(nonce_used_call(&empty).is_err());
        assert_eq!(InsightClaim::daily_for(&empty), InsightClaim::Daily);
    }

    #[test]
    fn parses_view_results() {
        assert!(parse_bool("nonceUsed", &json!(true)).unwrap());
        assert!(parse_bool("nonceUsed", &json!(1)).is_err());
        assert_eq!(parse_uint("getQuests", &json!("12")).unwrap(), 12);
        assert_eq!(parse_uint("getQuests", &json!(4)).unwrap(), 4);
        assert!(parse_uint("getQuests", &json!(-1)).is_err());

        let counts = parse_results(&json!([5, "2", 1, 0])).unwrap();
        assert_eq!(counts.uncommon, 5);
        assert_eq!(counts.rare, 2);
        assert_eq!(counts.legendary, 1);
        assert_eq!(counts.mythical, 0);
        assert!(parse_results(&json!([1, 2])).is_err());
    }
}
