use std::time::Duration;

use well3_chain::{ClaimSource, TxConfig, TxError, TxLifecycle, TxOutcome};
use well3_clients::ClientError;
use well3_nullables::NullChain;
use well3_types::tx::Word;
use well3_types::{Address, ContractCall, LogEntry, PrivateKey, Receipt};
use well3_utils::RetryPolicy;

/// Claim source whose call arguments change on every signature refresh.
struct Source {
    sender: Address,
    key: Option<PrivateKey>,
    linked: Option<Address>,
    generation: u64,
    refreshes: usize,
}

impl Source {
    fn linked() -> Self {
        let sender = Address::parse(&format!("0x{}", "11".repeat(20))).unwrap();
        Self {
            linked: Some(sender.clone()),
            sender,
            key: Some(PrivateKey::new([7; 32])),
            generation: 0,
            refreshes: 0,
        }
    }
}

impl ClaimSource for Source {
    type Claim = &'static str;
    type Error = String;

    fn sender(&self) -> &Address {
        &self.sender
    }

    fn private_key(&self) -> Option<&PrivateKey> {
        self.key.as_ref()
    }

    fn linked_address(&self) -> Option<&Address> {
        self.linked.as_ref()
    }

    fn build_call(&self, claim: &&'static str) -> Result<ContractCall, TxError> {
        Ok(ContractCall::new(*claim, vec![self.generation.into()]))
    }

    async fn refresh_signatures(&mut self) -> Result<(), String> {
        self.refreshes += 1;
        self.generation += 1;
        Ok(())
    }
}

fn contract() -> Address {
    Address::parse(&format!("0x{}", "22".repeat(20))).unwrap()
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(40))
}

fn ok_receipt(logs: Vec<LogEntry>) -> Receipt {
    Receipt { status: true, logs }
}

#[tokio::test(start_paused = true)]
async fn confirmed_claim_decodes_rewards() {
    let chain = NullChain::new();
    let topic = Word([0x33; 32]);
    let mut data = vec![0u8; 6 * 32];
    data[3 * 32 - 1] = 2; // uncommon
    data[6 * 32 - 1] = 1; // mythical
    chain.set_default_receipt(Some(ok_receipt(vec![LogEntry {
        topics: vec![topic],
        data,
    }])));
    let config = TxConfig {
        reward_topic: Some(topic),
        ..TxConfig::default()
    };
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");
    let mut source = Source::linked();

    let outcome = lifecycle.execute(&mut source, &"nonceQuest", "Claim").await.unwrap();
    match outcome {
        TxOutcome::Confirmed { rewards, .. } => {
            assert_eq!(rewards.to_string(), "2 Uncommon, 1 Mythical");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].gas, Some(config.gas_limit));
    assert_eq!(sent[0].gas_price, config.gas_price);
    assert_eq!(sent[0].to, to);
    assert_eq!(sent[0].nonce, 0);
}

#[tokio::test(start_paused = true)]
async fn missing_key_is_not_retried() {
    let chain = NullChain::new();
    let config = TxConfig::default();
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");
    let mut source = Source::linked();
    source.key = None;

    let err = lifecycle.execute(&mut source, &"nonceQuest", "Claim").await.unwrap_err();
    assert!(matches!(err, TxError::MissingKey));
    assert!(chain.estimated().is_empty());
}

#[tokio::test(start_paused = true)]
async fn simulation_failure_refreshes_once_per_attempt_and_rebuilds() {
    let chain = NullChain::new();
    chain.push_estimate(Err(ClientError::Simulation("bad signature".into())));
    chain.set_default_receipt(Some(ok_receipt(vec![])));
    let config = TxConfig::default();
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");
    let mut source = Source::linked();

    let outcome = lifecycle.execute(&mut source, &"nonceQuest", "Claim").await.unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(source.refreshes, 1);

    let estimated = chain.estimated();
    assert_eq!(estimated.len(), 2);
    assert_eq!(estimated[0].call.args, vec![serde_json::json!(0)]);
    assert_eq!(estimated[1].call.args, vec![serde_json::json!(1)]);
}

#[tokio::test(start_paused = true)]
async fn simulation_failure_without_linked_wallet_skips_refresh() {
    let chain = NullChain::new();
    for _ in 0..3 {
        chain.push_estimate(Err(ClientError::Simulation("revert".into())));
    }
    let config = TxConfig::default();
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");
    let mut source = Source::linked();
    source.linked = None;

    let err = lifecycle.execute(&mut source, &"nonceQuest", "Claim").await.unwrap_err();
    assert!(matches!(err, TxError::Simulation(_)));
    assert_eq!(source.refreshes, 0);
    assert_eq!(chain.estimated().len(), 3);
    assert!(chain.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_receipt_is_terminal() {
    let chain = NullChain::new();
    chain.push_receipt(Ok(None));
    chain.push_receipt(Err(ClientError::Transport("reset".into())));
    chain.push_receipt(Ok(Some(Receipt {
        status: false,
        logs: vec![],
    })));
    let config = TxConfig::default();
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");

    let outcome = lifecycle
        .execute(&mut Source::linked(), &"nonceQuest", "Claim")
        .await
        .unwrap();
    assert!(matches!(outcome, TxOutcome::Failed { .. }));
    assert_eq!(chain.receipt_queries(), 3);
}

#[tokio::test(start_paused = true)]
async fn unmined_transaction_ends_pending_after_timeout() {
    let chain = NullChain::new();
    let config = TxConfig {
        poll_interval_secs: 1.0,
        confirm_timeout_secs: 5.0,
        ..TxConfig::default()
    };
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");

    let started = tokio::time::Instant::now();
    let outcome = lifecycle
        .execute(&mut Source::linked(), &"nonceQuest", "Claim")
        .await
        .unwrap();
    assert!(matches!(outcome, TxOutcome::Pending { .. }));
    assert_eq!(chain.receipt_queries(), 5);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn broadcast_failure_is_retried_with_the_same_nonce() {
    let chain = NullChain::new();
    chain.push_send(Err(ClientError::Transport("connection reset".into())));
    chain.set_default_receipt(Some(ok_receipt(vec![])));
    let config = TxConfig::default();
    let retry = fast_retry();
    let to = contract();
    let lifecycle = TxLifecycle::new(&chain, &config, &to, &retry, "1)");
    let mut source = Source::linked();

    let outcome = lifecycle.execute(&mut source, &"nonceQuest", "Claim").await.unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(source.refreshes, 0);
    assert_eq!(chain.estimated().len(), 2);
    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].nonce, 0);
}
