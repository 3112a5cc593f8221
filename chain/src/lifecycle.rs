//! One claim transaction, from call construction to receipt.
//!
//! ```text
//! Built -> Simulated -> Signed -> Submitted -> Confirmed | Failed | Pending
//! ```
//!
//! Build through submit is one attempt, repeated under the retry policy.
//! Confirmation is polled once per transaction and never retried: a
//! transaction that outlives the confirm budget is reported pending.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use well3_clients::ChainClient;
use well3_types::{Address, ContractCall, PrivateKey, TxHash, UnsignedTx};
use well3_utils::{Backoff, RetryPolicy};

use crate::reward::{decode_rewards, RewardSummary};
use crate::{TxConfig, TxError};

/// Supplies the signer and the current claim parameters of one account.
pub trait ClaimSource: Send {
    type Claim: Sync;
    type Error: fmt::Display + Send;

    fn sender(&self) -> &Address;

    /// Signing key, bound once the wallet is linked.
    fn private_key(&self) -> Option<&PrivateKey>;

    /// Wallet linked on the platform side, per the last profile fetch.
    fn linked_address(&self) -> Option<&Address>;

    /// Contract call for `claim`, built from the latest profile.
    fn build_call(&self, claim: &Self::Claim) -> Result<ContractCall, TxError>;

    /// Refetch the profile so that the next build sees fresh signatures.
    fn refresh_signatures(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStage {
    Built,
    Simulated,
    Signed,
    Submitted,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStage::Built => "built",
            TxStage::Simulated => "simulated",
            TxStage::Signed => "signed",
            TxStage::Submitted => "submitted",
        };
        f.write_str(s)
    }
}

/// Terminal state of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed { hash: TxHash, rewards: RewardSummary },
    /// Mined with a failure status.
    Failed { hash: TxHash },
    /// No receipt within the confirm timeout.
    Pending { hash: TxHash },
}

impl TxOutcome {
    pub fn hash(&self) -> &TxHash {
        match self {
            TxOutcome::Confirmed { hash, .. }
            | TxOutcome::Failed { hash }
            | TxOutcome::Pending { hash } => hash,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, TxOutcome::Confirmed { .. })
    }
}

/// Sends claim transactions to one contract for one account.
pub struct TxLifecycle<'a, C> {
    chain: &'a C,
    config: &'a TxConfig,
    contract: &'a Address,
    retry: &'a RetryPolicy,
    label: &'a str,
}

impl<'a, C: ChainClient> TxLifecycle<'a, C> {
    pub fn new(
        chain: &'a C,
        config: &'a TxConfig,
        contract: &'a Address,
        retry: &'a RetryPolicy,
        label: &'a str,
    ) -> Self {
        Self {
            chain,
            config,
            contract,
            retry,
            label,
        }
    }

    /// Submit `claim` and wait for its receipt.
    pub async fn execute<S: ClaimSource>(
        &self,
        source: &mut S,
        claim: &S::Claim,
        action: &str,
    ) -> Result<TxOutcome, TxError> {
        let hash = self.submit(source, claim, action).await?;
        Ok(self.confirm(hash, action).await)
    }

    /// Build, simulate, sign and send, retrying per the policy.
    pub async fn submit<S: ClaimSource>(
        &self,
        source: &mut S,
        claim: &S::Claim,
        action: &str,
    ) -> Result<TxHash, TxError> {
        let op = format!("{} {action}", self.label);
        let mut backoff = Backoff::new(self.retry, &op);
        loop {
            match self.attempt(source, claim).await {
                Ok(hash) => return Ok(hash),
                Err(e) => match backoff.on_failure(&e) {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => return Err(e),
                },
            }
        }
    }

    async fn attempt<S: ClaimSource>(
        &self,
        source: &mut S,
        claim: &S::Claim,
    ) -> Result<TxHash, TxError> {
        if source.private_key().is_none() {
            return Err(TxError::MissingKey);
        }
        let call = source.build_call(claim)?;
        let sender = source.sender().clone();
        let nonce = self.chain.get_nonce(&sender).await?;
        let mut tx = UnsignedTx {
            from: sender.clone(),
            to: self.contract.clone(),
            nonce,
            gas_price: self.config.gas_price,
            gas: None,
            call,
        };
        debug!(label = self.label, stage = %TxStage::Built, nonce, method = %tx.call.method);

        if let Err(e) = self.chain.estimate_gas(&tx).await {
            if source.linked_address() == Some(&sender) {
                info!("{} Tx simulation failed, refreshing signatures and retrying", self.label);
                if let Err(refresh) = source.refresh_signatures().await {
                    warn!("{} Signature refresh failed: {refresh}", self.label);
                }
            }
            return Err(TxError::Simulation(e.to_string()));
        }
        debug!(label = self.label, stage = %TxStage::Simulated);

        tx.gas = Some(self.config.gas_limit);
        let key = source.private_key().ok_or(TxError::MissingKey)?;
        let signed = self.chain.sign(&tx, key).await?;
        debug!(label = self.label, stage = %TxStage::Signed);

        let hash = self.chain.send_raw(&signed).await?;
        debug!(label = self.label, stage = %TxStage::Submitted, %hash);
        Ok(hash)
    }

    /// Poll for the receipt of `hash` until the confirm timeout.
    pub async fn confirm(&self, hash: TxHash, action: &str) -> TxOutcome {
        info!("{} {action} - Tx sent", self.label);
        let link = self.config.tx_link(&hash);
        let poll = self.config.poll_interval();
        let timeout = self.config.confirm_timeout();
        let mut waited = Duration::ZERO;

        while waited < timeout {
            match self.chain.get_receipt(&hash).await {
                Ok(Some(receipt)) if receipt.status => {
                    info!("{} {action} - Successful tx: {link}", self.label);
                    let rewards = match &self.config.reward_topic {
                        Some(topic) => decode_rewards(&receipt, topic),
                        None => RewardSummary::default(),
                    };
                    if !rewards.is_empty() {
                        info!("{} Received: {rewards}", self.label);
                    }
                    return TxOutcome::Confirmed { hash, rewards };
                }
                Ok(Some(_)) => {
                    error!("{} {action} - Failed tx: {link}", self.label);
                    return TxOutcome::Failed { hash };
                }
                Ok(None) => {}
                Err(e) => debug!("{} receipt query failed: {e}", self.label),
            }
            tokio::time::sleep(poll).await;
            waited += poll;
        }

        warn!("{} {action} - Pending tx: {link}", self.label);
        TxOutcome::Pending { hash }
    }
}
