//! Chain RPC and signing.

use std::future::Future;
use well3_types::{Address, ContractCall, PrivateKey, Receipt, SignedTx, TxHash, UnsignedTx};

use crate::ClientError;

pub trait ChainClient: Send + Sync {
    /// Current transaction count of `address` (the next nonce).
    fn get_nonce(&self, address: &Address)
        -> impl Future<Output = Result<u64, ClientError>> + Send;

    /// Dry-run `tx` and return the gas it would use.
    ///
    /// Reverts are reported as [`ClientError::Simulation`].
    fn estimate_gas(&self, tx: &UnsignedTx)
        -> impl Future<Output = Result<u64, ClientError>> + Send;

    fn sign(
        &self,
        tx: &UnsignedTx,
        key: &PrivateKey,
    ) -> impl Future<Output = Result<SignedTx, ClientError>> + Send;

    fn send_raw(&self, tx: &SignedTx) -> impl Future<Output = Result<TxHash, ClientError>> + Send;

    /// Receipt for `hash`, or `None` while the transaction is unmined.
    fn get_receipt(
        &self,
        hash: &TxHash,
    ) -> impl Future<Output = Result<Option<Receipt>, ClientError>> + Send;

    /// Read-only contract call.
    fn call_view(
        &self,
        contract: &Address,
        call: &ContractCall,
    ) -> impl Future<Output = Result<serde_json::Value, ClientError>> + Send;

    /// Personal-message signature (hex) over `message`.
    fn sign_message(
        &self,
        key: &PrivateKey,
        message: &str,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}
