//! Nullable chain: scripted simulation, receipts and view results.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use well3_clients::{ChainClient, ClientError};
use well3_types::{Address, ContractCall, PrivateKey, Receipt, SignedTx, TxHash, UnsignedTx};

/// Gas reported by a successful simulation.
pub const NULL_GAS: u64 = 21_000;

#[derive(Default)]
struct State {
    nonces: HashMap<Address, u64>,
    estimate_script: VecDeque<Result<u64, ClientError>>,
    send_script: VecDeque<Result<(), ClientError>>,
    receipt_script: VecDeque<Result<Option<Receipt>, ClientError>>,
    default_receipt: Option<Receipt>,
    views: HashMap<String, Value>,
    estimated: Vec<UnsignedTx>,
    sent: Vec<UnsignedTx>,
    receipt_queries: usize,
    view_calls: Vec<ContractCall>,
    signed_messages: Vec<String>,
}

/// A chain that never leaves memory.
///
/// Unscripted simulation succeeds, unscripted receipts are
/// [`default_receipt`](Self::set_default_receipt) (unmined unless set), and
/// every sent transaction bumps the sender's nonce.
#[derive(Clone, Default)]
pub struct NullChain {
    state: Arc<Mutex<State>>,
}

impl NullChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue the result of the next `estimate_gas` call.
    pub fn push_estimate(&self, result: Result<u64, ClientError>) {
        self.lock().estimate_script.push_back(result);
    }

    /// Queue the result of the next `send_raw` call.
    pub fn push_send(&self, result: Result<(), ClientError>) {
        self.lock().send_script.push_back(result);
    }

    /// Queue the result of the next `get_receipt` call.
    pub fn push_receipt(&self, result: Result<Option<Receipt>, ClientError>) {
        self.lock().receipt_script.push_back(result);
    }

    pub fn set_default_receipt(&self, receipt: Option<Receipt>) {
        self.lock().default_receipt = receipt;
    }

    /// Answer view calls to `method` with `value`.
    pub fn set_view(&self, method: &str, value: Value) {
        self.lock().views.insert(method.to_string(), value);
    }

    /// Transactions passed to `estimate_gas`, in order.
    pub fn estimated(&self) -> Vec<UnsignedTx> {
        self.lock().estimated.clone()
    }

    /// Transactions successfully broadcast, in order.
    pub fn sent(&self) -> Vec<UnsignedTx> {
        self.lock().sent.clone()
    }

    pub fn receipt_queries(&self) -> usize {
        self.lock().receipt_queries
    }

    pub fn view_calls(&self) -> Vec<ContractCall> {
        self.lock().view_calls.clone()
    }

    pub fn signed_messages(&self) -> Vec<String> {
        self.lock().signed_messages.clone()
    }
}

impl ChainClient for NullChain {
    async fn get_nonce(&self, address: &Address) -> Result<u64, ClientError> {
        Ok(self.lock().nonces.get(address).copied().unwrap_or(0))
    }

    async fn estimate_gas(&self, tx: &UnsignedTx) -> Result<u64, ClientError> {
        let mut state = self.lock();
        state.estimated.push(tx.clone());
        state.estimate_script.pop_front().unwrap_or(Ok(NULL_GAS))
    }

    async fn sign(&self, tx: &UnsignedTx, _key: &PrivateKey) -> Result<SignedTx, ClientError> {
        serde_json::to_vec(tx)
            .map(SignedTx)
            .map_err(|e| ClientError::Protocol(e.to_string()))
    }

    async fn send_raw(&self, tx: &SignedTx) -> Result<TxHash, ClientError> {
        let tx: UnsignedTx =
            serde_json::from_slice(&tx.0).map_err(|e| ClientError::Protocol(e.to_string()))?;
        let mut state = self.lock();
        if let Some(result) = state.send_script.pop_front() {
            result?;
        }
        *state.nonces.entry(tx.from.clone()).or_insert(0) += 1;
        state.sent.push(tx);
        let n = state.sent.len() as u8;
        Ok(TxHash::new([n; 32]))
    }

    async fn get_receipt(&self, _hash: &TxHash) -> Result<Option<Receipt>, ClientError> {
        let mut state = self.lock();
        state.receipt_queries += 1;
        match state.receipt_script.pop_front() {
            Some(result) => result,
            None => Ok(state.default_receipt.clone()),
        }
    }

    async fn call_view(
        &self,
        _contract: &Address,
        call: &ContractCall,
    ) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.view_calls.push(call.clone());
        state
            .views
            .get(&call.method)
            .cloned()
            .ok_or_else(|| ClientError::Rejected(format!("no view scripted for {}", call.method)))
    }

    async fn sign_message(&self, key: &PrivateKey, message: &str) -> Result<String, ClientError> {
        self.lock().signed_messages.push(message.to_string());
        Ok(format!("0x{}{:08x}", hex::encode(&key.as_bytes()[..4]), message.len()))
    }
}
