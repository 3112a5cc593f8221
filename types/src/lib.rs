//! Fundamental types for the well3 quest runner.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, hashes, keys, persisted account state, the platform profile model,
//! quest descriptors and the transaction/receipt shapes exchanged with the chain.

pub mod account;
pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod profile;
pub mod task;
pub mod time;
pub mod tx;

pub use account::{AccountState, DailyInsight, DailyStatus, InsightCounts, NextBreathe};
pub use address::Address;
pub use error::TypesError;
pub use hash::TxHash;
pub use keys::PrivateKey;
pub use profile::{InviteCode, PendingVerify, Profile};
pub use task::{SpecialAction, TaskDescriptor};
pub use time::Timestamp;
pub use tx::{ContractCall, LogEntry, Receipt, SignedTx, UnsignedTx, Word};

/// Per-account outcome returned by a processing job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Whether an invite code from the shared pool was consumed.
    pub invite_used: bool,
}
