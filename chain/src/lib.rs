//! On-chain side of the runner.
//!
//! - [`insights`] builds the insights-contract calls from server-issued
//!   profile parameters and parses view results.
//! - [`lifecycle`] drives one claim transaction through
//!   build → simulate → sign → submit → confirm.
//! - [`reward`] decodes the result event of a confirmed claim.

pub mod config;
pub mod error;
pub mod insights;
pub mod lifecycle;
pub mod reward;

pub use config::TxConfig;
pub use error::TxError;
pub use insights::InsightClaim;
pub use lifecycle::{ClaimSource, TxLifecycle, TxOutcome, TxStage};
pub use reward::{decode_rewards, RewardKind, RewardSummary};
