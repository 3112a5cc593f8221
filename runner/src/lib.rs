//! Multi-account quest runner.
//!
//! The runner walks a list of wallet accounts through the platform:
//!
//! - [`accounts`] loads the account files
//! - [`invites`] keeps the shared invite code pool, refilled on demand
//! - [`session`] performs the per-account work against the collaborators
//! - [`jobs`] packages that work as full-processing and refresh jobs
//! - [`orchestrator`] runs a job over all accounts in concurrent batches
//! - [`pipeline`] chains the passes, saves and reports of one run
//!
//! Durable state lives in a single [`well3_store::AccountStore`] snapshot
//! that is saved only between passes.

pub mod accounts;
pub mod config;
pub mod context;
pub mod error;
pub mod error_log;
pub mod invites;
pub mod jobs;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod tracing_spans;

pub use accounts::{load_accounts, AccountEntry, AccountList};
pub use config::RunnerConfig;
pub use context::Context;
pub use error::RunnerError;
pub use error_log::ErrorLog;
pub use invites::{InvitePool, InviteRefill, InviteSource};
pub use jobs::{AccountJob, ProcessJob, RefreshJob, Refresher};
pub use orchestrator::{partition, Orchestrator};
pub use pipeline::{run, RunMode, RunSummary};
