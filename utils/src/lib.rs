//! Shared utilities for the well3 runner.

pub mod logging;
pub mod pacing;
pub mod retry;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use pacing::PauseRange;
pub use retry::{retry, Backoff, RetryPolicy, Retryable};
pub use time::{format_duration, secs_to_duration};
