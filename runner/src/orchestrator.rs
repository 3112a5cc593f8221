//! Batch orchestration.
//!
//! Accounts are dealt round-robin into `threads` batches. Each batch runs as
//! its own task and works through its accounts strictly in order; batches
//! start staggered and interleave freely. An account that fails or panics is
//! logged and skipped, never taking its batch or the run down with it.

use std::any::Any;
use std::error::Error as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::JoinSet;
use tracing::{error, warn, Instrument};
use well3_utils::PauseRange;

use crate::jobs::AccountJob;
use crate::tracing_spans::{account_span, batch_span};
use crate::{AccountEntry, ErrorLog, RunnerConfig, RunnerError};

/// Deal `items` round-robin into `n` batches (`n` is at least 1).
///
/// Item `i` lands in batch `i % n`; relative order is kept inside a batch.
pub fn partition<T>(items: impl IntoIterator<Item = T>, n: usize) -> Vec<Vec<T>> {
    let n = n.max(1);
    let mut batches: Vec<Vec<T>> = (0..n).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        batches[i % n].push(item);
    }
    batches
}

/// Delay between consecutive batch starts: `wait_min` spread over `threads`.
pub fn stagger(wait_min: Duration, threads: usize) -> Duration {
    wait_min / u32::try_from(threads.max(1)).unwrap_or(u32::MAX)
}

pub struct Orchestrator {
    threads: usize,
    wait: PauseRange,
    error_log: ErrorLog,
}

impl Orchestrator {
    pub fn new(threads: usize, wait: PauseRange, error_log: ErrorLog) -> Self {
        Self {
            threads: threads.max(1),
            wait,
            error_log,
        }
    }

    pub fn from_config(config: &RunnerConfig, error_log: ErrorLog) -> Self {
        Self::new(config.threads, config.wait_between_accounts, error_log)
    }

    /// Run `job` over `entries`; returns how many accounts consumed an invite.
    ///
    /// With `paced` unset accounts inside a batch follow each other without
    /// the random pause; batch starts are staggered either way.
    pub async fn run<J: AccountJob>(
        &self,
        job: Arc<J>,
        entries: Vec<AccountEntry>,
        paced: bool,
    ) -> usize {
        let stagger = stagger(self.wait.min(), self.threads);
        let mut set = JoinSet::new();
        for (bid, batch) in partition(entries, self.threads).into_iter().enumerate() {
            if batch.is_empty() {
                continue;
            }
            let worker = BatchWorker {
                job: job.clone(),
                start_delay: stagger.saturating_mul(u32::try_from(bid).unwrap_or(u32::MAX)),
                pacing: paced.then_some(self.wait),
                error_log: self.error_log.clone(),
            };
            let span = batch_span(bid, batch.len());
            set.spawn(worker.run(batch).instrument(span));
        }

        let mut used = 0;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(n) => used += n,
                Err(e) => error!("Batch worker failed: {e}"),
            }
        }
        used
    }
}

struct BatchWorker<J> {
    job: Arc<J>,
    start_delay: Duration,
    pacing: Option<PauseRange>,
    error_log: ErrorLog,
}

impl<J: AccountJob> BatchWorker<J> {
    async fn run(self, batch: Vec<AccountEntry>) -> usize {
        tokio::time::sleep(self.start_delay).await;
        let mut used = 0;
        for (i, entry) in batch.iter().enumerate() {
            if let Some(pacing) = self.pacing.filter(|_| i > 0) {
                pacing.pause().await;
            }
            let span = account_span(entry.index, &entry.address);
            let run = AssertUnwindSafe(self.job.run(entry).instrument(span));
            let outcome = match run.catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(RunnerError::Panicked(panic_message(payload))),
            };
            match outcome {
                Ok(result) if result.invite_used => used += 1,
                Ok(_) => {}
                Err(e) => self.report(entry.index, &e).await,
            }
        }
        used
    }

    /// First line to the console, the whole error to the error log when it
    /// spans several lines.
    async fn report(&self, index: usize, err: &RunnerError) {
        let message = describe(err);
        let first = message.lines().next().unwrap_or(" ");
        error!("{index}) Process account error: {first}");
        if message.lines().nth(1).is_some() {
            if let Err(e) = self.error_log.append(&index.to_string(), &message).await {
                warn!("Failed to write error log: {e}");
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}

/// Error message followed by its causes, one per line.
fn describe(err: &RunnerError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str("\nCaused by: ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    if message.is_empty() {
        message.push(' ');
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use well3_clients::ClientError;

    #[test]
    fn partition_is_round_robin() {
        let batches = partition(1..=7, 3);
        assert_eq!(batches, vec![vec![1, 4, 7], vec![2, 5], vec![3, 6]]);
        assert_eq!(partition(1..=2, 0), vec![vec![1, 2]]);
        assert_eq!(partition(1..=2, 4).iter().filter(|b| b.is_empty()).count(), 2);
    }

    #[test]
    fn stagger_does_not_truncate_thread_counts() {
        assert_eq!(stagger(Duration::from_secs(10), 0), Duration::from_secs(10));
        assert_eq!(stagger(Duration::from_secs(10), 4), Duration::from_millis(2500));
        #[cfg(target_pointer_width = "64")]
        assert!(stagger(Duration::from_secs(10), (1usize << 32) + 2) < Duration::from_millis(1));
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }

    #[test]
    fn describe_appends_causes() {
        let io = RunnerError::Io {
            path: "x.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(describe(&io), "x.json: disk full");

        let client = RunnerError::Client(ClientError::Transport("timeout\nretry later".into()));
        assert_eq!(describe(&client).lines().count(), 2);
    }
}
