//! Shared pool of unused invite codes.
//!
//! Workers pop codes under contention. When the pool runs dry a worker asks
//! for a refill, which pulls the freshest unused codes from already registered
//! accounts. The emptiness check and the refill run inside one critical
//! section, so concurrent refill requests collapse into a single refill and
//! late callers only wait for it.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tracing::{info, warn};
use well3_types::{Address, InviteCode};
use well3_utils::PauseRange;

use crate::config::RunnerConfig;
use crate::RunnerError;

/// Where refills come from.
pub trait InviteSource: Send + Sync {
    /// Unused codes currently owned by `address`.
    ///
    /// `Ok(None)` means the account cannot be asked (never registered, or
    /// not yet saved) and is skipped.
    fn fetch_codes(
        &self,
        label: &str,
        address: &Address,
    ) -> impl Future<Output = Result<Option<Vec<InviteCode>>, RunnerError>> + Send;
}

/// How a refill walks the address list.
#[derive(Clone, Debug, PartialEq)]
pub struct InviteRefill {
    /// Only this many leading addresses are consulted.
    pub from_first: usize,
    /// Stop after this many addresses yielded at least one code. Addresses
    /// are then visited in random order and the collected codes shuffled.
    pub max_yielding: Option<usize>,
    /// Pause taken by callers that find the pool already refilled.
    pub throttle: Duration,
    /// Pause before every address after the first (mobile proxies).
    pub between_addresses: Option<PauseRange>,
}

impl InviteRefill {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            from_first: config.invites.from_first,
            max_yielding: config.invites.max_yielding,
            throttle: config.batch_stagger(),
            between_addresses: config.mobile_proxy.then_some(config.wait_between_accounts),
        }
    }
}

pub struct InvitePool<S> {
    codes: Mutex<VecDeque<InviteCode>>,
    addresses: Vec<Address>,
    source: S,
    refill: InviteRefill,
}

impl<S: InviteSource> InvitePool<S> {
    pub fn new(
        codes: impl IntoIterator<Item = InviteCode>,
        addresses: Vec<Address>,
        source: S,
        refill: InviteRefill,
    ) -> Self {
        Self {
            codes: Mutex::new(codes.into_iter().collect()),
            addresses,
            source,
            refill,
        }
    }

    /// Take the oldest code, if any. Never waits on I/O.
    pub async fn get_invite(&self) -> Option<InviteCode> {
        self.codes.lock().await.pop_front()
    }

    pub async fn add_invites(&self, codes: impl IntoIterator<Item = InviteCode>) {
        self.codes.lock().await.extend(codes);
    }

    pub async fn len(&self) -> usize {
        self.codes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Refill an empty pool. Returns the number of codes added.
    ///
    /// A pool that is already non-empty (typically refilled by another worker
    /// a moment ago) is left alone after the throttle pause.
    pub async fn update_invites(&self) -> usize {
        let mut codes = self.codes.lock().await;
        if !codes.is_empty() {
            tokio::time::sleep(self.refill.throttle).await;
            return 0;
        }

        let mut targets: Vec<(usize, &Address)> = self
            .addresses
            .iter()
            .take(self.refill.from_first)
            .enumerate()
            .map(|(i, a)| (i + 1, a))
            .collect();
        if self.refill.max_yielding.is_some() {
            targets.shuffle(&mut rand::thread_rng());
        }

        info!("Updating invites");
        let mut yielding_left = self.refill.max_yielding;
        let mut fresh = Vec::new();
        for (visited, (idx, address)) in targets.into_iter().enumerate() {
            if yielding_left == Some(0) {
                break;
            }
            match &self.refill.between_addresses {
                Some(pause) if visited > 0 => pause.pause().await,
                _ => {}
            }
            let label = format!("Updating invites {idx}");
            match self.source.fetch_codes(&label, address).await {
                Ok(Some(found)) => {
                    info!("{label}) Added new {}", found.len());
                    if !found.is_empty() {
                        if let Some(left) = yielding_left.as_mut() {
                            *left -= 1;
                        }
                    }
                    fresh.extend(found);
                }
                Ok(None) => {}
                Err(e) => warn!("{label}) Failed to fetch invite codes: {e}"),
            }
        }

        if self.refill.max_yielding.is_some() {
            fresh.shuffle(&mut rand::thread_rng());
        }
        let added = fresh.len();
        codes.extend(fresh);
        info!("Invites updated: {added} new");
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{}", hex_byte(n).repeat(20))).unwrap()
    }

    fn hex_byte(n: u8) -> String {
        format!("{n:02x}")
    }

    fn codes(names: &[&str]) -> Vec<InviteCode> {
        names.iter().map(|n| InviteCode::new(*n)).collect()
    }

    #[derive(Default)]
    struct MapSource {
        codes: HashMap<Address, Vec<InviteCode>>,
        failing: Vec<Address>,
        calls: AtomicUsize,
    }

    impl InviteSource for Arc<MapSource> {
        async fn fetch_codes(
            &self,
            _label: &str,
            address: &Address,
        ) -> Result<Option<Vec<InviteCode>>, RunnerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.failing.contains(address) {
                return Err(RunnerError::Config("boom".into()));
            }
            Ok(self.codes.get(address).cloned())
        }
    }

    fn refill(from_first: usize, max_yielding: Option<usize>) -> InviteRefill {
        InviteRefill {
            from_first,
            max_yielding,
            throttle: Duration::from_secs(1),
            between_addresses: None,
        }
    }

    #[tokio::test]
    async fn codes_are_popped_in_order() {
        let source = Arc::new(MapSource::default());
        let pool = InvitePool::new(codes(&["A", "B"]), vec![], source, refill(0, None));
        pool.add_invites(codes(&["C"])).await;
        assert_eq!(pool.get_invite().await, Some(InviteCode::new("A")));
        assert_eq!(pool.get_invite().await, Some(InviteCode::new("B")));
        assert_eq!(pool.get_invite().await, Some(InviteCode::new("C")));
        assert_eq!(pool.get_invite().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn refill_reads_prefix_and_skips_failures() {
        let mut source = MapSource::default();
        source.codes.insert(addr(1), codes(&["X1"]));
        source.codes.insert(addr(3), codes(&["X3a", "X3b"]));
        source.codes.insert(addr(4), codes(&["X4"]));
        source.failing.push(addr(2));
        let source = Arc::new(source);
        let addresses = vec![addr(1), addr(2), addr(3), addr(4)];
        let pool = InvitePool::new(vec![], addresses, source.clone(), refill(3, None));

        assert_eq!(pool.update_invites().await, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(pool.get_invite().await, Some(InviteCode::new("X1")));
        assert_eq!(pool.get_invite().await, Some(InviteCode::new("X3a")));
        assert_eq!(pool.get_invite().await, Some(InviteCode::new("X3b")));
        assert!(pool.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn non_empty_pool_is_not_refilled() {
        let source = Arc::new(MapSource::default());
        let pool = InvitePool::new(codes(&["A"]), vec![addr(1)], source.clone(), refill(5, None));
        let started = tokio::time::Instant::now();
        assert_eq!(pool.update_invites().await, 0);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pool.len().await, 1);
    }
}
