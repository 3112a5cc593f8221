use well3_store::AccountStore;

use crate::{ErrorLog, RunnerConfig};

/// Everything workers share. Only the store has interior mutability.
pub struct Context<K> {
    pub connector: K,
    pub store: AccountStore,
    pub config: RunnerConfig,
    pub error_log: ErrorLog,
}

impl<K> Context<K> {
    pub fn new(connector: K, store: AccountStore, config: RunnerConfig) -> Self {
        let error_log = ErrorLog::new(config.paths.error_log());
        Self {
            connector,
            store,
            config,
            error_log,
        }
    }
}
