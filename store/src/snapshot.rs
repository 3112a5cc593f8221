//! JSON snapshot store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use well3_types::{AccountState, Address};

use crate::StoreError;

/// Address-keyed account state with whole-file persistence.
///
/// Every accessor takes the single lock for the duration of one map
/// operation (or one full serialize-and-write in [`save`](Self::save)).
/// There are no multi-call transactions: a caller that reads, awaits, then
/// writes may overwrite a concurrent writer of the same address.
pub struct AccountStore {
    path: PathBuf,
    data: Mutex<BTreeMap<Address, AccountState>>,
}

impl AccountStore {
    /// An empty store that will save to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load the snapshot at `path`. A missing or blank file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => parse_snapshot(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        tracing::info!(path = %path.display(), accounts = data.len(), "account store loaded");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the stored state for `address`.
    pub async fn get(&self, address: &Address) -> Option<AccountState> {
        self.data.lock().await.get(address).cloned()
    }

    /// Insert or replace the record keyed by `state.address`.
    pub async fn set(&self, state: AccountState) {
        self.data.lock().await.insert(state.address.clone(), state);
    }

    pub async fn remove(&self, address: &Address) -> Option<AccountState> {
        self.data.lock().await.remove(address)
    }

    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.lock().await.is_empty()
    }

    /// A copy of the whole map, for reporting.
    pub async fn snapshot(&self) -> BTreeMap<Address, AccountState> {
        self.data.lock().await.clone()
    }

    /// Serialize the whole map and replace the snapshot file.
    ///
    /// Writes to a sibling temp file first, then renames over the target.
    pub async fn save(&self) -> Result<(), StoreError> {
        let data = self.data.lock().await;
        let json = serde_json::to_string(&*data)?;
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), accounts = data.len(), "account store saved");
        Ok(())
    }
}

fn parse_snapshot(contents: &str) -> Result<BTreeMap<Address, AccountState>, StoreError> {
    let data: BTreeMap<Address, AccountState> = serde_json::from_str(contents)?;
    if let Some((key, state)) = data.iter().find(|(key, state)| **key != state.address) {
        return Err(StoreError::Corruption(format!(
            "record under {key} belongs to {}",
            state.address
        )));
    }
    Ok(data)
}
