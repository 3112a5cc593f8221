//! Nullable connector handing out per-account nulls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use well3_clients::{Clients, ClientError, Connector};
use well3_types::{AccountState, Address, PrivateKey};

use crate::{NullChain, NullPlatform, NullSocial};

#[derive(Default)]
struct State {
    platforms: HashMap<Address, NullPlatform>,
    socials: HashMap<Address, NullSocial>,
    unreachable: HashSet<Address>,
    connects: Vec<String>,
    rotations: Vec<String>,
}

/// Connects every account to its own [`NullPlatform`] and [`NullSocial`]
/// and to one shared [`NullChain`].
///
/// Accounts without a registered platform get a fresh default one on first
/// connect; later connects reuse it.
#[derive(Clone, Default)]
pub struct NullConnector {
    state: Arc<Mutex<State>>,
    chain: NullChain,
}

impl NullConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deterministic address for `key`: its last 20 bytes.
    pub fn derive_address(key: &PrivateKey) -> Result<Address, ClientError> {
        let raw = format!("0x{}", hex::encode(&key.as_bytes()[12..]));
        Address::parse(&raw).map_err(|e| ClientError::Protocol(e.to_string()))
    }

    pub fn chain(&self) -> &NullChain {
        &self.chain
    }

    pub fn set_platform(&self, address: Address, platform: NullPlatform) {
        self.lock().platforms.insert(address, platform);
    }

    /// The platform `address` is (or will be) connected to.
    pub fn platform(&self, address: &Address) -> NullPlatform {
        self.lock().platforms.entry(address.clone()).or_default().clone()
    }

    pub fn social(&self, address: &Address) -> NullSocial {
        self.lock().socials.entry(address.clone()).or_default().clone()
    }

    /// Make `connect` fail with a transport error for `address`.
    pub fn make_unreachable(&self, address: Address) {
        self.lock().unreachable.insert(address);
    }

    /// Labels passed to `connect`, in order.
    pub fn connects(&self) -> Vec<String> {
        self.lock().connects.clone()
    }

    pub fn rotations(&self) -> Vec<String> {
        self.lock().rotations.clone()
    }
}

impl Connector for NullConnector {
    type Platform = NullPlatform;
    type Social = NullSocial;
    type Chain = NullChain;

    async fn address_of(&self, key: &PrivateKey) -> Result<Address, ClientError> {
        Self::derive_address(key)
    }

    async fn rotate_proxy(&self, link: &str) -> Result<(), ClientError> {
        self.lock().rotations.push(link.to_string());
        Ok(())
    }

    async fn connect(
        &self,
        label: &str,
        state: &AccountState,
    ) -> Result<Clients<NullPlatform, NullSocial, NullChain>, ClientError> {
        let mut inner = self.lock();
        inner.connects.push(label.to_string());
        if inner.unreachable.contains(&state.address) {
            return Err(ClientError::Transport(format!("{} unreachable", state.address)));
        }
        let platform = inner.platforms.entry(state.address.clone()).or_default().clone();
        let social = inner.socials.entry(state.address.clone()).or_default().clone();
        Ok(Clients {
            platform,
            social,
            chain: self.chain.clone(),
        })
    }
}
