//! Per-account collaborator construction.

use std::future::Future;
use well3_types::{AccountState, Address, PrivateKey};

use crate::{ChainClient, ClientError, PlatformClient, SocialClient};

/// The three collaborator sessions of one account.
pub struct Clients<P, S, C> {
    pub platform: P,
    pub social: S,
    pub chain: C,
}

/// Creates collaborator sessions for accounts.
///
/// Shared by every worker; individual sessions are never shared.
pub trait Connector: Send + Sync + 'static {
    type Platform: PlatformClient;
    type Social: SocialClient;
    type Chain: ChainClient;

    /// Wallet address controlled by `key`.
    fn address_of(&self, key: &PrivateKey)
        -> impl Future<Output = Result<Address, ClientError>> + Send;

    /// Request a new exit IP from a mobile proxy's rotation link.
    fn rotate_proxy(&self, link: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Open sessions for the account described by `state` (proxy, social token).
    fn connect(
        &self,
        label: &str,
        state: &AccountState,
    ) -> impl Future<
        Output = Result<Clients<Self::Platform, Self::Social, Self::Chain>, ClientError>,
    > + Send;
}
