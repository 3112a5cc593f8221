//! Per-account jobs run by the orchestrator.
//!
//! - [`ProcessJob`] is the full pass: sign-in or registration, quests,
//!   wallet linking, insight claims.
//! - [`RefreshJob`] only resyncs profile and insight state of accounts that
//!   were already saved.
//!
//! [`Refresher`] is the same lightweight refresh feeding the invite pool.

use std::future::Future;
use std::sync::Arc;

use tracing::info;
use well3_clients::Connector;
use well3_types::{AccountState, Address, InviteCode, ProcessResult};

use crate::invites::{InvitePool, InviteSource};
use crate::session::Session;
use crate::{AccountEntry, Context, RunnerError};

/// Work applied to every account of a pass.
pub trait AccountJob: Send + Sync + 'static {
    fn run(&self, entry: &AccountEntry)
        -> impl Future<Output = Result<ProcessResult, RunnerError>> + Send;
}

/// Resync one saved account and store the result.
///
/// Returns `None` without touching anything when the account was never
/// saved, or when signing in would require an invite code.
pub async fn refresh<K: Connector>(
    ctx: &Context<K>,
    label: &str,
    address: &Address,
    check_insights: bool,
) -> Result<Option<AccountState>, RunnerError> {
    info!("{label}) {address}");
    let Some(state) = ctx.store.get(address).await else {
        return Ok(None);
    };
    let mut session = Session::open(ctx, label, state).await?;
    if !session.sign_in_registered().await? {
        return Ok(None);
    }
    session.refresh_profile().await?;
    if check_insights {
        session.check_insights().await?;
    }
    let state = session.into_state();
    ctx.store.set(state.clone()).await;
    Ok(Some(state))
}

/// Invite source that refreshes registered accounts for their unused codes.
pub struct Refresher<K> {
    ctx: Arc<Context<K>>,
}

impl<K> Refresher<K> {
    pub fn new(ctx: Arc<Context<K>>) -> Self {
        Self { ctx }
    }
}

impl<K: Connector> InviteSource for Refresher<K> {
    async fn fetch_codes(
        &self,
        label: &str,
        address: &Address,
    ) -> Result<Option<Vec<InviteCode>>, RunnerError> {
        let state = refresh(&self.ctx, label, address, false).await?;
        Ok(state.map(|s| s.invite_codes))
    }
}

pub struct ProcessJob<K, S> {
    ctx: Arc<Context<K>>,
    invites: Arc<InvitePool<S>>,
}

impl<K, S> ProcessJob<K, S> {
    pub fn new(ctx: Arc<Context<K>>, invites: Arc<InvitePool<S>>) -> Self {
        Self { ctx, invites }
    }
}

impl<K: Connector, S: InviteSource + 'static> AccountJob for ProcessJob<K, S> {
    async fn run(&self, entry: &AccountEntry) -> Result<ProcessResult, RunnerError> {
        let ctx = &*self.ctx;
        let label = entry.index.to_string();
        info!("{label}) Processing {}", entry.address);

        let state = match ctx.store.get(&entry.address).await {
            Some(state) => {
                info!("{label}) Saved account info restored");
                state
            }
            None => {
                info!("{label}) Account info was not saved before");
                AccountState::new(entry.address.clone(), &entry.proxy, &entry.social_token)
            }
        };

        let mut session = Session::open(ctx, &label, state).await?;
        let invite_used = session.sign_in(&self.invites).await?;

        session.refresh_profile().await?;
        info!("{label}) Profile refreshed");

        if ctx.config.do_tasks && session.do_quests().await? > 0 {
            session.refresh_profile().await?;
        }

        session.link_wallet_if_needed(entry.key.clone()).await?;
        session.claim_insights().await?;

        info!("{label}) Checking insights");
        session.check_insights().await?;

        info!("{label}) Account stats:\n{}", session.state().stats());
        ctx.store.set(session.into_state()).await;
        Ok(ProcessResult { invite_used })
    }
}

pub struct RefreshJob<K> {
    ctx: Arc<Context<K>>,
}

impl<K> RefreshJob<K> {
    pub fn new(ctx: Arc<Context<K>>) -> Self {
        Self { ctx }
    }
}

impl<K: Connector> AccountJob for RefreshJob<K> {
    async fn run(&self, entry: &AccountEntry) -> Result<ProcessResult, RunnerError> {
        let label = format!("Refreshing account {}", entry.index);
        refresh(&self.ctx, &label, &entry.address, true).await?;
        Ok(ProcessResult::default())
    }
}
