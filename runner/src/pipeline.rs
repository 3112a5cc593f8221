//! A whole run: full pass, save, refresh pass, save, reports.

use std::sync::Arc;

use tracing::{info, warn};
use well3_clients::Connector;

use crate::invites::{InvitePool, InviteRefill};
use crate::jobs::{ProcessJob, RefreshJob, Refresher};
use crate::report::{write_reports, ReportSummary};
use crate::{AccountList, Context, Orchestrator, RunnerError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Process the selected accounts, then refresh everyone.
    Full,
    /// Only the refresh pass.
    RefreshOnly,
}

#[derive(Debug)]
pub struct RunSummary {
    pub used_invites: usize,
    pub report: ReportSummary,
}

pub async fn run<K: Connector>(
    ctx: Arc<Context<K>>,
    accounts: &AccountList,
    mode: RunMode,
) -> Result<RunSummary, RunnerError> {
    let config = &ctx.config;
    let orchestrator = Orchestrator::from_config(config, ctx.error_log.clone());
    if config.claims_without_reward_topic() {
        warn!("tx.reward_topic is not set: claimed insight rewards will not be decoded");
    }

    let mut used_invites = 0;
    if mode == RunMode::Full {
        let pool = InvitePool::new(
            accounts.invites.clone(),
            accounts.addresses(),
            Refresher::new(ctx.clone()),
            InviteRefill::from_config(config),
        );
        let job = ProcessJob::new(ctx.clone(), Arc::new(pool));
        let selected = accounts.select(config.skip_first, &config.only);
        info!("Processing {} accounts in {} batches", selected.len(), config.threads);
        used_invites = orchestrator.run(Arc::new(job), selected, true).await;
        ctx.store.save().await?;
        info!("Finished. Refreshing accounts profiles");
    }

    let job = RefreshJob::new(ctx.clone());
    orchestrator
        .run(Arc::new(job), accounts.entries.clone(), config.mobile_proxy)
        .await;
    ctx.store.save().await?;
    info!("Used invites: {used_invites}");

    let report = write_reports(
        &config.paths.results(),
        &accounts.entries,
        &ctx.store.snapshot().await,
    )?;
    Ok(RunSummary {
        used_invites,
        report,
    })
}
