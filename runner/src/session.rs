//! Work on one account: sign-in, quests, wallet linking, insight claims.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{error, info, warn, Instrument};
use well3_chain::insights::{self, parse_bool, parse_results, parse_uint, InsightClaim};
use well3_chain::{ClaimSource, TxError, TxLifecycle};
use well3_clients::{ChainClient, ClientError, Connector, PlatformClient, SocialClient};
use well3_types::{
    AccountState, Address, ContractCall, DailyInsight, DailyStatus, NextBreathe, PrivateKey,
    Profile, SpecialAction, TaskDescriptor, Timestamp,
};
use well3_utils::{format_duration, retry, PauseRange, RetryPolicy};

use crate::invites::{InvitePool, InviteSource};
use crate::tracing_spans::refill_span;
use crate::{Context, RunnerError};

const INVITE_CODES: &str = "{{invite_codes}}";
const TIMESTAMP: &str = "{{timestamp}}";

/// Platform-side view of one account: its persisted state, the last fetched
/// profile and, once the wallet is linked, its signing key.
pub struct Account<P> {
    label: String,
    platform: P,
    pub state: AccountState,
    profile: Profile,
    key: Option<PrivateKey>,
    timed_condition: String,
    policy: RetryPolicy,
}

impl<P: PlatformClient> Account<P> {
    pub fn new(
        label: &str,
        platform: P,
        state: AccountState,
        timed_condition: &str,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            label: label.to_string(),
            platform,
            state,
            profile: Profile::default(),
            key: None,
            timed_condition: timed_condition.to_string(),
            policy,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Mint pending referral codes, refetch the profile and derive state from it.
    pub async fn refresh_profile(&mut self) -> Result<(), RunnerError> {
        let platform = &self.platform;
        let op = format!("{}) profile", self.label);
        retry(&self.policy, &op, || platform.generate_codes()).await?;
        let profile = retry(&self.policy, &op, || platform.fetch_profile()).await?;
        self.apply_profile(profile);
        Ok(())
    }

    fn apply_profile(&mut self, profile: Profile) {
        let questing = &profile.ygpz_questing;
        self.state.invite_codes = profile.unused_invite_codes();
        self.state.exp = questing.info.exp;
        self.state.level = questing.info.rank;
        self.state.pending_quests = questing.pending_verify.len();
        if let Some(task) = questing
            .info
            .daily_progress
            .values()
            .find(|t| t.is_condition(&self.timed_condition))
        {
            self.state.next_breathe = next_breathe(task);
        }
        self.profile = profile;
    }
}

fn next_breathe(task: &TaskDescriptor) -> NextBreathe {
    if task.exp_claimed {
        NextBreathe::Completed
    } else if task.value == 0 {
        NextBreathe::NotStarted
    } else {
        task.next_available_from
            .map(NextBreathe::At)
            .unwrap_or(NextBreathe::Unknown)
    }
}

impl<P: PlatformClient> ClaimSource for Account<P> {
    type Claim = InsightClaim;
    type Error = RunnerError;

    fn sender(&self) -> &Address {
        &self.state.address
    }

    fn private_key(&self) -> Option<&PrivateKey> {
        self.key.as_ref()
    }

    fn linked_address(&self) -> Option<&Address> {
        self.profile.linked_address()
    }

    fn build_call(&self, claim: &InsightClaim) -> Result<ContractCall, TxError> {
        insights::claim_call(&self.profile, claim)
    }

    async fn refresh_signatures(&mut self) -> Result<(), RunnerError> {
        self.refresh_profile().await
    }
}

/// Which quest map to work through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestBatch {
    Daily,
    Special,
}

impl QuestBatch {
    fn name(self) -> &'static str {
        match self {
            QuestBatch::Daily => "dailyProgress",
            QuestBatch::Special => "specialProgress",
        }
    }
}

/// Connected collaborators of one account for the duration of one job.
pub struct Session<'a, K: Connector> {
    ctx: &'a Context<K>,
    label: String,
    account: Account<K::Platform>,
    social: K::Social,
    chain: K::Chain,
}

impl<'a, K: Connector> Session<'a, K> {
    /// Rotate the proxy exit if it has a rotation link, then connect.
    pub async fn open(
        ctx: &'a Context<K>,
        label: &str,
        state: AccountState,
    ) -> Result<Self, RunnerError> {
        let policy = &ctx.config.retry.network;
        let connector = &ctx.connector;
        if let Some(link) = state.proxy_rotation_link() {
            let op = format!("{label}) change ip");
            retry(policy, &op, || connector.rotate_proxy(link)).await?;
            info!("{label}) Successfully changed ip");
        }
        let op = format!("{label}) connect");
        let clients = retry(policy, &op, || connector.connect(label, &state)).await?;
        let account = Account::new(
            label,
            clients.platform,
            state,
            &ctx.config.timed_activity_condition,
            policy.clone(),
        );
        Ok(Self {
            ctx,
            label: label.to_string(),
            account,
            social: clients.social,
            chain: clients.chain,
        })
    }

    pub fn state(&self) -> &AccountState {
        &self.account.state
    }

    pub fn into_state(self) -> AccountState {
        self.account.state
    }

    /// Sign in, registering with pool codes when the platform asks for one.
    ///
    /// Returns whether an invite code was consumed.
    pub async fn sign_in<S: InviteSource>(
        &mut self,
        invites: &InvitePool<S>,
    ) -> Result<bool, RunnerError> {
        let label = &self.label;
        info!("{label}) Signing in");
        let platform = &self.account.platform;
        let mut used = false;
        if platform.sign_in_or_register().await? {
            loop {
                let code = match invites.get_invite().await {
                    Some(code) => code,
                    None => {
                        if self.ctx.config.invites.auto_update {
                            invites.update_invites().instrument(refill_span()).await;
                        }
                        invites.get_invite().await.ok_or(RunnerError::NoInvitesLeft)?
                    }
                };
                info!("{label}) Entering invite code: {code}");
                match platform.redeem_invite(&code).await {
                    Ok(()) => {
                        used = true;
                        break;
                    }
                    Err(ClientError::CodeAlreadyUsed) => {
                        info!("{label}) Code already used. Trying another one");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        info!("{label}) Signed in");
        Ok(used)
    }

    /// Sign in without registering. `false` when the account would need an invite.
    pub async fn sign_in_registered(&mut self) -> Result<bool, RunnerError> {
        Ok(!self.account.platform.sign_in_or_register().await?)
    }

    pub async fn refresh_profile(&mut self) -> Result<(), RunnerError> {
        self.account.refresh_profile().await
    }

    /// Daily quests, then special quests. Returns how many were claimed.
    pub async fn do_quests(&mut self) -> Result<usize, RunnerError> {
        let daily = self.do_quest_batch(QuestBatch::Daily).await?;
        Ok(daily + self.do_quest_batch(QuestBatch::Special).await?)
    }

    async fn do_quest_batch(&mut self, batch: QuestBatch) -> Result<usize, RunnerError> {
        info!("{}) Starting {} tasks...", self.label, batch.name());
        let info = &self.account.profile.ygpz_questing.info;
        let tasks: Vec<(String, TaskDescriptor)> = match batch {
            QuestBatch::Daily => info.daily_progress.clone(),
            QuestBatch::Special => info.special_progress.clone(),
        }
        .into_iter()
        .collect();

        let mut claimed = 0;
        for (task_id, task) in tasks {
            if task.exp_claimed {
                continue;
            }
            let title = format!("{} [Exp: {}]", task.clean_title(), task.exp);
            if self.account.profile.ygpz_questing.pending_verify.contains(&task_id) {
                info!("{}) {title} in pending verify", self.label);
                continue;
            }
            info!("{}) {title}", self.label);
            if self.do_task(&task).await? {
                self.account.platform.claim_quest_exp(&task_id).await?;
                info!("{}) Claimed exp or started verification", self.label);
                claimed += 1;
                PauseRange::new(3.0, 5.0).pause().await;
            }
        }
        Ok(claimed)
    }

    /// Perform one quest. `true` when it is ready to be claimed.
    ///
    /// The timed activity is progressed but never claimed directly: the
    /// platform grants its exp once the required sessions are done.
    pub async fn do_task(&mut self, task: &TaskDescriptor) -> Result<bool, RunnerError> {
        if task.is_condition(&self.ctx.config.timed_activity_condition) {
            self.do_timed_activity(task).await?;
            return Ok(false);
        }
        match &task.special {
            Some(action) => self.do_special(action).await,
            None => Ok(true),
        }
    }

    async fn do_timed_activity(&mut self, task: &TaskDescriptor) -> Result<(), RunnerError> {
        if task.value >= task.required {
            return Ok(());
        }
        let now = Timestamp::now();
        if let Some(next) = task.next_available_from.filter(|next| *next > now) {
            info!(
                "{}) Next breathe available in {}",
                self.label,
                format_duration(next.secs_until(now))
            );
            return Ok(());
        }
        self.account.platform.complete_timed_activity().await?;
        info!(
            "{}) Breathe session done [{}/{}]",
            self.label,
            task.value + 1,
            task.required
        );
        Ok(())
    }

    async fn do_special(&mut self, action: &SpecialAction) -> Result<bool, RunnerError> {
        let label = &self.label;
        let social_action = matches!(
            action,
            SpecialAction::RepostMedia
            | SpecialAction::FollowProfile { .. }
            | SpecialAction::Retweet { .. }
        );
        if social_action && self.ctx.config.fake_social {
            return Ok(true);
        }
        match action {
            SpecialAction::RepostMedia => {
                let url = self.post().await?;
                info!("{label}) Tweet posted: {url}");
                Ok(true)
            }
            SpecialAction::FollowProfile { url } => {
                let username = profile_username(url);
                self.social.follow(username).await?;
                info!("{label}) {username} followed");
                Ok(true)
            }
            SpecialAction::Retweet { tweet_id } => {
                self.social.retweet(tweet_id).await?;
                PauseRange::new(1.0, 3.0).pause().await;
                Ok(self.social.like(tweet_id).await?)
            }
            SpecialAction::ChangeName => {
                warn!("{label}) Changing profile name is not supported yet");
                Ok(false)
            }
            SpecialAction::ChangeBanner => Ok(true),
            SpecialAction::Unknown(tag) => {
                warn!("{label}) Unknown special action {tag}. Trying to verify anyway");
                Ok(true)
            }
        }
    }

    /// Publish the share post, moving the tag line around until the social
    /// network stops rejecting the text as a duplicate.
    pub async fn post(&self) -> Result<String, RunnerError> {
        let templates = &self.ctx.config.templates;
        let texts = post_variants(
            &templates.post,
            &templates.post_tag,
            &self.account.state.invite_codes.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            &mut rand::thread_rng(),
        );
        for text in texts {
            match self.social.post(&text).await {
                Ok(url) => return Ok(url),
                Err(ClientError::DuplicatePost) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ClientError::DuplicatePost.into())
    }

    /// Link the wallet on the platform if the profile has none, then bind
    /// `key` for claim transactions.
    pub async fn link_wallet_if_needed(&mut self, key: PrivateKey) -> Result<(), RunnerError> {
        if self.account.profile.linked_address().is_none() {
            let message = self
                .ctx
                .config
                .templates
                .sign_message
                .replace(TIMESTAMP, &Timestamp::now().as_millis().to_string());
            let signature = self.chain.sign_message(&key, &message).await?;
            tokio::time::sleep(Duration::from_secs(2)).await;
            self.account.platform.link_wallet(&message, &signature).await?;
            info!("{}) Wallet linked", self.label);
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.account.refresh_profile().await?;
        }
        self.account.key = Some(key);
        Ok(())
    }

    /// Claim the enabled insights. Claim failures are logged, not returned;
    /// the profile is refreshed when anything was submitted.
    pub async fn claim_insights(&mut self) -> Result<usize, RunnerError> {
        let mut claimed = 0;
        if let Err(e) = self.try_claims(&mut claimed).await {
            error!("{}) Claim error: {e}", self.label);
        }
        if claimed > 0 {
            self.account.refresh_profile().await?;
        }
        Ok(claimed)
    }

    async fn try_claims(&mut self, claimed: &mut usize) -> Result<(), RunnerError> {
        let ctx = self.ctx;
        let config = &ctx.config;
        let Some(contract) = config.insights_contract.as_ref() else {
            return Ok(());
        };
        if config.claim_daily_insight {
            tokio::time::sleep(Duration::from_secs(5)).await;
            if self.claim_daily_insight(contract).await? {
                *claimed += 1;
            }
        }
        if config.claim_rank_insights {
            tokio::time::sleep(Duration::from_secs(5)).await;
            if self.claim_rank_insights(contract).await? {
                *claimed += 1;
            }
        }
        Ok(())
    }

    async fn claim_daily_insight(&mut self, contract: &Address) -> Result<bool, RunnerError> {
        let status = self.check_daily_insight(contract).await?;
        info!("{}) Daily insight status: {status}", self.label);
        if !status.is_available() {
            return Ok(false);
        }
        let claim = InsightClaim::daily_for(&self.account.profile);
        self.send_claim(contract, claim).await?;
        Ok(true)
    }

    async fn claim_rank_insights(&mut self, contract: &Address) -> Result<bool, RunnerError> {
        let available = self.check_rank_insights(contract).await?;
        info!("{}) Rank insights available to open: {available}", self.label);
        if available < self.ctx.config.min_insights_to_open {
            return Ok(false);
        }
        self.send_claim(contract, InsightClaim::Rankup { amount: available })
            .await?;
        Ok(true)
    }

    async fn send_claim(
        &mut self,
        contract: &Address,
        claim: InsightClaim,
    ) -> Result<(), RunnerError> {
        let config = &self.ctx.config;
        let lifecycle =
            TxLifecycle::new(&self.chain, &config.tx, contract, &config.retry.tx, &self.label);
        lifecycle
            .execute(&mut self.account, &claim, claim.action())
            .await?;
        Ok(())
    }

    async fn view(
        &self,
        contract: &Address,
        call: &ContractCall,
    ) -> Result<serde_json::Value, RunnerError> {
        let chain = &self.chain;
        let op = format!("{}) {}", self.label, call.method);
        let policy = &self.ctx.config.retry.network;
        Ok(retry(policy, &op, || chain.call_view(contract, call)).await?)
    }

    async fn check_daily_insight(
        &mut self,
        contract: &Address,
    ) -> Result<DailyInsight, RunnerError> {
        let call = insights::nonce_used_call(&self.account.profile)?;
        let used = parse_bool(&call.method, &self.view(contract, &call).await?)?;
        let status = DailyInsight {
            status: if used {
                DailyStatus::Claimed
            } else {
                DailyStatus::Available
            },
            is_super: self.account.profile.super_quest_eligible(),
        };
        self.account.state.daily_insight = status;
        Ok(status)
    }

    async fn check_rank_insights(&mut self, contract: &Address) -> Result<u64, RunnerError> {
        let call = insights::get_quests_call(&self.account.profile, &self.account.state.address)?;
        let count = parse_uint(&call.method, &self.view(contract, &call).await?)?;
        self.account.state.insights_to_open = count;
        Ok(count)
    }

    async fn check_results(&mut self, contract: &Address) -> Result<(), RunnerError> {
        let call = insights::quest_results_call(&self.account.state.address);
        self.account.state.insights = parse_results(&self.view(contract, &call).await?)?;
        Ok(())
    }

    /// Resync daily status, openable rank insights and opened totals.
    pub async fn check_insights(&mut self) -> Result<(), RunnerError> {
        let ctx = self.ctx;
        let Some(contract) = ctx.config.insights_contract.as_ref() else {
            return Ok(());
        };
        self.check_daily_insight(contract).await?;
        self.check_rank_insights(contract).await?;
        self.check_results(contract).await
    }
}

/// Last path segment of a profile URL.
fn profile_username(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

/// Every placement of `tag` among the template lines, in random order, with
/// `{{invite_codes}}` expanded to one code per line.
pub(crate) fn post_variants<R: Rng>(
    template: &str,
    tag: &str,
    codes: &[&str],
    rng: &mut R,
) -> Vec<String> {
    let lines: Vec<&str> = template.lines().collect();
    let mut positions: Vec<usize> = (0..=lines.len()).collect();
    positions.shuffle(rng);
    let codes = codes.join("\n");
    positions
        .into_iter()
        .map(|pos| {
            let mut parts = lines.clone();
            parts.insert(pos, tag);
            parts.join("\n").replace(INVITE_CODES, &codes)
        })
        .collect()
}
