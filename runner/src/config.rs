//! Runner configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use well3_chain::TxConfig;
use well3_types::Address;
use well3_utils::{LogFormat, PauseRange, RetryPolicy};

use crate::orchestrator::stagger;
use crate::RunnerError;

/// Upper bound for any configured pause, delay or timeout.
const MAX_SECS: f64 = 30.0 * 86_400.0;

/// Configuration for one runner invocation.
///
/// Can be loaded from a TOML file via [`RunnerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of concurrent batches.
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Random pause between two accounts of one batch.
    #[serde(default = "default_wait")]
    pub wait_between_accounts: PauseRange,

    /// Complete daily and special quests.
    #[serde(default = "default_true")]
    pub do_tasks: bool,

    #[serde(default = "default_true")]
    pub claim_daily_insight: bool,

    #[serde(default = "default_true")]
    pub claim_rank_insights: bool,

    /// Rank insights are claimed only when at least this many are available.
    #[serde(default = "default_min_insights")]
    pub min_insights_to_open: u64,

    /// Skip the first N accounts in the full pass.
    #[serde(default)]
    pub skip_first: usize,

    /// 1-based account indices to process in the full pass. Overrides `skip_first`.
    #[serde(default)]
    pub only: Vec<usize>,

    /// Proxies are mobile proxies sharing one exit: pace refresh passes too.
    #[serde(default)]
    pub mobile_proxy: bool,

    /// Treat every social quest as done without touching the social network.
    #[serde(default)]
    pub fake_social: bool,

    /// JSON-RPC gateway that serves the platform, social and chain collaborators.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Insights contract. Insight claims and checks are skipped when unset.
    #[serde(default)]
    pub insights_contract: Option<Address>,

    /// `condition` tag of the timed activity quest.
    #[serde(default = "default_timed_condition")]
    pub timed_activity_condition: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub invites: InviteSettings,

    #[serde(default)]
    pub templates: Templates,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub tx: TxConfig,

    #[serde(default)]
    pub paths: Paths,
}

/// Invite pool refill policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteSettings {
    /// Refill the pool from processed accounts when it runs dry.
    pub auto_update: bool,
    /// Only the first N accounts are asked for fresh codes.
    pub from_first: usize,
    /// Stop after this many accounts yielded codes, visiting them in random
    /// order and shuffling the collected codes.
    pub max_yielding: Option<usize>,
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            auto_update: true,
            from_first: 10,
            max_yielding: None,
        }
    }
}

/// Text templates. `{{invite_codes}}` and `{{timestamp}}` are substituted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    /// Share post; one line per paragraph.
    pub post: String,
    /// Line inserted at varying positions to dodge duplicate-post rejection.
    pub post_tag: String,
    /// Message signed to link the wallet.
    pub sign_message: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            post: "Just started my wellness journey with @well3official\nJoin with my codes:\n{{invite_codes}}".to_string(),
            post_tag: "#Well".to_string(),
            sign_message: "Welcome to WELL3!\n\nSign this message to link your wallet.\n\nTimestamp: {{timestamp}}".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Proxy rotation, profile fetches and contract views.
    pub network: RetryPolicy,
    /// Build-to-submit of claim transactions.
    pub tx: RetryPolicy,
}

/// On-disk layout, relative to `data_dir`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub files_dir: PathBuf,
    pub storage: PathBuf,
    pub results_dir: PathBuf,
    pub error_log: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            files_dir: PathBuf::from("files"),
            storage: PathBuf::from("storage/data.json"),
            results_dir: PathBuf::from("results"),
            error_log: PathBuf::from("logs/errors.txt"),
        }
    }
}

impl Paths {
    fn resolve(&self, p: &Path) -> PathBuf {
        self.data_dir.join(p)
    }

    pub fn files(&self) -> PathBuf {
        self.resolve(&self.files_dir)
    }

    pub fn storage(&self) -> PathBuf {
        self.resolve(&self.storage)
    }

    pub fn results(&self) -> PathBuf {
        self.resolve(&self.results_dir)
    }

    pub fn error_log(&self) -> PathBuf {
        self.resolve(&self.error_log)
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_threads() -> usize {
    1
}

fn default_wait() -> PauseRange {
    PauseRange::new(30.0, 60.0)
}

fn default_true() -> bool {
    true
}

fn default_min_insights() -> u64 {
    1
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8710".to_string()
}

fn default_timed_condition() -> String {
    "breathe-session".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RunnerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RunnerError> {
        let config: Self = toml::from_str(s).map_err(|e| RunnerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, RunnerError> {
        toml::to_string_pretty(self).map_err(|e| RunnerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.threads == 0 {
            return Err(RunnerError::Config("threads must be at least 1".into()));
        }
        let wait = &self.wait_between_accounts;
        check_secs("wait_between_accounts.min_secs", wait.min_secs)?;
        check_secs("wait_between_accounts.max_secs", wait.max_secs)?;
        if wait.min_secs > wait.max_secs {
            return Err(RunnerError::Config(
                "wait_between_accounts.min_secs exceeds max_secs".into(),
            ));
        }
        let policies = [("retry.network", &self.retry.network), ("retry.tx", &self.retry.tx)];
        for (name, policy) in policies {
            check_secs(&format!("{name}.min_delay_secs"), policy.min_delay_secs)?;
            check_secs(&format!("{name}.max_delay_secs"), policy.max_delay_secs)?;
        }
        check_secs("tx.poll_interval_secs", self.tx.poll_interval_secs)?;
        check_secs("tx.confirm_timeout_secs", self.tx.confirm_timeout_secs)?;
        Ok(())
    }

    /// Stagger between batch starts and the invite refill throttle:
    /// the minimum account pause spread over all batches.
    pub fn batch_stagger(&self) -> Duration {
        stagger(self.wait_between_accounts.min(), self.threads)
    }

    /// Claims are enabled but confirmed receipts cannot be decoded.
    pub fn claims_without_reward_topic(&self) -> bool {
        self.insights_contract.is_some()
            && (self.claim_daily_insight || self.claim_rank_insights)
            && self.tx.reward_topic.is_none()
    }
}

fn check_secs(field: &str, value: f64) -> Result<(), RunnerError> {
    if value.is_finite() && (0.0..=MAX_SECS).contains(&value) {
        Ok(())
    } else {
        Err(RunnerError::Config(format!(
            "{field} must be between 0 and {MAX_SECS} seconds, got {value}"
        )))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            wait_between_accounts: default_wait(),
            do_tasks: true,
            claim_daily_insight: true,
            claim_rank_insights: true,
            min_insights_to_open: default_min_insights(),
            skip_first: 0,
            only: Vec::new(),
            mobile_proxy: false,
            fake_social: false,
            gateway_url: default_gateway_url(),
            insights_contract: None,
            timed_activity_condition: default_timed_condition(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            invites: InviteSettings::default(),
            templates: Templates::default(),
            retry: RetrySettings::default(),
            tx: TxConfig::default(),
            paths: Paths::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = RunnerConfig::default();
        let toml_str = config.to_toml_string().expect("serializable");
        let parsed = RunnerConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.threads, config.threads);
        assert_eq!(parsed.templates, config.templates);
        assert_eq!(parsed.invites, config.invites);
        assert_eq!(parsed.tx, config.tx);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = RunnerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.threads, 1);
        assert_eq!(config.wait_between_accounts, PauseRange::new(30.0, 60.0));
        assert!(config.invites.auto_update);
        assert_eq!(config.retry.tx.max_attempts, 3);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            threads = 4
            only = [2, 5]
            insights_contract = "0x1111111111111111111111111111111111111111"

            [invites]
            max_yielding = 3

            [retry.network]
            max_attempts = 5
        "#;
        let config = RunnerConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.threads, 4);
        assert_eq!(config.only, vec![2, 5]);
        assert!(config.insights_contract.is_some());
        assert_eq!(config.invites.max_yielding, Some(3));
        assert_eq!(config.invites.from_first, 10); // default
        assert_eq!(config.retry.network.max_attempts, 5);
        assert_eq!(config.retry.network.min_delay_secs, 1.0); // default
    }

    #[test]
    fn zero_threads_is_rejected() {
        let err = RunnerConfig::from_toml_str("threads = 0").unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn unbounded_seconds_are_rejected() {
        for toml in [
            "[wait_between_accounts]\nmin_secs = 1.0\nmax_secs = 1e300",
            "[wait_between_accounts]\nmin_secs = nan\nmax_secs = 2.0",
            "[wait_between_accounts]\nmin_secs = -1.0\nmax_secs = 2.0",
            "[retry.tx]\nmax_delay_secs = inf",
            "[retry.network]\nmin_delay_secs = 1e20",
            "[tx]\nconfirm_timeout_secs = 1e300",
            "[tx]\npoll_interval_secs = nan",
        ] {
            let err = RunnerConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, RunnerError::Config(_)), "{toml} accepted");
        }
    }

    #[test]
    fn claims_without_topic_are_flagged() {
        let mut config = RunnerConfig::default();
        assert!(!config.claims_without_reward_topic());
        let contract = Address::parse(&format!("0x{}", "11".repeat(20))).unwrap();
        config.insights_contract = Some(contract);
        assert!(config.claims_without_reward_topic());
        config.tx.reward_topic = Some(well3_types::tx::Word([1; 32]));
        assert!(!config.claims_without_reward_topic());
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = RunnerConfig::from_toml_file("/nonexistent/well3.toml");
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }

    #[test]
    fn stagger_spreads_min_pause_over_batches() {
        let config = RunnerConfig {
            threads: 4,
            wait_between_accounts: PauseRange::new(20.0, 40.0),
            ..RunnerConfig::default()
        };
        assert_eq!(config.batch_stagger(), Duration::from_secs(5));
        let paths = Paths {
            data_dir: PathBuf::from("/srv/run"),
            ..Paths::default()
        };
        assert_eq!(paths.storage(), PathBuf::from("/srv/run/storage/data.json"));
    }
}
