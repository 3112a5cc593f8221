//! well3 daemon: runs the quest pass over every configured account.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use well3_clients::GatewayConnector;
use well3_runner::{load_accounts, Context, RunMode, RunnerConfig};
use well3_store::AccountStore;
use well3_utils::LogFormat;

#[derive(Parser)]
#[command(name = "well3-daemon", about = "Multi-account well3 quest runner")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "WELL3_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding `files/`, `storage/`, `results/` and `logs/`.
    #[arg(long, env = "WELL3_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Number of concurrent batches.
    #[arg(long, env = "WELL3_THREADS")]
    threads: Option<usize>,

    /// Chain/platform gateway base URL.
    #[arg(long, env = "WELL3_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "WELL3_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "WELL3_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Process the selected accounts, then refresh every saved account.
    Run,
    /// Only refresh saved accounts and rewrite the reports.
    Refresh,
}

impl Cli {
    /// File config (or defaults) with CLI overrides applied on top.
    fn merged_config(&self) -> anyhow::Result<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunnerConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.paths.data_dir = dir.clone();
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(url) = &self.gateway_url {
            config.gateway_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.merged_config()?;
    well3_utils::init_logging(config.log_format, &config.log_level);

    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }
    let mode = match cli.command {
        Command::Run => RunMode::Full,
        Command::Refresh => RunMode::RefreshOnly,
    };

    let connector = GatewayConnector::new(&config.gateway_url)?;
    let files = config.paths.files();
    let accounts = load_accounts(&files, &connector, &config.retry.network)
        .await
        .with_context(|| format!("loading accounts from {}", files.display()))?;
    tracing::info!(
        "Loaded {} accounts and {} invite codes",
        accounts.entries.len(),
        accounts.invites.len()
    );

    let store = AccountStore::open(config.paths.storage()).await?;
    let ctx = Arc::new(Context::new(connector, store, config));
    let summary = well3_runner::run(ctx, &accounts, mode).await?;

    tracing::info!(
        "Done: {} invites used, {} accounts reported, {} unused invite codes",
        summary.used_invites,
        summary.report.accounts,
        summary.report.invite_codes
    );
    Ok(())
}
