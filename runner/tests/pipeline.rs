use std::path::Path;
use std::sync::Arc;

use well3_nullables::{NullConnector, NullPlatform};
use well3_runner::{load_accounts, run, Context, RunMode, RunnerConfig};
use well3_store::AccountStore;
use well3_types::{Address, InviteCode, PrivateKey, Profile};
use well3_utils::PauseRange;

fn key(n: u8) -> String {
    format!("{n:064x}")
}

fn address(n: u8) -> Address {
    let key: PrivateKey = key(n).parse().unwrap();
    NullConnector::derive_address(&key).unwrap()
}

fn profile_with_codes(codes: &[&str]) -> Profile {
    let codes: Vec<_> = codes.iter().map(|c| serde_json::json!({ "code": c })).collect();
    serde_json::from_value(serde_json::json!({
        "referralInfo": { "myReferralCodes": codes }
    }))
    .unwrap()
}

fn write_files(dir: &Path, accounts: u8, invites: &[&str]) {
    let files = dir.join("files");
    std::fs::create_dir_all(&files).unwrap();
    let wallets: Vec<String> = (1..=accounts).map(key).collect();
    let socials: Vec<String> = (1..=accounts).map(|n| format!("token-{n}")).collect();
    std::fs::write(files.join("wallets.txt"), wallets.join("\n")).unwrap();
    std::fs::write(files.join("twitters.txt"), socials.join("\n")).unwrap();
    std::fs::write(files.join("invites.txt"), invites.join("\n")).unwrap();
}

fn config(dir: &Path) -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config.paths.data_dir = dir.to_path_buf();
    config.wait_between_accounts = PauseRange::fixed(0.0);
    config.fake_social = true;
    config
}

async fn context(dir: &Path, connector: &NullConnector) -> Context<NullConnector> {
    let config = config(dir);
    let store = AccountStore::open(config.paths.storage()).await.unwrap();
    Context::new(connector.clone(), store, config)
}

#[tokio::test(start_paused = true)]
async fn registration_draws_codes_refilled_from_saved_accounts() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 2, &[]);

    let connector = NullConnector::new();
    connector.set_platform(
        address(1),
        NullPlatform::new().with_profile(profile_with_codes(&["R1", "R2"])),
    );
    connector.set_platform(address(2), NullPlatform::new().needing_invite());

    let ctx = context(dir.path(), &connector).await;
    let accounts = load_accounts(&ctx.config.paths.files(), &connector, &ctx.config.retry.network)
        .await
        .unwrap();
    let ctx = Arc::new(ctx);

    let summary = run(ctx.clone(), &accounts, RunMode::Full).await.unwrap();

    assert_eq!(summary.used_invites, 1);
    assert_eq!(
        connector.platform(&address(2)).redeem_attempts(),
        vec![InviteCode::new("R1")]
    );
    assert_eq!(summary.report.accounts, 2);
    assert_eq!(summary.report.invite_codes, 2);

    let results = dir.path().join("results");
    let stats = std::fs::read_to_string(results.join("stats.csv")).unwrap();
    assert!(stats.starts_with("#;Address;Total"));
    assert!(stats.contains(address(2).as_str()));
    assert_eq!(
        std::fs::read_to_string(results.join("invites.txt")).unwrap(),
        "R1\nR2\n"
    );

    let saved = AccountStore::open(ctx.config.paths.storage()).await.unwrap();
    assert_eq!(saved.len().await, 2);
    assert_eq!(
        saved.get(&address(1)).await.unwrap().invite_codes,
        vec![InviteCode::new("R1"), InviteCode::new("R2")]
    );
}

#[tokio::test(start_paused = true)]
async fn spent_codes_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 1, &["OLD", "FRESH"]);

    let connector = NullConnector::new();
    let platform = NullPlatform::new().needing_invite();
    platform.spend_code(InviteCode::new("OLD"));
    connector.set_platform(address(1), platform.clone());

    let ctx = context(dir.path(), &connector).await;
    let accounts = load_accounts(&ctx.config.paths.files(), &connector, &ctx.config.retry.network)
        .await
        .unwrap();

    let summary = run(Arc::new(ctx), &accounts, RunMode::Full).await.unwrap();

    assert_eq!(summary.used_invites, 1);
    assert_eq!(
        platform.redeem_attempts(),
        vec![InviteCode::new("OLD"), InviteCode::new("FRESH")]
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_invites_fail_only_that_account() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 3, &[]);

    let connector = NullConnector::new();
    connector.set_platform(address(2), NullPlatform::new().needing_invite());
    connector.make_unreachable(address(3));

    let ctx = context(dir.path(), &connector).await;
    let accounts = load_accounts(&ctx.config.paths.files(), &connector, &ctx.config.retry.network)
        .await
        .unwrap();
    let ctx = Arc::new(ctx);

    let summary = run(ctx.clone(), &accounts, RunMode::Full).await.unwrap();

    assert_eq!(summary.used_invites, 0);
    assert!(ctx.store.get(&address(1)).await.is_some());
    assert!(ctx.store.get(&address(2)).await.is_none());
    assert!(ctx.store.get(&address(3)).await.is_none());
    // Unsaved accounts still get a report row.
    assert_eq!(summary.report.accounts, 3);
}

#[tokio::test(start_paused = true)]
async fn refresh_only_touches_saved_accounts() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), 2, &[]);

    let connector = NullConnector::new();
    let ctx = context(dir.path(), &connector).await;
    let accounts = load_accounts(&ctx.config.paths.files(), &connector, &ctx.config.retry.network)
        .await
        .unwrap();
    ctx.store
        .set(well3_types::AccountState::new(address(1), "", "token-1"))
        .await;
    let ctx = Arc::new(ctx);

    let summary = run(ctx.clone(), &accounts, RunMode::RefreshOnly).await.unwrap();

    assert_eq!(summary.used_invites, 0);
    assert_eq!(connector.connects(), vec!["Refreshing account 1".to_string()]);
    assert!(ctx.store.get(&address(2)).await.is_none());
    assert_eq!(connector.platform(&address(1)).profile_fetches(), 1);
}
