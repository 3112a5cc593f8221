//! Account list loading.
//!
//! Input files live in one directory:
//!
//! | file           | content                                   |
//! |----------------|-------------------------------------------|
//! | `wallets.txt`  | private keys, one per line                |
//! | `twitters.txt` | social auth tokens, line-aligned to keys  |
//! | `proxies.txt`  | proxies, cycled over the accounts         |
//! | `invites.txt`  | initial invite codes                      |
//!
//! Blank lines are ignored. The proxy and invite files are optional.

use std::path::Path;

use tracing::info;
use well3_clients::Connector;
use well3_types::{Address, InviteCode, PrivateKey};
use well3_utils::{retry, RetryPolicy};

use crate::RunnerError;

/// One configured account.
#[derive(Clone, Debug)]
pub struct AccountEntry {
    /// 1-based position in `wallets.txt`.
    pub index: usize,
    pub key: PrivateKey,
    pub address: Address,
    pub proxy: String,
    pub social_token: String,
}

pub struct AccountList {
    pub entries: Vec<AccountEntry>,
    pub invites: Vec<InviteCode>,
}

impl AccountList {
    pub fn addresses(&self) -> Vec<Address> {
        self.entries.iter().map(|e| e.address.clone()).collect()
    }

    /// Entries of the full pass: the `only` allowlist when given, otherwise
    /// everything after the first `skip_first`.
    pub fn select(&self, skip_first: usize, only: &[usize]) -> Vec<AccountEntry> {
        if only.is_empty() {
            self.entries.iter().skip(skip_first).cloned().collect()
        } else {
            self.entries
                .iter()
                .filter(|e| only.contains(&e.index))
                .cloned()
                .collect()
        }
    }
}

/// Non-blank trimmed lines of `path`; a missing optional file reads as empty.
pub fn read_lines(path: &Path, required: bool) -> Result<Vec<String>, RunnerError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RunnerError::io(path, e)),
    };
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Prefix `http://` when the proxy URL has no scheme. A `|link` suffix is kept.
pub fn normalize_proxy(raw: &str) -> String {
    let url = raw.split('|').next().unwrap_or_default();
    if url.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

/// Read the account files in `dir` and resolve every wallet address.
///
/// Fails before any account is touched when the wallet and social token
/// counts differ.
pub async fn load_accounts<K: Connector>(
    dir: &Path,
    connector: &K,
    policy: &RetryPolicy,
) -> Result<AccountList, RunnerError> {
    let wallets = read_lines(&dir.join("wallets.txt"), true)?;
    let socials = read_lines(&dir.join("twitters.txt"), true)?;
    let proxies: Vec<String> = read_lines(&dir.join("proxies.txt"), false)?
        .iter()
        .map(|p| normalize_proxy(p))
        .collect();
    let invites = read_lines(&dir.join("invites.txt"), false)?
        .into_iter()
        .map(InviteCode::new)
        .collect();

    if wallets.len() != socials.len() {
        return Err(RunnerError::AccountsMismatch {
            wallets: wallets.len(),
            socials: socials.len(),
        });
    }

    let mut entries = Vec::with_capacity(wallets.len());
    for (i, (wallet, social_token)) in wallets.iter().zip(socials).enumerate() {
        let index = i + 1;
        let key: PrivateKey = wallet
            .parse()
            .map_err(|source| RunnerError::InvalidWallet { line: index, source })?;
        let label = format!("{index}) address");
        let address = retry(policy, &label, || connector.address_of(&key)).await?;
        let proxy = match proxies.len() {
            0 => String::new(),
            n => proxies[i % n].clone(),
        };
        entries.push(AccountEntry {
            index,
            key,
            address,
            proxy,
            social_token,
        });
    }

    info!(
        accounts = entries.len(),
        proxies = proxies.len(),
        "Loaded {} accounts",
        entries.len()
    );
    Ok(AccountList { entries, invites })
}
