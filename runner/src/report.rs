//! End-of-run report files.
//!
//! `stats.csv` is `;`-delimited: one row per account, then totals, a legend
//! and the run timestamp. `invites.txt` lists every unused invite code.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;
use well3_types::{AccountState, Address, DailyStatus, NextBreathe, Timestamp};

use crate::{AccountEntry, RunnerError};

const HEADER: [&str; 14] = [
    "#",
    "Address",
    "Total",
    "Uncommon",
    "Rare",
    "Legendary",
    "Mythical",
    "Daily insight",
    "Insights to open",
    "Pending quests",
    "Next breathe",
    "Invite codes",
    "Exp",
    "Lvl",
];

#[derive(Debug, Default, PartialEq, Eq)]
struct Totals {
    total: u64,
    uncommon: u64,
    rare: u64,
    legendary: u64,
    mythical: u64,
    daily_available: usize,
    daily_claimed: usize,
    to_open: u64,
    pending: usize,
    breathe_completed: usize,
}

impl Totals {
    fn add(&mut self, state: &AccountState) {
        let i = &state.insights;
        self.total += i.total();
        self.uncommon += i.uncommon;
        self.rare += i.rare;
        self.legendary += i.legendary;
        self.mythical += i.mythical;
        match state.daily_insight.status {
            DailyStatus::Available => self.daily_available += 1,
            DailyStatus::Claimed => self.daily_claimed += 1,
            DailyStatus::Unknown => {}
        }
        self.to_open += state.insights_to_open;
        self.pending += state.pending_quests;
        if state.next_breathe == NextBreathe::Completed {
            self.breathe_completed += 1;
        }
    }
}

/// What the reports were built from.
#[derive(Debug, PartialEq, Eq)]
pub struct ReportSummary {
    pub accounts: usize,
    pub invite_codes: usize,
    pub timestamp: String,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn account_row(index: usize, state: &AccountState) -> Vec<String> {
    let i = &state.insights;
    vec![
        index.to_string(),
        state.address.to_string(),
        i.total().to_string(),
        i.uncommon.to_string(),
        i.rare.to_string(),
        i.legendary.to_string(),
        i.mythical.to_string(),
        capitalize(&state.daily_insight.to_string()),
        state.insights_to_open.to_string(),
        state.pending_quests.to_string(),
        state.next_breathe.to_string(),
        state.invite_codes.len().to_string(),
        state.exp.to_string(),
        state.level.to_string(),
    ]
}

fn stats_rows(
    entries: &[AccountEntry],
    states: &BTreeMap<Address, AccountState>,
    timestamp: &str,
) -> (Vec<Vec<String>>, Totals) {
    let mut rows = vec![HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    let mut totals = Totals::default();
    for entry in entries {
        match states.get(&entry.address) {
            Some(state) => {
                totals.add(state);
                rows.push(account_row(entry.index, state));
            }
            None => rows.push(vec![entry.index.to_string(), entry.address.to_string()]),
        }
    }
    rows.push(vec![
        String::new(),
        "Total".to_string(),
        totals.total.to_string(),
        totals.uncommon.to_string(),
        totals.rare.to_string(),
        totals.legendary.to_string(),
        totals.mythical.to_string(),
        format!("{}/{}", totals.daily_available, totals.daily_claimed),
        totals.to_open.to_string(),
        totals.pending.to_string(),
        totals.breathe_completed.to_string(),
    ]);
    let mut legend = vec![String::new(); 3];
    legend.extend(HEADER[3..11].iter().map(|h| h.to_string()));
    rows.push(legend);
    rows.push(vec![String::new(), "Timestamp".to_string(), timestamp.to_string()]);
    (rows, totals)
}

/// Write `stats.csv` and `invites.txt` into `dir`.
pub fn write_reports(
    dir: &Path,
    entries: &[AccountEntry],
    states: &BTreeMap<Address, AccountState>,
) -> Result<ReportSummary, RunnerError> {
    std::fs::create_dir_all(dir).map_err(|e| RunnerError::io(dir, e))?;
    let timestamp = Timestamp::now().to_string();
    let (rows, _) = stats_rows(entries, states, &timestamp);

    let stats_path = dir.join("stats.csv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(&stats_path)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| RunnerError::io(&stats_path, e))?;

    let codes: Vec<String> = entries
        .iter()
        .filter_map(|e| states.get(&e.address))
        .flat_map(|s| s.invite_codes.iter().map(|c| format!("{c}\n")))
        .collect();
    let invites_path = dir.join("invites.txt");
    std::fs::write(&invites_path, codes.concat()).map_err(|e| RunnerError::io(&invites_path, e))?;

    info!("Stats are stored in {}", stats_path.display());
    info!("Invite codes are stored in {}", invites_path.display());
    info!("Timestamp: {timestamp}");
    Ok(ReportSummary {
        accounts: entries.len(),
        invite_codes: codes.len(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use well3_types::{DailyInsight, InsightCounts, InviteCode, PrivateKey};

    fn entry(index: usize) -> AccountEntry {
        AccountEntry {
            index,
            key: PrivateKey::new([index as u8; 32]),
            address: Address::parse(&format!("0x{}", format!("{index:02x}").repeat(20))).unwrap(),
            proxy: String::new(),
            social_token: String::new(),
        }
    }

    fn state(entry: &AccountEntry) -> AccountState {
        let mut s = AccountState::new(entry.address.clone(), "", "");
        s.insights = InsightCounts {
            uncommon: 3,
            rare: 1,
            legendary: 0,
            mythical: 0,
        };
        s.daily_insight = DailyInsight {
            status: DailyStatus::Claimed,
            is_super: false,
        };
        s.next_breathe = NextBreathe::Completed;
        s.invite_codes = vec![InviteCode::new(format!("C{}", entry.index))];
        s
    }

    #[test]
    fn totals_skip_unsaved_accounts() {
        let entries = vec![entry(1), entry(2), entry(3)];
        let mut states = BTreeMap::new();
        for e in [&entries[0], &entries[2]] {
            states.insert(e.address.clone(), state(e));
        }
        let (rows, totals) = stats_rows(&entries, &states, "now");
        assert_eq!(totals.total, 8);
        assert_eq!(totals.daily_claimed, 2);
        assert_eq!(totals.breathe_completed, 2);
        assert_eq!(rows[2], vec!["2".to_string(), entries[1].address.to_string()]);
        assert_eq!(rows[1][7], "Claimed");
        assert_eq!(rows.last().unwrap()[2], "now");
    }

    #[test]
    fn writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry(1), entry(2)];
        let states: BTreeMap<_, _> = entries
            .iter()
            .map(|e| (e.address.clone(), state(e)))
            .collect();

        let summary = write_reports(dir.path(), &entries, &states).unwrap();
        assert_eq!(summary.invite_codes, 2);

        let invites = std::fs::read_to_string(dir.path().join("invites.txt")).unwrap();
        assert_eq!(invites, "C1\nC2\n");
        let stats = std::fs::read_to_string(dir.path().join("stats.csv")).unwrap();
        let first = stats.lines().next().unwrap();
        assert!(first.starts_with("#;Address;Total;Uncommon"));
        assert!(stats.contains(";Total;8;6;2;0;0;0/2;"));
    }
}
