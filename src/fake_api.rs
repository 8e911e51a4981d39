use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::model::{LeagueRoster, LeagueUser, MatchupEntry, PlayerRecord, StatLine};
use crate::sleeper_api::{
    SleeperApi, parse_matchups_json, parse_nfl_state_json, parse_players_json,
    parse_rosters_json, parse_stats_json, parse_users_json,
};

/// Offline stand-in for the league API.
///
/// Holds everything in memory; absent data behaves exactly like a failed request on the live
/// client. `from_dir` loads a replay directory laid out as:
///
/// ```text
/// state.json  users.json  rosters.json  players.json
/// matchups_<week>.json  stats_<week>.json
/// ```
#[derive(Debug, Default)]
pub struct FakeSleeper {
    pub current_week: Option<u32>,
    pub users: Option<Vec<LeagueUser>>,
    pub rosters: Option<Vec<LeagueRoster>>,
    pub stats: HashMap<u32, HashMap<String, StatLine>>,
    pub matchups: HashMap<u32, Vec<MatchupEntry>>,
    pub players: HashMap<String, PlayerRecord>,
    /// When false, single and bulk player lookups behave as if the service were down.
    pub players_available: bool,
    player_lookups: Cell<usize>,
    directory_lookups: Cell<usize>,
}

impl FakeSleeper {
    pub fn new() -> Self {
        Self {
            players_available: true,
            ..Self::default()
        }
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("fixture directory {} does not exist", dir.display());
        }
        let mut fake = Self::new();

        if let Some(raw) = read_optional(&dir.join("state.json"))? {
            fake.current_week = parse_nfl_state_json(&raw)?.week;
        }
        if let Some(raw) = read_optional(&dir.join("users.json"))? {
            fake.users = Some(parse_users_json(&raw)?);
        }
        if let Some(raw) = read_optional(&dir.join("rosters.json"))? {
            fake.rosters = Some(parse_rosters_json(&raw)?);
        }
        match read_optional(&dir.join("players.json"))? {
            Some(raw) => fake.players = parse_players_json(&raw)?,
            None => fake.players_available = false,
        }

        for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(week) = week_suffix(stem, "matchups_") {
                let raw = read_file(&path)?;
                fake.matchups.insert(week, parse_matchups_json(&raw)?);
            } else if let Some(week) = week_suffix(stem, "stats_") {
                let raw = read_file(&path)?;
                fake.stats.insert(week, parse_stats_json(&raw)?);
            }
        }

        debug!(
            dir = %dir.display(),
            matchup_weeks = fake.matchups.len(),
            stat_weeks = fake.stats.len(),
            "loaded replay fixtures"
        );
        Ok(fake)
    }

    pub fn player_lookups(&self) -> usize {
        self.player_lookups.get()
    }

    pub fn directory_lookups(&self) -> usize {
        self.directory_lookups.get()
    }
}

impl SleeperApi for FakeSleeper {
    fn fetch_current_week(&self) -> Option<u32> {
        if self.current_week.is_none() {
            warn!("failed to fetch current NFL week");
        }
        self.current_week
    }

    fn fetch_league_users(&self, _league_id: &str) -> Option<Vec<LeagueUser>> {
        if self.users.is_none() {
            warn!("failed to fetch league users");
        }
        self.users.clone()
    }

    fn fetch_league_rosters(&self, _league_id: &str) -> Option<Vec<LeagueRoster>> {
        if self.rosters.is_none() {
            warn!("failed to fetch league rosters");
        }
        self.rosters.clone()
    }

    fn fetch_weekly_stats(&self, _season: &str, week: u32) -> HashMap<String, StatLine> {
        match self.stats.get(&week) {
            Some(stats) => stats.clone(),
            None => {
                warn!("failed to fetch stats for week {week}");
                HashMap::new()
            }
        }
    }

    fn fetch_weekly_matchups(&self, _league_id: &str, week: u32) -> Option<Vec<MatchupEntry>> {
        let matchups = self.matchups.get(&week).cloned();
        if matchups.is_none() {
            warn!("failed to fetch matchups for week {week}");
        }
        matchups
    }

    fn fetch_player(&self, player_id: &str) -> Option<PlayerRecord> {
        self.player_lookups.set(self.player_lookups.get() + 1);
        if !self.players_available {
            warn!("failed to fetch player {player_id}");
            return None;
        }
        self.players.get(player_id).cloned()
    }

    fn fetch_all_players(&self) -> HashMap<String, PlayerRecord> {
        self.directory_lookups.set(self.directory_lookups.get() + 1);
        if !self.players_available {
            warn!("failed to fetch player directory");
            return HashMap::new();
        }
        self.players.clone()
    }
}

fn week_suffix(stem: &str, prefix: &str) -> Option<u32> {
    stem.strip_prefix(prefix)?.parse::<u32>().ok()
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    read_file(path).map(Some)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}
