use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http_client::http_client;
use crate::model::{LeagueRoster, LeagueUser, MatchupEntry, NflState, PlayerRecord, StatLine};

pub const DEFAULT_API_BASE: &str = "https://api.sleeper.app/v1";

/// Read-only view of the league API.
///
/// Every method swallows its own failures: a non-200 response, a transport error or an
/// unparseable body is logged and surfaces as `None` or an empty map. Callers decide what a
/// missing value means for them.
pub trait SleeperApi {
    fn fetch_current_week(&self) -> Option<u32>;
    fn fetch_league_users(&self, league_id: &str) -> Option<Vec<LeagueUser>>;
    fn fetch_league_rosters(&self, league_id: &str) -> Option<Vec<LeagueRoster>>;
    fn fetch_weekly_stats(&self, season: &str, week: u32) -> HashMap<String, StatLine>;
    fn fetch_weekly_matchups(&self, league_id: &str, week: u32) -> Option<Vec<MatchupEntry>>;
    fn fetch_player(&self, player_id: &str) -> Option<PlayerRecord>;
    fn fetch_all_players(&self) -> HashMap<String, PlayerRecord>;
}

#[derive(Debug, Clone)]
pub struct SleeperClient {
    base_url: String,
}

impl SleeperClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_body(&self, path: &str, what: &str) -> Option<String> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");

        let client = match http_client() {
            Ok(client) => client,
            Err(err) => {
                warn!("failed to fetch {what}: {err:#}");
                return None;
            }
        };
        let resp = match client.get(&url).send() {
            Ok(resp) => resp,
            Err(err) => {
                warn!("failed to fetch {what}: {err}");
                return None;
            }
        };
        let status = resp.status();
        if status != StatusCode::OK {
            warn!("failed to fetch {what}. status: {status}");
            return None;
        }
        match resp.text() {
            Ok(body) => Some(body),
            Err(err) => {
                warn!("failed reading {what} body: {err}");
                None
            }
        }
    }

    fn fetch<T>(&self, path: &str, what: &str, parse: impl FnOnce(&str) -> Result<T>) -> Option<T> {
        let body = self.get_body(path, what)?;
        match parse(&body) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("failed to parse {what}: {err:#}");
                None
            }
        }
    }
}

impl Default for SleeperClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl SleeperApi for SleeperClient {
    fn fetch_current_week(&self) -> Option<u32> {
        let state = self.fetch("/state/nfl", "current NFL week", parse_nfl_state_json)?;
        state.week
    }

    fn fetch_league_users(&self, league_id: &str) -> Option<Vec<LeagueUser>> {
        self.fetch(
            &format!("/league/{league_id}/users"),
            "league users",
            parse_users_json,
        )
    }

    fn fetch_league_rosters(&self, league_id: &str) -> Option<Vec<LeagueRoster>> {
        self.fetch(
            &format!("/league/{league_id}/rosters"),
            "league rosters",
            parse_rosters_json,
        )
    }

    fn fetch_weekly_stats(&self, season: &str, week: u32) -> HashMap<String, StatLine> {
        self.fetch(
            &format!("/stats/nfl/{season}/{week}"),
            &format!("stats for week {week}"),
            parse_stats_json,
        )
        .unwrap_or_default()
    }

    fn fetch_weekly_matchups(&self, league_id: &str, week: u32) -> Option<Vec<MatchupEntry>> {
        self.fetch(
            &format!("/league/{league_id}/matchups/{week}"),
            &format!("matchups for week {week}"),
            parse_matchups_json,
        )
    }

    fn fetch_player(&self, player_id: &str) -> Option<PlayerRecord> {
        self.fetch(
            &format!("/players/nfl/{player_id}"),
            &format!("player {player_id}"),
            parse_player_json,
        )
        .flatten()
    }

    fn fetch_all_players(&self) -> HashMap<String, PlayerRecord> {
        self.fetch("/players/nfl", "player directory", parse_players_json)
            .unwrap_or_default()
    }
}

pub fn parse_nfl_state_json(raw: &str) -> Result<NflState> {
    serde_json::from_str(raw.trim()).context("invalid nfl state json")
}

pub fn parse_users_json(raw: &str) -> Result<Vec<LeagueUser>> {
    parse_list(raw, "league users")
}

pub fn parse_rosters_json(raw: &str) -> Result<Vec<LeagueRoster>> {
    parse_list(raw, "league rosters")
}

pub fn parse_matchups_json(raw: &str) -> Result<Vec<MatchupEntry>> {
    parse_list(raw, "matchups")
}

pub fn parse_stats_json(raw: &str) -> Result<HashMap<String, StatLine>> {
    parse_keyed(raw, "weekly stats")
}

pub fn parse_player_json(raw: &str) -> Result<Option<PlayerRecord>> {
    let trimmed = raw.trim();
    if is_null_body(trimmed) {
        return Ok(None);
    }
    let record = serde_json::from_str(trimmed).context("invalid player json")?;
    Ok(Some(record))
}

pub fn parse_players_json(raw: &str) -> Result<HashMap<String, PlayerRecord>> {
    parse_keyed(raw, "player directory")
}

fn parse_list<T: DeserializeOwned>(raw: &str, what: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if is_null_body(trimmed) {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))
}

// Entries that don't match the expected shape are dropped instead of failing the whole map.
fn parse_keyed<T: DeserializeOwned>(raw: &str, what: &str) -> Result<HashMap<String, T>> {
    let trimmed = raw.trim();
    if is_null_body(trimmed) {
        return Ok(HashMap::new());
    }
    let root: HashMap<String, Value> =
        serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))?;
    Ok(root
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect())
}

fn is_null_body(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed == "null"
}
