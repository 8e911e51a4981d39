use std::collections::HashMap;
use std::str::FromStr;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::model::PlayerRecord;
use crate::sleeper_api::SleeperApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameLookup {
    /// One request per unseen player.
    #[default]
    Single,
    /// One request for the whole player directory, on first use.
    Directory,
}

impl FromStr for NameLookup {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "directory" | "bulk" => Ok(Self::Directory),
            other => Err(anyhow!("unknown name lookup mode: {other}")),
        }
    }
}

/// Best display name for a player: full name, then first + last, then the id itself.
pub fn display_name(player_id: &str, record: Option<&PlayerRecord>) -> String {
    let Some(record) = record else {
        return player_id.to_string();
    };
    if let Some(full) = record.full_name.as_deref().map(str::trim)
        && !full.is_empty()
    {
        return full.to_string();
    }
    let first = record.first_name.as_deref().unwrap_or("").trim();
    let last = record.last_name.as_deref().unwrap_or("").trim();
    let joined = format!("{first} {last}");
    let joined = joined.trim();
    if joined.is_empty() {
        player_id.to_string()
    } else {
        joined.to_string()
    }
}

/// Memoising id -> name translator. Never fails; unresolvable ids come back unchanged.
pub struct PlayerNames<'a> {
    api: &'a dyn SleeperApi,
    mode: NameLookup,
    resolved: HashMap<String, String>,
    directory: Option<HashMap<String, PlayerRecord>>,
}

impl<'a> PlayerNames<'a> {
    pub fn new(api: &'a dyn SleeperApi, mode: NameLookup) -> Self {
        Self {
            api,
            mode,
            resolved: HashMap::new(),
            directory: None,
        }
    }

    pub fn mode(&self) -> NameLookup {
        self.mode
    }

    pub fn name(&mut self, player_id: &str) -> String {
        if let Some(name) = self.resolved.get(player_id) {
            return name.clone();
        }
        let name = match self.mode {
            NameLookup::Single => {
                let record = self.api.fetch_player(player_id);
                display_name(player_id, record.as_ref())
            }
            NameLookup::Directory => display_name(player_id, self.directory().get(player_id)),
        };
        self.resolved.insert(player_id.to_string(), name.clone());
        name
    }

    /// Bulk translation through the directory regardless of mode. Values that aren't known
    /// player ids (including names from an earlier translation) pass through untouched.
    pub fn translate(&mut self, ids: &[String]) -> Vec<String> {
        if ids.is_empty() {
            return Vec::new();
        }
        let directory = self.directory();
        ids.iter()
            .map(|id| match directory.get(id) {
                Some(record) => display_name(id, Some(record)),
                None => id.clone(),
            })
            .collect()
    }

    fn directory(&mut self) -> &HashMap<String, PlayerRecord> {
        self.directory.get_or_insert_with(|| {
            let players = self.api.fetch_all_players();
            if players.is_empty() {
                warn!("player directory unavailable, falling back to raw ids");
            } else {
                debug!(players = players.len(), "loaded player directory");
            }
            players
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_api::FakeSleeper;

    fn record(full: Option<&str>, first: Option<&str>, last: Option<&str>) -> PlayerRecord {
        PlayerRecord {
            full_name: full.map(str::to_string),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            ..PlayerRecord::default()
        }
    }

    #[test]
    fn display_name_fallback_chain() {
        let full = record(Some("Josh Allen"), Some("Josh"), Some("Allen"));
        assert_eq!(display_name("4984", Some(&full)), "Josh Allen");

        let defense = record(None, Some("Buffalo"), Some("Bills"));
        assert_eq!(display_name("BUF", Some(&defense)), "Buffalo Bills");

        let only_last = record(Some(" "), None, Some("Tucker"));
        assert_eq!(display_name("17", Some(&only_last)), "Tucker");

        assert_eq!(display_name("999", Some(&PlayerRecord::default())), "999");
        assert_eq!(display_name("999", None), "999");
    }

    #[test]
    fn single_lookups_are_memoised() {
        let mut api = FakeSleeper::new();
        api.players
            .insert("100".to_string(), record(Some("Josh Allen"), None, None));
        let mut names = PlayerNames::new(&api, NameLookup::Single);

        assert_eq!(names.name("100"), "Josh Allen");
        assert_eq!(names.name("100"), "Josh Allen");
        assert_eq!(names.name("404"), "404");
        assert_eq!(api.player_lookups(), 2);
        assert_eq!(api.directory_lookups(), 0);
    }

    #[test]
    fn directory_fetched_once() {
        let mut api = FakeSleeper::new();
        api.players
            .insert("100".to_string(), record(Some("Josh Allen"), None, None));
        let mut names = PlayerNames::new(&api, NameLookup::Directory);

        assert_eq!(names.name("100"), "Josh Allen");
        assert_eq!(names.name("101"), "101");
        let translated = names.translate(&["100".to_string(), "Someone".to_string()]);
        assert_eq!(translated, vec!["Josh Allen", "Someone"]);
        assert_eq!(api.directory_lookups(), 1);
        assert_eq!(api.player_lookups(), 0);
    }

    #[test]
    fn unavailable_service_degrades_to_ids() {
        let mut api = FakeSleeper::new();
        api.players_available = false;
        let mut names = PlayerNames::new(&api, NameLookup::Single);
        assert_eq!(names.name("100"), "100");
        assert_eq!(names.translate(&["100".to_string()]), vec!["100"]);
    }

    #[test]
    fn translate_is_idempotent() {
        let mut api = FakeSleeper::new();
        api.players
            .insert("100".to_string(), record(Some("Josh Allen"), None, None));
        let mut names = PlayerNames::new(&api, NameLookup::Directory);
        let once = names.translate(&["100".to_string(), "77".to_string()]);
        let twice = names.translate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn parses_lookup_modes() {
        assert_eq!("Single".parse::<NameLookup>().unwrap(), NameLookup::Single);
        assert_eq!("bulk".parse::<NameLookup>().unwrap(), NameLookup::Directory);
        assert!("nope".parse::<NameLookup>().is_err());
    }
}
