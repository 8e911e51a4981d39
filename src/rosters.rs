use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::model::{LeagueRoster, LeagueUser};
use crate::sleeper_api::SleeperApi;

pub const UNKNOWN_TEAM: &str = "Unknown";

/// `roster_id -> team name` for one league, resolved once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDirectory {
    names: BTreeMap<u32, String>,
}

impl TeamDirectory {
    /// Returns `None` if either the users or the rosters call fails. A partial directory
    /// would silently misattribute every later per-team count.
    pub fn resolve(api: &dyn SleeperApi, league_id: &str) -> Option<Self> {
        let Some(users) = api.fetch_league_users(league_id) else {
            warn!(league_id, "league users unavailable, cannot resolve team names");
            return None;
        };
        let Some(rosters) = api.fetch_league_rosters(league_id) else {
            warn!(league_id, "league rosters unavailable, cannot resolve team names");
            return None;
        };
        let directory = Self::from_parts(&users, &rosters);
        info!(teams = directory.len(), "resolved team directory");
        Some(directory)
    }

    pub fn from_parts(users: &[LeagueUser], rosters: &[LeagueRoster]) -> Self {
        let labels = users
            .iter()
            .map(|user| (user.user_id.as_str(), user.team_label()))
            .collect::<HashMap<_, _>>();

        let mut names = BTreeMap::new();
        for roster in rosters {
            let Some(owner_id) = roster.owner_id.as_deref() else {
                continue;
            };
            if let Some(label) = labels.get(owner_id) {
                names.insert(roster.roster_id, label.clone());
            }
        }
        Self { names }
    }

    pub fn team_name(&self, roster_id: u32) -> &str {
        self.names
            .get(&roster_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TEAM)
    }

    pub fn contains(&self, roster_id: u32) -> bool {
        self.names.contains_key(&roster_id)
    }

    /// Teams in ascending roster order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, display: &str, team: Option<&str>) -> LeagueUser {
        serde_json::from_value(serde_json::json!({
            "user_id": id,
            "display_name": display,
            "metadata": team.map(|t| serde_json::json!({ "team_name": t })),
        }))
        .unwrap()
    }

    fn roster(roster_id: u32, owner: Option<&str>) -> LeagueRoster {
        LeagueRoster {
            roster_id,
            owner_id: owner.map(str::to_string),
        }
    }

    #[test]
    fn joins_owner_to_roster() {
        let users = vec![
            user("u1", "frosty", Some("Ice Breakers")),
            user("u2", "slush", None),
        ];
        let rosters = vec![roster(2, Some("u2")), roster(1, Some("u1")), roster(3, None)];
        let dir = TeamDirectory::from_parts(&users, &rosters);

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.team_name(1), "Ice Breakers");
        assert_eq!(dir.team_name(2), "slush");
        assert_eq!(dir.team_name(3), UNKNOWN_TEAM);
        assert_eq!(
            dir.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn owner_without_user_is_dropped() {
        let users = vec![user("u1", "frosty", None)];
        let rosters = vec![roster(1, Some("u9"))];
        assert!(TeamDirectory::from_parts(&users, &rosters).is_empty());
    }
}
