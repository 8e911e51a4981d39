use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct NflState {
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub metadata: Option<UserMetadata>,
}

impl LeagueUser {
    /// Team name if the owner set one, otherwise the account display name.
    pub fn team_label(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.team_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.display_name.as_str())
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueRoster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchupEntry {
    pub roster_id: u32,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starters: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starters_points: Vec<Option<f64>>,
    #[serde(default)]
    pub points: Option<f64>,
}

impl MatchupEntry {
    pub fn starter_points_total(&self) -> f64 {
        self.starters_points.iter().map(|p| p.unwrap_or(0.0)).sum()
    }

    /// Starters paired with their league-scored points. Missing entries score 0.
    pub fn scored_starters(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.starters.iter().enumerate().map(|(idx, id)| {
            let points = self.starters_points.get(idx).copied().flatten().unwrap_or(0.0);
            (id.as_str(), points)
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatLine {
    #[serde(default)]
    pub pts_ppr: Option<f64>,
}

impl StatLine {
    pub fn points(&self) -> f64 {
        self.pts_ppr.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerScoreRecord {
    pub player_id: String,
    pub name: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowestScoringTeam {
    pub roster_id: u32,
    pub team_name: String,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowScoringTeam {
    pub team_name: String,
    #[serde(default)]
    pub low_scoring_starters: Vec<String>,
    #[serde(default)]
    pub low_scoring_points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyResult {
    pub week: u32,
    pub team: String,
    pub score: f64,
    pub low_scorers: Vec<LowScoringTeam>,
}

/// Accumulated state for one run. Owned by the pipeline, filled in week order by the
/// aggregator.
#[derive(Debug, Clone, Default)]
pub struct SeasonTally {
    pub current_week: u32,
    pub season_zero_count: BTreeMap<u32, u32>,
    pub current_week_zero: BTreeMap<u32, Vec<PlayerScoreRecord>>,
    pub lowest_by_week: BTreeMap<u32, LowestScoringTeam>,
    pub low_scorers_by_week: BTreeMap<u32, Vec<LowScoringTeam>>,
    pub processed_weeks: Vec<u32>,
    pub skipped_weeks: Vec<u32>,
}

impl SeasonTally {
    pub fn new(current_week: u32) -> Self {
        Self {
            current_week,
            ..Self::default()
        }
    }

    pub fn season_count(&self, roster_id: u32) -> u32 {
        self.season_zero_count.get(&roster_id).copied().unwrap_or(0)
    }

    pub fn current_week_players(&self, roster_id: u32) -> &[PlayerScoreRecord] {
        self.current_week_zero
            .get(&roster_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
