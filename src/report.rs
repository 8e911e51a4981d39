use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::{LowScoringTeam, SeasonTally, WeeklyResult};
use crate::players::PlayerNames;
use crate::rosters::{TeamDirectory, UNKNOWN_TEAM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    Summary,
    Weekly,
    #[default]
    Both,
}

impl ReportMode {
    pub fn writes_summary(self) -> bool {
        matches!(self, Self::Summary | Self::Both)
    }

    pub fn writes_weekly(self) -> bool {
        matches!(self, Self::Weekly | Self::Both)
    }
}

impl FromStr for ReportMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "summary" | "md" | "markdown" => Ok(Self::Summary),
            "weekly" | "json" => Ok(Self::Weekly),
            "both" | "all" => Ok(Self::Both),
            other => Err(anyhow!("unknown report mode: {other}")),
        }
    }
}

pub fn summary_filename(date: NaiveDate, week: u32) -> String {
    format!("zero_points_summary_{}_week{week}.md", date.format("%Y%m%d"))
}

pub fn weekly_results_filename(date: NaiveDate) -> String {
    format!("weekly_results_{}.json", date.format("%Y%m%d"))
}

pub fn low_scorer_cache_filename(week: u32) -> String {
    format!("low_scoring_starters_week_{week}.json")
}

pub fn render_zero_points_summary(tally: &SeasonTally, teams: &TeamDirectory) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# Zero Points Summary for Week {} (Starters Only)\n",
        tally.current_week
    );
    out.push_str("| Team | Current Week Zero or Less | Season Total Zero or Less |\n");
    out.push_str("|------|---------------------------|----------------------------|\n");

    for (roster_id, name) in teams.iter() {
        let players = tally.current_week_players(roster_id);
        let cell = players
            .iter()
            .map(|p| format!("{}: {}", escape_cell(&p.name), format_points(p.points)))
            .collect::<Vec<_>>()
            .join("<br>");
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            escape_cell(name),
            cell,
            tally.season_count(roster_id)
        );
    }

    // Matchups can reference rosters the directory never saw; they share one row.
    let unknown = tally
        .season_zero_count
        .keys()
        .copied()
        .filter(|id| !teams.contains(*id))
        .collect::<Vec<_>>();
    if !unknown.is_empty() {
        let cell = unknown
            .iter()
            .flat_map(|id| tally.current_week_players(*id))
            .map(|p| format!("{}: {}", escape_cell(&p.name), format_points(p.points)))
            .collect::<Vec<_>>()
            .join("<br>");
        let total: u32 = unknown.iter().map(|id| tally.season_count(*id)).sum();
        let _ = writeln!(out, "| {UNKNOWN_TEAM} | {cell} | {total} |");
    }
    out
}

pub fn write_zero_points_summary(
    dir: &Path,
    date: NaiveDate,
    tally: &SeasonTally,
    teams: &TeamDirectory,
) -> Result<PathBuf> {
    let path = dir.join(summary_filename(date, tally.current_week));
    write_atomic(&path, &render_zero_points_summary(tally, teams))?;
    info!(path = %path.display(), "wrote zero points summary");
    Ok(path)
}

/// One result per processed week that has a lowest-scoring team. A per-week cache file on disk
/// replaces that week's computed low scorers; the cache is only ever read here.
pub fn build_weekly_results(
    tally: &SeasonTally,
    cache_dir: &Path,
    names: &mut PlayerNames<'_>,
) -> Vec<WeeklyResult> {
    let mut results = Vec::new();
    for week in 1..=tally.current_week {
        let Some(lowest) = tally.lowest_by_week.get(&week) else {
            info!(week, "no team data available for week");
            continue;
        };
        let low_scorers = load_low_scorer_cache(cache_dir, week).unwrap_or_else(|| {
            tally
                .low_scorers_by_week
                .get(&week)
                .cloned()
                .unwrap_or_default()
        });
        results.push(WeeklyResult {
            week,
            team: lowest.team_name.clone(),
            score: lowest.total_points,
            low_scorers: translate_low_scorers(low_scorers, names),
        });
    }
    results
}

pub fn write_weekly_results(
    dir: &Path,
    date: NaiveDate,
    results: &[WeeklyResult],
) -> Result<PathBuf> {
    let path = dir.join(weekly_results_filename(date));
    let json = serde_json::to_string_pretty(results).context("serialize weekly results")?;
    write_atomic(&path, &json)?;
    info!(path = %path.display(), weeks = results.len(), "wrote weekly results");
    Ok(path)
}

pub fn translate_low_scorers(
    teams: Vec<LowScoringTeam>,
    names: &mut PlayerNames<'_>,
) -> Vec<LowScoringTeam> {
    teams
        .into_iter()
        .map(|mut team| {
            team.low_scoring_starters = names.translate(&team.low_scoring_starters);
            team
        })
        .collect()
}

/// Shapes a low-scorer cache file may take on disk.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CachedLowScorers {
    Teams(Vec<Value>),
    Wrapped { low_scoring_starters: Vec<Value> },
    Other(Value),
}

impl CachedLowScorers {
    pub fn into_teams(self) -> Vec<LowScoringTeam> {
        let entries = match self {
            Self::Teams(entries) | Self::Wrapped {
                low_scoring_starters: entries,
            } => entries,
            Self::Other(value) => {
                warn!("unexpected low scorer cache format: {}", json_kind(&value));
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<LowScoringTeam>(entry) {
                Ok(team) => Some(team),
                Err(err) => {
                    warn!("skipping malformed low scorer entry: {err}");
                    None
                }
            })
            .collect()
    }
}

pub fn parse_low_scorer_cache(raw: &str) -> Result<Vec<LowScoringTeam>> {
    let cached: CachedLowScorers =
        serde_json::from_str(raw.trim()).context("invalid low scorer cache json")?;
    Ok(cached.into_teams())
}

/// `None` when no cache file exists for the week. An unreadable file counts as an empty list.
pub fn load_low_scorer_cache(dir: &Path, week: u32) -> Option<Vec<LowScoringTeam>> {
    let path = dir.join(low_scorer_cache_filename(week));
    let raw = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded low scorer cache");
    match parse_low_scorer_cache(&raw) {
        Ok(teams) => Some(teams),
        Err(err) => {
            warn!(path = %path.display(), "{err:#}");
            Some(Vec::new())
        }
    }
}

/// Writes a week's raw low scorers in the shape `load_low_scorer_cache` reads back. Only
/// finished weeks belong here; an existing file shadows the computed list on every later run.
pub fn save_low_scorer_cache(dir: &Path, week: u32, teams: &[LowScoringTeam]) -> Result<PathBuf> {
    let path = dir.join(low_scorer_cache_filename(week));
    let json = serde_json::to_string_pretty(teams).context("serialize low scorer cache")?;
    write_atomic(&path, &json)?;
    debug!(path = %path.display(), "wrote low scorer cache");
    Ok(path)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn format_points(points: f64) -> String {
    // Avoid printing "-0".
    if points == 0.0 {
        "0".to_string()
    } else {
        points.to_string()
    }
}

fn escape_cell(raw: &str) -> String {
    raw.replace('|', "\\|")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
