use std::collections::HashMap;

use tracing::{debug, info};

use crate::model::{
    LowScoringTeam, LowestScoringTeam, MatchupEntry, PlayerScoreRecord, SeasonTally, StatLine,
};
use crate::players::PlayerNames;
use crate::rosters::TeamDirectory;
use crate::sleeper_api::SleeperApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekOutcome {
    Processed { zero_entries: usize },
    Skipped,
}

/// Walks weeks `1..=tally.current_week` in order, pulling stats and matchups for each.
pub fn aggregate_season(
    api: &dyn SleeperApi,
    league_id: &str,
    season: &str,
    teams: &TeamDirectory,
    names: &mut PlayerNames<'_>,
    tally: &mut SeasonTally,
) {
    for week in 1..=tally.current_week {
        info!(week, "processing week");
        let stats = api.fetch_weekly_stats(season, week);
        let matchups = api.fetch_weekly_matchups(league_id, week);
        process_week(tally, week, &stats, matchups.as_deref(), teams, names);
    }
}

/// Folds one week into the tally. A week without stats or matchups leaves the tally untouched
/// apart from being listed as skipped.
pub fn process_week(
    tally: &mut SeasonTally,
    week: u32,
    stats: &HashMap<String, StatLine>,
    matchups: Option<&[MatchupEntry]>,
    teams: &TeamDirectory,
    names: &mut PlayerNames<'_>,
) -> WeekOutcome {
    let matchups = match matchups {
        Some(m) if !m.is_empty() && !stats.is_empty() => m,
        _ => {
            info!(week, "skipping week due to missing data");
            tally.skipped_weeks.push(week);
            return WeekOutcome::Skipped;
        }
    };

    let is_current = week == tally.current_week;
    let mut zero_entries = 0usize;

    for entry in matchups {
        let team_name = teams.team_name(entry.roster_id);
        for player_id in &entry.starters {
            let points = stats.get(player_id).map(StatLine::points).unwrap_or(0.0);
            if points > 0.0 {
                continue;
            }
            zero_entries += 1;
            *tally.season_zero_count.entry(entry.roster_id).or_insert(0) += 1;
            if is_current {
                let name = names.name(player_id);
                debug!(week, team = team_name, player = %name, points, "zero or less");
                tally
                    .current_week_zero
                    .entry(entry.roster_id)
                    .or_default()
                    .push(PlayerScoreRecord {
                        player_id: player_id.clone(),
                        name,
                        points,
                    });
            } else {
                debug!(week, team = team_name, player = %player_id, points, "zero or less");
            }
        }
    }

    if let Some(lowest) = lowest_scoring_team(matchups, teams) {
        tally.lowest_by_week.insert(week, lowest);
    }
    tally
        .low_scorers_by_week
        .insert(week, low_scoring_starters(matchups, teams));
    tally.processed_weeks.push(week);

    WeekOutcome::Processed { zero_entries }
}

/// Team with the smallest starter total. `None` when the week has no scoring at all yet,
/// since every team would tie at zero.
pub fn lowest_scoring_team(
    matchups: &[MatchupEntry],
    teams: &TeamDirectory,
) -> Option<LowestScoringTeam> {
    if !has_non_zero_points(matchups) {
        return None;
    }
    let mut lowest: Option<(&MatchupEntry, f64)> = None;
    for entry in matchups {
        let total = entry.starter_points_total();
        match lowest {
            Some((_, best)) if best <= total => {}
            _ => lowest = Some((entry, total)),
        }
    }
    lowest.map(|(entry, total)| LowestScoringTeam {
        roster_id: entry.roster_id,
        team_name: team_label(entry.roster_id, teams),
        total_points: total,
    })
}

/// Per team, starters whose league-scored points are zero or less. Teams without any are
/// left out.
pub fn low_scoring_starters(
    matchups: &[MatchupEntry],
    teams: &TeamDirectory,
) -> Vec<LowScoringTeam> {
    matchups
        .iter()
        .filter_map(|entry| {
            let (starters, points): (Vec<String>, Vec<f64>) = entry
                .scored_starters()
                .filter(|(_, points)| *points <= 0.0)
                .map(|(id, points)| (id.to_string(), points))
                .unzip();
            if starters.is_empty() {
                return None;
            }
            Some(LowScoringTeam {
                team_name: team_label(entry.roster_id, teams),
                low_scoring_starters: starters,
                low_scoring_points: points,
            })
        })
        .collect()
}

pub fn has_non_zero_points(matchups: &[MatchupEntry]) -> bool {
    matchups
        .iter()
        .any(|entry| entry.scored_starters().any(|(_, points)| points != 0.0))
}

fn team_label(roster_id: u32, teams: &TeamDirectory) -> String {
    if teams.contains(roster_id) {
        teams.team_name(roster_id).to_string()
    } else {
        format!("Unknown Team {roster_id}")
    }
}
