use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::aggregate::aggregate_season;
use crate::config::Config;
use crate::model::SeasonTally;
use crate::players::PlayerNames;
use crate::report::{build_weekly_results, write_weekly_results, write_zero_points_summary};
use crate::rosters::TeamDirectory;
use crate::sleeper_api::SleeperApi;

/// What to do when the current week can't be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekMode {
    /// Fall back to week 1.
    #[default]
    Fallback,
    /// Abort the run.
    Strict,
}

impl FromStr for WeekMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fallback" | "soft" => Ok(Self::Fallback),
            "strict" | "hard" => Ok(Self::Strict),
            other => Err(anyhow!("unknown week mode: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub current_week: u32,
    pub teams: usize,
    pub processed_weeks: Vec<u32>,
    pub skipped_weeks: Vec<u32>,
    pub summary_path: Option<PathBuf>,
    pub weekly_path: Option<PathBuf>,
}

pub fn resolve_current_week(
    api: &dyn SleeperApi,
    mode: WeekMode,
    week_override: Option<u32>,
) -> Result<u32> {
    if let Some(week) = week_override {
        info!(week, "using configured week");
        return Ok(week);
    }
    // Week 0 is the preseason state; there is nothing to report on yet.
    let fetched = api.fetch_current_week().filter(|week| *week > 0);
    match (fetched, mode) {
        (Some(week), _) => Ok(week),
        (None, WeekMode::Fallback) => {
            warn!("no usable current NFL week, defaulting to week 1");
            Ok(1)
        }
        (None, WeekMode::Strict) => bail!("failed to determine the current week"),
    }
}

pub fn run(config: &Config, api: &dyn SleeperApi, today: NaiveDate) -> Result<RunSummary> {
    let current_week = resolve_current_week(api, config.week_mode, config.week_override)?;
    info!(current_week, league_id = %config.league_id, season = %config.season, "starting run");

    let teams = TeamDirectory::resolve(api, &config.league_id)
        .context("failed to fetch league data")?;

    let mut names = PlayerNames::new(api, config.name_lookup);
    let mut tally = SeasonTally::new(current_week);
    aggregate_season(
        api,
        &config.league_id,
        &config.season,
        &teams,
        &mut names,
        &mut tally,
    );

    let summary_path = if config.reports.writes_summary() {
        Some(write_zero_points_summary(
            &config.output_dir,
            today,
            &tally,
            &teams,
        )?)
    } else {
        None
    };

    let weekly_path = if config.reports.writes_weekly() {
        let results = build_weekly_results(&tally, &config.cache_dir, &mut names);
        for result in &results {
            info!(
                week = result.week,
                team = %result.team,
                score = result.score,
                "lowest scoring team"
            );
        }
        Some(write_weekly_results(&config.output_dir, today, &results)?)
    } else {
        None
    };

    Ok(RunSummary {
        current_week,
        teams: teams.len(),
        processed_weeks: tally.processed_weeks,
        skipped_weeks: tally.skipped_weeks,
        summary_path,
        weekly_path,
    })
}
