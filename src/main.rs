use anyhow::Result;
use chrono::Local;

use ice_report::config::Config;
use ice_report::fake_api::FakeSleeper;
use ice_report::logging::init_logging;
use ice_report::pipeline;
use ice_report::sleeper_api::{SleeperApi, SleeperClient};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging("info")?;

    let config = Config::from_env_and_args()?;
    let api: Box<dyn SleeperApi> = match config.fixtures_dir.as_deref() {
        Some(dir) => Box::new(FakeSleeper::from_dir(dir)?),
        None => Box::new(SleeperClient::new(config.api_base.clone())),
    };

    let summary = pipeline::run(&config, api.as_ref(), Local::now().date_naive())?;

    println!("Week {} complete ({} teams)", summary.current_week, summary.teams);
    println!("Processed weeks: {:?}", summary.processed_weeks);
    if !summary.skipped_weeks.is_empty() {
        println!("Skipped weeks: {:?}", summary.skipped_weeks);
    }
    if let Some(path) = &summary.summary_path {
        println!("Summary for Week {} has been saved to {}", summary.current_week, path.display());
    }
    if let Some(path) = &summary.weekly_path {
        println!("Results have been written to {}", path.display());
    }
    Ok(())
}
