use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, Local};

use crate::pipeline::WeekMode;
use crate::players::NameLookup;
use crate::report::ReportMode;
use crate::sleeper_api::DEFAULT_API_BASE;

const FLAGS: &[&str] = &[
    "--league-id",
    "--season",
    "--api-base",
    "--week",
    "--week-mode",
    "--report",
    "--names",
    "--out",
    "--cache-dir",
    "--fixtures",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub league_id: String,
    pub season: String,
    pub api_base: String,
    pub week_override: Option<u32>,
    pub week_mode: WeekMode,
    pub reports: ReportMode,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub name_lookup: NameLookup,
    /// Replay directory used in place of the live API.
    pub fixtures_dir: Option<PathBuf>,
}

impl Config {
    /// Environment first (after `.env` files are loaded by the caller), command-line flags
    /// override.
    pub fn from_env_and_args() -> Result<Self> {
        let args = env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(|key| env::var(key).ok(), &args)
    }

    pub fn from_sources(env_lookup: impl Fn(&str) -> Option<String>, args: &[String]) -> Result<Self> {
        check_args(args)?;
        let setting = |flag: &str, key: &str| -> Option<String> {
            arg_value(args, flag)
                .or_else(|| env_lookup(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let league_id = setting("--league-id", "SLEEPER_LEAGUE_ID")
            .context("league id not configured (set SLEEPER_LEAGUE_ID or pass --league-id)")?;
        let season = setting("--season", "SLEEPER_SEASON")
            .unwrap_or_else(|| Local::now().year().to_string());
        let api_base =
            setting("--api-base", "SLEEPER_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let week_override = setting("--week", "ICE_WEEK")
            .map(|raw| {
                raw.parse::<u32>()
                    .ok()
                    .filter(|week| *week > 0)
                    .ok_or_else(|| anyhow!("invalid week: {raw}"))
            })
            .transpose()?;
        let week_mode = setting("--week-mode", "ICE_WEEK_MODE")
            .map(|raw| raw.parse::<WeekMode>())
            .transpose()?
            .unwrap_or_default();
        let reports = setting("--report", "ICE_REPORTS")
            .map(|raw| raw.parse::<ReportMode>())
            .transpose()?
            .unwrap_or_default();
        let name_lookup = setting("--names", "ICE_NAME_LOOKUP")
            .map(|raw| raw.parse::<NameLookup>())
            .transpose()?
            .unwrap_or_default();

        let output_dir = setting("--out", "ICE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let cache_dir = setting("--cache-dir", "ICE_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| output_dir.clone());
        let fixtures_dir = setting("--fixtures", "ICE_FIXTURES_DIR").map(PathBuf::from);

        Ok(Self {
            league_id,
            season,
            api_base,
            week_override,
            week_mode,
            reports,
            output_dir,
            cache_dir,
            name_lookup,
            fixtures_dir,
        })
    }
}

/// Every argument must be a known flag followed by its value.
fn check_args(args: &[String]) -> Result<()> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (arg.as_str(), false),
        };
        if !flag.starts_with("--") {
            bail!("unexpected argument: {arg}");
        }
        if !FLAGS.contains(&flag) {
            bail!("unknown flag: {flag}");
        }
        if !inline && iter.next().is_none() {
            bail!("missing value for {flag}");
        }
    }
    Ok(())
}

/// Accepts both `--flag=value` and `--flag value`.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value.to_string());
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
        {
            return Some(next.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn league_id_is_required() {
        let err = Config::from_sources(env_of(&[]), &[]).unwrap_err();
        assert!(err.to_string().contains("league id"));
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_sources(env_of(&[("SLEEPER_LEAGUE_ID", "42")]), &[]).unwrap();
        assert_eq!(cfg.league_id, "42");
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.week_override, None);
        assert_eq!(cfg.week_mode, WeekMode::Fallback);
        assert_eq!(cfg.reports, ReportMode::Both);
        assert_eq!(cfg.name_lookup, NameLookup::Single);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert_eq!(cfg.cache_dir, cfg.output_dir);
        assert!(cfg.fixtures_dir.is_none());
        assert_eq!(cfg.season.len(), 4);
    }

    #[test]
    fn flags_override_env() {
        let env = env_of(&[
            ("SLEEPER_LEAGUE_ID", "42"),
            ("SLEEPER_SEASON", "2023"),
            ("ICE_OUTPUT_DIR", "/tmp/env"),
        ]);
        let cfg = Config::from_sources(
            env,
            &args(&[
                "--season=2024",
                "--week",
                "6",
                "--week-mode",
                "strict",
                "--report=summary",
                "--names=directory",
                "--out",
                "/tmp/flag",
            ]),
        )
        .unwrap();
        assert_eq!(cfg.season, "2024");
        assert_eq!(cfg.week_override, Some(6));
        assert_eq!(cfg.week_mode, WeekMode::Strict);
        assert_eq!(cfg.reports, ReportMode::Summary);
        assert_eq!(cfg.name_lookup, NameLookup::Directory);
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/flag"));
        assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/flag"));
    }

    #[test]
    fn rejects_bad_values() {
        let env = env_of(&[("SLEEPER_LEAGUE_ID", "42")]);
        assert!(Config::from_sources(&env, &args(&["--week=0"])).is_err());
        assert!(Config::from_sources(&env, &args(&["--week=six"])).is_err());
        assert!(Config::from_sources(&env, &args(&["--report=pdf"])).is_err());
        assert!(Config::from_sources(&env, &args(&["--week-mode=lenient"])).is_err());
    }

    #[test]
    fn rejects_unknown_flags_and_stray_arguments() {
        let env = env_of(&[("SLEEPER_LEAGUE_ID", "42")]);
        let err = Config::from_sources(&env, &args(&["--leage-id", "7"])).unwrap_err();
        assert!(err.to_string().contains("unknown flag: --leage-id"));
        let err = Config::from_sources(&env, &args(&["report.md"])).unwrap_err();
        assert!(err.to_string().contains("unexpected argument"));
        assert!(Config::from_sources(&env, &args(&["--week"])).is_err());
        assert!(Config::from_sources(&env, &args(&["--week-mode=strict", "--out", "/tmp/x"])).is_ok());
    }

    #[test]
    fn similar_flag_prefix_is_not_matched() {
        assert_eq!(arg_value(&args(&["--weeks=3"]), "--week"), None);
        assert_eq!(arg_value(&args(&["--week=3"]), "--week"), Some("3".to_string()));
    }
}
