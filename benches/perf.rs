use std::collections::HashMap;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use ice_report::aggregate::{low_scoring_starters, lowest_scoring_team, process_week};
use ice_report::fake_api::FakeSleeper;
use ice_report::model::{MatchupEntry, SeasonTally, StatLine};
use ice_report::players::{NameLookup, PlayerNames};
use ice_report::rosters::TeamDirectory;
use ice_report::sleeper_api::{parse_matchups_json, parse_stats_json};

const TEAMS: u32 = 12;
const STARTERS: u32 = 10;

fn sample_matchups() -> Vec<MatchupEntry> {
    (1..=TEAMS)
        .map(|roster_id| {
            let starters = (0..STARTERS)
                .map(|slot| format!("{}", roster_id * 100 + slot))
                .collect::<Vec<_>>();
            let starters_points = (0..STARTERS)
                .map(|slot| Some(((roster_id + slot) % 7) as f64 - 1.0))
                .collect::<Vec<_>>();
            MatchupEntry {
                roster_id,
                matchup_id: Some((roster_id + 1) / 2),
                starters,
                starters_points,
                points: None,
            }
        })
        .collect()
}

fn sample_stats(matchups: &[MatchupEntry]) -> HashMap<String, StatLine> {
    matchups
        .iter()
        .flat_map(|m| m.scored_starters())
        .map(|(id, pts)| (id.to_string(), StatLine { pts_ppr: Some(pts) }))
        .collect()
}

fn bench_parse_week(c: &mut Criterion) {
    let matchups = sample_matchups();
    let matchups_json = serde_json::to_string(
        &matchups
            .iter()
            .map(|m| {
                serde_json::json!({
                    "roster_id": m.roster_id,
                    "matchup_id": m.matchup_id,
                    "starters": m.starters,
                    "starters_points": m.starters_points,
                })
            })
            .collect::<Vec<_>>(),
    )
    .unwrap();
    let stats_json = serde_json::to_string(
        &sample_stats(&matchups)
            .into_iter()
            .map(|(id, line)| (id, serde_json::json!({ "pts_ppr": line.pts_ppr })))
            .collect::<HashMap<_, _>>(),
    )
    .unwrap();

    c.bench_function("parse_week_payloads", |b| {
        b.iter(|| {
            let m = parse_matchups_json(black_box(&matchups_json)).unwrap();
            let s = parse_stats_json(black_box(&stats_json)).unwrap();
            black_box((m.len(), s.len()));
        })
    });
}

fn bench_process_week(c: &mut Criterion) {
    let matchups = sample_matchups();
    let stats = sample_stats(&matchups);
    let teams = TeamDirectory::default();
    let api = FakeSleeper::new();

    c.bench_function("process_week", |b| {
        b.iter(|| {
            let mut names = PlayerNames::new(&api, NameLookup::Single);
            let mut tally = SeasonTally::new(2);
            for week in 1..=2 {
                process_week(
                    &mut tally,
                    week,
                    black_box(&stats),
                    Some(matchups.as_slice()),
                    &teams,
                    &mut names,
                );
            }
            black_box(tally.season_zero_count.len());
        })
    });

    c.bench_function("lowest_and_low_scorers", |b| {
        b.iter(|| {
            let lowest = lowest_scoring_team(black_box(&matchups), &teams);
            let low = low_scoring_starters(black_box(&matchups), &teams);
            black_box((lowest, low.len()));
        })
    });
}

criterion_group!(benches, bench_parse_week, bench_process_week);
criterion_main!(benches);
