use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use rayon::prelude::*;

use xg_terminal::extract::{DiagnosticSink, NoopSink};
use xg_terminal::persist::{self, DebugPayloadSink};
use xg_terminal::state::{DEFAULT_TEAMS, SeasonSummary, summarize};
use xg_terminal::team_fetch::{ScrapeOptions, scrape_team_season};

const DEFAULT_SEASON: &str = "2024";

struct TeamReport {
    team: String,
    season_used: Option<String>,
    path: Option<PathBuf>,
    summary: Option<SeasonSummary>,
    errors: Vec<String>,
    write_error: Option<String>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let (season, teams) = parse_args();
    let opts = ScrapeOptions::from_env();
    let data_dir = persist::data_dir();
    let debug_payloads = env::var("XG_DEBUG_PAYLOADS")
        .map(|val| val != "0")
        .unwrap_or(true);

    println!("Scraping {} team(s), season {season}", teams.len());

    let reports: Vec<TeamReport> = with_fetch_pool(|| {
        teams
            .par_iter()
            .map(|team| scrape_one(team, &season, &opts, &data_dir, debug_payloads))
            .collect()
    });

    let mut write_failures = 0usize;
    for report in &reports {
        print_report(report);
        if report.write_error.is_some() {
            write_failures += 1;
        }
    }

    if write_failures > 0 {
        return Err(anyhow!("{write_failures} table(s) could not be written"));
    }
    Ok(())
}

fn scrape_one(
    team: &str,
    season: &str,
    opts: &ScrapeOptions,
    data_dir: &Path,
    debug_payloads: bool,
) -> TeamReport {
    let sink: Box<dyn DiagnosticSink> = if debug_payloads {
        Box::new(DebugPayloadSink::new(data_dir))
    } else {
        Box::new(NoopSink)
    };

    let scrape = scrape_team_season(team, season, opts, sink.as_ref());

    let mut report = TeamReport {
        team: scrape.team,
        season_used: scrape.season_used.clone(),
        path: None,
        summary: None,
        errors: scrape.errors,
        write_error: None,
    };

    let (Some(rows), Some(season_used)) = (scrape.rows, scrape.season_used) else {
        return report;
    };

    report.summary = Some(summarize(&rows));
    match persist::save_team_matches(data_dir, &report.team, &season_used, &rows) {
        Ok(path) => report.path = Some(path),
        Err(err) => report.write_error = Some(err.to_string()),
    }
    report
}

fn print_report(report: &TeamReport) {
    match (&report.summary, &report.season_used) {
        (Some(summary), Some(season)) => {
            println!(
                "{}: {} matches ({}W-{}D-{}L), season {season}",
                report.team, summary.matches, summary.wins, summary.draws, summary.losses
            );
            if let Some(path) = &report.path {
                println!("  saved to {}", path.display());
            }
        }
        _ => println!("{}: no data found", report.team),
    }
    if let Some(err) = &report.write_error {
        println!("  write failed: {err}");
    }
    for err in &report.errors {
        println!("  note: {err}");
    }
}

fn parse_args() -> (String, Vec<String>) {
    let mut season = env::var("XG_SEASON")
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SEASON.to_string());
    let mut teams = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--season" {
            if let Some(value) = args.next() {
                season = value;
            }
        } else if let Some(value) = arg.strip_prefix("--season=") {
            season = value.to_string();
        } else {
            teams.push(arg);
        }
    }

    if teams.is_empty() {
        teams = DEFAULT_TEAMS.iter().map(|team| (*team).to_string()).collect();
    }
    (season, teams)
}

fn with_fetch_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let threads = fetch_parallelism();
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(2, 32)
}
