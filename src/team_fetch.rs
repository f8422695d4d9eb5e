use std::env;
use std::process::Command;

use anyhow::{Context, Result};

use crate::extract::{DiagnosticSink, extract_match_payload};
use crate::http_client::{USER_AGENT, http_client};
use crate::match_table::{MatchRow, Side};
use crate::normalize::normalize_payload;

const BASE_URL: &str = "https://understat.com";

// Display name -> URL slug for names that do not follow the plain
// space-to-underscore rule; everything else falls through to that rule.
const TEAM_URL_SLUGS: &[(&str, &str)] = &[
    ("Arsenal", "Arsenal"),
    ("Manchester United", "Manchester_United"),
    ("Manchester City", "Manchester_City"),
    ("Liverpool", "Liverpool"),
    ("Chelsea", "Chelsea"),
    ("Tottenham", "Tottenham"),
    ("Newcastle", "Newcastle_United"),
    ("Brighton", "Brighton"),
    ("Aston Villa", "Aston_Villa"),
    ("West Ham", "West_Ham"),
    ("Crystal Palace", "Crystal_Palace"),
    ("Fulham", "Fulham"),
    ("Wolves", "Wolverhampton_Wanderers"),
    ("Everton", "Everton"),
    ("Brentford", "Brentford"),
    ("Nottingham Forest", "Nottingham_Forest"),
    ("Luton", "Luton"),
    ("Burnley", "Burnley"),
    ("Sheffield United", "Sheffield_United"),
    ("Bournemouth", "Bournemouth"),
];

const BROWSER_CANDIDATES: &[&str] = &["chromium", "chromium-browser", "google-chrome"];

#[derive(Debug, Clone, Copy)]
enum AcquireMethod {
    Http,
    Browser,
}

impl AcquireMethod {
    fn label(self) -> &'static str {
        match self {
            AcquireMethod::Http => "http",
            AcquireMethod::Browser => "browser",
        }
    }
}

// Rendered fetches give page scripts this much virtual time to run before
// the DOM is dumped.
const RENDER_BUDGET_MS: u32 = 5000;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub season_fallbacks: u32,
    pub browser_bin: Option<String>,
}

impl ScrapeOptions {
    pub fn from_env() -> Self {
        Self {
            season_fallbacks: env::var("XG_SEASON_FALLBACKS")
                .ok()
                .and_then(|val| val.parse::<u32>().ok())
                .unwrap_or(1)
                .min(10),
            browser_bin: env::var("XG_BROWSER_BIN")
                .ok()
                .filter(|val| !val.trim().is_empty()),
        }
    }
}

#[derive(Debug)]
pub struct TeamScrape {
    pub team: String,
    // Season that actually produced rows; None together with rows == None.
    pub season_used: Option<String>,
    // None is the no-data outcome, distinct from the collected errors.
    pub rows: Option<Vec<MatchRow>>,
    pub errors: Vec<String>,
}

pub fn team_url_slug(team: &str) -> String {
    TEAM_URL_SLUGS
        .iter()
        .find(|(name, _)| *name == team)
        .map(|(_, slug)| (*slug).to_string())
        .unwrap_or_else(|| team.trim().replace(' ', "_"))
}

pub fn team_page_url(team: &str, season: &str) -> String {
    format!("{BASE_URL}/team/{}/{}", team_url_slug(team), season)
}

// Fast plain request first, rendered fetch second, then fallback seasons.
// Exhausting every combination is the normal no-data outcome, not an error.
pub fn scrape_team_season(
    team: &str,
    season: &str,
    opts: &ScrapeOptions,
    sink: &dyn DiagnosticSink,
) -> TeamScrape {
    let mut errors = Vec::new();

    for season in seasons_to_try(season, opts.season_fallbacks) {
        let url = team_page_url(team, &season);

        for method in [AcquireMethod::Http, AcquireMethod::Browser] {
            // The browser run only happens when the plain request produced
            // no classified match data.
            let outcome = match method {
                AcquireMethod::Http => fetch_page(&url),
                AcquireMethod::Browser => {
                    fetch_page_rendered(&url, opts.browser_bin.as_deref())
                }
            };
            let content = match outcome {
                Ok(content) => content,
                Err(err) => {
                    errors.push(format!(
                        "{team} {season} {} fetch failed: {err}",
                        method.label()
                    ));
                    continue;
                }
            };
            let Some(payload) = extract_match_payload(&content, sink) else {
                continue;
            };
            let rows = normalize_payload(&payload, Side::H);
            return TeamScrape {
                team: team.to_string(),
                season_used: Some(season),
                rows: Some(rows),
                errors,
            };
        }
    }

    TeamScrape {
        team: team.to_string(),
        season_used: None,
        rows: None,
        errors,
    }
}

fn seasons_to_try(season: &str, fallbacks: u32) -> Vec<String> {
    let mut seasons = vec![season.trim().to_string()];
    if let Ok(year) = season.trim().parse::<i32>() {
        for back in 1..=i32::try_from(fallbacks).unwrap_or(0) {
            seasons.push((year - back).to_string());
        }
    }
    seasons
}

fn fetch_page(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}"));
    }
    Ok(body)
}

// Drives a locally installed headless browser so page scripts run before the
// DOM is read. Missing browser binaries count as acquisition failures for
// this method only.
fn fetch_page_rendered(url: &str, browser_bin: Option<&str>) -> Result<String> {
    let candidates: Vec<&str> = match browser_bin {
        Some(bin) => vec![bin],
        None => BROWSER_CANDIDATES.to_vec(),
    };

    let mut last_err = anyhow::anyhow!("no browser binary configured");
    for bin in candidates {
        let output = Command::new(bin)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg(format!("--user-agent={USER_AGENT}"))
            .arg(format!("--virtual-time-budget={RENDER_BUDGET_MS}"))
            .arg("--dump-dom")
            .arg(url)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                return String::from_utf8(out.stdout).context("rendered page was not utf-8");
            }
            Ok(out) => last_err = anyhow::anyhow!("{bin} exited with {}", out.status),
            Err(err) => last_err = anyhow::anyhow!("{bin} failed to start: {err}"),
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::{seasons_to_try, team_page_url, team_url_slug};

    #[test]
    fn slug_lookup_with_fallthrough() {
        assert_eq!(team_url_slug("Wolves"), "Wolverhampton_Wanderers");
        assert_eq!(team_url_slug("Real Sociedad"), "Real_Sociedad");
        assert_eq!(
            team_page_url("Newcastle", "2024"),
            "https://understat.com/team/Newcastle_United/2024"
        );
    }

    #[test]
    fn fallback_seasons_count_down_from_requested() {
        assert_eq!(seasons_to_try("2024", 1), vec!["2024", "2023"]);
        assert_eq!(seasons_to_try("2024", 0), vec!["2024"]);
        // Non-numeric seasons cannot be decremented.
        assert_eq!(seasons_to_try("latest", 2), vec!["latest"]);
    }
}
