use crate::match_table::{MatchRow, Outcome};
use crate::persist::SavedTable;

const MAX_LOG_LINES: usize = 50;

pub const DEFAULT_TEAMS: &[&str] = &["Arsenal", "Chelsea"];
pub const DEFAULT_SEASONS: &[&str] = &["2024"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonSummary {
    pub matches: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub total_goals: u32,
    pub total_xg: f64,
}

// Aggregates are derived by filtering/summing the persisted columns only;
// nothing here goes back to the scraper.
pub fn summarize(rows: &[MatchRow]) -> SeasonSummary {
    SeasonSummary {
        matches: rows.len(),
        wins: rows.iter().filter(|r| r.result == Outcome::W).count(),
        draws: rows.iter().filter(|r| r.result == Outcome::D).count(),
        losses: rows.iter().filter(|r| r.result == Outcome::L).count(),
        total_goals: rows.iter().map(|r| r.goals_for).sum(),
        total_xg: rows.iter().map(|r| r.xg_for).sum(),
    }
}

pub struct AppState {
    pub teams: Vec<String>,
    pub seasons: Vec<String>,
    pub team_idx: usize,
    pub season_idx: usize,
    // None renders the explicit no-data state for the current selection.
    pub rows: Option<Vec<MatchRow>>,
    pub table_scroll: usize,
    pub logs: Vec<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(tables: &[SavedTable]) -> Self {
        let mut teams: Vec<String> = tables.iter().map(|t| t.team.clone()).collect();
        teams.dedup();
        if teams.is_empty() {
            teams = DEFAULT_TEAMS.iter().map(|t| (*t).to_string()).collect();
        }

        let mut seasons: Vec<String> = tables.iter().map(|t| t.season.clone()).collect();
        seasons.sort();
        seasons.dedup();
        if seasons.is_empty() {
            seasons = DEFAULT_SEASONS.iter().map(|s| (*s).to_string()).collect();
        }

        Self {
            teams,
            seasons,
            team_idx: 0,
            season_idx: 0,
            rows: None,
            table_scroll: 0,
            logs: Vec::new(),
            help_overlay: false,
        }
    }

    pub fn selected_team(&self) -> &str {
        &self.teams[self.team_idx]
    }

    pub fn selected_season(&self) -> &str {
        &self.seasons[self.season_idx]
    }

    pub fn cycle_team(&mut self) {
        self.team_idx = (self.team_idx + 1) % self.teams.len();
    }

    pub fn cycle_season(&mut self) {
        self.season_idx = (self.season_idx + 1) % self.seasons.len();
    }

    // Rows are kept date-sorted for the chart and table; the source does not
    // guarantee chronological order. Dateless rows sort first.
    pub fn set_rows(&mut self, rows: Option<Vec<MatchRow>>) {
        self.rows = rows.map(|mut rows| {
            rows.sort_by_key(|row| row.date);
            rows
        });
        self.table_scroll = 0;
    }

    pub fn summary(&self) -> Option<SeasonSummary> {
        self.rows.as_deref().map(summarize)
    }

    pub fn scroll_down(&mut self) {
        let total = self.rows.as_deref().map(|rows| rows.len()).unwrap_or(0);
        if self.table_scroll + 1 < total {
            self.table_scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.table_scroll = self.table_scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
        if self.logs.len() > MAX_LOG_LINES {
            let excess = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(..excess);
        }
    }
}
