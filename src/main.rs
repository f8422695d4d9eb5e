use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
};

use xg_terminal::match_table::{MatchRow, Outcome, Side};
use xg_terminal::persist;
use xg_terminal::state::{AppState, SeasonSummary};

struct App {
    state: AppState,
    data_dir: PathBuf,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        let data_dir = persist::data_dir();
        let tables = persist::list_saved_tables(&data_dir);
        let mut app = Self {
            state: AppState::new(&tables),
            data_dir,
            should_quit: false,
        };
        app.reload();
        app
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.state.cycle_team();
                self.reload();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.state.cycle_season();
                self.reload();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn reload(&mut self) {
        let team = self.state.selected_team().to_string();
        let season = self.state.selected_season().to_string();
        match persist::load_team_matches(&self.data_dir, &team, &season) {
            Ok(Some(rows)) => {
                let count = rows.len();
                self.state.set_rows(Some(rows));
                self.state
                    .push_log(format!("[INFO] Loaded {count} matches for {team} {season}"));
            }
            Ok(None) => {
                self.state.set_rows(None);
                self.state
                    .push_log(format!("[INFO] No table for {team} {season}"));
            }
            Err(err) => {
                self.state.set_rows(None);
                self.state.push_log(format!(
                    "[WARN] Could not read table for {team} {season}: {err}"
                ));
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.rows.as_deref() {
        Some(rows) => render_dashboard(frame, chunks[1], app, rows),
        None => render_no_data(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text()).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!(
        "  __   XG TERMINAL | {} | {} season",
        state.selected_team(),
        state.selected_season()
    );
    let line2 = " |xG|  goals and expected goals from saved match tables".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text() -> String {
    "t Team | s Season | r Reload | j/k/↑/↓ Scroll | ? Help | q Quit".to_string()
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &App, rows: &[MatchRow]) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(5),
        ])
        .split(area);

    if let Some(summary) = app.state.summary() {
        render_summary_tiles(frame, sections[0], &summary);
    }

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(26)])
        .split(sections[1]);

    render_xg_chart(frame, middle[0], rows);
    render_outcome_bars(frame, middle[1], app.state.summary());

    render_match_table(frame, sections[2], &app.state, rows);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[3]);
}

fn render_summary_tiles(frame: &mut Frame, area: Rect, summary: &SeasonSummary) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
        ])
        .split(area);

    let tiles = [
        ("Matches", summary.matches.to_string(), Color::White),
        ("Wins", summary.wins.to_string(), Color::Green),
        ("Draws", summary.draws.to_string(), Color::Yellow),
        ("Losses", summary.losses.to_string(), Color::Red),
        ("Goals", summary.total_goals.to_string(), Color::White),
        ("xG", format!("{:.1}", summary.total_xg), Color::White),
    ];

    for (i, (label, value, color)) in tiles.into_iter().enumerate() {
        let tile = Paragraph::new(value)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().title(label).borders(Borders::ALL));
        frame.render_widget(tile, cols[i]);
    }
}

fn render_xg_chart(frame: &mut Frame, area: Rect, rows: &[MatchRow]) {
    let xg_points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64 + 1.0, row.xg_for))
        .collect();
    let goal_points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64 + 1.0, f64::from(row.goals_for)))
        .collect();

    let max_y = xg_points
        .iter()
        .chain(goal_points.iter())
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max)
        .ceil()
        .max(1.0);
    let max_x = (rows.len() as f64).max(2.0);

    let datasets = vec![
        Dataset::default()
            .name("xG for")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&xg_points),
        Dataset::default()
            .name("Goals for")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&goal_points),
    ];

    let x_labels = vec![
        Span::from(date_label(rows.first())),
        Span::from(date_label(rows.last())),
    ];
    let y_labels = vec![
        Span::from("0"),
        Span::from(format!("{:.1}", max_y / 2.0)),
        Span::from(format!("{max_y:.1}")),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title("xG vs Goals Over Time")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Match")
                .bounds([1.0, max_x])
                .labels(x_labels),
        )
        .y_axis(Axis::default().bounds([0.0, max_y]).labels(y_labels));

    frame.render_widget(chart, area);
}

fn date_label(row: Option<&MatchRow>) -> String {
    row.and_then(|r| r.date)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_outcome_bars(frame: &mut Frame, area: Rect, summary: Option<SeasonSummary>) {
    let Some(summary) = summary else {
        return;
    };

    let bars = [
        ("W", summary.wins, Color::Green),
        ("D", summary.draws, Color::Yellow),
        ("L", summary.losses, Color::Red),
    ]
    .map(|(label, value, color)| {
        Bar::default()
            .value(value as u64)
            .label(label.into())
            .style(Style::default().fg(color))
    });

    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Result Breakdown")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(2);
    frame.render_widget(chart, area);
}

fn render_match_table(frame: &mut Frame, area: Rect, state: &AppState, rows: &[MatchRow]) {
    let block = Block::default().title("Match Data").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 2 || inner.width == 0 {
        return;
    }

    let header = format!(
        "{:<10} {:^3} {:<28} {:>5} {:>9} {:^3}",
        "Date", "H/A", "Match", "Score", "xG", "Res"
    );
    let header_area = Rect { height: 1, ..inner };
    frame.render_widget(
        Paragraph::new(header).style(Style::default().add_modifier(Modifier::BOLD)),
        header_area,
    );

    let visible = (inner.height - 1) as usize;
    let start = state.table_scroll.min(rows.len().saturating_sub(1));
    let end = (start + visible).min(rows.len());

    let lines: Vec<String> = rows[start..end].iter().map(match_line).collect();
    let list_area = Rect {
        y: inner.y + 1,
        height: inner.height - 1,
        ..inner
    };
    frame.render_widget(Paragraph::new(lines.join("\n")), list_area);
}

fn match_line(row: &MatchRow) -> String {
    let date = row
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let side = match row.h_a {
        Side::H => "h",
        Side::A => "a",
    };
    let result = match row.result {
        Outcome::W => "W",
        Outcome::D => "D",
        Outcome::L => "L",
    };
    format!(
        "{:<10} {:^3} {:<28} {:>5} {:>9} {:^3}",
        date,
        side,
        format!("{} vs {}", row.team_h, row.team_a),
        format!("{}-{}", row.goals_for, row.goals_against),
        format!("{:.1}-{:.1}", row.xg_for, row.xg_against),
        result
    )
}

fn render_no_data(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = format!(
        "No data available for {} in {}\n\nRun: scrape --season {} \"{}\"",
        state.selected_team(),
        state.selected_season(),
        state.selected_season(),
        state.selected_team()
    );
    let message = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Match Stats").borders(Borders::ALL));
    frame.render_widget(message, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state.logs[start..].join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "XG Terminal - Help",
        "",
        "  t            Next team",
        "  s            Next season",
        "  r            Reload table from disk",
        "  j/k or ↑/↓   Scroll match table",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Tables are written by the scrape binary into the data",
        "directory (XG_DATA_DIR, default ./data).",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
