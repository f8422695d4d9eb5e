use std::fs;
use std::path::PathBuf;

use xg_terminal::extract::{NoopSink, extract_match_payload};
use xg_terminal::match_table::{CSV_HEADER, Side};
use xg_terminal::normalize::normalize_payload;
use xg_terminal::persist::{load_team_matches, save_team_matches};
use xg_terminal::state::summarize;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn team_page_flows_to_a_persisted_season_table() {
    let content = read_fixture("team_page.html");
    let payload = extract_match_payload(&content, &NoopSink).expect("fixture carries match data");
    let rows = normalize_payload(&payload, Side::H);
    assert_eq!(rows.len(), 4);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = save_team_matches(dir.path(), "Arsenal", "2024", &rows).expect("save");

    let content = fs::read_to_string(&path).expect("read back");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            CSV_HEADER,
            "2024-08-17,h,Arsenal,Wolves,2,0,2.5,0.3,0.3,w",
            "2024-08-24,a,Villa,Arsenal,0,2,0.9,1.6,1.6,l",
            "2024-08-31,h,Arsenal,Brighton,1,1,1.0,1.2,1.2,d",
            // Unplayed fixture: goal and xG pairs are null upstream.
            "2025-05-10,a,Man City,Arsenal,0,0,0.0,0.0,0.0,d",
        ]
    );

    let loaded = load_team_matches(dir.path(), "Arsenal", "2024")
        .expect("load")
        .expect("table exists");
    assert_eq!(loaded, rows);

    let summary = summarize(&loaded);
    assert_eq!(summary.matches, 4);
    assert_eq!(
        (summary.wins, summary.draws, summary.losses),
        (1, 2, 1),
        "the unplayed 0-0 fixture counts as a draw after defaulting"
    );
    assert_eq!(summary.total_goals, 3);
    assert!((summary.total_xg - 4.4).abs() < 1e-9);
}

#[test]
fn challenge_page_is_the_no_data_outcome() {
    let content = read_fixture("no_data_page.html");
    assert!(extract_match_payload(&content, &NoopSink).is_none());
}
