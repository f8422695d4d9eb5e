use std::fs;

use chrono::NaiveDate;

use xg_terminal::match_table::{CSV_HEADER, MatchRow, Outcome, Side};
use xg_terminal::persist::{
    SavedTable, list_saved_tables, load_team_matches, save_team_matches, table_path,
};

fn sample_rows() -> Vec<MatchRow> {
    vec![
        MatchRow {
            date: NaiveDate::from_ymd_opt(2024, 8, 17),
            h_a: Side::H,
            team_h: "Arsenal".to_string(),
            team_a: "Chelsea".to_string(),
            goals_for: 2,
            goals_against: 1,
            xg_for: 1.8,
            xg_against: 0.9,
            xga: 0.9,
            result: Outcome::W,
        },
        MatchRow {
            date: None,
            h_a: Side::A,
            team_h: "Spurs".to_string(),
            team_a: "Arsenal".to_string(),
            goals_for: 0,
            goals_against: 0,
            xg_for: 0.0,
            xg_against: 0.0,
            xga: 0.0,
            result: Outcome::D,
        },
    ]
}

#[test]
fn saved_table_has_exact_header_and_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = save_team_matches(dir.path(), "Arsenal", "2024", &sample_rows()).expect("save");

    assert_eq!(path, table_path(dir.path(), "Arsenal", "2024"));
    let content = fs::read_to_string(&path).expect("read back");
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(
        lines.next(),
        Some("2024-08-17,h,Arsenal,Chelsea,2,1,1.8,0.9,0.9,w")
    );
    assert_eq!(lines.next(), Some(",a,Spurs,Arsenal,0,0,0.0,0.0,0.0,d"));
    assert_eq!(lines.next(), None);
}

#[test]
fn load_round_trips_saved_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let rows = sample_rows();
    save_team_matches(dir.path(), "Arsenal", "2024", &rows).expect("save");

    let loaded = load_team_matches(dir.path(), "Arsenal", "2024")
        .expect("load")
        .expect("table exists");
    assert_eq!(loaded, rows);
}

#[test]
fn missing_table_is_a_normal_no_data_outcome() {
    let dir = tempfile::tempdir().expect("temp dir");
    let loaded = load_team_matches(dir.path(), "Arsenal", "1999").expect("load should not fail");
    assert!(loaded.is_none());
}

#[test]
fn empty_season_still_writes_a_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = save_team_matches(dir.path(), "Luton", "2024", &[]).expect("save");
    let content = fs::read_to_string(path).expect("read back");
    assert_eq!(content.trim_end(), CSV_HEADER);
}

#[test]
fn listing_reflects_saved_tables() {
    let dir = tempfile::tempdir().expect("temp dir");
    save_team_matches(dir.path(), "Sheffield United", "2023", &sample_rows()).expect("save");
    save_team_matches(dir.path(), "Arsenal", "2024", &sample_rows()).expect("save");
    // Unrelated files are ignored.
    fs::write(dir.path().join("notes.txt"), "scratch").expect("write");

    let tables = list_saved_tables(dir.path());
    assert_eq!(
        tables,
        vec![
            SavedTable {
                team: "Arsenal".to_string(),
                season: "2024".to_string(),
            },
            SavedTable {
                team: "Sheffield United".to_string(),
                season: "2023".to_string(),
            },
        ]
    );
}
