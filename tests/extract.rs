use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use xg_terminal::classify::looks_like_match_data;
use xg_terminal::extract::{DiagnosticSink, NoopSink, extract_match_payload};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

struct RecordingSink {
    labels: RefCell<Vec<String>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            labels: RefCell::new(Vec::new()),
        }
    }
}

impl DiagnosticSink for RecordingSink {
    fn capture(&self, label: &str, _value: &Value) {
        self.labels.borrow_mut().push(label.to_string());
    }
}

#[test]
fn extracts_match_payload_from_team_page_fixture() {
    let content = read_fixture("team_page.html");
    let payload = extract_match_payload(&content, &NoopSink).expect("fixture carries match data");

    let records = payload.as_array().expect("payload should be an array");
    assert_eq!(records.len(), 4);
    assert!(looks_like_match_data(&payload));
    assert_eq!(
        records[0]["h"]["title"].as_str(),
        Some("Arsenal"),
        "escaped quotes should decode into plain JSON strings"
    );
}

#[test]
fn page_without_embedded_data_yields_nothing() {
    let content = read_fixture("no_data_page.html");
    assert!(extract_match_payload(&content, &NoopSink).is_none());
}

#[test]
fn higher_priority_miss_does_not_mask_lower_priority_match() {
    // statisticsData decodes fine but is not match data; the valid payload
    // sits under the lower-priority datesData name.
    let content = concat!(
        r#"var statisticsData = JSON.parse('{"situation":{"OpenPlay":{"shots":12}}}');"#,
        "\n",
        r#"var datesData = JSON.parse('[{"datetime":"2024-08-17","side":"h","goals":{"h":"1","a":"0"}}]');"#,
    );

    let sink = RecordingSink::new();
    let payload = extract_match_payload(content, &sink).expect("datesData should be accepted");
    assert_eq!(payload[0]["side"].as_str(), Some("h"));
    assert!(
        sink.labels.borrow().iter().any(|l| l == "statisticsData"),
        "rejected candidate should reach the diagnostic sink"
    );
}

#[test]
fn decode_failure_skips_to_next_pattern() {
    let content = concat!(
        r"var statisticsData = JSON.parse('broken \x2');",
        "\n",
        r#"var matchesData = JSON.parse('[{"datetime":"2024-08-17","xG":{"h":"1.0","a":"2.0"},"goals":{"h":"0","a":"2"}}]');"#,
    );
    let payload = extract_match_payload(content, &NoopSink).expect("valid pattern should win");
    assert_eq!(payload[0]["goals"]["a"].as_str(), Some("2"));
}

#[test]
fn broad_scan_finds_assignments_no_listed_pattern_covers() {
    // Variable name carries no data token, so only the document-order scan
    // can reach it.
    let content = concat!(
        r#"var pageMeta = JSON.parse('{"league":"EPL"}');"#,
        "\n",
        r#"var fixtures = JSON.parse('[{"datetime":"2024-09-14","side":"a","goals":{"h":"2","a":"2"}}]');"#,
    );

    let sink = RecordingSink::new();
    let payload = extract_match_payload(content, &sink).expect("scan should find match data");
    assert_eq!(payload[0]["side"].as_str(), Some("a"));
    assert!(sink.labels.borrow().iter().any(|l| l == "pageMeta"));
}

#[test]
fn bare_array_literal_is_recognized() {
    let content = r#"var matchesData = [{"datetime":"2024-08-17","side":"h","goals":{"h":1,"a":0}}];"#;
    let payload = extract_match_payload(content, &NoopSink).expect("array literal should parse");
    assert_eq!(payload[0]["goals"]["h"].as_i64(), Some(1));
}
