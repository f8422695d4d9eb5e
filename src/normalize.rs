use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::match_table::{MatchRow, Outcome, Side};

// Long-form names shortened for display; anything absent passes through.
const TEAM_SHORT_NAMES: &[(&str, &str)] = &[
    ("Nottingham Forest", "Forest"),
    ("Manchester United", "Man United"),
    ("Manchester City", "Man City"),
    ("Tottenham", "Spurs"),
    ("Newcastle United", "Newcastle"),
    ("West Ham United", "West Ham"),
    ("Aston Villa", "Villa"),
    ("Brighton & Hove Albion", "Brighton"),
    ("Crystal Palace", "Palace"),
    ("Sheffield United", "Sheffield Utd"),
    ("Wolverhampton Wanderers", "Wolves"),
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// A nested sub-structure in a raw record shows up as a keyed record, a bare
// scalar, or not at all depending on the page vintage.
enum NestedField<'a> {
    Missing,
    Scalar(String),
    Keyed(&'a Map<String, Value>),
}

pub fn normalize_payload(payload: &Value, default_side: Side) -> Vec<MatchRow> {
    match payload {
        Value::Array(items) => normalize_records(items, default_side),
        Value::Object(_) => normalize_record(payload, default_side)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_records(records: &[Value], default_side: Side) -> Vec<MatchRow> {
    records
        .iter()
        .filter_map(|record| normalize_record(record, default_side))
        .collect()
}

// Total over malformed records: every per-field failure degrades to a
// default, and only a record that is not keyed at all is dropped.
fn normalize_record(record: &Value, default_side: Side) -> Option<MatchRow> {
    let record = record.as_object()?;

    let side = match record.get("side").and_then(Value::as_str) {
        Some("h") => Side::H,
        Some("a") => Side::A,
        _ => default_side,
    };

    let date = record
        .get("datetime")
        .and_then(Value::as_str)
        .and_then(parse_match_date);

    let team_h = short_team_name(team_title(nested_field(record, "h")));
    let team_a = short_team_name(team_title(nested_field(record, "a")));

    let (goals_for, goals_against) =
        orient(goal_pair(&nested_field(record, "goals")).unwrap_or((0, 0)), side);
    let (xg_h, xg_a) = xg_pair(&nested_field(record, "xG")).unwrap_or((0.0, 0.0));
    let (xg_for, xg_against) = orient((round1(xg_h), round1(xg_a)), side);

    Some(MatchRow {
        date,
        h_a: side,
        team_h,
        team_a,
        goals_for,
        goals_against,
        xg_for,
        xg_against,
        xga: xg_against,
        result: Outcome::from_goals(goals_for, goals_against),
    })
}

fn nested_field<'a>(record: &'a Map<String, Value>, key: &str) -> NestedField<'a> {
    match record.get(key) {
        Some(Value::Object(map)) => NestedField::Keyed(map),
        Some(Value::String(s)) if !s.is_empty() => NestedField::Scalar(s.clone()),
        Some(Value::Number(n)) => NestedField::Scalar(n.to_string()),
        Some(Value::Bool(b)) => NestedField::Scalar(b.to_string()),
        _ => NestedField::Missing,
    }
}

fn team_title(field: NestedField<'_>) -> String {
    match field {
        NestedField::Missing => "Unknown".to_string(),
        NestedField::Scalar(text) => text,
        NestedField::Keyed(map) => match map.get("title") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "Unknown".to_string(),
        },
    }
}

fn short_team_name(name: String) -> String {
    TEAM_SHORT_NAMES
        .iter()
        .find(|(long, _)| *long == name)
        .map(|(_, short)| (*short).to_string())
        .unwrap_or(name)
}

fn goal_pair(field: &NestedField<'_>) -> Option<(u32, u32)> {
    let NestedField::Keyed(map) = field else {
        return None;
    };
    Some((parse_goals(map.get("h")?)?, parse_goals(map.get("a")?)?))
}

fn parse_goals(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => u32::try_from(n.as_u64()?).ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn xg_pair(field: &NestedField<'_>) -> Option<(f64, f64)> {
    let NestedField::Keyed(map) = field else {
        return None;
    };
    Some((parse_xg(map.get("h")?)?, parse_xg(map.get("a")?)?))
}

fn parse_xg(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn orient<T>(pair: (T, T), side: Side) -> (T, T) {
    match side {
        Side::H => pair,
        Side::A => (pair.1, pair.0),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}
