use serde_json::Value;

// Keys that show up in per-match records on team pages. Three of them in one
// record is enough to tell match data apart from the other embedded blobs
// (player tables, roster metadata, breadcrumbs).
const MATCH_FIELDS: &[&str] = &["goals", "xG", "result", "datetime", "side", "h", "a"];
const MIN_FIELD_OVERLAP: usize = 3;

pub fn looks_like_match_data(value: &Value) -> bool {
    match value {
        Value::Array(items) => items
            .first()
            .is_some_and(|first| first.as_object().is_some_and(field_overlap_ok)),
        Value::Object(map) => field_overlap_ok(map),
        _ => false,
    }
}

fn field_overlap_ok(map: &serde_json::Map<String, Value>) -> bool {
    let found = MATCH_FIELDS
        .iter()
        .filter(|field| map.contains_key(**field))
        .count();
    found >= MIN_FIELD_OVERLAP
}
