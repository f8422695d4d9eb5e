use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::extract::DiagnosticSink;
use crate::match_table::MatchRow;

const DEBUG_DIR: &str = "debug";

pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XG_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from("data")
}

pub fn team_slug(team: &str) -> String {
    team.trim().to_lowercase().replace(' ', "_")
}

pub fn table_path(dir: &Path, team: &str, season: &str) -> PathBuf {
    dir.join(format!("{}_matches_{}.csv", team_slug(team), season))
}

pub fn save_team_matches(
    dir: &Path,
    team: &str,
    season: &str,
    rows: &[MatchRow],
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create data dir {}", dir.display()))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        // serialize() emits the header implicitly; an empty season still
        // gets a well-formed table.
        writer
            .write_record(crate::match_table::CSV_HEADER.split(','))
            .context("write match table header")?;
    }
    for row in rows {
        writer.serialize(row).context("serialize match row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("flush match table: {err}"))?;

    let path = table_path(dir, team, season);
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, bytes).with_context(|| format!("write match table {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("swap match table {}", path.display()))?;
    Ok(path)
}

// Absent table is the normal "nothing scraped for this selection" case.
pub fn load_team_matches(dir: &Path, team: &str, season: &str) -> Result<Option<Vec<MatchRow>>> {
    let path = table_path(dir, team, season);
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("open match table {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: MatchRow =
            record.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(row);
    }
    Ok(Some(rows))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTable {
    pub team: String,
    pub season: String,
}

// Scans the data directory so the dashboard selectors reflect what has
// actually been scraped.
pub fn list_saved_tables(dir: &Path) -> Vec<SavedTable> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut tables = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(stem) = name.strip_suffix(".csv") else {
            continue;
        };
        let Some((slug, season)) = stem.rsplit_once("_matches_") else {
            continue;
        };
        if slug.is_empty() || season.is_empty() {
            continue;
        }
        tables.push(SavedTable {
            team: display_name(slug),
            season: season.to_string(),
        });
    }
    tables.sort_by(|a, b| a.team.cmp(&b.team).then(a.season.cmp(&b.season)));
    tables
}

fn display_name(slug: &str) -> String {
    slug.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// Writes decoded-but-unclassified payloads for later inspection. Run-unique
// file names keep parallel scrapes from clobbering each other; failures are
// swallowed because diagnostics must never abort a scrape.
pub struct DebugPayloadSink {
    dir: PathBuf,
    run_id: String,
}

impl DebugPayloadSink {
    pub fn new(data_dir: &Path) -> Self {
        // Timestamp + pid + counter keeps names unique across parallel
        // scrapes in the same process.
        static RUN_COUNTER: AtomicUsize = AtomicUsize::new(0);
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let run = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            dir: data_dir.join(DEBUG_DIR),
            run_id: format!("{secs}_{}_{run}", std::process::id()),
        }
    }
}

impl DiagnosticSink for DebugPayloadSink {
    fn capture(&self, label: &str, value: &Value) {
        let _ = fs::create_dir_all(&self.dir);
        let Ok(json) = serde_json::to_string_pretty(value) else {
            return;
        };
        let path = self.dir.join(format!("{label}_{}.json", self.run_id));
        let _ = fs::write(path, json);
    }
}
