use chrono::Utc;
use pt_types::PriceEntry;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write snapshot file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct Snapshot<'a> {
    data: &'a HashMap<String, PriceEntry>,
    #[serde(rename = "timeTaken")]
    time_taken: f64,
    fetch_timestamp: String,
}

/// Persists the full price store to a single JSON file, replacing the
/// previous content on every write. The file is never read back on startup.
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> SnapshotWriter {
        SnapshotWriter { path: path.into() }
    }

    pub fn write(&self, entries: &HashMap<String, PriceEntry>) -> Result<(), SnapshotError> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let snapshot = Snapshot {
            data: entries,
            time_taken: fractional_seconds(),
            fetch_timestamp: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        // Write-then-rename so readers never observe a partial file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;

        trace!("Price snapshot written to {}", self.path.display());
        Ok(())
    }
}

fn fractional_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as f64 / 1e9)
        .unwrap_or_default()
}
