use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Write a run summary as pretty-printed JSON.
pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write report: {}", path.display()))
}
