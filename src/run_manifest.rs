use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::season_report::YearSummary;

pub const MANIFEST_FILE: &str = "run_manifest.json";

/// Small JSON record of what a run covered, written next to the output
/// tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// RFC 3339 timestamps.
    pub started_at: String,
    pub finished_at: String,
    pub first_year: i32,
    pub last_year: i32,
    pub level_codes: Vec<String>,
    pub years: Vec<YearSummary>,
    pub tournament_rows: usize,
    pub round_rows: usize,
    /// Score tokens dropped by the parser across the whole run. Non-zero is
    /// normal on historical data (annotation quirks), but a jump is worth a
    /// look.
    pub tokens_skipped: usize,
}

pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILE)
}

pub fn save_manifest(output_dir: &Path, manifest: &RunManifest) -> Result<()> {
    let path = manifest_path(output_dir);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(manifest).context("serialize run manifest")?;
    fs::write(&tmp, json).context("write run manifest")?;
    fs::rename(&tmp, &path).context("swap run manifest")?;
    Ok(())
}

pub fn load_manifest(output_dir: &Path) -> Result<RunManifest> {
    let path = manifest_path(output_dir);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read run manifest {}", path.display()))?;
    serde_json::from_str(&raw).context("decode run manifest")
}
