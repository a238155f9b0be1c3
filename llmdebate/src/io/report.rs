//! Output artifacts: the summary file and the diagnostic transcript.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::types::Round;

/// Diagnostic record of a run. No compatibility guarantees.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptRecord<'a> {
    pub seed: &'a str,
    pub challenger_model: &'a str,
    pub defender_model: &'a str,
    /// False when the run was interrupted before finishing.
    pub complete: bool,
    pub rounds: &'a [Round],
}

/// Atomically write the summary text (temp file + rename).
pub fn write_summary(path: &Path, summary: &str) -> Result<()> {
    write_atomic(path, summary)
}

/// Write the diagnostic transcript as pretty JSON with a trailing newline.
pub fn write_transcript(path: &Path, record: &TranscriptRecord<'_>) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(record).context("serialize transcript")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
