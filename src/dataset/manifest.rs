//! JSON-lines dataset manifest

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoiceprepError};

/// One utterance of the source dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Path to the utterance audio, relative to the manifest or absolute
    pub audio: PathBuf,
    /// Transcript
    pub text: String,
    /// Speaker display name
    pub speaker_name: String,
}

/// A parsed manifest line, or why it could not be parsed
pub type ManifestEntry = std::result::Result<ManifestRecord, VoiceprepError>;

/// Read a manifest, resolving relative audio paths against its directory.
///
/// Blank lines are ignored. Malformed lines are returned as
/// `ManifestError` entries so the caller can skip them.
///
/// # Errors
/// * `Io` - If the manifest itself cannot be read
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let contents = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    Ok(contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(i + 1, line, base))
        .collect())
}

fn parse_line(line_no: usize, line: &str, base: &Path) -> ManifestEntry {
    let mut record: ManifestRecord =
        serde_json::from_str(line).map_err(|e| VoiceprepError::ManifestError {
            line: line_no,
            reason: e.to_string(),
        })?;

    if record.audio.is_relative() {
        record.audio = base.join(&record.audio);
    }
    Ok(record)
}
