//! Export a dataset to the `wavs/` + pipe-delimited metadata layout
//!
//! ```text
//! <out>/wavs/000000.wav
//! <out>/metadata_train.csv   audio_file|text|speaker_name
//! <out>/metadata_eval.csv
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::dataset::manifest::{read_manifest, ManifestRecord};
use crate::engine::{export_audio, import_audio, ExportFormat};
use crate::error::{Result, VoiceprepError};

/// Header row of both metadata files
pub const METADATA_HEADER: &str = "audio_file|text|speaker_name";

/// Row terminator, as written by Python's `csv` module
const ROW_END: &str = "\r\n";

/// Settings for one export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    /// Fraction of records sent to the eval split
    pub test_size: f64,
    pub seed: u64,
}

impl ExportOptions {
    pub fn new(manifest: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            output_dir: output_dir.into(),
            test_size: 0.002,
            seed: 42,
        }
    }
}

/// Train or eval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Eval,
}

impl Split {
    /// Deterministic split assignment for the record at `index`
    pub fn assign(index: usize, seed: u64, test_size: f64) -> Self {
        let digest = Sha256::digest(format!("{}:{}", seed, index).as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let position = u64::from_be_bytes(head) as f64 / u64::MAX as f64;

        if position < test_size {
            Split::Eval
        } else {
            Split::Train
        }
    }

    fn metadata_file(&self) -> &'static str {
        match self {
            Split::Train => "metadata_train.csv",
            Split::Eval => "metadata_eval.csv",
        }
    }
}

/// Counts for one split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub exported: usize,
    pub skipped: usize,
}

/// Counts for a finished export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub train: SplitSummary,
    pub eval: SplitSummary,
    /// Manifest lines that could not be parsed
    pub malformed: usize,
}

impl ExportSummary {
    fn split_mut(&mut self, split: Split) -> &mut SplitSummary {
        match split {
            Split::Train => &mut self.train,
            Split::Eval => &mut self.eval,
        }
    }
}

/// Leading utterance number followed by whitespace
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+").expect("valid regex"));

/// Strip a leading utterance number: "12  hello" -> "hello"
///
/// Digits not followed by whitespace are kept ("3D printing").
pub fn clean_text(text: &str) -> String {
    LEADING_NUMBER.replace(text, "").into_owned()
}

/// Speaker tag used by the trainer: "ama kofi" -> "@AMAKOFI"
pub fn speaker_tag(name: &str) -> String {
    format!("@{}", name.replace(' ', "").to_uppercase())
}

/// Quote a metadata field when it contains the delimiter, a quote or a newline
fn csv_field(value: &str) -> String {
    if value.contains(['|', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn wav_name(index: usize) -> String {
    format!("{:06}.wav", index)
}

fn create_metadata(path: &Path) -> Result<BufWriter<File>> {
    let file_err = |e: std::io::Error| VoiceprepError::FileWriteError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut writer = BufWriter::new(File::create(path).map_err(file_err)?);
    write!(writer, "{}{}", METADATA_HEADER, ROW_END).map_err(file_err)?;
    Ok(writer)
}

/// Export every manifest record, skipping the ones that fail.
///
/// # Errors
/// * `Io` - If the manifest cannot be read
/// * `DirectoryCreateError` - If the output layout cannot be created
/// * `FileWriteError` - If a metadata file cannot be written
pub fn export_dataset(options: &ExportOptions) -> Result<ExportSummary> {
    let entries = read_manifest(&options.manifest)?;
    let wavs_dir = options.output_dir.join("wavs");
    fs::create_dir_all(&wavs_dir).map_err(|source| VoiceprepError::DirectoryCreateError {
        path: wavs_dir.clone(),
        source,
    })?;

    let train_path = options.output_dir.join(Split::Train.metadata_file());
    let eval_path = options.output_dir.join(Split::Eval.metadata_file());
    let mut train = create_metadata(&train_path)?;
    let mut eval = create_metadata(&eval_path)?;

    let mut summary = ExportSummary::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let record = match entry {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipped {}: {}", index, e);
                summary.malformed += 1;
                continue;
            }
        };

        let split = Split::assign(index, options.seed, options.test_size);
        match export_record(&record, &wavs_dir, index) {
            Ok(row) => {
                let (writer, path) = match split {
                    Split::Train => (&mut train, &train_path),
                    Split::Eval => (&mut eval, &eval_path),
                };
                write!(writer, "{}{}", row, ROW_END).map_err(|e| VoiceprepError::FileWriteError {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                summary.split_mut(split).exported += 1;
            }
            Err(e) => {
                warn!("Skipped {}: {}", index, e);
                summary.split_mut(split).skipped += 1;
            }
        }
    }

    for (writer, path) in [(&mut train, &train_path), (&mut eval, &eval_path)] {
        writer.flush().map_err(|e| VoiceprepError::FileWriteError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    }

    info!(
        "Exported {} train / {} eval utterances ({} skipped, {} malformed)",
        summary.train.exported,
        summary.eval.exported,
        summary.train.skipped + summary.eval.skipped,
        summary.malformed
    );

    Ok(summary)
}

/// Write one utterance's audio and return its metadata row
fn export_record(record: &ManifestRecord, wavs_dir: &Path, index: usize) -> Result<String> {
    let audio = import_audio(&record.audio)?;
    let name = wav_name(index);
    export_audio(&audio, &wavs_dir.join(&name), ExportFormat::float32())?;

    Ok(format!(
        "wavs/{}|{}|{}",
        name,
        csv_field(&clean_text(&record.text)),
        csv_field(&speaker_tag(&record.speaker_name))
    ))
}
