//! Dataset export for TTS training
//!
//! Reads a JSON-lines manifest of utterances and writes the flat
//! `wavs/` + `metadata_{train,eval}.csv` layout.

pub mod export;
pub mod manifest;

pub use export::{
    clean_text, export_dataset, speaker_tag, ExportOptions, ExportSummary, Split, SplitSummary,
    METADATA_HEADER,
};
pub use manifest::{read_manifest, ManifestEntry, ManifestRecord};
