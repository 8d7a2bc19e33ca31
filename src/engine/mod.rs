//! Audio Engine Module
//!
//! Core audio handling shared by the enhancement pipeline and the dataset
//! exporter:
//! - Mono audio buffer and channel down-mix
//! - WAV file I/O

pub mod buffer;
pub mod io;

pub use buffer::{linear_to_db, AudioBuffer};
pub use io::{export_audio, import_audio, ExportFormat};
