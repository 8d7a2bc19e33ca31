//! Batch speech enhancement
//!
//! - Single-file denoise + enhance (`processor`)
//! - Directory batch runner (`batch`)
//! - Output verification (`verify`)
//! - Run report (`report`)

pub mod batch;
pub mod processor;
pub mod report;
pub mod verify;

pub use batch::{BatchOutcome, BatchRunner, FileFailure, FileOutcome};
pub use processor::{EnhancementRequest, EnhancementResult, Enhancer};
pub use report::BatchReport;
pub use verify::{find_audio_files, verify_output};
