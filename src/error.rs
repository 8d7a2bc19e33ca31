//! Error handling for Voiceprep
//!
//! Errors are split into file-level failures, which the batch runner turns
//! into a skip, and setup failures, which stop the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Voiceprep operations
pub type Result<T> = std::result::Result<T, VoiceprepError>;

/// Main error type for Voiceprep operations
#[derive(Error, Debug)]
pub enum VoiceprepError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },

    #[error("Failed to write file: {path}: {reason}")]
    FileWriteError { path: PathBuf, reason: String },

    // Model Errors
    #[error("Enhancement model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Enhancement model error: {reason}")]
    ModelProcessingError { reason: String },

    #[error("Bridge connection error: {message}")]
    BridgeConnectionError { message: String },

    #[error("Bridge request timed out after {timeout_ms}ms")]
    BridgeTimeout { timeout_ms: u64 },

    #[error("Model produced invalid audio (NaN/Inf) in {stage} pass")]
    NonFiniteOutput { stage: &'static str },

    // Setup Errors
    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to read config: {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Dataset Errors
    #[error("Manifest error at line {line}: {reason}")]
    ManifestError { line: usize, reason: String },

    // Hub Errors
    #[error("Invalid hub repo id: {repo_id}")]
    InvalidRepoId { repo_id: String },

    #[error("No hub token set (looked in {var})")]
    HubTokenMissing { var: &'static str },

    #[error("Hub request failed: {reason}")]
    HubRequestError { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VoiceprepError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            VoiceprepError::FileNotFound { .. } => "FILE_NOT_FOUND",
            VoiceprepError::InvalidAudio { .. } => "INVALID_AUDIO",
            VoiceprepError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            VoiceprepError::EmptyAudio => "EMPTY_AUDIO",
            VoiceprepError::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            VoiceprepError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            VoiceprepError::ModelUnavailable { .. } => "MODEL_UNAVAILABLE",
            VoiceprepError::ModelProcessingError { .. } => "MODEL_PROCESSING_ERROR",
            VoiceprepError::BridgeConnectionError { .. } => "BRIDGE_CONNECTION_ERROR",
            VoiceprepError::BridgeTimeout { .. } => "BRIDGE_TIMEOUT",
            VoiceprepError::NonFiniteOutput { .. } => "NON_FINITE_OUTPUT",
            VoiceprepError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            VoiceprepError::InvalidConfig { .. } => "INVALID_CONFIG",
            VoiceprepError::ConfigReadError { .. } => "CONFIG_READ_ERROR",
            VoiceprepError::ManifestError { .. } => "MANIFEST_ERROR",
            VoiceprepError::InvalidRepoId { .. } => "INVALID_REPO_ID",
            VoiceprepError::HubTokenMissing { .. } => "HUB_TOKEN_MISSING",
            VoiceprepError::HubRequestError { .. } => "HUB_REQUEST_ERROR",
            VoiceprepError::Io(_) => "IO_ERROR",
            VoiceprepError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this error only concerns a single file.
    ///
    /// File-level errors are recorded and skipped by the batch runner;
    /// everything else aborts the run before any file is touched.
    pub fn is_file_level(&self) -> bool {
        !matches!(
            self,
            VoiceprepError::DirectoryCreateError { .. }
                | VoiceprepError::InvalidConfig { .. }
                | VoiceprepError::ConfigReadError { .. }
                | VoiceprepError::InvalidRepoId { .. }
                | VoiceprepError::HubTokenMissing { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            VoiceprepError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            VoiceprepError::UnsupportedFormat { .. } => vec![
                "Convert the input to WAV first",
                "Supported bit depths: 8, 16, 24, 32 (int) and 32 (float)",
            ],
            VoiceprepError::ModelUnavailable { .. } => vec![
                "Start the enhancement model server",
                "Build with --features resemble",
                "Use --backend mock for a dry run",
            ],
            VoiceprepError::BridgeTimeout { .. } => vec![
                "Raise VOICEPREP_BRIDGE_TIMEOUT_MS",
                "Lower --nfe to shorten inference",
            ],
            VoiceprepError::DirectoryCreateError { .. } => vec![
                "Check permissions on the parent directory",
                "Choose a different --output-dir",
            ],
            VoiceprepError::HubTokenMissing { .. } => vec![
                "Export HF_TOKEN with a write-scoped access token",
                "Use --dry-run to list the files without uploading",
            ],
            VoiceprepError::HubRequestError { .. } => vec![
                "Check that the token can write to the repo",
                "Set HF_ENDPOINT if you publish to a self-hosted hub",
            ],
            _ => vec![],
        }
    }
}
