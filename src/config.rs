//! Configuration for the batch enhancement pipeline.
//!
//! Configurations are loaded from JSON files using [`EnhanceConfig::load`];
//! every field is optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::ExportFormat;
use crate::error::{Result, VoiceprepError};
use crate::neural::DevicePreference;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Settings for one batch enhancement run.
pub struct EnhanceConfig {
    /// Root directory scanned recursively for input audio.
    pub input_dir: PathBuf,
    /// Flat directory receiving processed files (created if absent).
    pub output_dir: PathBuf,
    /// Extension filter for scanning and verification, without the dot.
    pub audio_format: String,
    /// ODE solver name passed to the enhance pass.
    pub solver: String,
    /// Number of function evaluations for the enhance pass.
    pub nfe: u32,
    /// Prior temperature for the enhance pass.
    pub tau: f32,
    /// Lean the enhance pass towards denoising (lambd 0.9) or enhancement (0.1).
    pub denoising: bool,
    /// Write the enhanced output; when false the denoised output is written.
    pub use_enhanced: bool,
    /// Device choice, resolved once at startup.
    pub device: DevicePreference,
    /// Output WAV bit depth.
    pub bit_depth: u16,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./dataset/wavs"),
            output_dir: PathBuf::from("./dataset/wavs_enhanced"),
            audio_format: "wav".to_string(),
            solver: "Midpoint".to_string(),
            nfe: 64,
            tau: 0.7,
            denoising: true,
            use_enhanced: true,
            device: DevicePreference::Auto,
            bit_depth: 16,
        }
    }
}

impl EnhanceConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| VoiceprepError::ConfigReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let format = self.audio_format.trim_start_matches('.');
        if format.is_empty() {
            return Err(VoiceprepError::InvalidConfig {
                field: "audio_format",
                reason: "must not be empty".to_string(),
            });
        }
        if !format.eq_ignore_ascii_case("wav") {
            return Err(VoiceprepError::InvalidConfig {
                field: "audio_format",
                reason: format!("'{}' cannot be written, only wav is supported", format),
            });
        }
        if self.solver.trim().is_empty() {
            return Err(VoiceprepError::InvalidConfig {
                field: "solver",
                reason: "must not be empty".to_string(),
            });
        }
        if self.nfe == 0 {
            return Err(VoiceprepError::InvalidConfig {
                field: "nfe",
                reason: "must be a positive integer".to_string(),
            });
        }
        if !self.tau.is_finite() || !(0.0..=1.0).contains(&self.tau) {
            return Err(VoiceprepError::InvalidConfig {
                field: "tau",
                reason: format!("{} is outside 0.0..=1.0", self.tau),
            });
        }
        if !ExportFormat::SUPPORTED_BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(VoiceprepError::InvalidConfig {
                field: "bit_depth",
                reason: format!("{} (expected 16, 24 or 32)", self.bit_depth),
            });
        }
        Ok(())
    }

    /// Extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.audio_format.trim_start_matches('.')
    }

    pub fn export_format(&self) -> ExportFormat {
        ExportFormat::new(self.bit_depth)
    }
}
