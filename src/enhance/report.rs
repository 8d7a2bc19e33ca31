//! JSON report of a batch run

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EnhanceConfig;
use crate::enhance::batch::BatchOutcome;
use crate::error::{Result, VoiceprepError};
use crate::neural::ComputeDevice;

/// Everything needed to audit one batch after the fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub model: String,
    pub device: ComputeDevice,
    pub config: EnhanceConfig,
    pub outcome: BatchOutcome,
    /// Matching files found in the output directory afterwards
    pub verified: Option<usize>,
}

impl BatchReport {
    pub fn new(
        started_at: DateTime<Utc>,
        model: &str,
        device: ComputeDevice,
        config: &EnhanceConfig,
        outcome: BatchOutcome,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            model: model.to_string(),
            device,
            config: config.clone(),
            outcome,
            verified: None,
        }
    }

    pub fn with_verified(mut self, count: usize) -> Self {
        self.verified = Some(count);
        self
    }

    /// Write the report as pretty JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| VoiceprepError::FileWriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
