//! In-memory hub for dry runs and tests

use std::sync::Mutex;

use super::client::{HubClient, HubFile};
use crate::error::{Result, VoiceprepError};

/// A commit received by `RecordingHub`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommit {
    pub repo_id: String,
    pub message: String,
    pub files: Vec<HubFile>,
}

/// Records repo creation and commits instead of uploading
#[derive(Default)]
pub struct RecordingHub {
    failure: Option<String>,
    created: Mutex<Vec<(String, bool)>>,
    commits: Mutex<Vec<RecordedCommit>>,
}

impl RecordingHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every commit with `reason`
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    /// Repos created so far, with their privacy flag
    pub fn created(&self) -> Vec<(String, bool)> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl HubClient for RecordingHub {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn create_repo(&self, repo_id: &str, private: bool) -> Result<()> {
        if let Ok(mut created) = self.created.lock() {
            created.push((repo_id.to_string(), private));
        }
        Ok(())
    }

    fn commit(&self, repo_id: &str, files: &[HubFile], message: &str) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(VoiceprepError::HubRequestError {
                reason: reason.clone(),
            });
        }

        if let Ok(mut commits) = self.commits.lock() {
            commits.push(RecordedCommit {
                repo_id: repo_id.to_string(),
                message: message.to_string(),
                files: files.to_vec(),
            });
        }
        Ok(())
    }
}
