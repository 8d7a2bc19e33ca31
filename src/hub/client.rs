//! Model hub client trait

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, VoiceprepError};

/// A local file staged for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubFile {
    pub local: PathBuf,
    /// Destination path inside the repo, `/`-separated
    pub path_in_repo: String,
    pub size: u64,
    /// Hex SHA-256 of the contents
    pub sha256: String,
}

impl HubFile {
    /// Stage `local` under `path_in_repo`, hashing its contents.
    pub fn stage(local: &Path, path_in_repo: impl Into<String>) -> Result<Self> {
        let mut file = File::open(local).map_err(|_| VoiceprepError::FileNotFound {
            path: local.to_path_buf(),
        })?;
        let mut hasher = Sha256::new();
        let size = io::copy(&mut file, &mut hasher)?;

        Ok(Self {
            local: local.to_path_buf(),
            path_in_repo: path_in_repo.into(),
            size,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }
}

/// Trait for model hub backends
pub trait HubClient: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Create the repo if it does not exist yet. An existing repo is not an error.
    fn create_repo(&self, repo_id: &str, private: bool) -> Result<()>;

    /// Upload all files in one commit on the default branch.
    fn commit(&self, repo_id: &str, files: &[HubFile], message: &str) -> Result<()>;
}
