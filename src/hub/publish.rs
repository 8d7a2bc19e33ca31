//! Publish trained model directories to a hub repo
//!
//! Each source directory (feature extractor, tokenizer, model weights) is
//! uploaded to the repo root. Later sources win when two of them carry the
//! same file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use super::client::{HubClient, HubFile};
use crate::error::{Result, VoiceprepError};

/// `name` or `namespace/name`
static REPO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9][A-Za-z0-9._-]*/)?[A-Za-z0-9][A-Za-z0-9._-]*$")
        .expect("valid regex")
});

/// Default commit message
pub const DEFAULT_COMMIT_MESSAGE: &str = "Upload model";

/// What to publish and where
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub repo_id: String,
    pub sources: Vec<PathBuf>,
    pub private: bool,
    pub message: String,
}

impl PublishOptions {
    pub fn new(repo_id: impl Into<String>, sources: Vec<PathBuf>) -> Self {
        Self {
            repo_id: repo_id.into(),
            sources,
            private: false,
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    /// # Errors
    /// * `InvalidRepoId` - If the repo id is not `name` or `namespace/name`
    /// * `InvalidConfig` - If no source directory was given
    pub fn validate(&self) -> Result<()> {
        if !REPO_ID.is_match(&self.repo_id) || self.repo_id.contains("..") {
            return Err(VoiceprepError::InvalidRepoId {
                repo_id: self.repo_id.clone(),
            });
        }
        if self.sources.is_empty() {
            return Err(VoiceprepError::InvalidConfig {
                field: "sources",
                reason: "at least one directory is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of a publish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishSummary {
    pub repo_id: String,
    pub files: Vec<String>,
    pub total_bytes: u64,
}

fn repo_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Stage every regular file below the sources, keyed by repo path.
///
/// Hidden entries (`.git`, `.cache`, ...) are left out.
///
/// # Errors
/// * `FileNotFound` - If a source directory does not exist
pub fn collect_files(sources: &[PathBuf]) -> Result<Vec<HubFile>> {
    let mut staged: BTreeMap<String, HubFile> = BTreeMap::new();

    for source in sources {
        if !source.is_dir() {
            return Err(VoiceprepError::FileNotFound {
                path: source.clone(),
            });
        }

        let entries = WalkDir::new(source)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file());

        for entry in entries {
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| VoiceprepError::HubRequestError {
                    reason: e.to_string(),
                })?;
            let path_in_repo = repo_path(relative);
            let file = HubFile::stage(entry.path(), path_in_repo.clone())?;

            if let Some(previous) = staged.insert(path_in_repo.clone(), file) {
                warn!(
                    "{} from {} replaced by {}",
                    path_in_repo,
                    previous.local.display(),
                    entry.path().display()
                );
            }
        }
    }

    Ok(staged.into_values().collect())
}

/// Create the repo if needed and upload all sources in one commit.
pub fn publish(client: &dyn HubClient, options: &PublishOptions) -> Result<PublishSummary> {
    options.validate()?;

    let files = collect_files(&options.sources)?;
    if files.is_empty() {
        return Err(VoiceprepError::InvalidConfig {
            field: "sources",
            reason: "no files to publish".to_string(),
        });
    }

    let total_bytes = files.iter().map(|f| f.size).sum();
    info!(
        "Publishing {} files ({} bytes) to {} via {}",
        files.len(),
        total_bytes,
        options.repo_id,
        client.name()
    );

    client.create_repo(&options.repo_id, options.private)?;
    client.commit(&options.repo_id, &files, &options.message)?;

    Ok(PublishSummary {
        repo_id: options.repo_id.clone(),
        files: files.into_iter().map(|f| f.path_in_repo).collect(),
        total_bytes,
    })
}
