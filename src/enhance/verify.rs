//! File discovery and output verification

use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

/// Recursively list regular files whose name ends in `.<extension>`.
///
/// Matching is case-sensitive. Unreadable entries are skipped, and a
/// missing root yields an empty list. Order is not meaningful.
pub fn find_audio_files(root: &Path, extension: &str) -> Vec<PathBuf> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));

    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(&suffix))
        .map(|entry| entry.into_path())
        .collect()
}

/// Count processed files under `output_dir`.
///
/// Returns 0 with a warning when the directory does not exist.
pub fn verify_output(output_dir: &Path, extension: &str) -> usize {
    if !output_dir.exists() {
        warn!("Output directory {} does not exist!", output_dir.display());
        return 0;
    }

    let count = find_audio_files(output_dir, extension).len();
    info!(
        "Found {} processed {} files in output directory",
        count,
        extension.trim_start_matches('.').to_uppercase()
    );
    count
}
