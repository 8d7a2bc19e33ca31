//! Directory batch runner
//!
//! Scans an input tree, enhances each matching file and writes the chosen
//! output into a flat output directory. A failing file is recorded and
//! skipped; it never stops the batch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::EnhanceConfig;
use crate::engine::export_audio;
use crate::enhance::processor::{display_name, EnhancementRequest, Enhancer};
use crate::enhance::verify::find_audio_files;
use crate::error::{Result, VoiceprepError};

/// Result of processing one file
#[derive(Debug)]
pub enum FileOutcome {
    Processed { source: PathBuf, output: PathBuf },
    Failed { source: PathBuf, error: VoiceprepError },
}

/// A skipped file, kept for the summary and report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error_code: String,
    pub reason: String,
}

/// Counters for a finished batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Files matching the extension filter
    pub discovered: usize,
    /// Files written to the output directory
    pub succeeded: usize,
    pub output_dir: PathBuf,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    fn new(output_dir: &Path) -> Self {
        Self {
            discovered: 0,
            succeeded: 0,
            output_dir: output_dir.to_path_buf(),
            failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the enhancer over every matching file of a directory tree
pub struct BatchRunner<'m> {
    enhancer: Enhancer<'m>,
    config: EnhanceConfig,
    show_progress: bool,
}

impl<'m> BatchRunner<'m> {
    pub fn new(enhancer: Enhancer<'m>, config: EnhanceConfig) -> Self {
        Self {
            enhancer,
            config,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while processing
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    pub fn enhancer(&self) -> &Enhancer<'m> {
        &self.enhancer
    }

    /// Process all matching files under the configured input directory.
    ///
    /// # Errors
    /// * `DirectoryCreateError` - If the output directory cannot be created
    ///
    /// Per-file failures are reported in the returned outcome instead.
    pub fn process_directory(&self) -> Result<BatchOutcome> {
        let input_dir = &self.config.input_dir;
        let output_dir = &self.config.output_dir;
        let extension = self.config.extension();

        fs::create_dir_all(output_dir).map_err(|source| VoiceprepError::DirectoryCreateError {
            path: output_dir.clone(),
            source,
        })?;

        if !input_dir.exists() {
            warn!(
                "Input directory {} does not exist, treating it as empty",
                input_dir.display()
            );
        }

        let files = find_audio_files(input_dir, extension);
        info!(
            "Found {} {} files to process",
            files.len(),
            extension.to_uppercase()
        );

        let mut outcome = BatchOutcome::new(output_dir);
        outcome.discovered = files.len();

        if files.is_empty() {
            info!("No audio files found!");
            return Ok(outcome);
        }

        let progress = self.progress_bar(files.len());
        let mut written = HashSet::new();

        for source in &files {
            progress.set_message(display_name(source));

            match self.process_file(source) {
                FileOutcome::Processed { output, .. } => {
                    if !written.insert(output.clone()) {
                        warn!(
                            "{} overwrote an earlier output with the same file name",
                            output.display()
                        );
                    }
                    outcome.succeeded += 1;
                }
                FileOutcome::Failed { source, error } => {
                    if !error.is_file_level() {
                        progress.abandon();
                        return Err(error);
                    }
                    error!("Error processing {}: {}", display_name(&source), error);
                    outcome.failures.push(FileFailure {
                        error_code: error.error_code().to_string(),
                        reason: error.to_string(),
                        source,
                    });
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Successfully processed {}/{} audio files",
            outcome.succeeded, outcome.discovered
        );

        Ok(outcome)
    }

    /// Enhance one file and write the selected output.
    pub fn process_file(&self, source: &Path) -> FileOutcome {
        match self.try_process_file(source) {
            Ok(output) => FileOutcome::Processed {
                source: source.to_path_buf(),
                output,
            },
            Err(error) => FileOutcome::Failed {
                source: source.to_path_buf(),
                error,
            },
        }
    }

    fn try_process_file(&self, source: &Path) -> Result<PathBuf> {
        let request = EnhancementRequest::new(source, &self.config);
        let result = self.enhancer.denoise_and_enhance(&request)?;
        let audio = result.select(self.config.use_enhanced);

        let file_name = source
            .file_name()
            .ok_or_else(|| VoiceprepError::FileNotFound {
                path: source.to_path_buf(),
            })?;
        let output = self.config.output_dir.join(file_name);

        export_audio(&audio, &output, self.config.export_format())?;
        Ok(output)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        bar
    }
}
