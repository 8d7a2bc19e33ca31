//! CLI Module
//!
//! Command-line interface for the Voiceprep tools.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::neural::DevicePreference;

/// Voiceprep - dataset preparation and speech enhancement for TTS training
#[derive(Parser, Debug)]
#[command(name = "voiceprep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which enhancement model implementation to run
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Model server over HTTP
    #[default]
    Bridge,
    /// Deterministic stand-in, no inference
    Mock,
}

/// Flags overriding the enhance config file
#[derive(clap::Args, Debug, Default)]
pub struct EnhanceArgs {
    /// JSON config file (flags override its values)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root directory to scan
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory to write processed files into
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Extension to process and write
    #[arg(long)]
    pub audio_format: Option<String>,

    /// Solver for the enhance pass
    #[arg(long)]
    pub solver: Option<String>,

    /// Number of function evaluations
    #[arg(long)]
    pub nfe: Option<u32>,

    /// Prior temperature
    #[arg(long)]
    pub tau: Option<f32>,

    /// Lean towards denoising (true) or enhancement (false)
    #[arg(long)]
    pub denoising: Option<bool>,

    /// Write the enhanced (true) or denoised (false) output
    #[arg(long)]
    pub use_enhanced: Option<bool>,

    /// Compute device: auto, cpu or cuda
    #[arg(long)]
    pub device: Option<DevicePreference>,

    /// Output bit depth: 16, 24 or 32
    #[arg(long)]
    pub bit_depth: Option<u16>,

    /// Model implementation
    #[arg(long, value_enum, default_value_t = Backend::Bridge)]
    pub backend: Backend,

    /// Write a JSON run report here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Denoise and enhance every audio file under a directory
    #[command(name = "enhance")]
    Enhance(EnhanceArgs),

    /// Count processed files in an output directory
    #[command(name = "verify")]
    Verify {
        /// Directory to check
        dir: PathBuf,

        /// Extension to count
        #[arg(long, default_value = "wav")]
        audio_format: String,
    },

    /// Export a manifest to wavs/ + metadata CSVs
    #[command(name = "export-dataset")]
    ExportDataset {
        /// JSON-lines manifest
        manifest: PathBuf,

        /// Output root
        #[arg(short, long, default_value = "dataset")]
        output_dir: PathBuf,

        /// Fraction of utterances for the eval split
        #[arg(long, default_value_t = 0.002)]
        test_size: f64,

        /// Split seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Upload model directories to a hub repo
    #[command(name = "publish")]
    Publish {
        /// Repo id, `name` or `namespace/name`
        repo_id: String,

        /// Directories whose files go to the repo root
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Create the repo as private
        #[arg(long)]
        private: bool,

        /// Commit message
        #[arg(short, long, default_value = crate::hub::DEFAULT_COMMIT_MESSAGE)]
        message: String,

        /// List what would be uploaded without contacting the hub
        #[arg(long)]
        dry_run: bool,
    },
}
