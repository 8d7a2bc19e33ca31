//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use chrono::Utc;
use log::{info, warn};

use crate::cli::{Backend, EnhanceArgs};
use crate::config::EnhanceConfig;
use crate::dataset::{export_dataset, ExportOptions, ExportSummary};
use crate::enhance::{verify_output, BatchOutcome, BatchReport, BatchRunner, Enhancer};
use crate::error::{Result, VoiceprepError};
use crate::hub::{publish as publish_to_hub, HttpHub, HubClient, PublishOptions, PublishSummary, RecordingHub};
use crate::neural::{BridgeEnhancer, EnhancementModel, MockEnhancer};

/// Build the effective config: defaults, then the config file, then flags.
pub fn resolve_config(args: &EnhanceArgs) -> Result<EnhanceConfig> {
    let mut config = match &args.config {
        Some(path) => EnhanceConfig::load(path)?,
        None => EnhanceConfig::default(),
    };

    if let Some(v) = &args.input_dir {
        config.input_dir = v.clone();
    }
    if let Some(v) = &args.output_dir {
        config.output_dir = v.clone();
    }
    if let Some(v) = &args.audio_format {
        config.audio_format = v.clone();
    }
    if let Some(v) = &args.solver {
        config.solver = v.clone();
    }
    if let Some(v) = args.nfe {
        config.nfe = v;
    }
    if let Some(v) = args.tau {
        config.tau = v;
    }
    if let Some(v) = args.denoising {
        config.denoising = v;
    }
    if let Some(v) = args.use_enhanced {
        config.use_enhanced = v;
    }
    if let Some(v) = args.device {
        config.device = v;
    }
    if let Some(v) = args.bit_depth {
        config.bit_depth = v;
    }

    config.validate()?;
    Ok(config)
}

fn create_model(backend: Backend) -> Box<dyn EnhancementModel> {
    match backend {
        Backend::Bridge => {
            let bridge = BridgeEnhancer::new();
            if !bridge.is_available() {
                warn!(
                    "Enhancement bridge at {} is not reachable, every file will fail",
                    bridge.bridge_url()
                );
            }
            Box::new(bridge)
        }
        Backend::Mock => Box::new(MockEnhancer::new()),
    }
}

/// Run the batch, verify when anything was written, optionally report.
pub fn enhance(args: &EnhanceArgs) -> Result<BatchOutcome> {
    let config = resolve_config(args)?;
    let started_at = Utc::now();

    let device = config.device.resolve();
    info!("Using device: {}", device);

    let model = create_model(args.backend);
    let runner = BatchRunner::new(Enhancer::new(model.as_ref(), device), config).with_progress(true);
    let outcome = runner.process_directory()?;

    let verified = if outcome.succeeded > 0 {
        let count = verify_output(&outcome.output_dir, runner.config().extension());
        println!(
            "Successfully processed {}/{} audio files ({} in {})",
            outcome.succeeded,
            outcome.discovered,
            count,
            outcome.output_dir.display()
        );
        Some(count)
    } else {
        println!("No files were successfully processed!");
        None
    };

    if let Some(path) = &args.report {
        let enhancer = runner.enhancer();
        let mut report = BatchReport::new(
            started_at,
            enhancer.model_name(),
            enhancer.device(),
            runner.config(),
            outcome.clone(),
        );
        if let Some(count) = verified {
            report = report.with_verified(count);
        }
        report.write(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(outcome)
}

/// Count processed files in a directory.
pub fn verify(dir: &Path, audio_format: &str) -> usize {
    let count = verify_output(dir, audio_format);
    println!("{} {} files in {}", count, audio_format, dir.display());
    count
}

/// Export a manifest to the training layout.
pub fn export(options: &ExportOptions) -> Result<ExportSummary> {
    info!(
        "Exporting {} to {}",
        options.manifest.display(),
        options.output_dir.display()
    );

    let summary = export_dataset(options)?;
    println!(
        "Exported {} train and {} eval utterances to {}",
        summary.train.exported,
        summary.eval.exported,
        options.output_dir.display()
    );
    Ok(summary)
}

/// Upload model directories, or only list them with `dry_run`.
pub fn publish(options: &PublishOptions, dry_run: bool) -> Result<PublishSummary> {
    let client: Box<dyn HubClient> = if dry_run {
        Box::new(RecordingHub::new())
    } else {
        Box::new(HttpHub::from_env()?)
    };

    let summary = publish_to_hub(client.as_ref(), options)?;
    for file in &summary.files {
        println!("  {}", file);
    }
    let verb = if dry_run { "Would publish" } else { "Published" };
    println!(
        "{} {} files ({} bytes) to {}",
        verb,
        summary.files.len(),
        summary.total_bytes,
        summary.repo_id
    );
    Ok(summary)
}

/// Hints printed under a failed command, if the error has any
pub fn recovery_hints(err: &VoiceprepError) -> Option<String> {
    let suggestions = err.recovery_suggestions();
    if suggestions.is_empty() {
        return None;
    }

    let mut hints = String::from("Suggestions:");
    for suggestion in suggestions {
        hints.push_str("\n  - ");
        hints.push_str(suggestion);
    }
    Some(hints)
}
