//! Voiceprep CLI
//!
//! Command-line interface for dataset export and batch speech enhancement.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use voiceprep::cli::{commands, Cli, Commands};
use voiceprep::dataset::ExportOptions;
use voiceprep::hub::PublishOptions;
use voiceprep::VoiceprepError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Voiceprep v{}", env!("CARGO_PKG_VERSION"));
    debug!("{:?}", cli.command);

    let result = run(cli.command);
    if let Err(err) = &result {
        if let Some(hints) = err
            .downcast_ref::<VoiceprepError>()
            .and_then(commands::recovery_hints)
        {
            eprintln!("{}", hints);
        }
    }
    result
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Enhance(args) => {
            commands::enhance(&args).context("enhancement run failed")?;
        }
        Commands::Verify { dir, audio_format } => {
            commands::verify(&dir, &audio_format);
        }
        Commands::ExportDataset {
            manifest,
            output_dir,
            test_size,
            seed,
        } => {
            let options = ExportOptions {
                test_size,
                seed,
                ..ExportOptions::new(manifest, output_dir)
            };
            commands::export(&options).context("dataset export failed")?;
        }
        Commands::Publish {
            repo_id,
            sources,
            private,
            message,
            dry_run,
        } => {
            let options = PublishOptions {
                private,
                message,
                ..PublishOptions::new(repo_id, sources)
            };
            commands::publish(&options, dry_run).context("publish failed")?;
        }
    }

    Ok(())
}
