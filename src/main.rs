//! Ink Pipeline - Handwriting Dataset Builder
//!
//! Drives the per-file pipeline stages: corpus decoding, resampling,
//! normalization, tensor encoding, validation, and concatenation.

use std::path::{Path, PathBuf};

use ink_pipeline::app::cli::{Cli, Commands};
use ink_pipeline::app::config::Config;
use ink_pipeline::model::tensor::Encoding;
use ink_pipeline::pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Decode {
            inputs,
            output,
            node_type,
        } => {
            run_decode(&inputs, &node_type, &output, &config)?;
        }
        Commands::Resample {
            inputs,
            output,
            subset,
            target_size,
            seed,
        } => {
            run_resample(&inputs, &subset, target_size, seed, &output, &config)?;
        }
        Commands::Normalize { input, output } => {
            run_normalize(&input, &output, &config)?;
        }
        Commands::Encode {
            input,
            output,
            encoding,
        } => {
            run_encode(&input, encoding, &output)?;
        }
        Commands::Validate { input, encoding } => {
            run_validate(&input, encoding, &config)?;
        }
        Commands::Concat { inputs, output } => {
            run_concat(&inputs, &output)?;
        }
    }

    Ok(())
}

fn run_decode(
    inputs: &[PathBuf],
    node_type: &str,
    output: &Path,
    config: &Config,
) -> anyhow::Result<()> {
    info!("Decoding {} corpus document(s)", inputs.len());

    for input in inputs {
        if !input.exists() {
            anyhow::bail!("Corpus document not found: {:?}", input);
        }
    }

    let summary = pipeline::decode_stage(inputs, node_type, &config.normalizer(), output)?;
    println!(
        "Decoded {} sample(s) to {} ({} rejected)",
        summary.written,
        output.display(),
        summary.skipped
    );
    Ok(())
}

fn run_resample(
    inputs: &[(String, PathBuf)],
    subset: &str,
    target_size: usize,
    seed: Option<u64>,
    output: &Path,
    config: &Config,
) -> anyhow::Result<()> {
    info!(
        "Building split '{}' of {} record(s) from {} source file(s)",
        subset,
        target_size,
        inputs.len()
    );

    let summary = pipeline::resample_stage(
        inputs,
        subset,
        target_size,
        seed,
        &config.resampler(),
        output,
    )?;
    println!(
        "Resampled {} -> {} record(s) to {} ({} bad record(s) skipped)",
        summary.read,
        summary.written,
        output.display(),
        summary.skipped
    );
    Ok(())
}

fn run_normalize(input: &Path, output: &Path, config: &Config) -> anyhow::Result<()> {
    info!("Normalizing {:?}", input);

    let summary = pipeline::normalize_stage(input, &config.normalizer(), output)?;
    println!(
        "Normalized {} of {} record(s) to {} ({} skipped)",
        summary.written,
        summary.read,
        output.display(),
        summary.skipped
    );
    Ok(())
}

fn run_encode(input: &Path, encoding: Encoding, output: &Path) -> anyhow::Result<()> {
    info!("Encoding {:?} as {}", input, encoding);

    let summary = pipeline::encode_stage(input, encoding, output)?;
    println!(
        "Encoded {} record(s) to {} ({} bad record(s) skipped)",
        summary.written,
        output.display(),
        summary.skipped
    );
    Ok(())
}

fn run_validate(input: &Path, encoding: Encoding, config: &Config) -> anyhow::Result<()> {
    info!("Validating {:?}", input);

    let outcome = pipeline::validate_stage(input, encoding, &config.tensor_bounds())?;

    if outcome.issues.is_empty() {
        println!("Validation PASSED ({} record(s))", outcome.records);
        Ok(())
    } else {
        println!(
            "Validation found problems in {} of {} record(s):",
            outcome.issues.len(),
            outcome.records
        );
        for issue in &outcome.issues {
            let label = issue.label.as_deref().unwrap_or("-");
            println!(
                "  record {} ({}): {}",
                issue.index,
                label,
                issue.problems.join(", ")
            );
        }
        anyhow::bail!("Validation flagged {} record(s)", outcome.issues.len())
    }
}

fn run_concat(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    info!("Concatenating {} file(s)", inputs.len());

    let summary = pipeline::concat_stage(inputs, output)?;
    println!(
        "Concatenated {} record(s) to {}",
        summary.written,
        output.display()
    );
    Ok(())
}
