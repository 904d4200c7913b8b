//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::tensor::Encoding;

/// Ink Pipeline - Build handwriting datasets from corpus and capture files
#[derive(Parser, Debug)]
#[command(name = "ink-pipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode legacy corpus documents into an ink file
    Decode {
        /// Corpus document paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output ink file
        #[arg(short, long)]
        output: PathBuf,

        /// Annotation node type to extract ("Textline" or "Word")
        #[arg(long, default_value = "Textline")]
        node_type: String,
    },

    /// Build a balanced split from tagged ink files
    Resample {
        /// Tagged input files, as SUBSET=PATH
        #[arg(short, long = "input", value_parser = parse_tagged_path, required = true)]
        inputs: Vec<(String, PathBuf)>,

        /// Output ink file
        #[arg(short, long)]
        output: PathBuf,

        /// Subset key to build the split from
        #[arg(short, long)]
        subset: String,

        /// Number of records in the output split
        #[arg(short, long)]
        target_size: usize,

        /// Seed for reproducible selection (derived from subset and size if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Normalize every record of an ink file
    Normalize {
        /// Input ink file
        #[arg(short, long)]
        input: PathBuf,

        /// Output ink file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encode an ink file as a tensor file
    Encode {
        /// Input ink file
        #[arg(short, long)]
        input: PathBuf,

        /// Output tensor file
        #[arg(short, long)]
        output: PathBuf,

        /// Tensor encoding name
        #[arg(long, default_value = "spline", value_parser = parse_encoding)]
        encoding: Encoding,
    },

    /// Check a tensor file against plausibility bounds
    Validate {
        /// Input tensor file
        #[arg(short, long)]
        input: PathBuf,

        /// Tensor encoding name
        #[arg(long, default_value = "spline", value_parser = parse_encoding)]
        encoding: Encoding,
    },

    /// Concatenate several record files into one
    Concat {
        /// Input files, in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Parse a SUBSET=PATH argument
fn parse_tagged_path(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((subset, path)) if !subset.is_empty() && !path.is_empty() => {
            Ok((subset.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected SUBSET=PATH, got {value:?}")),
    }
}

/// Parse a tensor encoding name
fn parse_encoding(value: &str) -> Result<Encoding, String> {
    Encoding::from_name(value).map_err(|e| e.to_string())
}
