//! Pipeline Stages
//!
//! One pure stage per derived file: named input file(s) plus a small set of
//! options in, one named output file out. A Makefile-style driver strings
//! these together; nothing here globs, caches, or schedules.
//!
//! Batch policy lives at this level: readers are lenient (skip bad records
//! with a warning), so a single corrupt line costs one record, not a build.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::codec::file;
use crate::dataset::normalize::Normalizer;
use crate::dataset::validate::{validate_records, RecordIssues, TensorBounds};
use crate::dataset::{Resampler, SourceRecord};
use crate::model::ink::Sample;
use crate::model::tensor::{Encoding, TensorSample};
use crate::trace::corpus;
use crate::{spline, Error, Result};

/// What a stage read, wrote, and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub read: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Decode corpus documents into one ink file.
///
/// Each document contributes every labeled group of the requested node type
/// (`"Textline"` or `"Word"`); decoded samples pass the validity screen
/// before being written.
pub fn decode_stage(
    inputs: &[PathBuf],
    node_type: &str,
    normalizer: &Normalizer,
    output: &Path,
) -> Result<StageSummary> {
    let mut samples = Vec::new();
    let mut rejected = 0;
    for input in inputs {
        let document = fs::read_to_string(input)?;
        let extracted = corpus::extract_samples_of(&document, node_type)?;
        info!(path = %input.display(), count = extracted.len(), "decoded corpus document");
        let (valid, bad) = normalizer.filter_valid(extracted);
        rejected += bad;
        samples.extend(valid);
    }

    file::write_ink_file(output, &samples)?;
    Ok(StageSummary {
        read: samples.len() + rejected,
        written: samples.len(),
        skipped: rejected,
    })
}

/// Resample tagged ink files into one balanced split file.
pub fn resample_stage(
    inputs: &[(String, PathBuf)],
    target_key: &str,
    target_size: usize,
    seed: Option<u64>,
    resampler: &Resampler,
    output: &Path,
) -> Result<StageSummary> {
    let mut sources = Vec::new();
    let mut skipped = 0;
    for (subset, path) in inputs {
        let (samples, bad) = file::read_ink_file_lenient(path)?;
        skipped += bad;
        sources.extend(
            samples
                .into_iter()
                .map(|sample| SourceRecord::new(subset.clone(), sample)),
        );
    }

    let read = sources.len();
    let split = resampler.resample(&sources, target_key, target_size, seed)?;
    file::write_ink_file(output, &split)?;
    Ok(StageSummary {
        read,
        written: split.len(),
        skipped,
    })
}

/// Normalize every record of an ink file.
///
/// Degenerate inks (zero height) are skipped with a warning; everything else
/// is an error in the input data and aborts the stage.
pub fn normalize_stage(input: &Path, normalizer: &Normalizer, output: &Path) -> Result<StageSummary> {
    let (samples, mut skipped) = file::read_ink_file_lenient(input)?;
    let read = samples.len() + skipped;

    let mut normalized = Vec::with_capacity(samples.len());
    for sample in samples {
        match normalizer.normalize(&sample.ink) {
            Ok(ink) => normalized.push(Sample::new(sample.label, ink)),
            Err(Error::DegenerateInk(reason)) => {
                warn!(label = ?sample.label, reason = %reason, "skipping degenerate ink");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    file::write_ink_file(output, &normalized)?;
    Ok(StageSummary {
        read,
        written: normalized.len(),
        skipped,
    })
}

/// Encode an ink file as a tensor file in the named encoding.
pub fn encode_stage(input: &Path, encoding: Encoding, output: &Path) -> Result<StageSummary> {
    if encoding != Encoding::Spline {
        return Err(Error::UnsupportedEncoding(encoding.to_string()));
    }

    let (samples, skipped) = file::read_ink_file_lenient(input)?;
    let read = samples.len() + skipped;

    let mut records = Vec::with_capacity(samples.len());
    for sample in samples {
        let tensor = spline::encode(&sample.ink)?;
        records.push(TensorSample::new(sample.label, tensor));
    }

    file::write_tensor_file(output, &records)?;
    Ok(StageSummary {
        read,
        written: records.len(),
        skipped,
    })
}

/// Outcome of validating a tensor file.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub records: usize,
    pub issues: Vec<RecordIssues>,
}

/// Check a tensor file against plausibility bounds.
pub fn validate_stage(
    input: &Path,
    encoding: Encoding,
    bounds: &TensorBounds,
) -> Result<ValidationOutcome> {
    if encoding != Encoding::Spline {
        return Err(Error::UnsupportedEncoding(encoding.to_string()));
    }

    let records = file::read_tensor_file(input, encoding)?;
    let issues = validate_records(&records, bounds);
    Ok(ValidationOutcome {
        records: records.len(),
        issues,
    })
}

/// Concatenate several record files into one.
///
/// Records pass through verbatim; only blank lines are dropped. The inputs
/// must already share a format — this stage does not decode them.
pub fn concat_stage(inputs: &[PathBuf], output: &Path) -> Result<StageSummary> {
    let mut out = fs::File::create(output)?;
    let mut written = 0;
    for input in inputs {
        let content = fs::read_to_string(input)?;
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            writeln!(out, "{line}")?;
            written += 1;
        }
    }
    Ok(StageSummary {
        read: written,
        written,
        skipped: 0,
    })
}
