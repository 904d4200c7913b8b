//! Ink and Tensor File IO
//!
//! File-level readers and writers over the record codec. Every failure is
//! attributed to a (path, 1-based line number, failure kind) triple. The
//! strict readers abort on the first bad record; the lenient readers skip
//! bad records with a warning and report how many were dropped.
//!
//! Blank lines are ignored, which also covers the permitted trailing
//! newline.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::model::ink::Sample;
use crate::model::tensor::{Encoding, TensorSample};
use crate::{codec, Result};

/// Read an ink file, aborting on the first malformed record.
pub fn read_ink_file(path: &Path) -> Result<Vec<Sample>> {
    let content = fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for (number, line) in numbered_records(&content) {
        match codec::decode_ink(line) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                warn!(path = %path.display(), line = number, error = %e, "bad ink record");
                return Err(e);
            }
        }
    }
    debug!(path = %path.display(), count = samples.len(), "read ink file");
    Ok(samples)
}

/// Read an ink file, skipping malformed records.
///
/// Returns the good samples and the number of records skipped.
pub fn read_ink_file_lenient(path: &Path) -> Result<(Vec<Sample>, usize)> {
    let content = fs::read_to_string(path)?;
    let mut samples = Vec::new();
    let mut skipped = 0;
    for (number, line) in numbered_records(&content) {
        match codec::decode_ink(line) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                warn!(path = %path.display(), line = number, error = %e, "skipping ink record");
                skipped += 1;
            }
        }
    }
    debug!(
        path = %path.display(),
        count = samples.len(),
        skipped,
        "read ink file"
    );
    Ok((samples, skipped))
}

/// Write an ink file, one record per line with a trailing newline.
pub fn write_ink_file(path: &Path, samples: &[Sample]) -> Result<()> {
    let mut out = fs::File::create(path)?;
    for sample in samples {
        let line = codec::encode_ink(sample)?;
        writeln!(out, "{line}")?;
    }
    debug!(path = %path.display(), count = samples.len(), "wrote ink file");
    Ok(())
}

/// Read a tensor file of the declared encoding, aborting on the first
/// malformed record.
pub fn read_tensor_file(path: &Path, encoding: Encoding) -> Result<Vec<TensorSample>> {
    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (number, line) in numbered_records(&content) {
        match codec::decode_tensor(line, encoding) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), line = number, error = %e, "bad tensor record");
                return Err(e);
            }
        }
    }
    debug!(path = %path.display(), count = records.len(), "read tensor file");
    Ok(records)
}

/// Write a tensor file, one record per line with a trailing newline.
pub fn write_tensor_file(path: &Path, records: &[TensorSample]) -> Result<()> {
    let mut out = fs::File::create(path)?;
    for record in records {
        let line = codec::encode_tensor(record)?;
        writeln!(out, "{line}")?;
    }
    debug!(path = %path.display(), count = records.len(), "wrote tensor file");
    Ok(())
}

/// Iterate (1-based line number, record text) pairs, skipping blank lines.
fn numbered_records(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}
