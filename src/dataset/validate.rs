//! Tensor File Validation
//!
//! Range sanity checks over encoded spline tensor records. Problems here are
//! reported, not fatal: a flagged record usually means the upstream
//! normalization step was skipped or a corpus sample slipped past the
//! validity screen.

use crate::model::tensor::TensorSample;
use crate::spline::STROKE_END_THRESHOLD;

/// Plausible magnitude bounds for normalized spline deltas.
#[derive(Debug, Clone)]
pub struct TensorBounds {
    pub max_abs_dx: f32,
    pub max_abs_dy: f32,
    pub max_abs_dt: f32,
}

impl Default for TensorBounds {
    fn default() -> Self {
        Self {
            max_abs_dx: 30.0,
            max_abs_dy: 2.0,
            max_abs_dt: 30.0,
        }
    }
}

/// Problems found in one record.
#[derive(Debug, Clone)]
pub struct RecordIssues {
    /// Zero-based record index within the file.
    pub index: usize,
    pub label: Option<String>,
    pub problems: Vec<String>,
}

/// Check every record and collect the ones with problems.
pub fn validate_records(records: &[TensorSample], bounds: &TensorBounds) -> Vec<RecordIssues> {
    let mut report = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let problems = check_record(record, bounds);
        if !problems.is_empty() {
            report.push(RecordIssues {
                index,
                label: record.label.clone(),
                problems,
            });
        }
    }
    report
}

fn check_record(record: &TensorSample, bounds: &TensorBounds) -> Vec<String> {
    let mut problems = Vec::new();
    let frames = &record.tensor.frames;

    if let Some(label) = &record.label {
        // A frame sequence shorter than twice the label cannot carry enough
        // signal for the CTC alignment downstream.
        if label.chars().count() * 2 >= frames.len() {
            problems.push(format!(
                "too short: {} chars -> {} frames",
                label.chars().count(),
                frames.len()
            ));
        }
    }

    if frames.iter().any(|f| f[0].abs() > bounds.max_abs_dx) {
        problems.push("x delta out of range".into());
    }
    if frames.iter().any(|f| f[1].abs() > bounds.max_abs_dy) {
        problems.push("y delta out of range".into());
    }
    if frames.iter().any(|f| f[2].abs() > bounds.max_abs_dt) {
        problems.push("t delta out of range".into());
    }

    if frames.iter().any(|f| !(0.0..=1.0).contains(&f[3])) {
        problems.push("boundary flag out of range".into());
    }
    match frames.last() {
        Some(last) if last[3] > STROKE_END_THRESHOLD => {}
        _ => problems.push("missing stroke boundary at end".into()),
    }

    problems
}
