//! Legacy Trace Decoding
//!
//! Third-party handwriting corpora store each trace as a comma-separated
//! sequence of component lines: a zeroth-order position, a first-order
//! velocity, then successive accelerations, each applied cumulatively.
//! Individual numbers may be wrapped in quote or apostrophe sigils whose
//! usage is inconsistent and undocumented, so decoding extracts maximal
//! numeric runs and discards everything else rather than modeling the sigil
//! grammar.

pub mod corpus;

use std::sync::OnceLock;

use regex::Regex;

use crate::model::ink::Stroke;
use crate::{Error, Result};

/// Optional sign, digits, optional decimal point, digits.
fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?[0-9]*\.?[0-9]*").expect("static pattern compiles"))
}

/// Extract up to the first three numeric tokens of one component line.
///
/// Missing trailing components (e.g. a 2D corpus without timestamps) are
/// zero-filled.
fn extract_components(line: &str) -> Option<[f32; 3]> {
    let mut components = [0.0f32; 3];
    let mut count = 0;
    for m in number_pattern().find_iter(line) {
        // The pattern matches empty and digit-less runs; only real numbers count.
        let token = m.as_str();
        if !token.bytes().any(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(value) = token.parse::<f32>() {
            components[count] = value;
            count += 1;
            if count == 3 {
                break;
            }
        }
    }
    (count > 0).then_some(components)
}

/// Decode one finite-difference trace string into an absolute-coordinate
/// stroke.
///
/// Requires at least a position and a velocity line.
pub fn decode_trace(text: &str) -> Result<Stroke> {
    let mut vectors = Vec::new();
    for (i, line) in text.split(',').enumerate() {
        match extract_components(line) {
            Some(v) => vectors.push(v),
            None => {
                return Err(Error::InvalidTraceFormat(format!(
                    "component line {i} has no numeric tokens"
                )))
            }
        }
    }
    if vectors.len() < 2 {
        return Err(Error::InvalidTraceFormat(format!(
            "expected a position and a velocity, got {} component line(s)",
            vectors.len()
        )));
    }

    let mut stroke = Stroke::new();
    let mut position = vectors[0];
    stroke.push(position[0], position[1], position[2]);

    let mut velocity = vectors[1];
    for i in 0..3 {
        position[i] += velocity[i];
    }
    stroke.push(position[0], position[1], position[2]);

    for acceleration in &vectors[2..] {
        for i in 0..3 {
            velocity[i] += acceleration[i];
            position[i] += velocity[i];
        }
        stroke.push(position[0], position[1], position[2]);
    }

    Ok(stroke)
}

/// Convenience view of a decoded stroke as (x, y) pairs, for tests and
/// diagnostics.
pub fn xy(stroke: &Stroke) -> Vec<(f32, f32)> {
    stroke.points.iter().map(|p| (p.x, p.y)).collect()
}
