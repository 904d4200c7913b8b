//! Spline Tensor Encoding
//!
//! Deterministic, lossy-by-design transform from an ink to a fixed-width
//! frame sequence, and its inverse. Each frame is `(dx, dy, dt, stroke_end)`
//! where the deltas are taken from the immediately preceding point of the
//! whole ink — the accumulator is NOT reset at stroke boundaries, which is
//! what makes absolute reconstruction well-defined across the ink. The first
//! frame is all-zero deltas by construction.
//!
//! `stroke_end` is written as a hard 0/1, but read against a `0.5` threshold
//! so that post-processed values (e.g. model output probabilities) still
//! reconstruct.

use crate::model::ink::{Ink, Point, Stroke};
use crate::model::tensor::{Encoding, Tensor};
use crate::{Error, Result};

/// A boundary flag strictly greater than this closes the current stroke.
pub const STROKE_END_THRESHOLD: f32 = 0.5;

/// Encode an ink as a spline tensor.
pub fn encode(ink: &Ink) -> Result<Tensor> {
    ink.check_nonempty()?;

    let mut frames = Vec::with_capacity(ink.point_count());
    let mut last = Point::new(0.0, 0.0, 0.0);
    for stroke in &ink.strokes {
        let end = stroke.len() - 1;
        for (i, p) in stroke.points.iter().enumerate() {
            let flag = if i == end { 1.0 } else { 0.0 };
            frames.push(vec![p.x - last.x, p.y - last.y, p.t - last.t, flag]);
            last = *p;
        }
    }
    Ok(Tensor::new(Encoding::Spline, frames))
}

/// Reconstruct the absolute ink from a spline tensor.
///
/// Used for verification and visualization; the runtime recognizer consumes
/// frames directly and never round-trips through this.
pub fn reconstruct(tensor: &Tensor) -> Result<Ink> {
    if tensor.encoding != Encoding::Spline {
        return Err(Error::UnsupportedEncoding(tensor.encoding.to_string()));
    }
    tensor.check_shape()?;

    let mut ink = Ink::new();
    let mut stroke = Stroke::new();
    let mut position = Point::new(0.0, 0.0, 0.0);
    for frame in &tensor.frames {
        position.x += frame[0];
        position.y += frame[1];
        position.t += frame[2];
        stroke.points.push(position);
        if frame[3] > STROKE_END_THRESHOLD {
            ink.push_stroke(std::mem::take(&mut stroke));
        }
    }
    // A tensor ending mid-stroke still yields that partial stroke.
    if !stroke.is_empty() {
        ink.push_stroke(stroke);
    }
    Ok(ink)
}
