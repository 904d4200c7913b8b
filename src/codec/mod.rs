//! Text Record Codec
//!
//! Bidirectional conversion between the ink/tensor data model and the
//! newline-delimited interchange grammar. Two independent implementations
//! (the training pipeline and the runtime recognizer) must agree on every
//! byte of this format, so the rules are spelled out once, here:
//!
//! - A file is a sequence of records separated by a single newline; a
//!   trailing newline is permitted.
//! - A record with a label is `LABEL '\t' BODY`; exactly one tab. A record
//!   without a label is just `BODY`.
//! - Ink body: strokes separated by `;`, points by `,`, the three numbers of
//!   a point by a single space, in order `x y t`.
//! - Tensor body: frames separated by `,`, numbers by a single space, in the
//!   encoding's fixed field order (spline: `dx dy dt stroke_end`).
//! - Numbers encode as fixed-point with four fractional digits; decoding
//!   accepts any decimal form, including exponents.
//!
//! Decoding is a pure function of one line. A corrupt line never affects its
//! neighbours; batch policy (abort vs. skip) belongs to the caller.

pub mod file;

use std::fmt::Write as _;

use crate::model::ink::{validate_label, Ink, Point, Sample, Stroke};
use crate::model::tensor::{Encoding, Tensor, TensorSample};
use crate::{Error, Result};

/// Split a record into its optional label and body at the first tab.
fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.split_once('\t') {
        Some((label, body)) => (Some(label), body),
        None => (None, line),
    }
}

/// Parse one numeric field, rejecting non-finite values.
fn parse_field(field: &str, context: &str) -> Result<f32> {
    let value: f32 = field
        .parse()
        .map_err(|_| Error::MalformedRecord(format!("{context}: unparseable number {field:?}")))?;
    if !value.is_finite() {
        return Err(Error::MalformedRecord(format!(
            "{context}: non-finite number {field:?}"
        )));
    }
    Ok(value)
}

/// Encode one ink sample as a single record line (without the newline).
pub fn encode_ink(sample: &Sample) -> Result<String> {
    sample.ink.check_nonempty()?;

    let mut out = String::new();
    if let Some(label) = &sample.label {
        validate_label(label)?;
        out.push_str(label);
        out.push('\t');
    }
    for (si, stroke) in sample.ink.strokes.iter().enumerate() {
        if si > 0 {
            out.push(';');
        }
        for (pi, p) in stroke.points.iter().enumerate() {
            if pi > 0 {
                out.push(',');
            }
            // write! to a String cannot fail
            let _ = write!(out, "{:.4} {:.4} {:.4}", p.x, p.y, p.t);
        }
    }
    Ok(out)
}

/// Decode one record line into an ink sample.
pub fn decode_ink(line: &str) -> Result<Sample> {
    let (label, body) = split_label(line);

    let mut ink = Ink::new();
    for stroke_text in body.split(';') {
        if stroke_text.trim().is_empty() {
            return Err(Error::MalformedRecord("empty stroke segment".into()));
        }
        let mut stroke = Stroke::new();
        for point_text in stroke_text.split(',') {
            if point_text.trim().is_empty() {
                return Err(Error::MalformedRecord("empty point segment".into()));
            }
            let fields: Vec<&str> = point_text.split(' ').filter(|f| !f.is_empty()).collect();
            if fields.len() != 3 {
                return Err(Error::MalformedRecord(format!(
                    "point {point_text:?} has {} fields, expected 3",
                    fields.len()
                )));
            }
            stroke.points.push(Point::new(
                parse_field(fields[0], "x")?,
                parse_field(fields[1], "y")?,
                parse_field(fields[2], "t")?,
            ));
        }
        ink.push_stroke(stroke);
    }

    Ok(Sample::new(label.map(str::to_owned), ink))
}

/// Encode one tensor sample as a single record line (without the newline).
pub fn encode_tensor(record: &TensorSample) -> Result<String> {
    record.tensor.check_shape()?;

    let mut out = String::new();
    if let Some(label) = &record.label {
        validate_label(label)?;
        out.push_str(label);
        out.push('\t');
    }
    for (fi, frame) in record.tensor.frames.iter().enumerate() {
        if fi > 0 {
            out.push(',');
        }
        for (vi, value) in frame.iter().enumerate() {
            if vi > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{value:.4}");
        }
    }
    Ok(out)
}

/// Decode one record line into a tensor of the declared encoding.
pub fn decode_tensor(line: &str, encoding: Encoding) -> Result<TensorSample> {
    let (label, body) = split_label(line);
    let width = encoding.width();

    let mut frames = Vec::new();
    for frame_text in body.split(',') {
        if frame_text.trim().is_empty() {
            return Err(Error::MalformedRecord("empty frame segment".into()));
        }
        let fields: Vec<&str> = frame_text.split(' ').filter(|f| !f.is_empty()).collect();
        if fields.len() != width {
            return Err(Error::MalformedRecord(format!(
                "frame {frame_text:?} has {} fields, expected {width}",
                fields.len()
            )));
        }
        let mut frame = Vec::with_capacity(width);
        for field in fields {
            frame.push(parse_field(field, "frame field")?);
        }
        frames.push(frame);
    }

    Ok(TensorSample::new(
        label.map(str::to_owned),
        Tensor::new(encoding, frames),
    ))
}
