//! Canonical data model
//!
//! In-memory representation of handwriting samples (points, strokes, inks)
//! and their derived fixed-width tensors. Values are immutable once built;
//! every downstream stage consumes these types and produces new ones.

pub mod ink;
pub mod tensor;

pub use ink::{Ink, Point, Sample, Stroke};
pub use tensor::{Encoding, Tensor, TensorSample};
