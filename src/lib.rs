//! # Ink Pipeline
//!
//! Converts raw handwriting stroke capture into canonical ink records,
//! balanced dataset splits, and fixed-width tensor files for sequence-model
//! training and on-device inference.
//!
//! ## Overview
//!
//! Handwriting arrives from two directions: pen/tablet capture logs written
//! by a digitizer frontend, and legacy XML handwriting corpora that encode
//! each trace as a finite-difference coordinate string. Both are decoded into
//! the same in-memory [`model::ink::Ink`] representation, persisted through
//! the line-oriented text codec, rebalanced into train/validation/test
//! splits, and finally encoded as relative-coordinate spline tensors.
//!
//! The codec is the load-bearing piece: the training pipeline and the
//! runtime recognizer never share a process, so every delimiter, rounding
//! rule, and boundary flag is fixed here and nowhere else.
//!
//! ## Architecture
//!
//! - [`model`]: canonical ink and tensor data types
//! - [`codec`]: text record grammar and file-level readers/writers
//! - [`spline`]: relative-delta tensor encoding and its inverse
//! - [`trace`]: legacy finite-difference trace decoding and corpus extraction
//! - [`dataset`]: resampling/augmentation, normalization, tensor validation
//! - [`pipeline`]: one pure stage per derived file
//! - [`app`]: CLI and configuration management
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ legacy corpus│──▶│  ink model  │──▶│  resampler  │──▶│    spline    │
//! │ /capture log │   │ (ink files) │   │  (balanced  │   │   encoder    │
//! └──────────────┘   └─────────────┘   │   splits)   │   │(tensor files)│
//!                                      └─────────────┘   └──────────────┘
//! ```

pub mod app;
pub mod codec;
pub mod dataset;
pub mod model;
pub mod pipeline;
pub mod spline;
pub mod trace;

// Re-export commonly used types
pub use model::ink::{Ink, Point, Sample, Stroke};
pub use model::tensor::{Encoding, Tensor, TensorSample};

/// Result type alias for the ink pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the ink pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A text record violates the codec grammar: unparseable number, wrong
    /// field count, or an empty segment.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A label contains whitespace other than the ASCII space.
    #[error("invalid label {0:?}: only ASCII space is allowed as whitespace")]
    InvalidLabel(String),

    /// A legacy trace string has too few component lines or a line with no
    /// numeric tokens.
    #[error("invalid trace format: {0}")]
    InvalidTraceFormat(String),

    /// Resampling was requested from a subset with zero matching records.
    #[error("no records found for subset {0:?}")]
    EmptySubset(String),

    /// An ink or tensor with zero strokes, points, or frames was presented
    /// for encoding.
    #[error("empty {0} cannot be encoded")]
    EmptyStructure(&'static str),

    /// The named tensor encoding is reserved but not implemented.
    #[error("encoding {0:?} is not supported")]
    UnsupportedEncoding(String),

    /// An ink cannot be normalized (e.g. zero bounding-box height).
    #[error("degenerate ink: {0}")]
    DegenerateInk(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
