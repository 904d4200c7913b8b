//! Tensor Data Types
//!
//! A tensor is an ordered sequence of fixed-width numeric frames derived from
//! exactly one ink. The frame width and field order are fixed per named
//! encoding; the bezier variant is reserved and deliberately unimplemented.

use std::fmt;

use crate::{Error, Result};

/// Named tensor encodings. Each variant carries a fixed frame width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Relative deltas plus a stroke-boundary flag: `dx dy dt stroke_end`.
    Spline,
    /// Reserved. Encoding with this variant fails with a clear error.
    Bezier,
}

impl Encoding {
    /// Fixed number of fields per frame.
    pub fn width(&self) -> usize {
        match self {
            Encoding::Spline => 4,
            Encoding::Bezier => 10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Spline => "spline",
            Encoding::Bezier => "bezier",
        }
    }

    /// Look up an encoding by its file-format name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "spline" => Ok(Encoding::Spline),
            "bezier" => Ok(Encoding::Bezier),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-width frame sequence derived from one ink.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub encoding: Encoding,
    pub frames: Vec<Vec<f32>>,
}

impl Tensor {
    pub fn new(encoding: Encoding, frames: Vec<Vec<f32>>) -> Self {
        Self { encoding, frames }
    }

    pub fn width(&self) -> usize {
        self.encoding.width()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Check the frame-count and frame-width invariants.
    pub fn check_shape(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::EmptyStructure("tensor"));
        }
        let width = self.width();
        for (i, frame) in self.frames.iter().enumerate() {
            if frame.len() != width {
                return Err(Error::MalformedRecord(format!(
                    "frame {} has {} fields, expected {}",
                    i,
                    frame.len(),
                    width
                )));
            }
        }
        Ok(())
    }
}

/// A labeled (or unlabeled) tensor: the unit of a tensor file.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorSample {
    pub label: Option<String>,
    pub tensor: Tensor,
}

impl TensorSample {
    pub fn new(label: Option<String>, tensor: Tensor) -> Self {
        Self { label, tensor }
    }
}
