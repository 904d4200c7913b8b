//! Dataset Balancing
//!
//! Builds fixed-size dataset splits from heterogeneous labeled ink
//! collections. Sources are tagged with a subset key; a split is the result
//! of filtering to one key and resampling to a target cardinality —
//! deterministic selection when the subset is large enough, sampling with
//! replacement plus a light perturbation when it is not, so repeated draws
//! are never byte-identical.
//!
//! All randomness is explicitly seeded. Reruns over the same sources produce
//! the same split, which is what keeps train/test separation honest across
//! independent builds.

pub mod normalize;
pub mod validate;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::ink::{Ink, Sample, Stroke};
use crate::{Error, Result};

/// A source sample tagged with the subset it belongs to.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub subset: String,
    pub sample: Sample,
}

impl SourceRecord {
    pub fn new(subset: impl Into<String>, sample: Sample) -> Self {
        Self {
            subset: subset.into(),
            sample,
        }
    }
}

/// Resampling and augmentation policy.
#[derive(Debug, Clone)]
pub struct Resampler {
    /// Jitter magnitude `j`: scale factors are drawn from `[1-j, 1+j)` and
    /// the x-from-y shear from `[-2j, 2j)`.
    pub jitter: f32,
    /// Whether duplicated draws also get their time axis rescaled.
    pub perturb_time: bool,
}

impl Default for Resampler {
    fn default() -> Self {
        Self {
            jitter: 0.1,
            perturb_time: true,
        }
    }
}

impl Resampler {
    pub fn new(jitter: f32, perturb_time: bool) -> Self {
        Self {
            jitter,
            perturb_time,
        }
    }

    /// Build a split of exactly `target_size` samples for `target_key`.
    ///
    /// With no explicit seed, one is derived from the subset key and target
    /// size so that independent runs agree.
    pub fn resample(
        &self,
        sources: &[SourceRecord],
        target_key: &str,
        target_size: usize,
        seed: Option<u64>,
    ) -> Result<Vec<Sample>> {
        let filtered: Vec<&Sample> = sources
            .iter()
            .filter(|r| r.subset == target_key)
            .map(|r| &r.sample)
            .collect();

        if filtered.is_empty() {
            if target_size == 0 {
                return Ok(Vec::new());
            }
            return Err(Error::EmptySubset(target_key.to_string()));
        }

        let seed = seed.unwrap_or_else(|| derive_seed(target_key, target_size));
        let mut rng = StdRng::seed_from_u64(seed);
        debug!(
            subset = target_key,
            available = filtered.len(),
            target = target_size,
            seed,
            "resampling"
        );

        if filtered.len() >= target_size {
            // Seeded selection that preserves the source order of the kept
            // records.
            let mut indices: Vec<usize> = (0..filtered.len()).collect();
            indices.shuffle(&mut rng);
            indices.truncate(target_size);
            indices.sort_unstable();
            Ok(indices.into_iter().map(|i| filtered[i].clone()).collect())
        } else {
            let mut output: Vec<Sample> = filtered.iter().map(|s| (*s).clone()).collect();
            while output.len() < target_size {
                let pick = rng.gen_range(0..filtered.len());
                output.push(self.augment(filtered[pick], &mut rng));
            }
            Ok(output)
        }
    }

    /// Apply the perturbation policy to one sample.
    ///
    /// A random affine transform: independent scale on x, y (and t when
    /// enabled) plus an x-from-y shear. The label is carried unchanged.
    pub fn augment(&self, sample: &Sample, rng: &mut StdRng) -> Sample {
        let j = self.jitter;
        let sx = rng.gen_range(1.0 - j..1.0 + j);
        let sy = rng.gen_range(1.0 - j..1.0 + j);
        let shear = rng.gen_range(-2.0 * j..2.0 * j);
        let st = if self.perturb_time {
            rng.gen_range(1.0 - j..1.0 + j)
        } else {
            1.0
        };

        let mut ink = Ink::new();
        for stroke in &sample.ink.strokes {
            let mut out = Stroke::new();
            for p in &stroke.points {
                out.push(p.x * sx + p.y * shear, p.y * sy, p.t * st);
            }
            ink.push_stroke(out);
        }
        Sample::new(sample.label.clone(), ink)
    }
}

/// Derive a reproducible seed from the subset key and target size (FNV-1a).
pub fn derive_seed(target_key: &str, target_size: usize) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in target_key
        .bytes()
        .chain(target_size.to_le_bytes().into_iter())
    {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
