//! Ink Normalization
//!
//! Scale and time normalization applied between corpus decoding and tensor
//! encoding, plus the validity screen for freshly decoded samples. The
//! normalized frame is: bounding-box minimum at the origin, height exactly
//! one, and time rescaled in proportion to width — a cheap stand-in for
//! normalizing time to path length that works well enough for latin script.

use tracing::warn;

use crate::model::ink::{Ink, Sample, Stroke};
use crate::{Error, Result};

/// Normalization and screening thresholds.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Inter-point gaps above this many seconds are treated as pauses and
    /// clamped out of the time axis.
    pub max_pause: f32,
    /// Minimum 2D distance between kept points, in normalized units.
    pub min_point_distance: f32,
    /// Gaps above this many seconds mark a sample as invalid.
    pub max_gap: f32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_pause: 0.5,
            min_point_distance: 0.05,
            max_gap: 8.0,
        }
    }
}

impl Normalizer {
    /// Full normalization: time repair, scale normalization, downsampling.
    pub fn normalize(&self, ink: &Ink) -> Result<Ink> {
        ink.check_nonempty()?;
        let mut out = ink.clone();
        self.repair_time(&mut out);
        self.rescale(&mut out)?;
        Ok(self.downsample(&out))
    }

    /// Force time monotonic and clamp long pauses.
    ///
    /// Reversals are raised to the running maximum; any gap longer than
    /// `max_pause` is shortened to it, with the excess subtracted from every
    /// later timestamp.
    pub fn repair_time(&self, ink: &mut Ink) {
        let Some(first) = ink.strokes.first().and_then(|s| s.points.first()) else {
            return;
        };
        let mut last = first.t;
        let mut pauses = 0.0;
        for stroke in &mut ink.strokes {
            for point in &mut stroke.points {
                let mut current = point.t - pauses;
                if current < last {
                    current = last;
                }
                let cap = last + self.max_pause;
                if current > cap {
                    pauses += current - cap;
                    current = cap;
                }
                point.t = current;
                last = current;
            }
        }
    }

    /// Translate to the origin and scale to unit height; time follows width.
    fn rescale(&self, ink: &mut Ink) -> Result<()> {
        let bounds = ink
            .bounds()
            .ok_or(Error::EmptyStructure("ink"))?;
        if bounds.height() <= 0.0 {
            return Err(Error::DegenerateInk(format!(
                "zero height (y range {}..{})",
                bounds.min_y, bounds.max_y
            )));
        }

        let scale = 1.0 / bounds.height();
        let time_scale = if bounds.duration() > 0.0 {
            scale * bounds.width() / bounds.duration()
        } else {
            1.0
        };

        for stroke in &mut ink.strokes {
            for p in &mut stroke.points {
                p.x = (p.x - bounds.min_x) * scale;
                p.y = (p.y - bounds.min_y) * scale;
                p.t = (p.t - bounds.min_t) * time_scale;
            }
        }
        Ok(())
    }

    /// Drop points too close to the previously kept point.
    ///
    /// The first and last point of every stroke always survive.
    pub fn downsample(&self, ink: &Ink) -> Ink {
        let min_sq = self.min_point_distance * self.min_point_distance;
        let mut out = Ink::new();
        for stroke in &ink.strokes {
            let Some((first, rest)) = stroke.points.split_first() else {
                continue;
            };
            let mut kept = Stroke::from_points(vec![*first]);
            if let Some((last, middle)) = rest.split_last() {
                for p in middle {
                    let prev = kept.points[kept.len() - 1];
                    let dx = p.x - prev.x;
                    let dy = p.y - prev.y;
                    if dx * dx + dy * dy > min_sq {
                        kept.points.push(*p);
                    }
                }
                kept.points.push(*last);
            }
            out.push_stroke(kept);
        }
        out
    }

    /// Why a decoded sample should be rejected, or `None` if it is fine.
    pub fn invalid_reason(&self, sample: &Sample) -> Option<String> {
        if sample.ink.is_empty() || sample.ink.strokes.iter().any(Stroke::is_empty) {
            return Some("empty ink".into());
        }

        let mut last = sample.ink.strokes[0].points[0].t;
        for p in sample.ink.points() {
            if p.t < last {
                return Some(format!("time goes backwards ({last} -> {})", p.t));
            }
            if p.t > last + self.max_gap {
                return Some(format!(
                    "implausibly long wait between samples ({last} -> {})",
                    p.t
                ));
            }
            last = p.t;
        }

        if let Some(label) = &sample.label {
            if label.contains(" \" ") || label.contains(" ' ") {
                return Some(format!("suspiciously spaced quote in text: {label:?}"));
            }
            if label.contains('#') {
                return Some(format!("transcription marked as erroneous: {label:?}"));
            }
        }

        None
    }

    /// Keep only valid samples; returns the survivors and the rejected count.
    pub fn filter_valid(&self, samples: Vec<Sample>) -> (Vec<Sample>, usize) {
        let mut valid = Vec::with_capacity(samples.len());
        let mut rejected = 0;
        for sample in samples {
            match self.invalid_reason(&sample) {
                Some(reason) => {
                    warn!(label = ?sample.label, reason = %reason, "rejecting sample");
                    rejected += 1;
                }
                None => valid.push(sample),
            }
        }
        (valid, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink(points: &[(f32, f32, f32)]) -> Ink {
        let mut stroke = Stroke::new();
        for &(x, y, t) in points {
            stroke.push(x, y, t);
        }
        Ink::from_strokes(vec![stroke])
    }

    #[test]
    fn test_normalize_unit_height_at_origin() {
        let normalized = Normalizer::default()
            .normalize(&ink(&[(10.0, 20.0, 0.0), (30.0, 40.0, 0.2)]))
            .unwrap();
        let b = normalized.bounds().unwrap();
        assert!((b.height() - 1.0).abs() < 1e-5);
        assert!(b.min_x.abs() < 1e-6);
        assert!(b.min_y.abs() < 1e-6);
        assert!(b.min_t.abs() < 1e-6);
    }

    #[test]
    fn test_normalize_time_follows_width() {
        // Width 2x height, 1 second of writing: duration maps to 2.0.
        let normalized = Normalizer::default()
            .normalize(&ink(&[(0.0, 0.0, 0.0), (20.0, 10.0, 0.4)]))
            .unwrap();
        let b = normalized.bounds().unwrap();
        assert!((b.duration() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_rejects_flat_ink() {
        let result = Normalizer::default().normalize(&ink(&[(0.0, 5.0, 0.0), (9.0, 5.0, 0.1)]));
        assert!(matches!(result, Err(Error::DegenerateInk(_))));
    }

    #[test]
    fn test_repair_time_monotonic() {
        let mut sample = ink(&[(0.0, 0.0, 0.3), (1.0, 1.0, 0.1), (2.0, 2.0, 0.4)]);
        Normalizer::default().repair_time(&mut sample);
        let times: Vec<f32> = sample.points().map(|p| p.t).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(times[1], 0.3);
    }

    #[test]
    fn test_repair_time_clamps_pauses() {
        // A 3-second stare at the page shrinks to the pause cap, and the
        // excess is carried forward.
        let mut sample = ink(&[(0.0, 0.0, 0.0), (1.0, 1.0, 3.0), (2.0, 2.0, 3.1)]);
        Normalizer::default().repair_time(&mut sample);
        let times: Vec<f32> = sample.points().map(|p| p.t).collect();
        assert!((times[1] - 0.5).abs() < 1e-6);
        assert!((times[2] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_downsample_keeps_endpoints() {
        let dense = ink(&[
            (0.0, 0.0, 0.0),
            (0.001, 0.001, 0.01),
            (0.002, 0.001, 0.02),
            (1.0, 1.0, 0.1),
        ]);
        let sparse = Normalizer::default().downsample(&dense);
        assert_eq!(sparse.strokes[0].len(), 2);
        assert_eq!(sparse.strokes[0].points[0].x, 0.0);
        assert_eq!(sparse.strokes[0].points[1].x, 1.0);
    }

    #[test]
    fn test_downsample_single_point_stroke() {
        let single = ink(&[(1.0, 2.0, 0.0)]);
        let out = Normalizer::default().downsample(&single);
        assert_eq!(out.strokes[0].len(), 1);
    }

    #[test]
    fn test_invalid_reason_time_reversal() {
        let sample = Sample::labeled("ok", ink(&[(0.0, 0.0, 1.0), (1.0, 1.0, 0.5)]));
        let reason = Normalizer::default().invalid_reason(&sample);
        assert!(reason.expect("rejected").contains("backwards"));
    }

    #[test]
    fn test_invalid_reason_long_gap() {
        let sample = Sample::labeled("ok", ink(&[(0.0, 0.0, 0.0), (1.0, 1.0, 20.0)]));
        let reason = Normalizer::default().invalid_reason(&sample);
        assert!(reason.expect("rejected").contains("long wait"));
    }

    #[test]
    fn test_invalid_reason_bad_labels() {
        let n = Normalizer::default();
        let good = ink(&[(0.0, 0.0, 0.0), (1.0, 1.0, 0.1)]);
        assert!(n
            .invalid_reason(&Sample::labeled("a \" b", good.clone()))
            .is_some());
        assert!(n
            .invalid_reason(&Sample::labeled("bad # mark", good.clone()))
            .is_some());
        assert!(n.invalid_reason(&Sample::labeled("fine", good)).is_none());
    }

    #[test]
    fn test_filter_valid_counts() {
        let good = Sample::labeled("ok", ink(&[(0.0, 0.0, 0.0), (1.0, 1.0, 0.1)]));
        let bad = Sample::labeled("ok", ink(&[(0.0, 0.0, 1.0), (1.0, 1.0, 0.0)]));
        let (valid, rejected) = Normalizer::default().filter_valid(vec![good, bad]);
        assert_eq!(valid.len(), 1);
        assert_eq!(rejected, 1);
    }
}
