//! Codec property tests
//!
//! Exercises the contract the training pipeline and the runtime recognizer
//! both rely on: lossless record round trips, spline invertibility, grammar
//! rejection, the legacy trace worked examples, and resampling determinism.

use ink_pipeline::codec;
use ink_pipeline::dataset::{Resampler, SourceRecord};
use ink_pipeline::model::ink::{Ink, Point, Sample, Stroke};
use ink_pipeline::model::tensor::Encoding;
use ink_pipeline::{spline, trace, Error};

fn ink_from(strokes: &[&[(f32, f32, f32)]]) -> Ink {
    Ink::from_strokes(
        strokes
            .iter()
            .map(|points| {
                Stroke::from_points(points.iter().map(|&(x, y, t)| Point::new(x, y, t)).collect())
            })
            .collect(),
    )
}

fn wavy_ink() -> Ink {
    let stroke_a: Vec<(f32, f32, f32)> = (0..40)
        .map(|i| {
            let t = i as f32 * 0.02;
            ((i as f32 * 0.3).sin() * 4.0 + i as f32, (i as f32 * 0.5).cos() * 2.0, t)
        })
        .collect();
    let stroke_b: Vec<(f32, f32, f32)> = (0..25)
        .map(|i| {
            let t = 1.0 + i as f32 * 0.02;
            (50.0 + i as f32, 3.0 - (i as f32 * 0.2).sin(), t)
        })
        .collect();
    ink_from(&[&stroke_a, &stroke_b])
}

#[test]
fn ink_record_round_trip() {
    let original = Sample::labeled("the quick brown fox", wavy_ink());
    let line = codec::encode_ink(&original).expect("encode");
    let decoded = codec::decode_ink(&line).expect("decode");

    assert_eq!(decoded.label, original.label);
    assert_eq!(decoded.ink.len(), original.ink.len());
    for (ds, os) in decoded.ink.strokes.iter().zip(&original.ink.strokes) {
        assert_eq!(ds.len(), os.len());
        for (dp, op) in ds.points.iter().zip(&os.points) {
            // Within the encoder's chosen fixed-point precision.
            assert!((dp.x - op.x).abs() < 1e-3);
            assert!((dp.y - op.y).abs() < 1e-3);
            assert!((dp.t - op.t).abs() < 1e-3);
        }
    }
}

#[test]
fn spline_encoding_inverts() {
    let original = wavy_ink();
    let tensor = spline::encode(&original).expect("encode");
    assert_eq!(tensor.len(), original.point_count());
    assert_eq!(tensor.width(), 4);

    let rebuilt = spline::reconstruct(&tensor).expect("reconstruct");
    assert_eq!(rebuilt.len(), original.len());
    for (rs, os) in rebuilt.strokes.iter().zip(&original.strokes) {
        assert_eq!(rs.len(), os.len());
        for (rp, op) in rs.points.iter().zip(&os.points) {
            assert!((rp.x - op.x).abs() < 1e-3);
            assert!((rp.y - op.y).abs() < 1e-3);
            assert!((rp.t - op.t).abs() < 1e-3);
        }
    }
}

#[test]
fn spline_boundaries_recovered_exactly() {
    let original = wavy_ink();
    let tensor = spline::encode(&original).expect("encode");

    let true_boundaries: Vec<usize> = original
        .strokes
        .iter()
        .scan(0usize, |acc, s| {
            *acc += s.len();
            Some(*acc - 1)
        })
        .collect();
    let flagged: Vec<usize> = tensor
        .frames
        .iter()
        .enumerate()
        .filter(|(_, f)| f[3] > 0.5)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(flagged, true_boundaries);
}

#[test]
fn grammar_rejection() {
    // A point with only two fields.
    assert!(matches!(
        codec::decode_ink("1 2,3 4 5"),
        Err(Error::MalformedRecord(_))
    ));
    // A non-numeric field in a labeled record.
    assert!(matches!(
        codec::decode_ink("a\tb 1,2 3 4"),
        Err(Error::MalformedRecord(_))
    ));
}

#[test]
fn legacy_trace_worked_example() {
    let stroke = trace::decode_trace("0 0,1 1,0 -1").expect("decode");
    assert_eq!(
        trace::xy(&stroke),
        vec![(0.0, 0.0), (1.0, 1.0), (2.0, 1.0)]
    );
}

#[test]
fn legacy_trace_sigil_tolerance() {
    let plain = trace::decode_trace("0 0,1 1,0 -1").expect("decode");
    let laden = trace::decode_trace("'0' 0,1 \"1\",0 -1").expect("decode");
    assert_eq!(trace::xy(&plain), trace::xy(&laden));
}

#[test]
fn resampling_is_deterministic() {
    let sources: Vec<SourceRecord> = (0..4)
        .map(|i| {
            SourceRecord::new(
                "trainset",
                Sample::labeled(
                    format!("label {i}"),
                    ink_from(&[&[(i as f32, 0.0, 0.0), (i as f32 + 1.0, 1.0, 0.1)]]),
                ),
            )
        })
        .collect();

    let resampler = Resampler::default();
    let first = resampler
        .resample(&sources, "trainset", 10, Some(99))
        .expect("resample");
    let second = resampler
        .resample(&sources, "trainset", 10, Some(99))
        .expect("resample");
    assert_eq!(first, second);
    assert_eq!(first.len(), 10);

    // At least one duplicated draw exists and none is byte-identical to its
    // source once encoded.
    let originals: Vec<String> = sources
        .iter()
        .map(|r| codec::encode_ink(&r.sample).expect("encode"))
        .collect();
    let mut augmented = 0;
    for sample in &first[4..] {
        let line = codec::encode_ink(sample).expect("encode");
        assert!(!originals.contains(&line));
        augmented += 1;
    }
    assert!(augmented > 0);
}

#[test]
fn empty_structures_rejected() {
    assert!(matches!(
        codec::encode_ink(&Sample::unlabeled(Ink::new())),
        Err(Error::EmptyStructure("ink"))
    ));
    assert!(matches!(
        codec::encode_ink(&Sample::unlabeled(Ink::from_strokes(vec![Stroke::new()]))),
        Err(Error::EmptyStructure("stroke"))
    ));
    assert!(matches!(
        Resampler::default().resample(&[], "trainset", 3, None),
        Err(Error::EmptySubset(_))
    ));
}

#[test]
fn tensor_record_round_trip_through_text() {
    let tensor = spline::encode(&wavy_ink()).expect("encode");
    let record = ink_pipeline::model::tensor::TensorSample::new(Some("fox".into()), tensor);
    let line = codec::encode_tensor(&record).expect("encode");
    let decoded = codec::decode_tensor(&line, Encoding::Spline).expect("decode");

    assert_eq!(decoded.label.as_deref(), Some("fox"));
    assert_eq!(decoded.tensor.len(), record.tensor.len());
    for (df, of) in decoded.tensor.frames.iter().zip(&record.tensor.frames) {
        for (dv, ov) in df.iter().zip(of) {
            assert!((dv - ov).abs() < 1e-3);
        }
    }
}
