//! Corpus Document Extraction
//!
//! Pulls labeled trace groups out of a legacy XML-ish corpus document. The
//! corpus markup is scanned with tolerant patterns in document order — trace
//! elements, annotation texts, and `traceDataRef` references — rather than
//! parsed as XML; the upstream documents are not reliable enough to deserve
//! a grammar, and the only content we need is the text of individual trace
//! elements plus the reference chains that tie them to transcriptions.
//!
//! One referenced trace becomes one stroke; all traces referenced by a
//! labeled group concatenate, in reference order, into one ink. Time is
//! rebased so each ink starts at zero, since corpus epoch timestamps would
//! otherwise overflow `f32`.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::model::ink::{Ink, Sample, Stroke};
use crate::trace::decode_trace;
use crate::{Error, Result};

/// Structural annotation texts that mark grouping nodes rather than
/// transcriptions.
const STRUCTURAL: &[&str] = &[
    "Document",
    "Textblock",
    "Textline",
    "Word",
    "Table",
    "List",
    "Drawing",
    "Diagram",
    "Formula",
    "Arrow",
    "Marking",
    "Garbage",
    "Correction",
];

fn trace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<trace[^>]*\bid\s*=\s*"([^"]+)"[^>]*>(.*?)</trace>"#)
            .expect("static pattern compiles")
    })
}

fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<annotation[^>]*>([^<]*)</annotation>").expect("static pattern compiles")
    })
}

fn ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r##"traceDataRef\s*=\s*"#?([^"]+)""##).expect("static pattern compiles")
    })
}

fn mapping_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"<mapping[^>]*type\s*=\s*"([^"]+)""#).expect("static pattern compiles"))
}

/// A document-order event: either an annotation text or a trace reference.
#[derive(Debug)]
enum Event {
    Annotation(String),
    Ref(String),
}

/// Extract all labeled text-line samples from one corpus document.
pub fn extract_samples(document: &str) -> Result<Vec<Sample>> {
    extract_samples_of(document, "Textline")
}

/// Extract labeled samples whose group annotation matches `node_type`
/// (`"Textline"` or `"Word"`).
pub fn extract_samples_of(document: &str, node_type: &str) -> Result<Vec<Sample>> {
    let traces = decode_traces(document)?;

    if let Some(m) = mapping_pattern().captures(document) {
        let kind = &m[1];
        if kind != "identity" {
            warn!(mapping = kind, "non-identity mapping; coordinates taken as-is");
        }
    }

    let events = scan_events(document);
    let mut samples = Vec::new();

    let mut i = 0;
    while i < events.len() {
        let Event::Annotation(text) = &events[i] else {
            i += 1;
            continue;
        };
        if text != node_type {
            i += 1;
            continue;
        }

        // The transcription is the next annotation; a structural one means
        // the group carries no text and is skipped.
        let mut j = i + 1;
        while j < events.len() && matches!(events[j], Event::Ref(_)) {
            j += 1;
        }
        let Some(Event::Annotation(raw)) = events.get(j) else {
            break;
        };
        if STRUCTURAL.contains(&raw.as_str()) {
            i = j;
            continue;
        }

        // References follow the transcription until the next annotation.
        let mut refs = Vec::new();
        let mut k = j + 1;
        while let Some(Event::Ref(id)) = events.get(k) {
            refs.push(id.clone());
            k += 1;
        }
        i = k;

        let Some(transcription) = clean_transcription(raw) else {
            continue;
        };

        let mut ink = Ink::new();
        for id in &refs {
            match traces.get(id) {
                Some(stroke) => ink.push_stroke(stroke.clone()),
                None => warn!(id = %id, "reference to unknown trace; skipping stroke"),
            }
        }
        if ink.is_empty() {
            continue;
        }
        rebase_time(&mut ink);
        samples.push(Sample::labeled(transcription, ink));
    }

    debug!(count = samples.len(), "extracted corpus samples");
    Ok(samples)
}

/// Decode every trace element into an id -> stroke map.
fn decode_traces(document: &str) -> Result<HashMap<String, Stroke>> {
    let mut traces = HashMap::new();
    for captures in trace_pattern().captures_iter(document) {
        let id = captures[1].to_string();
        let stroke = decode_trace(&captures[2])?;
        traces.insert(id, stroke);
    }
    if traces.is_empty() {
        return Err(Error::InvalidTraceFormat(
            "document contains no trace elements".into(),
        ));
    }
    Ok(traces)
}

/// Collect annotations and trace references in document order.
fn scan_events(document: &str) -> Vec<Event> {
    let mut events: Vec<(usize, Event)> = Vec::new();
    for m in annotation_pattern().captures_iter(document) {
        let pos = m.get(0).map(|g| g.start()).unwrap_or(0);
        events.push((pos, Event::Annotation(m[1].trim().to_string())));
    }
    for m in ref_pattern().captures_iter(document) {
        let pos = m.get(0).map(|g| g.start()).unwrap_or(0);
        events.push((pos, Event::Ref(m[1].to_string())));
    }
    events.sort_by_key(|(pos, _)| *pos);
    events.into_iter().map(|(_, e)| e).collect()
}

/// Shift the whole ink so its first point is at time zero.
fn rebase_time(ink: &mut Ink) {
    let Some(origin) = ink.strokes.first().and_then(|s| s.points.first()).map(|p| p.t) else {
        return;
    };
    for stroke in &mut ink.strokes {
        for point in &mut stroke.points {
            point.t -= origin;
        }
    }
}

/// Tidy a raw transcription, or reject it entirely.
///
/// The corpus transcribers left spaces around punctuation and used sigil
/// pairs for quotes; tidy those up the way the original transcripts intend.
fn clean_transcription(raw: &str) -> Option<String> {
    let mut text = raw.trim().replace('´', "'");

    if text.is_empty() || text.contains("<Symbol/>") {
        return None;
    }
    if text.len() == 1 && " .,-'\"".contains(&text) {
        return None;
    }

    for (from, to) in [
        (",,", "\""),
        ("`", "'"),
        (" ,", ","),
        (" .", "."),
        (" !", "!"),
        (" ?", "?"),
        (" )", ")"),
        ("( ", "("),
        (" :", ":"),
        ("n ' t", "n't"),
        (" ' s ", "'s "),
    ] {
        text = text.replace(from, to);
    }
    for (prefix, replacement) in [("\" ", "\""), ("' ", "'")] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = format!("{replacement}{rest}");
        }
    }
    for (suffix, replacement) in [(" \"", "\""), (" '", "'")] {
        if let Some(rest) = text.strip_suffix(suffix) {
            text = format!("{rest}{replacement}");
        }
    }

    if let Some(bad) = text
        .chars()
        .find(|&c| !(c == ' ' || c.is_ascii_alphanumeric() || c.is_ascii_punctuation()))
    {
        warn!(character = %bad, text = %text, "invalid character in transcription; skipping");
        return None;
    }

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<ink>
  <definitions><mapping type="identity"/></definitions>
  <trace xml:id="t1">0 0 0,1 1 1,0 -1 0</trace>
  <trace xml:id="t2">10 10 5,1 0 1</trace>
  <trace xml:id="t3">20 0 9,0 1 1</trace>
  <traceView>
    <annotation>Document</annotation>
    <traceView>
      <annotation>Textblock</annotation>
      <traceView>
        <annotation>Textline</annotation>
        <annotation>hi there</annotation>
        <traceView traceDataRef="#t1"/>
        <traceView traceDataRef="#t2"/>
      </traceView>
      <traceView>
        <annotation>Textline</annotation>
        <annotation>bye</annotation>
        <traceView traceDataRef="#t3"/>
      </traceView>
    </traceView>
  </traceView>
</ink>"##;

    #[test]
    fn test_extracts_labeled_groups() {
        let samples = extract_samples(DOC).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label.as_deref(), Some("hi there"));
        assert_eq!(samples[0].ink.len(), 2);
        assert_eq!(samples[1].label.as_deref(), Some("bye"));
        assert_eq!(samples[1].ink.len(), 1);
    }

    #[test]
    fn test_traces_decode_as_strokes() {
        let samples = extract_samples(DOC).unwrap();
        let first = &samples[0].ink.strokes[0];
        // 0 0,1 1,0 -1 integrates to (0,0),(1,1),(2,1)
        assert_eq!(first.points[2].x, 2.0);
        assert_eq!(first.points[2].y, 1.0);
    }

    #[test]
    fn test_time_rebased_per_ink() {
        let samples = extract_samples(DOC).unwrap();
        // Every ink starts at t = 0 regardless of corpus epoch.
        for sample in &samples {
            let first = sample.ink.strokes[0].points[0];
            assert_eq!(first.t, 0.0);
        }
        // t2 starts 5 units after t1 within the same ink.
        assert_eq!(samples[0].ink.strokes[1].points[0].t, 5.0);
    }

    #[test]
    fn test_unknown_reference_skipped() {
        let doc = r##"
  <trace id="t1">0 0,1 1</trace>
  <annotation>Textline</annotation>
  <annotation>word</annotation>
  <traceView traceDataRef="#missing"/>
  <traceView traceDataRef="#t1"/>
"##;
        let samples = extract_samples(doc).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].ink.len(), 1);
    }

    #[test]
    fn test_group_without_transcription_skipped() {
        let doc = r##"
  <trace id="t1">0 0,1 1</trace>
  <annotation>Textline</annotation>
  <annotation>Textblock</annotation>
  <traceView traceDataRef="#t1"/>
"##;
        let samples = extract_samples(doc).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_no_traces_is_error() {
        assert!(matches!(
            extract_samples("<ink></ink>"),
            Err(Error::InvalidTraceFormat(_))
        ));
    }

    #[test]
    fn test_clean_transcription() {
        assert_eq!(
            clean_transcription("hello , world .").as_deref(),
            Some("hello, world.")
        );
        assert_eq!(
            clean_transcription(",,quoted,, words").as_deref(),
            Some("\"quoted\" words")
        );
        assert_eq!(clean_transcription("don ' t").as_deref(), Some("don't"));
        assert_eq!(clean_transcription("").as_deref(), None);
        assert_eq!(clean_transcription("-").as_deref(), None);
        assert_eq!(clean_transcription("has <Symbol/> marker").as_deref(), None);
    }

    #[test]
    fn test_clean_strips_edge_quote_spacing() {
        assert_eq!(
            clean_transcription("\" inner words \"").as_deref(),
            Some("\"inner words\"")
        );
    }

    #[test]
    fn test_non_ascii_transcription_rejected() {
        assert_eq!(clean_transcription("héllo").as_deref(), None);
    }
}
