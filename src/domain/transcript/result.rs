//! Transcription result and document parsing

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{SpeakerSegment, TranscriptItem};

/// Fields extracted from a completed job's output document.
///
/// Parsing never fails: missing or malformed parts become empty values and
/// are listed in `warnings`.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub job_name: String,
    pub transcript_text: String,
    /// `results.items` exactly as the service wrote them
    pub items: Vec<Value>,
    pub speaker_segments: Vec<SpeakerSegment>,
    pub raw_document: Value,
    pub warnings: Vec<String>,
}

impl TranscriptionResult {
    /// Project a transcript document into a result
    pub fn from_document(job_name: impl Into<String>, document: Value) -> Self {
        let mut warnings = Vec::new();

        let results = match document.get("results") {
            Some(results) if results.is_object() => Some(results),
            Some(_) => {
                warnings.push("results is not an object".to_string());
                None
            }
            None => {
                warnings.push("document has no results".to_string());
                None
            }
        };

        let (transcript_text, items, speaker_segments) = match results {
            Some(results) => (
                transcript_text(results, &mut warnings),
                raw_items(results.get("items"), &mut warnings),
                parse_list::<SpeakerSegment>(
                    results.get("speaker_labels").and_then(|l| l.get("segments")),
                    "speaker segments",
                    &mut warnings,
                ),
            ),
            None => (String::new(), Vec::new(), Vec::new()),
        };

        Self {
            job_name: job_name.into(),
            transcript_text,
            items,
            speaker_segments,
            raw_document: document,
            warnings,
        }
    }

    /// Distinct speaker labels in order of first appearance
    pub fn speakers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.speaker_segments {
            if !seen.contains(&segment.speaker_label.as_str()) {
                seen.push(&segment.speaker_label);
            }
        }
        seen
    }

    /// Typed views of the items; entries without the item shape are left out
    pub fn typed_items(&self) -> Vec<TranscriptItem> {
        self.items.iter().filter_map(TranscriptItem::from_value).collect()
    }

    /// Whether anything was dropped or defaulted while parsing
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// First entry of `results.transcripts`, or empty
fn transcript_text(results: &Value, warnings: &mut Vec<String>) -> String {
    let text = results
        .get("transcripts")
        .and_then(Value::as_array)
        .and_then(|t| t.first())
        .and_then(|t| t.get("transcript"))
        .and_then(Value::as_str);

    match text {
        Some(text) => text.to_string(),
        None => {
            warnings.push("no transcript text".to_string());
            String::new()
        }
    }
}

fn raw_items(value: Option<&Value>, warnings: &mut Vec<String>) -> Vec<Value> {
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            warnings.push("items is not a list".to_string());
            Vec::new()
        }
    }
}

/// Parse each array element on its own so one bad entry keeps its siblings.
/// An absent list is not a warning.
fn parse_list<T: DeserializeOwned>(
    value: Option<&Value>,
    what: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        warnings.push(format!("{} is not a list", what));
        return Vec::new();
    };

    let mut parsed = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<T>(entry.clone()) {
            Ok(item) => parsed.push(item),
            Err(e) => warnings.push(format!("skipped {} entry {}: {}", what, index, e)),
        }
    }
    parsed
}
