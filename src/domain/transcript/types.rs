//! Typed views of the transcription output document

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// The service writes times and confidences as decimal strings ("1.25").
/// Plain numbers are accepted too. Non-finite values are rejected since they
/// cannot be written back as JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

impl Decimal {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        let (value, text) = match self {
            Self::Number(value) => (Some(value), value.to_string()),
            Self::Text(text) => (text.trim().parse::<f64>().ok(), text),
        };
        match value {
            Some(value) if value.is_finite() => Ok(value),
            _ => Err(E::custom(format!("not a decimal: {:?}", text))),
        }
    }
}

fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Decimal::deserialize(deserializer)?.into_f64()
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Decimal>::deserialize(deserializer)?
        .map(Decimal::into_f64)
        .transpose()
}

/// One recognition candidate for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub confidence: Option<f64>,
}

/// Typed view of a word or punctuation mark with its timing.
///
/// Items are kept verbatim as JSON on [`TranscriptionResult`](super::TranscriptionResult);
/// this view is built on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// Punctuation items carry no timing
    #[serde(default, deserialize_with = "optional_decimal")]
    pub start_time: Option<f64>,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_label: Option<String>,
}

impl TranscriptItem {
    /// Typed view of a raw item, `None` if it does not have the item shape
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    /// Most likely content of the item
    pub fn content(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.content.as_str())
    }

    pub fn is_punctuation(&self) -> bool {
        self.item_type == "punctuation"
    }
}

/// A timed span inside a speaker segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentItem {
    pub speaker_label: String,
    #[serde(deserialize_with = "decimal")]
    pub start_time: f64,
    #[serde(deserialize_with = "decimal")]
    pub end_time: f64,
}

/// A span of audio attributed to one speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    pub speaker_label: String,
    #[serde(deserialize_with = "decimal")]
    pub start_time: f64,
    #[serde(deserialize_with = "decimal")]
    pub end_time: f64,
    #[serde(default)]
    pub items: Vec<SegmentItem>,
}

impl SpeakerSegment {
    /// Length of the segment in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
