//! Rows of the results tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::transcript::{SpeakerSegment, TranscriptionResult};

/// Row of the append-only raw transcriptions table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub job_name: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub transcript_text: String,
    /// The full output document, serialized
    pub transcript_json: String,
    pub transcription_timestamp: Option<DateTime<Utc>>,
    pub ingestion_timestamp: DateTime<Utc>,
}

impl TranscriptRecord {
    /// Build a raw row from a parsed result
    pub fn from_result(
        result: &TranscriptionResult,
        file_key: Option<String>,
        file_name: Option<String>,
        transcription_timestamp: Option<DateTime<Utc>>,
        ingestion_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            job_name: result.job_name.clone(),
            file_key,
            file_name,
            transcript_text: result.transcript_text.clone(),
            transcript_json: result.raw_document.to_string(),
            transcription_timestamp,
            ingestion_timestamp,
        }
    }

    /// Re-parse the stored document
    pub fn parse(&self) -> TranscriptionResult {
        let document = serde_json::from_str(&self.transcript_json).unwrap_or_default();
        TranscriptionResult::from_document(self.job_name.clone(), document)
    }
}

/// Row of the derived per-call table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTranscript {
    pub job_name: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub transcript_text: String,
    pub speaker_segments: Vec<SpeakerSegment>,
    pub transcription_timestamp: DateTime<Utc>,
    pub ingestion_timestamp: DateTime<Utc>,
    pub processed_timestamp: DateTime<Utc>,
}

/// Row of the derived utterances table, one per speaker segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerUtterance {
    pub job_name: String,
    pub file_name: Option<String>,
    pub speaker_label: String,
    pub start_time_seconds: f64,
    pub end_time_seconds: f64,
    pub duration_seconds: f64,
    pub transcript_text: String,
    pub transcription_timestamp: DateTime<Utc>,
}
