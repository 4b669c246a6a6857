//! Results table sink port interface

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::tables::{CallTranscript, SpeakerUtterance, TranscriptRecord};

/// Sink errors. These abort a run.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("I/O error on table {table}: {message}")]
    Io { table: String, message: String },

    #[error("Failed to serialize row for table {table}: {message}")]
    Serialize { table: String, message: String },

    #[error("Corrupt row in table {table} at line {line}: {message}")]
    Corrupt {
        table: String,
        line: usize,
        message: String,
    },
}

/// Port for the results tables.
///
/// The raw table only ever grows. Derived tables are replaced wholesale.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// File keys already present in the raw table. Empty if the table does not exist yet.
    async fn processed_file_keys(&self) -> Result<HashSet<String>, SinkError>;

    /// Append rows to the raw table
    async fn append_transcripts(&self, records: &[TranscriptRecord]) -> Result<(), SinkError>;

    /// All rows of the raw table in insertion order
    async fn load_transcripts(&self) -> Result<Vec<TranscriptRecord>, SinkError>;

    /// Replace the per-call table
    async fn replace_call_transcripts(&self, rows: &[CallTranscript]) -> Result<(), SinkError>;

    /// Replace the utterances table
    async fn replace_speaker_utterances(&self, rows: &[SpeakerUtterance])
        -> Result<(), SinkError>;

    /// All rows of the utterances table
    async fn load_speaker_utterances(&self) -> Result<Vec<SpeakerUtterance>, SinkError>;
}
