//! Write results and summarize use cases

use chrono::Utc;
use tracing::info;

use crate::domain::tables::{call_transcripts, speaker_utterances, CallSummary, TranscriptRecord};

use super::ports::{ResultSink, SinkError};

/// Output from the write use case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutput {
    /// Rows appended to the raw table
    pub appended: usize,
    /// Rows in the rebuilt per-call table
    pub call_transcripts: usize,
    /// Rows in the rebuilt utterances table
    pub utterances: usize,
}

/// Appends raw rows and rebuilds the derived tables
pub struct WriteResultsUseCase<'a, S>
where
    S: ResultSink,
{
    sink: &'a S,
}

impl<'a, S> WriteResultsUseCase<'a, S>
where
    S: ResultSink,
{
    pub fn new(sink: &'a S) -> Self {
        Self { sink }
    }

    pub async fn execute(&self, records: &[TranscriptRecord]) -> Result<WriteOutput, SinkError> {
        if !records.is_empty() {
            self.sink.append_transcripts(records).await?;
        }

        let raw = self.sink.load_transcripts().await?;
        let calls = call_transcripts(&raw, Utc::now());
        let utterances = speaker_utterances(&calls);

        self.sink.replace_call_transcripts(&calls).await?;
        self.sink.replace_speaker_utterances(&utterances).await?;

        info!(
            appended = records.len(),
            calls = calls.len(),
            utterances = utterances.len(),
            "results tables updated"
        );

        Ok(WriteOutput {
            appended: records.len(),
            call_transcripts: calls.len(),
            utterances: utterances.len(),
        })
    }
}

/// Aggregate statistics over the utterances table
pub async fn summarize<S: ResultSink>(sink: &S) -> Result<CallSummary, SinkError> {
    let rows = sink.load_speaker_utterances().await?;
    Ok(CallSummary::from_utterances(&rows))
}
