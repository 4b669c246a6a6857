//! Derived table projections and summary statistics

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CallTranscript, SpeakerUtterance, TranscriptRecord};

/// Rows that have finished transcription, with their speaker segments parsed
pub fn call_transcripts(
    records: &[TranscriptRecord],
    processed_timestamp: DateTime<Utc>,
) -> Vec<CallTranscript> {
    records
        .iter()
        .filter_map(|record| {
            let transcription_timestamp = record.transcription_timestamp?;
            Some(CallTranscript {
                job_name: record.job_name.clone(),
                file_key: record.file_key.clone(),
                file_name: record.file_name.clone(),
                transcript_text: record.transcript_text.clone(),
                speaker_segments: record.parse().speaker_segments,
                transcription_timestamp,
                ingestion_timestamp: record.ingestion_timestamp,
                processed_timestamp,
            })
        })
        .collect()
}

/// One row per speaker segment, ordered by job then start time
pub fn speaker_utterances(calls: &[CallTranscript]) -> Vec<SpeakerUtterance> {
    let mut rows: Vec<SpeakerUtterance> = calls
        .iter()
        .flat_map(|call| {
            call.speaker_segments.iter().map(move |segment| SpeakerUtterance {
                job_name: call.job_name.clone(),
                file_name: call.file_name.clone(),
                speaker_label: segment.speaker_label.clone(),
                start_time_seconds: segment.start_time,
                end_time_seconds: segment.end_time,
                duration_seconds: segment.duration(),
                transcript_text: call.transcript_text.clone(),
                transcription_timestamp: call.transcription_timestamp,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.job_name
            .cmp(&b.job_name)
            .then(a.start_time_seconds.total_cmp(&b.start_time_seconds))
    });
    rows
}

/// Aggregate statistics over the utterances table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSummary {
    pub total_calls: usize,
    pub total_speakers: usize,
    /// `None` when there are no utterances
    pub avg_utterance_duration_sec: Option<f64>,
    pub total_audio_minutes: f64,
    pub last_processed: Option<DateTime<Utc>>,
}

impl CallSummary {
    pub fn from_utterances(rows: &[SpeakerUtterance]) -> Self {
        let calls: HashSet<&str> = rows.iter().map(|r| r.job_name.as_str()).collect();
        let speakers: HashSet<&str> = rows.iter().map(|r| r.speaker_label.as_str()).collect();
        let total_seconds: f64 = rows.iter().map(|r| r.duration_seconds).sum();

        let avg_utterance_duration_sec = if rows.is_empty() {
            None
        } else {
            Some(round2(total_seconds / rows.len() as f64))
        };

        Self {
            total_calls: calls.len(),
            total_speakers: speakers.len(),
            avg_utterance_duration_sec,
            total_audio_minutes: round2(total_seconds / 60.0),
            last_processed: rows.iter().map(|r| r.transcription_timestamp).max(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(job: &str, segments: serde_json::Value, finished: Option<i64>) -> TranscriptRecord {
        let document = json!({
            "results": {
                "transcripts": [{"transcript": format!("text of {}", job)}],
                "speaker_labels": {"segments": segments},
                "items": []
            }
        });
        TranscriptRecord {
            job_name: job.to_string(),
            file_key: Some(format!("calls/{}.mp3", job)),
            file_name: Some(format!("{}.mp3", job)),
            transcript_text: format!("text of {}", job),
            transcript_json: document.to_string(),
            transcription_timestamp: finished.map(at),
            ingestion_timestamp: at(2_000),
        }
    }

    fn segments() -> serde_json::Value {
        json!([
            {"speaker_label": "spk_1", "start_time": "4.0", "end_time": "6.5"},
            {"speaker_label": "spk_0", "start_time": "0.0", "end_time": "4.0"}
        ])
    }

    #[test]
    fn call_transcripts_skip_unfinished_rows() {
        let records = vec![record("b", segments(), Some(100)), record("a", json!([]), None)];

        let calls = call_transcripts(&records, at(3_000));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].job_name, "b");
        assert_eq!(calls[0].speaker_segments.len(), 2);
        assert_eq!(calls[0].processed_timestamp, at(3_000));
    }

    #[test]
    fn call_transcripts_tolerate_corrupt_documents() {
        let mut bad = record("a", json!([]), Some(100));
        bad.transcript_json = "{not json".to_string();

        let calls = call_transcripts(&[bad], at(3_000));
        assert_eq!(calls.len(), 1);
        assert!(calls[0].speaker_segments.is_empty());
    }

    #[test]
    fn utterances_are_ordered_by_job_then_start() {
        let records = vec![
            record("b", segments(), Some(100)),
            record("a", segments(), Some(200)),
        ];
        let rows = speaker_utterances(&call_transcripts(&records, at(3_000)));

        let order: Vec<(&str, f64)> = rows
            .iter()
            .map(|r| (r.job_name.as_str(), r.start_time_seconds))
            .collect();
        assert_eq!(order, vec![("a", 0.0), ("a", 4.0), ("b", 0.0), ("b", 4.0)]);
        assert_eq!(rows[1].duration_seconds, 2.5);
        assert_eq!(rows[1].speaker_label, "spk_1");
    }

    #[test]
    fn summary_aggregates_utterances() {
        let records = vec![
            record("b", segments(), Some(100)),
            record("a", segments(), Some(200)),
        ];
        let rows = speaker_utterances(&call_transcripts(&records, at(3_000)));
        let summary = CallSummary::from_utterances(&rows);

        assert_eq!(summary.total_calls, 2);
        assert_eq!(summary.total_speakers, 2);
        // (4.0 + 2.5) * 2 / 4
        assert_eq!(summary.avg_utterance_duration_sec, Some(3.25));
        // 13 seconds
        assert_eq!(summary.total_audio_minutes, 0.22);
        assert_eq!(summary.last_processed, Some(at(200)));
    }

    #[test]
    fn summary_of_nothing() {
        let summary = CallSummary::from_utterances(&[]);
        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.avg_utterance_duration_sec, None);
        assert_eq!(summary.total_audio_minutes, 0.0);
        assert_eq!(summary.last_processed, None);
    }
}
