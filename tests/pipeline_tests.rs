//! Batch pipeline integration tests
//!
//! Runs the pipeline through the public API against in-memory cloud
//! services and real JSON-lines tables in a temporary directory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tempfile::TempDir;

use batch_scribe::application::ports::{
    CleanupError, DocumentFetcher, FetchError, ObjectStore, ResultSink, StatusQueryError,
    StorageError, SubmissionError, TranscriptionService,
};
use batch_scribe::application::{
    summarize, BatchPipeline, PipelineCallbacks, PipelineInput, PollCallbacks, PollOptions,
    SubmitOptions,
};
use batch_scribe::domain::job::{DiarizationSettings, JobRequest, JobStatus, JobStatusReport};
use batch_scribe::domain::media::MediaObject;
use batch_scribe::domain::time::Duration;
use batch_scribe::infrastructure::JsonlTableSink;

struct Bucket(Vec<MediaObject>);

#[async_trait]
impl ObjectStore for Bucket {
    async fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
    ) -> Result<Vec<MediaObject>, StorageError> {
        Ok(self
            .0
            .iter()
            .filter(|o| o.key().starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Completes every job on the first status query
#[derive(Default)]
struct InstantService {
    jobs: Mutex<HashMap<String, String>>,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl TranscriptionService for InstantService {
    async fn start_job(&self, request: &JobRequest) -> Result<(), SubmissionError> {
        self.jobs
            .lock()
            .unwrap()
            .insert(request.job_name.clone(), request.media_uri.clone());
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatusReport, StatusQueryError> {
        let jobs = self.jobs.lock().unwrap();
        let media_uri = jobs
            .get(job_name)
            .ok_or_else(|| StatusQueryError::Service(format!("{} not found", job_name)))?;

        let mut report = JobStatusReport::new(job_name, JobStatus::Completed);
        report.media_uri = Some(media_uri.clone());
        report.output_document_uri = Some(format!("https://out.example/{}.json", job_name));
        report.completion_time = Some(Utc::now());
        Ok(report)
    }

    async fn delete_job(&self, job_name: &str) -> Result<(), CleanupError> {
        self.deleted.lock().unwrap().push(job_name.to_string());
        Ok(())
    }
}

struct StaticDocument;

#[async_trait]
impl DocumentFetcher for StaticDocument {
    async fn fetch(&self, _uri: &str) -> Result<Value, FetchError> {
        Ok(json!({
            "jobName": "ignored",
            "results": {
                "transcripts": [{"transcript": "Thanks for calling. How can I help?"}],
                "speaker_labels": {"segments": [
                    {"speaker_label": "spk_0", "start_time": "0.0", "end_time": "2.5"},
                    {"speaker_label": "spk_1", "start_time": "2.5", "end_time": "4.0"}
                ]}
            }
        }))
    }
}

/// A document whose second segment has times JSON cannot carry
struct NonFiniteDocument;

#[async_trait]
impl DocumentFetcher for NonFiniteDocument {
    async fn fetch(&self, _uri: &str) -> Result<Value, FetchError> {
        Ok(json!({
            "results": {
                "transcripts": [{"transcript": "hello"}],
                "speaker_labels": {"segments": [
                    {"speaker_label": "spk_0", "start_time": "0.0", "end_time": "1.5"},
                    {"speaker_label": "spk_1", "start_time": "NaN", "end_time": "inf"}
                ]}
            }
        }))
    }
}

fn bucket(keys: &[&str]) -> Bucket {
    Bucket(
        keys.iter()
            .map(|key| MediaObject::new(*key, 2048, None).unwrap())
            .collect(),
    )
}

fn input(cleanup: bool) -> PipelineInput {
    PipelineInput {
        prefix: "call-recordings/".to_string(),
        submit: SubmitOptions {
            audio_bucket: "my-audio-files".to_string(),
            output_bucket: "my-transcribe-output".to_string(),
            language_code: "en-US".to_string(),
            diarization: DiarizationSettings::default(),
            submit_delay: Duration::from_millis(1),
        },
        poll: PollOptions {
            max_wait: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            status_query_retries: 3,
        },
        cleanup,
        dry_run: false,
    }
}

#[tokio::test]
async fn batch_run_fills_all_three_tables() {
    let dir = TempDir::new().unwrap();
    let pipeline = BatchPipeline::new(
        bucket(&[
            "call-recordings/a.mp3",
            "call-recordings/b.wav",
            "call-recordings/notes.txt",
        ]),
        InstantService::default(),
        StaticDocument,
        JsonlTableSink::new(dir.path()),
    );

    let output = pipeline
        .execute(input(false), PipelineCallbacks::default())
        .await
        .unwrap();

    assert_eq!(output.jobs.len(), 2);
    assert_eq!(output.poll.completed.len(), 2);
    assert!(!output.poll.timed_out());
    assert!(!output.has_failures());

    let write = output.write.unwrap();
    assert_eq!(write.appended, 2);
    assert_eq!(write.call_transcripts, 2);
    assert_eq!(write.utterances, 4);

    for table in [
        "raw_transcriptions.jsonl",
        "call_transcripts.jsonl",
        "speaker_utterances.jsonl",
    ] {
        assert!(dir.path().join(table).exists(), "{} missing", table);
    }

    let keys = pipeline.sink().processed_file_keys().await.unwrap();
    assert!(keys.contains("call-recordings/a.mp3"));
    assert!(keys.contains("call-recordings/b.wav"));
}

#[tokio::test]
async fn second_run_skips_processed_files() {
    let dir = TempDir::new().unwrap();
    let first = BatchPipeline::new(
        bucket(&["call-recordings/a.mp3"]),
        InstantService::default(),
        StaticDocument,
        JsonlTableSink::new(dir.path()),
    );
    first
        .execute(input(false), PipelineCallbacks::default())
        .await
        .unwrap();

    let second = BatchPipeline::new(
        bucket(&["call-recordings/a.mp3", "call-recordings/c.flac"]),
        InstantService::default(),
        StaticDocument,
        JsonlTableSink::new(dir.path()),
    );
    let output = second
        .execute(input(false), PipelineCallbacks::default())
        .await
        .unwrap();

    assert_eq!(output.listing.already_processed, 1);
    assert_eq!(output.jobs.len(), 1);
    assert_eq!(output.jobs[0].file_key(), "call-recordings/c.flac");

    // Derived tables are rebuilt from the whole raw table
    let write = output.write.unwrap();
    assert_eq!(write.appended, 1);
    assert_eq!(write.call_transcripts, 2);
    assert_eq!(second.sink().load_transcripts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn summary_reflects_stored_utterances() {
    let dir = TempDir::new().unwrap();
    let pipeline = BatchPipeline::new(
        bucket(&["call-recordings/a.mp3", "call-recordings/b.mp3"]),
        InstantService::default(),
        StaticDocument,
        JsonlTableSink::new(dir.path()),
    );
    pipeline
        .execute(input(false), PipelineCallbacks::default())
        .await
        .unwrap();

    let summary = summarize(pipeline.sink()).await.unwrap();
    assert_eq!(summary.total_calls, 2);
    assert_eq!(summary.total_speakers, 2);
    assert_eq!(summary.avg_utterance_duration_sec, Some(2.0));
    assert_eq!(summary.total_audio_minutes, 0.13);
    assert!(summary.last_processed.is_some());
}

#[tokio::test]
async fn cleanup_deletes_finished_jobs() {
    let dir = TempDir::new().unwrap();
    let pipeline = BatchPipeline::new(
        bucket(&["call-recordings/a.mp3"]),
        InstantService::default(),
        StaticDocument,
        JsonlTableSink::new(dir.path()),
    );

    let output = pipeline
        .execute(input(true), PipelineCallbacks::default())
        .await
        .unwrap();

    let cleanup = output.cleanup.unwrap();
    assert_eq!(cleanup.deleted.len(), 1);
    assert!(cleanup.failed.is_empty());
    assert_eq!(pipeline.service().deleted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn resume_stores_results_of_named_jobs() {
    let dir = TempDir::new().unwrap();
    let service = InstantService::default();
    service.jobs.lock().unwrap().insert(
        "transcribe_a_mp3_1700000000".to_string(),
        "s3://my-audio-files/call-recordings/a.mp3".to_string(),
    );
    let pipeline = BatchPipeline::new(
        bucket(&[]),
        service,
        StaticDocument,
        JsonlTableSink::new(dir.path()),
    );

    let output = pipeline
        .resume(
            vec!["transcribe_a_mp3_1700000000".to_string()],
            input(false).poll,
            false,
            PollCallbacks::default(),
        )
        .await
        .unwrap();

    assert_eq!(output.poll.completed.len(), 1);
    let rows = pipeline.sink().load_transcripts().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].file_key.as_deref(), Some("call-recordings/a.mp3"));
    assert_eq!(rows[0].file_name.as_deref(), Some("a.mp3"));
}

#[tokio::test]
async fn non_finite_segment_times_keep_tables_readable() {
    let dir = TempDir::new().unwrap();
    let pipeline = BatchPipeline::new(
        bucket(&["call-recordings/a.mp3"]),
        InstantService::default(),
        NonFiniteDocument,
        JsonlTableSink::new(dir.path()),
    );

    let output = pipeline
        .execute(input(false), PipelineCallbacks::default())
        .await
        .unwrap();
    assert_eq!(output.write.unwrap().utterances, 1);

    let summary = summarize(pipeline.sink()).await.unwrap();
    assert_eq!(summary.total_calls, 1);
    assert_eq!(summary.avg_utterance_duration_sec, Some(1.5));
}
