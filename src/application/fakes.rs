//! In-memory port implementations for use case tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::ports::{
    CleanupError, DocumentFetcher, FetchError, ObjectStore, ResultSink, SinkError,
    StatusQueryError, StorageError, SubmissionError, TranscriptionService,
};
use crate::domain::job::{JobRequest, JobStatus, JobStatusReport};
use crate::domain::media::MediaObject;
use crate::domain::tables::{CallTranscript, SpeakerUtterance, TranscriptRecord};

pub fn media(key: &str) -> MediaObject {
    MediaObject::new(key, 1024, None).unwrap()
}

pub fn completed(job_name: &str, document_uri: &str) -> JobStatusReport {
    let mut report = JobStatusReport::new(job_name, JobStatus::Completed);
    report.output_document_uri = Some(document_uri.to_string());
    report
}

#[derive(Default)]
pub struct FakeObjectStore {
    pub objects: Vec<MediaObject>,
    pub error: Option<StorageError>,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
    ) -> Result<Vec<MediaObject>, StorageError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        Ok(self
            .objects
            .iter()
            .filter(|o| o.key().starts_with(prefix))
            .cloned()
            .collect())
    }
}

type StatusScript = VecDeque<Result<JobStatusReport, StatusQueryError>>;

/// Status answers are scripted per job-name fragment, since generated
/// names carry a timestamp. The last scripted answer repeats.
#[derive(Default)]
pub struct FakeTranscriptionService {
    scripts: Mutex<Vec<(String, StatusScript)>>,
    rejected_uris: HashSet<String>,
    undeletable: HashSet<String>,
    pub started: Mutex<Vec<JobRequest>>,
    pub queried: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeTranscriptionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(
        self,
        fragment: &str,
        answers: Vec<Result<JobStatusReport, StatusQueryError>>,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .push((fragment.to_string(), answers.into()));
        self
    }

    /// Report IN_PROGRESS `rounds - 1` times, then the given terminal report
    pub fn finish_after(self, fragment: &str, rounds: usize, last: JobStatusReport) -> Self {
        let mut answers: Vec<_> = (1..rounds)
            .map(|_| Ok(JobStatusReport::new(last.job_name.clone(), JobStatus::InProgress)))
            .collect();
        answers.push(Ok(last));
        self.script(fragment, answers)
    }

    pub fn reject(mut self, media_uri: &str) -> Self {
        self.rejected_uris.insert(media_uri.to_string());
        self
    }

    pub fn refuse_delete(mut self, job_name: &str) -> Self {
        self.undeletable.insert(job_name.to_string());
        self
    }

    pub fn query_count(&self, fragment: &str) -> usize {
        self.queried
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.contains(fragment))
            .count()
    }
}

#[async_trait]
impl TranscriptionService for FakeTranscriptionService {
    async fn start_job(&self, request: &JobRequest) -> Result<(), SubmissionError> {
        if self.rejected_uris.contains(&request.media_uri) {
            return Err(SubmissionError::Rejected("unsupported media".to_string()));
        }
        self.started.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatusReport, StatusQueryError> {
        self.queried.lock().unwrap().push(job_name.to_string());

        let mut scripts = self.scripts.lock().unwrap();
        let Some((_, script)) = scripts
            .iter_mut()
            .find(|entry| job_name.contains(entry.0.as_str()))
        else {
            return Err(StatusQueryError::Service(format!("job {} not found", job_name)));
        };

        let answer = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };

        match answer {
            Some(Ok(mut report)) => {
                report.job_name = job_name.to_string();
                Ok(report)
            }
            Some(Err(e)) => Err(e),
            None => Ok(JobStatusReport::new(job_name, JobStatus::InProgress)),
        }
    }

    async fn delete_job(&self, job_name: &str) -> Result<(), CleanupError> {
        if self.undeletable.contains(job_name) {
            return Err(CleanupError {
                job_name: job_name.to_string(),
                message: "limit exceeded".to_string(),
            });
        }
        self.deleted.lock().unwrap().push(job_name.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    documents: HashMap<String, Result<Value, FetchError>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, uri: &str, document: Value) -> Self {
        self.documents.insert(uri.to_string(), Ok(document));
        self
    }

    pub fn failure(mut self, uri: &str, error: FetchError) -> Self {
        self.documents.insert(uri.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError> {
        self.documents.get(uri).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                status: 404,
                message: uri.to_string(),
            })
        })
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub raw: Mutex<Vec<TranscriptRecord>>,
    pub calls: Mutex<Vec<CallTranscript>>,
    pub utterances: Mutex<Vec<SpeakerUtterance>>,
    pub fail_writes: bool,
}

impl MemorySink {
    pub fn with_processed(keys: &[&str]) -> Self {
        let rows = keys
            .iter()
            .map(|key| TranscriptRecord {
                job_name: format!("old_{}", key),
                file_key: Some(key.to_string()),
                file_name: None,
                transcript_text: String::new(),
                transcript_json: "{}".to_string(),
                transcription_timestamp: None,
                ingestion_timestamp: chrono::Utc::now(),
            })
            .collect();
        Self {
            raw: Mutex::new(rows),
            ..Default::default()
        }
    }

    fn check_writable(&self, table: &str) -> Result<(), SinkError> {
        if self.fail_writes {
            return Err(SinkError::Io {
                table: table.to_string(),
                message: "disk full".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn processed_file_keys(&self) -> Result<HashSet<String>, SinkError> {
        Ok(self
            .raw
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.file_key.clone())
            .collect())
    }

    async fn append_transcripts(&self, records: &[TranscriptRecord]) -> Result<(), SinkError> {
        self.check_writable("raw_transcriptions")?;
        self.raw.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn load_transcripts(&self) -> Result<Vec<TranscriptRecord>, SinkError> {
        Ok(self.raw.lock().unwrap().clone())
    }

    async fn replace_call_transcripts(&self, rows: &[CallTranscript]) -> Result<(), SinkError> {
        self.check_writable("call_transcripts")?;
        *self.calls.lock().unwrap() = rows.to_vec();
        Ok(())
    }

    async fn replace_speaker_utterances(
        &self,
        rows: &[SpeakerUtterance],
    ) -> Result<(), SinkError> {
        self.check_writable("speaker_utterances")?;
        *self.utterances.lock().unwrap() = rows.to_vec();
        Ok(())
    }

    async fn load_speaker_utterances(&self) -> Result<Vec<SpeakerUtterance>, SinkError> {
        Ok(self.utterances.lock().unwrap().clone())
    }
}
