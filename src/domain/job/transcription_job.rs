//! Transcription job entity and submission request

use chrono::{DateTime, Utc};

use super::{JobStatus, JobStatusReport};
use crate::domain::error::{InvalidStatusTransition, RecordValidationError};
use crate::domain::media::{MediaFormat, MediaObject};

/// Longest job name the transcription service accepts
pub const MAX_JOB_NAME_LEN: usize = 200;

/// Default upper bound on distinct speakers to detect
pub const DEFAULT_MAX_SPEAKER_LABELS: u32 = 10;

/// Prefix of every generated job name
const JOB_NAME_PREFIX: &str = "transcribe_";

/// Build a job name from a file name and a unix timestamp.
///
/// Characters the service rejects, and dots, become underscores.
pub fn job_name_for(file_name: &str, unix_secs: i64) -> String {
    build_job_name(file_name, &format!("_{}", unix_secs))
}

/// Like [`job_name_for`], with a sequence number to break a collision
pub fn numbered_job_name_for(file_name: &str, unix_secs: i64, seq: u32) -> String {
    build_job_name(file_name, &format!("_{}_{}", unix_secs, seq))
}

fn build_job_name(file_name: &str, suffix: &str) -> String {
    let budget = MAX_JOB_NAME_LEN - JOB_NAME_PREFIX.len() - suffix.len();

    let stem: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(budget)
        .collect();

    format!("{}{}{}", JOB_NAME_PREFIX, stem, suffix)
}

/// Speaker diarization settings sent with each job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiarizationSettings {
    pub show_speaker_labels: bool,
    pub max_speaker_labels: u32,
    pub channel_identification: bool,
    pub show_alternatives: bool,
}

impl Default for DiarizationSettings {
    fn default() -> Self {
        Self {
            show_speaker_labels: true,
            max_speaker_labels: DEFAULT_MAX_SPEAKER_LABELS,
            channel_identification: false,
            show_alternatives: false,
        }
    }
}

/// A create-job request for the transcription service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub job_name: String,
    pub media_uri: String,
    pub media_format: MediaFormat,
    pub language_code: String,
    pub output_bucket: String,
    pub diarization: DiarizationSettings,
}

/// A transcription job tracked by this client.
///
/// Created at submission. The status only moves through [`TranscriptionJob::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionJob {
    job_name: String,
    file_key: String,
    file_name: String,
    media_uri: String,
    status: JobStatus,
    submit_time: DateTime<Utc>,
    error: Option<String>,
}

impl TranscriptionJob {
    /// Record a job the service accepted
    pub fn submitted(
        job_name: impl Into<String>,
        media: &MediaObject,
        media_uri: impl Into<String>,
        submit_time: DateTime<Utc>,
    ) -> Result<Self, RecordValidationError> {
        let job_name = job_name.into();
        if job_name.is_empty() {
            return Err(RecordValidationError {
                record: "transcription job",
                field: "job_name",
            });
        }
        let media_uri = media_uri.into();
        if media_uri.is_empty() {
            return Err(RecordValidationError {
                record: "transcription job",
                field: "media_uri",
            });
        }

        Ok(Self {
            job_name,
            file_key: media.key().to_string(),
            file_name: media.name().to_string(),
            media_uri,
            status: JobStatus::Submitted,
            submit_time,
            error: None,
        })
    }

    /// Record a job the service rejected
    pub fn rejected(
        job_name: impl Into<String>,
        media: &MediaObject,
        media_uri: impl Into<String>,
        submit_time: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Result<Self, RecordValidationError> {
        let mut job = Self::submitted(job_name, media, media_uri, submit_time)?;
        job.status = JobStatus::Failed;
        job.error = Some(error.into());
        Ok(job)
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_uri(&self) -> &str {
        &self.media_uri
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn submit_time(&self) -> DateTime<Utc> {
        self.submit_time
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the service accepted the job
    pub fn is_submitted(&self) -> bool {
        self.status == JobStatus::Submitted
    }

    /// Apply a status report from the poll loop
    pub fn apply(&mut self, report: &JobStatusReport) -> Result<(), InvalidStatusTransition> {
        if !self.status.can_transition_to(report.status) {
            return Err(InvalidStatusTransition {
                job_name: self.job_name.clone(),
                from: self.status,
                to: report.status,
            });
        }
        self.status = report.status;
        if let Some(message) = report.failure_reason.as_ref().or(report.error.as_ref()) {
            self.error = Some(message.clone());
        }
        Ok(())
    }
}
