//! Job status report

use chrono::{DateTime, Utc};

use super::JobStatus;
use crate::domain::media::{file_name_of, key_from_uri};

/// Snapshot of a job's state as seen by one status query
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub job_name: String,
    pub status: JobStatus,
    /// Location of the output document, once the job has completed
    pub output_document_uri: Option<String>,
    /// Source media URI the job was created with
    pub media_uri: Option<String>,
    pub completion_time: Option<DateTime<Utc>>,
    /// Reason the service gave for a failed job
    pub failure_reason: Option<String>,
    /// Client-side error that made the job terminal
    pub error: Option<String>,
}

impl JobStatusReport {
    /// Create a report with only a status
    pub fn new(job_name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_name: job_name.into(),
            status,
            output_document_uri: None,
            media_uri: None,
            completion_time: None,
            failure_reason: None,
            error: None,
        }
    }

    /// A job whose status could not be determined
    pub fn errored(job_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(job_name, JobStatus::Error)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Object key of the source media, if the media URI is known
    pub fn file_key(&self) -> Option<&str> {
        self.media_uri.as_deref().and_then(key_from_uri)
    }

    /// File name of the source media, if the media URI is known
    pub fn file_name(&self) -> Option<&str> {
        self.file_key().map(file_name_of)
    }
}
