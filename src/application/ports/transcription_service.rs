//! Transcription service port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::job::{JobRequest, JobStatusReport};

/// Job creation errors
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    #[error("Job rejected: {0}")]
    Rejected(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

/// Status query errors.
///
/// The poll loop treats the two kinds differently: a transient failure
/// is retried within a budget, a service-reported one ends the job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusQueryError {
    /// Network, timeout, throttling, or a service-side internal failure
    #[error("Status query failed (transient): {0}")]
    Transient(String),

    /// The service answered and refused the query, e.g. unknown job
    #[error("Status query rejected: {0}")]
    Service(String),
}

impl StatusQueryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Job deletion errors
#[derive(Debug, Clone, Error)]
#[error("Failed to delete job {job_name}: {message}")]
pub struct CleanupError {
    pub job_name: String,
    pub message: String,
}

/// Port for a managed batch transcription service
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Create a transcription job.
    ///
    /// # Returns
    /// Ok(()) when the service accepted the job
    async fn start_job(&self, request: &JobRequest) -> Result<(), SubmissionError>;

    /// Query the current state of a job. Has no side effects.
    async fn job_status(&self, job_name: &str) -> Result<JobStatusReport, StatusQueryError>;

    /// Delete a job. Deleting a job that does not exist succeeds.
    async fn delete_job(&self, job_name: &str) -> Result<(), CleanupError>;
}
