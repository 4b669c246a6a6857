//! Delete finished jobs from the transcription service

use tracing::{info, warn};

use super::ports::{CleanupError, TranscriptionService};

#[derive(Debug, Clone, Default)]
pub struct CleanupOutput {
    pub deleted: Vec<String>,
    pub failed: Vec<CleanupError>,
}

pub struct CleanupJobsUseCase<'a, T>
where
    T: TranscriptionService,
{
    service: &'a T,
}

impl<'a, T> CleanupJobsUseCase<'a, T>
where
    T: TranscriptionService,
{
    pub fn new(service: &'a T) -> Self {
        Self { service }
    }

    /// Delete each named job. Failures are collected, never raised.
    pub async fn execute(&self, job_names: &[String]) -> CleanupOutput {
        let mut output = CleanupOutput::default();

        for job_name in job_names {
            match self.service.delete_job(job_name).await {
                Ok(()) => {
                    info!(job_name = %job_name, "deleted transcription job");
                    output.deleted.push(job_name.clone());
                }
                Err(e) => {
                    warn!(job_name = %job_name, error = %e.message, "could not delete job");
                    output.failed.push(e);
                }
            }
        }

        output
    }
}
