//! Batch transcription pipeline
//!
//! Runs the whole batch in order: list unprocessed media, submit one job per
//! file, poll until terminal or timeout, collect completed documents, write
//! the results tables, and optionally delete completed jobs.

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::error::RecordValidationError;
use crate::domain::job::{JobStatus, JobStatusReport, TranscriptionJob};

use super::cleanup::{CleanupJobsUseCase, CleanupOutput};
use super::collector::{CollectFailure, CollectResultsUseCase};
use super::lister::{ListError, ListMediaUseCase, ListOutput};
use super::poller::{PollCallbacks, PollJobsUseCase, PollOptions, PollOutcome};
use super::ports::{DocumentFetcher, ObjectStore, ResultSink, SinkError, TranscriptionService};
use super::submitter::{SubmitJobsUseCase, SubmitOptions, SubmittedCallback};
use super::writer::{WriteOutput, WriteResultsUseCase};

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    List(#[from] ListError),

    #[error("Failed to write results: {0}")]
    Sink(#[from] SinkError),

    #[error("Invalid job record: {0}")]
    InvalidRecord(#[from] RecordValidationError),

    #[error("Missing setting: {0}. Set it in the config file, environment, or on the command line")]
    MissingSetting(&'static str),
}

/// Input parameters for a batch run
#[derive(Debug, Clone)]
pub struct PipelineInput {
    /// Prefix to list under; the bucket comes from `submit.audio_bucket`
    pub prefix: String,
    pub submit: SubmitOptions,
    pub poll: PollOptions,
    /// Delete completed jobs from the service after ingestion
    pub cleanup: bool,
    /// List what would be submitted and stop
    pub dry_run: bool,
}

/// Output from a batch run
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub listing: ListOutput,
    /// Jobs created in this run, with their final known status
    pub jobs: Vec<TranscriptionJob>,
    pub poll: PollOutcome,
    pub write: Option<WriteOutput>,
    pub collect_failures: Vec<CollectFailure>,
    pub cleanup: Option<CleanupOutput>,
}

impl PipelineOutput {
    /// Whether any job failed or any completed output could not be collected
    pub fn has_failures(&self) -> bool {
        !self.collect_failures.is_empty()
            || self
                .poll
                .completed
                .iter()
                .any(|r| matches!(r.status, JobStatus::Failed | JobStatus::Error))
            || self.jobs.iter().any(|j| j.status() == JobStatus::Failed)
    }
}

/// Callbacks for progress updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct PipelineCallbacks {
    /// Called once the unprocessed set is known
    pub on_listed: Option<Box<dyn Fn(&ListOutput) + Send + Sync>>,
    /// Called after each submission attempt
    pub on_submitted: Option<SubmittedCallback>,
    /// Called when polling starts, with the number of jobs
    pub on_polling_start: Option<Box<dyn Fn(usize) + Send + Sync>>,
    pub poll: PollCallbacks,
}

/// Batch pipeline over the four external ports
pub struct BatchPipeline<O, T, F, S>
where
    O: ObjectStore,
    T: TranscriptionService,
    F: DocumentFetcher,
    S: ResultSink,
{
    store: O,
    service: T,
    fetcher: F,
    sink: S,
}

impl<O, T, F, S> BatchPipeline<O, T, F, S>
where
    O: ObjectStore,
    T: TranscriptionService,
    F: DocumentFetcher,
    S: ResultSink,
{
    pub fn new(store: O, service: T, fetcher: F, sink: S) -> Self {
        Self {
            store,
            service,
            fetcher,
            sink,
        }
    }

    pub fn store(&self) -> &O {
        &self.store
    }

    pub fn service(&self) -> &T {
        &self.service
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run a full batch
    pub async fn execute(
        &self,
        input: PipelineInput,
        callbacks: PipelineCallbacks,
    ) -> Result<PipelineOutput, PipelineError> {
        if input.submit.audio_bucket.is_empty() {
            return Err(PipelineError::MissingSetting("audio_bucket"));
        }
        if !input.dry_run && input.submit.output_bucket.is_empty() {
            return Err(PipelineError::MissingSetting("output_bucket"));
        }

        let listing = ListMediaUseCase::new(&self.store, &self.sink)
            .execute(&input.submit.audio_bucket, &input.prefix)
            .await?;
        if let Some(ref cb) = callbacks.on_listed {
            cb(&listing);
        }

        if input.dry_run || listing.unprocessed.is_empty() {
            if listing.unprocessed.is_empty() {
                info!("no new audio files to process");
            }
            return Ok(PipelineOutput {
                listing,
                ..Default::default()
            });
        }

        let mut jobs = SubmitJobsUseCase::new(&self.service, input.submit.clone())
            .execute(&listing.unprocessed, callbacks.on_submitted)
            .await?;

        let job_names: Vec<String> = jobs
            .iter()
            .filter(|job| job.is_submitted())
            .map(|job| job.job_name().to_string())
            .collect();
        info!(
            submitted = job_names.len(),
            rejected = jobs.len() - job_names.len(),
            "jobs submitted"
        );

        if let Some(ref cb) = callbacks.on_polling_start {
            cb(job_names.len());
        }
        let poll = PollJobsUseCase::new(&self.service, input.poll)
            .execute(job_names, callbacks.poll)
            .await;
        apply_reports(&mut jobs, &poll.completed);

        let (write, collect_failures, cleanup) =
            self.ingest(&poll.completed, &jobs, input.cleanup).await?;

        Ok(PipelineOutput {
            listing,
            jobs,
            poll,
            write,
            collect_failures,
            cleanup,
        })
    }

    /// Poll jobs from an earlier run by name and ingest their results
    pub async fn resume(
        &self,
        job_names: Vec<String>,
        options: PollOptions,
        cleanup: bool,
        callbacks: PollCallbacks,
    ) -> Result<PipelineOutput, PipelineError> {
        let poll = PollJobsUseCase::new(&self.service, options)
            .execute(job_names, callbacks)
            .await;

        let (write, collect_failures, cleanup) =
            self.ingest(&poll.completed, &[], cleanup).await?;

        Ok(PipelineOutput {
            poll,
            write,
            collect_failures,
            cleanup,
            ..Default::default()
        })
    }

    async fn ingest(
        &self,
        reports: &[JobStatusReport],
        jobs: &[TranscriptionJob],
        cleanup: bool,
    ) -> Result<(Option<WriteOutput>, Vec<CollectFailure>, Option<CleanupOutput>), PipelineError>
    {
        let collected = CollectResultsUseCase::new(&self.fetcher)
            .execute(reports, jobs)
            .await;

        let write = if collected.records.is_empty() {
            info!("no new transcripts to write");
            None
        } else {
            Some(
                WriteResultsUseCase::new(&self.sink)
                    .execute(&collected.records)
                    .await?,
            )
        };

        // Jobs whose document could not be collected stay on the service for `poll`
        let cleanup = if cleanup {
            let completed: Vec<String> = reports
                .iter()
                .filter(|r| r.is_completed())
                .filter(|r| !collected.failures.iter().any(|f| f.job_name == r.job_name))
                .map(|r| r.job_name.clone())
                .collect();
            let kept = collected.failures.len();
            if kept > 0 {
                info!(kept, "keeping jobs with uncollected results");
            }
            Some(CleanupJobsUseCase::new(&self.service).execute(&completed).await)
        } else {
            None
        };

        Ok((write, collected.failures, cleanup))
    }
}

/// Move submitted jobs to the status their final report carries
fn apply_reports(jobs: &mut [TranscriptionJob], reports: &[JobStatusReport]) {
    for report in reports {
        let Some(job) = jobs.iter_mut().find(|j| j.job_name() == report.job_name) else {
            continue;
        };
        if let Err(e) = job.apply(report) {
            warn!(error = %e, "ignoring status report");
        }
    }
}
