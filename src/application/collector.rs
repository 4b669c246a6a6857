//! Collect transcription results use case

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::job::{JobStatusReport, TranscriptionJob};
use crate::domain::tables::TranscriptRecord;
use crate::domain::transcript::TranscriptionResult;

use super::ports::{DocumentFetcher, FetchError};

/// A completed job whose output could not be collected
#[derive(Debug, Clone)]
pub struct CollectFailure {
    pub job_name: String,
    pub error: FetchError,
}

/// Output from the collect use case
#[derive(Debug, Clone, Default)]
pub struct CollectOutput {
    /// Raw rows ready for the sink, one per collected job
    pub records: Vec<TranscriptRecord>,
    /// Jobs whose document could not be fetched or decoded
    pub failures: Vec<CollectFailure>,
    /// Reports that were not completed or carried no document location
    pub skipped: usize,
}

/// Fetches and parses output documents of completed jobs
pub struct CollectResultsUseCase<'a, F>
where
    F: DocumentFetcher,
{
    fetcher: &'a F,
}

impl<'a, F> CollectResultsUseCase<'a, F>
where
    F: DocumentFetcher,
{
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Turn terminal reports into raw rows.
    ///
    /// `jobs` supplies file identity for jobs submitted in this run. Reports for
    /// other jobs fall back to the media URI the service returned.
    pub async fn execute(
        &self,
        reports: &[JobStatusReport],
        jobs: &[TranscriptionJob],
    ) -> CollectOutput {
        let by_name: HashMap<&str, &TranscriptionJob> =
            jobs.iter().map(|job| (job.job_name(), job)).collect();
        let mut output = CollectOutput::default();

        for report in reports {
            let Some(uri) = report
                .output_document_uri
                .as_deref()
                .filter(|_| report.is_completed())
            else {
                debug!(job_name = %report.job_name, status = %report.status, "nothing to collect");
                output.skipped += 1;
                continue;
            };

            let document = match self.fetcher.fetch(uri).await {
                Ok(document) => document,
                Err(e) => {
                    warn!(job_name = %report.job_name, error = %e, "could not fetch transcript");
                    output.failures.push(CollectFailure {
                        job_name: report.job_name.clone(),
                        error: e,
                    });
                    continue;
                }
            };

            let result = TranscriptionResult::from_document(report.job_name.clone(), document);
            for warning in &result.warnings {
                warn!(job_name = %report.job_name, warning = %warning, "transcript parsed with gaps");
            }

            let (file_key, file_name) = match by_name.get(report.job_name.as_str()) {
                Some(job) => (
                    Some(job.file_key().to_string()),
                    Some(job.file_name().to_string()),
                ),
                None => (
                    report.file_key().map(str::to_string),
                    report.file_name().map(str::to_string),
                ),
            };
            if file_key.is_none() {
                warn!(job_name = %report.job_name, "source file unknown; row will not count as processed");
            }

            output.records.push(TranscriptRecord::from_result(
                &result,
                file_key,
                file_name,
                report.completion_time,
                Utc::now(),
            ));
        }

        info!(
            collected = output.records.len(),
            failed = output.failures.len(),
            skipped = output.skipped,
            "collected transcription results"
        );
        output
    }
}
