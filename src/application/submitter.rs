//! Submit transcription jobs use case

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::error::RecordValidationError;
use crate::domain::job::{
    job_name_for, numbered_job_name_for, DiarizationSettings, JobRequest, TranscriptionJob,
};
use crate::domain::media::{MediaFormat, MediaObject};
use crate::domain::time::Duration;

use super::ports::TranscriptionService;

/// Settings shared by every job in a batch
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Bucket the media objects live in
    pub audio_bucket: String,
    /// Bucket the service writes output documents to
    pub output_bucket: String,
    pub language_code: String,
    pub diarization: DiarizationSettings,
    /// Pause between consecutive submissions
    pub submit_delay: Duration,
}

/// Callback invoked after each submission attempt
pub type SubmittedCallback = Box<dyn Fn(&TranscriptionJob) + Send + Sync>;

/// Creates one transcription job per media object
pub struct SubmitJobsUseCase<'a, T>
where
    T: TranscriptionService,
{
    service: &'a T,
    options: SubmitOptions,
}

impl<'a, T> SubmitJobsUseCase<'a, T>
where
    T: TranscriptionService,
{
    pub fn new(service: &'a T, options: SubmitOptions) -> Self {
        Self { service, options }
    }

    /// Submit a job for each object.
    ///
    /// Rejections do not stop the batch; they come back as jobs with status FAILED.
    pub async fn execute(
        &self,
        media: &[MediaObject],
        on_submitted: Option<SubmittedCallback>,
    ) -> Result<Vec<TranscriptionJob>, RecordValidationError> {
        let mut jobs = Vec::with_capacity(media.len());
        let mut used_names = HashSet::new();

        for (index, object) in media.iter().enumerate() {
            if index > 0 && self.options.submit_delay.as_millis() > 0 {
                tokio::time::sleep(self.options.submit_delay.as_std()).await;
            }

            let submit_time = Utc::now();
            let job_name = unique_job_name(object.name(), submit_time.timestamp(), &mut used_names);
            let request = self.build_request(object, job_name);

            let job = match self.service.start_job(&request).await {
                Ok(()) => {
                    info!(job_name = %request.job_name, key = object.key(), "submitted transcription job");
                    TranscriptionJob::submitted(
                        request.job_name,
                        object,
                        request.media_uri,
                        submit_time,
                    )?
                }
                Err(e) => {
                    warn!(job_name = %request.job_name, key = object.key(), error = %e, "job submission rejected");
                    TranscriptionJob::rejected(
                        request.job_name,
                        object,
                        request.media_uri,
                        submit_time,
                        e.to_string(),
                    )?
                }
            };

            if let Some(ref cb) = on_submitted {
                cb(&job);
            }
            jobs.push(job);
        }

        Ok(jobs)
    }

    fn build_request(&self, object: &MediaObject, job_name: String) -> JobRequest {
        JobRequest {
            job_name,
            media_uri: object.uri(&self.options.audio_bucket),
            // Listed objects always carry a known extension
            media_format: object.format().unwrap_or(MediaFormat::Mp3),
            language_code: self.options.language_code.clone(),
            output_bucket: self.options.output_bucket.clone(),
            diarization: self.options.diarization,
        }
    }
}

/// Job name not yet used in this batch
fn unique_job_name(file_name: &str, unix_secs: i64, used: &mut HashSet<String>) -> String {
    let mut name = job_name_for(file_name, unix_secs);
    let mut seq = 1;
    while used.contains(&name) {
        name = numbered_job_name_for(file_name, unix_secs, seq);
        seq += 1;
    }
    used.insert(name.clone());
    name
}
