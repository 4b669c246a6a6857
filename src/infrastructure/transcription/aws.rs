//! Amazon Transcribe adapter

use async_trait::async_trait;
use aws_sdk_transcribe::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_transcribe::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_transcribe::types::{
    LanguageCode, Media, MediaFormat, Settings, TranscriptionJob as AwsTranscriptionJob,
};
use aws_sdk_transcribe::Client;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::application::ports::{
    CleanupError, StatusQueryError, SubmissionError, TranscriptionService,
};
use crate::domain::job::{JobRequest, JobStatus, JobStatusReport};
use crate::infrastructure::aws::AwsSettings;

/// Service error codes worth retrying
const TRANSIENT_CODES: &[&str] = &[
    "LimitExceededException",
    "InternalFailureException",
    "ThrottlingException",
];

/// How a failed call should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Transient,
    Service,
}

/// Classify by service error code. `None` means no service response.
fn classify_code(code: Option<&str>) -> FailureKind {
    match code {
        Some(code) if TRANSIENT_CODES.contains(&code) => FailureKind::Transient,
        Some(_) => FailureKind::Service,
        None => FailureKind::Transient,
    }
}

fn classify<E, R>(error: &SdkError<E, R>) -> FailureKind
where
    E: ProvideErrorMetadata,
{
    match error {
        SdkError::ServiceError(context) => classify_code(context.err().code()),
        SdkError::ConstructionFailure(_) => FailureKind::Service,
        _ => FailureKind::Transient,
    }
}

fn is_not_found(code: Option<&str>, message: Option<&str>) -> bool {
    match code {
        Some("NotFoundException") => true,
        Some("BadRequestException") => message.is_some_and(|m| {
            let m = m.to_ascii_lowercase();
            m.contains("couldn't be found") || m.contains("could not be found")
        }),
        _ => false,
    }
}

fn to_chrono(time: &aws_sdk_transcribe::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

/// Map a job description to a status report
fn report_from_job(job_name: &str, job: &AwsTranscriptionJob) -> Result<JobStatusReport, StatusQueryError> {
    let raw_status = job
        .transcription_job_status()
        .map(|s| s.as_str())
        .unwrap_or_default();
    let status = JobStatus::from_service(raw_status).ok_or_else(|| {
        StatusQueryError::Transient(format!("unrecognized job status {:?}", raw_status))
    })?;

    Ok(JobStatusReport {
        job_name: job
            .transcription_job_name()
            .unwrap_or(job_name)
            .to_string(),
        status,
        output_document_uri: job
            .transcript()
            .and_then(|t| t.transcript_file_uri())
            .map(str::to_string),
        media_uri: job
            .media()
            .and_then(|m| m.media_file_uri())
            .map(str::to_string),
        completion_time: job.completion_time().and_then(to_chrono),
        failure_reason: job.failure_reason().map(str::to_string),
        error: None,
    })
}

/// Transcription service backed by Amazon Transcribe batch jobs
pub struct AwsTranscribeService {
    client: Client,
}

impl AwsTranscribeService {
    pub fn new(settings: &AwsSettings) -> Self {
        let credentials = Credentials::new(
            &settings.credentials.access_key_id,
            &settings.credentials.secret_access_key,
            settings.credentials.session_token.clone(),
            None,
            "environment",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    fn settings(request: &JobRequest) -> Settings {
        let diarization = request.diarization;
        Settings::builder()
            .show_speaker_labels(diarization.show_speaker_labels)
            .max_speaker_labels(diarization.max_speaker_labels.min(i32::MAX as u32) as i32)
            .channel_identification(diarization.channel_identification)
            .show_alternatives(diarization.show_alternatives)
            .build()
    }
}

#[async_trait]
impl TranscriptionService for AwsTranscribeService {
    async fn start_job(&self, request: &JobRequest) -> Result<(), SubmissionError> {
        let media = Media::builder().media_file_uri(&request.media_uri).build();

        self.client
            .start_transcription_job()
            .transcription_job_name(&request.job_name)
            .media(media)
            .media_format(MediaFormat::from(request.media_format.as_str()))
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .output_bucket_name(&request.output_bucket)
            .settings(Self::settings(request))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                match e {
                    SdkError::ServiceError(_) => SubmissionError::Rejected(message),
                    _ => SubmissionError::RequestFailed(message),
                }
            })?;

        debug!(job_name = %request.job_name, media_uri = %request.media_uri, "job accepted");
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatusReport, StatusQueryError> {
        let output = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                match classify(&e) {
                    FailureKind::Transient => StatusQueryError::Transient(message),
                    FailureKind::Service => StatusQueryError::Service(message),
                }
            })?;

        let job = output.transcription_job().ok_or_else(|| {
            StatusQueryError::Service(format!("no job description returned for {}", job_name))
        })?;

        report_from_job(job_name, job)
    }

    async fn delete_job(&self, job_name: &str) -> Result<(), CleanupError> {
        match self
            .client
            .delete_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let absent = e
                    .as_service_error()
                    .is_some_and(|se| is_not_found(se.code(), se.message()));
                if absent {
                    info!(job_name, "job already gone");
                    Ok(())
                } else {
                    Err(CleanupError {
                        job_name: job_name.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_transcribe::primitives::DateTime as AwsDateTime;
    use aws_sdk_transcribe::types::{Transcript, TranscriptionJobStatus};

    #[test]
    fn throttling_and_internal_failures_are_transient() {
        assert_eq!(classify_code(Some("LimitExceededException")), FailureKind::Transient);
        assert_eq!(classify_code(Some("InternalFailureException")), FailureKind::Transient);
        assert_eq!(classify_code(None), FailureKind::Transient);
    }

    #[test]
    fn client_errors_are_service_failures() {
        assert_eq!(classify_code(Some("NotFoundException")), FailureKind::Service);
        assert_eq!(classify_code(Some("BadRequestException")), FailureKind::Service);
    }

    #[test]
    fn absent_job_detection() {
        assert!(is_not_found(Some("NotFoundException"), None));
        assert!(is_not_found(
            Some("BadRequestException"),
            Some("The requested job couldn't be found. Check the job name and try again.")
        ));
        assert!(!is_not_found(Some("BadRequestException"), Some("Invalid name")));
        assert!(!is_not_found(Some("LimitExceededException"), None));
    }

    #[test]
    fn completed_job_maps_to_report() {
        let job = AwsTranscriptionJob::builder()
            .transcription_job_name("transcribe_a_mp3_1")
            .transcription_job_status(TranscriptionJobStatus::Completed)
            .transcript(
                Transcript::builder()
                    .transcript_file_uri("https://s3.us-east-1.amazonaws.com/out/transcribe_a_mp3_1.json")
                    .build(),
            )
            .media(Media::builder().media_file_uri("s3://audio/calls/a.mp3").build())
            .completion_time(AwsDateTime::from_secs(1_700_000_000))
            .build();

        let report = report_from_job("transcribe_a_mp3_1", &job).unwrap();

        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.file_key(), Some("calls/a.mp3"));
        assert_eq!(
            report.output_document_uri.as_deref(),
            Some("https://s3.us-east-1.amazonaws.com/out/transcribe_a_mp3_1.json")
        );
        assert_eq!(report.completion_time.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn queued_job_is_in_progress() {
        let job = AwsTranscriptionJob::builder()
            .transcription_job_status(TranscriptionJobStatus::Queued)
            .build();

        let report = report_from_job("j", &job).unwrap();
        assert_eq!(report.status, JobStatus::InProgress);
        assert_eq!(report.job_name, "j");
    }

    #[test]
    fn failed_job_carries_reason() {
        let job = AwsTranscriptionJob::builder()
            .transcription_job_status(TranscriptionJobStatus::Failed)
            .failure_reason("Unsupported media format")
            .build();

        let report = report_from_job("j", &job).unwrap();
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.failure_reason.as_deref(), Some("Unsupported media format"));
    }

    #[test]
    fn missing_status_is_transient() {
        let job = AwsTranscriptionJob::builder().build();
        assert!(report_from_job("j", &job).unwrap_err().is_transient());
    }
}
