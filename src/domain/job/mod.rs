//! Transcription job domain module

mod report;
mod status;
mod transcription_job;

pub use report::JobStatusReport;
pub use status::JobStatus;
pub use transcription_job::{
    job_name_for, numbered_job_name_for, DiarizationSettings, JobRequest, TranscriptionJob,
    DEFAULT_MAX_SPEAKER_LABELS, MAX_JOB_NAME_LEN,
};
