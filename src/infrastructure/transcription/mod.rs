//! Transcription service adapters

mod aws;

pub use aws::AwsTranscribeService;
