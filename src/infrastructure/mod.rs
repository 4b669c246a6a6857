//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like S3, Amazon Transcribe, HTTP, etc.

pub mod aws;
pub mod config;
pub mod document;
pub mod sink;
pub mod storage;
pub mod transcription;

// Re-export adapters
pub use aws::{AwsSettings, MissingCredentials};
pub use config::XdgConfigStore;
pub use document::{HttpDocumentFetcher, RoutingDocumentFetcher};
pub use sink::{default_results_dir, JsonlTableSink};
pub use storage::S3Storage;
pub use transcription::AwsTranscribeService;
