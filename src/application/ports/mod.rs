//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod document_fetcher;
pub mod object_store;
pub mod sink;
pub mod transcription_service;

// Re-export common types
pub use config::ConfigStore;
pub use document_fetcher::{DocumentFetcher, FetchError};
pub use object_store::{ObjectStore, StorageError};
pub use sink::{ResultSink, SinkError};
pub use transcription_service::{
    CleanupError, StatusQueryError, SubmissionError, TranscriptionService,
};
