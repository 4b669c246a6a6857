//! Domain layer - Core business logic
//!
//! Contains value objects, entities, derived-table projections, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod job;
pub mod media;
pub mod tables;
pub mod time;
pub mod transcript;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use job::{JobRequest, JobStatus, JobStatusReport, TranscriptionJob};
pub use media::{MediaFormat, MediaObject};
pub use tables::{CallSummary, CallTranscript, SpeakerUtterance, TranscriptRecord};
pub use time::Duration;
pub use transcript::{SpeakerSegment, TranscriptItem, TranscriptionResult};
