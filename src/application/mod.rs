//! Application layer - Use cases and port interfaces
//!
//! Contains the batch operations and trait definitions
//! for external system interactions.

pub mod cleanup;
pub mod collector;
pub mod lister;
pub mod pipeline;
pub mod poller;
pub mod ports;
pub mod submitter;
pub mod writer;

#[cfg(test)]
mod fakes;

// Re-export use cases
pub use cleanup::{CleanupJobsUseCase, CleanupOutput};
pub use collector::{CollectFailure, CollectOutput, CollectResultsUseCase};
pub use lister::{ListError, ListMediaUseCase, ListOutput};
pub use pipeline::{
    BatchPipeline, PipelineCallbacks, PipelineError, PipelineInput, PipelineOutput,
};
pub use poller::{PollCallbacks, PollJobsUseCase, PollOptions, PollOutcome};
pub use submitter::{SubmitJobsUseCase, SubmitOptions, SubmittedCallback};
pub use writer::{summarize, WriteOutput, WriteResultsUseCase};
