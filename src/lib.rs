//! BatchScribe - batch transcription of recorded calls
//!
//! Lists audio files in an S3 bucket, submits the ones not yet transcribed to
//! Amazon Transcribe with speaker diarization, waits for the jobs, and stores
//! the results in local tables: the raw transcript documents, one row per
//! call, and one row per speaker utterance.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, job state, transcript parsing, and table rows
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (S3, Transcribe, HTTP, JSONL tables, config file)
//! - **CLI**: Command-line interface, argument parsing, and output

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
