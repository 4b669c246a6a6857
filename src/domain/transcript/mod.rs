//! Transcript domain module

mod result;
mod types;

pub use result::TranscriptionResult;
pub use types::{Alternative, SegmentItem, SpeakerSegment, TranscriptItem};
