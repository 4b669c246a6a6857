//! Results table rows and their derivations

mod derive;
mod records;

pub use derive::{call_transcripts, speaker_utterances, CallSummary};
pub use records::{CallTranscript, SpeakerUtterance, TranscriptRecord};
