//! Results table sinks

mod jsonl;

pub use jsonl::{
    default_results_dir, JsonlTableSink, CALLS_TABLE, RAW_TABLE, UTTERANCES_TABLE,
};
