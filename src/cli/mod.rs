//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, config handling,
//! and the command runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;

// Re-export commonly used types
pub use app::{
    load_merged_config, run_batch, run_cleanup, run_list, run_poll, run_summary, EXIT_ERROR,
    EXIT_SUCCESS, EXIT_USAGE_ERROR,
};
pub use args::{Cli, Commands, ConfigAction, PollArgs, RunArgs, SourceArgs};
pub use presenter::Presenter;
