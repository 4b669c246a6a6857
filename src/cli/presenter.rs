//! CLI presenter for output formatting

use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::{CleanupOutput, ListOutput, PipelineOutput};
use crate::domain::job::{JobStatus, JobStatusReport, TranscriptionJob};
use crate::domain::tables::CallSummary;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message.
    ///
    /// Returns a handle that callbacks can update from other threads.
    pub fn start_spinner(&mut self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(StdDuration::from_millis(80));
        self.spinner = Some(spinner.clone());
        spinner
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list and summary)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Spinner text while waiting on jobs
    pub fn format_wait(round: u32, outstanding: usize, elapsed: StdDuration) -> String {
        let secs = elapsed.as_secs();
        format!(
            "Waiting on {} job{} (round {}, {}m{:02}s elapsed)",
            outstanding,
            if outstanding == 1 { "" } else { "s" },
            round,
            secs / 60,
            secs % 60
        )
    }

    fn colored_status(status: JobStatus) -> ColoredString {
        match status {
            JobStatus::Completed => status.as_str().green(),
            JobStatus::Failed | JobStatus::Error => status.as_str().red(),
            JobStatus::Submitted | JobStatus::InProgress => status.as_str().yellow(),
        }
    }

    /// One line per unprocessed object, to stdout
    pub fn listing(&self, listing: &ListOutput) {
        for object in &listing.unprocessed {
            println!("{}\t{}", object.key(), object.human_readable_size());
        }
        self.info(&format!(
            "{} unprocessed, {} already processed, {} not audio",
            listing.unprocessed.len(),
            listing.already_processed,
            listing.skipped_non_audio
        ));
    }

    /// Submission result of a single job
    pub fn job_submitted(job: &TranscriptionJob) {
        match job.error() {
            Some(error) => eprintln!("{} {} ({})", "✗".red(), job.file_key(), error),
            None => eprintln!("{} {} → {}", "✓".green(), job.file_key(), job.job_name()),
        }
    }

    /// Final status of one job, to stdout
    pub fn job_report(&self, report: &JobStatusReport) {
        let detail = report
            .failure_reason
            .as_deref()
            .or(report.error.as_deref())
            .unwrap_or("");
        println!(
            "{}\t{}\t{}",
            report.job_name,
            Self::colored_status(report.status),
            detail
        );
    }

    /// End-of-run report
    pub fn pipeline_report(&self, output: &PipelineOutput) {
        for report in &output.poll.completed {
            self.job_report(report);
        }
        for name in &output.poll.remaining {
            println!("{}\t{}", name, Self::colored_status(JobStatus::InProgress));
        }

        for failure in &output.collect_failures {
            self.warn(&format!(
                "Could not collect {}: {}",
                failure.job_name, failure.error
            ));
        }

        if let Some(write) = output.write {
            self.success(&format!(
                "Stored {} transcript{} ({} calls, {} utterances in tables)",
                write.appended,
                if write.appended == 1 { "" } else { "s" },
                write.call_transcripts,
                write.utterances
            ));
        }

        if let Some(ref cleanup) = output.cleanup {
            self.cleanup_report(cleanup);
        }

        if output.poll.timed_out() {
            self.warn(&format!(
                "Timed out with {} job(s) still running. Resume with:\n  batch-scribe poll {}",
                output.poll.remaining.len(),
                output.poll.remaining.join(" ")
            ));
        }
    }

    pub fn cleanup_report(&self, cleanup: &CleanupOutput) {
        if !cleanup.deleted.is_empty() {
            self.success(&format!("Deleted {} job(s)", cleanup.deleted.len()));
        }
        for failure in &cleanup.failed {
            self.warn(&failure.to_string());
        }
    }

    /// Summary statistics as key-value lines
    pub fn summary(&self, summary: &CallSummary) {
        self.key_value("total_calls", &summary.total_calls.to_string());
        self.key_value("total_speakers", &summary.total_speakers.to_string());
        self.key_value(
            "avg_utterance_duration_sec",
            &summary
                .avg_utterance_duration_sec
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
        );
        self.key_value(
            "total_audio_minutes",
            &format!("{:.2}", summary.total_audio_minutes),
        );
        self.key_value(
            "last_processed",
            &summary
                .last_processed
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
