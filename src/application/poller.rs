//! Poll transcription jobs until they finish or time runs out

use std::collections::{HashMap, HashSet};

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::job::JobStatusReport;
use crate::domain::time::Duration;

use super::ports::{StatusQueryError, TranscriptionService};

/// Polling limits
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    /// Wall-clock budget for the whole loop
    pub max_wait: Duration,
    /// Pause between rounds
    pub poll_interval: Duration,
    /// Consecutive transient query failures that end a job as ERROR (at least 1)
    pub status_query_retries: u32,
}

/// Result of a polling run
#[derive(Debug, Clone, Default)]
pub struct PollOutcome {
    /// Reports of jobs that reached a terminal state, in the order they did
    pub completed: Vec<JobStatusReport>,
    /// Jobs still outstanding when the budget ran out.
    /// Poll them again by name to resume.
    pub remaining: Vec<String>,
    /// Rounds of status queries performed
    pub rounds: u32,
}

impl PollOutcome {
    pub fn timed_out(&self) -> bool {
        !self.remaining.is_empty()
    }
}

/// Callbacks for progress updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct PollCallbacks {
    /// Called when a job reaches a terminal state
    pub on_job_finished: Option<Box<dyn Fn(&JobStatusReport) + Send + Sync>>,
    /// Called after a round that left jobs outstanding, with (round, outstanding, elapsed)
    pub on_waiting: Option<Box<dyn Fn(u32, usize, std::time::Duration) + Send + Sync>>,
}

/// Polls job status until every job is terminal or the budget is spent
pub struct PollJobsUseCase<'a, T>
where
    T: TranscriptionService,
{
    service: &'a T,
    options: PollOptions,
}

impl<'a, T> PollJobsUseCase<'a, T>
where
    T: TranscriptionService,
{
    pub fn new(service: &'a T, options: PollOptions) -> Self {
        Self { service, options }
    }

    /// Poll the named jobs. Writes nothing; only logs.
    pub async fn execute(&self, job_names: Vec<String>, callbacks: PollCallbacks) -> PollOutcome {
        let mut seen = HashSet::new();
        let mut outstanding: Vec<String> = job_names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();

        if outstanding.is_empty() {
            info!("no jobs to poll");
            return PollOutcome::default();
        }

        let max_wait = self.options.max_wait.as_std();
        let failure_budget = self.options.status_query_retries.max(1);
        let start = Instant::now();

        let mut completed = Vec::new();
        let mut transient_failures: HashMap<String, u32> = HashMap::new();
        let mut rounds = 0;

        info!(
            jobs = outstanding.len(),
            max_wait = %self.options.max_wait,
            interval = %self.options.poll_interval,
            "polling transcription jobs"
        );

        while !outstanding.is_empty() && start.elapsed() < max_wait {
            rounds += 1;
            let mut still_running = Vec::with_capacity(outstanding.len());

            for job_name in outstanding {
                let finished = match self.service.job_status(&job_name).await {
                    Ok(report) => {
                        transient_failures.remove(&job_name);
                        if report.is_terminal() {
                            Some(report)
                        } else {
                            debug!(job_name = %job_name, status = %report.status, "still running");
                            None
                        }
                    }
                    Err(StatusQueryError::Service(message)) => {
                        warn!(job_name = %job_name, error = %message, "status query rejected");
                        Some(JobStatusReport::errored(&job_name, message))
                    }
                    Err(StatusQueryError::Transient(message)) => {
                        let failures = transient_failures.entry(job_name.clone()).or_insert(0);
                        *failures += 1;
                        if *failures >= failure_budget {
                            warn!(job_name = %job_name, failures = *failures, error = %message, "giving up on job after repeated status failures");
                            Some(JobStatusReport::errored(
                                &job_name,
                                format!("{} consecutive status failures, last: {}", failures, message),
                            ))
                        } else {
                            debug!(job_name = %job_name, failures = *failures, error = %message, "transient status failure");
                            None
                        }
                    }
                };

                match finished {
                    Some(report) => {
                        info!(job_name = %report.job_name, status = %report.status, "job finished");
                        if let Some(ref cb) = callbacks.on_job_finished {
                            cb(&report);
                        }
                        completed.push(report);
                    }
                    None => still_running.push(job_name),
                }
            }

            outstanding = still_running;

            if !outstanding.is_empty() {
                let elapsed = start.elapsed();
                if let Some(ref cb) = callbacks.on_waiting {
                    cb(rounds, outstanding.len(), elapsed);
                }
                if elapsed < max_wait {
                    info!(
                        waiting = outstanding.len(),
                        elapsed_secs = elapsed.as_secs(),
                        "waiting for jobs"
                    );
                    let pause = self.options.poll_interval.as_std().min(max_wait - elapsed);
                    tokio::time::sleep(pause).await;
                }
            }
        }

        if !outstanding.is_empty() {
            warn!(remaining = outstanding.len(), "timeout reached with jobs still in progress");
        }

        PollOutcome {
            completed,
            remaining: outstanding,
            rounds,
        }
    }
}
