//! Command runners

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;

use crate::application::ports::ConfigStore;
use crate::application::{
    summarize, BatchPipeline, CleanupJobsUseCase, ListMediaUseCase, PipelineCallbacks,
    PipelineError, PipelineInput, PollCallbacks, PollOptions, SubmitOptions,
};
use crate::domain::config::{AppConfig, AwsConfig};
use crate::domain::time::Duration;
use crate::infrastructure::{
    default_results_dir, AwsSettings, AwsTranscribeService, HttpDocumentFetcher, JsonlTableSink,
    RoutingDocumentFetcher, S3Storage, XdgConfigStore,
};

use super::args::{PollArgs, RunArgs};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

pub const AUDIO_BUCKET_ENV: &str = "BATCH_SCRIBE_AUDIO_BUCKET";
pub const OUTPUT_BUCKET_ENV: &str = "BATCH_SCRIBE_OUTPUT_BUCKET";
pub const RESULTS_DIR_ENV: &str = "BATCH_SCRIBE_RESULTS_DIR";

/// A problem with settings rather than with the run itself
#[derive(Debug)]
pub struct UsageError(pub String);

/// Config layer read from the environment through `lookup`
pub fn env_config_from(lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    let region = get("AWS_REGION");
    let endpoint_url = get("AWS_ENDPOINT_URL");
    let aws = (region.is_some() || endpoint_url.is_some()).then_some(AwsConfig {
        region,
        endpoint_url,
    });

    AppConfig {
        audio_bucket: get(AUDIO_BUCKET_ENV),
        output_bucket: get(OUTPUT_BUCKET_ENV),
        results_dir: get(RESULTS_DIR_ENV),
        aws,
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;
    let env_config = env_config_from(|name| env::var(name).ok());

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

fn parse_duration(key: &str, value: Option<&String>, default: Duration) -> Result<Duration, UsageError> {
    match value {
        Some(text) => text
            .parse()
            .map_err(|e| UsageError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

/// Polling limits from merged config; invalid durations are usage errors
pub fn poll_options(config: &AppConfig) -> Result<PollOptions, UsageError> {
    Ok(PollOptions {
        max_wait: parse_duration("max-wait", config.max_wait.as_ref(), Duration::default_max_wait())?,
        poll_interval: parse_duration(
            "poll-interval",
            config.poll_interval.as_ref(),
            Duration::default_poll_interval(),
        )?,
        status_query_retries: config.status_query_retries_or_default(),
    })
}

/// Submission settings from merged config
pub fn submit_options(config: &AppConfig, dry_run: bool) -> Result<SubmitOptions, UsageError> {
    let audio_bucket = config
        .audio_bucket
        .clone()
        .ok_or_else(|| missing("audio_bucket", "--bucket", AUDIO_BUCKET_ENV))?;
    let output_bucket = match config.output_bucket.clone() {
        Some(bucket) => bucket,
        None if dry_run => String::new(),
        None => return Err(missing("output_bucket", "--output-bucket", OUTPUT_BUCKET_ENV)),
    };

    Ok(SubmitOptions {
        audio_bucket,
        output_bucket,
        language_code: config.language_code_or_default().to_string(),
        diarization: config.diarization(),
        submit_delay: match config.submit_delay.as_deref() {
            Some(text) => Duration::parse_delay(text)
                .map_err(|e| UsageError(format!("Invalid submit_delay: {}", e)))?,
            None => Duration::default_submit_delay(),
        },
    })
}

fn missing(key: &str, flag: &str, env_name: &str) -> UsageError {
    UsageError(format!(
        "Missing {}. Pass {}, set {}, or run 'batch-scribe config set {} <value>'",
        key, flag, env_name, key
    ))
}

fn results_dir(config: &AppConfig) -> PathBuf {
    config
        .results_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_results_dir)
}

fn aws_settings(config: &AppConfig) -> Result<AwsSettings, UsageError> {
    AwsSettings::from_config(config).map_err(|e| UsageError(e.to_string()))
}

fn usage_exit(presenter: &Presenter, e: UsageError) -> ExitCode {
    presenter.error(&e.0);
    ExitCode::from(EXIT_USAGE_ERROR)
}

/// Run a full batch
pub async fn run_batch(config: AppConfig, args: RunArgs) -> ExitCode {
    let mut presenter = Presenter::new();

    let prepared = submit_options(&config, args.dry_run).and_then(|submit| {
        Ok((submit, poll_options(&config)?, aws_settings(&config)?))
    });
    let (submit, poll, aws) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return usage_exit(&presenter, e),
    };

    let s3 = S3Storage::new(&aws);
    let pipeline = BatchPipeline::new(
        s3.clone(),
        AwsTranscribeService::new(&aws),
        RoutingDocumentFetcher::new(s3, HttpDocumentFetcher::new()),
        JsonlTableSink::new(results_dir(&config)),
    );

    let spinner = presenter.start_spinner(&format!(
        "Listing s3://{}/{}",
        submit.audio_bucket,
        config.audio_prefix_or_default()
    ));
    let (listed_bar, waiting_bar, start_bar) = (spinner.clone(), spinner.clone(), spinner.clone());
    let callbacks = PipelineCallbacks {
        on_listed: Some(Box::new(move |listing| {
            listed_bar.set_message(format!(
                "Submitting {} file(s) ({} already processed)",
                listing.unprocessed.len(),
                listing.already_processed
            ));
        })),
        on_submitted: Some(Box::new(move |job| {
            spinner.suspend(|| Presenter::job_submitted(job));
        })),
        on_polling_start: Some(Box::new(move |count| {
            start_bar.set_message(format!("Waiting on {} job(s)", count));
        })),
        poll: PollCallbacks {
            on_job_finished: None,
            on_waiting: Some(Box::new(move |round, outstanding, elapsed| {
                waiting_bar.set_message(Presenter::format_wait(round, outstanding, elapsed));
            })),
        },
    };

    let input = PipelineInput {
        prefix: config.audio_prefix_or_default().to_string(),
        submit,
        poll,
        cleanup: args.wait.cleanup,
        dry_run: args.dry_run,
    };

    match pipeline.execute(input, callbacks).await {
        Ok(output) if args.dry_run => {
            presenter.spinner_success("Dry run, nothing submitted");
            presenter.listing(&output.listing);
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(output) => {
            if output.listing.unprocessed.is_empty() {
                presenter.spinner_success("No new audio files to process");
            } else {
                presenter.spinner_success(&format!(
                    "{} of {} job(s) finished",
                    output.poll.completed.len(),
                    output.jobs.len()
                ));
            }
            presenter.pipeline_report(&output);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(PipelineError::MissingSetting(key)) => {
            presenter.spinner_fail("Run aborted");
            usage_exit(&presenter, UsageError(format!("Missing setting: {}", key)))
        }
        Err(e) => {
            error!(error = %e, "batch run failed");
            presenter.spinner_fail("Run failed");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Show unprocessed audio
pub async fn run_list(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    let Some(bucket) = config.audio_bucket.clone() else {
        return usage_exit(&presenter, missing("audio_bucket", "--bucket", AUDIO_BUCKET_ENV));
    };
    let aws = match aws_settings(&config) {
        Ok(aws) => aws,
        Err(e) => return usage_exit(&presenter, e),
    };

    let store = S3Storage::new(&aws);
    let sink = JsonlTableSink::new(results_dir(&config));

    match ListMediaUseCase::new(&store, &sink)
        .execute(&bucket, config.audio_prefix_or_default())
        .await
    {
        Ok(listing) => {
            presenter.listing(&listing);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Resume polling named jobs and store their results
pub async fn run_poll(config: AppConfig, args: PollArgs) -> ExitCode {
    let mut presenter = Presenter::new();

    let prepared = poll_options(&config).and_then(|poll| Ok((poll, aws_settings(&config)?)));
    let (poll, aws) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return usage_exit(&presenter, e),
    };

    let s3 = S3Storage::new(&aws);
    let pipeline = BatchPipeline::new(
        s3.clone(),
        AwsTranscribeService::new(&aws),
        RoutingDocumentFetcher::new(s3, HttpDocumentFetcher::new()),
        JsonlTableSink::new(results_dir(&config)),
    );

    let spinner = presenter.start_spinner(&format!("Polling {} job(s)", args.job_names.len()));
    let callbacks = PollCallbacks {
        on_job_finished: None,
        on_waiting: Some(Box::new(move |round, outstanding, elapsed| {
            spinner.set_message(Presenter::format_wait(round, outstanding, elapsed));
        })),
    };

    match pipeline
        .resume(args.job_names, poll, args.wait.cleanup, callbacks)
        .await
    {
        Ok(output) => {
            presenter.spinner_success(&format!("{} job(s) finished", output.poll.completed.len()));
            presenter.pipeline_report(&output);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail("Polling failed");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Delete jobs by name
pub async fn run_cleanup(config: AppConfig, job_names: Vec<String>) -> ExitCode {
    let presenter = Presenter::new();

    let aws = match aws_settings(&config) {
        Ok(aws) => aws,
        Err(e) => return usage_exit(&presenter, e),
    };

    let service = AwsTranscribeService::new(&aws);
    let output = CleanupJobsUseCase::new(&service).execute(&job_names).await;
    presenter.cleanup_report(&output);

    if output.failed.is_empty() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Print statistics over stored utterances
pub async fn run_summary(config: AppConfig, json: bool) -> ExitCode {
    let presenter = Presenter::new();
    let sink = JsonlTableSink::new(results_dir(&config));

    match summarize(&sink).await {
        Ok(summary) if json => match serde_json::to_string_pretty(&summary) {
            Ok(text) => {
                presenter.output(&text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                presenter.error(&e.to_string());
                ExitCode::from(EXIT_ERROR)
            }
        },
        Ok(summary) => {
            presenter.summary(&summary);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
