//! CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};

use crate::domain::config::{AppConfig, AwsConfig};

/// BatchScribe - speaker-labelled batch transcription of recorded calls
#[derive(Parser, Debug)]
#[command(name = "batch-scribe")]
#[command(version)]
#[command(about = "Batch transcription of S3 audio with Amazon Transcribe, collected into local results tables")]
#[command(long_about = None)]
pub struct Cli {
    /// AWS region
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Custom AWS endpoint (e.g. LocalStack)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Directory holding the results tables
    #[arg(long, global = true, value_name = "DIR")]
    pub results_dir: Option<String>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List, submit, poll, collect and store in one batch
    Run(RunArgs),
    /// Show audio files that have not been transcribed yet
    List(SourceArgs),
    /// Resume polling jobs from an earlier run and store their results
    Poll(PollArgs),
    /// Delete jobs from the transcription service
    Cleanup {
        /// Job names to delete
        #[arg(required = true, value_name = "JOB_NAME")]
        job_names: Vec<String>,
    },
    /// Print statistics over the stored utterances
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where to find the audio
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Bucket holding the audio files
    #[arg(short, long, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// Key prefix to list under
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

/// Polling limits
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Give up waiting after this long (e.g. 30m, 1h)
    #[arg(long, value_name = "TIME")]
    pub max_wait: Option<String>,

    /// Pause between status rounds (e.g. 30s)
    #[arg(long, value_name = "TIME")]
    pub poll_interval: Option<String>,

    /// Delete completed jobs from the service after storing results
    #[arg(long)]
    pub cleanup: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Bucket the service writes transcripts to
    #[arg(short, long, value_name = "BUCKET")]
    pub output_bucket: Option<String>,

    /// Language code of the recordings
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    #[command(flatten)]
    pub wait: WaitArgs,

    /// Show what would be submitted without creating jobs
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PollArgs {
    /// Job names to poll
    #[arg(required = true, value_name = "JOB_NAME")]
    pub job_names: Vec<String>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

impl Cli {
    /// Config layer from global flags
    pub fn global_config(&self) -> AppConfig {
        let aws = (self.region.is_some() || self.endpoint_url.is_some()).then(|| AwsConfig {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
        });

        AppConfig {
            results_dir: self.results_dir.clone(),
            aws,
            ..Default::default()
        }
    }
}

impl SourceArgs {
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            audio_bucket: self.bucket.clone(),
            audio_prefix: self.prefix.clone(),
            ..Default::default()
        }
    }
}

impl WaitArgs {
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            max_wait: self.max_wait.clone(),
            poll_interval: self.poll_interval.clone(),
            ..Default::default()
        }
    }
}

impl RunArgs {
    pub fn to_config(&self) -> AppConfig {
        self.source
            .to_config()
            .merge(self.wait.to_config())
            .merge(AppConfig {
                output_bucket: self.output_bucket.clone(),
                language_code: self.language.clone(),
                ..Default::default()
            })
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "audio_bucket",
    "audio_prefix",
    "output_bucket",
    "language_code",
    "max_speaker_labels",
    "results_dir",
    "max_wait",
    "poll_interval",
    "submit_delay",
    "status_query_retries",
    "aws.region",
    "aws.endpoint_url",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_defaults() {
        let cli = Cli::parse_from(["batch-scribe", "run"]);
        let Commands::Run(args) = cli.command else {
            panic!("Expected Run command");
        };
        assert!(args.source.bucket.is_none());
        assert!(args.output_bucket.is_none());
        assert!(!args.wait.cleanup);
        assert!(!args.dry_run);
        assert_eq!(args.to_config(), AppConfig::empty());
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::parse_from([
            "batch-scribe",
            "run",
            "--bucket",
            "my-audio-files",
            "--prefix",
            "call-recordings/",
            "--output-bucket",
            "my-transcribe-output",
            "--language",
            "es-US",
            "--max-wait",
            "1h",
            "--poll-interval",
            "10s",
            "--cleanup",
            "--dry-run",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("Expected Run command");
        };
        let config = args.to_config();
        assert_eq!(config.audio_bucket.as_deref(), Some("my-audio-files"));
        assert_eq!(config.audio_prefix.as_deref(), Some("call-recordings/"));
        assert_eq!(config.output_bucket.as_deref(), Some("my-transcribe-output"));
        assert_eq!(config.language_code.as_deref(), Some("es-US"));
        assert_eq!(config.max_wait.as_deref(), Some("1h"));
        assert_eq!(config.poll_interval.as_deref(), Some("10s"));
        assert!(args.wait.cleanup);
        assert!(args.dry_run);
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "batch-scribe",
            "summary",
            "--results-dir",
            "/tmp/tables",
            "--region",
            "eu-west-1",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let config = cli.global_config();
        assert_eq!(config.results_dir.as_deref(), Some("/tmp/tables"));
        assert_eq!(config.region_or_default(), "eu-west-1");
        assert!(config.endpoint_url().is_none());
    }

    #[test]
    fn global_config_is_empty_without_flags() {
        let cli = Cli::parse_from(["batch-scribe", "list"]);
        assert_eq!(cli.global_config(), AppConfig::empty());
    }

    #[test]
    fn cli_parses_poll_job_names() {
        let cli = Cli::parse_from(["batch-scribe", "poll", "job_a", "job_b", "--max-wait", "5m"]);
        let Commands::Poll(args) = cli.command else {
            panic!("Expected Poll command");
        };
        assert_eq!(args.job_names, vec!["job_a", "job_b"]);
        assert_eq!(args.wait.max_wait.as_deref(), Some("5m"));
    }

    #[test]
    fn poll_requires_job_names() {
        assert!(Cli::try_parse_from(["batch-scribe", "poll"]).is_err());
        assert!(Cli::try_parse_from(["batch-scribe", "cleanup"]).is_err());
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["batch-scribe", "config", "set", "aws.region", "eu-west-1"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "aws.region");
            assert_eq!(value, "eu-west-1");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("audio_bucket"));
        assert!(is_valid_config_key("status_query_retries"));
        assert!(is_valid_config_key("aws.endpoint_url"));
        assert!(!is_valid_config_key("api_key"));
        assert!(!is_valid_config_key("aws.secret_access_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
