//! BatchScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use batch_scribe::cli::{
    app::{load_merged_config, run_batch, run_cleanup, run_list, run_poll, run_summary, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use batch_scribe::infrastructure::XdgConfigStore;

/// Log to stderr; RUST_LOG wins over -v
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "batch_scribe=warn",
        1 => "batch_scribe=info",
        _ => "batch_scribe=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = cli.global_config();

    match cli.command {
        Commands::Config { action } => {
            let presenter = Presenter::new();
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Run(args) => {
            let config = load_merged_config(args.to_config().merge(global)).await;
            run_batch(config, args).await
        }
        Commands::List(source) => {
            let config = load_merged_config(source.to_config().merge(global)).await;
            run_list(config).await
        }
        Commands::Poll(args) => {
            let config = load_merged_config(args.wait.to_config().merge(global)).await;
            run_poll(config, args).await
        }
        Commands::Cleanup { job_names } => {
            let config = load_merged_config(global).await;
            run_cleanup(config, job_names).await
        }
        Commands::Summary { json } => {
            let config = load_merged_config(global).await;
            run_summary(config, json).await
        }
    }
}
