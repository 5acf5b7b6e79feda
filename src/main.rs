use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use labelbot::cli::{Cli, CliCommand};
use labelbot::config::Config;
use labelbot::error::Result;
use labelbot::labeler::Labeler;
use labelbot::report::SinkReporter;
use labelbot::sources::github::GitHubTracker;
use labelbot::webhook;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn build_labeler(config: Config) -> Result<Labeler<GitHubTracker, SinkReporter>> {
    let reporter = SinkReporter::for_output(config.output.as_deref())?;
    let tracker = GitHubTracker::new(&config);
    Ok(Labeler::new(tracker, reporter, config))
}

fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(cli.command.common())?;
    info!(
        repo = %config.repo,
        rules = config.rules.len(),
        default_label = %config.default_label,
        check_comments = config.check_comments,
        "config loaded"
    );
    let labeler = build_labeler(config)?;

    match cli.command {
        CliCommand::Console {
            iterations,
            interval,
            ..
        } => Ok(labeler.run_loop(iterations, Duration::from_secs(interval))),
        CliCommand::Web { bind, .. } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(webhook::serve(Arc::new(labeler), &bind))?;
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    info!("labelbot starting");

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
