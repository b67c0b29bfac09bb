//! CLI for the pull request migrator.
//!
//! Reads repository pairs from stdin and replays each source repository's
//! pull requests and issues onto its destination, keeping their numbers.

use clap::Parser;
use pr_migrator::{load_settings, RunSummary, Runner, RunnerConfig, RunnerError};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Replay pull requests and issues between GitHub instances, preserving their numbers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Destination GitHub token.
    #[arg(long, env = "GH_PAT", hide_env_values = true)]
    token: String,

    /// Source GitHub token.
    #[arg(long, env = "GH_SOURCE_PAT", hide_env_values = true)]
    source_token: String,

    /// Log planned mutations without performing them.
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,

    /// Close destination pull requests that are closed on the source.
    #[arg(long, env = "CHECK_CLOSED_PRS")]
    check_closed_prs: bool,

    /// Continue with the next pair after a pair fails.
    #[arg(long)]
    keep_going: bool,

    /// Path to a TOML settings file.
    #[arg(long, env = "PR_MIGRATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter, e.g. `debug` or `pr_migrator=debug`.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            exit_code(&summary)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with the given filter, falling back to `info`.
///
/// Sets up the global tracing subscriber with compact single-line output
/// without module targets.
fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let settings = load_settings(args.config.as_deref())?;
    let config = RunnerConfig::new(settings, args.source_token, args.token)
        .with_dry_run(args.dry_run)
        .with_check_closed_prs(args.check_closed_prs)
        .with_keep_going(args.keep_going);
    let runner = Runner::new(config)?;
    let input = read_pairs(std::io::stdin().lock())?;

    Ok(runner.run(&input).await)
}

/// Reads the whole pair list. Input that is not valid UTF-8 is an error.
fn read_pairs(mut reader: impl Read) -> Result<String, RunnerError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(input)
}

/// Maps the run outcome to the process exit code.
fn exit_code(summary: &RunSummary) -> ExitCode {
    if summary.all_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Pairs processed: {}", summary.pairs_processed);
    println!("  Pull requests: {}", summary.counts.pull_requests_created);
    println!("  Issues: {}", summary.counts.issues_created);
    println!("  Placeholder issues: {}", summary.counts.placeholders_created);
    println!("  Branches synthesized: {}", summary.counts.branches_synthesized);
    println!("  Objects closed: {}", summary.counts.objects_closed);
    println!("  Comments copied: {}", summary.counts.comments_copied);

    if summary.has_failures() {
        println!("  Failed pairs:");
        for pair in &summary.failed_pairs {
            println!("    {pair}");
        }
    }
    if summary.aborted {
        println!("  Aborted after the first failure");
    }
}
