//! CLI for opening a pull request set.
//!
//! Opens one pull request per configured repository, then rewrites every
//! description so each pull request links to its siblings, and finally
//! requests reviewers.

use clap::Parser;
use pr_set::{
    load_config, Cancellation, ExitPolicy, Overrides, Plan, RepositoryKey, RunSummary, Runner,
    RunnerConfig, RunnerError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// pr-set - Open and cross-link one pull request per repository.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML, or JSON with a .json extension).
    #[arg(long, short, default_value = "pr-set.toml")]
    config: PathBuf,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Pull request title.
    #[arg(long)]
    title: Option<String>,

    /// Ticket the change fixes (e.g. an issue URL).
    #[arg(long)]
    ticket: Option<String>,

    /// Head branch for repositories that do not configure one.
    #[arg(long)]
    head: Option<String>,

    /// Base branch for repositories that do not configure one.
    #[arg(long)]
    base: Option<String>,

    /// Reviewer to request; repeat for several. Replaces the configured list.
    #[arg(long = "reviewer", short)]
    reviewers: Vec<String>,

    /// Only open pull requests in this repository (owner/name); repeatable.
    #[arg(long = "repo")]
    repositories: Vec<RepositoryKey>,

    /// Body template containing $TITLE, $FIXES and $MERGE_WITH.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Open pull requests as ready for review instead of drafts.
    #[arg(long)]
    ready: bool,

    /// Preview the calls without opening pull requests.
    #[arg(long)]
    dry_run: bool,

    /// Maximum concurrent API requests.
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Exit with status 1 if any repository failed.
    #[arg(long)]
    fail_on_partial: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    let policy = if args.fail_on_partial {
        ExitPolicy::FailOnPartial
    } else {
        ExitPolicy::Lenient
    };
    let json = args.json;

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary, json);
            ExitCode::from(policy.exit_code(&summary))
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let config = load_config(&args.config)?;

    let overrides = Overrides {
        title: args.title,
        ticket: args.ticket,
        head: args.head,
        base: args.base,
        reviewers: args.reviewers,
        repositories: args.repositories,
        template: args.template,
        draft: args.ready.then_some(false),
    };
    let plan = Plan::build(&config, &args.config, &overrides)?;

    let cancellation = Cancellation::new();
    watch_for_interrupt(cancellation.clone());

    let runner_config =
        RunnerConfig::new(args.concurrency, args.dry_run).with_cancellation(cancellation);
    let token = args.token.or(config.token);
    let runner = Runner::connect(runner_config, token.as_deref()).await?;

    runner.run(&plan).await
}

/// Exit status used when a second Ctrl-C aborts the process.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Stops issuing new calls on Ctrl-C; calls already sent are allowed to finish.
///
/// A second Ctrl-C exits immediately.
fn watch_for_interrupt(cancellation: Cancellation) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt(&cancellation) {
                warn!("Interrupted again, aborting without waiting for in-flight requests");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            warn!("Interrupted, finishing in-flight requests (press Ctrl-C again to abort)");
        }
    });
}

/// Records an interrupt. Returns true if the run was already cancelled.
fn interrupt(cancellation: &Cancellation) -> bool {
    let repeated = cancellation.is_cancelled();
    cancellation.cancel();
    repeated
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(out) => println!("{out}"),
            Err(e) => error!(error = %e, "Failed to serialize summary"),
        }
        return;
    }

    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  PRs created: {}", summary.prs_created);
    println!("  PRs failed: {}", summary.prs_failed);
    println!("  PRs linked: {}", summary.prs_linked);
    println!("  Links failed: {}", summary.links_failed);
    println!("  Reviews requested: {}", summary.reviews_requested);
    println!("  Reviews failed: {}", summary.reviews_failed);
    if summary.cancelled {
        println!("  Cancelled: yes");
    }
    println!();
    print!("{summary}");
}
