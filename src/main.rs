use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use qsub_tracker::config::{ErrorStreamPolicy, SubmitConfig, TrackerConfig};
use qsub_tracker::queue::QsubSubmitter;
use qsub_tracker::shutdown::install_shutdown_handler;
use qsub_tracker::{JobStatus, JobSummary, Tracker};

#[derive(Parser, Debug)]
#[command(name = "qsub-tracker")]
#[command(version)]
#[command(about = "Submit batch scripts with qsub and wait for their output")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Submit scripts, wait for all of them to finish and print the results
    Run(RunArgs),
}

// =============================================================================
// Run Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct RunArgs {
    /// Batch scripts to submit
    #[arg(required = true)]
    scripts: Vec<String>,

    /// Number of times each script is submitted
    #[arg(long, short = 'n', default_value = "1")]
    count: usize,

    /// Submission command
    #[arg(long, default_value = "qsub")]
    command: String,

    /// Extra argument passed to the submission command (repeatable)
    #[arg(long = "submit-arg", allow_hyphen_values = true)]
    submit_args: Vec<String>,

    /// Directory for job output/error files
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Delay between polling cycles in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Mark jobs that wrote to stderr as ERROR instead of FINISHED
    #[arg(long)]
    escalate_errors: bool,

    /// Do not print captured job output
    #[arg(long)]
    no_output: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct RunOutput {
    completed: bool,
    jobs: Vec<JobSummary>,
}

// =============================================================================
// Run Implementation
// =============================================================================

async fn run(args: RunArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let submit_config = SubmitConfig {
        command: args.command,
        extra_args: args.submit_args,
    };

    let error_policy = if args.escalate_errors {
        ErrorStreamPolicy::Escalate
    } else {
        ErrorStreamPolicy::MergeOnly
    };
    let config = TrackerConfig::new(args.work_dir)
        .with_poll_interval(Duration::from_millis(args.interval_ms))
        .with_error_policy(error_policy);

    tracing::info!(
        command = %submit_config.command,
        work_dir = %config.work_dir.display(),
        scripts = ?args.scripts,
        count = args.count,
        "Submitting jobs"
    );

    let shutdown = install_shutdown_handler()?;

    let mut tracker = Tracker::new(QsubSubmitter::new(submit_config), config);
    let scripts = args
        .scripts
        .iter()
        .flat_map(|script| std::iter::repeat(script.as_str()).take(args.count));
    tracker.submit_until_cancelled(scripts, &shutdown).await?;

    let completed = tracker.wait_until_cancelled(&shutdown).await?;

    let results = tracker.results(!args.no_output);
    let clean = completed && results.iter().all(|r| r.status == JobStatus::Finished);

    match args.output {
        OutputFormat::Json => {
            let output = RunOutput {
                completed,
                jobs: results,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            tracker.print_results(!args.no_output);
            if !completed {
                println!();
                println!("Interrupted with {} job(s) still running", tracker.pending());
            }
        }
    }

    Ok(clean)
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match args.command {
        Commands::Run(run_args) => {
            if !run(run_args).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
