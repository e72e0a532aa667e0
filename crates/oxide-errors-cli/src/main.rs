//! oxide-errors CLI
//!
//! Binds a validation error response onto a model skeleton and reports the
//! messages that found no counterpart.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_errors::{Matcher, Record, UnmatchedErrors};

/// Bind validation error responses onto model skeletons.
#[derive(Parser)]
#[command(name = "oxide-errors")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a response and print the model with its errors.
    Bind {
        #[command(flatten)]
        input: InputArgs,

        /// Keep errors already present in the model skeleton.
        #[arg(long)]
        preserve_existing: bool,
    },

    /// Report unmatched errors; exits non-zero if there are any.
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Model skeleton (JSON).
    #[arg(short, long)]
    model: PathBuf,

    /// Errors response body (JSON).
    #[arg(short, long)]
    response: PathBuf,

    /// First segment of diagnostic paths (defaults to the model type).
    #[arg(long, env = "OXIDE_ERRORS_ROOT_PATH")]
    root_path: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Bind {
            input,
            preserve_existing,
        } => {
            let (record, unmatched) = bind(&input, preserve_existing)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            if unmatched.has_errors() {
                unmatched.report();
                println!("\nUnmatched errors:");
                print!("{}", render_unmatched(&unmatched));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check { input } => {
            let outcome = check(&input)?;
            if let CheckOutcome::Drift { report, count } = &outcome {
                print!("{report}");
                info!(count, "Response does not match the model");
            } else {
                info!("Every error in the response matched the model.");
            }
            Ok(outcome.exit_code())
        }
    }
}

/// Result of the `check` command.
#[derive(Debug, PartialEq, Eq)]
enum CheckOutcome {
    /// Every message found its attribute.
    Clean,
    /// Some messages were orphaned; `count` is the number of paths.
    Drift { report: String, count: usize },
}

impl CheckOutcome {
    const fn is_failure(&self) -> bool {
        matches!(self, Self::Drift { .. })
    }

    fn exit_code(&self) -> ExitCode {
        if self.is_failure() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn check(input: &InputArgs) -> anyhow::Result<CheckOutcome> {
    let (_, unmatched) = bind(input, false)?;
    if unmatched.has_errors() {
        Ok(CheckOutcome::Drift {
            report: render_unmatched(&unmatched),
            count: unmatched.count(),
        })
    } else {
        Ok(CheckOutcome::Clean)
    }
}

fn bind(input: &InputArgs, preserve_existing: bool) -> anyhow::Result<(Record, UnmatchedErrors)> {
    let model_source = read(&input.model)?;
    let response_source = read(&input.response)?;

    let mut record = Record::from_json(&model_source)
        .with_context(|| format!("loading model {}", input.model.display()))?;

    let mut matcher = Matcher::new();
    if let Some(root_path) = &input.root_path {
        matcher = matcher.root_path(root_path);
    }
    if preserve_existing {
        matcher = matcher.preserve_existing();
    }

    let unmatched = matcher
        .consume_str(&mut record, &response_source)
        .with_context(|| format!("binding response {}", input.response.display()))?;
    Ok((record, unmatched))
}

fn read(path: &Path) -> anyhow::Result<String> {
    debug!(path = %path.display(), "Reading input");
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Renders one `path: messages` line per unmatched path.
fn render_unmatched(unmatched: &UnmatchedErrors) -> String {
    let mut out = String::new();
    for path in unmatched.keys() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{path}: {}", unmatched.errors_for_display(path));
    }
    out
}
