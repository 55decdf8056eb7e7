//! `runner` - run the test suite found in a build directory
//!
//! ```text
//! runner <source_root> <binary_root>
//! ```
//!
//! Exits 0 when every test passed and 1 when any test failed or the run
//! could not be prepared.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use suite_harness::{default_suite, Orchestrator, RunContext};

/// Sequential runner for the built test executables
#[derive(Parser, Debug)]
#[command(name = "runner")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Root of the source tree
    source_root: PathBuf,

    /// Directory containing the built test executables
    binary_root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Logs go to stderr; stdout carries the run report.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let context = RunContext::new(cli.source_root, cli.binary_root)
        .context("Failed to resolve binary root")?;
    let tests = default_suite(context.binary_root());
    debug!(tests = tests.len(), "Loaded default suite");

    let orchestrator = Orchestrator::new(context, tests);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = orchestrator.run_all(&mut out).context("Test run aborted")?;

    Ok(ExitCode::from(summary.exit_code()))
}
