//! Suite Harness
//!
//! Runs a fixed list of external test executables one after another, each in
//! a freshly created work directory, and keeps a `.tar.bz2` archive of every
//! work directory for later inspection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Orchestrator                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  prepare_results_root(binary_root) -> <binary_root>/result  │
//! │  for each TestDescriptor, in order:                         │
//! │    ├── run_one()  -> TestProcess::launch / wait -> Outcome  │
//! │    └── archive()  -> result/<name>.tar.bz2 (best effort)    │
//! │  RunSummary -> exit code 0 (all passed) or 1                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each test executable is started as `<exe> --path <work_dir>` with
//! `<work_dir>` as its current directory. Its output and files are captured
//! but never interpreted; only the exit code decides pass or fail.

pub mod archive;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod process;
pub mod suite;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use archive::archive;
pub use error::{HarnessError, HarnessResult};
pub use orchestrator::{prepare_results_root, run_one, Orchestrator, RunContext, RunSummary};
pub use outcome::{TestOutcome, Verdict};
pub use process::{Completion, TestProcess};
pub use suite::{default_suite, TestDescriptor};

/// Name of the directory created under the binary root for run artifacts
pub const RESULTS_DIR: &str = "result";

/// File extension of per-test archives
pub const ARCHIVE_EXTENSION: &str = "tar.bz2";
