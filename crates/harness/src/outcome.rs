//! Results of individual test executions

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use crate::suite::TestDescriptor;

/// Pass/fail verdict of one test process
///
/// Exit code 0 is the only success. Everything else, including termination
/// by a signal, is a failure carrying the raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(i32),
}

impl Verdict {
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Verdict::Success
        } else {
            Verdict::Failure(code)
        }
    }

    /// Signal terminations map to `-<signum>`; `-1` when neither a code nor
    /// a signal is available.
    pub fn from_status(status: ExitStatus) -> Self {
        Self::from_code(raw_exit_code(status))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Success => 0,
            Verdict::Failure(code) => *code,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "Passed"),
            Verdict::Failure(code) => write!(f, "Failed ({})", code),
        }
    }
}

#[cfg(unix)]
fn raw_exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn raw_exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Everything recorded about one finished test
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub descriptor: TestDescriptor,
    pub verdict: Verdict,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
    pub work_dir: PathBuf,
}

impl TestOutcome {
    pub fn name(&self) -> &str {
        self.descriptor.executable_name()
    }

    pub fn passed(&self) -> bool {
        self.verdict.is_success()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Summary line printed once the test has finished
    pub fn result_line(&self) -> String {
        format!(
            "# Result: {}\t{:.3} sec",
            self.verdict,
            self.duration.as_secs_f64()
        )
    }
}
