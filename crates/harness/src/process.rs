//! Process management - launching a test executable and waiting for it

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::outcome::Verdict;

/// Handle to a running test executable
///
/// Launching and waiting are separate steps so a caller can hold the handle
/// between them.
pub struct TestProcess {
    child: Child,
    program: PathBuf,
    started: Instant,
}

/// What a test process left behind once it exited
#[derive(Debug, Clone)]
pub struct Completion {
    pub verdict: Verdict,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
}

impl TestProcess {
    /// Start `program --path <work_dir>` with `work_dir` as its current
    /// directory. Both paths should be absolute: a relative program path
    /// would be resolved from inside `work_dir`.
    pub fn launch(program: &Path, work_dir: &Path) -> HarnessResult<Self> {
        debug!(
            program = %program.display(),
            work_dir = %work_dir.display(),
            "Launching test process"
        );

        let mut cmd = Command::new(program);
        cmd.arg("--path")
            .arg(work_dir)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let child = cmd
            .spawn()
            .map_err(|e| HarnessError::launch(program, e))?;

        debug!(pid = child.id(), "Test process started");

        Ok(Self {
            child,
            program: program.to_path_buf(),
            started,
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Block until the process exits, draining both output streams.
    pub fn wait(self) -> HarnessResult<Completion> {
        let Self {
            child,
            program,
            started,
        } = self;

        let output = child
            .wait_with_output()
            .map_err(|e| HarnessError::launch(&program, e))?;
        let duration = started.elapsed();

        log_signal(&program, output.status);

        Ok(Completion {
            verdict: Verdict::from_status(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
            duration,
        })
    }
}

#[cfg(unix)]
fn log_signal(program: &Path, status: ExitStatus) {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    if let Some(raw) = status.signal() {
        let name = Signal::try_from(raw)
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|_| format!("signal {}", raw));
        warn!(
            program = %program.display(),
            signal = %name,
            core_dumped = status.core_dumped(),
            "Test process terminated by signal"
        );
    }
}

#[cfg(not(unix))]
fn log_signal(_program: &Path, _status: ExitStatus) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{write_fake_test, SPAWN_LOCK};

    #[test]
    fn test_launch_and_wait_captures_streams() {
        let _guard = SPAWN_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let program = write_fake_test(
            dir.path(),
            "echoer",
            "echo out-line\necho err-line >&2\necho \"$@\" > args.txt\nexit 0",
        );
        let work_dir = dir.path().join("work");
        std::fs::create_dir(&work_dir).unwrap();

        let process = TestProcess::launch(&program, &work_dir).unwrap();
        assert!(process.id() > 0);
        let completion = process.wait().unwrap();

        assert_eq!(completion.verdict, Verdict::Success);
        assert_eq!(completion.stdout, b"out-line\n");
        assert_eq!(completion.stderr, b"err-line\n");

        let args = std::fs::read_to_string(work_dir.join("args.txt")).unwrap();
        assert_eq!(args.trim_end(), format!("--path {}", work_dir.display()));
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let _guard = SPAWN_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let program = write_fake_test(dir.path(), "fails", "exit 7");

        let completion = TestProcess::launch(&program, dir.path())
            .unwrap()
            .wait()
            .unwrap();

        assert_eq!(completion.verdict, Verdict::Failure(7));
        assert!(!completion.verdict.is_success());
    }

    #[test]
    fn test_killed_process_reports_negative_signal() {
        let _guard = SPAWN_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let program = write_fake_test(dir.path(), "crashes", "kill -9 $$");

        let completion = TestProcess::launch(&program, dir.path())
            .unwrap()
            .wait()
            .unwrap();

        assert_eq!(completion.verdict, Verdict::Failure(-9));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");

        let err = TestProcess::launch(&missing, dir.path()).err().unwrap();
        assert!(matches!(err, HarnessError::Launch { .. }));
        assert!(err.is_fatal());
    }
}
