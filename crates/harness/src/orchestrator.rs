//! Main orchestration loop: prepare the results root, run every test in
//! order, archive each work directory, and aggregate the verdicts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::archive;
use crate::error::{HarnessError, HarnessResult};
use crate::outcome::TestOutcome;
use crate::process::TestProcess;
use crate::suite::TestDescriptor;
use crate::{ARCHIVE_EXTENSION, RESULTS_DIR};

/// Paths shared by every test of one run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Source tree root. Only recorded.
    source_root: PathBuf,

    /// Directory holding the built test executables
    binary_root: PathBuf,

    /// `<binary_root>/result`, recreated at the start of each run
    results_root: PathBuf,
}

impl RunContext {
    /// The binary root is made absolute, since tests run with their own
    /// work directory as the current directory.
    pub fn new(source_root: impl Into<PathBuf>, binary_root: impl Into<PathBuf>) -> HarnessResult<Self> {
        let binary_root = binary_root.into();
        let binary_root =
            std::path::absolute(&binary_root).map_err(|e| HarnessError::filesystem(&binary_root, e))?;
        let results_root = binary_root.join(RESULTS_DIR);

        Ok(Self {
            source_root: source_root.into(),
            binary_root,
            results_root,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn binary_root(&self) -> &Path {
        &self.binary_root
    }

    pub fn results_root(&self) -> &Path {
        &self.results_root
    }
}

/// Recreate `<binary_root>/result` and return its path.
///
/// Artifacts of a previous run are deleted. Fails when the existing path is
/// not a directory, cannot be removed, or cannot be created.
pub fn prepare_results_root<W: Write>(binary_root: &Path, out: &mut W) -> HarnessResult<PathBuf> {
    let results_root = binary_root.join(RESULTS_DIR);

    match fs::symlink_metadata(&results_root) {
        Ok(meta) if meta.is_dir() => {
            writeln!(out, "Removing path: {}", results_root.display())?;
            info!(path = %results_root.display(), "Removing previous results");
            fs::remove_dir_all(&results_root)
                .map_err(|e| HarnessError::filesystem(&results_root, e))?;
        }
        Ok(_) => {
            return Err(HarnessError::filesystem(
                &results_root,
                io::Error::other("results path exists and is not a directory"),
            ));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(HarnessError::filesystem(&results_root, e)),
    }

    fs::create_dir(&results_root).map_err(|e| HarnessError::filesystem(&results_root, e))?;

    Ok(results_root)
}

/// Run one test in a new `<results_root>/<name>` work directory.
///
/// The work directory must not exist yet. Captured stdout and stderr are
/// echoed to `out` once the process has exited. A non-zero exit is returned
/// as a failed verdict; only directory and launch problems are errors.
pub fn run_one<W: Write>(
    descriptor: &TestDescriptor,
    results_root: &Path,
    out: &mut W,
) -> HarnessResult<TestOutcome> {
    let results_root =
        std::path::absolute(results_root).map_err(|e| HarnessError::filesystem(results_root, e))?;
    let work_dir = results_root.join(descriptor.executable_name());
    fs::create_dir(&work_dir).map_err(|e| HarnessError::filesystem(&work_dir, e))?;

    let program = descriptor.executable_path();
    let program = std::path::absolute(&program).map_err(|e| HarnessError::launch(&program, e))?;

    let completion = TestProcess::launch(&program, &work_dir)?.wait()?;

    echo(out, &completion.stdout)?;
    echo(out, &completion.stderr)?;

    debug!(
        test = descriptor.executable_name(),
        verdict = %completion.verdict,
        elapsed_ms = completion.duration.as_millis() as u64,
        "Test process finished"
    );

    Ok(TestOutcome {
        descriptor: descriptor.clone(),
        verdict: completion.verdict,
        stdout: completion.stdout,
        stderr: completion.stderr,
        duration: completion.duration,
        work_dir,
    })
}

/// Write captured bytes as-is, adding a newline only if the stream did not
/// end with one so the next banner starts on its own line.
fn echo<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    out.write_all(bytes)?;
    if !bytes.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Outcomes of a completed run, in execution order
#[derive(Debug, Clone)]
pub struct RunSummary {
    outcomes: Vec<TestOutcome>,
}

impl RunSummary {
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(TestOutcome::passed)
    }

    /// Process exit code for the run: 0 if every test passed, else 1
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Drives one complete run over an explicit list of tests
pub struct Orchestrator {
    context: RunContext,
    tests: Vec<TestDescriptor>,
}

impl Orchestrator {
    pub fn new(context: RunContext, tests: Vec<TestDescriptor>) -> Self {
        Self { context, tests }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn tests(&self) -> &[TestDescriptor] {
        &self.tests
    }

    /// Run every test in list order, writing the report to `out`.
    ///
    /// Failing tests do not stop the run. Filesystem and launch errors do,
    /// and are returned without the closing banner.
    pub fn run_all<W: Write>(&self, out: &mut W) -> HarnessResult<RunSummary> {
        let total = self.tests.len();

        debug!(
            source_root = %self.context.source_root().display(),
            binary_root = %self.context.binary_root().display(),
            "Run context"
        );
        writeln!(out, "Running {} tests", total)?;

        let results_root = prepare_results_root(self.context.binary_root(), out)?;
        info!(results_root = %results_root.display(), tests = total, "Starting test run");

        let mut outcomes = Vec::with_capacity(total);

        for (index, descriptor) in self.tests.iter().enumerate() {
            let name = descriptor.executable_name();
            writeln!(out, "# Start {} of {}: {}: ", index + 1, total, name)?;
            out.flush()?;

            let outcome = run_one(descriptor, &results_root, out)?;
            writeln!(out, "{}\n", outcome.result_line())?;
            out.flush()?;

            let archive_path = results_root.join(format!("{}.{}", name, ARCHIVE_EXTENSION));
            if let Err(e) = archive(outcome.work_dir(), name, &archive_path) {
                warn!(test = name, error = %e, "Archiving failed; verdict unchanged");
            }

            outcomes.push(outcome);
        }

        writeln!(out, "Tests are finished")?;
        out.flush()?;

        let summary = RunSummary { outcomes };
        info!(
            total = summary.total(),
            passed = summary.passed(),
            failed = summary.failed(),
            "Test run finished"
        );

        Ok(summary)
    }
}
