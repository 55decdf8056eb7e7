//! Error types for the harness

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    /// Results root or a per-test work directory could not be prepared.
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A test executable could not be started or waited on.
    #[error("Failed to launch {}: {source}", .path.display())]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Packing a work directory failed. Never affects a test's verdict.
    #[error("Failed to archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the run report failed (e.g. a closed stdout pipe). Fatal.
    #[error("Failed to write run report: {0}")]
    Report(#[from] std::io::Error),
}

impl HarnessError {
    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        HarnessError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn launch(path: &Path, source: std::io::Error) -> Self {
        HarnessError::Launch {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn archive(path: &Path, source: std::io::Error) -> Self {
        HarnessError::Archive {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HarnessError::Archive { .. })
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
