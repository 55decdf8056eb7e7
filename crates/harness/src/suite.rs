//! Test descriptors and the default suite

use std::path::{Path, PathBuf};

/// Executables run by `runner` when no other list is supplied, in order.
pub const DEFAULT_TESTS: [&str; 3] = ["dnet_cpp_test", "dnet_cpp_cache_test", "dnet_cpp_srw_test"];

/// One external test executable and the directory holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescriptor {
    directory: PathBuf,
    executable_name: String,
}

impl TestDescriptor {
    pub fn new(directory: impl Into<PathBuf>, executable_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            executable_name: executable_name.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Also names the work directory and the archive's top-level entry.
    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    pub fn executable_path(&self) -> PathBuf {
        self.directory.join(&self.executable_name)
    }
}

/// The built-in suite, with every executable expected in `binary_root`
pub fn default_suite(binary_root: &Path) -> Vec<TestDescriptor> {
    DEFAULT_TESTS
        .iter()
        .map(|name| TestDescriptor::new(binary_root, *name))
        .collect()
}
