//! Shared fixtures for harness integration tests

#![allow(dead_code)]

use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use parking_lot::Mutex;

/// Serializes writing and spawning fake executables within one test binary
/// (a concurrent fork holding a script's write fd causes ETXTBSY).
pub static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Write an executable `/bin/sh` script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A well-behaved fake test: records its arguments, leaves a log file in
/// its work directory, prints to both streams and exits with `code`.
pub fn write_fake_test(dir: &Path, name: &str, code: i32) -> PathBuf {
    let body = format!(
        "echo \"$@\" > args.txt\n\
         mkdir -p logs\n\
         echo \"{name} log\" > logs/run.log\n\
         echo \"{name} stdout\"\n\
         echo \"{name} stderr\" >&2\n\
         exit {code}"
    );
    write_script(dir, name, &body)
}

/// Unpack a `.tar.bz2` archive into `dest`.
pub fn unpack(archive: &Path, dest: &Path) {
    let file = File::open(archive).unwrap();
    tar::Archive::new(BzDecoder::new(file)).unpack(dest).unwrap();
}

/// Relative paths and contents of every file below `root`, sorted.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

pub fn count_lines(report: &str, prefix: &str) -> usize {
    report.lines().filter(|l| l.starts_with(prefix)).count()
}
