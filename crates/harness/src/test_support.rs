//! Helpers for tests that spawn fake test executables

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Held while writing or spawning fake executables. A fork racing with a
/// still-open script fd makes exec fail with ETXTBSY.
pub(crate) static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub(crate) fn write_fake_test(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
