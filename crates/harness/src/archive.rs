//! Packing test work directories into `.tar.bz2` archives

use std::fs::{self, File, FileType};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bzip2::write::BzEncoder;
use bzip2::Compression;
use tar::Builder;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{HarnessError, HarnessResult};

/// Pack `work_dir` into a bzip2-compressed tarball at `archive_path`.
///
/// Every member is stored under `entry_name/`, so unpacking recreates a
/// directory named after the test rather than the absolute source path.
/// Members are added in file-name order and symlinks are stored as links.
/// Sockets cannot be stored in a tarball and are skipped with a warning.
/// On failure the partially written archive is removed.
pub fn archive(work_dir: &Path, entry_name: &str, archive_path: &Path) -> HarnessResult<()> {
    debug!(
        work_dir = %work_dir.display(),
        archive = %archive_path.display(),
        "Archiving work directory"
    );

    if let Err(e) = write_archive(work_dir, entry_name, archive_path) {
        let _ = fs::remove_file(archive_path);
        return Err(HarnessError::archive(archive_path, e));
    }

    Ok(())
}

fn write_archive(work_dir: &Path, entry_name: &str, archive_path: &Path) -> io::Result<()> {
    let file = File::create(archive_path)?;
    let enc = BzEncoder::new(BufWriter::new(file), Compression::best());
    let mut builder = Builder::new(enc);
    builder.follow_symlinks(false);

    builder.append_dir(entry_name, work_dir)?;

    for entry in WalkDir::new(work_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let relative = path.strip_prefix(work_dir).map_err(io::Error::other)?;
        let name = Path::new(entry_name).join(relative);

        if !is_archivable(&entry.file_type()) {
            warn!(path = %path.display(), "Skipping unsupported file type");
            continue;
        }

        if entry.file_type().is_dir() {
            builder.append_dir(&name, path)?;
        } else {
            builder.append_path_with_name(path, &name)?;
        }
    }

    let enc = builder.into_inner()?;
    let mut writer = enc.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn is_archivable(file_type: &FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;

    !file_type.is_socket()
}

#[cfg(not(unix))]
fn is_archivable(_file_type: &FileType) -> bool {
    true
}
