// Zip extraction onto the destination directory
//
// Existing files at conflicting paths are truncated and rewritten. Nothing
// that is absent from the archive gets removed.

use crate::error::{Result, SyncError};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, trace};
use zip::ZipArchive;

/// Counters from a single extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub files_written: usize,
    pub directories_created: usize,
}

/// Extract every entry of the zip at `archive_path` into `dest_dir`.
///
/// Intermediate directories are created as needed. A failure midway leaves
/// whatever was already written in place.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<ExtractStats> {
    let file = File::open(archive_path).map_err(|e| SyncError::fs(archive_path, e))?;
    let mut archive = ZipArchive::new(file)?;
    let mut stats = ExtractStats::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| SyncError::UnsafeEntry(entry.name().to_string()))?;
        let target = dest_dir.join(&relative);

        if entry.is_dir() {
            if !target.is_dir() {
                fs::create_dir_all(&target).map_err(|e| SyncError::fs(&target, e))?;
                stats.directories_created += 1;
            }
            continue;
        }

        if let Some(parent) = target.parent() {
            if !parent.is_dir() {
                fs::create_dir_all(parent).map_err(|e| SyncError::fs(parent, e))?;
                stats.directories_created += 1;
            }
        }

        let mut out = File::create(&target).map_err(|e| SyncError::fs(&target, e))?;
        let written = io::copy(&mut entry, &mut out).map_err(|e| SyncError::fs(&target, e))?;
        trace!(entry = %relative.display(), bytes = written, "extracted");

        // Owner write stays set so the next sync can overwrite the file.
        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let mode = (mode & 0o777) | 0o200;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                .map_err(|e| SyncError::fs(&target, e))?;
        }

        stats.files_written += 1;
    }

    debug!(
        dest = %dest_dir.display(),
        files = stats.files_written,
        directories = stats.directories_created,
        "archive extracted"
    );

    Ok(stats)
}
