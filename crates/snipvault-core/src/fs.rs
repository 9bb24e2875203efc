//! Filesystem utilities for atomic store rewrites.
//!
//! A rewrite is split into two steps so a crash can only ever land between
//! them: [`stage_file`] writes and syncs a sibling `<file>.<nanos>.tmp`, and
//! [`replace_with_staged`] renames it over the target. Until the rename, the
//! old file is untouched.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::error::{Result, VaultError};

const STAGING_SUFFIX: &str = ".tmp";

/// Staging files younger than this may belong to a write still in flight.
pub const STALE_STAGING_AGE: Duration = Duration::from_secs(60);

/// Write `data` to a fresh staging file next to `destination` and sync it.
///
/// Returns the staging path. Nothing at `destination` changes.
pub fn stage_file(destination: &Path, data: &[u8]) -> Result<PathBuf> {
    let (parent, filename) = split_path(destination)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| VaultError::Storage(format!("System time error: {}", e)))?
        .as_nanos();
    let temp_path = parent.join(format!("{}.{}{}", filename, nanos, STAGING_SUFFIX));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)?;
    restrict_file_permissions(&temp_path);

    let written = file.write_all(data).and_then(|()| file.sync_all());
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    Ok(temp_path)
}

/// Move a staged file over `destination` in a single rename.
///
/// `fs::rename` replaces an existing target on every supported platform, so
/// `destination` is never removed here. If the rename fails, only the
/// staging file is cleaned up and the old `destination` stays as it was.
pub fn replace_with_staged(temp_path: &Path, destination: &Path) -> io::Result<()> {
    fs::rename(temp_path, destination).map_err(|err| {
        let _ = fs::remove_file(temp_path);
        io::Error::new(
            err.kind(),
            format!(
                "Cannot move {} into place: {}",
                temp_path.display(),
                err
            ),
        )
    })
}

/// Replace `destination` with `data` so readers see either the old or the new file.
pub fn write_atomic(destination: &Path, data: &[u8]) -> Result<()> {
    let temp_path = stage_file(destination, data)?;
    replace_with_staged(&temp_path, destination)?;
    let (parent, _) = split_path(destination)?;
    fsync_dir(parent)
}

/// Remove staging files left behind by an interrupted [`write_atomic`].
///
/// Only files whose embedded timestamp is at least [`STALE_STAGING_AGE`]
/// old are removed; a younger one may be another writer's rewrite in
/// progress. Returns how many files were removed.
pub fn cleanup_orphaned_staging(destination: &Path) -> usize {
    let Ok((parent, filename)) = split_path(destination) else {
        return 0;
    };
    let Ok(entries) = fs::read_dir(parent) else {
        return 0;
    };
    let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    let cutoff = now.saturating_sub(STALE_STAGING_AGE).as_nanos();

    let prefix = format!("{}.", filename);
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let staged_at = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(STAGING_SUFFIX))
            .filter(|nanos| !nanos.is_empty() && nanos.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|nanos| nanos.parse::<u128>().ok());
        let Some(staged_at) = staged_at else {
            continue;
        };
        if staged_at > cutoff {
            debug!(path = %entry.path().display(), "leaving recent staging file");
            continue;
        }
        warn!(path = %entry.path().display(), "removing orphaned staging file");
        if fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Limit a store file to its owner. Failure is logged, not fatal.
pub fn restrict_file_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            warn!("cannot restrict permissions on {}: {}", path.display(), e);
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

fn fsync_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let dir = OpenOptions::new().read(true).open(path)?;
        dir.sync_all()?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn split_path(path: &Path) -> Result<(&Path, &str)> {
    let parent = path
        .parent()
        .ok_or_else(|| VaultError::Storage("Invalid store path".to_string()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| VaultError::Storage("Invalid store filename".to_string()))?;
    // A bare file name has an empty parent; use the working directory.
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    Ok((parent, filename))
}
