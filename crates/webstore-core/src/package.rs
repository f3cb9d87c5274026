use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Resolve the package file to upload.
///
/// A file path is returned as-is. For a directory, the `*.zip` file with the
/// latest modification time wins; ties go to the lexically greatest path.
pub fn resolve_package(path: &Path) -> Result<PathBuf> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::PackageMissing(path.to_path_buf()),
        _ => Error::Io(e),
    })?;

    if metadata.is_dir() {
        most_recent_package(path)
    } else {
        Ok(path.to_path_buf())
    }
}

/// Pick the most recently modified `*.zip` in a directory
pub fn most_recent_package(dir: &Path) -> Result<PathBuf> {
    let pattern = format!("{}/*.zip", glob::Pattern::escape(&dir.to_string_lossy()));

    let entries = glob::glob(&pattern)
        .map_err(|e| Error::Config(format!("Invalid package directory {}: {}", dir.display(), e)))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in entries {
        let candidate = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let metadata = std::fs::metadata(&candidate)?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;

        let is_newer = match &newest {
            None => true,
            Some((best_time, best_path)) => {
                (modified, &candidate) > (*best_time, best_path)
            }
        };

        if is_newer {
            newest = Some((modified, candidate));
        }
    }

    match newest {
        Some((_, path)) => {
            tracing::debug!("Most recent package in {}: {}", dir.display(), path.display());
            Ok(path)
        }
        None => Err(Error::NoPackageFound(dir.to_path_buf())),
    }
}
