//! # Utility Module
//!
//! Filesystem helpers shared by the bookmark sources and configuration:
//! profile directory discovery, newest-backup lookup and home expansion.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// Name of the first subdirectory of `dir` whose name ends with `suffix`,
/// compared case-insensitively. Entries are visited in name order.
pub fn search_suffix_dir(dir: &Path, suffix: &str) -> io::Result<String> {
    let suffix = suffix.to_lowercase();
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();

    names
        .into_iter()
        .find(|name| name.to_lowercase().ends_with(&suffix))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "no directory with suffix ({suffix}) in {}",
                    dir.display()
                ),
            )
        })
}

/// Path of the most recently modified regular, non-hidden file in `dir`.
pub fn latest_file(dir: &Path) -> io::Result<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        // Ties resolve to the later name so the result does not depend on read_dir order.
        let newer = match &latest {
            None => true,
            Some((time, path)) => {
                modified > *time || (modified == *time && entry.path() > *path)
            }
        };
        if newer {
            latest = Some((modified, entry.path()));
        }
    }

    match latest {
        Some((_, path)) => {
            debug!("latest file in {}: {}", dir.display(), path.display());
            Ok(path)
        }
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no files in the directory {}", dir.display()),
        )),
    }
}

/// Expand a leading `~` and any `$HOME` / `${HOME}` in `raw`.
pub fn expand_home(raw: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(raw);
    };
    let home = home.to_string_lossy();
    let expanded = raw.replace("${HOME}", &home).replace("$HOME", &home);
    if expanded == "~" {
        return PathBuf::from(home.as_ref());
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        return Path::new(home.as_ref()).join(rest);
    }
    PathBuf::from(expanded)
}
