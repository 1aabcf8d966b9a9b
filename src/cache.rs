//! # Cache Module
//!
//! Time-boxed storage of an aggregated bookmark list. Freshness comes from the
//! cache file's modification time, never from its contents.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::debug;

use crate::bookmark::Bookmark;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache not found: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key/value store for bookmark snapshots, keyed by file name.
pub trait Cacher: Send + Sync {
    fn load(&self, key: &str) -> Result<Vec<Bookmark>, CacheError>;
    fn store(&self, key: &str, bookmarks: &[Bookmark]) -> Result<(), CacheError>;
    /// True when the entry is missing or older than `max_age`.
    fn expired(&self, key: &str, max_age: Duration) -> bool;
    fn clear(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache persisted as one MessagePack file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(CacheError::NotFound(dir));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.tmp"))
    }

    fn age(&self, key: &str) -> io::Result<Duration> {
        let modified = std::fs::metadata(self.path(key))?.modified()?;
        // An mtime in the future reads as brand new.
        Ok(SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO))
    }
}

impl Cacher for FileCache {
    fn load(&self, key: &str) -> Result<Vec<Bookmark>, CacheError> {
        let path = self.path(key);
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound(path.clone()),
            _ => CacheError::Io(e),
        })?;
        rmp_serde::from_slice(&bytes).map_err(|e| {
            CacheError::Serialization(format!("failed to load {}: {e}", path.display()))
        })
    }

    fn store(&self, key: &str, bookmarks: &[Bookmark]) -> Result<(), CacheError> {
        let path = self.path(key);
        let bytes = rmp_serde::to_vec(bookmarks).map_err(|e| {
            CacheError::Serialization(format!("failed to save {}: {e}", path.display()))
        })?;
        let tmp = self.tmp_path(key);
        if let Err(err) = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, &path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!("stored {} bookmarks in {}", bookmarks.len(), path.display());
        Ok(())
    }

    fn expired(&self, key: &str, max_age: Duration) -> bool {
        match self.age(key) {
            Ok(age) => age > max_age,
            Err(_) => true,
        }
    }

    fn clear(&self, key: &str) -> Result<(), CacheError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A cache that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cacher for NullCache {
    fn load(&self, _key: &str) -> Result<Vec<Bookmark>, CacheError> {
        Ok(Vec::new())
    }

    fn store(&self, _key: &str, _bookmarks: &[Bookmark]) -> Result<(), CacheError> {
        Ok(())
    }

    fn expired(&self, _key: &str, _max_age: Duration) -> bool {
        true
    }

    fn clear(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
