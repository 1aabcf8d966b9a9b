//! # Engine Module
//!
//! Aggregates bookmarks from every enabled source. Sources are decoded
//! (optionally in parallel) and merged in [`SourceName`] order, deduplicated,
//! folder-filtered and written through the configured cache.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bookmark::{Bookmark, SourceName, filter_by_folder_prefix, uniq_by_uri};
use crate::cache::{CacheError, Cacher, FileCache, NullCache};
use crate::sources::{BookmarkSource, SourceError, decoder_for};

const DEFAULT_CACHE_HOURS: u64 = 24;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load bookmarks in {name}: {error}")]
    Source {
        name: SourceName,
        #[source]
        error: SourceError,
    },
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Cache lifetime for an hour count: `0` means the 24 hour default and a
/// negative count disables caching.
pub fn cache_ttl(hours: i64) -> Option<Duration> {
    match hours {
        0 => Some(Duration::from_secs(DEFAULT_CACHE_HOURS * 3600)),
        h if h < 0 => None,
        h => Some(Duration::from_secs(h as u64 * 3600)),
    }
}

enum Location {
    Profile { path: PathBuf, name: String },
    File(PathBuf),
}

struct PendingSource {
    decoder: Box<dyn BookmarkSource>,
    location: Location,
}

struct EnabledSource {
    decoder: Box<dyn BookmarkSource>,
    path: PathBuf,
}

pub struct EngineBuilder {
    sources: BTreeMap<SourceName, PendingSource>,
    remove_duplicates: bool,
    folder_filter: String,
    cache: Option<(PathBuf, i64)>,
    cache_key: Option<String>,
    parallel: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            remove_duplicates: false,
            folder_filter: String::new(),
            cache: None,
            cache_key: None,
            parallel: true,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read Firefox bookmarks from the newest backup of the matching profile.
    pub fn firefox(self, profile_path: impl Into<PathBuf>, profile_name: &str) -> Self {
        self.profile(SourceName::Firefox, profile_path.into(), profile_name)
    }

    /// Read Chrome bookmarks from the matching profile.
    pub fn chrome(self, profile_path: impl Into<PathBuf>, profile_name: &str) -> Self {
        self.profile(SourceName::Chrome, profile_path.into(), profile_name)
    }

    /// Read Safari bookmarks from `library_dir/Bookmarks.plist`.
    pub fn safari(self, library_dir: impl Into<PathBuf>) -> Self {
        self.profile(SourceName::Safari, library_dir.into(), "")
    }

    /// Enable `name` with an explicit bookmark file, skipping discovery.
    pub fn bookmark_file(self, name: SourceName, path: impl Into<PathBuf>) -> Self {
        self.decoder(decoder_for(name), path)
    }

    /// Enable a source with a custom decoder reading `path`.
    pub fn decoder(mut self, decoder: Box<dyn BookmarkSource>, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(
            decoder.name(),
            PendingSource {
                decoder,
                location: Location::File(path.into()),
            },
        );
        self
    }

    pub fn remove_duplicates(mut self, enabled: bool) -> Self {
        self.remove_duplicates = enabled;
        self
    }

    pub fn folder_filter(mut self, prefix: impl Into<String>) -> Self {
        self.folder_filter = prefix.into();
        self
    }

    /// Cache results in `dir` for `age_hours` (see [`cache_ttl`]).
    pub fn cache(mut self, dir: impl Into<PathBuf>, age_hours: i64) -> Self {
        self.cache = Some((dir.into(), age_hours));
        self
    }

    /// Override the cache file name. Without one the name is derived from
    /// the enabled sources, their files, the dedup flag and the folder filter.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn build(self) -> Result<Engine, EngineError> {
        let mut sources = Vec::with_capacity(self.sources.len());
        for (name, pending) in self.sources {
            let path = match pending.location {
                Location::File(path) => path,
                Location::Profile { path, name: profile } => pending
                    .decoder
                    .locate(&path, &profile)
                    .map_err(|error| EngineError::Source { name, error })?,
            };
            info!("{name}: reading {}", path.display());
            sources.push(EnabledSource {
                decoder: pending.decoder,
                path,
            });
        }

        let (cache, max_age): (Box<dyn Cacher>, Duration) =
            match self.cache.and_then(|(dir, hours)| cache_ttl(hours).map(|ttl| (dir, ttl))) {
                Some((dir, ttl)) => (Box::new(FileCache::new(dir)?), ttl),
                None => (Box::new(NullCache), Duration::ZERO),
            };

        let cache_key = match self.cache_key {
            Some(key) => key,
            None => derived_cache_key(&sources, self.remove_duplicates, &self.folder_filter),
        };
        debug!("cache key {cache_key}");

        Ok(Engine {
            sources,
            remove_duplicates: self.remove_duplicates,
            folder_filter: self.folder_filter,
            cache,
            cache_key,
            max_age,
            parallel: self.parallel,
        })
    }

    fn profile(mut self, name: SourceName, path: PathBuf, profile: &str) -> Self {
        self.sources.insert(
            name,
            PendingSource {
                decoder: decoder_for(name),
                location: Location::Profile {
                    path,
                    name: profile.to_string(),
                },
            },
        );
        self
    }
}

/// `marksift-<16 hex>.cache` over everything that shapes the cached list.
fn derived_cache_key(sources: &[EnabledSource], remove_duplicates: bool, folder_filter: &str) -> String {
    let mut hasher = Sha256::new();
    for source in sources {
        hasher.update(source.decoder.name().as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(source.path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
    }
    hasher.update([u8::from(remove_duplicates)]);
    hasher.update(folder_filter.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("marksift-{}.cache", &digest[..16])
}

pub struct Engine {
    sources: Vec<EnabledSource>,
    remove_duplicates: bool,
    folder_filter: String,
    cache: Box<dyn Cacher>,
    cache_key: String,
    max_age: Duration,
    parallel: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Enabled sources in decode order with their bookmark files.
    pub fn sources(&self) -> impl Iterator<Item = (SourceName, &Path)> {
        self.sources
            .iter()
            .map(|s| (s.decoder.name(), s.path.as_path()))
    }

    /// Aggregated bookmarks, served from the cache while it is fresh.
    pub fn bookmarks(&self) -> Result<Vec<Bookmark>, EngineError> {
        if !self.cache.expired(&self.cache_key, self.max_age) {
            match self.cache.load(&self.cache_key) {
                Ok(bookmarks) => {
                    info!("loaded {} bookmarks from cache", bookmarks.len());
                    return Ok(bookmarks);
                }
                Err(err) => warn!("ignoring unreadable cache, rebuilding: {err}"),
            }
        }

        let mut bookmarks = Vec::new();
        for (source, result) in self.sources.iter().zip(self.decode_all()) {
            let records = result.map_err(|error| EngineError::Source {
                name: source.decoder.name(),
                error,
            })?;
            bookmarks.extend(records);
        }

        if self.remove_duplicates {
            let before = bookmarks.len();
            bookmarks = uniq_by_uri(bookmarks);
            debug!("removed {} duplicate bookmarks", before - bookmarks.len());
        }
        if !self.folder_filter.is_empty() {
            bookmarks = filter_by_folder_prefix(bookmarks, &self.folder_filter);
        }

        self.cache.store(&self.cache_key, &bookmarks)?;
        info!(
            "aggregated {} bookmarks from {} sources",
            bookmarks.len(),
            self.sources.len()
        );
        Ok(bookmarks)
    }

    pub fn clear_cache(&self) -> Result<(), EngineError> {
        self.cache.clear(&self.cache_key)?;
        info!("cache cleared");
        Ok(())
    }

    fn decode_all(&self) -> Vec<Result<Vec<Bookmark>, SourceError>> {
        if self.parallel && self.sources.len() > 1 {
            self.decode_parallel()
        } else {
            self.sources
                .iter()
                .map(|s| s.decoder.decode(&s.path))
                .collect()
        }
    }

    /// Decode every source on its own thread; results are slotted back by
    /// index so completion order never leaks into the output.
    fn decode_parallel(&self) -> Vec<Result<Vec<Bookmark>, SourceError>> {
        let (tx, rx) = crossbeam_channel::bounded(self.sources.len());
        std::thread::scope(|scope| {
            for (idx, source) in self.sources.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    let _ = tx.send((idx, source.decoder.decode(&source.path)));
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<Result<Vec<Bookmark>, SourceError>>> =
            (0..self.sources.len()).map(|_| None).collect();
        for (idx, result) in rx {
            slots[idx] = Some(result);
        }
        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(SourceError::Io(io::Error::other("decoder reported no result")))
                })
            })
            .collect()
    }
}
