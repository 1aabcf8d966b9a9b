use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::bookmark::SourceName;
use crate::engine::EngineBuilder;
use crate::sources::decoder_for;
use crate::util::expand_home;

pub const CONFIG_FILE_NAME: &str = ".marksift.yml";

const DEFAULT_PROFILE_NAME: &str = "default";
const FIREFOX_PROFILE_PATH: &str = "~/Library/Application Support/Firefox/Profiles";
const CHROME_PROFILE_PATH: &str = "~/Library/Application Support/Google/Chrome";
const SAFARI_LIBRARY_PATH: &str = "~/Library/Safari";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FirefoxConfig {
    pub enable: bool,
    pub profile_name: String,
    pub profile_path: String,
}

impl Default for FirefoxConfig {
    fn default() -> Self {
        Self {
            enable: false,
            profile_name: DEFAULT_PROFILE_NAME.to_string(),
            profile_path: FIREFOX_PROFILE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChromeConfig {
    pub enable: bool,
    pub profile_name: String,
    pub profile_path: String,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            enable: false,
            profile_name: DEFAULT_PROFILE_NAME.to_string(),
            profile_path: CHROME_PROFILE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SafariConfig {
    pub enable: bool,
    pub profile_path: String,
}

impl Default for SafariConfig {
    fn default() -> Self {
        Self {
            enable: false,
            profile_path: SAFARI_LIBRARY_PATH.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub firefox: FirefoxConfig,
    pub chrome: ChromeConfig,
    pub safari: SafariConfig,
    pub remove_duplicates: bool,
    /// `0` means 24 hours, negative disables caching.
    pub cache_age_hours: i64,
    /// Empty means the system temp directory.
    pub cache_dir: String,
}

impl Config {
    pub fn enabled_sources(&self) -> Vec<SourceName> {
        SourceName::ALL
            .into_iter()
            .filter(|name| self.is_enabled(*name))
            .collect()
    }

    pub fn cache_dir(&self) -> PathBuf {
        if self.cache_dir.trim().is_empty() {
            std::env::temp_dir()
        } else {
            expand_home(&self.cache_dir)
        }
    }

    /// Engine builder with every enabled source and the dedup setting.
    /// Cache and folder filter are left to the caller.
    pub fn engine_builder(&self) -> EngineBuilder {
        let mut builder = EngineBuilder::new().remove_duplicates(self.remove_duplicates);
        if self.firefox.enable {
            builder = builder.firefox(
                expand_home(&self.firefox.profile_path),
                &self.firefox.profile_name,
            );
        }
        if self.chrome.enable {
            builder = builder.chrome(
                expand_home(&self.chrome.profile_path),
                &self.chrome.profile_name,
            );
        }
        if self.safari.enable {
            builder = builder.safari(expand_home(&self.safari.profile_path));
        }
        builder
    }

    fn is_enabled(&self, name: SourceName) -> bool {
        match name {
            SourceName::Chrome => self.chrome.enable,
            SourceName::Firefox => self.firefox.enable,
            SourceName::Safari => self.safari.enable,
        }
    }

    fn disable(&mut self, name: SourceName) {
        match name {
            SourceName::Chrome => self.chrome.enable = false,
            SourceName::Firefox => self.firefox.enable = false,
            SourceName::Safari => self.safari.enable = false,
        }
    }

    fn profile(&self, name: SourceName) -> (PathBuf, &str) {
        match name {
            SourceName::Chrome => (expand_home(&self.chrome.profile_path), &self.chrome.profile_name),
            SourceName::Firefox => (expand_home(&self.firefox.profile_path), &self.firefox.profile_name),
            SourceName::Safari => (expand_home(&self.safari.profile_path), ""),
        }
    }

    /// Keep only the enabled sources whose bookmark files can be located.
    fn retain_available(mut self) -> Result<Self> {
        for name in self.enabled_sources() {
            let (path, profile) = self.profile(name);
            match decoder_for(name).locate(&path, profile) {
                Ok(found) => debug!("{name} available at {}", found.display()),
                Err(err) => {
                    info!("{name} unavailable: {err}");
                    self.disable(name);
                }
            }
        }
        if self.enabled_sources().is_empty() {
            bail!("found no available bookmarks on this computer");
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
    /// File the configuration was read from, `None` for the built-in defaults.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Cache file name for this configuration and folder filter.
    pub fn cache_key(&self, folder_prefix: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.config_hash.as_bytes());
        hasher.update([0u8]);
        hasher.update(folder_prefix.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("marksift-{}.cache", &digest[..16])
    }
}

/// Load `path`, else the first `.marksift.yml` on the search path, else the
/// built-in defaults restricted to the browsers found on this machine.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(p) = path {
        return load_file(p);
    }
    if let Some(found) = find_config_file(&search_dirs()) {
        return load_file(&found);
    }
    info!("no {CONFIG_FILE_NAME} found, probing default browser locations");
    load_defaults()
}

/// First directory in `dirs` holding a config file.
pub fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn search_dirs() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config"));
        candidates.push(home);
    }
    candidates
}

fn load_file(path: &Path) -> Result<LoadedConfig> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = serde_yaml::from_slice(&bytes)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!("loaded config from {}", path.display());
    Ok(LoadedConfig {
        config,
        config_hash: hash_bytes(&bytes),
        path: Some(path.to_path_buf()),
    })
}

fn load_defaults() -> Result<LoadedConfig> {
    let bytes = include_bytes!("../config/default.yml");
    let config: Config = serde_yaml::from_slice(bytes)?;
    let config = config.retain_available()?;
    let effective = serde_yaml::to_string(&config)?;
    Ok(LoadedConfig {
        config,
        config_hash: hash_bytes(effective.as_bytes()),
        path: None,
    })
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn embedded_defaults_parse() {
        let config: Config =
            serde_yaml::from_slice(include_bytes!("../config/default.yml")).expect("yaml");
        assert_eq!(config.enabled_sources(), SourceName::ALL.to_vec());
        assert!(config.remove_duplicates);
        assert_eq!(config.cache_age_hours, 0);
        assert_eq!(config.firefox.profile_path, FIREFOX_PROFILE_PATH);
        assert_eq!(config.chrome.profile_name, DEFAULT_PROFILE_NAME);
        assert_eq!(config.safari.profile_path, SAFARI_LIBRARY_PATH);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let yaml = "chrome:\n  enable: true\ncache_age_hours: -1\n";
        let config: Config = serde_yaml::from_str(yaml).expect("yaml");
        assert_eq!(config.enabled_sources(), vec![SourceName::Chrome]);
        assert_eq!(config.chrome.profile_name, DEFAULT_PROFILE_NAME);
        assert_eq!(config.chrome.profile_path, CHROME_PROFILE_PATH);
        assert!(!config.remove_duplicates);
        assert_eq!(config.cache_age_hours, -1);
    }

    #[test]
    fn empty_cache_dir_means_temp_dir() {
        let mut config = Config::default();
        assert_eq!(config.cache_dir(), std::env::temp_dir());
        config.cache_dir = "/var/cache/marksift".to_string();
        assert_eq!(config.cache_dir(), PathBuf::from("/var/cache/marksift"));
    }

    #[test]
    fn search_stops_at_first_directory_with_a_config() {
        let first = tempdir().expect("tempdir");
        let second = tempdir().expect("tempdir");
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(find_config_file(&dirs), None);

        std::fs::write(second.path().join(CONFIG_FILE_NAME), "{}").expect("write");
        assert_eq!(find_config_file(&dirs), Some(second.path().join(CONFIG_FILE_NAME)));

        std::fs::write(first.path().join(CONFIG_FILE_NAME), "{}").expect("write");
        assert_eq!(find_config_file(&dirs), Some(first.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn explicit_file_is_hashed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("custom.yml");
        std::fs::write(&path, "safari:\n  enable: true\n  profile_path: /tmp/safari\n").expect("write");

        let loaded = load_config(Some(&path)).expect("load");
        assert_eq!(loaded.config.enabled_sources(), vec![SourceName::Safari]);
        assert_eq!(loaded.config.safari.profile_path, "/tmp/safari");
        assert_eq!(loaded.config_hash.len(), 64);
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));

        let again = load_config(Some(&path)).expect("load");
        assert_eq!(loaded.config_hash, again.config_hash);
    }

    #[test]
    fn missing_or_invalid_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(load_config(Some(&dir.path().join("absent.yml"))).is_err());

        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "firefox: [1, 2").expect("write");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn cache_key_depends_on_config_and_folder() {
        let loaded = LoadedConfig {
            config: Config::default(),
            config_hash: hash_bytes(b"a"),
            path: None,
        };
        let other = LoadedConfig {
            config_hash: hash_bytes(b"b"),
            ..loaded.clone()
        };
        assert_eq!(loaded.cache_key(""), loaded.cache_key(""));
        assert_ne!(loaded.cache_key(""), loaded.cache_key("work"));
        assert_ne!(loaded.cache_key(""), other.cache_key(""));
        assert!(loaded.cache_key("").ends_with(".cache"));
    }

    #[test]
    fn unavailable_sources_are_disabled() {
        let dir = tempdir().expect("tempdir");
        let chrome_root = dir.path().join("chrome");
        std::fs::create_dir_all(chrome_root.join("Default")).expect("mkdir");
        std::fs::write(chrome_root.join("Default").join("Bookmarks"), "{}").expect("write");

        let mut config = Config::default();
        config.firefox.enable = true;
        config.firefox.profile_path = dir.path().join("firefox").display().to_string();
        config.chrome.enable = true;
        config.chrome.profile_path = chrome_root.display().to_string();
        config.safari.enable = true;
        config.safari.profile_path = dir.path().join("safari").display().to_string();

        let config = config.retain_available().expect("available");
        assert_eq!(config.enabled_sources(), vec![SourceName::Chrome]);
    }

    #[test]
    fn no_available_source_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let mut config = Config::default();
        config.safari.enable = true;
        config.safari.profile_path = dir.path().display().to_string();
        assert!(config.retain_available().is_err());
    }
}
