use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Browser a bookmark was read from.
///
/// The derived ordering follows the lowercase names, which is the order sources
/// are decoded and merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceName {
    Chrome,
    Firefox,
    Safari,
}

impl SourceName {
    pub const ALL: [SourceName; 3] = [SourceName::Chrome, SourceName::Firefox, SourceName::Safari];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Chrome => "chrome",
            SourceName::Firefox => "firefox",
            SourceName::Safari => "safari",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub source: SourceName,
    pub folder: String,
    pub title: String,
    pub domain: String,
    pub uri: String,
}

impl Bookmark {
    /// Build a bookmark when `uri` parses and carries a host, `None` otherwise.
    pub fn from_parts(source: SourceName, folder: &str, title: &str, uri: &str) -> Option<Self> {
        let domain = url_domain(uri)?;
        Some(Self {
            source,
            folder: folder.to_string(),
            title: title.to_string(),
            domain,
            uri: uri.to_string(),
        })
    }
}

/// Host of `uri` (with an explicit port), or `None` for unparseable or hostless URLs.
pub fn url_domain(uri: &str) -> Option<String> {
    let parsed = Url::parse(uri).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Append a folder name to a slash-delimited path rooted at `/`.
///
/// Empty names leave the path unchanged.
pub fn join_folder(parent: &str, name: &str) -> String {
    if name.is_empty() {
        return parent.to_string();
    }
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Keep the first bookmark for each URI.
pub fn uniq_by_uri(bookmarks: Vec<Bookmark>) -> Vec<Bookmark> {
    let mut seen = HashSet::new();
    bookmarks
        .into_iter()
        .filter(|b| seen.insert(b.uri.clone()))
        .collect()
}

/// Keep bookmarks whose folder starts with `prefix`, see [`has_folder_prefix`].
pub fn filter_by_folder_prefix(bookmarks: Vec<Bookmark>, prefix: &str) -> Vec<Bookmark> {
    if prefix.is_empty() {
        return bookmarks;
    }
    bookmarks
        .into_iter()
        .filter(|b| has_folder_prefix(&b.folder, prefix))
        .collect()
}

/// Case-insensitive, whitespace-insensitive folder prefix test.
///
/// The prefix is anchored at `/`, and `folder + "/"` is also tried so a prefix
/// naming a whole folder matches that folder.
pub fn has_folder_prefix(folder: &str, prefix: &str) -> bool {
    let folder = normalize_folder(folder);
    let mut prefix = normalize_folder(prefix);
    if !prefix.starts_with('/') {
        prefix.insert(0, '/');
    }
    folder.starts_with(&prefix) || format!("{folder}/").starts_with(&prefix)
}

fn normalize_folder(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
