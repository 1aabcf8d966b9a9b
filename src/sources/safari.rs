//! Safari `Bookmarks.plist` (binary or XML property list).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::bookmark::{Bookmark, SourceName};
use crate::sources::{
    BookmarkSource, NodeKind, SourceError, TreeNode, drop_children, existing_file, fold_tree,
};

const BOOKMARKS_FILE: &str = "Bookmarks.plist";
const TYPE_LIST: &str = "WebBookmarkTypeList";
const TYPE_LEAF: &str = "WebBookmarkTypeLeaf";
pub const UNTITLED: &str = "undefined";

#[derive(Debug, Deserialize, Default)]
struct SafariEntry {
    #[serde(default, rename = "Title")]
    title: String,
    #[serde(default, rename = "WebBookmarkType")]
    bookmark_type: String,
    #[serde(default, rename = "URLString")]
    url: String,
    #[serde(default, rename = "URIDictionary")]
    uri_dictionary: BTreeMap<String, plist::Value>,
    #[serde(default, rename = "Children")]
    children: Vec<SafariEntry>,
}

impl Drop for SafariEntry {
    fn drop(&mut self) {
        drop_children(&mut self.children, |entry| std::mem::take(&mut entry.children));
    }
}

impl TreeNode for SafariEntry {
    fn kind(&self) -> NodeKind<'_, Self> {
        match self.bookmark_type.as_str() {
            TYPE_LIST => NodeKind::Folder {
                name: &self.title,
                children: &self.children,
            },
            TYPE_LEAF => NodeKind::Leaf {
                title: self
                    .uri_dictionary
                    .get("title")
                    .and_then(plist::Value::as_string)
                    .unwrap_or(UNTITLED),
                url: &self.url,
            },
            _ => NodeKind::Skip,
        }
    }
}

#[derive(Debug, Default)]
pub struct SafariSource;

impl BookmarkSource for SafariSource {
    fn name(&self) -> SourceName {
        SourceName::Safari
    }

    fn decode(&self, path: &Path) -> Result<Vec<Bookmark>, SourceError> {
        let raw = super::read_file(path)?;
        let root: SafariEntry = plist::from_bytes(&raw)?;
        let bookmarks = fold_tree(SourceName::Safari, &root);
        debug!("safari: {} bookmarks from {}", bookmarks.len(), path.display());
        Ok(bookmarks)
    }

    /// Safari has a single profile; `profile_path` is its library directory
    /// (usually `~/Library/Safari`) and the name is not consulted.
    fn locate(&self, profile_path: &Path, _profile_name: &str) -> Result<PathBuf, SourceError> {
        existing_file(profile_path.join(BOOKMARKS_FILE))
    }
}
