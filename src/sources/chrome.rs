use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::bookmark::{Bookmark, SourceName};
use crate::sources::{
    BookmarkSource, NodeKind, SourceError, TreeNode, drop_children, existing_file, fold_tree,
    nullable, parse_json_tree, profile_dir, read_file,
};

const BOOKMARKS_FILE: &str = "Bookmarks";

#[derive(Debug, Deserialize)]
struct ChromeFile {
    roots: ChromeRoots,
}

/// `other` and `synced` roots are ignored.
#[derive(Debug, Deserialize)]
struct ChromeRoots {
    bookmark_bar: ChromeEntry,
}

#[derive(Debug, Deserialize, Default)]
struct ChromeEntry {
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, rename = "type", deserialize_with = "nullable")]
    entry_type: String,
    #[serde(default, deserialize_with = "nullable")]
    url: String,
    #[serde(default, deserialize_with = "nullable")]
    children: Vec<ChromeEntry>,
}

impl Drop for ChromeEntry {
    fn drop(&mut self) {
        drop_children(&mut self.children, |entry| std::mem::take(&mut entry.children));
    }
}

impl TreeNode for ChromeEntry {
    fn kind(&self) -> NodeKind<'_, Self> {
        match self.entry_type.as_str() {
            "folder" => NodeKind::Folder {
                name: &self.name,
                children: &self.children,
            },
            "url" => NodeKind::Leaf {
                title: &self.name,
                url: &self.url,
            },
            _ => NodeKind::Skip,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChromeSource;

impl BookmarkSource for ChromeSource {
    fn name(&self) -> SourceName {
        SourceName::Chrome
    }

    fn decode(&self, path: &Path) -> Result<Vec<Bookmark>, SourceError> {
        let raw = read_file(path)?;
        let file: ChromeFile = parse_json_tree(&raw)?;
        let bookmarks = fold_tree(SourceName::Chrome, &file.roots.bookmark_bar);
        debug!("chrome: {} bookmarks from {}", bookmarks.len(), path.display());
        Ok(bookmarks)
    }

    fn locate(&self, profile_path: &Path, profile_name: &str) -> Result<PathBuf, SourceError> {
        existing_file(profile_dir(profile_path, profile_name)?.join(BOOKMARKS_FILE))
    }
}
