//! Firefox bookmark backups.
//!
//! Firefox keeps daily `bookmarkbackups/*.jsonlz4` snapshots of its places
//! tree inside each profile. Each is a mozLz4 container around one JSON tree.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::bookmark::{Bookmark, SourceName};
use crate::container::{self, ContainerLimits};
use crate::sources::{
    BookmarkSource, NodeKind, SourceError, TreeNode, drop_children, fold_tree, nullable,
    parse_json_tree, profile_dir, read_file,
};

const TYPE_PLACE: u8 = 1;
const TYPE_CONTAINER: u8 = 2;
const MIME_PLACE: &str = "text/x-moz-place";
const MIME_CONTAINER: &str = "text/x-moz-place-container";

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FirefoxEntry {
    #[serde(default, deserialize_with = "nullable")]
    title: String,
    #[serde(default)]
    type_code: u8,
    #[serde(default, rename = "type", deserialize_with = "nullable")]
    mime_type: String,
    #[serde(default, deserialize_with = "nullable")]
    uri: String,
    #[serde(default, deserialize_with = "nullable")]
    children: Vec<FirefoxEntry>,
}

impl FirefoxEntry {
    fn is_container(&self) -> bool {
        self.type_code == TYPE_CONTAINER || (self.type_code == 0 && self.mime_type == MIME_CONTAINER)
    }

    fn is_place(&self) -> bool {
        self.type_code == TYPE_PLACE || (self.type_code == 0 && self.mime_type == MIME_PLACE)
    }
}

impl Drop for FirefoxEntry {
    fn drop(&mut self) {
        drop_children(&mut self.children, |entry| std::mem::take(&mut entry.children));
    }
}

impl TreeNode for FirefoxEntry {
    fn kind(&self) -> NodeKind<'_, Self> {
        if self.is_container() {
            NodeKind::Folder {
                name: &self.title,
                children: &self.children,
            }
        } else if self.is_place() {
            NodeKind::Leaf {
                title: &self.title,
                url: &self.uri,
            }
        } else {
            NodeKind::Skip
        }
    }
}

#[derive(Debug, Default)]
pub struct FirefoxSource {
    limits: ContainerLimits,
}

impl FirefoxSource {
    pub fn with_limits(limits: ContainerLimits) -> Self {
        Self { limits }
    }
}

impl BookmarkSource for FirefoxSource {
    fn name(&self) -> SourceName {
        SourceName::Firefox
    }

    fn decode(&self, path: &Path) -> Result<Vec<Bookmark>, SourceError> {
        let raw = read_file(path)?;
        let json = container::decode_with_limits(raw.as_slice(), self.limits)?;
        let root: FirefoxEntry = parse_json_tree(&json)?;
        let bookmarks = fold_tree(SourceName::Firefox, &root);
        debug!("firefox: {} bookmarks from {}", bookmarks.len(), path.display());
        Ok(bookmarks)
    }

    fn locate(&self, profile_path: &Path, profile_name: &str) -> Result<PathBuf, SourceError> {
        let backups = profile_dir(profile_path, profile_name)?.join("bookmarkbackups");
        crate::util::latest_file(&backups).map_err(|e| SourceError::from_io(&backups, e))
    }
}
