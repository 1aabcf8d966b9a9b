pub mod chrome;
pub mod firefox;
pub mod safari;

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::trace;

use crate::bookmark::{Bookmark, SourceName, join_folder};
use crate::container::ContainerError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid plist: {0}")]
    Plist(#[from] plist::Error),
}

impl SourceError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound(format!("{}: {err}", path.display()))
        } else {
            SourceError::Io(err)
        }
    }
}

/// One browser's bookmark storage format.
pub trait BookmarkSource: Send + Sync {
    fn name(&self) -> SourceName;

    /// Read the bookmark file at `path` into flat bookmarks, in tree order.
    fn decode(&self, path: &Path) -> Result<Vec<Bookmark>, SourceError>;

    /// Locate the default bookmark file under `profile_path` for the profile
    /// directory whose name ends with `profile_name`.
    fn locate(&self, profile_path: &Path, profile_name: &str) -> Result<PathBuf, SourceError>;
}

pub fn decoder_for(name: SourceName) -> Box<dyn BookmarkSource> {
    match name {
        SourceName::Chrome => Box::new(chrome::ChromeSource),
        SourceName::Firefox => Box::new(firefox::FirefoxSource::default()),
        SourceName::Safari => Box::new(safari::SafariSource),
    }
}

/// Shape every decoder's raw tree node is viewed through while folding.
pub(crate) enum NodeKind<'a, N> {
    Folder { name: &'a str, children: &'a [N] },
    Leaf { title: &'a str, url: &'a str },
    Skip,
}

pub(crate) trait TreeNode: Sized {
    fn kind(&self) -> NodeKind<'_, Self>;
}

/// Flatten a bookmark tree depth-first, in document order.
///
/// Uses an explicit stack so arbitrarily deep trees cannot exhaust the
/// native stack. Folders without children emit nothing; leaves whose URL
/// has no host are dropped.
pub(crate) fn fold_tree<N: TreeNode>(source: SourceName, root: &N) -> Vec<Bookmark> {
    let mut out = Vec::new();
    let mut stack: Vec<(&N, String)> = vec![(root, "/".to_string())];

    while let Some((node, folder)) = stack.pop() {
        match node.kind() {
            NodeKind::Folder { name, children } => {
                if children.is_empty() {
                    continue;
                }
                let path = join_folder(&folder, name);
                for child in children.iter().rev() {
                    stack.push((child, path.clone()));
                }
            }
            NodeKind::Leaf { title, url } => match Bookmark::from_parts(source, &folder, title, url) {
                Some(bookmark) => out.push(bookmark),
                None => trace!("{source}: skipping bookmark with invalid url {url:?}"),
            },
            NodeKind::Skip => {}
        }
    }

    out
}

/// Parse a JSON bookmark tree of any nesting depth.
///
/// serde_json's recursion limit is lifted and the parser grows its stack on
/// demand, so deep folder chains neither fail nor overflow a worker thread.
pub(crate) fn parse_json_tree<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_slice(bytes);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Drop a child list without recursing into nested folders.
pub(crate) fn drop_children<N>(children: &mut Vec<N>, take: fn(&mut N) -> Vec<N>) {
    let mut pending = std::mem::take(children);
    while let Some(mut node) = pending.pop() {
        pending.extend(take(&mut node));
    }
}

/// Deserialize `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn read_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    std::fs::read(path).map_err(|e| SourceError::from_io(path, e))
}

fn profile_dir(profile_path: &Path, profile_name: &str) -> Result<PathBuf, SourceError> {
    let name = crate::util::search_suffix_dir(profile_path, profile_name)
        .map_err(|e| SourceError::from_io(profile_path, e))?;
    Ok(profile_path.join(name))
}

fn existing_file(path: PathBuf) -> Result<PathBuf, SourceError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(SourceError::NotFound(path.display().to_string()))
    }
}
