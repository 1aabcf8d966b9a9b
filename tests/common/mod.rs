//! Shared fixture builders for the integration tests.
//!
//! Each helper lays out browser data the way the browser does on disk, inside
//! a temporary directory, so the engine can discover and decode it.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use plist::{Dictionary, Value as PlistValue};
use serde_json::{Value, json};
use tempfile::TempDir;

use marksift::container;

pub const SHARED_URL: &str = "https://example.com/";

// ============================================================================
// Tree Nodes
// ============================================================================

pub fn firefox_place(title: &str, uri: &str) -> Value {
    json!({"title": title, "typeCode": 1, "type": "text/x-moz-place", "uri": uri})
}

pub fn firefox_folder(title: &str, children: Vec<Value>) -> Value {
    json!({"title": title, "typeCode": 2, "type": "text/x-moz-place-container", "children": children})
}

pub fn chrome_url(name: &str, url: &str) -> Value {
    json!({"name": name, "type": "url", "url": url})
}

pub fn chrome_folder(name: &str, children: Vec<Value>) -> Value {
    json!({"name": name, "type": "folder", "children": children})
}

pub fn safari_leaf(title: &str, url: &str) -> PlistValue {
    let mut uri = Dictionary::new();
    uri.insert("title".into(), PlistValue::String(title.into()));
    let mut dict = Dictionary::new();
    dict.insert("WebBookmarkType".into(), PlistValue::String("WebBookmarkTypeLeaf".into()));
    dict.insert("URLString".into(), PlistValue::String(url.into()));
    dict.insert("URIDictionary".into(), PlistValue::Dictionary(uri));
    PlistValue::Dictionary(dict)
}

pub fn safari_list(title: &str, children: Vec<PlistValue>) -> PlistValue {
    let mut dict = Dictionary::new();
    dict.insert("Title".into(), PlistValue::String(title.into()));
    dict.insert("WebBookmarkType".into(), PlistValue::String("WebBookmarkTypeList".into()));
    dict.insert("Children".into(), PlistValue::Array(children));
    PlistValue::Dictionary(dict)
}

// ============================================================================
// On-disk Layout
// ============================================================================

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Firefox profiles root holding `x1y2.default/bookmarkbackups/<backup>`.
    pub fn firefox_profiles(&self, root: &Value) -> PathBuf {
        self.firefox_profiles_raw(&serde_json::to_vec(root).expect("json"))
    }

    /// Same layout as [`Fixture::firefox_profiles`] from already encoded JSON.
    pub fn firefox_profiles_raw(&self, json: &[u8]) -> PathBuf {
        let profiles = self.dir.path().join("firefox");
        let backups = profiles.join("x1y2.default").join("bookmarkbackups");
        std::fs::create_dir_all(&backups).expect("mkdir");
        std::fs::write(
            backups.join("bookmarks-2024-05-01_3_abc.jsonlz4"),
            container::encode(json).expect("encode"),
        )
        .expect("write backup");
        profiles
    }

    /// Chrome user data dir holding `Default/Bookmarks`.
    pub fn chrome_profiles(&self, bookmark_bar: Value) -> PathBuf {
        let doc = json!({
            "roots": {
                "bookmark_bar": bookmark_bar,
                "other": chrome_folder("Other bookmarks", vec![chrome_url("Hidden", "https://other.example/")]),
                "synced": chrome_folder("Mobile bookmarks", vec![]),
            },
            "version": 1
        });
        self.chrome_profiles_raw(&serde_json::to_vec(&doc).expect("json"))
    }

    /// Same layout as [`Fixture::chrome_profiles`] from a whole `Bookmarks` document.
    pub fn chrome_profiles_raw(&self, doc: &[u8]) -> PathBuf {
        let profiles = self.dir.path().join("chrome");
        let profile = profiles.join("Default");
        std::fs::create_dir_all(&profile).expect("mkdir");
        std::fs::write(profile.join("Bookmarks"), doc).expect("write bookmarks");
        profiles
    }

    /// Safari library dir holding a binary `Bookmarks.plist`.
    pub fn safari_library(&self, root: PlistValue) -> PathBuf {
        let library = self.dir.path().join("safari");
        std::fs::create_dir_all(&library).expect("mkdir");
        root.to_file_binary(library.join("Bookmarks.plist"))
            .expect("write plist");
        library
    }

    pub fn cache_dir(&self) -> PathBuf {
        let dir = self.dir.path().join("cache");
        std::fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// JSON text of `depth` nested folders around one leaf, built as a string so
/// the fixture itself never recurses. `folder` and `leaf` are the opening
/// text of a folder node (up to its children array) and a complete leaf.
pub fn nested_json(depth: usize, folder: &str, leaf: &str) -> String {
    let mut out = String::with_capacity(depth * (folder.len() + 2) + leaf.len());
    for _ in 0..depth {
        out.push_str(folder);
    }
    out.push_str(leaf);
    for _ in 0..depth {
        out.push_str("]}");
    }
    out
}

/// Paths of the three standard sources.
pub struct Browsers {
    pub firefox: PathBuf,
    pub chrome: PathBuf,
    pub safari: PathBuf,
}

/// Every browser bookmarks [`SHARED_URL`]; Chrome and Firefox each add one
/// URL of their own.
pub fn standard_browsers(fixture: &Fixture) -> Browsers {
    let firefox = fixture.firefox_profiles(&firefox_folder(
        "",
        vec![firefox_folder(
            "Bookmarks Menu",
            vec![
                firefox_place("Example (firefox)", SHARED_URL),
                firefox_place("Rust", "https://www.rust-lang.org/"),
            ],
        )],
    ));
    let chrome = fixture.chrome_profiles(chrome_folder(
        "Bookmarks bar",
        vec![
            chrome_url("Example (chrome)", SHARED_URL),
            chrome_folder("Work Stuff", vec![chrome_url("GitHub", "https://github.com/")]),
        ],
    ));
    let safari = fixture.safari_library(safari_list(
        "",
        vec![safari_list(
            "BookmarksBar",
            vec![safari_leaf("Example (safari)", SHARED_URL)],
        )],
    ));
    Browsers {
        firefox,
        chrome,
        safari,
    }
}
