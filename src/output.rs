//! Launcher script-filter items (`{"items": [...]}`) printed on stdout.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::bookmark::Bookmark;

pub const EMPTY_TITLE: &str = "No matching";
const NEXT_ACTION: &str = "open";

#[derive(Debug, Serialize, PartialEq)]
pub struct Icon {
    pub path: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Item {
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl Item {
    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert("nextAction".to_string(), NEXT_ACTION.to_string());
        Self {
            title: bookmark.title.clone(),
            subtitle: format!("[{}] {}", bookmark.folder, bookmark.domain),
            arg: Some(bookmark.uri.clone()),
            autocomplete: Some(bookmark.title.clone()),
            valid: true,
            icon: Some(Icon {
                path: format!("{}.png", bookmark.source),
            }),
            variables,
        }
    }

    fn no_match() -> Self {
        Self {
            title: EMPTY_TITLE.to_string(),
            subtitle: String::new(),
            arg: None,
            autocomplete: None,
            valid: false,
            icon: None,
            variables: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ItemList {
    pub items: Vec<Item>,
}

/// At most `max_results` items, or a single invalid placeholder when empty.
pub fn render(bookmarks: &[Bookmark], max_results: usize) -> ItemList {
    let items: Vec<Item> = bookmarks
        .iter()
        .take(max_results)
        .map(Item::from_bookmark)
        .collect();
    if items.is_empty() {
        return ItemList {
            items: vec![Item::no_match()],
        };
    }
    ItemList { items }
}

pub fn write_items<W: Write>(mut writer: W, items: &ItemList) -> std::io::Result<()> {
    serde_json::to_writer(&mut writer, items)?;
    writeln!(writer)
}
