//! Free-text ranking of bookmark titles.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::bookmark::Bookmark;

pub trait FuzzyFilter {
    /// Bookmarks whose title matches `query`, best match first.
    fn filter(&self, query: &str, bookmarks: &[Bookmark]) -> Vec<Bookmark>;
}

/// Skim v2 subsequence scoring, case-insensitive.
pub struct SkimFilter {
    matcher: SkimMatcherV2,
}

impl Default for SkimFilter {
    fn default() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }
}

impl FuzzyFilter for SkimFilter {
    fn filter(&self, query: &str, bookmarks: &[Bookmark]) -> Vec<Bookmark> {
        let query = query.trim();
        if query.is_empty() {
            return bookmarks.to_vec();
        }

        let mut scored: Vec<(i64, &Bookmark)> = bookmarks
            .iter()
            .filter_map(|b| self.matcher.fuzzy_match(&b.title, query).map(|s| (s, b)))
            .collect();
        // sort_by is stable, equal scores keep input order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, b)| b.clone()).collect()
    }
}
