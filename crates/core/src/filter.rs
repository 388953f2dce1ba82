//! Text and status predicates applied over whatever the store holds.
//!
//! Searching is case- and accent-insensitive: both sides are lower-cased,
//! decomposed, and stripped of combining marks before a substring test.
//! Filtering never reorders.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::{Category, CategoryWithCounts, Flashcard};

//
// ─── FILTER VALUES ─────────────────────────────────────────────────────────────
//

/// A filter dimension: true-only, false-only, or unrestricted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    #[serde(rename = "true")]
    Yes,
    #[serde(rename = "false")]
    No,
    #[default]
    #[serde(rename = "both")]
    Either,
}

impl TriState {
    /// Returns true if an entity with `value` passes this dimension.
    #[must_use]
    pub fn admits(self, value: bool) -> bool {
        match self {
            TriState::Yes => value,
            TriState::No => !value,
            TriState::Either => true,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriState::Yes => "true",
            TriState::No => "false",
            TriState::Either => "both",
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTriStateError(String);

impl fmt::Display for ParseTriStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected true, false or both, got {:?}", self.0)
    }
}

impl std::error::Error for ParseTriStateError {}

impl FromStr for TriState {
    type Err = ParseTriStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(TriState::Yes),
            "false" => Ok(TriState::No),
            "both" => Ok(TriState::Either),
            _ => Err(ParseTriStateError(s.to_owned())),
        }
    }
}

/// Status filters of the category page. Default lets everything through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub is_known: TriState,
    pub is_bookmarked: TriState,
}

//
// ─── SEARCHABLE ────────────────────────────────────────────────────────────────
//

/// Entities the filter evaluator can test.
pub trait Searchable {
    /// Raw fields the free-text query is matched against.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Status dimension. Entities without review flags always pass.
    fn passes_status(&self, _filters: &Filters) -> bool {
        true
    }
}

impl Searchable for Flashcard {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.id().to_string()),
            Cow::Borrowed(self.question()),
            Cow::Borrowed(self.answer()),
        ]
    }

    fn passes_status(&self, filters: &Filters) -> bool {
        filters.is_known.admits(self.is_known()) && filters.is_bookmarked.admits(self.is_bookmarked())
    }
}

impl Searchable for Category {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name())]
    }
}

impl Searchable for CategoryWithCounts {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        self.category().search_fields()
    }
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// Lower-cases `text` and strips diacritics.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// A search string normalized once, reused across a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    normalized: String,
}

impl SearchQuery {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            normalized: normalize(text),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub fn matches_text<T: Searchable + ?Sized>(&self, entity: &T) -> bool {
        if self.is_empty() {
            return true;
        }
        entity
            .search_fields()
            .iter()
            .any(|field| normalize(field).contains(self.normalized.as_str()))
    }

    #[must_use]
    pub fn matches<T: Searchable + ?Sized>(&self, entity: &T, filters: &Filters) -> bool {
        self.matches_text(entity) && entity.passes_status(filters)
    }
}

/// Returns true iff `entity` passes the text query and every status filter.
#[must_use]
pub fn matches<T: Searchable + ?Sized>(entity: &T, search_text: &str, filters: &Filters) -> bool {
    SearchQuery::new(search_text).matches(entity, filters)
}

/// The visible subset of `items`, in their original order.
pub fn filter_visible<'a, T, I>(items: I, search_text: &str, filters: &Filters) -> Vec<&'a T>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let query = SearchQuery::new(search_text);
    items
        .into_iter()
        .filter(|item| query.matches(*item, filters))
        .collect()
}
