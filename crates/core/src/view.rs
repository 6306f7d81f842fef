//! Prompt list view: filtering and ordering
//!
//! [`arrange`] is the only entry point. It never touches storage and never
//! mutates a record; it hands back references into the caller's slice in
//! display order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::db::record::PromptRecord;
use crate::errors::{PadError, Result};

/// Record field used for the secondary sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    Title,
    UseCount,
    LastCopiedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Title => "title",
            SortField::UseCount => "useCount",
            SortField::LastCopiedAt => "lastCopiedAt",
        }
    }
}

impl FromStr for SortField {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "title" => Ok(SortField::Title),
            "useCount" => Ok(SortField::UseCount),
            "lastCopiedAt" => Ok(SortField::LastCopiedAt),
            other => Err(PadError::ValidationError(format!(
                "Unknown sort field '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the secondary sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(PadError::ValidationError(format!(
                "Unknown sort order '{}'",
                other
            ))),
        }
    }
}

/// Sort configuration for the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortConfig {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

impl Default for SortConfig {
    /// Newest first
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortOrder::Desc)
    }
}

/// Resolved list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter<'a> {
    Favorites,
    Tag(&'a str),
}

impl<'a> ActiveFilter<'a> {
    /// Interpret a raw filter value against the favorites sentinel
    ///
    /// `None` and the empty string both mean "no filter".
    pub fn resolve(raw: Option<&'a str>, favorites_label: &str) -> Option<Self> {
        match raw {
            None | Some("") => None,
            Some(value) if value == favorites_label => Some(ActiveFilter::Favorites),
            Some(tag) => Some(ActiveFilter::Tag(tag)),
        }
    }

    pub fn matches(&self, record: &PromptRecord) -> bool {
        match self {
            ActiveFilter::Favorites => record.is_favorite,
            ActiveFilter::Tag(tag) => record.has_tag(tag),
        }
    }
}

/// Filter and order records for display
///
/// Favorites always come first; `sort.order` only flips the secondary key.
/// The sort is stable, so ties keep their input order.
pub fn arrange<'a>(
    records: &'a [PromptRecord],
    sort: SortConfig,
    active_filter: Option<&str>,
    untitled_label: &str,
    favorites_label: &str,
) -> Vec<&'a PromptRecord> {
    let filter = ActiveFilter::resolve(active_filter, favorites_label);

    let mut list: Vec<&PromptRecord> = records
        .iter()
        .filter(|record| filter.map_or(true, |f| f.matches(record)))
        .collect();

    let mut titles = TitleOrder::new();
    list.sort_by(|a, b| {
        favorites_first(a, b).then_with(|| {
            let ordering = compare_field(a, b, sort.field, untitled_label, &mut titles);
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        })
    });

    list
}

fn favorites_first(a: &PromptRecord, b: &PromptRecord) -> Ordering {
    b.is_favorite.cmp(&a.is_favorite)
}

/// Ascending comparison on a single field
fn compare_field(
    a: &PromptRecord,
    b: &PromptRecord,
    field: SortField,
    untitled_label: &str,
    titles: &mut TitleOrder,
) -> Ordering {
    match field {
        SortField::Title => titles.compare(
            a.display_title(untitled_label),
            b.display_title(untitled_label),
        ),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UseCount => a.use_count.cmp(&b.use_count),
        SortField::LastCopiedAt => a
            .last_copied_at
            .unwrap_or(0)
            .cmp(&b.last_copied_at.unwrap_or(0)),
    }
}

/// Human-oriented title ordering (Unicode Collation Algorithm, root locale)
///
/// Accents and case are secondary to the base letter, so "Éclair" sorts
/// between "Apple" and "Zebra" and "apple" before "Banana". On a tie
/// lowercase sorts before uppercase.
pub struct TitleOrder {
    collator: Collator,
}

impl TitleOrder {
    pub fn new() -> Self {
        Self {
            collator: Collator::default(),
        }
    }

    pub fn compare(&mut self, a: &str, b: &str) -> Ordering {
        self.collator
            .collate(&a, &b)
            .then_with(|| fold_case(a).cmp(fold_case(b)))
            .then_with(|| a.cmp(b))
    }
}

impl Default for TitleOrder {
    fn default() -> Self {
        Self::new()
    }
}

fn fold_case(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// One-off title comparison; sorting should reuse a [`TitleOrder`]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    TitleOrder::new().compare(a, b)
}
