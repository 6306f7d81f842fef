//! Prompt record model and load-time normalization
//!
//! `PromptRecord` is the fully-populated in-memory shape. Anything read from
//! storage arrives as a `StoredPromptRecord` (every field optional) and is
//! normalized on the way in; new records go through [`normalize_record`].
//! The rest of the crate never has to guess at defaults.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::metadata::{normalize_tags, sanitize_tags};

/// Maximum number of `history` snapshots kept per record
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Suffix appended to the title of a duplicated prompt
pub const COPY_SUFFIX: &str = " (Copy)";

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Fresh record identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A prior version of a prompt's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub text:      String,
    pub edited_at: i64,
}

/// One saved prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub id:                    String,
    pub title:                 String,
    pub text:                  String,
    pub tags:                  Vec<String>,
    pub created_at:            i64,
    pub is_favorite:           bool,
    pub use_count:             u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_copied_at:        Option<i64>,
    pub is_generating_details: bool,
    pub history:               Vec<HistoryEntry>,
    pub custom_title:          bool,
}

impl PromptRecord {
    /// New record with a fresh id and zeroed counters
    pub fn new(text: impl Into<String>, title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            text: text.into(),
            tags: Vec::new(),
            created_at,
            is_favorite: false,
            use_count: 0,
            last_copied_at: None,
            is_generating_details: false,
            history: Vec::new(),
            custom_title: false,
        }
    }

    /// Title to show, substituting `untitled` for an empty title
    pub fn display_title<'a>(&'a self, untitled: &'a str) -> &'a str {
        if self.title.is_empty() {
            untitled
        } else {
            &self.title
        }
    }

    /// Exact (case-sensitive) tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Record the current text as a history snapshot, newest first
    pub fn push_history(&mut self, edited_at: i64, limit: usize) {
        self.history.insert(
            0,
            HistoryEntry {
                text: self.text.clone(),
                edited_at,
            },
        );
        self.history.truncate(limit);
    }

    /// Clone under a new id with usage and history reset
    pub fn duplicate(&self, created_at: i64) -> Self {
        Self {
            id: new_id(),
            title: format!("{}{}", self.title, COPY_SUFFIX),
            text: self.text.clone(),
            tags: self.tags.clone(),
            created_at,
            is_favorite: self.is_favorite,
            use_count: 0,
            last_copied_at: None,
            is_generating_details: false,
            history: Vec::new(),
            custom_title: self.custom_title,
        }
    }
}

/// History entry as found in storage
#[derive(Debug, Clone, Default)]
pub struct StoredHistoryEntry {
    pub text:      Option<String>,
    pub edited_at: Option<i64>,
}

impl StoredHistoryEntry {
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        Some(Self {
            text:      fields.get("text").and_then(lenient_string),
            edited_at: fields.get("editedAt").and_then(lenient_i64),
        })
    }
}

/// Stored history array; `None` when the value is not an array
pub fn stored_history(value: &Value) -> Option<Vec<StoredHistoryEntry>> {
    Some(
        value
            .as_array()?
            .iter()
            .filter_map(StoredHistoryEntry::from_value)
            .collect(),
    )
}

/// Prompt record as found in storage, before normalization
///
/// Written by older versions or by hand, so every field may be missing or
/// carry the wrong JSON type. A badly typed field is read as missing and
/// never costs the rest of the record.
/// `tags` is kept as raw JSON because non-array values were seen in the wild.
#[derive(Debug, Clone, Default)]
pub struct StoredPromptRecord {
    pub id:                    Option<String>,
    pub title:                 Option<String>,
    pub text:                  Option<String>,
    pub tags:                  Option<Value>,
    pub created_at:            Option<i64>,
    pub is_favorite:           Option<bool>,
    pub use_count:             Option<i64>,
    pub last_copied_at:        Option<i64>,
    pub is_generating_details: Option<bool>,
    pub history:               Option<Vec<StoredHistoryEntry>>,
    pub custom_title:          Option<bool>,
}

impl StoredPromptRecord {
    /// Read one stored element; `None` unless it is a JSON object
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        let field = |name: &str| fields.get(name).filter(|v| !v.is_null());

        Some(Self {
            id:                    field("id").and_then(lenient_string),
            title:                 field("title").and_then(lenient_string),
            text:                  field("text").and_then(lenient_string),
            tags:                  field("tags").cloned(),
            created_at:            field("createdAt").and_then(lenient_i64),
            is_favorite:           field("isFavorite").and_then(lenient_bool),
            use_count:             field("useCount").and_then(lenient_i64),
            last_copied_at:        field("lastCopiedAt").and_then(lenient_i64),
            is_generating_details: field("isGeneratingDetails").and_then(lenient_bool),
            history:               field("history").and_then(stored_history),
            custom_title:          field("customTitle").and_then(lenient_bool),
        })
    }

    /// Fill defaults and enforce record invariants
    pub fn normalize(self, history_limit: usize) -> PromptRecord {
        let tags = match self.tags {
            Some(Value::Array(items)) => sanitize_tags(&items),
            _ => Vec::new(),
        };

        let mut history: Vec<HistoryEntry> = self
            .history
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                Some(HistoryEntry {
                    text:      entry.text?,
                    edited_at: entry.edited_at.unwrap_or(0),
                })
            })
            .collect();
        history.truncate(history_limit);

        let use_count = self
            .use_count
            .unwrap_or(0)
            .clamp(0, i64::from(u32::MAX)) as u32;

        PromptRecord {
            id: self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id),
            title: self.title.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            tags,
            created_at: self.created_at.unwrap_or(0),
            is_favorite: self.is_favorite.unwrap_or(false),
            use_count,
            last_copied_at: self.last_copied_at.filter(|ts| *ts > 0),
            is_generating_details: self.is_generating_details.unwrap_or(false),
            history,
            custom_title: self.custom_title.unwrap_or(false),
        }
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers, floats (truncated) and numeric strings
fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| lenient_i64(&Value::from(f))),
        _ => None,
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Read a stored collection, skipping elements that are not objects
pub fn stored_collection(items: &[Value]) -> Vec<StoredPromptRecord> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let stored = StoredPromptRecord::from_value(item);
            if stored.is_none() {
                tracing::warn!(index, "skipping stored prompt that is not an object");
            }
            stored
        })
        .collect()
}

/// Normalize a freshly loaded collection
///
/// Duplicate ids are re-keyed. `isGeneratingDetails` is cleared because no
/// fetch can be outstanding for records that were just read back.
pub fn normalize_collection(
    stored: Vec<StoredPromptRecord>,
    history_limit: usize,
) -> Vec<PromptRecord> {
    let mut seen = HashSet::new();
    stored
        .into_iter()
        .map(|raw| {
            let mut record = raw.normalize(history_limit);
            record.is_generating_details = false;
            while !seen.insert(record.id.clone()) {
                tracing::warn!(id = %record.id, "duplicate prompt id in storage, assigning a new one");
                record.id = new_id();
            }
            record
        })
        .collect()
}

/// Normalize a record built outside storage (create, import)
pub fn normalize_record(mut record: PromptRecord, history_limit: usize) -> PromptRecord {
    record.tags = normalize_tags(record.tags);
    record.history.truncate(history_limit);
    record
}
