//! Recently viewed items
//!
//! A bounded, most-recent-first list with no duplicate identifiers. This is
//! the only piece of client state that is persisted between sessions.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of entries kept when no capacity is configured.
pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// An item that can be recorded in a [`RecentHistory`].
pub trait HistoryItem {
    /// Identifier used for deduplication.
    fn history_id(&self) -> &str;
}

/// What kind of record a [`ViewedItem`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewedKind {
    /// A Pokémon from the REST API.
    Pokemon,
    /// An entry from the headless CMS.
    CmsEntry,
}

/// A record the user looked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedItem {
    /// Upstream identifier (e.g. the Pokémon name or CMS slug).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Record kind.
    pub kind: ViewedKind,
    /// When the item was viewed.
    pub viewed_at: DateTime<Utc>,
    /// Optional thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ViewedItem {
    /// Creates an item viewed now.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ViewedKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            viewed_at: Utc::now(),
            image_url: None,
        }
    }

    /// Sets the thumbnail URL.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Returns a short "time ago" label relative to `now`.
    #[must_use]
    pub fn viewed_ago(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.viewed_at);

        if elapsed.num_seconds() < 60 {
            "just now".to_string()
        } else if elapsed.num_minutes() < 60 {
            format!("{}m ago", elapsed.num_minutes())
        } else if elapsed.num_hours() < 24 {
            format!("{}h ago", elapsed.num_hours())
        } else if elapsed.num_days() < 7 {
            format!("{}d ago", elapsed.num_days())
        } else {
            self.viewed_at.format("%Y-%m-%d").to_string()
        }
    }
}

impl HistoryItem for ViewedItem {
    fn history_id(&self) -> &str {
        &self.id
    }
}

/// Most-recent-first list of items, capped at `max_entries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentHistory<T> {
    /// Entries, newest first.
    entries: VecDeque<T>,
    /// Maximum number of entries to keep.
    #[serde(default = "default_max_entries")]
    max_entries: usize,
}

const fn default_max_entries() -> usize {
    DEFAULT_HISTORY_SIZE
}

impl<T: HistoryItem> Default for RecentHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl<T: HistoryItem> RecentHistory<T> {
    /// Creates an empty history.
    #[must_use]
    pub const fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Records an item at the front.
    ///
    /// An existing entry with the same identifier is removed first; entries
    /// beyond the capacity are dropped from the back.
    pub fn record(&mut self, item: T) {
        self.entries
            .retain(|existing| existing.history_id() != item.history_id());
        self.entries.push_front(item);
        self.entries.truncate(self.max_entries);
    }

    /// Returns all entries (newest first).
    #[must_use]
    pub const fn entries(&self) -> &VecDeque<T> {
        &self.entries
    }

    /// Returns the entry with the given identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.history_id() == id)
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the capacity.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Sets the capacity and drops entries beyond it.
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max;
        self.entries.truncate(max);
    }

    /// Restores the invariants on data read from storage.
    ///
    /// Keeps the first (most recent) occurrence of each identifier and
    /// truncates to the capacity.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.entries
            .retain(|entry| seen.insert(entry.history_id().to_string()));
        self.entries.truncate(self.max_entries);
    }
}
