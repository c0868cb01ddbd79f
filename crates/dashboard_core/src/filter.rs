//! Status/search predicate applied to the in-memory lists.
//!
//! The predicate is pure: the caller supplies `now`, so "recent" is measured
//! against the wall clock at filter time rather than at fetch time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{Conversation, ConversationStatus, Plugin};

/// Width of the "recent" window, in seconds.
pub const RECENT_WINDOW_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
    Recent,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Inactive,
        StatusFilter::Recent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
            StatusFilter::Recent => "recent",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown status filter '{wanted}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Active,
    Inactive,
}

impl From<ConversationStatus> for Activity {
    fn from(status: ConversationStatus) -> Self {
        match status {
            ConversationStatus::Active => Activity::Active,
            ConversationStatus::Inactive => Activity::Inactive,
        }
    }
}

/// Anything a page lists and filters.
pub trait Filterable {
    fn activity(&self) -> Activity;

    fn last_activity(&self) -> Option<DateTime<Utc>>;

    /// Visible textual fields searched by the free-text box.
    fn search_fields(&self) -> Vec<&str>;
}

/// A conversation paired with its resolved status from the state map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    pub conversation: Conversation,
    pub status: ConversationStatus,
}

impl Filterable for ConversationRow {
    fn activity(&self) -> Activity {
        self.status.into()
    }

    fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.conversation.last_activity
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.conversation.project_name.as_str(),
            self.conversation.last_message.as_str(),
            self.conversation.id.as_str(),
        ]
    }
}

impl Filterable for Plugin {
    fn activity(&self) -> Activity {
        if self.is_enabled() {
            Activity::Active
        } else {
            Activity::Inactive
        }
    }

    // Plugins carry no activity timestamp, so "recent" never matches them.
    fn last_activity(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.description.as_str(),
            self.marketplace_name.as_str(),
            self.id.as_str(),
        ]
    }
}

/// Normalized free-text search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.trim().to_lowercase();
        Self { raw, needle }
    }

    /// Text as typed by the user.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Case-insensitive substring test over any of the fields.
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        self.is_empty()
            || fields
                .iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// True when `timestamp` lies within the 24 hours before `now`.
///
/// The boundary itself (exactly 24h) counts as recent. Timestamps in the
/// future are treated as recent.
pub fn is_recent(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(timestamp) <= TimeDelta::seconds(RECENT_WINDOW_SECS)
}

pub fn matches_status<T: Filterable + ?Sized>(
    item: &T,
    filter: StatusFilter,
    now: DateTime<Utc>,
) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Active => item.activity() == Activity::Active,
        StatusFilter::Inactive => item.activity() == Activity::Inactive,
        StatusFilter::Recent => item
            .last_activity()
            .is_some_and(|timestamp| is_recent(timestamp, now)),
    }
}

/// The predicate: status filter AND search text.
pub fn matches<T: Filterable + ?Sized>(
    item: &T,
    filter: StatusFilter,
    query: &SearchQuery,
    now: DateTime<Utc>,
) -> bool {
    matches_status(item, filter, now) && query.matches_any(&item.search_fields())
}

/// Applies the predicate to a list, preserving order.
pub fn filter_items<'a, T: Filterable>(
    items: &'a [T],
    filter: StatusFilter,
    query: &SearchQuery,
    now: DateTime<Utc>,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches(*item, filter, query, now))
        .collect()
}
