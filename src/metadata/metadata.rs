use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Serialize, Serializer};

/// Rendering used wherever a timestamp is shown, e.g. `Jan 01 1970 00:00:00`.
pub const TIMESTAMP_FORMAT: &str = "%b %d %Y %H:%M:%S";

/// A point in time, always rendered in UTC with [`TIMESTAMP_FORMAT`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
#[display("{}", _0.format(TIMESTAMP_FORMAT))]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Builds a timestamp from whole seconds since the Unix epoch.
    /// Returns `None` when the value is outside the representable range.
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-node bookkeeping.
///
/// `links` counts the directory slots referencing the node. The node is freed
/// by the arena as soon as it drops to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Metadata {
    created: Timestamp,
    modified: Timestamp,
    accessed: Timestamp,
    links: u32,
}

impl Metadata {
    pub(crate) fn new(now: Timestamp) -> Self {
        Self {
            created: now,
            modified: now,
            accessed: now,
            links: 1,
        }
    }

    pub(crate) fn created(&self) -> Timestamp {
        self.created
    }

    pub(crate) fn modified(&self) -> Timestamp {
        self.modified
    }

    pub(crate) fn accessed(&self) -> Timestamp {
        self.accessed
    }

    pub(crate) fn links(&self) -> u32 {
        self.links
    }

    pub(crate) fn mark_modified(&mut self, now: Timestamp) {
        self.modified = now;
    }

    pub(crate) fn mark_accessed(&mut self, now: Timestamp) {
        self.accessed = now;
    }

    pub(crate) fn increment_links(&mut self) {
        self.links += 1;
    }

    /// Drops one link and returns how many remain.
    pub(crate) fn decrement_links(&mut self) -> u32 {
        self.links = self.links.saturating_sub(1);
        self.links
    }
}
