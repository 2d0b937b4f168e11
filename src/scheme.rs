//! Partition schemes
//!
//! A scheme is the partitioning strategy (range or round-robin) plus its
//! partition count. At most one scheme per kind is active at a time; the
//! active scheme is persisted as a [`SchemeRecord`] so inserts route
//! consistently without any process-wide mutable state.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Partitioning strategy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemeKind {
    /// Value-range partitioning over the score domain `[0, 5]`
    Range,

    /// Round-robin partitioning over the base collection's sequence order
    RoundRobin,
}

impl SchemeKind {
    /// Collection-name prefix for this kind's partitions
    ///
    /// Partition `i` of a kind lives in the collection `{prefix}{i}`.
    /// The prefix doubles as the matching rule for the metadata inference
    /// fallback, so it must stay stable across versions.
    pub fn prefix(&self) -> &'static str {
        match self {
            SchemeKind::Range => "range_part",
            SchemeKind::RoundRobin => "rrobin_part",
        }
    }

    /// Collection name for partition `index` of this kind
    pub fn partition_name(&self, index: usize) -> String {
        format!("{}{}", self.prefix(), index)
    }
}

impl std::fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemeKind::Range => write!(f, "range"),
            SchemeKind::RoundRobin => write!(f, "roundrobin"),
        }
    }
}

/// Persisted metadata for one active scheme
///
/// One record per kind; rebuilding a kind overwrites its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeRecord {
    /// Which strategy this record describes
    pub kind: SchemeKind,

    /// Number of partitions (always >= 1)
    pub count: usize,

    /// Unix seconds when the scheme was built
    pub created_at: u64,
}

impl SchemeRecord {
    /// Create a record stamped with the current time
    pub fn new(kind: SchemeKind, count: usize) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            kind,
            count,
            created_at,
        }
    }
}
