//! Relocation records and the sinks that receive them.
//!
//! A [`RelocationRecord`] is produced for every entry a sort or undo moves.
//! It exists only for observability: nothing is persisted and undo never
//! consults it.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Which way a relocation went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Root entry moved into a category directory.
    Sort,
    /// Category entry moved back to the root.
    Undo,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sort => f.write_str("sort"),
            Direction::Undo => f.write_str("undo"),
        }
    }
}

/// One moved entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationRecord {
    /// Base name of the entry.
    pub original_name: String,
    /// Path the entry was (or would be) moved to.
    pub destination: PathBuf,
    /// Name of the category directory involved.
    pub category: String,
    pub is_directory: bool,
    /// Whether the file's extension was found in the lookup table. Always
    /// true for directories.
    pub matched_known_extension: bool,
    pub direction: Direction,
}

/// Receives a record for each successful relocation.
pub trait RelocationSink {
    fn relocated(&self, record: &RelocationRecord);
}

impl<S: RelocationSink + ?Sized> RelocationSink for &S {
    fn relocated(&self, record: &RelocationRecord) {
        (**self).relocated(record)
    }
}

/// Emits one structured `tracing` event per relocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RelocationSink for TracingSink {
    fn relocated(&self, record: &RelocationRecord) {
        match record.direction {
            Direction::Sort => tracing::info!(
                file = %record.original_name,
                destination = %record.destination.display(),
                is_dir = record.is_directory,
                known_extension = record.matched_known_extension,
                direction = %record.direction,
                "sorted entry into {}", record.category
            ),
            Direction::Undo => tracing::info!(
                file = %record.original_name,
                destination = %record.destination.display(),
                is_dir = record.is_directory,
                known_extension = record.matched_known_extension,
                direction = %record.direction,
                "moved entry out of {}", record.category
            ),
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<RelocationRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the records received so far, in arrival order.
    pub fn records(&self) -> Vec<RelocationRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drains the records received so far.
    pub fn take(&self) -> Vec<RelocationRecord> {
        std::mem::take(
            &mut *self
                .records
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl RelocationSink for RecordingSink {
    fn relocated(&self, record: &RelocationRecord) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
    }
}
