//! Forward sort: moving root entries into category directories.
//!
//! Only the immediate contents of the root are considered. Scaffold
//! directories are skipped without being entered, other directories move as
//! a whole into the directory category, and files go wherever the
//! classifier sends them.

use crate::classifier::Classifier;
use crate::config::EntryFilter;
use crate::error::{Result, SortingError};
use crate::fs::FileSystem;
use crate::record::{Direction, RelocationRecord, RelocationSink};
use crate::walk::{WalkControl, WalkEntry, walk};
use std::path::Path;

/// Outcome of a successful sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortReport {
    /// Entries moved into a category directory.
    pub relocated: usize,
    /// Entries left in place by the entry filter.
    pub skipped: usize,
}

/// What the sort decided for one root entry.
enum Decision {
    /// The entry is a scaffold directory or the root itself.
    Ignore,
    /// The filter keeps the entry where it is.
    Filtered,
    Move(RelocationRecord),
}

fn decide(
    root: &Path,
    classifier: &dyn Classifier,
    filter: &EntryFilter,
    entry: &WalkEntry,
) -> Decision {
    if entry.is_root() {
        return Decision::Ignore;
    }
    if entry.kind.is_dir() && classifier.is_scaffold(&entry.name) {
        return Decision::Ignore;
    }
    if !filter.should_include(&entry.name) {
        return Decision::Filtered;
    }

    let (category, known) = if entry.kind.is_dir() {
        (classifier.directory_category(), true)
    } else {
        let classification = classifier.classify(&entry.name);
        (classification.category, classification.known_extension)
    };

    Decision::Move(RelocationRecord {
        original_name: entry.name.clone(),
        destination: root.join(category).join(&entry.file_name),
        category: category.to_string(),
        is_directory: entry.kind.is_dir(),
        matched_known_extension: known,
        direction: Direction::Sort,
    })
}

fn control_after(entry: &WalkEntry) -> WalkControl {
    if entry.is_root() {
        WalkControl::Continue
    } else {
        WalkControl::SkipDir
    }
}

/// Moves every eligible root entry into its category directory.
///
/// The scaffold must already exist. Stops at the first failed move; entries
/// moved before it stay moved.
pub fn sort_root<F, S>(
    fs: &F,
    root: &Path,
    classifier: &dyn Classifier,
    filter: &EntryFilter,
    sink: &S,
) -> Result<SortReport>
where
    F: FileSystem + ?Sized,
    S: RelocationSink + ?Sized,
{
    let mut report = SortReport::default();
    walk(fs, root, |entry| {
        match decide(root, classifier, filter, entry) {
            Decision::Ignore => {}
            Decision::Filtered => {
                tracing::debug!(file = %entry.name, "excluded by filter, leaving in place");
                report.skipped += 1;
            }
            Decision::Move(record) => {
                fs.rename(&entry.path, &record.destination)
                    .map_err(|source| SortingError {
                        filename: entry.name.clone(),
                        destination: record.destination.clone(),
                        direction: Direction::Sort,
                        source,
                    })?;
                sink.relocated(&record);
                report.relocated += 1;
            }
        }
        Ok(control_after(entry))
    })?;
    Ok(report)
}

/// Lists the relocations [`sort_root`] would perform, touching nothing.
pub fn plan_root<F>(
    fs: &F,
    root: &Path,
    classifier: &dyn Classifier,
    filter: &EntryFilter,
) -> Result<Vec<RelocationRecord>>
where
    F: FileSystem + ?Sized,
{
    let mut planned = Vec::new();
    walk(fs, root, |entry| {
        if let Decision::Move(record) = decide(root, classifier, filter, entry) {
            planned.push(record);
        }
        Ok(control_after(entry))
    })?;
    Ok(planned)
}
