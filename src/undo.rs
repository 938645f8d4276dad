//! Structural undo: flattening category directories back into the root.
//!
//! Nothing about previous sorts is recorded. Undo infers what to do from the
//! layout alone, and only acts when every category directory is present.

use crate::classifier::Classifier;
use crate::error::{Result, SortingError, TidyError};
use crate::fs::FileSystem;
use crate::record::{Direction, RelocationRecord, RelocationSink};
use crate::walk::{WalkControl, walk};
use std::path::Path;

/// Outcome of a successful undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoReport {
    /// Some category directory was missing, so nothing was touched.
    NothingToUndo,
    Restored {
        /// Entries moved back to the root.
        restored: usize,
        /// Category directories deleted, in the order they were processed.
        removed_categories: Vec<String>,
    },
}

/// Moves the contents of every category directory back into `root` and
/// deletes the emptied category directories.
///
/// Directories that are not categories are left alone. A failed move stops
/// the undo; categories already processed stay undone.
pub fn undo_root<F, S>(
    fs: &F,
    root: &Path,
    classifier: &dyn Classifier,
    sink: &S,
) -> Result<UndoReport>
where
    F: FileSystem + ?Sized,
    S: RelocationSink + ?Sized,
{
    let expected = classifier.categories().sorted_names();
    let present = directory_names(fs, root)?;
    if !is_sorted_subset(&expected, &present) {
        tracing::info!(
            root = %root.display(),
            "not every category directory is present, nothing to undo"
        );
        return Ok(UndoReport::NothingToUndo);
    }

    let mut restored = 0;
    let mut removed_categories = Vec::with_capacity(expected.len());
    for category in &expected {
        let category_path = root.join(category);
        walk(fs, &category_path, |entry| {
            if entry.is_root() {
                return Ok(WalkControl::Continue);
            }
            let destination = root.join(&entry.file_name);
            fs.rename(&entry.path, &destination)
                .map_err(|source| SortingError {
                    filename: entry.name.clone(),
                    destination: destination.clone(),
                    direction: Direction::Undo,
                    source,
                })?;
            sink.relocated(&RelocationRecord {
                original_name: entry.name.clone(),
                destination,
                category: category.clone(),
                is_directory: entry.kind.is_dir(),
                matched_known_extension: entry.kind.is_dir()
                    || classifier.classify(&entry.name).known_extension,
                direction: Direction::Undo,
            });
            restored += 1;
            Ok(WalkControl::SkipDir)
        })?;

        fs.remove_dir(&category_path)
            .map_err(|e| TidyError::io(&category_path, e))?;
        tracing::info!(path = %category_path.display(), "deleted category directory");
        removed_categories.push(category.clone());
    }

    Ok(UndoReport::Restored {
        restored,
        removed_categories,
    })
}

/// Names of the directories directly inside `root`, sorted.
fn directory_names<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs
        .read_dir(root)
        .map_err(|e| TidyError::io(root, e))?
        .into_iter()
        .filter(|entry| entry.kind.is_dir())
        .map(|entry| entry.name)
        .collect();
    names.sort();
    Ok(names)
}

/// Whether every element of `expected` appears in `actual`.
///
/// Both slices must be sorted ascending. Runs in linear time by walking the
/// two in lock-step.
pub fn is_sorted_subset<T: Ord>(expected: &[T], actual: &[T]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < expected.len() {
        if j == actual.len() {
            return false;
        }
        match expected[i].cmp(&actual[j]) {
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Less => return false,
        }
    }
    true
}
