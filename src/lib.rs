//! tidyup - sort a directory into category folders, and back
//!
//! A sort moves every entry at the top of a root directory into a category
//! folder chosen from the file's extension; directories go whole into their
//! own category. An undo moves everything back out and deletes the category
//! folders, judging only from the layout on disk.
//!
//! Filesystem access goes through the [`FileSystem`] trait, with [`OsFs`] for
//! real directories and [`MemoryFs`] for tests.

pub mod category;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod memory_fs;
pub mod output;
pub mod record;
pub mod scaffold;
pub mod sort;
pub mod undo;
pub mod walk;
pub mod watch;

pub use category::{Category, CategorySet};
pub use classifier::{Classifier, ExtensionClassifier};
pub use config::{ConfigError, EntryFilter, TidyConfig};
pub use engine::Engine;
pub use error::{Result, SortingError, TidyError};
pub use fs::{FileSystem, OsFs};
pub use memory_fs::MemoryFs;
pub use record::{Direction, RecordingSink, RelocationRecord, RelocationSink, TracingSink};
pub use sort::SortReport;
pub use undo::UndoReport;
