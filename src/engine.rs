//! The engine: one sort root, one classification strategy.
//!
//! # Examples
//!
//! ```
//! use tidyup::classifier::ExtensionClassifier;
//! use tidyup::engine::Engine;
//! use tidyup::memory_fs::MemoryFs;
//! use tidyup::record::RecordingSink;
//!
//! let fs = MemoryFs::new();
//! fs.add_file("/downloads/song.mp3").unwrap();
//!
//! let mut engine = Engine::with_root(
//!     Box::new(ExtensionClassifier::default()),
//!     fs,
//!     RecordingSink::new(),
//!     "/downloads",
//! );
//! engine.sort().unwrap();
//! assert!(engine.fs().is_file("/downloads/Audio/song.mp3"));
//!
//! engine.undo().unwrap();
//! assert!(engine.fs().is_file("/downloads/song.mp3"));
//! assert!(!engine.fs().exists("/downloads/Audio"));
//! ```

use crate::classifier::Classifier;
use crate::config::EntryFilter;
use crate::error::{Result, TidyError};
use crate::fs::{EntryKind, FileSystem};
use crate::record::{RelocationRecord, RelocationSink};
use crate::scaffold::ensure_scaffold;
use crate::sort::{SortReport, plan_root, sort_root};
use crate::undo::{UndoReport, undo_root};
use std::io;
use std::path::{Path, PathBuf};

/// Sorts and unsorts a single root directory.
///
/// `sort` and `undo` take `&mut self`, so one engine never runs two of them
/// at once.
pub struct Engine<F: FileSystem, S: RelocationSink> {
    root: PathBuf,
    classifier: Box<dyn Classifier>,
    filter: EntryFilter,
    fs: F,
    sink: S,
}

impl<F: FileSystem, S: RelocationSink> Engine<F, S> {
    /// Creates an engine rooted at the filesystem's current directory.
    pub fn new(classifier: Box<dyn Classifier>, fs: F, sink: S) -> Result<Self> {
        let root = fs
            .current_dir()
            .map_err(|e| TidyError::io(".", e))?;
        Ok(Self::with_root(classifier, fs, sink, root))
    }

    /// Creates an engine rooted at `root` without validating it or touching
    /// the working directory.
    pub fn with_root(
        classifier: Box<dyn Classifier>,
        fs: F,
        sink: S,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            classifier,
            filter: EntryFilter::allow_all(),
            fs,
            sink,
        }
    }

    /// Replaces the filter deciding which root entries a sort may move.
    pub fn with_filter(mut self, filter: EntryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Points the engine at `path` and makes it the working directory.
    /// Symlinks to directories are accepted.
    ///
    /// # Errors
    ///
    /// `TidyError::NotADirectory` if `path` is a file; `TidyError::Io` if it
    /// cannot be inspected or entered. The root is unchanged on error.
    pub fn change_root(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match self.fs.stat(path) {
            Ok(EntryKind::Dir) => {}
            Ok(EntryKind::File) => {
                return Err(TidyError::NotADirectory {
                    path: path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::error!(path = %path.display(), "sort root does not exist");
                return Err(TidyError::io(path, e));
            }
            Err(e) => return Err(TidyError::io(path, e)),
        }
        self.fs
            .set_current_dir(path)
            .map_err(|e| TidyError::io(path, e))?;
        self.root = self
            .fs
            .current_dir()
            .unwrap_or_else(|_| path.to_path_buf());
        tracing::debug!(root = %self.root.display(), "changed sort root");
        Ok(())
    }

    /// Makes sure every category directory exists at the root.
    pub fn create_scaffolding(&self) -> Result<()> {
        ensure_scaffold(
            &self.fs,
            &self.root,
            self.classifier.categories().categories().iter().map(|c| c.name.as_str()),
        )
    }

    /// Creates the scaffold, then moves every root entry into its category.
    pub fn sort(&mut self) -> Result<SortReport> {
        self.create_scaffolding()?;
        let report = sort_root(
            &self.fs,
            &self.root,
            self.classifier.as_ref(),
            &self.filter,
            &self.sink,
        )?;
        tracing::info!(
            root = %self.root.display(),
            relocated = report.relocated,
            skipped = report.skipped,
            "sort finished"
        );
        Ok(report)
    }

    /// Moves everything out of the category directories and deletes them, if
    /// all of them are present.
    pub fn undo(&mut self) -> Result<UndoReport> {
        undo_root(&self.fs, &self.root, self.classifier.as_ref(), &self.sink)
    }

    /// The relocations `sort` would perform right now, without performing
    /// them or creating the scaffold.
    pub fn plan(&self) -> Result<Vec<RelocationRecord>> {
        plan_root(&self.fs, &self.root, self.classifier.as_ref(), &self.filter)
    }
}

impl<F: FileSystem + std::fmt::Debug, S: RelocationSink + std::fmt::Debug> std::fmt::Debug
    for Engine<F, S>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("filter", &self.filter)
            .field("fs", &self.fs)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, CategorySet};
    use crate::classifier::ExtensionClassifier;
    use crate::memory_fs::MemoryFs;
    use crate::record::{Direction, RecordingSink};

    fn engine(fs: MemoryFs, root: &str) -> Engine<MemoryFs, RecordingSink> {
        Engine::with_root(
            Box::new(ExtensionClassifier::default()),
            fs,
            RecordingSink::new(),
            root,
        )
    }

    #[test]
    fn test_new_uses_current_dir() {
        let fs = MemoryFs::new();
        fs.add_dir("/work").unwrap();
        fs.set_current_dir(Path::new("/work")).unwrap();
        let engine = Engine::new(
            Box::new(ExtensionClassifier::default()),
            fs,
            RecordingSink::new(),
        )
        .unwrap();
        assert_eq!(engine.root(), Path::new("/work"));
    }

    #[test]
    fn test_change_root() {
        let fs = MemoryFs::new();
        fs.add_dir("/a").unwrap();
        fs.add_dir("/b").unwrap();
        let mut engine = engine(fs, "/a");
        engine.change_root("/b").unwrap();
        assert_eq!(engine.root(), Path::new("/b"));
        assert_eq!(engine.fs().current_dir().unwrap(), PathBuf::from("/b"));
    }

    #[test]
    fn test_change_root_rejects_file() {
        let fs = MemoryFs::new();
        fs.add_dir("/a").unwrap();
        fs.add_file("/a/file.txt").unwrap();
        let mut engine = engine(fs, "/a");
        let err = engine.change_root("/a/file.txt").unwrap_err();
        assert!(matches!(err, TidyError::NotADirectory { .. }));
        assert_eq!(engine.root(), Path::new("/a"));
    }

    #[test]
    fn test_change_root_rejects_missing_path() {
        let fs = MemoryFs::new();
        fs.add_dir("/a").unwrap();
        let mut engine = engine(fs, "/a");
        assert!(matches!(
            engine.change_root("/missing"),
            Err(TidyError::Io { .. })
        ));
        assert_eq!(engine.root(), Path::new("/a"));
    }

    #[test]
    fn test_relative_change_root_resolves() {
        let fs = MemoryFs::new();
        fs.add_dir("/home/me/inbox").unwrap();
        fs.set_current_dir(Path::new("/home/me")).unwrap();
        let mut engine = engine(fs, "/home/me");
        engine.change_root("inbox").unwrap();
        assert_eq!(engine.root(), Path::new("/home/me/inbox"));
    }

    #[test]
    fn test_scaffolding_twice_is_stable() {
        let fs = MemoryFs::new();
        fs.add_dir("/r").unwrap();
        let engine = engine(fs, "/r");
        engine.create_scaffolding().unwrap();
        let once = engine.fs().tree("/r");
        engine.create_scaffolding().unwrap();
        assert_eq!(engine.fs().tree("/r"), once);
        assert_eq!(once.len(), 9);
    }

    #[test]
    fn test_sort_creates_scaffold_first() {
        let fs = MemoryFs::new();
        fs.add_dir("/r").unwrap();
        let mut engine = engine(fs, "/r");
        let report = engine.sort().unwrap();
        assert_eq!(report.relocated, 0);
        assert!(engine.fs().is_dir("/r/Images"));
        assert!(engine.fs().is_dir("/r/Directories"));
    }

    #[test]
    fn test_sort_then_undo_round_trip() {
        let fs = MemoryFs::new();
        for name in ["a.mp3", "b.pdf", "c.iso", "d.xyz"] {
            fs.add_file(Path::new("/r").join(name)).unwrap();
        }
        let before = fs.tree("/r");
        let mut engine = engine(fs, "/r");

        engine.sort().unwrap();
        assert!(engine.fs().is_file("/r/Compressed/c.iso"));
        engine.undo().unwrap();

        assert_eq!(engine.fs().tree("/r"), before);
        let records = engine.sink().records();
        assert_eq!(records.len(), 8);
        assert_eq!(
            records.iter().filter(|r| r.direction == Direction::Undo).count(),
            4
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let fs = MemoryFs::new();
        fs.add_file("/r/x.txt").unwrap();
        let mut engine = engine(fs, "/r");
        engine.sort().unwrap();
        let once = engine.fs().tree("/r");
        let report = engine.sort().unwrap();
        assert_eq!(report.relocated, 0);
        assert_eq!(engine.fs().tree("/r"), once);
    }

    #[test]
    fn test_custom_strategy_categories() {
        let set = CategorySet::new(
            vec![Category::new("Music", &["ogg"])],
            "Folders",
            "Misc",
        )
        .unwrap();
        let fs = MemoryFs::new();
        fs.add_file("/r/a.ogg").unwrap();
        fs.add_file("/r/b.pdf").unwrap();
        fs.add_file("/r/sub/c").unwrap();
        let mut engine = Engine::with_root(
            Box::new(ExtensionClassifier::new(set)),
            fs,
            RecordingSink::new(),
            "/r",
        );
        engine.sort().unwrap();
        assert!(engine.fs().is_file("/r/Music/a.ogg"));
        assert!(engine.fs().is_file("/r/Misc/b.pdf"));
        assert!(engine.fs().is_file("/r/Folders/sub/c"));
    }

    #[test]
    fn test_filter_applies_to_sort_not_undo() {
        let fs = MemoryFs::new();
        fs.add_file("/r/keep.part").unwrap();
        fs.add_file("/r/go.txt").unwrap();
        let rules = crate::config::TidyConfig::from_toml(
            r#"
            [filters.exclude]
            extensions = ["part"]
            "#,
        )
        .unwrap();
        let mut engine = engine(fs, "/r").with_filter(rules.entry_filter().unwrap());
        let report = engine.sort().unwrap();
        assert_eq!(report.skipped, 1);
        assert!(engine.fs().is_file("/r/keep.part"));

        engine.fs().add_file("/r/Other/moved.part").unwrap();
        engine.undo().unwrap();
        assert!(engine.fs().is_file("/r/moved.part"));
        assert!(engine.fs().is_file("/r/go.txt"));
    }

    #[test]
    fn test_plan_leaves_tree_alone() {
        let fs = MemoryFs::new();
        fs.add_file("/r/a.mp3").unwrap();
        let engine = engine(fs, "/r");
        let before = engine.fs().tree("/r");
        let plan = engine.plan().unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].destination, PathBuf::from("/r/Audio/a.mp3"));
        assert_eq!(engine.fs().tree("/r"), before);
    }
}
