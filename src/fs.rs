//! Filesystem capability used by the engine.
//!
//! Everything the engine does to disk goes through [`FileSystem`], so the
//! same sort and undo code runs against the real filesystem ([`OsFs`]) and
//! the in-memory fake used in tests ([`crate::memory_fs::MemoryFs`]).

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What kind of entry a path refers to. Symlinks count as files: they are
/// moved as links, never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == EntryKind::Dir
    }
}

/// One child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Base name as stored on disk. Destinations are built from this.
    pub file_name: OsString,
    /// Base name, lossily converted for display and classification.
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Primitive filesystem operations.
pub trait FileSystem {
    /// Returns the kind of entry at `path` without following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<EntryKind>;

    /// Returns the kind of entry at `path`, following symlinks. Used for
    /// sort roots, which may be links to directories.
    fn stat(&self, path: &Path) -> io::Result<EntryKind>;

    /// Creates a single directory. Fails with `AlreadyExists` if anything is
    /// already at `path`.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Moves `from` to `to`. Never overwrites: fails with `AlreadyExists` if
    /// `to` exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Lists the children of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    fn current_dir(&self) -> io::Result<PathBuf>;

    fn set_current_dir(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = fs::symlink_metadata(path)?;
        Ok(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }

    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = fs::metadata(path)?;
        Ok(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        // rename(2) silently replaces an existing file on Unix.
        match fs::symlink_metadata(to) {
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => fs::rename(from, to),
            Err(e) => Err(e),
        }
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let kind = if entry.file_type()?.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            let file_name = entry.file_name();
            entries.push(DirEntry {
                name: file_name.to_string_lossy().into_owned(),
                file_name,
                path: entry.path(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn set_current_dir(&self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rename_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let err = OsFs.rename(&a, &b).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&b).unwrap(), "b");
        assert!(a.exists());
    }

    #[test]
    fn test_read_dir_sorted_with_kinds() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(temp_dir.path().join("a")).unwrap();
        fs::write(temp_dir.path().join("c"), "").unwrap();

        let entries = OsFs.read_dir(temp_dir.path()).unwrap();
        let listing: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            listing,
            vec![
                ("a", EntryKind::Dir),
                ("b.txt", EntryKind::File),
                ("c", EntryKind::File)
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_stat_follows_symlinks_metadata_does_not() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let real = temp_dir.path().join("real");
        let link = temp_dir.path().join("link");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(OsFs.stat(&link).unwrap(), EntryKind::Dir);
        assert_eq!(OsFs.metadata(&link).unwrap(), EntryKind::File);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_dir_keeps_raw_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let raw = OsStr::from_bytes(b"caf\xe9.txt");
        fs::write(temp_dir.path().join(raw), "").unwrap();

        let entries = OsFs.read_dir(temp_dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, raw);
        assert_eq!(entries[0].name, "caf\u{FFFD}.txt");
    }

    #[test]
    fn test_create_dir_existing_is_already_exists() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("Audio");
        OsFs.create_dir(&dir).unwrap();
        assert_eq!(
            OsFs.create_dir(&dir).unwrap_err().kind(),
            io::ErrorKind::AlreadyExists
        );
        assert_eq!(OsFs.metadata(&dir).unwrap(), EntryKind::Dir);
    }
}
