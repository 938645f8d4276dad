//! In-memory [`FileSystem`] for tests and experiments.
//!
//! Paths are normalized and resolved against the fake's own working
//! directory; nothing touches the process or the disk.

use crate::fs::{DirEntry, EntryKind, FileSystem};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<PathBuf, EntryKind>,
    cwd: PathBuf,
}

/// A tree of files and directories held in memory. Files have no content.
#[derive(Debug)]
pub struct MemoryFs {
    state: Mutex<State>,
}

impl MemoryFs {
    /// Creates a filesystem containing only `/`, which is also the working
    /// directory.
    pub fn new() -> Self {
        let root = PathBuf::from("/");
        let mut entries = BTreeMap::new();
        entries.insert(root.clone(), EntryKind::Dir);
        Self {
            state: Mutex::new(State { entries, cwd: root }),
        }
    }

    /// Creates a directory and any missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut state = self.lock();
        let path = state.resolve(path.as_ref());
        let mut current = PathBuf::from("/");
        for component in path.components().skip(1) {
            current.push(component);
            match state.entries.get(&current) {
                Some(EntryKind::Dir) => {}
                Some(EntryKind::File) => return Err(not_a_directory(&current)),
                None => {
                    state.entries.insert(current.clone(), EntryKind::Dir);
                }
            }
        }
        Ok(())
    }

    /// Creates an empty file and any missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = self.lock().resolve(path.as_ref());
        if let Some(parent) = path.parent() {
            self.add_dir(parent)?;
        }
        let mut state = self.lock();
        if state.entries.contains_key(&path) {
            return Err(already_exists(&path));
        }
        state.entries.insert(path, EntryKind::File);
        Ok(())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let state = self.lock();
        let path = state.resolve(path.as_ref());
        state.entries.contains_key(&path)
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        let state = self.lock();
        let path = state.resolve(path.as_ref());
        state.entries.get(&path) == Some(&EntryKind::Dir)
    }

    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        let state = self.lock();
        let path = state.resolve(path.as_ref());
        state.entries.get(&path) == Some(&EntryKind::File)
    }

    /// Every path below `dir`, relative to it, sorted.
    pub fn tree(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let state = self.lock();
        let dir = state.resolve(dir.as_ref());
        state
            .entries
            .keys()
            .filter(|path| **path != dir)
            .filter_map(|path| path.strip_prefix(&dir).ok())
            .map(Path::to_path_buf)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn resolve(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        let mut normalized = PathBuf::from("/");
        for component in joined.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::ParentDir => {
                    normalized.pop();
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        normalized
    }

    fn require_parent_dir(&self, path: &Path) -> io::Result<()> {
        let parent = path.parent().ok_or_else(|| not_found(path))?;
        match self.entries.get(parent) {
            Some(EntryKind::Dir) => Ok(()),
            Some(EntryKind::File) => Err(not_a_directory(parent)),
            None => Err(not_found(parent)),
        }
    }
}

impl FileSystem for MemoryFs {
    fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let state = self.lock();
        let path = state.resolve(path);
        state
            .entries
            .get(&path)
            .copied()
            .ok_or_else(|| not_found(&path))
    }

    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        self.metadata(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let path = state.resolve(path);
        if state.entries.contains_key(&path) {
            return Err(already_exists(&path));
        }
        state.require_parent_dir(&path)?;
        state.entries.insert(path, EntryKind::Dir);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let from = state.resolve(from);
        let to = state.resolve(to);
        let kind = *state.entries.get(&from).ok_or_else(|| not_found(&from))?;
        if state.entries.contains_key(&to) {
            return Err(already_exists(&to));
        }
        if to.starts_with(&from) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot move {} into itself", from.display()),
            ));
        }
        state.require_parent_dir(&to)?;

        if kind == EntryKind::File {
            state.entries.remove(&from);
            state.entries.insert(to, kind);
            return Ok(());
        }

        let moved: Vec<(PathBuf, EntryKind)> = state
            .entries
            .range(from.clone()..)
            .take_while(|(path, _)| path.starts_with(&from))
            .map(|(path, kind)| (path.clone(), *kind))
            .collect();
        for (path, kind) in moved {
            state.entries.remove(&path);
            let relative = path.strip_prefix(&from).unwrap_or(Path::new(""));
            state.entries.insert(to.join(relative), kind);
        }
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let path = state.resolve(path);
        match state.entries.get(&path) {
            Some(EntryKind::Dir) => {}
            Some(EntryKind::File) => return Err(not_a_directory(&path)),
            None => return Err(not_found(&path)),
        }
        if state.entries.keys().any(|p| p.parent() == Some(path.as_path())) {
            return Err(io::Error::new(
                io::ErrorKind::DirectoryNotEmpty,
                format!("{} is not empty", path.display()),
            ));
        }
        state.entries.remove(&path);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let state = self.lock();
        let path = state.resolve(path);
        match state.entries.get(&path) {
            Some(EntryKind::Dir) => {}
            Some(EntryKind::File) => return Err(not_a_directory(&path)),
            None => return Err(not_found(&path)),
        }
        let mut entries: Vec<DirEntry> = state
            .entries
            .iter()
            .filter(|(child, _)| child.parent() == Some(path.as_path()))
            .map(|(child, kind)| {
                let file_name = child.file_name().map(OsStr::to_os_string).unwrap_or_default();
                DirEntry {
                    name: file_name.to_string_lossy().into_owned(),
                    file_name,
                    path: child.clone(),
                    kind: *kind,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.lock().cwd.clone())
    }

    fn set_current_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let path = state.resolve(path);
        match state.entries.get(&path) {
            Some(EntryKind::Dir) => {
                state.cwd = path;
                Ok(())
            }
            Some(EntryKind::File) => Err(not_a_directory(&path)),
            None => Err(not_found(&path)),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

fn already_exists(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{} already exists", path.display()),
    )
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("{} is not a directory", path.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MemoryFs::new();
        fs.add_file("/a/b/c.txt").unwrap();
        assert!(fs.is_dir("/a"));
        assert!(fs.is_dir("/a/b"));
        assert!(fs.is_file("/a/b/c.txt"));
    }

    #[test]
    fn test_rename_directory_moves_subtree() {
        let fs = MemoryFs::new();
        fs.add_file("/root/foo/bar.txt").unwrap();
        fs.add_file("/root/foo/deep/baz.txt").unwrap();
        fs.add_file("/root/foobar.txt").unwrap();
        fs.add_dir("/root/Directories").unwrap();

        fs.rename(Path::new("/root/foo"), Path::new("/root/Directories/foo"))
            .unwrap();

        assert!(fs.is_file("/root/Directories/foo/bar.txt"));
        assert!(fs.is_file("/root/Directories/foo/deep/baz.txt"));
        assert!(!fs.exists("/root/foo"));
        // A sibling sharing the name prefix is untouched.
        assert!(fs.is_file("/root/foobar.txt"));
    }

    #[test]
    fn test_rename_never_overwrites() {
        let fs = MemoryFs::new();
        fs.add_file("/a.txt").unwrap();
        fs.add_file("/b.txt").unwrap();
        let err = fs
            .rename(Path::new("/a.txt"), Path::new("/b.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(fs.exists("/a.txt"));
    }

    #[test]
    fn test_rename_into_itself_fails() {
        let fs = MemoryFs::new();
        fs.add_dir("/a").unwrap();
        let err = fs.rename(Path::new("/a"), Path::new("/a/b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_create_dir_requires_parent() {
        let fs = MemoryFs::new();
        let err = fs.create_dir(Path::new("/missing/child")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_dir_requires_empty() {
        let fs = MemoryFs::new();
        fs.add_file("/d/x").unwrap();
        let err = fs.remove_dir(Path::new("/d")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::DirectoryNotEmpty);
        fs.rename(Path::new("/d/x"), Path::new("/x")).unwrap();
        fs.remove_dir(Path::new("/d")).unwrap();
        assert!(!fs.exists("/d"));
    }

    #[test]
    fn test_relative_paths_follow_current_dir() {
        let fs = MemoryFs::new();
        fs.add_dir("/home/user").unwrap();
        fs.set_current_dir(Path::new("/home/user")).unwrap();
        fs.add_file("notes.md").unwrap();
        assert!(fs.is_file("/home/user/notes.md"));
        assert_eq!(fs.current_dir().unwrap(), PathBuf::from("/home/user"));
        assert_eq!(
            fs.metadata(Path::new("../user/./notes.md")).unwrap(),
            EntryKind::File
        );
    }

    #[test]
    fn test_read_dir_lists_direct_children_only() {
        let fs = MemoryFs::new();
        fs.add_file("/r/b.txt").unwrap();
        fs.add_file("/r/a/inner.txt").unwrap();
        let names: Vec<_> = fs
            .read_dir(Path::new("/r"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a", "b.txt"]);
    }
}
