//! Pre-order traversal over a [`FileSystem`].

use crate::error::{Result, TidyError};
use crate::fs::{EntryKind, FileSystem};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What the walk should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Descend into the entry if it is a directory.
    Continue,
    /// Do not descend into this directory. Ignored for files.
    SkipDir,
}

/// An entry handed to the visitor.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Base name as stored on disk.
    pub file_name: OsString,
    /// Lossy UTF-8 form of `file_name`, for classification and display.
    pub name: String,
    pub kind: EntryKind,
    /// 0 for the walk root, 1 for its children, and so on.
    pub depth: usize,
}

impl WalkEntry {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Visits `root` and then everything below it, children in name order.
///
/// The root itself is resolved through symlinks; entries below it are not.
///
/// Each directory's listing is read before its children are visited, so the
/// visitor may move the entry it is looking at out of the tree; returning
/// [`WalkControl::SkipDir`] for a moved directory keeps the walk from
/// descending into its old location.
pub fn walk<F, V>(fs: &F, root: &Path, mut visit: V) -> Result<()>
where
    F: FileSystem + ?Sized,
    V: FnMut(&WalkEntry) -> Result<WalkControl>,
{
    let kind = fs.stat(root).map_err(|e| TidyError::io(root, e))?;
    let file_name = root
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("."));
    let entry = WalkEntry {
        path: root.to_path_buf(),
        name: file_name.to_string_lossy().into_owned(),
        file_name,
        kind,
        depth: 0,
    };
    if visit(&entry)? == WalkControl::Continue && kind.is_dir() {
        walk_children(fs, &entry, &mut visit)?;
    }
    Ok(())
}

fn walk_children<F, V>(fs: &F, dir: &WalkEntry, visit: &mut V) -> Result<()>
where
    F: FileSystem + ?Sized,
    V: FnMut(&WalkEntry) -> Result<WalkControl>,
{
    let children = fs.read_dir(&dir.path).map_err(|e| TidyError::io(&dir.path, e))?;
    for child in children {
        let entry = WalkEntry {
            path: child.path,
            file_name: child.file_name,
            name: child.name,
            kind: child.kind,
            depth: dir.depth + 1,
        };
        if visit(&entry)? == WalkControl::Continue && entry.kind.is_dir() {
            walk_children(fs, &entry, visit)?;
        }
    }
    Ok(())
}
