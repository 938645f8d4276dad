//! Creation of the category directories at the sort root.

use crate::error::{Result, TidyError};
use crate::fs::{EntryKind, FileSystem};
use std::io;
use std::path::Path;

/// Makes sure a directory exists at `root/<name>` for every name.
///
/// Existing directories are left alone, so calling this any number of times
/// has the same effect as calling it once.
///
/// # Errors
///
/// * `TidyError::NameCollision` if a name is taken by a non-directory
/// * `TidyError::Io` for any other creation failure; remaining names are not
///   attempted
pub fn ensure_scaffold<F, I, S>(fs: &F, root: &Path, names: I) -> Result<()>
where
    F: FileSystem + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        let path = root.join(name.as_ref());
        if idempotent_mkdir(fs, &path)? {
            tracing::debug!(path = %path.display(), "created category directory");
        }
    }
    Ok(())
}

/// Creates `path`, treating an existing directory as success. Returns whether
/// the directory was created by this call.
///
/// Creation is attempted first and the existing entry inspected only on
/// conflict, so concurrent callers cannot race between a check and a create.
fn idempotent_mkdir<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<bool> {
    match fs.create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            match fs.metadata(path).map_err(|e| TidyError::io(path, e))? {
                EntryKind::Dir => Ok(false),
                EntryKind::File => Err(TidyError::NameCollision {
                    path: path.to_path_buf(),
                }),
            }
        }
        Err(e) => Err(TidyError::io(path, e)),
    }
}
