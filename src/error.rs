//! Error types shared by every tidyup operation.

use crate::config::ConfigError;
use crate::record::Direction;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A relocation (move) that failed during a sort or an undo.
///
/// Always carries the offending file name and the intended destination so
/// an interrupted run can be finished or repaired by hand.
#[derive(Debug, Error)]
#[error("could not {direction} {filename}: move to {} failed: {source}", destination.display())]
pub struct SortingError {
    /// Base name of the entry that was being moved.
    pub filename: String,
    /// Where the entry was supposed to end up.
    pub destination: PathBuf,
    /// Whether this happened while sorting or undoing.
    pub direction: Direction,
    /// The underlying filesystem error.
    #[source]
    pub source: io::Error,
}

/// Errors returned by the engine and its collaborators.
#[derive(Debug, Error)]
pub enum TidyError {
    /// The requested sort root is not a directory.
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A category name is already taken by something that is not a directory.
    #[error("cannot create category directory {}: path exists but is not a directory", path.display())]
    NameCollision { path: PathBuf },

    /// A single relocation failed.
    #[error(transparent)]
    Sorting(#[from] SortingError),

    /// A filesystem error outside of any single relocation.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The filesystem watcher could not be set up.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl TidyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TidyError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the relocation failure, if this error is one.
    pub fn as_sorting_error(&self) -> Option<&SortingError> {
        match self {
            TidyError::Sorting(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for tidyup operations.
pub type Result<T> = std::result::Result<T, TidyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorting_error_names_file_destination_and_direction() {
        let err = SortingError {
            filename: "song.mp3".to_string(),
            destination: PathBuf::from("/music/Audio/song.mp3"),
            direction: Direction::Sort,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("song.mp3"));
        assert!(message.contains("/music/Audio/song.mp3"));
        assert!(message.starts_with("could not sort"));

        let undo = SortingError {
            direction: Direction::Undo,
            ..err
        };
        assert!(undo.to_string().starts_with("could not undo"));
    }

    #[test]
    fn test_as_sorting_error() {
        let err = TidyError::NotADirectory {
            path: PathBuf::from("file.txt"),
        };
        assert!(err.as_sorting_error().is_none());
        assert_eq!(err.to_string(), "file.txt is not a directory");
    }
}
