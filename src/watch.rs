//! Continuous mode: re-sort the root whenever something is created in it or
//! moved into it.
//!
//! Sorts run one at a time on the watching thread. Events that arrive while
//! a sort is running queue up in the channel and each triggers its own sort;
//! there is no debouncing.

use crate::engine::Engine;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::record::RelocationSink;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

/// How often the stop flag is checked while no events arrive.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Whether an event means a new entry may have appeared in the root.
///
/// A rename into the root arrives as `To` on inotify, `Both` when the source
/// is watched too, and `Any` on backends that cannot tell the ends apart.
fn adds_entry(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Name(
                RenameMode::To | RenameMode::Both | RenameMode::Any
            ))
    )
}

/// Watches the engine's root (non-recursively) and runs a sort for every
/// creation or move-in event until `stop` is set.
///
/// A failed sort is logged and watching continues.
pub fn watch<F, S>(engine: &mut Engine<F, S>, stop: &AtomicBool) -> Result<()>
where
    F: FileSystem,
    S: RelocationSink,
{
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(engine.root(), RecursiveMode::NonRecursive)?;
    tracing::info!(root = %engine.root().display(), "watching for new files");

    while !stop.load(Ordering::Relaxed) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => {
                tracing::debug!(kind = ?event.kind, paths = ?event.paths, "filesystem event");
                if adds_entry(&event.kind) {
                    for path in &event.paths {
                        tracing::info!(path = %path.display(), "new entry, sorting");
                    }
                    if let Err(e) = engine.sort() {
                        tracing::error!(error = %e, "sort triggered by watcher failed");
                    }
                }
            }
            Ok(Err(e)) => tracing::error!(error = %e, "error watching directory"),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!(root = %engine.root().display(), "stopped watching");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};

    #[test]
    fn test_creation_and_move_in_trigger_sort() {
        assert!(adds_entry(&EventKind::Create(CreateKind::File)));
        assert!(adds_entry(&EventKind::Create(CreateKind::Folder)));
        assert!(adds_entry(&EventKind::Modify(ModifyKind::Name(RenameMode::To))));
        assert!(adds_entry(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
        assert!(adds_entry(&EventKind::Modify(ModifyKind::Name(RenameMode::Any))));
    }

    #[test]
    fn test_move_out_and_removal_do_not_trigger_sort() {
        assert!(!adds_entry(&EventKind::Modify(ModifyKind::Name(RenameMode::From))));
        assert!(!adds_entry(&EventKind::Remove(RemoveKind::File)));
        assert!(!adds_entry(&EventKind::Modify(ModifyKind::Any)));
    }
}
