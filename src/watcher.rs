use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;

use crate::caller::CallerContext;
use crate::error::DbgrError;
use crate::extract::extract_hook;
use crate::hook::{EvalCallback, Resume};

/// Debounce window for editor saves.
const DEBOUNCE: Duration = Duration::from_millis(75);

/// Classified watch event: the caller file's content changed.
#[derive(Debug, Clone)]
pub(crate) enum WatchEvent {
    Modified(PathBuf),
}

/// Handle to a running watcher. Keeps the debouncer alive; dropping it stops
/// the OS watcher and, through that, the bridge task and the change loop.
pub(crate) struct WatcherHandle {
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    /// The bridge task forwarding events from std channel to tokio channel.
    _bridge_task: JoinHandle<()>,
}

/// Start a debounced watch over the caller file.
///
/// Watches the file's parent directory (non-recursive) rather than the file
/// itself: editors that save via rename-and-replace would silently kill a
/// watch registered on the file's inode. Events are classified in a
/// `spawn_blocking` bridge that forwards them to a tokio mpsc channel.
///
/// # Errors
/// Returns [`DbgrError::Watch`] if the OS watcher cannot be registered.
pub(crate) fn start_watcher(
    path: &Path,
) -> Result<(WatcherHandle, tokio_mpsc::Receiver<WatchEvent>), DbgrError> {
    let (std_tx, std_rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(DEBOUNCE, move |res| {
        let _ = std_tx.send(res);
    })
    .map_err(DbgrError::Watch)?;

    let watch_root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    debouncer
        .watcher()
        .watch(&watch_root, RecursiveMode::NonRecursive)
        .map_err(DbgrError::Watch)?;

    let (tokio_tx, tokio_rx) = tokio_mpsc::channel::<WatchEvent>(256);

    let target = path.to_path_buf();
    let bridge_task = tokio::task::spawn_blocking(move || {
        while let Ok(result) = std_rx.recv() {
            match result {
                Ok(events) => {
                    for debounced_event in events {
                        if let Some(watch_event) = classify_event(&debounced_event.path, &target) {
                            if tokio_tx.blocking_send(watch_event).is_err() {
                                return; // receiver dropped, shutdown
                            }
                        }
                    }
                }
                Err(err) => {
                    eprintln!("[dbgr] watch error: {err:?}");
                }
            }
        }
    });

    Ok((
        WatcherHandle {
            _debouncer: debouncer,
            _bridge_task: bridge_task,
        },
        tokio_rx,
    ))
}

/// Classify a filesystem event path, or `None` if it should be ignored.
///
/// Only content modifications of the watched file count: sibling files are
/// skipped by name, and rename-away/delete events are skipped because the
/// target no longer exists.
fn classify_event(path: &Path, target: &Path) -> Option<WatchEvent> {
    if path.file_name() != target.file_name() {
        return None;
    }
    if !target.exists() {
        return None;
    }
    Some(WatchEvent::Modified(target.to_path_buf()))
}

/// Consume watch events and republish edited hook code.
///
/// A single consumer task processes events strictly in arrival order, so two
/// change handlers never interleave and snippets cannot publish out of order.
///
/// Per event: reload the source fresh; skip if byte-identical to the last
/// loaded text (no-op saves and touches); otherwise re-extract the hook
/// snippet; skip if it equals the last-known-good snippet (edits outside the
/// hook span); otherwise compile it through the eval callback and invoke the
/// new hook with a resume handle, fire-and-forget — it may resolve the
/// session later or never, leaving the watch active for further edits.
///
/// Failures here (mid-edit saves that break the call expression, transient
/// read errors) are logged and the event is skipped; the watch stays up.
pub(crate) async fn change_loop<E: EvalCallback>(
    mut events: tokio_mpsc::Receiver<WatchEvent>,
    caller: CallerContext,
    mut eval_callback: E,
    mut last_code: String,
    mut last_snippet: String,
    resume: Resume,
) {
    while let Some(WatchEvent::Modified(path)) = events.recv().await {
        let new_code = match tokio::fs::read_to_string(&path).await {
            Ok(code) => code,
            Err(err) => {
                eprintln!(
                    "[dbgr] skipping change event: failed to read {}: {err}",
                    path.display()
                );
                continue;
            }
        };
        if new_code == last_code {
            continue;
        }
        last_code = new_code;

        let snippet = match extract_hook(&last_code, caller.dialect()) {
            Ok(snippet) => snippet,
            Err(err) => {
                eprintln!("[dbgr] skipping change event: {err}");
                continue;
            }
        };
        if snippet == last_snippet {
            continue;
        }
        last_snippet = snippet;

        match eval_callback.eval(&last_snippet) {
            Ok(new_hook) => {
                tokio::spawn(new_hook(resume.clone()));
            }
            Err(err) => {
                eprintln!("[dbgr] eval callback failed: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_ignores_sibling_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("session.js");
        fs::write(&target, "dbgr();").unwrap();

        let sibling = dir.path().join("other.js");
        assert!(classify_event(&sibling, &target).is_none());
        assert!(classify_event(&target, &target).is_some());
    }

    #[test]
    fn test_classify_ignores_missing_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("session.js");
        // Never created — simulates a rename-away/delete event.
        assert!(classify_event(&target, &target).is_none());
    }

    #[test]
    fn test_classify_matches_by_file_name() {
        // Watch backends may report canonicalized paths; matching on file
        // name keeps classification stable across path spellings.
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("session.js");
        fs::write(&target, "dbgr();").unwrap();

        let reported = dir.path().canonicalize().unwrap().join("session.js");
        assert!(classify_event(&reported, &target).is_some());
    }
}
