//! Filesystem watcher for Claude Code transcript files.
//!
//! Claude Code appends one JSONL line per turn event to
//! `~/.claude/projects/<flattened-path>/<session-id>.jsonl`. The watcher
//! observes that tree recursively and feeds every transcript touch to
//! the store, which re-reads the tail and reclassifies the project.
//!
//! `notify` delivers events on its own thread via a sync channel, so a
//! bridge thread forwards them into tokio. The bridge polls with a
//! short timeout to notice cancellation promptly.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Watcher setup failures are logged; the daemon keeps serving pushes

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::store::{StoreError, StoreHandle};

/// How often the bridge thread checks for cancellation.
const BRIDGE_POLL: Duration = Duration::from_millis(500);

/// Buffer for transcript updates in flight to the store.
const UPDATE_BUFFER: usize = 100;

/// One transcript touch, resolved to a project.
#[derive(Debug)]
struct LogUpdate {
    project: String,
    session_id: Option<String>,
    path: PathBuf,
}

/// Spawns the transcript watcher.
///
/// Starts a bridge thread watching `root` and an async task draining
/// updates into the store. Both stop when the token is cancelled.
pub fn spawn_watcher(root: PathBuf, store: StoreHandle, cancel: CancellationToken) {
    let (update_tx, update_rx) = mpsc::channel::<LogUpdate>(UPDATE_BUFFER);

    spawn_bridge_thread(root, update_tx, cancel.clone());
    spawn_drain_task(update_rx, store, cancel);
}

/// Bridge thread: owns the notify watcher and forwards transcript
/// events into tokio.
fn spawn_bridge_thread(root: PathBuf, update_tx: mpsc::Sender<LogUpdate>, cancel: CancellationToken) {
    std::thread::spawn(move || {
        let (raw_tx, raw_rx) = std::sync::mpsc::channel::<notify::Result<Event>>();

        let mut watcher = match notify::recommended_watcher(move |res| {
            let _ = raw_tx.send(res);
        }) {
            Ok(w) => w,
            Err(e) => {
                error!(error = %e, "Failed to create filesystem watcher");
                return;
            }
        };

        if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
            error!(
                root = %root.display(),
                error = %e,
                "Failed to watch projects directory"
            );
            return;
        }

        info!(root = %root.display(), "Watching transcript directory");

        // Flattened-directory-name -> project-name cache
        let mut names: HashMap<String, String> = HashMap::new();

        loop {
            match raw_rx.recv_timeout(BRIDGE_POLL) {
                Ok(Ok(event)) => {
                    if !is_write_event(&event.kind) {
                        continue;
                    }
                    for path in transcript_paths(&event) {
                        let Some(update) = resolve_update(path, &mut names) else {
                            continue;
                        };
                        if update_tx.blocking_send(update).is_err() {
                            debug!("Watcher bridge stopping: update channel closed");
                            return;
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Filesystem watcher error");
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    if cancel.is_cancelled() {
                        debug!("Watcher bridge shutting down");
                        return;
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                    debug!("Watcher event channel disconnected");
                    return;
                }
            }
        }
    });
}

/// Async side: applies transcript updates through the store handle.
fn spawn_drain_task(
    mut update_rx: mpsc::Receiver<LogUpdate>,
    store: StoreHandle,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Watcher drain task shutting down");
                    break;
                }
                update = update_rx.recv() => {
                    let Some(update) = update else {
                        debug!("Watcher drain task stopping: bridge closed");
                        break;
                    };
                    match store
                        .update_from_log(update.project, update.session_id, update.path)
                        .await
                    {
                        Ok(_) => {}
                        Err(StoreError::ChannelClosed) => {
                            debug!("Watcher drain task stopping: store closed");
                            break;
                        }
                        Err(e) => {
                            // Partial writes and truncations resolve on the
                            // next event for the same file
                            debug!(error = %e, "Transcript update failed");
                        }
                    }
                }
            }
        }
    });
}

/// True for event kinds that indicate transcript content changed.
fn is_write_event(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Transcript paths touched by an event.
fn transcript_paths(event: &Event) -> impl Iterator<Item = &Path> {
    event
        .paths
        .iter()
        .map(PathBuf::as_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
}

/// Builds a store update for a transcript path.
fn resolve_update(path: &Path, names: &mut HashMap<String, String>) -> Option<LogUpdate> {
    let dir_name = path.parent()?.file_name()?.to_str()?;

    let project = match names.get(dir_name) {
        Some(name) => name.clone(),
        None => {
            let name = resolve_project_name(dir_name);
            names.insert(dir_name.to_string(), name.clone());
            name
        }
    };

    let session_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(String::from);

    Some(LogUpdate {
        project,
        session_id,
        path: path.to_path_buf(),
    })
}

/// Recovers a project name from Claude's flattened directory name.
///
/// Claude encodes the project path by replacing every `/` with `-`, so
/// `/Users/sho/work/my-project` becomes `-Users-sho-work-my-project`.
/// Dashes inside the project name are indistinguishable from path
/// separators, so each dash is tried (rightmost first) as the final
/// separator and the first candidate that exists on disk wins. When
/// nothing matches, the segment after the last dash is used as-is.
pub fn resolve_project_name(dir_name: &str) -> String {
    let trimmed = dir_name.strip_prefix('-').unwrap_or(dir_name);

    let dashes: Vec<usize> = trimmed.match_indices('-').map(|(i, _)| i).collect();
    for &i in dashes.iter().rev() {
        let parent = trimmed[..i].replace('-', "/");
        let leaf = &trimmed[i + 1..];
        if leaf.is_empty() {
            continue;
        }
        let candidate = PathBuf::from(format!("/{parent}/{leaf}"));
        if candidate.is_dir() {
            return leaf.to_string();
        }
    }

    trimmed
        .rsplit('-')
        .next()
        .unwrap_or(trimmed)
        .to_string()
}
