//! Idle scanner - periodic detection of silently stalled sessions.
//!
//! Claude Code writes nothing to the transcript while it sits on a
//! permission prompt, so a session waiting for approval looks identical
//! to one that is busy. The scanner walks all stored statuses every few
//! seconds and reclassifies the ones that have been silent longer than
//! their current tool's trust threshold.
//!
//! Detections never mutate state directly: the scanner sends `MarkIdle`
//! to the store, which applies the change and broadcasts it. A seen-key
//! set keeps each conclusion from firing more than once per transcript
//! position.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cws_core::{
    has_pending_tool, icons, is_text_at_rest, read_last_entry, tool_threshold, LogEntry,
    ProjectStatus, StatusEvent, StatusEventKind, StatusSource, IDLE_FLOOR, STALE_CEILING,
};

use crate::store::StoreHandle;

/// How often the scanner walks the store.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(5);

/// An idle conclusion for one project, not yet applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleCandidate {
    pub kind: StatusEventKind,
    pub icon: &'static str,
    pub state: &'static str,
    pub is_estimated: bool,
}

/// Spawns the idle scanner task.
///
/// Runs until the cancellation token is triggered.
pub fn spawn_scanner(store: StoreHandle, cancel: CancellationToken) {
    tokio::spawn(async move {
        info!(interval_secs = SCAN_INTERVAL.as_secs(), "Idle scanner starting");

        // Keys of conclusions already applied. Keyed by transcript
        // position, so entries become unreachable as files advance.
        let mut seen: HashSet<String> = HashSet::new();
        let mut ticker = interval(SCAN_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Idle scanner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    scan(&store, &mut seen).await;
                }
            }
        }
    });
}

/// One scan pass over all stored statuses.
async fn scan(store: &StoreHandle, seen: &mut HashSet<String>) {
    let now = Utc::now();

    for status in store.get_all().await {
        let candidate = match status.source {
            StatusSource::Push => evaluate_push_idle(&status, now),
            StatusSource::Log => evaluate_log_status(&status, now),
        };

        let Some(candidate) = candidate else {
            continue;
        };

        // One notification per (project, file, mtime, kind)
        let key = StatusEvent {
            kind: candidate.kind,
            project: status.clone(),
        }
        .idle_key();

        if !seen.insert(key) {
            continue;
        }

        debug!(
            project = %status.name,
            state = candidate.state,
            estimated = candidate.is_estimated,
            "Idle detected"
        );

        store
            .mark_idle(
                status.name.clone(),
                candidate.icon,
                candidate.state,
                candidate.is_estimated,
                candidate.kind,
            )
            .await;
    }
}

/// Evaluates a push-sourced status for idleness.
///
/// Hooks give us no transcript position, so the only reliable signal is
/// a `processing` state (PostToolUse fired, nothing since) that has sat
/// past its tool's threshold. Anything else stays as the hook left it.
pub fn evaluate_push_idle(status: &ProjectStatus, now: DateTime<Utc>) -> Option<IdleCandidate> {
    if status.state != "processing" {
        return None;
    }

    let idle = elapsed(status.updated_at, now)?;
    let threshold = tool_threshold(status.tool_name.as_deref().unwrap_or_default());

    if idle >= threshold && idle <= STALE_CEILING {
        Some(IdleCandidate {
            kind: StatusEventKind::IdleApproval,
            icon: icons::IDLE_ESTIMATED,
            state: "waiting approval",
            is_estimated: true,
        })
    } else {
        None
    }
}

/// Evaluates a log-sourced status: measure silence from the transcript
/// mtime and re-read the tail to see what the session stopped on.
fn evaluate_log_status(status: &ProjectStatus, now: DateTime<Utc>) -> Option<IdleCandidate> {
    let path = status.file_path.as_ref()?;
    let file_time = status.file_time?;

    let idle = elapsed(file_time, now)?;
    if idle < IDLE_FLOOR || idle > STALE_CEILING {
        return None;
    }

    let entry = match read_last_entry(path) {
        Ok(Some(entry)) => entry,
        Ok(None) => return None,
        Err(e) => {
            // File may have rotated or vanished; skip this round
            debug!(
                project = %status.name,
                path = %path.display(),
                error = %e,
                "Could not re-read transcript, skipping"
            );
            return None;
        }
    };

    evaluate_log_idle(&entry, idle)
}

/// Pure idle evaluation over a transcript tail entry.
///
/// Two shapes matter:
/// - An unanswered tool_use past its threshold means the permission
///   prompt is up. Confirmed when the threshold is the base floor
///   (silence that short already rules out a running tool), estimated
///   for tools with longer windows.
/// - Plain text at rest past the floor means the turn finished without
///   an `end_turn` ever being written.
pub fn evaluate_log_idle(entry: &LogEntry, idle: Duration) -> Option<IdleCandidate> {
    if idle < IDLE_FLOOR || idle > STALE_CEILING {
        return None;
    }

    if has_pending_tool(entry) {
        let tool = entry
            .message
            .as_ref()
            .and_then(|m| m.last_tool_name())
            .unwrap_or_default();
        let threshold = tool_threshold(tool);

        if idle >= threshold {
            let is_estimated = threshold > IDLE_FLOOR;
            return Some(IdleCandidate {
                kind: StatusEventKind::IdleApproval,
                icon: if is_estimated {
                    icons::IDLE_ESTIMATED
                } else {
                    icons::IDLE_CONFIRMED
                },
                state: "waiting approval",
                is_estimated,
            });
        }
        return None;
    }

    if is_text_at_rest(entry) {
        return Some(IdleCandidate {
            kind: StatusEventKind::IdleCompleted,
            icon: icons::IDLE_ESTIMATED,
            state: "completed",
            is_estimated: true,
        });
    }

    None
}

/// Wall-clock duration since `earlier`. `None` when the clock appears
/// to have gone backwards.
fn elapsed(earlier: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (now - earlier).to_std().ok()
}
