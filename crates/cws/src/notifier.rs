//! Desktop notifications for idle and lifecycle events.
//!
//! Delivery shells out to the platform notifier: `osascript` on macOS,
//! `notify-send` elsewhere on Unix. Idle notifications are deduplicated
//! per (project, transcript, mtime, kind) so a session that sits idle
//! fires once, not every scanner tick.

use std::collections::HashSet;
use std::process::{Command, Stdio};

use tracing::debug;

use cws_core::{ProjectStatus, StatusEvent, StatusEventKind};

/// Notification title used for every message.
const TITLE: &str = "Claude Code";

/// Per-consumer notification gate.
pub struct Notifier {
    enabled: bool,

    /// Idle keys already notified. Grow-only; entries stop matching as
    /// soon as the transcript mtime advances.
    seen: HashSet<String>,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seen: HashSet::new(),
        }
    }

    /// Handles one status change.
    ///
    /// Returns the message that was delivered (or suppressed while
    /// disabled), or `None` when the event does not notify.
    pub fn handle(&mut self, kind: StatusEventKind, status: &ProjectStatus) -> Option<String> {
        let message = notification_message(kind, status)?;

        if kind.is_idle() {
            let key = StatusEvent {
                kind,
                project: status.clone(),
            }
            .idle_key();
            if !self.seen.insert(key) {
                debug!(project = %status.name, kind = %kind, "Idle notification deduplicated");
                return None;
            }
        }

        if self.enabled {
            deliver(&message);
        }

        Some(message)
    }
}

/// Maps a status change to a notification message, if it warrants one.
fn notification_message(kind: StatusEventKind, status: &ProjectStatus) -> Option<String> {
    match kind {
        StatusEventKind::IdleApproval => Some(format!("{}: waiting approval", status.name)),
        StatusEventKind::IdleCompleted => Some(format!("{}: completed", status.name)),
        StatusEventKind::Update => match status.state.as_str() {
            "session started" | "session ended" => {
                Some(format!("{}: {}", status.name, status.state))
            }
            _ => None,
        },
    }
}

/// Fires a desktop notification, best effort.
///
/// Spawn failures are logged and swallowed; a missing notifier binary
/// must not break the stream.
fn deliver(message: &str) {
    let result = notifier_command(message).spawn();
    if let Err(e) = result {
        debug!(error = %e, "Failed to spawn notifier");
    }
}

#[cfg(target_os = "macos")]
fn notifier_command(message: &str) -> Command {
    let escaped = message.replace('\\', "\\\\").replace('"', "\\\"");
    let script = format!(r#"display notification "{escaped}" with title "{TITLE}""#);

    let mut cmd = Command::new("osascript");
    cmd.arg("-e")
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

#[cfg(not(target_os = "macos"))]
fn notifier_command(message: &str) -> Command {
    let mut cmd = Command::new("notify-send");
    cmd.arg(TITLE)
        .arg(message)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cws_core::StatusSource;
    use std::path::PathBuf;

    fn idle_status(name: &str) -> ProjectStatus {
        ProjectStatus {
            name: name.to_string(),
            icon: "❓".to_string(),
            state: "waiting approval".to_string(),
            detail: None,
            updated_at: Utc::now(),
            session_id: None,
            source: StatusSource::Log,
            file_path: Some(PathBuf::from("/tmp/sess.jsonl")),
            file_time: Some(Utc::now()),
            tool_name: Some("Bash".to_string()),
            is_estimated: true,
        }
    }

    fn push_status(name: &str, state: &str) -> ProjectStatus {
        ProjectStatus {
            name: name.to_string(),
            icon: "👤".to_string(),
            state: state.to_string(),
            detail: None,
            updated_at: Utc::now(),
            session_id: None,
            source: StatusSource::Push,
            file_path: None,
            file_time: None,
            tool_name: None,
            is_estimated: false,
        }
    }

    #[test]
    fn test_idle_approval_message() {
        let mut notifier = Notifier::new(false);

        let message = notifier.handle(StatusEventKind::IdleApproval, &idle_status("myproject"));
        assert_eq!(message.as_deref(), Some("myproject: waiting approval"));
    }

    #[test]
    fn test_idle_completed_message() {
        let mut notifier = Notifier::new(false);

        let message = notifier.handle(StatusEventKind::IdleCompleted, &idle_status("p"));
        assert_eq!(message.as_deref(), Some("p: completed"));
    }

    #[test]
    fn test_idle_deduplicated_until_mtime_changes() {
        let mut notifier = Notifier::new(false);
        let status = idle_status("p");

        assert!(notifier
            .handle(StatusEventKind::IdleApproval, &status)
            .is_some());
        assert!(notifier
            .handle(StatusEventKind::IdleApproval, &status)
            .is_none());

        // A newer transcript write makes the key different again
        let mut newer = status.clone();
        newer.file_time = Some(Utc::now() + chrono::Duration::seconds(30));
        assert!(notifier
            .handle(StatusEventKind::IdleApproval, &newer)
            .is_some());
    }

    #[test]
    fn test_idle_kinds_deduplicated_separately() {
        let mut notifier = Notifier::new(false);
        let status = idle_status("p");

        assert!(notifier
            .handle(StatusEventKind::IdleApproval, &status)
            .is_some());
        assert!(notifier
            .handle(StatusEventKind::IdleCompleted, &status)
            .is_some());
    }

    #[test]
    fn test_session_lifecycle_notifies() {
        let mut notifier = Notifier::new(false);

        let started = notifier.handle(
            StatusEventKind::Update,
            &push_status("p", "session started"),
        );
        assert_eq!(started.as_deref(), Some("p: session started"));

        let ended = notifier.handle(StatusEventKind::Update, &push_status("p", "session ended"));
        assert_eq!(ended.as_deref(), Some("p: session ended"));
    }

    #[test]
    fn test_regular_updates_do_not_notify() {
        let mut notifier = Notifier::new(false);

        assert!(notifier
            .handle(StatusEventKind::Update, &push_status("p", "processing"))
            .is_none());
        assert!(notifier
            .handle(StatusEventKind::Update, &push_status("p", "running: Bash"))
            .is_none());
    }

    #[test]
    fn test_lifecycle_updates_not_deduplicated() {
        // Only idle kinds dedup; a session can start and end repeatedly
        let mut notifier = Notifier::new(false);
        let status = push_status("p", "session started");

        assert!(notifier.handle(StatusEventKind::Update, &status).is_some());
        assert!(notifier.handle(StatusEventKind::Update, &status).is_some());
    }
}
