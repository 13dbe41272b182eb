//! Store actor commands and errors.
//!
//! This module defines the message types for communicating with the `StoreActor`:
//! - `StoreCommand`: Commands sent to the actor
//! - `PushUpdate`: Payload for hook-sourced status updates
//! - `StoreError`: Errors that can occur during store operations
//!
//! All types are designed for async message passing and follow the panic-free policy.

use std::path::PathBuf;

use cws_core::{ProjectStatus, StatusEventKind};
use thiserror::Error;
use tokio::sync::oneshot;

/// Hook-sourced status update.
///
/// Built by the server from a parsed hook event. Push updates are
/// authoritative: they overwrite whatever the log tail produced.
#[derive(Debug, Clone)]
pub struct PushUpdate {
    /// Project name (basename of the hook's cwd)
    pub project: String,
    /// Session that emitted the hook
    pub session_id: Option<String>,
    /// Status icon
    pub icon: &'static str,
    /// Human-readable state text
    pub state: String,
    /// Tool name for PreToolUse events, used by idle timeout lookups
    pub tool_name: Option<String>,
}

/// Commands sent to the store actor.
///
/// Each request-response command uses a oneshot channel for the reply.
/// `MarkIdle` is fire-and-forget.
#[derive(Debug)]
pub enum StoreCommand {
    /// Re-read a transcript's last entry and update the project status.
    ///
    /// Entries that carry no state signal (summaries, queue operations)
    /// resolve to `Ok(None)` and leave the stored status untouched.
    ///
    /// # Errors
    /// - `StoreError::Transcript` if the file cannot be read or parsed
    UpdateFromLog {
        /// Project name (resolved from the transcript directory)
        project: String,
        /// Session ID (transcript file stem)
        session_id: Option<String>,
        /// Path to the transcript file
        path: PathBuf,
        /// Channel to send the result
        respond_to: oneshot::Sender<Result<Option<ProjectStatus>, StoreError>>,
    },

    /// Apply a hook-sourced status update.
    ///
    /// Always succeeds; the new status overwrites the old one.
    UpdateFromPush {
        /// The update payload
        update: PushUpdate,
        /// Channel to send the stored status
        respond_to: oneshot::Sender<ProjectStatus>,
    },

    /// Mark a project as idle.
    ///
    /// Sent by the idle scanner. A no-op if the project is unknown.
    /// Fire-and-forget: the scanner already dedups its own detections.
    MarkIdle {
        /// Project to mark
        project: String,
        /// Idle icon (confirmed or estimated)
        icon: &'static str,
        /// Idle state text
        state: &'static str,
        /// Whether this is a heuristic rather than an observed state
        is_estimated: bool,
        /// Which idle conclusion was reached
        kind: StatusEventKind,
    },

    /// Get all project statuses, sorted by project name.
    GetAll {
        /// Channel to send the results
        respond_to: oneshot::Sender<Vec<ProjectStatus>>,
    },
}

/// Errors that can occur during store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A transcript file could not be read or parsed.
    #[error("transcript error at {path}: {reason}")]
    Transcript {
        /// Path to the offending transcript
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The response channel was closed before receiving a response.
    ///
    /// This typically indicates the actor was shut down.
    #[error("response channel closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Transcript {
            path: PathBuf::from("/tmp/sess.jsonl"),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/sess.jsonl"));
        assert!(err.to_string().contains("permission denied"));

        let err = StoreError::ChannelClosed;
        assert_eq!(err.to_string(), "response channel closed");
    }

    #[tokio::test]
    async fn test_command_oneshot_pattern() {
        let (tx, rx) = oneshot::channel::<Result<Option<ProjectStatus>, StoreError>>();

        tokio::spawn(async move {
            tx.send(Ok(None)).ok();
        });

        let result = rx.await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_command_channel_closed_error() {
        let (tx, rx) = oneshot::channel::<Vec<ProjectStatus>>();
        drop(tx);

        let result = rx.await;
        assert!(result.is_err());
    }
}
