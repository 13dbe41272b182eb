//! Client interface for interacting with the StoreActor.
//!
//! The `StoreHandle` provides a cheap-to-clone interface for sending commands
//! to the store actor and subscribing to status events.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Channel errors are mapped to `StoreError::ChannelClosed`

use std::path::PathBuf;

use tokio::sync::{broadcast, mpsc, oneshot};

use cws_core::{ProjectStatus, StatusEvent, StatusEventKind};

use super::commands::{PushUpdate, StoreCommand, StoreError};

/// Handle for interacting with the store actor.
///
/// This is a cheap-to-clone handle that can be shared across tasks.
/// All methods are async and communicate with the actor via channels.
#[derive(Clone)]
pub struct StoreHandle {
    /// Command sender to the actor
    sender: mpsc::Sender<StoreCommand>,

    /// Event broadcaster for subscribing to updates
    event_sender: broadcast::Sender<StatusEvent>,
}

impl StoreHandle {
    /// Create a new store handle.
    pub fn new(
        sender: mpsc::Sender<StoreCommand>,
        event_sender: broadcast::Sender<StatusEvent>,
    ) -> Self {
        Self {
            sender,
            event_sender,
        }
    }

    /// Update a project status from its transcript tail.
    ///
    /// Returns `Ok(None)` when the last entry carries no state signal.
    ///
    /// # Errors
    ///
    /// - `StoreError::Transcript` if the file cannot be read or parsed
    /// - `StoreError::ChannelClosed` if the actor has shut down
    pub async fn update_from_log(
        &self,
        project: String,
        session_id: Option<String>,
        path: PathBuf,
    ) -> Result<Option<ProjectStatus>, StoreError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(StoreCommand::UpdateFromLog {
                project,
                session_id,
                path,
                respond_to: tx,
            })
            .await
            .map_err(|_| StoreError::ChannelClosed)?;

        rx.await.map_err(|_| StoreError::ChannelClosed)?
    }

    /// Apply a hook-sourced status update.
    ///
    /// # Errors
    ///
    /// - `StoreError::ChannelClosed` if the actor has shut down
    pub async fn update_from_push(&self, update: PushUpdate) -> Result<ProjectStatus, StoreError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(StoreCommand::UpdateFromPush {
                update,
                respond_to: tx,
            })
            .await
            .map_err(|_| StoreError::ChannelClosed)?;

        rx.await.map_err(|_| StoreError::ChannelClosed)
    }

    /// Mark a project as idle.
    ///
    /// This is a fire-and-forget operation - it does not wait for the
    /// store to apply the change or return any result.
    pub async fn mark_idle(
        &self,
        project: String,
        icon: &'static str,
        state: &'static str,
        is_estimated: bool,
        kind: StatusEventKind,
    ) {
        // Fire-and-forget: ignore send errors (actor may be shutting down)
        let _ = self
            .sender
            .send(StoreCommand::MarkIdle {
                project,
                icon,
                state,
                is_estimated,
                kind,
            })
            .await;
    }

    /// Get all project statuses, sorted by name.
    ///
    /// Returns an empty vector if no projects are tracked or if
    /// communication with the actor fails.
    pub async fn get_all(&self) -> Vec<ProjectStatus> {
        let (tx, rx) = oneshot::channel();

        if self
            .sender
            .send(StoreCommand::GetAll { respond_to: tx })
            .await
            .is_err()
        {
            return Vec::new();
        }

        rx.await.unwrap_or_default()
    }

    /// Subscribe to status events.
    ///
    /// Returns a broadcast receiver that will receive all status events
    /// (updates and idle conclusions) published by the store actor.
    ///
    /// This is a synchronous operation - it doesn't communicate with the actor.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.event_sender.subscribe()
    }

    /// Check if the actor is still running.
    ///
    /// Returns `true` if the command channel is still open.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cws_core::icons;

    fn create_test_handle() -> (StoreHandle, mpsc::Receiver<StoreCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, _event_rx) = broadcast::channel(16);
        let handle = StoreHandle::new(cmd_tx, event_tx);
        (handle, cmd_rx)
    }

    #[tokio::test]
    async fn test_handle_is_clone() {
        let (handle, _rx) = create_test_handle();
        let _cloned = handle.clone();
    }

    #[tokio::test]
    async fn test_update_from_log_sends_command() {
        let (handle, mut rx) = create_test_handle();

        let cmd_handler = tokio::spawn(async move {
            if let Some(StoreCommand::UpdateFromLog {
                project,
                session_id,
                path,
                respond_to,
            }) = rx.recv().await
            {
                assert_eq!(project, "myproject");
                assert_eq!(session_id.as_deref(), Some("sess-1"));
                assert_eq!(path, PathBuf::from("/tmp/sess-1.jsonl"));
                let _ = respond_to.send(Ok(None));
                return true;
            }
            false
        });

        let result = handle
            .update_from_log(
                "myproject".to_string(),
                Some("sess-1".to_string()),
                PathBuf::from("/tmp/sess-1.jsonl"),
            )
            .await;
        assert!(matches!(result, Ok(None)));
        assert!(cmd_handler.await.unwrap());
    }

    #[tokio::test]
    async fn test_update_from_log_channel_closed_error() {
        let (handle, rx) = create_test_handle();
        drop(rx);

        let result = handle
            .update_from_log("p".to_string(), None, PathBuf::from("/tmp/x.jsonl"))
            .await;
        assert!(matches!(result, Err(StoreError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_get_all_returns_empty_on_channel_close() {
        let (handle, rx) = create_test_handle();
        drop(rx);

        let result = handle.get_all().await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_mark_idle_fire_and_forget() {
        let (handle, mut rx) = create_test_handle();

        let cmd_handler = tokio::spawn(async move {
            matches!(
                rx.recv().await,
                Some(StoreCommand::MarkIdle {
                    kind: StatusEventKind::IdleApproval,
                    ..
                })
            )
        });

        handle
            .mark_idle(
                "myproject".to_string(),
                icons::IDLE_ESTIMATED,
                "waiting approval",
                true,
                StatusEventKind::IdleApproval,
            )
            .await;
        assert!(cmd_handler.await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_idle_ignores_closed_channel() {
        let (handle, rx) = create_test_handle();
        drop(rx);

        // Should not panic or error
        handle
            .mark_idle(
                "myproject".to_string(),
                icons::IDLE_CONFIRMED,
                "waiting approval",
                false,
                StatusEventKind::IdleApproval,
            )
            .await;
    }

    #[tokio::test]
    async fn test_subscribe_returns_receiver() {
        let (handle, _rx) = create_test_handle();
        let _subscriber = handle.subscribe();
    }

    #[tokio::test]
    async fn test_is_connected() {
        let (handle, rx) = create_test_handle();

        assert!(handle.is_connected());

        drop(rx);
        let _ = handle
            .sender
            .send(StoreCommand::GetAll {
                respond_to: oneshot::channel().0,
            })
            .await;

        assert!(!handle.is_connected());
    }
}
