//! Daemon connection client for the cws CLI.
//!
//! This module provides the `DaemonClient` which handles:
//! - Connection to the daemon via Unix socket
//! - Automatic reconnection with exponential backoff
//! - Parsing and forwarding daemon messages to the consumer loop
//!
//! It also provides [`push_hook_event`], the one-shot path used by the
//! `cws hook` subcommand to forward a hook payload and disconnect.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free
//! guidelines. No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`,
//! or `todo!()`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{CliError, Result};
use cws_core::{ProjectStatus, StatusEventKind};
use cws_protocol::{ClientMessage, DaemonMessage, ProtocolVersion};

// ============================================================================
// Events
// ============================================================================

/// Events forwarded from the daemon to the consumer loop.
#[derive(Debug)]
pub enum ClientEvent {
    /// Full status snapshot, sent once after subscribing.
    Snapshot(Vec<ProjectStatus>),

    /// A single project's status changed.
    Changed {
        kind: StatusEventKind,
        project: Box<ProjectStatus>,
    },

    /// Connection to the daemon was lost; the client is retrying.
    Disconnected,
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the daemon client.
///
/// Controls connection behavior including socket path and retry logic.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path to the Unix socket where the daemon listens.
    pub socket_path: PathBuf,

    /// Initial delay before first retry after connection failure.
    pub retry_initial_delay: Duration,

    /// Maximum delay between retry attempts.
    pub retry_max_delay: Duration,

    /// Multiplier for exponential backoff (e.g., 2.0 doubles delay each retry).
    pub retry_multiplier: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: cws_core::config::socket_path(),
            retry_initial_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(30),
            retry_multiplier: 2.0,
        }
    }
}

// ============================================================================
// Daemon Client
// ============================================================================

/// Client for communicating with the cwsd daemon.
///
/// The `DaemonClient` manages the connection to the daemon, handles
/// automatic reconnection with exponential backoff, and forwards
/// status updates to the consumer via the event channel.
///
/// # Connection Lifecycle
///
/// 1. Client attempts to connect to the Unix socket
/// 2. On success, sends a `Connect` message and waits for `Connected`
/// 3. Sends a `Subscribe` message; the daemon replies with a snapshot
/// 4. Reads messages in a loop, forwarding status changes
/// 5. On disconnect, emits [`ClientEvent::Disconnected`] and retries
pub struct DaemonClient {
    /// Configuration for connection behavior.
    config: ClientConfig,

    /// Channel to send events to the consumer loop.
    event_tx: mpsc::UnboundedSender<ClientEvent>,

    /// Cancellation token for graceful shutdown.
    cancel_token: CancellationToken,
}

impl DaemonClient {
    /// Creates a new daemon client.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        event_tx: mpsc::UnboundedSender<ClientEvent>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            event_tx,
            cancel_token,
        }
    }

    /// Creates a new daemon client with default configuration.
    #[must_use]
    pub fn with_defaults(
        event_tx: mpsc::UnboundedSender<ClientEvent>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self::new(ClientConfig::default(), event_tx, cancel_token)
    }

    /// Main loop that maintains connection to the daemon.
    ///
    /// Runs until the cancellation token is triggered. Handles
    /// connection, reconnection, and message processing.
    pub async fn run(&self) {
        info!(
            socket_path = %self.config.socket_path.display(),
            "Daemon client starting"
        );

        loop {
            if self.cancel_token.is_cancelled() {
                info!("Daemon client shutting down (cancelled)");
                return;
            }

            match self.connect_with_retry().await {
                Ok(stream) => {
                    info!("Connected to daemon");

                    if let Err(e) = self.handle_connection(stream).await {
                        warn!(error = %e, "Connection ended with error");
                    }

                    // Ignore send errors, the consumer may be shutting down
                    let _ = self.event_tx.send(ClientEvent::Disconnected);
                }
                Err(e) => {
                    if !self.cancel_token.is_cancelled() {
                        error!(error = %e, "Failed to connect to daemon");
                    }
                }
            }

            if self.cancel_token.is_cancelled() {
                info!("Daemon client shutting down (cancelled)");
                return;
            }
        }
    }

    /// Attempts to connect to the daemon with exponential backoff.
    ///
    /// Retries indefinitely until successful or cancelled. The delay
    /// starts at `retry_initial_delay` and caps at `retry_max_delay`.
    async fn connect_with_retry(&self) -> Result<UnixStream> {
        let mut delay = self.config.retry_initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt = attempt.saturating_add(1);

            debug!(
                attempt,
                socket_path = %self.config.socket_path.display(),
                "Attempting to connect to daemon"
            );

            if !self.config.socket_path.exists() {
                if attempt == 1 {
                    warn!(
                        socket_path = %self.config.socket_path.display(),
                        "Daemon socket not found, will retry"
                    );
                }
            } else {
                match UnixStream::connect(&self.config.socket_path).await {
                    Ok(stream) => {
                        debug!(attempt, "Connection successful");
                        return Ok(stream);
                    }
                    Err(e) => {
                        debug!(attempt, error = %e, "Connection attempt failed");
                    }
                }
            }

            tokio::select! {
                _ = sleep(delay) => {
                    let next_delay_ms =
                        (delay.as_millis() as f64 * self.config.retry_multiplier) as u64;
                    delay = Duration::from_millis(next_delay_ms).min(self.config.retry_max_delay);
                }
                _ = self.cancel_token.cancelled() => {
                    info!("Connection retry cancelled");
                    return Err(CliError::DaemonConnection("cancelled".to_string()));
                }
            }
        }
    }

    /// Handles an established connection to the daemon.
    ///
    /// Performs the handshake, subscribes to status events, and reads
    /// messages until disconnect.
    async fn handle_connection(&self, stream: UnixStream) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut buf_reader = BufReader::new(reader);

        write_message(&mut writer, &ClientMessage::connect(None)).await?;

        let mut line = String::new();
        buf_reader.read_line(&mut line).await?;

        let response: DaemonMessage = serde_json::from_str(line.trim())?;
        match response {
            DaemonMessage::Connected {
                protocol_version,
                client_id,
            } => {
                if !ProtocolVersion::CURRENT.is_compatible_with(&protocol_version) {
                    return Err(CliError::VersionMismatch {
                        client_version: ProtocolVersion::CURRENT.to_string(),
                        daemon_version: protocol_version.to_string(),
                    });
                }
                info!(
                    client_id,
                    protocol_version = %protocol_version,
                    "Handshake complete"
                );
            }
            DaemonMessage::Rejected {
                reason: _,
                protocol_version,
            } => {
                return Err(CliError::VersionMismatch {
                    client_version: ProtocolVersion::CURRENT.to_string(),
                    daemon_version: protocol_version.to_string(),
                });
            }
            _ => {
                return Err(CliError::Protocol(format!(
                    "Unexpected response to connect: {response:?}"
                )));
            }
        }

        // Subscribe; the daemon answers with a full status snapshot
        write_message(&mut writer, &ClientMessage::subscribe()).await?;

        self.message_loop(&mut buf_reader).await
    }

    /// Reads newline-delimited JSON messages until EOF or cancellation.
    async fn message_loop<R>(&self, reader: &mut R) -> Result<()>
    where
        R: AsyncBufReadExt + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            tokio::select! {
                read_result = reader.read_line(&mut line) => {
                    match read_result {
                        Ok(0) => {
                            info!("Daemon closed connection");
                            return Ok(());
                        }
                        Ok(_) => {
                            if let Err(e) = self.handle_message(line.trim()) {
                                warn!(error = %e, line = %line.trim(), "Failed to handle message");
                                // Keep reading, one bad line is not fatal
                            }
                        }
                        Err(e) => {
                            return Err(CliError::Io(e));
                        }
                    }
                }

                _ = self.cancel_token.cancelled() => {
                    debug!("Message loop cancelled");
                    return Ok(());
                }
            }
        }
    }

    /// Handles a single message from the daemon.
    fn handle_message(&self, line: &str) -> Result<()> {
        let message: DaemonMessage = serde_json::from_str(line)?;

        match message {
            DaemonMessage::StatusSnapshot { projects } => {
                debug!(count = projects.len(), "Received status snapshot");
                let _ = self.event_tx.send(ClientEvent::Snapshot(projects));
            }
            DaemonMessage::StatusChanged { kind, project } => {
                debug!(project = %project.name, kind = %kind, "Received status change");
                let _ = self.event_tx.send(ClientEvent::Changed { kind, project });
            }
            DaemonMessage::Pong { seq } => {
                debug!(seq, "Received pong");
            }
            DaemonMessage::Error { message, code } => {
                warn!(
                    error_message = %message,
                    error_code = ?code,
                    "Received error from daemon"
                );
            }
            DaemonMessage::Connected { .. } | DaemonMessage::Rejected { .. } => {
                warn!("Received unexpected handshake message after connection");
            }
        }

        Ok(())
    }
}

// ============================================================================
// One-Shot Hook Push
// ============================================================================

/// Forwards a raw hook payload to the daemon and disconnects.
///
/// Used by the `cws hook` subcommand. Performs a full handshake so the
/// daemon can reject incompatible clients, then sends the payload as a
/// `HookEvent` message.
pub async fn push_hook_event(socket_path: &Path, data: serde_json::Value) -> Result<()> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| CliError::DaemonConnection(e.to_string()))?;
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);

    write_message(&mut writer, &ClientMessage::connect(None)).await?;

    let mut line = String::new();
    buf_reader.read_line(&mut line).await?;

    match serde_json::from_str::<DaemonMessage>(line.trim())? {
        DaemonMessage::Connected { .. } => {}
        DaemonMessage::Rejected { reason, .. } => {
            return Err(CliError::DaemonConnection(reason));
        }
        other => {
            return Err(CliError::Protocol(format!(
                "Unexpected response to connect: {other:?}"
            )));
        }
    }

    write_message(&mut writer, &ClientMessage::hook_event(data)).await?;
    write_message(&mut writer, &ClientMessage::disconnect()).await?;

    Ok(())
}

/// Serializes a message and writes it newline-delimited.
async fn write_message<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    message: &ClientMessage,
) -> Result<()> {
    let json = serde_json::to_string(message)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    debug!(message_type = ?message.message, "Sent message to daemon");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cws_core::StatusSource;

    // ------------------------------------------------------------------------
    // ClientConfig Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();

        assert_eq!(config.socket_path, cws_core::config::socket_path());
        assert_eq!(config.retry_initial_delay, Duration::from_secs(1));
        assert_eq!(config.retry_max_delay, Duration::from_secs(30));
        assert!((config.retry_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_client_config_custom() {
        let config = ClientConfig {
            socket_path: PathBuf::from("/custom/path.sock"),
            retry_initial_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(60),
            retry_multiplier: 1.5,
        };

        assert_eq!(config.socket_path, PathBuf::from("/custom/path.sock"));
        assert_eq!(config.retry_initial_delay, Duration::from_millis(500));
    }

    // ------------------------------------------------------------------------
    // Message Handling Tests
    // ------------------------------------------------------------------------

    fn create_test_client() -> (DaemonClient, mpsc::UnboundedReceiver<ClientEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        let client = DaemonClient::with_defaults(event_tx, cancel_token);
        (client, event_rx)
    }

    fn create_test_status(name: &str) -> ProjectStatus {
        ProjectStatus {
            name: name.to_string(),
            icon: "⏳".to_string(),
            state: "processing".to_string(),
            detail: None,
            updated_at: Utc::now(),
            session_id: Some("sess-1".to_string()),
            source: StatusSource::Push,
            file_path: None,
            file_time: None,
            tool_name: None,
            is_estimated: false,
        }
    }

    #[tokio::test]
    async fn test_handle_message_snapshot() {
        let (client, mut rx) = create_test_client();

        let msg = DaemonMessage::status_snapshot(vec![create_test_status("alpha")]);
        let json = serde_json::to_string(&msg).unwrap();

        client.handle_message(&json).unwrap();

        let event = rx.try_recv().unwrap();
        match event {
            ClientEvent::Snapshot(projects) => {
                assert_eq!(projects.len(), 1);
                assert_eq!(projects[0].name, "alpha");
            }
            other => panic!("Expected Snapshot event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_message_status_changed() {
        let (client, mut rx) = create_test_client();

        let msg = DaemonMessage::status_changed(
            StatusEventKind::IdleApproval,
            create_test_status("beta"),
        );
        let json = serde_json::to_string(&msg).unwrap();

        client.handle_message(&json).unwrap();

        let event = rx.try_recv().unwrap();
        match event {
            ClientEvent::Changed { kind, project } => {
                assert_eq!(kind, StatusEventKind::IdleApproval);
                assert_eq!(project.name, "beta");
            }
            other => panic!("Expected Changed event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_message_pong_no_event() {
        let (client, mut rx) = create_test_client();

        let json = serde_json::to_string(&DaemonMessage::pong(42)).unwrap();
        client.handle_message(&json).unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_message_error_no_event() {
        let (client, mut rx) = create_test_client();

        let json = serde_json::to_string(&DaemonMessage::error("test error")).unwrap();
        client.handle_message(&json).unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_message_invalid_json() {
        let (client, _rx) = create_test_client();

        assert!(client.handle_message("not valid json").is_err());
    }

    // ------------------------------------------------------------------------
    // Exponential Backoff Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_exponential_backoff_calculation() {
        let config = ClientConfig::default();

        let delay1 = config.retry_initial_delay;
        assert_eq!(delay1, Duration::from_secs(1));

        let delay2_ms = (delay1.as_millis() as f64 * config.retry_multiplier) as u64;
        let delay2 = Duration::from_millis(delay2_ms);
        assert_eq!(delay2, Duration::from_secs(2));

        let delay3_ms = (delay2.as_millis() as f64 * config.retry_multiplier) as u64;
        let delay3 = Duration::from_millis(delay3_ms);
        assert_eq!(delay3, Duration::from_secs(4));
    }

    #[test]
    fn test_exponential_backoff_max_cap() {
        let config = ClientConfig {
            retry_max_delay: Duration::from_secs(10),
            retry_multiplier: 10.0,
            ..Default::default()
        };

        let delay1 = config.retry_initial_delay;
        let delay2_ms = (delay1.as_millis() as f64 * config.retry_multiplier) as u64;
        let delay2 = Duration::from_millis(delay2_ms).min(config.retry_max_delay);
        assert_eq!(delay2, Duration::from_secs(10));

        let delay3_ms = (delay2.as_millis() as f64 * config.retry_multiplier) as u64;
        let delay3 = Duration::from_millis(delay3_ms).min(config.retry_max_delay);
        assert_eq!(delay3, Duration::from_secs(10));
    }

    // ------------------------------------------------------------------------
    // Cancellation Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_client_respects_cancellation() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        let config = ClientConfig {
            // Non-existent socket so the client hits the retry loop
            socket_path: PathBuf::from("/tmp/nonexistent-cws-test.sock"),
            retry_initial_delay: Duration::from_millis(10),
            ..Default::default()
        };

        let client = DaemonClient::new(config, tx, cancel_token.clone());

        cancel_token.cancel();

        let start = std::time::Instant::now();
        client.run().await;
        let elapsed = start.elapsed();

        assert!(elapsed < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_push_hook_event_no_daemon() {
        let result = push_hook_event(
            Path::new("/tmp/nonexistent-cws-test.sock"),
            serde_json::json!({"session_id": "s", "hook_event_name": "Stop"}),
        )
        .await;

        assert!(matches!(result, Err(CliError::DaemonConnection(_))));
    }
}
