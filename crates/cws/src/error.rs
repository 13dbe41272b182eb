//! Error types for the cws CLI.
//!
//! Covers daemon communication, protocol parsing, and terminal setup
//! for the dashboard view.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free
//! guidelines. No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`,
//! or `todo!()`.

use std::io;
use thiserror::Error;

/// CLI application errors.
///
/// Most errors include actionable information for the user:
/// - Connection errors suggest checking if the daemon is running
/// - Version mismatches mean cws and cwsd are from different builds
#[derive(Error, Debug)]
pub enum CliError {
    /// Failed to connect to the daemon.
    #[error("Failed to connect to daemon: {0}")]
    DaemonConnection(String),

    /// Protocol version mismatch with the daemon.
    ///
    /// The CLI and daemon are running incompatible protocol versions.
    /// This typically happens when one side has been updated but not
    /// the other. Ensure both are the same version.
    #[error("Protocol version mismatch (client: {client_version}, daemon: {daemon_version})")]
    VersionMismatch {
        /// The protocol version this CLI supports.
        client_version: String,
        /// The protocol version the daemon is running.
        daemon_version: String,
    },

    /// Protocol parse or format error.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Failed to set up or restore the terminal for the dashboard.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// I/O error passthrough.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parse error passthrough.
    #[error("Failed to parse message: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
