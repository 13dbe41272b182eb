//! CWS CLI - Library modules
//!
//! This library provides the client-side components for watching Claude
//! Code session status.
//!
//! # Architecture
//!
//! The CLI uses an event-driven architecture with two main components:
//!
//! 1. **Daemon Client Task**: Maintains connection to the daemon and forwards status events
//! 2. **Consumer Loop**: Renders events as a line stream or dashboard and drives notifications
//!
//! All tasks respect a shared `CancellationToken` for graceful shutdown.

pub mod client;
pub mod daemon;
pub mod dashboard;
pub mod error;
pub mod notifier;
pub mod stream;

// Re-export commonly used types
pub use client::{ClientConfig, ClientEvent, DaemonClient};
pub use error::{CliError, Result};
