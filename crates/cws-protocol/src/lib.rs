//! CWS Protocol - Wire protocol for daemon communication
//!
//! This crate provides message types and parsing for communication
//! between Claude Code hook scripts and the daemon, and between the
//! daemon and CLI clients.

pub mod message;
pub mod parse;
pub mod version;

pub use message::{ClientMessage, DaemonMessage, MessageType};
pub use parse::RawHookEvent;
pub use version::ProtocolVersion;
