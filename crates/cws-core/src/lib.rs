//! CWS Core - Shared types for Claude Code session watching
//!
//! This crate provides the domain types shared between the daemon (cwsd)
//! and the CLI (cws): transcript entry parsing, state classification,
//! idle timeout policy, and the project status model.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod hook;
pub mod status;
pub mod timeout;

// Re-exports for convenience
pub use classify::{classify, has_pending_tool, icons, is_text_at_rest, EntryState};
pub use entry::{read_last_entry, ContentItem, ContentKind, EntryKind, EntryMessage, LogEntry};
pub use error::{CoreError, CoreResult};
pub use hook::{hook_state, project_name_from_cwd, HookEventType};
pub use status::{ProjectStatus, StatusEvent, StatusEventKind, StatusSource};
pub use timeout::{tool_threshold, IDLE_FLOOR, STALE_CEILING};
