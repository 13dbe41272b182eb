//! Project status store using the Actor pattern.
//!
//! The store is the central state manager for all tracked projects.
//! It receives commands via a tokio mpsc channel and maintains the
//! canonical source of truth for session state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │ Watcher/Server  │────▶│   StoreActor    │────▶│ Broadcast Channel│
//! └─────────────────┘     └─────────────────┘     └──────────────────┘
//!         │                       │                       │
//!         │   StoreCommand        │   StatusEvent         │
//!         │   (mpsc channel)      │   (broadcast)         │
//!         ▼                       ▼                       ▼
//!    Log/push updates      HashMap<String,          CLI clients
//!                          ProjectStatus>           receive events
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All operations in this module follow the panic-free policy:
//! - No `.unwrap()` or `.expect()` in production code
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

use tokio::sync::{broadcast, mpsc};

mod actor;
mod commands;
mod handle;

pub use actor::StoreActor;
pub use commands::{PushUpdate, StoreCommand, StoreError};
pub use handle::StoreHandle;

/// Channel buffer sizes
const COMMAND_BUFFER: usize = 100;
const EVENT_BUFFER: usize = 100;

/// Spawn the store actor and return a handle for interaction.
///
/// This function:
/// 1. Creates command and event channels
/// 2. Spawns the StoreActor on a tokio task
/// 3. Returns a StoreHandle for client use
pub fn spawn_store() -> StoreHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let actor = StoreActor::new(cmd_rx, event_tx.clone());
    tokio::spawn(actor.run());

    StoreHandle::new(cmd_tx, event_tx)
}
