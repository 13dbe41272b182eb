//! CWS Daemon - project status store and broadcast server
//!
//! This crate provides the core infrastructure for the cwsd daemon:
//! - `store` - Status store actor tracking per-project session state
//! - `watcher` - Filesystem watcher for Claude Code transcript files
//! - `scanner` - Periodic idle detection over stored statuses
//! - `server` - Unix socket server for hook events and CLI clients
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       cwsd daemon                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │ LogWatcher   │──▶│  StoreActor  │◀──│  DaemonServer  │  │
//! │  │ (transcripts)│   │ (state owner)│   │ (Unix socket)  │  │
//! │  └──────────────┘   └──────┬───────┘   └───────┬────────┘  │
//! │  ┌──────────────┐          │ events            │           │
//! │  │ IdleScanner  │──────────┤                   ▼           │
//! │  │ (5s ticks)   │          ▼           ConnectionHandler   │
//! │  └──────────────┘   broadcast::Sender  (per client)        │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

pub mod scanner;
pub mod server;
pub mod store;
pub mod watcher;
