//! Project status model and status events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    /// Derived from the session transcript (JSONL tail).
    Log,
    /// Pushed by a Claude Code hook. Authoritative.
    Push,
}

/// Current status of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub name: String,
    pub icon: String,
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    pub source: StatusSource,

    /// Transcript path, for log-sourced statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Transcript mtime at the time of the update. Idle detection for
    /// log-sourced statuses measures from here, not from `updated_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_time: Option<DateTime<Utc>>,

    /// Current tool name, for timeout lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// True when the state comes from timeout heuristics rather than
    /// an observed event.
    #[serde(default)]
    pub is_estimated: bool,
}

/// The kind of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEventKind {
    /// Regular status change from a log or push update.
    Update,
    /// Idle scanner concluded the session is waiting for approval.
    IdleApproval,
    /// Idle scanner concluded the session finished its turn.
    IdleCompleted,
}

impl StatusEventKind {
    /// True for the two scanner-produced kinds.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::IdleApproval | Self::IdleCompleted)
    }
}

impl fmt::Display for StatusEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::IdleApproval => write!(f, "idle_approval"),
            Self::IdleCompleted => write!(f, "idle_completed"),
        }
    }
}

/// A status change, broadcast to all subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub kind: StatusEventKind,
    pub project: ProjectStatus,
}

impl StatusEvent {
    /// Deduplication key for idle notifications: one notification per
    /// (project, file, mtime, kind) until the file changes again.
    pub fn idle_key(&self) -> String {
        let path = self
            .project
            .file_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mtime = self
            .project
            .file_time
            .map(|t| t.timestamp_millis())
            .unwrap_or(0);
        format!("{}:{}:{}:{}", self.project.name, path, mtime, self.kind)
    }
}
