//! Hook event types from Claude Code and their status mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::icons;

/// Types of hook events from Claude Code that carry a status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum HookEventType {
    /// When a new session starts
    SessionStart,

    /// When a session ends
    SessionEnd,

    /// After a tool is approved, right before it runs
    PreToolUse,

    /// After a tool completes execution
    PostToolUse,

    /// When the agent finishes its turn
    Stop,
}

impl HookEventType {
    /// Parses from a hook event name string.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "SessionStart" => Some(Self::SessionStart),
            "SessionEnd" => Some(Self::SessionEnd),
            "PreToolUse" => Some(Self::PreToolUse),
            "PostToolUse" => Some(Self::PostToolUse),
            "Stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for HookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionStart => write!(f, "SessionStart"),
            Self::SessionEnd => write!(f, "SessionEnd"),
            Self::PreToolUse => write!(f, "PreToolUse"),
            Self::PostToolUse => write!(f, "PostToolUse"),
            Self::Stop => write!(f, "Stop"),
        }
    }
}

/// Maps a hook event to an icon and state text.
///
/// Unrecognized events pass through with a generic icon so that new
/// hook types still show up in the stream.
pub fn hook_state(event_name: &str, tool_name: Option<&str>) -> (&'static str, String) {
    match HookEventType::from_event_name(event_name) {
        Some(HookEventType::SessionStart) => (icons::USER, "session started".to_string()),
        Some(HookEventType::SessionEnd) => (icons::SLEEPING, "session ended".to_string()),
        Some(HookEventType::PreToolUse) => {
            // PreToolUse fires after approval, so the tool is now running
            match tool_name.filter(|t| !t.is_empty()) {
                Some(tool) => (icons::TOOL, format!("running: {tool}")),
                None => (icons::TOOL, "running tool".to_string()),
            }
        }
        Some(HookEventType::PostToolUse) => (icons::PROCESSING, "processing".to_string()),
        Some(HookEventType::Stop) => (icons::COMPLETED, "completed".to_string()),
        None => (icons::GENERIC, event_name.to_string()),
    }
}

/// Extracts a project name from a working directory path.
///
/// Hook payloads carry the session's cwd; its basename is the project.
pub fn project_name_from_cwd(cwd: &str) -> String {
    let base = std::path::Path::new(cwd)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if base.is_empty() || base == "." || base == "/" {
        "unknown".to_string()
    } else {
        base
    }
}
