//! Transcript entry classification.
//!
//! Maps the last transcript entry of a session to a human-readable state.
//! Classification is a pure function over the entry; idle heuristics live
//! in the scanner, which builds on the predicates at the bottom.

use crate::entry::{ContentKind, EntryKind, LogEntry};

/// Status icons used across the system.
pub mod icons {
    pub const USER: &str = "👤";
    pub const PROCESSING: &str = "⏳";
    pub const THINKING: &str = "🤔";
    pub const TOOL: &str = "🔧";
    pub const COMPLETED: &str = "✅";
    pub const WARNING: &str = "⚠️";
    pub const SLEEPING: &str = "💤";
    pub const IDLE_CONFIRMED: &str = "⏸️";
    pub const IDLE_ESTIMATED: &str = "❓";
    pub const GENERIC: &str = "🔄";
}

/// Classified state of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryState {
    pub icon: &'static str,
    pub text: String,
    /// Name of the tool being run, for timeout lookups.
    pub tool_name: Option<String>,
    /// False when the state is a fallback guess rather than derived
    /// from an explicit stop reason.
    pub is_definitive: bool,
}

impl EntryState {
    fn definitive(icon: &'static str, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
            tool_name: None,
            is_definitive: true,
        }
    }

    fn fallback(icon: &'static str, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
            tool_name: None,
            is_definitive: false,
        }
    }
}

/// Classifies a transcript entry. Returns `None` for entries that carry
/// no session-state signal (summaries, queue operations, unknown types).
///
/// Rules are ordered; the first match wins.
pub fn classify(entry: &LogEntry) -> Option<EntryState> {
    match entry.kind {
        EntryKind::Summary | EntryKind::QueueOperation | EntryKind::Other => None,
        EntryKind::User => Some(classify_user(entry)),
        EntryKind::Assistant => Some(classify_assistant(entry)),
    }
}

fn classify_user(entry: &LogEntry) -> EntryState {
    let Some(message) = &entry.message else {
        return EntryState::definitive(icons::USER, "user input");
    };

    // A tool_result as the first content item means the harness just fed
    // a result back and the model is about to continue.
    if message.first_content_kind() == ContentKind::ToolResult {
        EntryState::definitive(icons::PROCESSING, "processing")
    } else {
        EntryState::definitive(icons::USER, "user input")
    }
}

fn classify_assistant(entry: &LogEntry) -> EntryState {
    let Some(message) = &entry.message else {
        return EntryState::fallback(icons::THINKING, "responding");
    };

    match message.stop_reason.as_deref() {
        None => {
            if message.first_content_kind() == ContentKind::ToolUse {
                EntryState::definitive(icons::TOOL, "calling tool")
            } else {
                EntryState::definitive(icons::THINKING, "thinking")
            }
        }
        Some("tool_use") => {
            let tool_name = message.last_tool_name().unwrap_or("unknown").to_string();
            EntryState {
                icon: icons::TOOL,
                text: format!("running: {tool_name}"),
                tool_name: Some(tool_name),
                is_definitive: true,
            }
        }
        // Never observed in practice: Claude Code keeps streaming past
        // end_turn, so the last line is a text entry with a null stop
        // reason. Kept for forward compatibility.
        Some("end_turn") => EntryState::definitive(icons::COMPLETED, "completed"),
        Some("max_tokens") => EntryState::definitive(icons::WARNING, "max tokens"),
        Some(_) => EntryState::fallback(icons::THINKING, "responding"),
    }
}

/// True when an assistant entry has an unanswered tool_use: either the
/// model stopped for tool use, or it emitted a tool_use block mid-stream.
pub fn has_pending_tool(entry: &LogEntry) -> bool {
    if entry.kind != EntryKind::Assistant {
        return false;
    }
    let Some(message) = &entry.message else {
        return false;
    };

    match message.stop_reason.as_deref() {
        Some("tool_use") => true,
        None => message.first_content_kind() == ContentKind::ToolUse,
        Some(_) => false,
    }
}

/// True when an assistant entry is plain text with a null stop reason,
/// the shape a finished turn leaves behind in practice.
pub fn is_text_at_rest(entry: &LogEntry) -> bool {
    if entry.kind != EntryKind::Assistant {
        return false;
    }
    let Some(message) = &entry.message else {
        return false;
    };

    message.stop_reason.is_none() && message.first_content_kind() == ContentKind::Text
}
