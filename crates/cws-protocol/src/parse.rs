//! Parsing raw hook event payloads from Claude Code.

use cws_core::{hook_state, project_name_from_cwd, HookEventType};
use serde::Deserialize;

/// Raw hook event JSON structure from Claude Code.
///
/// Flat structure with all optional fields defaulted so that partial
/// payloads and future fields never fail to parse.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHookEvent {
    pub session_id: String,
    pub hook_event_name: String,

    #[serde(default)]
    pub cwd: Option<String>,

    // === Tool events (PreToolUse, PostToolUse) ===
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_response: Option<serde_json::Value>,

    // === Session events (SessionStart, SessionEnd) ===
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,

    // === Stop ===
    #[serde(default)]
    pub stop_hook_active: Option<bool>,
}

impl RawHookEvent {
    /// Parses the hook event type. `None` for events we don't map.
    pub fn event_type(&self) -> Option<HookEventType> {
        HookEventType::from_event_name(&self.hook_event_name)
    }

    /// Project name derived from the event's working directory.
    pub fn project_name(&self) -> String {
        project_name_from_cwd(self.cwd.as_deref().unwrap_or_default())
    }

    /// Icon and state text for this event.
    pub fn state(&self) -> (&'static str, String) {
        hook_state(&self.hook_event_name, self.tool_name.as_deref())
    }
}
