//! Idle timeout policy.
//!
//! Every tool gets a trust threshold: how long the tool may plausibly
//! still be running before silence starts to look like a stalled
//! permission prompt. Long-running tools like Bash get generous windows
//! to keep false positives down.

use std::time::Duration;

/// Base threshold for idle detection. Silence shorter than this is
/// never acted on, and approval detections at exactly this threshold
/// count as confirmed rather than estimated.
pub const IDLE_FLOOR: Duration = Duration::from_secs(5);

/// Staleness ceiling. Sessions idle longer than this are abandoned,
/// not actionable, and are never reclassified.
pub const STALE_CEILING: Duration = Duration::from_secs(10 * 60);

/// Returns the trust threshold for a tool.
///
/// Unknown and empty tool names get the default 30 seconds.
pub fn tool_threshold(tool_name: &str) -> Duration {
    match tool_name {
        // Shell commands can run long
        "Bash" | "BashOutput" => Duration::from_secs(60),

        // Sub-agents can take a while
        "Task" => Duration::from_secs(180),

        // Network operations
        "WebFetch" | "WebSearch" => Duration::from_secs(60),

        // File operations
        "Read" | "Write" | "Edit" | "Glob" | "Grep" => Duration::from_secs(10),

        // Quick state changes
        "TodoWrite" | "NotebookEdit" | "ExitPlanMode" | "EnterPlanMode" => Duration::from_secs(5),

        // Extended thinking
        "mcp__sequential-thinking__sequentialthinking" => Duration::from_secs(120),

        other => {
            // Browser automation
            if other.starts_with("mcp__playwright__")
                || other.starts_with("mcp__chrome-devtools__")
            {
                Duration::from_secs(120)
            // Symbol operations and documentation lookup
            } else if other.starts_with("mcp__serena__") || other.starts_with("mcp__context7__") {
                Duration::from_secs(30)
            // UI component generation
            } else if other.starts_with("mcp__magic__") {
                Duration::from_secs(60)
            // Other MCP tools
            } else if other.starts_with("mcp__") {
                Duration::from_secs(60)
            } else {
                Duration::from_secs(30)
            }
        }
    }
}
