//! Line-stream output for the default `cws` mode.
//!
//! Each status change prints one line to stdout:
//!
//! ```text
//! 🔧 [14:32:07] myproject       running: Bash
//! ```
//!
//! Timestamps are rendered in local time; the project name column is
//! padded so states line up across projects.

use chrono::Local;
use cws_core::ProjectStatus;

/// Width of the project name column.
const NAME_WIDTH: usize = 15;

const DIM: &str = "\x1b[90m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Formats one status as a stream line.
pub fn status_line(status: &ProjectStatus) -> String {
    let ts = status
        .updated_at
        .with_timezone(&Local)
        .format("%H:%M:%S");
    let marker = if status.is_estimated { " (est)" } else { "" };

    format!(
        "{} {DIM}[{ts}]{RESET} {:<NAME_WIDTH$} {CYAN}{}{marker}{RESET}",
        status.icon, status.name, status.state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cws_core::StatusSource;

    fn status(name: &str, state: &str) -> ProjectStatus {
        ProjectStatus {
            name: name.to_string(),
            icon: "🔧".to_string(),
            state: state.to_string(),
            detail: None,
            updated_at: Utc::now(),
            session_id: None,
            source: StatusSource::Push,
            file_path: None,
            file_time: None,
            tool_name: Some("Bash".to_string()),
            is_estimated: false,
        }
    }

    #[test]
    fn test_status_line_contains_fields() {
        let line = status_line(&status("myproject", "running: Bash"));

        assert!(line.contains("🔧"));
        assert!(line.contains("myproject"));
        assert!(line.contains("running: Bash"));
        assert!(line.contains('['));
        assert!(!line.contains("(est)"));
    }

    #[test]
    fn test_status_line_pads_short_names() {
        let line = status_line(&status("ab", "thinking"));

        // Name column is padded to a fixed width
        assert!(line.contains(&format!("{:<15}", "ab")));
    }

    #[test]
    fn test_status_line_marks_estimated() {
        let mut s = status("p", "waiting approval");
        s.is_estimated = true;

        assert!(status_line(&s).contains("(est)"));
    }
}
