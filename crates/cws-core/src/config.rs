//! Path configuration.
//!
//! Everything is env-overridable with sensible defaults; there is no
//! config file.

use std::env;
use std::path::PathBuf;

/// Default Unix socket path for the daemon.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/cwsd.sock";

/// Returns the Claude Code projects directory.
///
/// Honors `CLAUDE_PROJECTS_DIR`, falling back to `~/.claude/projects`.
pub fn projects_dir() -> PathBuf {
    if let Ok(dir) = env::var("CLAUDE_PROJECTS_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".claude")
        .join("projects")
}

/// Returns the daemon socket path.
///
/// Honors `CWS_SOCKET`, falling back to [`DEFAULT_SOCKET_PATH`].
pub fn socket_path() -> PathBuf {
    match env::var("CWS_SOCKET") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_SOCKET_PATH),
    }
}

/// Returns the state directory for PID and log files.
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("cws")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projects_dir_env_override() {
        // Env vars are process-global; use a unique value and restore after.
        let prev = env::var("CLAUDE_PROJECTS_DIR").ok();
        env::set_var("CLAUDE_PROJECTS_DIR", "/tmp/cws-test-projects");
        assert_eq!(projects_dir(), PathBuf::from("/tmp/cws-test-projects"));

        match prev {
            Some(v) => env::set_var("CLAUDE_PROJECTS_DIR", v),
            None => env::remove_var("CLAUDE_PROJECTS_DIR"),
        }
    }

    #[test]
    fn test_default_socket_path() {
        assert_eq!(DEFAULT_SOCKET_PATH, "/tmp/cwsd.sock");
    }

    #[test]
    fn test_state_dir_suffix() {
        assert!(state_dir().ends_with("cws"));
    }
}
