//! Full-screen dashboard for `cws --dashboard`.
//!
//! Keeps the latest status per project and redraws the whole table on
//! every change. The table is small (one row per project) so a full
//! redraw is simpler than cell-level updates.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::Local;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

use crate::error::Result;
use cws_core::ProjectStatus;

const NAME_WIDTH: usize = 20;
const STATE_WIDTH: usize = 30;

/// In-memory model of the dashboard, keyed by project name.
///
/// `BTreeMap` keeps rows sorted by name so projects do not jump around
/// between redraws.
pub struct Dashboard {
    projects: BTreeMap<String, ProjectStatus>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            projects: BTreeMap::new(),
        }
    }

    /// Replaces all rows with a full snapshot.
    pub fn apply_snapshot(&mut self, projects: Vec<ProjectStatus>) {
        self.projects = projects
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
    }

    /// Applies a single status change.
    pub fn apply(&mut self, project: ProjectStatus) {
        self.projects.insert(project.name.clone(), project);
    }

    /// Number of projects currently shown.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Redraws the full table.
    pub fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        queue!(
            out,
            Print(format!(
                "claude-watch-status  ({} project{})",
                self.projects.len(),
                if self.projects.len() == 1 { "" } else { "s" }
            ))
        )?;
        queue!(
            out,
            MoveTo(0, 1),
            Print(format!(
                "   {:<NAME_WIDTH$} {:<STATE_WIDTH$} {:>8}",
                "PROJECT", "STATE", "UPDATED"
            ))
        )?;

        if self.projects.is_empty() {
            queue!(out, MoveTo(0, 3), Print("No active sessions"))?;
        }

        for (row, status) in self.projects.values().enumerate() {
            let y = (row as u16).saturating_add(2);
            queue!(out, MoveTo(0, y), Print(render_row(status)))?;
        }

        out.flush()?;
        Ok(())
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats one table row.
fn render_row(status: &ProjectStatus) -> String {
    let ts = status
        .updated_at
        .with_timezone(&Local)
        .format("%H:%M:%S");
    let state = if status.is_estimated {
        format!("{} (est)", status.state)
    } else {
        status.state.clone()
    };

    format!(
        "{} {:<NAME_WIDTH$} {:<STATE_WIDTH$} {:>8}",
        status.icon,
        fit(&status.name, NAME_WIDTH),
        fit(&state, STATE_WIDTH),
        ts
    )
}

/// Truncates to `width` characters so long values cannot push the
/// timestamp column off screen.
fn fit(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        value.chars().take(width.saturating_sub(1)).collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cws_core::StatusSource;

    fn status(name: &str, state: &str) -> ProjectStatus {
        ProjectStatus {
            name: name.to_string(),
            icon: "⏳".to_string(),
            state: state.to_string(),
            detail: None,
            updated_at: Utc::now(),
            session_id: None,
            source: StatusSource::Push,
            file_path: None,
            file_time: None,
            tool_name: None,
            is_estimated: false,
        }
    }

    #[test]
    fn test_apply_snapshot_replaces_rows() {
        let mut dash = Dashboard::new();
        dash.apply(status("old", "processing"));

        dash.apply_snapshot(vec![status("alpha", "thinking"), status("beta", "completed")]);

        assert_eq!(dash.len(), 2);
    }

    #[test]
    fn test_apply_overwrites_by_name() {
        let mut dash = Dashboard::new();
        dash.apply(status("p", "processing"));
        dash.apply(status("p", "completed"));

        assert_eq!(dash.len(), 1);
    }

    #[test]
    fn test_render_contains_rows_sorted() {
        let mut dash = Dashboard::new();
        dash.apply(status("zeta", "processing"));
        dash.apply(status("alpha", "running: Bash"));

        let mut out = Vec::new();
        dash.render(&mut out).expect("render");
        let text = String::from_utf8_lossy(&out);

        assert!(text.contains("PROJECT"));
        assert!(text.contains("alpha"));
        assert!(text.contains("zeta"));
        assert!(text.contains("running: Bash"));

        let alpha_pos = text.find("alpha").expect("alpha");
        let zeta_pos = text.find("zeta").expect("zeta");
        assert!(alpha_pos < zeta_pos);
    }

    #[test]
    fn test_render_empty_placeholder() {
        let dash = Dashboard::new();

        let mut out = Vec::new();
        dash.render(&mut out).expect("render");
        let text = String::from_utf8_lossy(&out);

        assert!(text.contains("No active sessions"));
    }

    #[test]
    fn test_fit_truncates_long_values() {
        assert_eq!(fit("short", 10), "short");

        let long = "a-very-long-project-name-indeed";
        let fitted = fit(long, 10);
        assert_eq!(fitted.chars().count(), 10);
        assert!(fitted.ends_with('…'));
    }

    #[test]
    fn test_render_row_marks_estimated() {
        let mut s = status("p", "waiting approval");
        s.is_estimated = true;

        assert!(render_row(&s).contains("(est)"));
    }
}
