//! Store actor - owns all project status state and processes commands.
//!
//! The StoreActor is the single owner of project status in the system.
//! It receives commands via an mpsc channel and publishes events via broadcast.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations use `?`, pattern matching, or `unwrap_or`
//! - Channel send failures are logged but don't panic

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use cws_core::{
    classify, read_last_entry, ProjectStatus, StatusEvent, StatusEventKind, StatusSource,
};

use super::commands::{PushUpdate, StoreCommand, StoreError};

/// The store actor - owns all project status state.
///
/// Implements the actor pattern: receives commands via mpsc channel,
/// processes them sequentially, and publishes events to subscribers.
///
/// # Ownership
///
/// The actor owns the `projects` map keyed by project name. One project
/// directory = one status entry; sessions within a project share it,
/// last writer wins.
///
/// # Thread Safety
///
/// The actor runs in a single task and processes commands sequentially.
/// All state mutations happen within this single task.
pub struct StoreActor {
    /// Command receiver
    receiver: mpsc::Receiver<StoreCommand>,

    /// Project statuses keyed by project name
    projects: HashMap<String, ProjectStatus>,

    /// Event publisher for real-time updates to subscribers
    event_publisher: broadcast::Sender<StatusEvent>,
}

impl StoreActor {
    /// Creates a new store actor.
    pub fn new(
        receiver: mpsc::Receiver<StoreCommand>,
        event_publisher: broadcast::Sender<StatusEvent>,
    ) -> Self {
        Self {
            receiver,
            projects: HashMap::new(),
            event_publisher,
        }
    }

    /// Runs the actor event loop.
    ///
    /// Processes commands until the channel closes (all senders dropped).
    /// This is the main entry point - call this in a spawned task.
    pub async fn run(mut self) {
        info!("Store actor starting");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("Store actor stopped (projects: {})", self.projects.len());
    }

    /// Dispatches a command to the appropriate handler.
    fn handle_command(&mut self, cmd: StoreCommand) {
        match cmd {
            StoreCommand::UpdateFromLog {
                project,
                session_id,
                path,
                respond_to,
            } => {
                let result = self.handle_update_from_log(project, session_id, path);
                // Ignore send error - caller may have dropped the receiver
                let _ = respond_to.send(result);
            }
            StoreCommand::UpdateFromPush { update, respond_to } => {
                let status = self.handle_update_from_push(update);
                let _ = respond_to.send(status);
            }
            StoreCommand::MarkIdle {
                project,
                icon,
                state,
                is_estimated,
                kind,
            } => {
                self.handle_mark_idle(project, icon, state, is_estimated, kind);
            }
            StoreCommand::GetAll { respond_to } => {
                let _ = respond_to.send(self.handle_get_all());
            }
        }
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    /// Handles a log-sourced update: read the transcript tail, classify it,
    /// and store the resulting status.
    ///
    /// Returns `Ok(None)` when the last entry carries no state signal;
    /// the previously stored status stays in place.
    fn handle_update_from_log(
        &mut self,
        project: String,
        session_id: Option<String>,
        path: PathBuf,
    ) -> Result<Option<ProjectStatus>, StoreError> {
        let entry = read_last_entry(&path).map_err(|e| StoreError::Transcript {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let Some(entry) = entry else {
            debug!(project = %project, path = %path.display(), "Transcript is empty, skipping");
            return Ok(None);
        };

        let Some(state) = classify(&entry) else {
            debug!(
                project = %project,
                path = %path.display(),
                "Last entry carries no state signal, skipping"
            );
            return Ok(None);
        };

        let file_time = file_mtime(&path);

        let status = ProjectStatus {
            name: project.clone(),
            icon: state.icon.to_string(),
            state: state.text,
            detail: state.tool_name.clone(),
            updated_at: Utc::now(),
            session_id,
            source: StatusSource::Log,
            file_path: Some(path),
            file_time,
            tool_name: state.tool_name,
            is_estimated: false,
        };

        debug!(
            project = %project,
            state = %status.state,
            definitive = state.is_definitive,
            "Status updated from transcript"
        );

        self.projects.insert(project, status.clone());
        self.publish(StatusEventKind::Update, status.clone());

        Ok(Some(status))
    }

    /// Handles a hook-sourced update.
    ///
    /// Push updates overwrite unconditionally: the hook fired after
    /// whatever the transcript tail showed. The transcript association
    /// (path and mtime) of the previous status is preserved so idle
    /// dedup keys keep advancing with the file.
    fn handle_update_from_push(&mut self, update: PushUpdate) -> ProjectStatus {
        let (file_path, file_time) = self
            .projects
            .get(&update.project)
            .map(|prev| (prev.file_path.clone(), prev.file_time))
            .unwrap_or((None, None));

        let status = ProjectStatus {
            name: update.project.clone(),
            icon: update.icon.to_string(),
            state: update.state,
            detail: update.tool_name.clone(),
            updated_at: Utc::now(),
            session_id: update.session_id,
            source: StatusSource::Push,
            file_path,
            file_time,
            tool_name: update.tool_name,
            is_estimated: false,
        };

        debug!(
            project = %update.project,
            state = %status.state,
            "Status updated from hook"
        );

        self.projects.insert(update.project, status.clone());
        self.publish(StatusEventKind::Update, status.clone());

        status
    }

    /// Handles an idle conclusion from the scanner.
    ///
    /// A no-op for unknown projects: the status may have been replaced
    /// between the scan and this command arriving.
    fn handle_mark_idle(
        &mut self,
        project: String,
        icon: &'static str,
        state: &'static str,
        is_estimated: bool,
        kind: StatusEventKind,
    ) {
        let Some(status) = self.projects.get_mut(&project) else {
            debug!(project = %project, "MarkIdle for unknown project, ignoring");
            return;
        };

        status.icon = icon.to_string();
        status.state = state.to_string();
        status.is_estimated = is_estimated;
        status.updated_at = Utc::now();

        info!(
            project = %project,
            state = %state,
            estimated = is_estimated,
            kind = %kind,
            "Project marked idle"
        );

        let status = status.clone();
        self.publish(kind, status);
    }

    /// Handles getting all statuses, sorted by project name.
    fn handle_get_all(&self) -> Vec<ProjectStatus> {
        let mut statuses: Vec<ProjectStatus> = self.projects.values().cloned().collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Publishes a status event, ignoring the no-subscribers case.
    fn publish(&self, kind: StatusEventKind, project: ProjectStatus) {
        let _ = self.event_publisher.send(StatusEvent { kind, project });
    }

    // ========================================================================
    // Accessors (for testing)
    // ========================================================================

    /// Returns the number of projects currently tracked.
    #[cfg(test)]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}

/// Reads a file's mtime as a UTC timestamp. `None` if the file vanished.
fn file_mtime(path: &std::path::Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cws_core::icons;
    use std::io::Write;
    use tokio::sync::oneshot;

    fn create_actor() -> (StoreActor, broadcast::Receiver<StatusEvent>) {
        let (_cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = broadcast::channel(16);
        let actor = StoreActor::new(cmd_rx, event_tx);
        (actor, event_rx)
    }

    fn write_transcript(lines: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sess-1.jsonl");
        let mut file = std::fs::File::create(&path).expect("create");
        for line in lines {
            writeln!(file, "{line}").expect("write");
        }
        (dir, path)
    }

    fn push_update(project: &str, state: &str) -> PushUpdate {
        PushUpdate {
            project: project.to_string(),
            session_id: Some("sess-1".to_string()),
            icon: icons::PROCESSING,
            state: state.to_string(),
            tool_name: None,
        }
    }

    #[tokio::test]
    async fn test_update_from_log_classifies_tail() {
        let (mut actor, mut event_rx) = create_actor();
        let (_dir, path) = write_transcript(&[
            r#"{"type":"user","message":{"stop_reason":null,"content":[{"type":"text","text":"go"}]}}"#,
            r#"{"type":"assistant","message":{"stop_reason":"tool_use","content":[{"type":"tool_use","name":"Bash"}]}}"#,
        ]);

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromLog {
            project: "myproject".to_string(),
            session_id: Some("sess-1".to_string()),
            path: path.clone(),
            respond_to: tx,
        });

        let status = rx.await.unwrap().unwrap().expect("status stored");
        assert_eq!(status.state, "running: Bash");
        assert_eq!(status.tool_name.as_deref(), Some("Bash"));
        assert_eq!(status.source, StatusSource::Log);
        assert_eq!(status.file_path.as_deref(), Some(path.as_path()));
        assert!(status.file_time.is_some());
        assert!(!status.is_estimated);

        let event = event_rx.try_recv().unwrap();
        assert_eq!(event.kind, StatusEventKind::Update);
        assert_eq!(event.project.name, "myproject");
    }

    #[tokio::test]
    async fn test_update_from_log_skips_summary() {
        let (mut actor, mut event_rx) = create_actor();
        let (_dir, path) = write_transcript(&[r#"{"type":"summary","summary":"compacted"}"#]);

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromLog {
            project: "myproject".to_string(),
            session_id: None,
            path,
            respond_to: tx,
        });

        let result = rx.await.unwrap().unwrap();
        assert!(result.is_none());
        assert_eq!(actor.project_count(), 0);
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_from_log_missing_file_errors() {
        let (mut actor, _) = create_actor();

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromLog {
            project: "myproject".to_string(),
            session_id: None,
            path: PathBuf::from("/nonexistent/sess.jsonl"),
            respond_to: tx,
        });

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(StoreError::Transcript { .. })));
    }

    #[tokio::test]
    async fn test_push_overwrites_log_status() {
        let (mut actor, mut event_rx) = create_actor();
        let (_dir, path) = write_transcript(&[
            r#"{"type":"assistant","message":{"stop_reason":null,"content":[{"type":"text","text":"hm"}]}}"#,
        ]);

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromLog {
            project: "myproject".to_string(),
            session_id: None,
            path: path.clone(),
            respond_to: tx,
        });
        let stored = rx.await.unwrap().unwrap().expect("stored");
        assert_eq!(stored.state, "thinking");
        let _ = event_rx.try_recv();

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromPush {
            update: push_update("myproject", "processing"),
            respond_to: tx,
        });

        let status = rx.await.unwrap();
        assert_eq!(status.state, "processing");
        assert_eq!(status.source, StatusSource::Push);
        // Transcript association survives the push
        assert_eq!(status.file_path.as_deref(), Some(path.as_path()));
        assert!(status.file_time.is_some());
        assert_eq!(actor.project_count(), 1);
    }

    #[tokio::test]
    async fn test_push_for_new_project() {
        let (mut actor, mut event_rx) = create_actor();

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromPush {
            update: push_update("fresh", "session started"),
            respond_to: tx,
        });

        let status = rx.await.unwrap();
        assert_eq!(status.name, "fresh");
        assert!(status.file_path.is_none());

        let event = event_rx.try_recv().unwrap();
        assert_eq!(event.kind, StatusEventKind::Update);
    }

    #[tokio::test]
    async fn test_mark_idle_updates_and_broadcasts() {
        let (mut actor, mut event_rx) = create_actor();

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::UpdateFromPush {
            update: push_update("myproject", "processing"),
            respond_to: tx,
        });
        let _ = rx.await.unwrap();
        let _ = event_rx.try_recv();

        actor.handle_command(StoreCommand::MarkIdle {
            project: "myproject".to_string(),
            icon: icons::IDLE_ESTIMATED,
            state: "waiting approval",
            is_estimated: true,
            kind: StatusEventKind::IdleApproval,
        });

        let event = event_rx.try_recv().unwrap();
        assert_eq!(event.kind, StatusEventKind::IdleApproval);
        assert_eq!(event.project.state, "waiting approval");
        assert!(event.project.is_estimated);
    }

    #[tokio::test]
    async fn test_mark_idle_unknown_project_is_noop() {
        let (mut actor, mut event_rx) = create_actor();

        actor.handle_command(StoreCommand::MarkIdle {
            project: "ghost".to_string(),
            icon: icons::IDLE_CONFIRMED,
            state: "waiting approval",
            is_estimated: false,
            kind: StatusEventKind::IdleApproval,
        });

        assert_eq!(actor.project_count(), 0);
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_name() {
        let (mut actor, _) = create_actor();

        for name in ["zeta", "alpha", "mid"] {
            let (tx, rx) = oneshot::channel();
            actor.handle_command(StoreCommand::UpdateFromPush {
                update: push_update(name, "processing"),
                respond_to: tx,
            });
            let _ = rx.await.unwrap();
        }

        let (tx, rx) = oneshot::channel();
        actor.handle_command(StoreCommand::GetAll { respond_to: tx });

        let statuses = rx.await.unwrap();
        let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
