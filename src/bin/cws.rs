//! CWS CLI - Real-time status watcher for Claude Code sessions
//!
//! Default mode streams one line per status change to stdout.
//! `--dashboard` renders a full-screen table instead. The `hook`
//! subcommand is wired into Claude Code hooks and forwards the hook
//! payload from stdin to the daemon.
//!
//! # Usage
//!
//! ```text
//! cws                # Stream status changes line by line
//! cws --dashboard    # Full-screen dashboard
//! cws --no-notify    # Stream without desktop notifications
//! cws hook           # Forward a hook event from stdin (for hooks config)
//! ```

use std::fs::{self, OpenOptions};
use std::io::Read;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cws_cli::dashboard::Dashboard;
use cws_cli::notifier::Notifier;
use cws_cli::{client, stream, ClientEvent, DaemonClient};

/// How long the hook subcommand may spend talking to the daemon.
/// Hooks run inline with the agent and must never block it.
const HOOK_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// CLI Arguments
// ============================================================================

/// CWS - Watch Claude Code session status in real-time
#[derive(Parser, Debug)]
#[command(name = "cws")]
#[command(about = "Watch Claude Code session status in real-time")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Full-screen dashboard instead of the line stream
    #[arg(long, short = 'd')]
    dashboard: bool,

    /// Disable desktop notifications
    #[arg(long)]
    no_notify: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forward a hook event from stdin to the daemon (for Claude Code hooks)
    Hook,
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Creates the log file for CLI logging.
///
/// Status lines own stdout, so diagnostics go to a file instead of
/// stderr. Returns `None` if the file cannot be created (logging is
/// then disabled).
fn create_log_file() -> Option<std::fs::File> {
    let log_dir = cws_core::config::state_dir();

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory {log_dir:?}: {e}");
        return None;
    }

    let log_path = log_dir.join("cws.log");

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {log_path:?}: {e}");
            None
        }
    }
}

fn init_logging() {
    if let Some(file) = create_log_file() {
        // Wrap in Mutex for thread-safe writes from async tasks
        let writer = Mutex::new(file);

        let filter = EnvFilter::from_default_env().add_directive(
            "cws_cli=info".parse().unwrap_or_else(|_| {
                tracing_subscriber::filter::Directive::from(tracing::Level::INFO)
            }),
        );

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init();
    }
}

// ============================================================================
// Hook Subcommand
// ============================================================================

/// Forwards a hook payload from stdin to the daemon.
///
/// Always exits successfully: a down daemon or malformed payload must
/// not fail the hook and interrupt the Claude Code session.
async fn run_hook() {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        return;
    }

    let data: serde_json::Value = match serde_json::from_str(input.trim()) {
        Ok(v) => v,
        Err(_) => return,
    };

    let socket_path = cws_core::config::socket_path();
    let push = client::push_hook_event(&socket_path, data);

    match tokio::time::timeout(HOOK_TIMEOUT, push).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "Hook forwarding failed"),
        Err(_) => debug!("Hook forwarding timed out"),
    }
}

// ============================================================================
// Stream Mode
// ============================================================================

async fn run_stream(
    event_rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    notifier: &mut Notifier,
    cancel_token: &CancellationToken,
) {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                cancel_token.cancel();
                break;
            }

            event = event_rx.recv() => {
                match event {
                    Some(ClientEvent::Snapshot(projects)) => {
                        for project in &projects {
                            println!("{}", stream::status_line(project));
                        }
                    }
                    Some(ClientEvent::Changed { kind, project }) => {
                        println!("{}", stream::status_line(&project));
                        notifier.handle(kind, &project);
                    }
                    Some(ClientEvent::Disconnected) => {
                        eprintln!("cws: daemon disconnected, retrying...");
                    }
                    None => {
                        warn!("Event channel closed");
                        break;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Dashboard Mode
// ============================================================================

async fn run_dashboard(
    event_rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    notifier: &mut Notifier,
    cancel_token: &CancellationToken,
) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = dashboard_loop(&mut stdout, event_rx, notifier, cancel_token).await;

    execute!(stdout, LeaveAlternateScreen, Show)?;

    result
}

async fn dashboard_loop(
    stdout: &mut std::io::Stdout,
    event_rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    notifier: &mut Notifier,
    cancel_token: &CancellationToken,
) -> Result<()> {
    let mut dashboard = Dashboard::new();
    dashboard.render(stdout)?;

    // Periodic redraw keeps the UPDATED column fresh between events
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                cancel_token.cancel();
                return Ok(());
            }

            _ = ticker.tick() => {
                dashboard.render(stdout)?;
            }

            event = event_rx.recv() => {
                match event {
                    Some(ClientEvent::Snapshot(projects)) => {
                        dashboard.apply_snapshot(projects);
                        dashboard.render(stdout)?;
                    }
                    Some(ClientEvent::Changed { kind, project }) => {
                        notifier.handle(kind, &project);
                        dashboard.apply(*project);
                        dashboard.render(stdout)?;
                    }
                    Some(ClientEvent::Disconnected) => {
                        debug!("Daemon disconnected, dashboard retains last state");
                    }
                    None => {
                        warn!("Event channel closed");
                        return Ok(());
                    }
                }
            }
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Command::Hook) = args.command {
        run_hook().await;
        return Ok(());
    }

    init_logging();

    info!(dashboard = args.dashboard, "CWS starting");

    if let Err(e) = cws_cli::daemon::ensure_daemon_running() {
        bail!("Failed to ensure daemon is running: {e}");
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ClientEvent>();
    let cancel_token = CancellationToken::new();

    let daemon_client = DaemonClient::with_defaults(event_tx, cancel_token.clone());
    let client_handle = tokio::spawn(async move {
        daemon_client.run().await;
    });

    let mut notifier = Notifier::new(!args.no_notify);

    let result = if args.dashboard {
        run_dashboard(&mut event_rx, &mut notifier, &cancel_token).await
    } else {
        run_stream(&mut event_rx, &mut notifier, &cancel_token).await;
        Ok(())
    };

    cancel_token.cancel();
    let _ = tokio::time::timeout(Duration::from_millis(100), client_handle).await;

    info!("CWS stopped");

    result
}
