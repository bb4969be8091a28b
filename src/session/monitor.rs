//! Async driver for the session timeout state machine.
//!
//! # Responsibilities
//! - Run the warning and expiry deadlines on tokio timers
//! - Restart them on user activity
//! - Hand warnings to the presentation layer and take its answer back
//! - Invoke logout exactly once on expiry
//!
//! # Design Decisions
//! - One task per session; the handle is the only way in
//! - Dropping the handle tears the monitor down (no leaked timers)

use std::future::pending;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::observability::metrics;
use crate::session::timeout::{SessionEvent, SessionTimeout, TimeoutPolicy, WarningDecision};

/// User activity that keeps a session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    MouseDown,
    MouseMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::MouseDown,
        ActivityKind::MouseMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
    ];

    /// DOM event name this activity is observed as.
    pub fn event_name(self) -> &'static str {
        match self {
            ActivityKind::MouseDown => "mousedown",
            ActivityKind::MouseMove => "mousemove",
            ActivityKind::KeyPress => "keypress",
            ActivityKind::Scroll => "scroll",
            ActivityKind::TouchStart => "touchstart",
            ActivityKind::Click => "click",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_name() == name)
    }
}

enum Command {
    Activity(ActivityKind),
    Decision(WarningDecision),
    Shutdown,
}

/// Control handle for a running monitor.
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Report user activity. Returns false once the monitor has ended.
    pub fn record_activity(&self, kind: ActivityKind) -> bool {
        self.tx.send(Command::Activity(kind)).is_ok()
    }

    /// Answer a `SessionEvent::WarningDue`.
    pub fn respond(&self, decision: WarningDecision) -> bool {
        self.tx.send(Command::Decision(decision)).is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel both timers and wait for the monitor task to exit.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Session monitor task failed");
        }
    }
}

pub struct SessionMonitor;

impl SessionMonitor {
    /// Start monitoring a session.
    ///
    /// Returns the control handle and the stream of events the UI must
    /// present. `logout` runs once, when the session expires or the user
    /// declines to continue. It does not run on teardown.
    pub fn start<F>(policy: TimeoutPolicy, logout: F) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>)
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let epoch = Instant::now();

        tracing::debug!(timeout_secs = policy.timeout.as_secs(), "Session monitor starting");

        let task = tokio::spawn(run(policy, epoch, logout, commands, events_tx));
        (SessionHandle { tx, task }, events)
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

async fn run<F>(
    policy: TimeoutPolicy,
    epoch: Instant,
    logout: F,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
) where
    F: FnOnce() + Send + 'static,
{
    let mut machine = SessionTimeout::new(policy, epoch.elapsed());
    let mut logout = Some(logout);

    loop {
        let deadline = machine.next_deadline().map(|d| {
            epoch
                .checked_add(d)
                .unwrap_or_else(|| Instant::now() + machine.policy().timeout)
        });

        let outcome = tokio::select! {
            _ = sleep_until_deadline(deadline) => machine.advance(epoch.elapsed()),
            cmd = commands.recv() => match cmd {
                Some(Command::Activity(kind)) => {
                    tracing::trace!(event = kind.event_name(), "Session activity");
                    machine.record_activity(epoch.elapsed());
                    None
                }
                Some(Command::Decision(decision)) => {
                    tracing::debug!(?decision, "Session warning answered");
                    machine.resolve_warning(decision, epoch.elapsed())
                }
                Some(Command::Shutdown) | None => {
                    machine.cancel();
                    tracing::debug!("Session monitor torn down");
                    break;
                }
            },
        };

        let Some(event) = outcome else {
            continue;
        };

        metrics::record_session_event(&event);

        if let SessionEvent::Expired(reason) = event {
            tracing::info!(?reason, "Session expired, logging out");
            if let Some(logout) = logout.take() {
                logout();
            }
            let _ = events.send(event);
            break;
        }

        tracing::info!("Session about to expire, warning user");
        let _ = events.send(event);
    }
}
