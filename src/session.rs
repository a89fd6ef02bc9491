//! Session controller: the single owner of "which run is active".
//!
//! The controller mints a fresh [`CancellationToken`] and [`SessionId`] for
//! every run, cancels the previous run before starting the next, and keeps
//! the latest published accumulation.  Polling tasks never touch this state
//! directly; they only send [`PollMsg`]s, which [`SessionController::drain`]
//! applies on the UI thread.  Messages tagged with any id other than the
//! active one are discarded, so a superseded or stopped run can never
//! overwrite what the current run published.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::poll::{self, Outcome, PollMsg, PollSettings};
use crate::source::{FeedClient, FetchError, Thread};

/// Identifies one polling run.  Ids only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the most recent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Stopped,
    Completed,
    Failed,
}

/// What changed during a [`SessionController::drain`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new snapshot replaced the accumulation.
    Updated { count: usize },
    /// The feed ran out of pages.
    Completed { count: usize },
    /// The run ended with an error the user should see.
    Failed(FetchError),
}

struct Session {
    id: SessionId,
    cancel: CancellationToken,
}

pub struct SessionController {
    runtime: Handle,
    client: Arc<dyn FeedClient>,
    settings: PollSettings,
    tx: UnboundedSender<PollMsg>,
    rx: UnboundedReceiver<PollMsg>,
    active: Option<Session>,
    next_id: u64,
    channel: Option<String>,
    threads: Arc<Vec<Thread>>,
    status: SessionStatus,
    last_update: Option<DateTime<Utc>>,
}

impl SessionController {
    pub fn new(runtime: Handle, client: Arc<dyn FeedClient>, settings: PollSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            client,
            settings,
            tx,
            rx,
            active: None,
            next_id: 0,
            channel: None,
            threads: Arc::new(Vec::new()),
            status: SessionStatus::Idle,
            last_update: None,
        }
    }

    /// Start polling `channel`, superseding any active session.
    ///
    /// The accumulation is emptied before the new run is spawned.
    pub fn start(&mut self, channel: &str) -> SessionId {
        if let Some(previous) = self.active.take() {
            info!(session = %previous.id, "superseding active session");
            previous.cancel.cancel();
        }

        self.next_id += 1;
        let id = SessionId(self.next_id);
        let cancel = CancellationToken::new();

        self.threads = Arc::new(Vec::new());
        self.last_update = None;
        self.channel = Some(channel.to_string());
        self.status = SessionStatus::Running;

        info!(session = %id, channel, "starting session");
        // Detached: the task reports back through `tx` and exits on cancel.
        let _task = poll::spawn(
            &self.runtime,
            Arc::clone(&self.client),
            id,
            channel.to_string(),
            cancel.clone(),
            self.settings,
            self.tx.clone(),
        );
        self.active = Some(Session { id, cancel });
        id
    }

    /// Cancel the active session.  No-op when nothing is running.
    ///
    /// Messages the run already sent are applied first and returned, so an
    /// outcome that beat the stop request (a failure or the last page) is
    /// still reported.
    pub fn stop(&mut self) -> Vec<SessionEvent> {
        let events = self.drain();
        if let Some(session) = self.active.take() {
            info!(session = %session.id, "stopping session");
            session.cancel.cancel();
            self.status = SessionStatus::Stopped;
        }
        events
    }

    /// Apply every pending message from the polling task.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Ok(msg) = self.rx.try_recv() {
            let current = self.active.as_ref().map(|s| s.id);
            match msg {
                PollMsg::Snapshot { session, threads } if Some(session) == current => {
                    let count = threads.len();
                    self.threads = threads;
                    self.last_update = Some(Utc::now());
                    events.push(SessionEvent::Updated { count });
                }
                PollMsg::Finished { session, outcome } if Some(session) == current => {
                    self.active = None;
                    match outcome {
                        Outcome::Stopped => self.status = SessionStatus::Stopped,
                        Outcome::Completed => {
                            self.status = SessionStatus::Completed;
                            events.push(SessionEvent::Completed {
                                count: self.threads.len(),
                            });
                        }
                        Outcome::Failed(err) => {
                            self.status = SessionStatus::Failed;
                            events.push(SessionEvent::Failed(err));
                        }
                    }
                }
                PollMsg::Snapshot { session, .. } | PollMsg::Finished { session, .. } => {
                    debug!(%session, "discarding message from inactive session");
                }
            }
        }

        events
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Channel of the most recent session, active or not.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(session) = self.active.take() {
            session.cancel.cancel();
        }
    }
}
