//! Incremental listing walker.
//!
//! One polling run ("session") walks a channel's listing from the newest page
//! towards older ones: fetch a page, normalise and append its items, publish
//! the whole accumulation, wait, repeat.  The run ends when the token is
//! cancelled, the feed reports its last page, or a fetch fails.
//!
//! ```text
//!            ┌──────────── interval elapsed ────────────┐
//!            ▼                                          │
//! Idle ──► Running: fetch ─► normalise ─► publish ─► wait
//!            │          │                     │
//!            │          └─ error ──► Failed   └─ last page ──► Completed
//!            └─ token cancelled (any checkpoint) ──► Stopped
//! ```
//!
//! The loop is strictly sequential, so a run never has more than one request
//! outstanding and snapshots leave in fetch order.  Messages are tagged with
//! the [`SessionId`] so the receiver can drop anything from a superseded run.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::SessionId;
use crate::source::{normalize, FeedClient, FetchError, Thread};

/// Pause between consecutive page requests.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The token was cancelled.
    Stopped,
    /// The feed returned its last page.
    Completed,
    /// A fetch or normalisation error ended the run.
    Failed(FetchError),
}

/// Messages sent from a polling task to the session controller.
#[derive(Debug, Clone)]
pub enum PollMsg {
    /// The complete accumulation after a page merge.  Replaces, never
    /// extends, whatever the receiver showed before.
    Snapshot {
        session: SessionId,
        threads: Arc<Vec<Thread>>,
    },
    /// The run is over; no further messages follow for this session.
    Finished { session: SessionId, outcome: Outcome },
}

/// Spawn one polling run on `runtime`.
///
/// The task sends zero or more [`PollMsg::Snapshot`]s followed by exactly one
/// [`PollMsg::Finished`].  If the receiver is gone the messages are dropped
/// silently.
pub fn spawn(
    runtime: &Handle,
    client: Arc<dyn FeedClient>,
    session: SessionId,
    channel: String,
    cancel: CancellationToken,
    settings: PollSettings,
    tx: UnboundedSender<PollMsg>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let outcome = run(client.as_ref(), session, &channel, &cancel, settings, &tx).await;
        info!(%session, %channel, ?outcome, "polling finished");
        let _ = tx.send(PollMsg::Finished { session, outcome });
    })
}

/// Walk `channel` until cancelled, exhausted, or failed.
pub async fn run(
    client: &dyn FeedClient,
    session: SessionId,
    channel: &str,
    cancel: &CancellationToken,
    settings: PollSettings,
    tx: &UnboundedSender<PollMsg>,
) -> Outcome {
    let mut threads: Vec<Thread> = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        if cancel.is_cancelled() {
            return Outcome::Stopped;
        }

        let page = match client.fetch_page(channel, cursor.as_deref(), cancel).await {
            Ok(page) => page,
            Err(FetchError::Cancelled) => return Outcome::Stopped,
            Err(err) => {
                warn!(%session, %channel, error = %err, "page fetch failed");
                return Outcome::Failed(err);
            }
        };

        let fresh = match page.items.iter().map(normalize).collect::<Result<Vec<_>, _>>() {
            Ok(fresh) => fresh,
            Err(err) => {
                warn!(%session, %channel, error = %err, "page contained a malformed item");
                return Outcome::Failed(err);
            }
        };

        // A page that resolved after stop was requested is discarded.
        if cancel.is_cancelled() {
            return Outcome::Stopped;
        }

        threads.extend(fresh);
        debug!(
            %session,
            page_items = page.items.len(),
            total = threads.len(),
            "page merged"
        );
        let _ = tx.send(PollMsg::Snapshot {
            session,
            threads: Arc::new(threads.clone()),
        });

        if page.is_last() {
            return Outcome::Completed;
        }
        cursor = page.next_cursor;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Outcome::Stopped,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
