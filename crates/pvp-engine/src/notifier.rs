//! Match update notifications
//!
//! A broadcast channel of match snapshots. Every receiver gets its own copy,
//! so subscribers can never reach the stored match through a snapshot.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::state::{Match, MatchId};

#[derive(Debug, Clone)]
pub struct UpdateNotifier {
    tx: broadcast::Sender<Match>,
}

impl UpdateNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a snapshot of `m`. Returns how many receivers will see it.
    pub fn publish(&self, m: &Match) -> usize {
        self.tx.send(m.clone()).unwrap_or(0)
    }

    pub fn receiver(&self) -> broadcast::Receiver<Match> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Deliver snapshots of `match_id` to `on_update` until cancelled or the
/// channel closes.
pub(crate) async fn forward_updates<F>(
    mut rx: broadcast::Receiver<Match>,
    match_id: MatchId,
    mut on_update: F,
    cancel: CancellationToken,
) where
    F: FnMut(Match) + Send + 'static,
{
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Ok(m) if m.id == match_id => on_update(m),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%match_id, skipped, "subscriber lagged, older snapshots dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    debug!(%match_id, "update forwarding stopped");
}

/// Handle returned by [`Arena::subscribe`](crate::Arena::subscribe).
///
/// Dropping it, or calling [`unsubscribe`](Self::unsubscribe), stops the
/// snapshot feed and the autonomous opponent bound to it.
#[derive(Debug)]
pub struct Subscription {
    match_id: MatchId,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(
        match_id: MatchId,
        cancel: CancellationToken,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self { match_id, cancel, tasks }
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn unsubscribe(self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the background tasks to wind down
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
