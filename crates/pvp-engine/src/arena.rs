//! Match lifecycle
//!
//! [`Arena`] is the composition root: it owns the store, the notifier and
//! the opponent strategy, and exposes matchmaking, action submission and
//! subscriptions to the UI layer.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::config::ArenaConfig;
use crate::driver::drive_opponent;
use crate::error::ArenaError;
use crate::notifier::{forward_updates, Subscription, UpdateNotifier};
use crate::resolver::{resolve_action, Rejection, Resolution};
use crate::state::{Match, MatchId, Profile};
use crate::store::MatchStore;
use crate::strategy::{build_strategy, OpponentStrategy};

/// Where the local player is, as the lobby screen sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LobbyStage {
    Lobby,
    Searching,
    InProgress,
    Results,
}

#[derive(Default)]
struct Matchmaking {
    next_ticket: u64,
    pending: Option<(u64, CancellationToken)>,
}

struct ArenaInner {
    config: ArenaConfig,
    store: Arc<MatchStore>,
    notifier: UpdateNotifier,
    strategy: Arc<dyn OpponentStrategy>,
    matchmaking: Mutex<Matchmaking>,
}

/// Cheap to clone; clones share the same store and notifier.
#[derive(Clone)]
pub struct Arena {
    inner: Arc<ArenaInner>,
}

/// Clears the matchmaking slot when a request ends, however it ends
struct PendingGuard<'a> {
    arena: &'a ArenaInner,
    ticket: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut mm = self.arena.matchmaking.lock();
        if mm.pending.as_ref().is_some_and(|(t, _)| *t == self.ticket) {
            mm.pending = None;
        }
    }
}

impl Arena {
    /// Arena with a fresh store and the configured opponent strategy
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        let strategy = build_strategy(config.opponent_strategy);
        Self::with_parts(config, Arc::new(MatchStore::new()), strategy)
    }

    /// Arena over an existing store and a caller-supplied strategy
    pub fn with_parts(
        config: ArenaConfig,
        store: Arc<MatchStore>,
        strategy: Arc<dyn OpponentStrategy>,
    ) -> Result<Self, ArenaError> {
        config.validate()?;
        let notifier = UpdateNotifier::new(config.event_capacity);
        Ok(Self {
            inner: Arc::new(ArenaInner {
                config,
                store,
                notifier,
                strategy,
                matchmaking: Mutex::new(Matchmaking::default()),
            }),
        })
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<MatchStore> {
        &self.inner.store
    }

    pub fn notifier(&self) -> &UpdateNotifier {
        &self.inner.notifier
    }

    /// Find an opponent for `requester` and install the new match.
    ///
    /// Completes after `matchmaking_delay`. Only one request may be
    /// outstanding; [`cancel_matchmaking`](Self::cancel_matchmaking) aborts
    /// it before anything is installed.
    #[instrument(skip_all, fields(username = %requester.username))]
    pub async fn start_matchmaking(&self, requester: Profile) -> Result<Match, ArenaError> {
        let (ticket, cancel) = {
            let mut mm = self.inner.matchmaking.lock();
            if mm.pending.is_some() {
                return Err(ArenaError::MatchmakingInProgress);
            }
            let ticket = mm.next_ticket;
            mm.next_ticket += 1;
            let cancel = CancellationToken::new();
            mm.pending = Some((ticket, cancel.clone()));
            (ticket, cancel)
        };
        let _guard = PendingGuard { arena: &self.inner, ticket };
        info!(role = %requester.role, "searching for opponent");

        let timeout = self.inner.config.matchmaking_timeout;
        let opponent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ArenaError::MatchmakingCancelled),
            found = tokio::time::timeout(timeout, self.find_opponent(&requester)) => {
                found.map_err(|_| ArenaError::MatchmakingTimedOut(timeout))?
            }
        };

        let m = self.install_if_pending(ticket, requester, opponent)?;
        info!(match_id = %m.id, opponent = %m.players[1].profile.username, "match found");
        Ok(m)
    }

    /// Install the match only while `ticket` still owns the matchmaking
    /// slot. The slot lock is held across the install, and
    /// `cancel_matchmaking` empties the slot under the same lock.
    fn install_if_pending(
        &self,
        ticket: u64,
        requester: Profile,
        opponent: Profile,
    ) -> Result<Match, ArenaError> {
        let mm = self.inner.matchmaking.lock();
        if !mm.pending.as_ref().is_some_and(|(t, _)| *t == ticket) {
            return Err(ArenaError::MatchmakingCancelled);
        }
        let m = Match::new(requester, opponent);
        self.inner.store.install(m.clone());
        drop(mm);
        Ok(m)
    }

    async fn find_opponent(&self, requester: &Profile) -> Profile {
        tokio::time::sleep(self.inner.config.matchmaking_delay).await;
        requester.fabricate_opponent()
    }

    /// Abandon the outstanding matchmaking request. Returns whether there
    /// was one.
    pub fn cancel_matchmaking(&self) -> bool {
        let mut mm = self.inner.matchmaking.lock();
        let pending = mm.pending.take();
        match pending {
            Some((_, cancel)) => {
                cancel.cancel();
                drop(mm);
                info!("matchmaking cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.inner.matchmaking.lock().pending.is_some()
    }

    pub fn stage(&self) -> LobbyStage {
        if self.is_searching() {
            return LobbyStage::Searching;
        }
        match self.inner.store.current() {
            None => LobbyStage::Lobby,
            Some(m) if m.is_active() => LobbyStage::InProgress,
            Some(_) => LobbyStage::Results,
        }
    }

    pub fn snapshot(&self, match_id: &MatchId) -> Option<Match> {
        self.inner.store.snapshot(match_id)
    }

    pub fn current_match(&self) -> Option<Match> {
        self.inner.store.current()
    }

    /// Play `action_id` for `username`.
    ///
    /// Rejections come back as `Ok(Resolution::Rejected(_))` and leave the
    /// match unchanged. Subscribers receive a snapshot after every applied
    /// action.
    #[instrument(skip(self, match_id), fields(match_id = %match_id))]
    pub async fn submit_action(
        &self,
        match_id: &MatchId,
        username: &str,
        action_id: &str,
    ) -> Result<Resolution, ArenaError> {
        let notifier = &self.inner.notifier;
        let outcome = self.inner.store.update(match_id, |m| {
            let resolution = resolve_action(m, username, action_id)?;
            if resolution.is_applied() {
                notifier.publish(m);
            }
            Ok::<_, ArenaError>((resolution, m.winner.clone()))
        });

        let (resolution, winner) = match outcome {
            Some(result) => result?,
            None => (Resolution::Rejected(Rejection::NoSuchMatch), None),
        };
        match &resolution {
            Resolution::Applied(report) if report.finished => {
                info!(winner = winner.as_deref().unwrap_or_default(), "match finished");
            }
            Resolution::Applied(report) => {
                debug!(
                    damage = report.damage_dealt,
                    restored = report.integrity_restored,
                    "action applied"
                );
            }
            Resolution::Rejected(reason) => debug!(%reason, "action rejected"),
        }
        Ok(resolution)
    }

    /// Receive a snapshot of `match_id` after every change.
    ///
    /// If the match has an autonomous player, its driver runs for as long as
    /// the subscription lives. Must be called from within a Tokio runtime.
    pub fn subscribe<F>(&self, match_id: MatchId, on_update: F) -> Subscription
    where
        F: FnMut(Match) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let rx = self.inner.notifier.receiver();
        let mut tasks = vec![tokio::spawn(forward_updates(
            rx,
            match_id,
            on_update,
            cancel.child_token(),
        ))];

        let bot = self
            .snapshot(&match_id)
            .and_then(|m| m.autonomous_player().map(|p| p.username().to_string()));
        if let Some(username) = bot {
            tasks.push(tokio::spawn(drive_opponent(
                self.clone(),
                match_id,
                username,
                Arc::clone(&self.inner.strategy),
                self.inner.config.opponent_interval,
                cancel.child_token(),
            )));
        }

        debug!(%match_id, tasks = tasks.len(), "subscribed");
        Subscription::new(match_id, cancel, tasks)
    }

    /// Discard the match and go back to the lobby
    pub fn return_to_lobby(&self, match_id: &MatchId) -> Option<Match> {
        let discarded = self.inner.store.discard(match_id);
        if let Some(m) = &discarded {
            info!(match_id = %m.id, status = ?m.status, "match discarded");
        }
        discarded
    }
}
