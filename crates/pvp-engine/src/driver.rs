//! Autonomous opponent driver
//!
//! A scheduled task that plays the autonomous player's turns through the
//! same [`Arena::submit_action`] entry point a human caller uses.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::arena::Arena;
use crate::catalog::affordable;
use crate::state::MatchId;
use crate::strategy::OpponentStrategy;

/// Outcome of one driver tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Not our turn, or nothing affordable. Try again later.
    Waited,
    /// Submitted a move.
    Moved,
    /// Match is over or gone.
    Done,
}

pub(crate) async fn drive_opponent(
    arena: Arena,
    match_id: MatchId,
    username: String,
    strategy: Arc<dyn OpponentStrategy>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(%match_id, %username, "autonomous opponent started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if take_turn(&arena, &match_id, &username, strategy.as_ref()).await == Tick::Done {
                    break;
                }
            }
        }
    }
    info!(%match_id, %username, "autonomous opponent stopped");
}

/// Play one move for `username` if it is their turn
pub(crate) async fn take_turn(
    arena: &Arena,
    match_id: &MatchId,
    username: &str,
    strategy: &dyn OpponentStrategy,
) -> Tick {
    let Some(m) = arena.snapshot(match_id) else {
        return Tick::Done;
    };
    if !m.is_active() {
        return Tick::Done;
    }
    if m.current_turn != username {
        return Tick::Waited;
    }
    let Some(player) = m.player(username) else {
        return Tick::Done;
    };

    let options = affordable(player.role(), player.energy);
    if options.is_empty() {
        debug!(%match_id, username, energy = player.energy, "no affordable action, passing");
        return Tick::Waited;
    }
    let Some(action) = strategy.choose(player, &options) else {
        return Tick::Waited;
    };

    match arena.submit_action(match_id, username, action.id).await {
        Ok(resolution) if resolution.is_applied() => Tick::Moved,
        Ok(resolution) => {
            debug!(
                %match_id,
                username,
                action = action.id,
                ?resolution,
                "opponent move not applied"
            );
            Tick::Waited
        }
        Err(e) => {
            warn!(
                %match_id,
                username,
                action = action.id,
                error = %e,
                "strategy chose an invalid action"
            );
            Tick::Waited
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Action, Role};
    use crate::config::ArenaConfig;
    use crate::state::{Player, Profile};
    use crate::strategy::CheapestStrategy;

    fn arena_with_match() -> (Arena, MatchId) {
        let arena = Arena::new(ArenaConfig::default()).unwrap();
        let p = Profile::new("Cipher007", Role::Attacker);
        let m = crate::state::Match::new(p.clone(), p.fabricate_opponent());
        let id = m.id;
        arena.store().install(m);
        (arena, id)
    }

    #[tokio::test]
    async fn test_waits_for_its_turn() {
        let (arena, id) = arena_with_match();
        let tick = take_turn(&arena, &id, "Firewall", &CheapestStrategy).await;
        assert_eq!(tick, Tick::Waited);
        assert_eq!(arena.snapshot(&id).unwrap().turn_number, 1);
    }

    #[tokio::test]
    async fn test_moves_on_its_turn() {
        let (arena, id) = arena_with_match();
        arena.submit_action(&id, "Cipher007", "phishing_email").await.unwrap();

        let tick = take_turn(&arena, &id, "Firewall", &CheapestStrategy).await;
        assert_eq!(tick, Tick::Moved);

        let m = arena.snapshot(&id).unwrap();
        assert_eq!(m.current_turn, "Cipher007");
        assert!(m.log.iter().any(|e| e.text == "Firewall uses Threat Intel Scan."));
    }

    #[tokio::test]
    async fn test_passes_without_affordable_action() {
        let (arena, id) = arena_with_match();
        arena.submit_action(&id, "Cipher007", "phishing_email").await.unwrap();
        arena.store().update(&id, |m| m.players[1].energy = 0);

        let tick = take_turn(&arena, &id, "Firewall", &CheapestStrategy).await;
        assert_eq!(tick, Tick::Waited);
        assert_eq!(arena.snapshot(&id).unwrap().current_turn, "Firewall");
    }

    #[tokio::test]
    async fn test_invalid_choice_is_not_applied() {
        let (arena, id) = arena_with_match();
        arena.submit_action(&id, "Cipher007", "phishing_email").await.unwrap();
        let cheat = |_: &Player, _: &[&'static Action]| {
            crate::catalog::find_by_id("rootkit_install").ok()
        };

        let tick = take_turn(&arena, &id, "Firewall", &cheat).await;
        assert_eq!(tick, Tick::Waited);
        assert_eq!(arena.snapshot(&id).unwrap().turn_number, 2);
    }

    #[tokio::test]
    async fn test_done_when_match_gone_or_finished() {
        let (arena, id) = arena_with_match();
        arena.store().update(&id, |m| m.status = crate::state::MatchStatus::Finished);
        assert_eq!(take_turn(&arena, &id, "Firewall", &CheapestStrategy).await, Tick::Done);

        arena.store().discard(&id);
        assert_eq!(take_turn(&arena, &id, "Firewall", &CheapestStrategy).await, Tick::Done);
    }
}
