//! Action resolution
//!
//! Applies one submitted action to a match. Deterministic; the only inputs
//! are the match, the actor and the catalog.

use serde::Serialize;

use crate::catalog::{find_by_id, Action};
use crate::error::ArenaError;
use crate::state::{Match, MatchStatus};
use crate::{ENERGY_REGEN, MAX_INTEGRITY};

/// Why a submission was ignored. The match is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "reason")]
pub enum Rejection {
    NoSuchMatch,
    MatchFinished,
    NotYourTurn,
    InsufficientEnergy { required: u32, available: u32 },
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Rejection::NoSuchMatch => write!(f, "no active match with that id"),
            Rejection::MatchFinished => write!(f, "the match is already over"),
            Rejection::NotYourTurn => write!(f, "it is not your turn"),
            Rejection::InsufficientEnergy { required, available } => {
                write!(f, "not enough energy ({} needed, {} available)", required, available)
            }
        }
    }
}

/// What an applied action did
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    pub action: &'static str,
    pub energy_spent: u32,
    /// Integrity the opponent actually lost, after clamping
    pub damage_dealt: u32,
    /// Integrity the actor actually gained, after clamping
    pub integrity_restored: u32,
    pub finished: bool,
}

/// Result of a submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum Resolution {
    Applied(ActionReport),
    Rejected(Rejection),
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Resolution::Rejected(r) => Some(*r),
            Resolution::Applied(_) => None,
        }
    }
}

/// Resolve `action_id` played by `actor` against `m`.
///
/// Rejections are returned as `Ok(Resolution::Rejected(_))` and never
/// mutate `m`. An id missing from the catalog, or an action belonging to
/// the other faction, is an `Err`.
///
/// Order of effects:
/// 1. debit cost
/// 2. damage the opponent
/// 3. `defense` heals the actor
/// 4. negative `damage` heals the actor (stacks with 3)
/// 5. clamp both players to [0, 100]
/// 6. opponent at 0: actor wins, turn stays; otherwise hand over the turn
///    and grant the next player energy
pub fn resolve_action(
    m: &mut Match,
    actor: &str,
    action_id: &str,
) -> Result<Resolution, ArenaError> {
    if m.status == MatchStatus::Finished {
        return Ok(Resolution::Rejected(Rejection::MatchFinished));
    }
    let me = match m.slot_of(actor) {
        Some(slot) if m.current_turn == actor => slot,
        _ => return Ok(Resolution::Rejected(Rejection::NotYourTurn)),
    };
    let them = 1 - me;

    let action = find_by_id(action_id)?;
    if action.role != m.players[me].role() {
        return Err(ArenaError::ActionNotPermitted {
            action: action.id,
            role: m.players[me].role(),
        });
    }

    let available = m.players[me].energy;
    if available < action.cost {
        return Ok(Resolution::Rejected(Rejection::InsufficientEnergy {
            required: action.cost,
            available,
        }));
    }

    Ok(Resolution::Applied(apply(m, me, them, action)))
}

fn apply(m: &mut Match, me: usize, them: usize, action: &'static Action) -> ActionReport {
    let actor = m.players[me].username().to_string();
    let target = m.players[them].username().to_string();
    let my_before = m.players[me].system_integrity;
    let their_before = m.players[them].system_integrity;

    m.players[me].energy -= action.cost;
    m.push_log(format!("{} uses {}.", actor, action.name));

    if action.damage > 0 {
        m.players[them].system_integrity -= action.damage;
        m.push_log(format!("{} deals {} damage to {}.", action.name, action.damage, target));
    }
    if action.defense > 0 {
        m.players[me].system_integrity += action.defense as i32;
        m.push_log(format!("{} restores {} integrity for {}.", action.name, action.defense, actor));
    }
    if action.damage < 0 {
        let heal = action.damage.unsigned_abs();
        m.players[me].system_integrity += heal as i32;
        m.push_log(format!("{} restores {} integrity.", action.name, heal));
    }

    for player in m.players.iter_mut() {
        player.system_integrity = player.system_integrity.clamp(0, MAX_INTEGRITY);
    }

    let finished = m.players[them].system_integrity <= 0;
    if finished {
        m.status = MatchStatus::Finished;
        m.winner = Some(actor.clone());
        m.push_log(format!("{}'s system is compromised! {} wins!", target, actor));
    } else {
        m.current_turn = target;
        m.turn_number += 1;
        let next = &mut m.players[them];
        next.energy = next.energy.saturating_add(ENERGY_REGEN).min(next.max_energy);
        let text = format!("It is now {}'s turn.", m.current_turn);
        m.push_log(text);
    }

    ActionReport {
        action: action.id,
        energy_spent: action.cost,
        damage_dealt: (their_before - m.players[them].system_integrity).max(0) as u32,
        integrity_restored: (m.players[me].system_integrity - my_before).max(0) as u32,
        finished,
    }
}
