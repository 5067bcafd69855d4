//! Opponent strategies
//!
//! An autonomous player picks its move through an [`OpponentStrategy`]. The
//! driver hands it only the actions the player can currently afford.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::catalog::Action;
use crate::random::SeededRng;
use crate::state::Player;
use crate::MAX_INTEGRITY;

/// Chooses a move for an autonomous player.
///
/// `affordable` is never empty when called by the driver. Returning `None`
/// passes on this tick; the driver asks again on the next one.
pub trait OpponentStrategy: Send + Sync {
    fn choose(&self, player: &Player, affordable: &[&'static Action]) -> Option<&'static Action>;
}

impl<F> OpponentStrategy for F
where
    F: Fn(&Player, &[&'static Action]) -> Option<&'static Action> + Send + Sync,
{
    fn choose(&self, player: &Player, affordable: &[&'static Action]) -> Option<&'static Action> {
        self(player, affordable)
    }
}

/// Built-in strategy kinds, selectable from configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyBase {
    /// Uniform choice among affordable actions.
    #[default]
    Random,
    /// Always the cheapest affordable action.
    Cheapest,
    /// Action with the biggest useful effect right now.
    Strongest,
}

/// Instantiate a built-in strategy
pub fn build_strategy(base: StrategyBase) -> Arc<dyn OpponentStrategy> {
    match base {
        StrategyBase::Random => Arc::new(RandomStrategy::from_entropy()),
        StrategyBase::Cheapest => Arc::new(CheapestStrategy),
        StrategyBase::Strongest => Arc::new(StrongestStrategy),
    }
}

/// Human-readable description of a strategy kind
pub fn describe_strategy(base: StrategyBase) -> &'static str {
    match base {
        StrategyBase::Random => "Picks any affordable action at random.",
        StrategyBase::Cheapest => "Spends as little energy as possible each turn.",
        StrategyBase::Strongest => "Plays the affordable action with the largest effect.",
    }
}

pub struct RandomStrategy {
    rng: Mutex<SeededRng>,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SeededRng::new(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SeededRng::from_entropy()),
        }
    }
}

impl OpponentStrategy for RandomStrategy {
    fn choose(&self, _player: &Player, affordable: &[&'static Action]) -> Option<&'static Action> {
        self.rng.lock().pick(affordable).copied()
    }
}

pub struct CheapestStrategy;

impl OpponentStrategy for CheapestStrategy {
    fn choose(&self, _player: &Player, affordable: &[&'static Action]) -> Option<&'static Action> {
        affordable.iter().copied().min_by_key(|a| a.cost)
    }
}

pub struct StrongestStrategy;

impl StrongestStrategy {
    /// Damage plus the part of the heal that would not be clamped away
    fn value(player: &Player, action: &Action) -> u32 {
        let missing = (MAX_INTEGRITY - player.system_integrity).max(0) as u32;
        action.hit() + action.self_heal().min(missing)
    }
}

impl OpponentStrategy for StrongestStrategy {
    fn choose(&self, player: &Player, affordable: &[&'static Action]) -> Option<&'static Action> {
        let mut best: Option<&'static Action> = None;
        for &action in affordable {
            let better = match best {
                None => true,
                Some(b) => {
                    let (va, vb) = (Self::value(player, action), Self::value(player, b));
                    va > vb || (va == vb && action.cost < b.cost)
                }
            };
            if better {
                best = Some(action);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{affordable, find_by_id, Role};
    use crate::state::{Controller, Profile};

    fn defender(integrity: i32, energy: u32) -> Player {
        let mut p = Player::new(Profile::new("Firewall", Role::Defender), Controller::Autonomous);
        p.system_integrity = integrity;
        p.energy = energy;
        p
    }

    #[test]
    fn test_random_is_reproducible() {
        let player = defender(100, 10);
        let options = affordable(Role::Defender, 10);
        let a = RandomStrategy::new(42);
        let b = RandomStrategy::new(42);

        for _ in 0..20 {
            assert_eq!(
                a.choose(&player, &options).map(|x| x.id),
                b.choose(&player, &options).map(|x| x.id)
            );
        }
    }

    #[test]
    fn test_random_only_returns_offered_actions() {
        let player = defender(100, 3);
        let options = affordable(Role::Defender, 3);
        let s = RandomStrategy::new(9);

        for _ in 0..50 {
            let pick = s.choose(&player, &options).unwrap();
            assert!(pick.cost <= 3);
        }
        assert!(s.choose(&player, &[]).is_none());
    }

    #[test]
    fn test_cheapest() {
        let player = defender(100, 10);
        let options = affordable(Role::Defender, 10);
        let pick = CheapestStrategy.choose(&player, &options).unwrap();
        assert_eq!(pick.id, "threat_intelligence_scan");
    }

    #[test]
    fn test_strongest_skips_wasted_heals() {
        // Full integrity: only the honeypot's damage counts
        let player = defender(100, 10);
        let options = affordable(Role::Defender, 10);
        assert_eq!(StrongestStrategy.choose(&player, &options).unwrap().id, "honeypot_deploy");

        // Badly hurt: isolate_endpoint heals 30
        let player = defender(40, 5);
        let options = affordable(Role::Defender, 5);
        assert_eq!(StrongestStrategy.choose(&player, &options).unwrap().id, "isolate_endpoint");
    }

    #[test]
    fn test_closure_strategy() {
        let always_firewall = |_: &Player, offered: &[&'static Action]| {
            offered.iter().copied().find(|a| a.id == "firewall_update")
        };
        let player = defender(100, 5);
        let options = affordable(Role::Defender, 5);
        assert_eq!(
            always_firewall.choose(&player, &options),
            Some(find_by_id("firewall_update").unwrap())
        );
    }

    #[test]
    fn test_build_strategy_kinds() {
        let player = defender(100, 10);
        let options = affordable(Role::Defender, 10);
        for base in [StrategyBase::Random, StrategyBase::Cheapest, StrategyBase::Strongest] {
            assert!(build_strategy(base).choose(&player, &options).is_some());
            assert!(!describe_strategy(base).is_empty());
        }
    }
}
