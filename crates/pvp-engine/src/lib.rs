//! PVP match engine for Breach Arena
//!
//! Turn-based attacker vs defender matches: matchmaking against an
//! autonomous opponent, action resolution, and live match snapshots.
//! This crate is compiled to:
//! - Native, with the Tokio-backed [`Arena`] (feature `runtime`, default)
//! - WASM, exposing the pure rules to the browser (feature `wasm`)

mod catalog;
mod config;
mod error;
mod random;
mod resolver;
mod state;
mod store;
mod strategy;

#[cfg(feature = "runtime")]
mod arena;
#[cfg(feature = "runtime")]
mod driver;
#[cfg(feature = "runtime")]
mod notifier;

#[cfg(feature = "wasm")]
mod wasm;

pub use catalog::{
    actions_for, affordable, all_actions, find_by_id, Action, Role, ATTACKER_ACTIONS,
    DEFENDER_ACTIONS,
};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use random::SeededRng;
pub use resolver::{resolve_action, ActionReport, Rejection, Resolution};
pub use state::{Controller, LogEntry, Match, MatchId, MatchOutcome, MatchStatus, Player, Profile};
pub use store::MatchStore;
pub use strategy::{
    build_strategy, describe_strategy, CheapestStrategy, OpponentStrategy, RandomStrategy,
    StrategyBase, StrongestStrategy,
};

#[cfg(feature = "runtime")]
pub use arena::{Arena, LobbyStage};
#[cfg(feature = "runtime")]
pub use notifier::{Subscription, UpdateNotifier};

/// Ceiling for system integrity; every player starts here
pub const MAX_INTEGRITY: i32 = 100;

/// Energy each player starts a match with
pub const STARTING_ENERGY: u32 = 5;

/// Energy cap for the whole match
pub const MAX_ENERGY: u32 = 10;

/// Energy granted to the player whose turn begins
pub const ENERGY_REGEN: u32 = 4;
