//! Match data model
//!
//! Everything here is plain owned data, so `clone()` is a deep copy. That is
//! what snapshots rely on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Role;
use crate::error::ArenaError;
use crate::{MAX_ENERGY, MAX_INTEGRITY, STARTING_ENERGY};

/// Unique identifier for a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for MatchId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "match-{}", self.0)
    }
}

impl core::str::FromStr for MatchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("match-").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

/// Player identity. Only `username` and `role` matter to the rules; the
/// rest is shown on the player panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub role: Role,
    pub avatar_url: String,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
}

impl Profile {
    /// Profile with default cosmetics
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        let username = username.into();
        Self {
            avatar_url: format!("https://i.pravatar.cc/150?u={}", username.to_lowercase()),
            username,
            role,
            level: 1,
            xp: 0,
            xp_to_next_level: 1000,
        }
    }

    /// Build the opponent matchmaking pairs with this profile.
    ///
    /// Attackers face "Firewall", defenders face "Nyx". The name gets a
    /// "-bot" suffix if it would collide with the requester's.
    pub fn fabricate_opponent(&self) -> Profile {
        let role = self.role.opponent();
        let base = match role {
            Role::Defender => "Firewall",
            Role::Attacker => "Nyx",
        };
        let username = if self.username == base {
            format!("{}-bot", base)
        } else {
            base.to_string()
        };
        Profile {
            avatar_url: format!("https://i.pravatar.cc/150?u={}", base.to_lowercase()),
            username,
            role,
            level: 14,
            xp: 100,
            xp_to_next_level: 1000,
        }
    }
}

/// Who chooses a player's moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Controller {
    Human,
    Autonomous,
}

/// Per-match player state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub profile: Profile,
    pub system_integrity: i32,
    pub energy: u32,
    pub max_energy: u32,
    pub controller: Controller,
}

impl Player {
    pub fn new(profile: Profile, controller: Controller) -> Self {
        Self {
            profile,
            system_integrity: MAX_INTEGRITY,
            energy: STARTING_ENERGY,
            max_energy: MAX_ENERGY,
            controller,
        }
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn is_autonomous(&self) -> bool {
        self.controller == Controller::Autonomous
    }
}

/// One line of the battle log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Uuid,
    pub turn: u32,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    Active,
    Finished,
}

/// How a finished match looks from one player's seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Victory,
    Defeat,
    Draw,
}

/// A two-player match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub players: [Player; 2],
    /// Username of the player entitled to act next
    pub current_turn: String,
    pub turn_number: u32,
    pub log: Vec<LogEntry>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

impl Match {
    /// Start a match between a human requester and an autonomous opponent.
    /// The requester moves first.
    pub fn new(requester: Profile, opponent: Profile) -> Self {
        Self::between(
            Player::new(requester, Controller::Human),
            Player::new(opponent, Controller::Autonomous),
        )
    }

    /// Start a match between two prepared players. `first` moves first.
    pub fn between(first: Player, second: Player) -> Self {
        debug_assert_ne!(first.username(), second.username());

        let current_turn = first.username().to_string();
        let mut m = Self {
            id: MatchId::new(),
            players: [first, second],
            current_turn,
            turn_number: 1,
            log: Vec::new(),
            status: MatchStatus::Active,
            winner: None,
        };
        let started = format!(
            "Match started between {} and {}!",
            m.players[0].username(),
            m.players[1].username()
        );
        m.push_log(started);
        m.push_log(format!("{}'s turn.", m.current_turn));
        m
    }

    /// Append a log entry stamped with the current turn number
    pub fn push_log(&mut self, text: impl Into<String>) {
        self.log.push(LogEntry {
            id: Uuid::new_v4(),
            turn: self.turn_number,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn is_active(&self) -> bool {
        self.status == MatchStatus::Active
    }

    pub fn player(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.username() == username)
    }

    pub fn opponent_of(&self, username: &str) -> Option<&Player> {
        if self.player(username).is_none() {
            return None;
        }
        self.players.iter().find(|p| p.username() != username)
    }

    /// Slot index of `username`, if they play in this match
    pub(crate) fn slot_of(&self, username: &str) -> Option<usize> {
        self.players.iter().position(|p| p.username() == username)
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> Option<&Player> {
        self.player(&self.current_turn)
    }

    /// The autonomous player, if any
    pub fn autonomous_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_autonomous())
    }

    /// Check a match that came from outside the engine, e.g. browser JSON.
    ///
    /// Matches built by [`Match::new`] and advanced by the resolver always
    /// pass.
    pub fn validate(&self) -> Result<(), ArenaError> {
        let invalid = |reason: String| Err(ArenaError::InvalidMatch { reason });

        let [a, b] = &self.players;
        if a.username() == b.username() {
            return invalid(format!("both players are named {}", a.username()));
        }
        if self.player(&self.current_turn).is_none() {
            let reason = format!("current turn belongs to unknown player {}", self.current_turn);
            return invalid(reason);
        }
        for p in &self.players {
            if !(0..=MAX_INTEGRITY).contains(&p.system_integrity) {
                return invalid(format!(
                    "{} has integrity {} outside 0..={}",
                    p.username(),
                    p.system_integrity,
                    MAX_INTEGRITY
                ));
            }
            if p.max_energy > MAX_ENERGY || p.energy > p.max_energy {
                return invalid(format!(
                    "{} has energy {}/{} above the cap of {}",
                    p.username(),
                    p.energy,
                    p.max_energy,
                    MAX_ENERGY
                ));
            }
        }
        match (&self.status, &self.winner) {
            (MatchStatus::Active, Some(w)) => {
                invalid(format!("active match already won by {}", w))
            }
            (MatchStatus::Finished, Some(w)) if self.player(w).is_none() => {
                invalid(format!("winner {} is not in the match", w))
            }
            _ => Ok(()),
        }
    }

    /// Result as seen by `username`. `None` while the match is running or
    /// if they are not in it.
    pub fn outcome_for(&self, username: &str) -> Option<MatchOutcome> {
        if self.is_active() || self.player(username).is_none() {
            return None;
        }
        Some(match &self.winner {
            Some(w) if w == username => MatchOutcome::Victory,
            Some(_) => MatchOutcome::Defeat,
            None => MatchOutcome::Draw,
        })
    }
}
