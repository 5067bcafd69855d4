//! Action catalog
//!
//! Static per-role tables of every move a player can make. The tables are
//! fixed at compile time and never mutated.

use serde::{Deserialize, Serialize};
use crate::error::ArenaError;

/// Faction a player fights for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Offensive side. Deals damage.
    #[serde(alias = "Hacker")]
    Attacker,
    /// Defensive side. Mostly restores its own integrity.
    #[serde(alias = "Cyber Security")]
    Defender,
}

impl Role {
    /// The opposing faction
    pub fn opponent(self) -> Self {
        match self {
            Role::Attacker => Role::Defender,
            Role::Defender => Role::Attacker,
        }
    }

    /// Label shown in the dashboard
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Attacker => "Hacker",
            Role::Defender => "Cyber Security",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A catalog entry
///
/// `damage` is signed: positive values hit the opponent, negative values
/// heal the acting player. `defense` always heals the acting player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub damage: i32,
    pub defense: u32,
    pub role: Role,
}

impl Action {
    /// Integrity this action restores to its user (defense plus any
    /// negative damage)
    pub fn self_heal(&self) -> u32 {
        let heal = if self.damage < 0 { self.damage.unsigned_abs() } else { 0 };
        self.defense + heal
    }

    /// Damage this action deals to the opponent
    pub fn hit(&self) -> u32 {
        if self.damage > 0 { self.damage as u32 } else { 0 }
    }
}

pub static ATTACKER_ACTIONS: [Action; 5] = [
    Action {
        id: "phishing_email",
        name: "Phishing Email",
        description: "A low-cost attack that deals minor damage if it bypasses filters.",
        cost: 2,
        damage: 10,
        defense: 0,
        role: Role::Attacker,
    },
    Action {
        id: "ddos_swarm",
        name: "DDoS Swarm",
        description: "Overwhelms the target, dealing moderate, consistent damage.",
        cost: 4,
        damage: 20,
        defense: 0,
        role: Role::Attacker,
    },
    Action {
        id: "sql_injection",
        name: "SQL Injection",
        description: "A precise attack that bypasses weak defenses for high damage.",
        cost: 6,
        damage: 35,
        defense: 0,
        role: Role::Attacker,
    },
    Action {
        id: "credential_stuffing",
        name: "Credential Stuffing",
        description: "Attempts to find a weak password. Low damage, but cheap.",
        cost: 3,
        damage: 15,
        defense: 0,
        role: Role::Attacker,
    },
    Action {
        id: "rootkit_install",
        name: "Rootkit Install",
        description: "Ultimate attack. Very high cost, deals devastating damage.",
        cost: 10,
        damage: 60,
        defense: 0,
        role: Role::Attacker,
    },
];

pub static DEFENDER_ACTIONS: [Action; 5] = [
    Action {
        id: "firewall_update",
        name: "Firewall Update",
        description: "Basic defense. Blocks a small amount of incoming damage.",
        cost: 2,
        damage: 0,
        defense: 10,
        role: Role::Defender,
    },
    Action {
        id: "isolate_endpoint",
        name: "Isolate Endpoint",
        description: "Temporarily shields the system from most attacks.",
        cost: 5,
        damage: 0,
        defense: 30,
        role: Role::Defender,
    },
    Action {
        id: "patch_vulnerability",
        name: "Patch Vulnerability",
        description: "Heals system integrity by fixing a known exploit.",
        cost: 4,
        damage: -20,
        defense: 0,
        role: Role::Defender,
    },
    Action {
        id: "threat_intelligence_scan",
        name: "Threat Intel Scan",
        description: "Analyze attack patterns to gain energy for a stronger response.",
        cost: 1,
        damage: 0,
        defense: 5,
        role: Role::Defender,
    },
    Action {
        id: "honeypot_deploy",
        name: "Deploy Honeypot",
        description: "Lays a trap. Blocks damage and reflects a portion back to the attacker.",
        cost: 7,
        damage: 15,
        defense: 15,
        role: Role::Defender,
    },
];

/// Actions available to a role, in display order
pub fn actions_for(role: Role) -> &'static [Action] {
    match role {
        Role::Attacker => &ATTACKER_ACTIONS,
        Role::Defender => &DEFENDER_ACTIONS,
    }
}

/// Every action in the catalog, attacker table first
pub fn all_actions() -> impl Iterator<Item = &'static Action> {
    ATTACKER_ACTIONS.iter().chain(DEFENDER_ACTIONS.iter())
}

/// Look up an action by id
pub fn find_by_id(id: &str) -> Result<&'static Action, ArenaError> {
    all_actions()
        .find(|a| a.id == id)
        .ok_or_else(|| ArenaError::ActionNotFound(id.to_string()))
}

/// Actions of `role` that cost at most `energy`
pub fn affordable(role: Role, energy: u32) -> Vec<&'static Action> {
    actions_for(role).iter().filter(|a| a.cost <= energy).collect()
}
