//! WASM bindings for the browser battle screen
//!
//! The browser keeps the match as JSON and calls into these functions to
//! resolve moves, so the rules live in one place.

#![cfg(feature = "wasm")]

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::catalog::{actions_for, affordable, find_by_id, Action, Role};
use crate::error::ArenaError;
use crate::resolver::{resolve_action, Resolution};
use crate::state::{Match, Player, Profile};
use crate::strategy::{describe_strategy, OpponentStrategy, RandomStrategy, StrategyBase};

fn parse_role(role: &str) -> Result<Role, JsError> {
    match role {
        "Attacker" | "Hacker" => Ok(Role::Attacker),
        "Defender" | "Cyber Security" => Ok(Role::Defender),
        _ => Err(JsError::new(&format!("Unknown role: {}", role))),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Actions available to a role, in display order
#[wasm_bindgen]
pub fn get_actions(role: &str) -> Result<JsValue, JsError> {
    to_js(&actions_for(parse_role(role)?))
}

/// One-line summary of an action for tooltips
#[wasm_bindgen]
pub fn describe_action(action_id: &str) -> Result<String, JsError> {
    let action = find_by_id(action_id).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(summarize(action))
}

fn summarize(action: &Action) -> String {
    let mut desc = format!("{} Costs {} energy.", action.description, action.cost);
    if action.hit() > 0 {
        desc.push_str(&format!(" Deals {} damage.", action.hit()));
    }
    if action.self_heal() > 0 {
        desc.push_str(&format!(" Restores {} integrity.", action.self_heal()));
    }
    desc
}

/// Start a match for a profile against a fabricated opponent
///
/// # Arguments
/// * `profile_json` - JSON serialized Profile of the requesting player
///
/// # Returns
/// JSON serialized Match
#[wasm_bindgen]
pub fn create_match(profile_json: &str) -> Result<JsValue, JsError> {
    let requester: Profile = serde_json::from_str(profile_json)
        .map_err(|e| JsError::new(&format!("Invalid profile: {}", e)))?;
    let opponent = requester.fabricate_opponent();
    to_js(&Match::new(requester, opponent))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Applied {
    #[serde(rename = "match")]
    state: Match,
    resolution: Resolution,
}

/// Resolve a move against a match
///
/// # Returns
/// `{ match, resolution }`; `match` is unchanged when the move was rejected
#[wasm_bindgen]
pub fn apply_action(match_json: &str, actor: &str, action_id: &str) -> Result<JsValue, JsError> {
    let applied = apply_json(match_json, actor, action_id)
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&applied)
}

fn apply_json(match_json: &str, actor: &str, action_id: &str) -> Result<Applied, ArenaError> {
    let mut state: Match = serde_json::from_str(match_json)?;
    state.validate()?;
    let resolution = resolve_action(&mut state, actor, action_id)?;
    Ok(Applied { state, resolution })
}

/// Pick a move for an autonomous player, or `undefined` to pass
#[wasm_bindgen]
pub fn choose_opponent_action(player_json: &str, seed: u64) -> Result<Option<String>, JsError> {
    let pick = opponent_pick(player_json, seed).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(pick.map(str::to_string))
}

fn opponent_pick(player_json: &str, seed: u64) -> Result<Option<&'static str>, ArenaError> {
    let player: Player = serde_json::from_str(player_json)?;
    let options: Vec<&'static Action> = affordable(player.role(), player.energy);
    Ok(RandomStrategy::new(seed).choose(&player, &options).map(|a| a.id))
}

#[derive(Serialize)]
struct StrategyInfo {
    id: StrategyBase,
    description: &'static str,
}

/// All built-in opponent strategies
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<_> = [StrategyBase::Random, StrategyBase::Cheapest, StrategyBase::Strongest]
        .into_iter()
        .map(|id| StrategyInfo { id, description: describe_strategy(id) })
        .collect();
    to_js(&types)
}
