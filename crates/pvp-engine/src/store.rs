//! In-memory match store
//!
//! Holds zero or one match. The single mutex covers every read-modify-write,
//! so a resolution (energy, clamps, win check, turn handoff) is atomic.

use parking_lot::Mutex;
use tracing::warn;

use crate::state::{Match, MatchId};

#[derive(Debug, Default)]
pub struct MatchStore {
    slot: Mutex<Option<Match>>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `m` as the live match, returning whatever it replaced
    pub fn install(&self, m: Match) -> Option<Match> {
        let mut slot = self.slot.lock();
        if let Some(old) = slot.as_ref().filter(|old| old.is_active()) {
            warn!(replaced = %old.id, installed = %m.id, "replacing an active match");
        }
        slot.replace(m)
    }

    /// Copy of the match with `id`
    pub fn snapshot(&self, id: &MatchId) -> Option<Match> {
        self.slot.lock().as_ref().filter(|m| m.id == *id).cloned()
    }

    /// Copy of whatever match is stored
    pub fn current(&self) -> Option<Match> {
        self.slot.lock().clone()
    }

    /// Run `f` against the match with `id` while holding the lock.
    /// `None` if no such match is stored.
    pub fn update<R>(&self, id: &MatchId, f: impl FnOnce(&mut Match) -> R) -> Option<R> {
        let mut slot = self.slot.lock();
        match slot.as_mut() {
            Some(m) if m.id == *id => Some(f(m)),
            _ => None,
        }
    }

    /// Remove the match with `id`
    pub fn discard(&self, id: &MatchId) -> Option<Match> {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|m| m.id == *id) {
            slot.take()
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Role;
    use crate::state::Profile;

    fn sample() -> Match {
        let p = Profile::new("Cipher007", Role::Attacker);
        Match::new(p.clone(), p.fabricate_opponent())
    }

    #[test]
    fn test_starts_empty() {
        let store = MatchStore::new();
        assert!(store.is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_install_replaces() {
        let store = MatchStore::new();
        let first = sample();
        let second = sample();
        assert!(store.install(first.clone()).is_none());
        let replaced = store.install(second.clone()).unwrap();
        assert_eq!(replaced.id, first.id);
        assert_eq!(store.current().unwrap().id, second.id);
        assert!(store.snapshot(&first.id).is_none());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let store = MatchStore::new();
        let m = sample();
        store.install(m.clone());

        let mut snap = store.snapshot(&m.id).unwrap();
        assert_eq!(snap, m);
        snap.players[0].system_integrity = 1;
        snap.log.clear();

        assert_eq!(store.snapshot(&m.id).unwrap(), m);
    }

    #[test]
    fn test_update_targets_matching_id() {
        let store = MatchStore::new();
        let m = sample();
        store.install(m.clone());

        assert!(store.update(&MatchId::new(), |m| m.turn_number += 1).is_none());
        assert_eq!(store.update(&m.id, |m| { m.turn_number += 1; m.turn_number }), Some(2));
    }

    #[test]
    fn test_discard() {
        let store = MatchStore::new();
        let m = sample();
        store.install(m.clone());

        assert!(store.discard(&MatchId::new()).is_none());
        assert!(!store.is_empty());
        assert_eq!(store.discard(&m.id).unwrap().id, m.id);
        assert!(store.is_empty());
    }
}
