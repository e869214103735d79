//! Most-recent snapshot cache.
//!
//! One slot per game id, each behind its own mutex, so commands against the
//! same game serialize while different games proceed in parallel. A slot
//! holds the latest published snapshot text and, once a command has paid
//! the parse cost, the live aggregate itself.

use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::game::Game;
use crate::snapshot::store::GameId;

/// Cached state for one game.
#[derive(Debug, Default)]
pub struct GameSlot {
    /// Latest published snapshot text, if any.
    pub text: Option<String>,
    /// Live aggregate matching `text`. Dropped whenever a command fails so
    /// the next command reloads from the published document.
    pub game: Option<Game>,
}

/// Per-game snapshot slots, keyed by game id.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: Mutex<FxHashMap<GameId, Arc<Mutex<GameSlot>>>>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        SnapshotCache::default()
    }

    /// The slot for a game, created empty on first use.
    pub fn slot(&self, id: &GameId) -> Arc<Mutex<GameSlot>> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id.clone()).or_default())
    }

    /// Drop a game's cached state; the next command reloads from the store.
    /// Returns whether anything was cached.
    pub fn invalidate(&self, id: &GameId) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Drop every cached slot.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn contains(&self, id: &GameId) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of games with a cached slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
