//! Where snapshot documents live.
//!
//! The engine never talks to the outside world directly; it reads and
//! writes snapshots through [`SnapshotStore`]. Production implementations
//! put documents wherever the transport keeps them (a pinned channel
//! message, object storage, a database row); tests use [`MemoryStore`].

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::error::{EngineError, EngineResult};

/// Identifier of one game, assigned by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        GameId(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        GameId::new(id)
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        GameId(id)
    }
}

/// The persistence seam between the engine and the transport.
pub trait SnapshotStore: Send + Sync {
    /// The latest published snapshot for a game.
    fn load_latest(&self, id: &GameId) -> EngineResult<Vec<u8>>;

    /// Publish a new latest snapshot for a game.
    fn publish(&self, id: &GameId, snapshot: &[u8]) -> EngineResult<()>;
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<FxHashMap<GameId, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of games with a published snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemoryStore {
    fn load_latest(&self, id: &GameId) -> EngineResult<Vec<u8>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("snapshot", id.as_str()))
    }

    fn publish(&self, id: &GameId, snapshot: &[u8]) -> EngineResult<()> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), snapshot.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_miss_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load_latest(&GameId::from("missing")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "snapshot", .. }));
    }

    #[test]
    fn test_publish_then_load_latest() {
        let store = MemoryStore::new();
        let id = GameId::from("table-1");
        store.publish(&id, b"first").unwrap();
        assert_eq!(store.load_latest(&id).unwrap(), b"first");

        store.publish(&id, b"second").unwrap();
        assert_eq!(store.load_latest(&id).unwrap(), b"second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_game_id_display_round_trip() {
        let id = GameId::from("landsraad-42");
        assert_eq!(id.to_string(), "landsraad-42");
        assert_eq!(id.as_str(), "landsraad-42");
        assert_eq!(GameId::new(String::from("landsraad-42")), id);
    }
}
