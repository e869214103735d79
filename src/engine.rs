//! The engine service.
//!
//! One [`Engine`] per process, shared by every transport. It owns the card
//! catalogs, the snapshot cache with its per-game locks, the global
//! [`CommandGuard`], and the [`SnapshotStore`] the deployment persists into.
//!
//! [`Engine::apply_command`] is the only write path, and it is atomic per
//! command: permit, per-game lock, load or reuse the cached aggregate,
//! execute, serialize, publish, cache. Any failure along the way publishes
//! nothing and drops the cached aggregate, so the previously published
//! snapshot stays canonical and the next command starts from it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::PoisonError;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::cards::Catalogs;
use crate::command::{execute, Command};
use crate::error::{EngineError, EngineResult, SchemaError};
use crate::game::setup::{new_game, Seat};
use crate::game::{Game, GameOption};
use crate::guard::CommandGuard;
use crate::snapshot::{self, GameId, SnapshotCache, SnapshotStore};

/// Engine tuning knobs.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Poll interval while waiting for in-flight commands to drain.
    pub guard_poll: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            guard_poll: Duration::from_millis(50),
        }
    }
}

/// What one command changed, for transports that render updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnapshotDelta {
    /// Turn number after the command.
    pub turn: u32,
    /// Factions whose serialized form changed.
    pub changed_factions: Vec<String>,
    /// Territories whose serialized form changed.
    pub changed_territories: Vec<String>,
    /// Chronicle events from command execution.
    pub events: Vec<String>,
}

/// Process-scoped rules service.
pub struct Engine {
    catalogs: Catalogs,
    cache: SnapshotCache,
    guard: CommandGuard,
    store: Box<dyn SnapshotStore>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Engine::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Box<dyn SnapshotStore>, config: EngineConfig) -> Self {
        Engine {
            catalogs: Catalogs::standard(),
            cache: SnapshotCache::new(),
            guard: CommandGuard::new(),
            store,
            config,
        }
    }

    #[must_use]
    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    #[must_use]
    pub fn guard(&self) -> &CommandGuard {
        &self.guard
    }

    /// Create a game, publish its opening snapshot, and cache it.
    pub fn create_game(
        &self,
        id: &GameId,
        seats: &[Seat],
        options: &BTreeSet<GameOption>,
        seed: u64,
    ) -> EngineResult<()> {
        let _permit = self.guard.begin();
        let slot = self.cache.slot(id);
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        // A store miss means the id is free.
        if slot.text.is_some() || self.store.load_latest(id).is_ok() {
            return Err(EngineError::invalid_game_state(format!(
                "game {id} already exists"
            )));
        }
        let game = new_game(seats, options, seed, &self.catalogs)?;
        let text = snapshot::serialize(&game).map_err(EngineError::from)?;
        self.store.publish(id, text.as_bytes())?;
        info!(game = %id, seats = seats.len(), "game created");
        slot.text = Some(text);
        slot.game = Some(game);
        Ok(())
    }

    /// Apply one command under the game's lock; returns what changed.
    pub fn apply_command(&self, id: &GameId, command: &Command) -> EngineResult<SnapshotDelta> {
        let _permit = self.guard.begin();
        let slot = self.cache.slot(id);
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = match slot.text.clone() {
            Some(text) => text,
            None => {
                let bytes = self.store.load_latest(id)?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| EngineError::from(SchemaError::NotUtf8))?;
                slot.text = Some(text.clone());
                text
            }
        };
        // Taking the aggregate out of the slot is what makes failure safe:
        // until the command fully succeeds, the slot holds only the
        // previously published document.
        let mut game = match slot.game.take() {
            Some(game) => game,
            None => match snapshot::deserialize(&previous, &self.catalogs) {
                Ok(game) => game,
                Err(err) => {
                    error!(game = %id, error = %err, "stored snapshot failed to load");
                    return Err(err.into());
                }
            },
        };

        match execute(&mut game, &self.catalogs, command) {
            Ok(events) => {
                let text = snapshot::serialize(&game).map_err(EngineError::from)?;
                self.store.publish(id, text.as_bytes())?;
                let delta = diff_snapshots(&previous, &text, game.turn(), events)?;
                info!(
                    game = %id,
                    turn = delta.turn,
                    factions = delta.changed_factions.len(),
                    territories = delta.changed_territories.len(),
                    "command applied"
                );
                slot.text = Some(text);
                slot.game = Some(game);
                Ok(delta)
            }
            Err(err) => {
                warn!(game = %id, error = %err, "command rejected");
                Err(err)
            }
        }
    }

    /// A copy of the game's current aggregate, loading it on a cache miss.
    pub fn game(&self, id: &GameId) -> EngineResult<Game> {
        let slot = self.cache.slot(id);
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(game) = &slot.game {
            return Ok(game.clone());
        }
        let text = match slot.text.clone() {
            Some(text) => text,
            None => {
                let bytes = self.store.load_latest(id)?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| EngineError::from(SchemaError::NotUtf8))?;
                slot.text = Some(text.clone());
                text
            }
        };
        let game = snapshot::deserialize(&text, &self.catalogs)?;
        slot.game = Some(game.clone());
        Ok(game)
    }

    /// Forget a game's cached state; the next command reloads from the store.
    pub fn invalidate(&self, id: &GameId) -> bool {
        self.cache.invalidate(id)
    }

    /// Wait for in-flight commands to finish, then drop all cached state.
    pub fn drain(&self) {
        self.guard.block_until_idle(self.config.guard_poll);
        self.cache.clear();
        info!("engine drained");
    }
}

/// Diff two snapshot documents by faction name and territory key.
fn diff_snapshots(
    previous: &str,
    current: &str,
    turn: u32,
    events: Vec<String>,
) -> EngineResult<SnapshotDelta> {
    let old: Value = serde_json::from_str(previous).map_err(SchemaError::from)?;
    let new: Value = serde_json::from_str(current).map_err(SchemaError::from)?;
    Ok(SnapshotDelta {
        turn,
        changed_factions: diff_factions(
            old["game_state"]["factions"].as_array(),
            new["game_state"]["factions"].as_array(),
        ),
        changed_territories: diff_territories(
            old["game_state"]["territories"].as_object(),
            new["game_state"]["territories"].as_object(),
        ),
        events,
    })
}

fn diff_factions(old: Option<&Vec<Value>>, new: Option<&Vec<Value>>) -> Vec<String> {
    let mut index: BTreeMap<&str, &Value> = old
        .into_iter()
        .flatten()
        .filter_map(|f| f.get("name").and_then(Value::as_str).map(|n| (n, f)))
        .collect();
    let mut changed = Vec::new();
    for faction in new.into_iter().flatten() {
        let Some(name) = faction.get("name").and_then(Value::as_str) else {
            continue;
        };
        if index.remove(name) != Some(faction) {
            changed.push(name.to_string());
        }
    }
    changed.extend(index.into_keys().map(String::from));
    changed
}

fn diff_territories(
    old: Option<&serde_json::Map<String, Value>>,
    new: Option<&serde_json::Map<String, Value>>,
) -> Vec<String> {
    let empty = serde_json::Map::new();
    let old = old.unwrap_or(&empty);
    let new = new.unwrap_or(&empty);
    let mut changed = Vec::new();
    for (name, territory) in new {
        if old.get(name) != Some(territory) {
            changed.push(name.clone());
        }
    }
    for name in old.keys() {
        if !new.contains_key(name) {
            changed.push(name.clone());
        }
    }
    changed
}
