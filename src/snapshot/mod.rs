//! Versioned JSON snapshots.
//!
//! A snapshot is the unit of persistence: `{ "version": N, "game_state":
//! { ... } }`, pretty-printed so operators can read and patch one by hand.
//! [`deserialize`] is the single door back in; it rejects documents it
//! cannot understand ([`SchemaError`]) rather than guessing, runs the raw
//! value through the pre-parse migrations, and finishes with the idempotent
//! post-load fix-ups so legacy games keep loading forever.
//!
//! Faction `kind` is never stored. It is re-derived from the `name`
//! discriminator (or the homebrew `proxy`) right after typed construction.

mod cache;
mod migrate;
mod store;

pub use cache::{GameSlot, SnapshotCache};
pub use store::{GameId, MemoryStore, SnapshotStore};

use serde_json::Value;

use crate::cards::Catalogs;
use crate::error::SchemaError;
use crate::game::Game;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 3;

/// Write a game into a versioned snapshot document.
pub fn serialize(game: &Game) -> Result<String, SchemaError> {
    let state = serde_json::to_value(game)?;
    let envelope = serde_json::json!({
        "version": SNAPSHOT_VERSION,
        "game_state": state,
    });
    serde_json::to_string_pretty(&envelope).map_err(SchemaError::from)
}

/// Read a snapshot document back into a [`Game`], migrating legacy data on
/// the way in.
pub fn deserialize(text: &str, catalogs: &Catalogs) -> Result<Game, SchemaError> {
    let mut envelope: Value = serde_json::from_str(text)?;
    let version = envelope
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(SchemaError::MissingVersion)?;
    if version > SNAPSHOT_VERSION {
        return Err(SchemaError::FutureVersion {
            found: version,
            supported: SNAPSHOT_VERSION,
        });
    }
    let state = envelope
        .get_mut("game_state")
        .filter(|state| state.is_object())
        .ok_or(SchemaError::MissingGameState)?;

    migrate::normalize_card_names(state, catalogs);
    migrate::strip_deprecated_options(state);

    // Every faction element must carry its discriminator; anything else is
    // an operator mistake we refuse to paper over.
    if let Some(factions) = state.get("factions").and_then(Value::as_array) {
        for faction in factions {
            let name = faction.get("name").and_then(Value::as_str);
            if name.map_or(true, str::is_empty) {
                return Err(SchemaError::MissingFactionName);
            }
        }
    }

    let mut game: Game = serde_json::from_value(state.take())?;
    for faction in game.factions_mut() {
        faction.resolve_kind()?;
    }
    migrate::apply_fixups(&mut game);
    Ok(game)
}
