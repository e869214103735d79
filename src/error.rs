//! Error types for the engine.
//!
//! The taxonomy mirrors what the command layer reports to players:
//!
//! - [`EngineError::InvalidArgument`]: malformed input to an operation
//!   (negative amount, unknown card/leader/territory name). Never silently
//!   corrected.
//! - [`EngineError::InvalidGameState`]: the operation is legal in general
//!   but not right now (placing an ambassador with an empty supply).
//! - [`EngineError::NotFound`]: a named resource is missing.
//! - [`EngineError::Schema`]: the snapshot for a game cannot be loaded or
//!   written. Fatal for that game only; other games keep running.
//!
//! Engine operations return these; the command layer catches them, reports
//! the message, and publishes no snapshot.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input to an operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not legal in the current game state.
    #[error("not allowed right now: {0}")]
    InvalidGameState(String),

    /// A named resource (faction, territory, card, leader, snapshot) is missing.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What category of thing was looked up.
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// The snapshot could not be parsed, migrated, or written.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        EngineError::InvalidArgument(msg.into())
    }

    /// Shorthand for [`EngineError::InvalidGameState`].
    pub fn invalid_game_state(msg: impl Into<String>) -> Self {
        EngineError::InvalidGameState(msg.into())
    }

    /// Shorthand for [`EngineError::NotFound`].
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Snapshot schema failures.
///
/// Reported to the operator channel by the caller; the previous snapshot
/// stays canonical.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The snapshot text is not valid JSON (or not valid for the schema).
    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The snapshot bytes are not UTF-8 text.
    #[error("snapshot is not valid UTF-8")]
    NotUtf8,

    /// The top-level `version` field is missing or not an integer.
    #[error("snapshot has no integer `version` field")]
    MissingVersion,

    /// The snapshot was written by a newer build than this one.
    #[error("snapshot version {found} is newer than supported version {supported}")]
    FutureVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Highest version this build understands.
        supported: u32,
    },

    /// The top-level `game_state` object is missing.
    #[error("snapshot has no `game_state` object")]
    MissingGameState,

    /// A faction element has no `name` discriminator.
    #[error("faction element has no `name` field")]
    MissingFactionName,

    /// The faction name matches no known variant and names no homebrew proxy.
    #[error("unknown faction `{0}` with no homebrew proxy")]
    UnknownFaction(String),
}
