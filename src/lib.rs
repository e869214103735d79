//! # arrakis-engine
//!
//! A rules and state engine for running asynchronous games of Dune.
//!
//! ## Design Principles
//!
//! 1. **Snapshots Are The Source Of Truth**: every game lives in a versioned
//!    JSON document. The engine loads it, applies one command, publishes the
//!    replacement. Kill the process at any point and nothing is lost.
//!
//! 2. **Fail Loudly**: malformed snapshots and illegal commands return
//!    errors instead of being silently corrected; the previously published
//!    snapshot stays canonical.
//!
//! 3. **Conservation By Construction**: forces and ambassador tokens only
//!    move between buckets (reserves / board / tanks, pool / supply /
//!    triggered / board) through operations that can neither mint nor leak
//!    them.
//!
//! ## Architecture
//!
//! - **Tagged Faction Kinds**: one `Faction` record for every seat; a
//!   `FactionKind` discriminant answers the rules questions (pools, revival,
//!   income). The kind is re-derived from the snapshot's `name` field on
//!   load; homebrew factions borrow a kind through their `proxy`.
//!
//! - **Deterministic RNG**: every shuffle flows through a seeded generator
//!   whose stream position rides in the snapshot, so replaying the same
//!   commands reproduces the same game.
//!
//! - **Per-Game Locking**: the snapshot cache hands out one mutex per game
//!   id; same-game commands serialize while different games run in
//!   parallel. A process-wide `CommandGuard` lets operators drain in-flight
//!   work before maintenance.
//!
//! ## Modules
//!
//! - `board`: territories, force groups, the standard map
//! - `cards`: card value objects and the reference catalogs
//! - `factions`: faction state, kind tables, ambassador tokens
//! - `game`: the aggregate, its operations, and setup
//! - `command`: the tagged command surface and executor
//! - `snapshot`: versioned persistence, migrations, cache, store seam
//! - `engine`: the process-scoped service tying it all together
//! - `guard`: process-wide command accounting

pub mod board;
pub mod cards;
pub mod command;
pub mod engine;
pub mod error;
pub mod factions;
pub mod game;
pub mod guard;
pub mod rng;
pub mod snapshot;

// Re-export commonly used types
pub use crate::board::{force_name, Force, Territory, OFF_STORM_TRACK, SPECIAL_SUFFIX};

pub use crate::cards::{
    catalog_key, Catalogs, LeaderSkillCard, SpiceCard, TraitorCard, TreacheryCard,
    TreacheryCategory,
};

pub use crate::command::{execute, Command};

pub use crate::engine::{Engine, EngineConfig, SnapshotDelta};

pub use crate::error::{EngineError, EngineResult, SchemaError};

pub use crate::factions::{
    Ambassador, AmbassadorPrompt, AmbassadorState, ChoicePrompt, Faction, FactionKind, Leader,
    ResourceValue, Threshold, TriggerOutcome, AMBASSADOR_TOKEN_COUNT,
};

pub use crate::game::setup::{new_game, Seat};
pub use crate::game::{Alliance, Game, GameOption, TechToken, REVIVAL_COST_PER_FORCE};

pub use crate::guard::{CommandGuard, CommandPermit};

pub use crate::rng::{GameRng, GameRngState};

pub use crate::snapshot::{
    deserialize, serialize, GameId, MemoryStore, SnapshotCache, SnapshotStore, SNAPSHOT_VERSION,
};
