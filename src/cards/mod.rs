//! Card types and reference catalogs.
//!
//! ## Key Types
//!
//! - `TreacheryCard` / `TraitorCard` / `LeaderSkillCard` / `SpiceCard`:
//!   value objects stored in decks and hands
//! - `Catalogs`: immutable name-keyed lookup tables for card text and
//!   static game data
//!
//! Game state stores card names; catalogs carry everything derivable from a
//! name (category, copy count, rules text) so snapshots stay small.

mod catalog;
mod types;

pub use catalog::{
    AmbassadorInfo, Catalog, Catalogs, HomeworldInfo, LeaderInfo, LeaderSkillInfo, StrongholdInfo,
    TreacheryInfo,
};
pub use types::{
    catalog_key, LeaderSkillCard, SpiceCard, TraitorCard, TreacheryCard, TreacheryCategory,
};
