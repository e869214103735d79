//! Snapshot migrations.
//!
//! Two layers keep years of stored games loadable. Pre-parse migrations
//! rewrite the raw JSON value before typed construction: card names are
//! trimmed and remapped to their catalog spellings, and option flags the
//! engine no longer recognizes are dropped. Post-load fix-ups run on the
//! typed [`Game`] every time a snapshot is read; they are idempotent, so a
//! freshly written snapshot passes through them untouched.

use serde_json::Value;
use tracing::{debug, warn};

use crate::board::{layout, Territory, OFF_STORM_TRACK};
use crate::cards::{catalog_key, Catalogs};
use crate::game::{Game, GameOption};

/// Option flags from retired rule modules, silently dropped on load.
const DEPRECATED_OPTIONS: &[&str] = &["STORM_DIAL_V1", "SHARED_SPICE_LEDGER"];

/// Old display spellings mapped to their catalog names.
const CARD_RENAMES: &[(&str, &str)] = &[
    ("Truth Trance", "Truthtrance"),
    ("La, La, La", "La La La"),
];

/// Rewrite card names in a raw `game_state` value to catalog spellings.
/// Returns the number of cards changed.
pub(crate) fn normalize_card_names(state: &mut Value, catalogs: &Catalogs) -> usize {
    let mut changed = 0;
    for deck in ["treachery_deck", "treachery_discard"] {
        if let Some(cards) = state.get_mut(deck).and_then(Value::as_array_mut) {
            for card in cards {
                changed += normalize_card(card, catalogs);
            }
        }
    }
    if let Some(factions) = state.get_mut("factions").and_then(Value::as_array_mut) {
        for faction in factions {
            if let Some(cards) = faction
                .get_mut("treachery_hand")
                .and_then(Value::as_array_mut)
            {
                for card in cards {
                    changed += normalize_card(card, catalogs);
                }
            }
        }
    }
    if changed > 0 {
        warn!(cards = changed, "normalized treachery card names on load");
    }
    changed
}

fn normalize_card(card: &mut Value, catalogs: &Catalogs) -> usize {
    let Some(raw) = card.get("name").and_then(Value::as_str) else {
        return 0;
    };
    let canonical = canonical_card_name(raw);
    if catalogs.treachery.lookup(catalog_key(&canonical)).is_none() {
        debug!(card = %canonical, "treachery card not in the catalog; keeping as-is");
    }
    if canonical != raw {
        card["name"] = Value::String(canonical);
        return 1;
    }
    0
}

/// Trim a raw card name and remap its base spelling, keeping any `(n)`
/// duplicate-instance marker.
fn canonical_card_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let key = catalog_key(trimmed);
    let marker = trimmed[key.len()..].trim();
    let base = CARD_RENAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| *to);
    let mut name = String::with_capacity(base.len() + marker.len());
    name.push_str(base);
    name.push_str(marker);
    name
}

/// Drop deprecated option flags from a raw `game_state` value. Returns the
/// number of flags removed.
pub(crate) fn strip_deprecated_options(state: &mut Value) -> usize {
    let Some(options) = state.get_mut("options").and_then(Value::as_array_mut) else {
        return 0;
    };
    let before = options.len();
    options.retain(|option| {
        option
            .as_str()
            .map_or(true, |name| !DEPRECATED_OPTIONS.contains(&name))
    });
    let removed = before - options.len();
    if removed > 0 {
        warn!(options = removed, "dropped deprecated game options on load");
    }
    removed
}

/// What the post-load fix-ups changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FixupReport {
    /// Force groups re-attached from legacy hosted-forces entries.
    pub hosted_forces: usize,
    /// Territories newly flagged as discovery sites.
    pub discovery_sites: usize,
    /// Homeworld territories or index entries synthesized.
    pub homeworlds: usize,
}

impl FixupReport {
    pub fn total(self) -> usize {
        self.hosted_forces + self.discovery_sites + self.homeworlds
    }
}

/// Repair a freshly decoded game. Idempotent: running this on a game it
/// already repaired changes nothing.
pub(crate) fn apply_fixups(game: &mut Game) -> FixupReport {
    let mut report = FixupReport::default();
    report.hosted_forces = reattach_hosted_forces(game);
    report.discovery_sites = flag_discovery_sites(game);
    report.homeworlds = synthesize_homeworlds(game);
    report
}

/// Early snapshots parked the Hidden Mobile Stronghold's occupants inside
/// their carrier territory. Re-attach them to the territory they logically
/// occupy, creating it if the snapshot predates it.
fn reattach_hosted_forces(game: &mut Game) -> usize {
    let mut parked = Vec::new();
    for territory in game.territories_map_mut().values_mut() {
        parked.extend(territory.take_hosted());
    }
    let mut reattached = 0;
    for hosted in parked {
        if !game.has_territory(&hosted.territory) {
            let territory = if hosted.territory == layout::HIDDEN_MOBILE_STRONGHOLD {
                Territory::new(&hosted.territory, OFF_STORM_TRACK).with_stronghold()
            } else {
                Territory::new(&hosted.territory, OFF_STORM_TRACK)
            };
            game.insert_territory(territory);
        }
        if let Ok(territory) = game.territory_mut(&hosted.territory) {
            for force in hosted.forces {
                territory.add_forces(&force.name, force.strength);
                reattached += 1;
            }
        }
    }
    if reattached > 0 {
        warn!(groups = reattached, "re-attached hosted force groups on load");
    }
    reattached
}

/// Flag the fixed discovery-token sites on boards saved before the flag
/// existed.
fn flag_discovery_sites(game: &mut Game) -> usize {
    let mut flagged = 0;
    for name in layout::DISCOVERY_SITES {
        if let Some(territory) = game.territories_map_mut().get_mut(*name) {
            if !territory.has_discovery_token() {
                territory.set_discovery_token(true);
                flagged += 1;
            }
        }
    }
    if flagged > 0 {
        warn!(territories = flagged, "flagged discovery sites on load");
    }
    flagged
}

/// Make sure every registered homeworld has its territory, and every seated
/// faction has its homeworlds registered when the module is on.
fn synthesize_homeworlds(game: &mut Game) -> usize {
    let mut synthesized = 0;
    let index: Vec<(String, String)> = game
        .homeworlds()
        .iter()
        .map(|(world, faction)| (world.clone(), faction.clone()))
        .collect();
    for (world, faction) in index {
        if !game.has_faction(&faction) {
            debug!(%world, %faction, "homeworld registered to an unseated faction");
            continue;
        }
        if let Ok(true) = game.add_homeworld(&faction, &world) {
            synthesized += 1;
        }
    }
    if game.has_option(GameOption::Homeworlds) {
        let pairs: Vec<(String, &'static str)> = game
            .factions()
            .iter()
            .flat_map(|f| {
                let name = f.name().to_string();
                f.kind().homeworlds().iter().map(move |w| (name.clone(), *w))
            })
            .collect();
        for (faction, world) in pairs {
            if let Ok(true) = game.add_homeworld(&faction, world) {
                synthesized += 1;
            }
        }
    }
    if synthesized > 0 {
        warn!(entries = synthesized, "synthesized homeworld entries on load");
    }
    synthesized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::{Faction, FactionKind};
    use serde_json::json;

    #[test]
    fn test_canonical_card_name_keeps_markers() {
        assert_eq!(canonical_card_name("Truth Trance"), "Truthtrance");
        assert_eq!(canonical_card_name("Truth Trance(2)"), "Truthtrance(2)");
        assert_eq!(canonical_card_name("La, La, La"), "La La La");
        assert_eq!(canonical_card_name("  Shield (2) "), "Shield(2)");
        assert_eq!(canonical_card_name("Karama"), "Karama");
    }

    #[test]
    fn test_normalize_card_names_walks_decks_and_hands() {
        let catalogs = Catalogs::standard();
        let mut state = json!({
            "treachery_deck": [{"name": "Truth Trance"}, {"name": "Shield"}],
            "treachery_discard": [{"name": " Lasgun "}],
            "factions": [
                {"name": "Atreides", "treachery_hand": [{"name": "Truth Trance(2)"}]},
                {"name": "Guild", "treachery_hand": []}
            ]
        });
        let changed = normalize_card_names(&mut state, &catalogs);
        assert_eq!(changed, 3);
        assert_eq!(state["treachery_deck"][0]["name"], "Truthtrance");
        assert_eq!(state["treachery_deck"][1]["name"], "Shield");
        assert_eq!(state["treachery_discard"][0]["name"], "Lasgun");
        assert_eq!(
            state["factions"][0]["treachery_hand"][0]["name"],
            "Truthtrance(2)"
        );
        // A second pass finds nothing left to change.
        assert_eq!(normalize_card_names(&mut state, &catalogs), 0);
    }

    #[test]
    fn test_strip_deprecated_options() {
        let mut state = json!({
            "options": ["HOMEWORLDS", "STORM_DIAL_V1", "TECH_TOKENS", "SHARED_SPICE_LEDGER"]
        });
        assert_eq!(strip_deprecated_options(&mut state), 2);
        assert_eq!(state["options"], json!(["HOMEWORLDS", "TECH_TOKENS"]));
        assert_eq!(strip_deprecated_options(&mut state), 0);

        let mut none = json!({"turn": 1});
        assert_eq!(strip_deprecated_options(&mut none), 0);
    }

    #[test]
    fn test_fixups_are_idempotent() {
        let mut game = Game::empty(3);
        for territory in layout::standard_territories() {
            game.insert_territory(territory);
        }
        game.add_faction(Faction::new(FactionKind::Emperor, "p1")).unwrap();
        game.add_homeworld("Emperor", "Kaitain").unwrap();

        let first = apply_fixups(&mut game);
        let second = apply_fixups(&mut game);
        assert_eq!(second.total(), 0, "{second:?}");
        // Standard boards already carry their discovery flags.
        assert_eq!(first.discovery_sites, 0);
        assert_eq!(first.homeworlds, 0);
    }

    #[test]
    fn test_hosted_forces_reattach_and_create_territory() {
        let mut game = Game::empty(3);
        for territory in layout::standard_territories() {
            game.insert_territory(territory);
        }
        game.add_faction(Faction::new(FactionKind::Ix, "p1")).unwrap();

        // Simulate a legacy snapshot: HMS occupants parked in a carrier.
        let hosted = json!({
            "name": "Wind Pass",
            "sector": 13,
            "spice": 0,
            "forces": [],
            "hosted": [{
                "territory": "Hidden Mobile Stronghold",
                "forces": [{"name": "Ix", "strength": 3}, {"name": "Ix*", "strength": 2}]
            }]
        });
        let territory: Territory = serde_json::from_value(hosted).unwrap();
        game.insert_territory(territory);

        let report = apply_fixups(&mut game);
        assert_eq!(report.hosted_forces, 2);
        let hms = game.territory(layout::HIDDEN_MOBILE_STRONGHOLD).unwrap();
        assert!(hms.is_stronghold());
        assert_eq!(hms.force_strength("Ix"), 3);
        assert_eq!(hms.force_strength("Ix*"), 2);

        assert_eq!(apply_fixups(&mut game).total(), 0);
    }

    #[test]
    fn test_homeworld_synthesis_from_index() {
        let mut game = Game::empty(3);
        for territory in layout::standard_territories() {
            game.insert_territory(territory);
        }
        game.add_faction(Faction::new(FactionKind::Emperor, "p1")).unwrap();
        game.add_homeworld("Emperor", "Kaitain").unwrap();
        // Simulate a snapshot that carried the index but not the territory.
        game.territories_map_mut().remove("Kaitain");

        let report = apply_fixups(&mut game);
        assert_eq!(report.homeworlds, 1);
        assert!(game.territory("Kaitain").unwrap().is_homeworld());
        assert_eq!(apply_fixups(&mut game).total(), 0);
    }

    #[test]
    fn test_discovery_sites_flagged_on_legacy_boards() {
        let mut game = Game::empty(3);
        for name in layout::DISCOVERY_SITES {
            game.insert_territory(Territory::new(*name, 1));
        }
        let report = apply_fixups(&mut game);
        assert_eq!(report.discovery_sites, layout::DISCOVERY_SITES.len());
        assert_eq!(apply_fixups(&mut game).total(), 0);
    }
}
