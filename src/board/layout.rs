//! The standard board layout and spice deck composition.
//!
//! Territory names and sectors follow the classic map; the storm track runs
//! through sectors 0..18. Territories that span several sectors are recorded
//! at their largest-share sector, which is all the current rules need.
//! Fremen-shippable territories are the Great Flat and everything within two
//! territories of it.

use crate::board::territory::Territory;
use crate::cards::SpiceCard;

/// Stronghold granting ornithopter movement (with Carthag).
pub const ARRAKEEN: &str = "Arrakeen";
/// Stronghold granting ornithopter movement (with Arrakeen).
pub const CARTHAG: &str = "Carthag";
/// The safe territory at the center of the map.
pub const POLAR_SINK: &str = "Polar Sink";
/// The Ixian mobile stronghold; only on the board when Ix is seated.
pub const HIDDEN_MOBILE_STRONGHOLD: &str = "Hidden Mobile Stronghold";
/// The rock wall destroyed by Family Atomics.
pub const SHIELD_WALL: &str = "Shield Wall";

/// Territories that appear when the matching discovery token is found.
pub const DISCOVERY_SITES: &[&str] = &[
    "Jacurutu Sietch",
    "Cistern",
    "Ecological Testing Station",
    "Orgiz Processing Station",
    "Shrine",
];

/// Build the standard territories, without homeworlds or discovery sites.
///
/// The Hidden Mobile Stronghold is not included; setup adds it when Ix is
/// in the game.
#[must_use]
pub fn standard_territories() -> Vec<Territory> {
    vec![
        Territory::new(POLAR_SINK, -1),
        Territory::new(ARRAKEEN, 9).with_stronghold(),
        Territory::new(CARTHAG, 10).with_stronghold(),
        Territory::new("Tuek's Sietch", 4).with_stronghold().with_rock(),
        Territory::new("Sietch Tabr", 13).with_stronghold().with_rock().with_fremen_shippable(),
        Territory::new("Habbanya Sietch", 16).with_stronghold().with_rock().with_fremen_shippable(),
        Territory::new("Cielago North", 1),
        Territory::new("Cielago Depression", 1),
        Territory::new("Meridian", 0),
        Territory::new("Cielago South", 1),
        Territory::new("Cielago East", 2),
        Territory::new("Harg Pass", 3),
        Territory::new("False Wall South", 4).with_rock(),
        Territory::new("False Wall East", 5).with_rock(),
        Territory::new("The Minor Erg", 6),
        Territory::new("Pasty Mesa", 6).with_rock(),
        Territory::new("Red Chasm", 6),
        Territory::new("South Mesa", 4),
        Territory::new("Sihaya Ridge", 8),
        Territory::new(SHIELD_WALL, 7).with_rock(),
        Territory::new("Hole in the Rock", 8),
        Territory::new("Rim Wall West", 8).with_rock(),
        Territory::new("Imperial Basin", 9),
        Territory::new("Gara Kulon", 7),
        Territory::new("Old Gap", 9),
        Territory::new("Tsimpo", 10),
        Territory::new("Broken Land", 11),
        Territory::new("Arsunt", 10),
        Territory::new("Plastic Basin", 12).with_rock().with_fremen_shippable(),
        Territory::new("Hagga Basin", 12).with_fremen_shippable(),
        Territory::new("Rock Outcroppings", 13).with_fremen_shippable(),
        Territory::new("Wind Pass", 14).with_fremen_shippable(),
        Territory::new("Bight of the Cliff", 14).with_fremen_shippable(),
        Territory::new("Funeral Plain", 14).with_fremen_shippable(),
        Territory::new("The Great Flat", 14).with_fremen_shippable(),
        Territory::new("Wind Pass North", 16).with_fremen_shippable(),
        Territory::new("The Greater Flat", 15).with_fremen_shippable(),
        Territory::new("Habbanya Erg", 15).with_fremen_shippable(),
        Territory::new("False Wall West", 16).with_rock().with_fremen_shippable(),
        Territory::new("Habbanya Ridge Flat", 17).with_fremen_shippable(),
        Territory::new("Cielago West", 17).with_fremen_shippable(),
    ]
}

/// Build an unshuffled spice deck: fifteen territory cards plus six worms.
#[must_use]
pub fn spice_deck() -> Vec<SpiceCard> {
    let blows = [
        ("Cielago North", 8),
        ("Cielago South", 12),
        ("Red Chasm", 8),
        ("South Mesa", 10),
        ("Sihaya Ridge", 6),
        ("Hole in the Rock", 6),
        ("Broken Land", 8),
        ("Hagga Basin", 6),
        ("Rock Outcroppings", 6),
        ("Funeral Plain", 6),
        ("The Great Flat", 10),
        ("Habbanya Erg", 8),
        ("Habbanya Ridge Flat", 10),
        ("Wind Pass North", 6),
        ("The Minor Erg", 8),
    ];
    let mut deck: Vec<SpiceCard> = blows
        .iter()
        .map(|(territory, amount)| SpiceCard::Territory {
            territory: (*territory).to_string(),
            amount: *amount,
        })
        .collect();
    deck.extend(std::iter::repeat(SpiceCard::ShaiHulud).take(6));
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board_shape() {
        let territories = standard_territories();
        assert_eq!(territories.len(), 41);

        let strongholds: Vec<&str> = territories
            .iter()
            .filter(|t| t.is_stronghold())
            .map(|t| t.name())
            .collect();
        assert_eq!(strongholds.len(), 5);
        assert!(strongholds.contains(&ARRAKEEN));
        assert!(strongholds.contains(&CARTHAG));

        // The mobile stronghold only enters with Ix.
        assert!(!territories
            .iter()
            .any(|t| t.name() == HIDDEN_MOBILE_STRONGHOLD));
    }

    #[test]
    fn test_fremen_deployment_range() {
        let territories = standard_territories();
        let shippable: Vec<&str> = territories
            .iter()
            .filter(|t| t.is_fremen_shippable())
            .map(|t| t.name())
            .collect();
        assert_eq!(shippable.len(), 15);
        assert!(shippable.contains(&"The Great Flat"));
        assert!(shippable.contains(&"Sietch Tabr"));
        assert!(!shippable.contains(&ARRAKEEN));
        assert!(!shippable.contains(&POLAR_SINK));
    }

    #[test]
    fn test_territory_names_are_unique() {
        let territories = standard_territories();
        let mut names: Vec<&str> = territories.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), territories.len());
    }

    #[test]
    fn test_spice_deck_targets_real_territories() {
        let territories = standard_territories();
        for card in spice_deck() {
            if let SpiceCard::Territory { territory, amount } = card {
                assert!(
                    territories.iter().any(|t| t.name() == territory),
                    "spice blow targets unknown territory {territory}",
                );
                assert!(amount > 0);
            }
        }
    }

    #[test]
    fn test_spice_deck_has_six_worms() {
        let worms = spice_deck()
            .iter()
            .filter(|c| matches!(c, SpiceCard::ShaiHulud))
            .count();
        assert_eq!(worms, 6);
        assert_eq!(spice_deck().len(), 21);
    }
}
