//! The twelve playable faction kinds.
//!
//! [`FactionKind`] is the behavior discriminant: every rules question that
//! depends on *which* faction is acting (starting spice, force pools, free
//! revival, income rate) is answered by a method here. A homebrew faction
//! borrows a kind through its proxy and inherits these tables wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A faction's starting garrison: territory, regular forces, special forces.
pub type StartingPlacement = (&'static str, u32, u32);

/// The playable faction kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactionKind {
    #[default]
    Atreides,
    BeneGesserit,
    BeneTleilax,
    Choam,
    Ecaz,
    Emperor,
    Fremen,
    Guild,
    Harkonnen,
    Ix,
    Moritani,
    Richese,
}

impl FactionKind {
    /// All kinds, in canonical order.
    pub const ALL: [FactionKind; 12] = [
        FactionKind::Atreides,
        FactionKind::BeneGesserit,
        FactionKind::BeneTleilax,
        FactionKind::Choam,
        FactionKind::Ecaz,
        FactionKind::Emperor,
        FactionKind::Fremen,
        FactionKind::Guild,
        FactionKind::Harkonnen,
        FactionKind::Ix,
        FactionKind::Moritani,
        FactionKind::Richese,
    ];

    /// The canonical faction name. This is the snapshot discriminator.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FactionKind::Atreides => "Atreides",
            FactionKind::BeneGesserit => "Bene Gesserit",
            FactionKind::BeneTleilax => "Bene Tleilax",
            FactionKind::Choam => "CHOAM",
            FactionKind::Ecaz => "Ecaz",
            FactionKind::Emperor => "Emperor",
            FactionKind::Fremen => "Fremen",
            FactionKind::Guild => "Guild",
            FactionKind::Harkonnen => "Harkonnen",
            FactionKind::Ix => "Ix",
            FactionKind::Moritani => "Moritani",
            FactionKind::Richese => "Richese",
        }
    }

    /// Resolve a canonical name back to a kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        FactionKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Spice behind the shield at setup.
    #[must_use]
    pub fn starting_spice(self) -> u32 {
        match self {
            FactionKind::Atreides => 10,
            FactionKind::BeneGesserit => 5,
            FactionKind::BeneTleilax => 5,
            FactionKind::Choam => 2,
            FactionKind::Ecaz => 12,
            FactionKind::Emperor => 10,
            FactionKind::Fremen => 3,
            FactionKind::Guild => 5,
            FactionKind::Harkonnen => 10,
            FactionKind::Ix => 10,
            FactionKind::Moritani => 12,
            FactionKind::Richese => 5,
        }
    }

    /// Total regular force tokens.
    #[must_use]
    pub fn force_pool(self) -> u32 {
        match self {
            FactionKind::Emperor => 15,
            FactionKind::Fremen => 17,
            FactionKind::Ix => 10,
            _ => 20,
        }
    }

    /// Total special force tokens (Sardaukar, Fedaykin, Cyborgs), zero if none.
    #[must_use]
    pub fn special_force_pool(self) -> u32 {
        match self {
            FactionKind::Emperor => 5,
            FactionKind::Fremen => 3,
            FactionKind::Ix => 4,
            _ => 0,
        }
    }

    /// Whether this kind fields special forces at all.
    #[must_use]
    pub fn has_special_forces(self) -> bool {
        self.special_force_pool() > 0
    }

    /// Forces revivable for free each revival phase.
    #[must_use]
    pub fn free_revival(self) -> u32 {
        match self {
            FactionKind::Atreides => 2,
            FactionKind::BeneGesserit => 1,
            FactionKind::BeneTleilax => 2,
            FactionKind::Choam => 0,
            FactionKind::Ecaz => 2,
            FactionKind::Emperor => 1,
            FactionKind::Fremen => 3,
            FactionKind::Guild => 1,
            FactionKind::Harkonnen => 2,
            FactionKind::Ix => 1,
            FactionKind::Moritani => 2,
            FactionKind::Richese => 2,
        }
    }

    /// Maximum treachery cards in hand.
    #[must_use]
    pub fn hand_limit(self) -> usize {
        match self {
            FactionKind::Harkonnen => 8,
            FactionKind::Choam => 5,
            _ => 4,
        }
    }

    /// Spice collected per force during collection.
    ///
    /// Ornithopters (control of Arrakeen or Carthag) raise the base rate
    /// from two to three; the Fremen always collect three.
    #[must_use]
    pub fn spice_collection_rate(self, has_ornithopters: bool) -> u32 {
        if self == FactionKind::Fremen || has_ornithopters {
            3
        } else {
            2
        }
    }

    /// Homeworld territory names. Only the Emperor has two.
    #[must_use]
    pub fn homeworlds(self) -> &'static [&'static str] {
        match self {
            FactionKind::Atreides => &["Caladan"],
            FactionKind::BeneGesserit => &["Wallach IX"],
            FactionKind::BeneTleilax => &["Tleilax"],
            FactionKind::Choam => &["Tupile"],
            FactionKind::Ecaz => &["Ecaz"],
            FactionKind::Emperor => &["Kaitain", "Salusa Secundus"],
            FactionKind::Fremen => &["Southern Hemisphere"],
            FactionKind::Guild => &["Junction"],
            FactionKind::Harkonnen => &["Giedi Prime"],
            FactionKind::Ix => &["Ix"],
            FactionKind::Moritani => &["Grumman"],
            FactionKind::Richese => &["Richese"],
        }
    }

    /// Forces on the board at setup, as (territory, regular, special).
    #[must_use]
    pub fn starting_placements(self) -> &'static [StartingPlacement] {
        match self {
            FactionKind::Atreides => &[("Arrakeen", 10, 0)],
            FactionKind::BeneGesserit => &[("Polar Sink", 1, 0)],
            FactionKind::Ecaz => &[("Imperial Basin", 6, 0)],
            FactionKind::Fremen => &[
                ("Sietch Tabr", 3, 1),
                ("False Wall South", 3, 0),
                ("False Wall West", 3, 0),
            ],
            FactionKind::Guild => &[("Tuek's Sietch", 5, 0)],
            FactionKind::Harkonnen => &[("Carthag", 10, 0)],
            FactionKind::Ix => &[("Hidden Mobile Stronghold", 3, 3)],
            _ => &[],
        }
    }
}

impl fmt::Display for FactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in FactionKind::ALL {
            assert_eq!(FactionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FactionKind::from_name("House Corrino"), None);
    }

    #[test]
    fn test_special_force_pools() {
        assert!(FactionKind::Emperor.has_special_forces());
        assert!(FactionKind::Fremen.has_special_forces());
        assert!(FactionKind::Ix.has_special_forces());
        assert!(!FactionKind::Atreides.has_special_forces());
        assert_eq!(FactionKind::Emperor.special_force_pool(), 5);
    }

    #[test]
    fn test_fremen_always_collect_three() {
        assert_eq!(FactionKind::Fremen.spice_collection_rate(false), 3);
        assert_eq!(FactionKind::Fremen.spice_collection_rate(true), 3);
        assert_eq!(FactionKind::Guild.spice_collection_rate(false), 2);
        assert_eq!(FactionKind::Guild.spice_collection_rate(true), 3);
    }

    #[test]
    fn test_placements_fit_pools() {
        for kind in FactionKind::ALL {
            let (mut regular, mut special) = (0, 0);
            for (_, r, s) in kind.starting_placements() {
                regular += r;
                special += s;
            }
            assert!(regular <= kind.force_pool(), "{kind:?}");
            assert!(special <= kind.special_force_pool(), "{kind:?}");
        }
    }

    #[test]
    fn test_emperor_homeworlds() {
        assert_eq!(
            FactionKind::Emperor.homeworlds(),
            &["Kaitain", "Salusa Secundus"]
        );
        for kind in FactionKind::ALL {
            if kind != FactionKind::Emperor {
                assert_eq!(kind.homeworlds().len(), 1, "{kind:?}");
            }
        }
    }
}
