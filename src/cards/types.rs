//! Card value objects.
//!
//! Cards are identified by name and immutable once created. Treachery decks
//! contain duplicate copies of some cards; duplicates carry an instance
//! marker in the name (`"Shield"`, `"Shield(2)"`, ...) so that a card can be
//! addressed unambiguously while it sits in a hand. [`catalog_key`] strips
//! the marker to recover the catalog entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a treachery card, used for play validation and card text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreacheryCategory {
    /// Projectile weapon (Crysknife, Maula Pistol, ...).
    WeaponProjectile,
    /// Poison weapon (Chaumas, Gom Jabbar, ...).
    WeaponPoison,
    /// Special weapon (Lasgun).
    WeaponSpecial,
    /// Blocks projectile weapons.
    DefenseShield,
    /// Blocks poison weapons.
    DefenseSnooper,
    /// Cards with one-shot special effects (Karama, Family Atomics, ...).
    Special,
    /// No effect; playable only to discard.
    Worthless,
}

impl TreacheryCategory {
    /// True for projectile, poison, and special weapons.
    #[must_use]
    pub fn is_weapon(self) -> bool {
        matches!(
            self,
            TreacheryCategory::WeaponProjectile
                | TreacheryCategory::WeaponPoison
                | TreacheryCategory::WeaponSpecial
        )
    }

    /// True for shields and snoopers.
    #[must_use]
    pub fn is_defense(self) -> bool {
        matches!(
            self,
            TreacheryCategory::DefenseShield | TreacheryCategory::DefenseSnooper
        )
    }
}

/// A treachery card in a deck, discard pile, or faction hand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreacheryCard {
    /// Card name, including any duplicate-instance marker.
    pub name: String,
}

impl TreacheryCard {
    /// Create a card with the given (marked) name.
    pub fn new(name: impl Into<String>) -> Self {
        TreacheryCard { name: name.into() }
    }

    /// The catalog key for this card: its name without the instance marker.
    #[must_use]
    pub fn catalog_key(&self) -> &str {
        catalog_key(&self.name)
    }
}

impl fmt::Display for TreacheryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Strip a trailing `(n)` duplicate-instance marker from a card name.
///
/// `"Shield(2)"` -> `"Shield"`, `"Shield"` -> `"Shield"`. A parenthesized
/// suffix is only treated as a marker when it contains digits, so names that
/// legitimately end in parentheses are left alone.
#[must_use]
pub fn catalog_key(name: &str) -> &str {
    if let Some(open) = name.rfind('(') {
        let inner = &name[open + 1..];
        if let Some(inner) = inner.strip_suffix(')') {
            if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
                return name[..open].trim_end();
            }
        }
    }
    name
}

/// A traitor card: a leader who may betray the faction that plays them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitorCard {
    /// Name of the leader pictured on the card.
    pub leader: String,
    /// Faction the leader belongs to.
    pub faction: String,
    /// Leader strength, paid out when the traitor is revealed.
    pub strength: u32,
}

impl TraitorCard {
    pub fn new(leader: impl Into<String>, faction: impl Into<String>, strength: u32) -> Self {
        TraitorCard {
            leader: leader.into(),
            faction: faction.into(),
            strength,
        }
    }
}

impl fmt::Display for TraitorCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.leader, self.faction)
    }
}

/// A leader skill card, assignable to one leader during setup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderSkillCard {
    /// Skill name (`"Mentat"`, `"Swordmaster of Ginaz"`, ...).
    pub name: String,
}

impl LeaderSkillCard {
    pub fn new(name: impl Into<String>) -> Self {
        LeaderSkillCard { name: name.into() }
    }
}

/// A card drawn from the spice deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpiceCard {
    /// Spice appears in a territory.
    Territory {
        /// Territory the blow lands in.
        territory: String,
        /// Amount of spice placed.
        amount: u32,
    },
    /// Shai-Hulud: the worm devours and a nexus may follow.
    ShaiHulud,
}

impl fmt::Display for SpiceCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpiceCard::Territory { territory, amount } => {
                write!(f, "{territory} ({amount} spice)")
            }
            SpiceCard::ShaiHulud => write!(f, "Shai-Hulud"),
        }
    }
}
