//! Reference catalogs: immutable lookup tables for card text and static
//! game data.
//!
//! Catalogs are built once at engine startup and shared by reference with
//! every operation that needs them. Game state stores card *names*; anything
//! that needs category, text, or numbers looks the name up here. Lookups are
//! keyed by [`catalog_key`](crate::cards::catalog_key) form, i.e. without
//! duplicate-instance markers.

use rustc_hash::FxHashMap;

use crate::cards::types::TreacheryCategory;
use crate::factions::FactionKind;

/// An immutable name-keyed lookup table.
#[derive(Debug)]
pub struct Catalog<T: 'static> {
    entries: FxHashMap<&'static str, &'static T>,
}

impl<T> Catalog<T> {
    fn from_entries(entries: &'static [(&'static str, T)]) -> Self {
        let mut map = FxHashMap::default();
        for (name, info) in entries {
            map.insert(*name, info);
        }
        Catalog { entries: map }
    }

    /// Look up an entry by catalog key.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.entries.get(name).copied()
    }

    /// Whether the catalog has an entry for this key.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entry names in unspecified order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

/// Static data for one treachery card.
#[derive(Debug)]
pub struct TreacheryInfo {
    /// Play category.
    pub category: TreacheryCategory,
    /// Copies of this card in a fresh deck.
    pub copies: u8,
    /// Rules text shown to the holder.
    pub text: &'static str,
}

/// Static data for one leader skill card.
#[derive(Debug)]
pub struct LeaderSkillInfo {
    /// Rules text shown once the skill is revealed.
    pub text: &'static str,
}

/// Static data for one stronghold card.
#[derive(Debug)]
pub struct StrongholdInfo {
    /// Benefit granted while the holder controls the stronghold.
    pub text: &'static str,
}

/// Static data for one homeworld.
#[derive(Debug)]
pub struct HomeworldInfo {
    /// The faction this world belongs to.
    pub faction: FactionKind,
    /// Native force count at or above which the world is at high threshold.
    pub threshold: u32,
    /// Spice collected per turn while occupied at low threshold.
    pub low_income: u32,
    /// Spice collected per turn while occupied at high threshold.
    pub high_income: u32,
}

/// Static data for one ambassador token.
#[derive(Debug)]
pub struct AmbassadorInfo {
    /// Effect applied when the token is triggered.
    pub text: &'static str,
}

/// One leader in a faction's starting roster.
#[derive(Debug)]
pub struct LeaderInfo {
    /// Leader name.
    pub name: &'static str,
    /// Combat strength.
    pub strength: u32,
}

static TREACHERY: &[(&str, TreacheryInfo)] = &[
    ("Crysknife", TreacheryInfo { category: TreacheryCategory::WeaponProjectile, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Shield." }),
    ("Maula Pistol", TreacheryInfo { category: TreacheryCategory::WeaponProjectile, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Shield." }),
    ("Slip Tip", TreacheryInfo { category: TreacheryCategory::WeaponProjectile, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Shield." }),
    ("Stunner", TreacheryInfo { category: TreacheryCategory::WeaponProjectile, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Shield." }),
    ("Chaumas", TreacheryInfo { category: TreacheryCategory::WeaponPoison, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Snooper." }),
    ("Chaumurky", TreacheryInfo { category: TreacheryCategory::WeaponPoison, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Snooper." }),
    ("Ellaca Drug", TreacheryInfo { category: TreacheryCategory::WeaponPoison, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Snooper." }),
    ("Gom Jabbar", TreacheryInfo { category: TreacheryCategory::WeaponPoison, copies: 1, text: "Play as part of your battle plan. Kills the opposing leader unless blocked by a Snooper." }),
    ("Lasgun", TreacheryInfo { category: TreacheryCategory::WeaponSpecial, copies: 1, text: "Kills the opposing leader. If any Shield is present, all forces and leaders in the battle are destroyed." }),
    ("Shield", TreacheryInfo { category: TreacheryCategory::DefenseShield, copies: 4, text: "Protects your leader from projectile weapons in this battle." }),
    ("Snooper", TreacheryInfo { category: TreacheryCategory::DefenseSnooper, copies: 4, text: "Protects your leader from poison weapons in this battle." }),
    ("Cheap Hero", TreacheryInfo { category: TreacheryCategory::Special, copies: 3, text: "Play in place of a leader in battle. Worth zero strength; discard after the battle." }),
    ("Family Atomics", TreacheryInfo { category: TreacheryCategory::Special, copies: 1, text: "Play before the storm moves to destroy the Shield Wall, exposing the basin territories to the storm." }),
    ("Hajr", TreacheryInfo { category: TreacheryCategory::Special, copies: 1, text: "Make one extra on-planet force movement, then discard." }),
    ("Karama", TreacheryInfo { category: TreacheryCategory::Special, copies: 2, text: "Cancel one faction advantage, or buy a treachery card without paying." }),
    ("Tleilaxu Ghola", TreacheryInfo { category: TreacheryCategory::Special, copies: 1, text: "Revive one of your leaders or up to five of your forces at no cost, then discard." }),
    ("Truthtrance", TreacheryInfo { category: TreacheryCategory::Special, copies: 2, text: "Ask one player one yes/no question about the game. It must be answered truthfully." }),
    ("Weather Control", TreacheryInfo { category: TreacheryCategory::Special, copies: 1, text: "Control the storm movement this turn, moving it 0 to 10 sectors." }),
    ("Baliset", TreacheryInfo { category: TreacheryCategory::Worthless, copies: 1, text: "No effect. May be discarded as part of a battle plan." }),
    ("Jubba Cloak", TreacheryInfo { category: TreacheryCategory::Worthless, copies: 1, text: "No effect. May be discarded as part of a battle plan." }),
    ("Kulon", TreacheryInfo { category: TreacheryCategory::Worthless, copies: 1, text: "No effect. May be discarded as part of a battle plan." }),
    ("La La La", TreacheryInfo { category: TreacheryCategory::Worthless, copies: 1, text: "No effect. May be discarded as part of a battle plan." }),
    ("Trip to Gamont", TreacheryInfo { category: TreacheryCategory::Worthless, copies: 1, text: "No effect. May be discarded as part of a battle plan." }),
];

static LEADER_SKILLS: &[(&str, LeaderSkillInfo)] = &[
    ("Mentat", LeaderSkillInfo { text: "Once per turn, look at one element of an opponent's unrevealed battle plan." }),
    ("Master of Assassins", LeaderSkillInfo { text: "Your called traitors add this leader's strength to the battle total." }),
    ("Swordmaster of Ginaz", LeaderSkillInfo { text: "In front of your shield: projectile weapons you play add their leader's strength again." }),
    ("Warmaster", LeaderSkillInfo { text: "In front of your shield: your battle wheel number may exceed your forces by two." }),
    ("Prana Bindu Adept", LeaderSkillInfo { text: "In front of your shield: defenses you play let this leader survive a lasgun." }),
    ("Spice Banker", LeaderSkillInfo { text: "In front of your shield: pay up to three spice to add that much to your battle total." }),
    ("Suk Graduate", LeaderSkillInfo { text: "Once per turn, return one of your killed leaders or three forces from the tanks at no cost." }),
    ("Killer Medic", LeaderSkillInfo { text: "Your forces' losses in battles this leader wins are halved, rounded up." }),
    ("Planetologist", LeaderSkillInfo { text: "In front of your shield: add one to your battle total for each worthless card in your plan." }),
];

static STRONGHOLDS: &[(&str, StrongholdInfo)] = &[
    ("Arrakeen", StrongholdInfo { text: "Control at the start of your shipment: move one of your on-planet groups two territories instead of one." }),
    ("Carthag", StrongholdInfo { text: "Control at the start of your shipment: ship one force into any territory for free." }),
    ("Tuek's Sietch", StrongholdInfo { text: "Control during spice collection: collect two extra spice." }),
    ("Sietch Tabr", StrongholdInfo { text: "Control during revival: revive one extra force for free." }),
    ("Habbanya Sietch", StrongholdInfo { text: "Control during bidding: see the next card up for bid before bidding starts." }),
    ("Hidden Mobile Stronghold", StrongholdInfo { text: "Counts as a stronghold you occupy wherever it currently sits." }),
];

static HOMEWORLDS: &[(&str, HomeworldInfo)] = &[
    ("Caladan", HomeworldInfo { faction: FactionKind::Atreides, threshold: 6, low_income: 1, high_income: 2 }),
    ("Giedi Prime", HomeworldInfo { faction: FactionKind::Harkonnen, threshold: 6, low_income: 1, high_income: 2 }),
    ("Kaitain", HomeworldInfo { faction: FactionKind::Emperor, threshold: 6, low_income: 2, high_income: 3 }),
    ("Salusa Secundus", HomeworldInfo { faction: FactionKind::Emperor, threshold: 2, low_income: 1, high_income: 2 }),
    ("Southern Hemisphere", HomeworldInfo { faction: FactionKind::Fremen, threshold: 7, low_income: 1, high_income: 2 }),
    ("Junction", HomeworldInfo { faction: FactionKind::Guild, threshold: 6, low_income: 1, high_income: 2 }),
    ("Wallach IX", HomeworldInfo { faction: FactionKind::BeneGesserit, threshold: 6, low_income: 1, high_income: 2 }),
    ("Ix", HomeworldInfo { faction: FactionKind::Ix, threshold: 5, low_income: 1, high_income: 2 }),
    ("Tleilax", HomeworldInfo { faction: FactionKind::BeneTleilax, threshold: 6, low_income: 1, high_income: 2 }),
    ("Tupile", HomeworldInfo { faction: FactionKind::Choam, threshold: 6, low_income: 1, high_income: 2 }),
    ("Richese", HomeworldInfo { faction: FactionKind::Richese, threshold: 6, low_income: 1, high_income: 2 }),
    ("Ecaz", HomeworldInfo { faction: FactionKind::Ecaz, threshold: 6, low_income: 1, high_income: 2 }),
    ("Grumman", HomeworldInfo { faction: FactionKind::Moritani, threshold: 6, low_income: 1, high_income: 2 }),
];

static AMBASSADORS: &[(&str, AmbassadorInfo)] = &[
    ("Bene Gesserit", AmbassadorInfo { text: "Look at the triggering faction's treachery hand." }),
    ("Bene Tleilax", AmbassadorInfo { text: "Revive up to four of your forces or one of your leaders for free." }),
    ("CHOAM", AmbassadorInfo { text: "Discard any number of treachery cards, gaining three spice for each." }),
    ("Emperor", AmbassadorInfo { text: "Gain five spice." }),
    ("Fremen", AmbassadorInfo { text: "Move a group of your forces on the board to any territory." }),
    ("Guild", AmbassadorInfo { text: "Ship up to four of your reserves anywhere on the board for free." }),
    ("Harkonnen", AmbassadorInfo { text: "Draw a treachery card." }),
    ("Ix", AmbassadorInfo { text: "Discard one treachery card and draw a replacement from the deck." }),
    ("Richese", AmbassadorInfo { text: "Buy a treachery card for three spice." }),
    ("Ecaz", AmbassadorInfo { text: "Offer an alliance to the triggering faction." }),
];

/// The full set of reference catalogs, built once and shared by reference.
#[derive(Debug)]
pub struct Catalogs {
    /// Treachery card text, categories, and copy counts.
    pub treachery: Catalog<TreacheryInfo>,
    /// Leader skill card text.
    pub leader_skills: Catalog<LeaderSkillInfo>,
    /// Stronghold card text.
    pub strongholds: Catalog<StrongholdInfo>,
    /// Homeworld thresholds and occupation income, keyed by world name.
    pub homeworlds: Catalog<HomeworldInfo>,
    /// Ambassador token effects, keyed by token name.
    pub ambassadors: Catalog<AmbassadorInfo>,
}

impl Catalogs {
    /// Build the standard catalogs.
    #[must_use]
    pub fn standard() -> Self {
        Catalogs {
            treachery: Catalog::from_entries(TREACHERY),
            leader_skills: Catalog::from_entries(LEADER_SKILLS),
            strongholds: Catalog::from_entries(STRONGHOLDS),
            homeworlds: Catalog::from_entries(HOMEWORLDS),
            ambassadors: Catalog::from_entries(AMBASSADORS),
        }
    }

    /// The starting leader roster for a faction.
    #[must_use]
    pub fn leaders(&self, kind: FactionKind) -> &'static [LeaderInfo] {
        match kind {
            FactionKind::Atreides => &[
                LeaderInfo { name: "Dr. Wellington Yueh", strength: 1 },
                LeaderInfo { name: "Duncan Idaho", strength: 2 },
                LeaderInfo { name: "Gurney Halleck", strength: 4 },
                LeaderInfo { name: "Lady Jessica", strength: 5 },
                LeaderInfo { name: "Thufir Hawat", strength: 5 },
            ],
            FactionKind::BeneGesserit => &[
                LeaderInfo { name: "Alia", strength: 5 },
                LeaderInfo { name: "Margot Lady Fenring", strength: 5 },
                LeaderInfo { name: "Mother Ramallo", strength: 5 },
                LeaderInfo { name: "Princess Irulan", strength: 5 },
                LeaderInfo { name: "Wanna Yueh", strength: 5 },
            ],
            FactionKind::BeneTleilax => &[
                LeaderInfo { name: "Blin", strength: 1 },
                LeaderInfo { name: "Wykk", strength: 2 },
                LeaderInfo { name: "Zoal", strength: 3 },
                LeaderInfo { name: "Hidar Fen Ajidica", strength: 4 },
                LeaderInfo { name: "Master Zaaf", strength: 5 },
            ],
            FactionKind::Choam => &[
                LeaderInfo { name: "Rajiv Londine", strength: 1 },
                LeaderInfo { name: "Duke Verdun", strength: 2 },
                LeaderInfo { name: "Lady Jalma", strength: 3 },
                LeaderInfo { name: "Frankos Aru", strength: 4 },
                LeaderInfo { name: "Viscount Tull", strength: 5 },
            ],
            FactionKind::Ecaz => &[
                LeaderInfo { name: "Bindikk Narvi", strength: 2 },
                LeaderInfo { name: "Whitmore Bludd", strength: 3 },
                LeaderInfo { name: "Rivvy Dinari", strength: 4 },
                LeaderInfo { name: "Sanya Ecaz", strength: 5 },
                LeaderInfo { name: "Ilesa Ecaz", strength: 5 },
            ],
            FactionKind::Emperor => &[
                LeaderInfo { name: "Bashar", strength: 2 },
                LeaderInfo { name: "Burseg", strength: 3 },
                LeaderInfo { name: "Caid", strength: 3 },
                LeaderInfo { name: "Captain Aramsham", strength: 5 },
                LeaderInfo { name: "Hasimir Fenring", strength: 6 },
            ],
            FactionKind::Fremen => &[
                LeaderInfo { name: "Jamis", strength: 2 },
                LeaderInfo { name: "Shadout Mapes", strength: 3 },
                LeaderInfo { name: "Otheym", strength: 5 },
                LeaderInfo { name: "Chani", strength: 6 },
                LeaderInfo { name: "Stilgar", strength: 7 },
            ],
            FactionKind::Guild => &[
                LeaderInfo { name: "Guild Rep", strength: 1 },
                LeaderInfo { name: "Soo-Soo Sook", strength: 2 },
                LeaderInfo { name: "Esmar Tuek", strength: 3 },
                LeaderInfo { name: "Master Bewt", strength: 3 },
                LeaderInfo { name: "Staban Tuek", strength: 5 },
            ],
            FactionKind::Harkonnen => &[
                LeaderInfo { name: "Umman Kudu", strength: 1 },
                LeaderInfo { name: "Captain Iakin Nefud", strength: 2 },
                LeaderInfo { name: "Piter de Vries", strength: 3 },
                LeaderInfo { name: "Beast Rabban", strength: 4 },
                LeaderInfo { name: "Feyd-Rautha", strength: 6 },
            ],
            FactionKind::Ix => &[
                LeaderInfo { name: "Cammar Pilru", strength: 1 },
                LeaderInfo { name: "Kailea Vernius", strength: 2 },
                LeaderInfo { name: "Dominic Vernius", strength: 4 },
                LeaderInfo { name: "C'tair Pilru", strength: 5 },
                LeaderInfo { name: "Tessia Vernius", strength: 5 },
            ],
            FactionKind::Moritani => &[
                LeaderInfo { name: "Grieu Kronos", strength: 1 },
                LeaderInfo { name: "Trin Kronos", strength: 2 },
                LeaderInfo { name: "Lupino Ord", strength: 3 },
                LeaderInfo { name: "Hiih Resser", strength: 4 },
                LeaderInfo { name: "Viscount Hundro Moritani", strength: 5 },
            ],
            FactionKind::Richese => &[
                LeaderInfo { name: "Flinto Kinnis", strength: 1 },
                LeaderInfo { name: "Lady Helena", strength: 2 },
                LeaderInfo { name: "Talis Balt", strength: 3 },
                LeaderInfo { name: "Haloa Rund", strength: 4 },
                LeaderInfo { name: "Ein Calimar", strength: 5 },
            ],
        }
    }

    /// Total number of cards in a fresh treachery deck.
    #[must_use]
    pub fn treachery_deck_size(&self) -> usize {
        TREACHERY.iter().map(|(_, info)| info.copies as usize).sum()
    }

    /// Names of a fresh treachery deck, duplicates carrying instance markers.
    #[must_use]
    pub fn treachery_deck_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.treachery_deck_size());
        for (name, info) in TREACHERY {
            names.push((*name).to_string());
            for copy in 2..=info.copies {
                names.push(format!("{name}({copy})"));
            }
        }
        names
    }

    /// Names of all leader skill cards.
    #[must_use]
    pub fn leader_skill_names(&self) -> Vec<String> {
        LEADER_SKILLS.iter().map(|(name, _)| (*name).to_string()).collect()
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Catalogs::standard()
    }
}
