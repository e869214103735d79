//! The game aggregate: one record owning everything a match needs.
//!
//! [`Game`] is the unit of persistence and the only place cross-entity rules
//! live. Factions and territories expose narrow operations on their own
//! state; anything touching two of them at once (shipping, revival, spice
//! collection, alliances, ambassadors) goes through a method here so the
//! bookkeeping that keeps the conservation invariants true sits in one
//! place.
//!
//! ## Conservation
//!
//! For every force name, reserves + on-board strength + tanks is constant.
//! Operations move strength between those buckets, never mint it. The same
//! holds for the ten ambassador tokens across pool, supply, triggered, and
//! the board.

pub mod setup;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{layout, Territory};
use crate::cards::{Catalogs, SpiceCard, TraitorCard, TreacheryCard};
use crate::error::{EngineError, EngineResult};
use crate::factions::{
    resolve_effect, Ambassador, AmbassadorPrompt, AmbassadorState, Faction, FactionKind, Leader,
    ResourceValue, Threshold, TriggerOutcome, FREE_REVIVALS_USED,
};
use crate::rng::GameRng;

/// Spice cost per force revived beyond the free allotment.
pub const REVIVAL_COST_PER_FORCE: u32 = 2;

/// Optional rule modules a game can run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameOption {
    Homeworlds,
    TechTokens,
    DiscoveryTokens,
    LeaderSkills,
    StrongholdCards,
}

/// The three tradable technology tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechToken {
    AxlotlTanks,
    Heighliners,
    SpiceProduction,
}

impl fmt::Display for TechToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TechToken::AxlotlTanks => "Axlotl Tanks",
            TechToken::Heighliners => "Heighliners",
            TechToken::SpiceProduction => "Spice Production",
        })
    }
}

/// A symmetric alliance between two factions, stored name-sorted so the
/// same pair always serializes identically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Alliance(String, String);

impl Alliance {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Alliance(a, b)
        } else {
            Alliance(b, a)
        }
    }

    /// Whether the named faction is one of the pair.
    #[must_use]
    pub fn contains(&self, faction: &str) -> bool {
        self.0 == faction || self.1 == faction
    }

    /// Both members, in sorted order.
    #[must_use]
    pub fn factions(&self) -> (&str, &str) {
        (&self.0, &self.1)
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.0, self.1)
    }
}

/// Full state of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    turn: u32,
    #[serde(default)]
    shield_wall_broken: bool,
    factions: Vec<Faction>,
    territories: BTreeMap<String, Territory>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    alliances: BTreeSet<Alliance>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    leader_tanks: BTreeMap<String, Vec<Leader>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    force_tanks: BTreeMap<String, u32>,
    #[serde(default)]
    treachery_deck: Vec<TreacheryCard>,
    #[serde(default)]
    treachery_discard: Vec<TreacheryCard>,
    #[serde(default)]
    traitor_deck: Vec<TraitorCard>,
    #[serde(default)]
    spice_deck: Vec<SpiceCard>,
    #[serde(default)]
    spice_discard: Vec<SpiceCard>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tech_tokens: BTreeMap<TechToken, String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    options: BTreeSet<GameOption>,
    /// Homeworld territory name to owning faction name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    homeworlds: BTreeMap<String, String>,
    rng: GameRng,
}

impl Game {
    /// An aggregate with nothing seated and an empty board.
    pub(crate) fn empty(seed: u64) -> Self {
        Game {
            turn: 1,
            shield_wall_broken: false,
            factions: Vec::new(),
            territories: BTreeMap::new(),
            alliances: BTreeSet::new(),
            leader_tanks: BTreeMap::new(),
            force_tanks: BTreeMap::new(),
            treachery_deck: Vec::new(),
            treachery_discard: Vec::new(),
            traitor_deck: Vec::new(),
            spice_deck: Vec::new(),
            spice_discard: Vec::new(),
            tech_tokens: BTreeMap::new(),
            options: BTreeSet::new(),
            homeworlds: BTreeMap::new(),
            rng: GameRng::new(seed),
        }
    }

    // === Factions ===

    #[must_use]
    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    #[must_use]
    pub fn has_faction(&self, name: &str) -> bool {
        self.factions.iter().any(|f| f.name() == name)
    }

    pub fn faction(&self, name: &str) -> EngineResult<&Faction> {
        self.factions
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| EngineError::not_found("faction", name))
    }

    pub fn faction_mut(&mut self, name: &str) -> EngineResult<&mut Faction> {
        self.factions
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| EngineError::not_found("faction", name))
    }

    pub(crate) fn factions_mut(&mut self) -> &mut [Faction] {
        &mut self.factions
    }

    pub(crate) fn add_faction(&mut self, faction: Faction) -> EngineResult<()> {
        if self.has_faction(faction.name()) {
            return Err(EngineError::invalid_argument(format!(
                "{} is already seated",
                faction.name()
            )));
        }
        self.factions.push(faction);
        Ok(())
    }

    // === Territories ===

    /// All territories, in name order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    #[must_use]
    pub fn has_territory(&self, name: &str) -> bool {
        self.territories.contains_key(name)
    }

    pub fn territory(&self, name: &str) -> EngineResult<&Territory> {
        self.territories
            .get(name)
            .ok_or_else(|| EngineError::not_found("territory", name))
    }

    pub fn territory_mut(&mut self, name: &str) -> EngineResult<&mut Territory> {
        self.territories
            .get_mut(name)
            .ok_or_else(|| EngineError::not_found("territory", name))
    }

    pub(crate) fn territories_map_mut(&mut self) -> &mut BTreeMap<String, Territory> {
        &mut self.territories
    }

    pub(crate) fn insert_territory(&mut self, territory: Territory) {
        self.territories
            .insert(territory.name().to_string(), territory);
    }

    /// Names of territories where the faction has forces, in name order.
    #[must_use]
    pub fn occupied_territories(&self, faction: &str) -> Vec<&str> {
        self.territories
            .values()
            .filter(|t| t.is_occupied_by(faction))
            .map(Territory::name)
            .collect()
    }

    // === Turn and shield wall ===

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Advance to the next turn, clearing per-turn counters.
    pub fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        for faction in &mut self.factions {
            faction.clear_resource(FREE_REVIVALS_USED);
        }
        self.turn
    }

    #[must_use]
    pub fn shield_wall_broken(&self) -> bool {
        self.shield_wall_broken
    }

    /// Break the Shield Wall; returns false if it was already broken.
    pub fn break_shield_wall(&mut self) -> bool {
        !std::mem::replace(&mut self.shield_wall_broken, true)
    }

    // === Alliances ===

    #[must_use]
    pub fn alliances(&self) -> &BTreeSet<Alliance> {
        &self.alliances
    }

    pub fn create_alliance(&mut self, a: &str, b: &str) -> EngineResult<()> {
        if a == b {
            return Err(EngineError::invalid_argument(format!(
                "{a} cannot ally with itself"
            )));
        }
        for name in [a, b] {
            let faction = self.faction(name)?;
            if let Some(ally) = faction.ally() {
                return Err(EngineError::invalid_game_state(format!(
                    "{name} is already allied with {ally}"
                )));
            }
        }
        self.faction_mut(a)?.set_ally(Some(b.to_string()));
        self.faction_mut(b)?.set_ally(Some(a.to_string()));
        self.alliances.insert(Alliance::new(a, b));
        Ok(())
    }

    pub fn break_alliance(&mut self, a: &str, b: &str) -> EngineResult<()> {
        let alliance = Alliance::new(a, b);
        if !self.alliances.remove(&alliance) {
            return Err(EngineError::invalid_game_state(format!(
                "{a} and {b} are not allied"
            )));
        }
        self.faction_mut(a)?.set_ally(None);
        self.faction_mut(b)?.set_ally(None);
        Ok(())
    }

    // === Forces ===

    /// Ship forces from reserves onto the board.
    pub fn ship_forces(
        &mut self,
        faction: &str,
        territory: &str,
        amount: u32,
        special: bool,
    ) -> EngineResult<()> {
        let (force, kind) = {
            let f = self.faction(faction)?;
            (f.force_name(special), f.kind())
        };
        let target = self.territory(territory)?;
        if kind == FactionKind::Fremen && !(target.is_fremen_shippable() || target.is_homeworld())
        {
            return Err(EngineError::invalid_game_state(format!(
                "Fremen reserves cannot deploy to {territory}"
            )));
        }
        self.faction_mut(faction)?.take_from_reserves(amount, special)?;
        self.territory_mut(territory)?.add_forces(&force, amount);
        Ok(())
    }

    /// Take forces off the board, back to reserves or into the tanks.
    pub fn remove_forces(
        &mut self,
        faction: &str,
        territory: &str,
        amount: u32,
        special: bool,
        to_tanks: bool,
    ) -> EngineResult<()> {
        let force = {
            let f = self.faction(faction)?;
            if special && !f.has_special_forces() {
                return Err(EngineError::invalid_argument(format!(
                    "{faction} has no special forces"
                )));
            }
            f.force_name(special)
        };
        self.territory_mut(territory)?.remove_forces(&force, amount)?;
        if amount == 0 {
            return Ok(());
        }
        if to_tanks {
            *self.force_tanks.entry(force).or_insert(0) += amount;
        } else {
            self.faction_mut(faction)?.add_to_reserves(amount, special)?;
        }
        Ok(())
    }

    /// Revive forces from the tanks, charging spice beyond the free
    /// allotment. Returns the spice paid.
    pub fn revive_forces(
        &mut self,
        faction: &str,
        amount: u32,
        special: bool,
    ) -> EngineResult<u32> {
        if amount == 0 {
            return Ok(0);
        }
        let (force, used, free_left) = {
            let f = self.faction(faction)?;
            if special && !f.has_special_forces() {
                return Err(EngineError::invalid_argument(format!(
                    "{faction} has no special forces"
                )));
            }
            let used = u32::try_from(f.resource_int(FREE_REVIVALS_USED)).unwrap_or(0);
            (
                f.force_name(special),
                used,
                f.free_revival().saturating_sub(used),
            )
        };
        let in_tanks = self.force_tanks_strength(&force);
        if amount > in_tanks {
            return Err(EngineError::invalid_argument(format!(
                "only {in_tanks} {force} forces in the tanks, cannot revive {amount}"
            )));
        }
        let free = free_left.min(amount);
        let cost = (amount - free) * REVIVAL_COST_PER_FORCE;

        let f = self.faction_mut(faction)?;
        f.subtract_spice(i64::from(cost))?;
        if free > 0 {
            f.set_resource(FREE_REVIVALS_USED, ResourceValue::Int(i64::from(used + free)));
        }
        f.add_to_reserves(amount, special)?;
        self.remove_from_tanks(&force, amount);
        Ok(cost)
    }

    /// Move forces from the tanks to reserves without charging anything.
    pub(crate) fn raise_from_tanks(
        &mut self,
        faction: &str,
        amount: u32,
        special: bool,
    ) -> EngineResult<()> {
        let force = self.faction(faction)?.force_name(special);
        if amount > self.force_tanks_strength(&force) {
            return Err(EngineError::invalid_argument(format!(
                "not enough {force} forces in the tanks"
            )));
        }
        self.faction_mut(faction)?.add_to_reserves(amount, special)?;
        self.remove_from_tanks(&force, amount);
        Ok(())
    }

    fn remove_from_tanks(&mut self, force: &str, amount: u32) {
        if let Some(count) = self.force_tanks.get_mut(force) {
            *count = count.saturating_sub(amount);
            if *count == 0 {
                self.force_tanks.remove(force);
            }
        }
    }

    #[must_use]
    pub fn force_tanks(&self) -> &BTreeMap<String, u32> {
        &self.force_tanks
    }

    /// Strength of the named force in the tanks.
    #[must_use]
    pub fn force_tanks_strength(&self, force: &str) -> u32 {
        self.force_tanks.get(force).copied().unwrap_or(0)
    }

    /// Total strength of the named force across all territories.
    #[must_use]
    pub fn on_board_strength(&self, force: &str) -> u32 {
        self.territories
            .values()
            .map(|t| t.force_strength(force))
            .sum()
    }

    // === Leaders ===

    #[must_use]
    pub fn leader_tanks(&self) -> &BTreeMap<String, Vec<Leader>> {
        &self.leader_tanks
    }

    /// This faction's dead leaders.
    #[must_use]
    pub fn dead_leaders(&self, faction: &str) -> &[Leader] {
        self.leader_tanks.get(faction).map_or(&[], Vec::as_slice)
    }

    pub fn kill_leader(&mut self, faction: &str, leader: &str) -> EngineResult<()> {
        let mut leader = self.faction_mut(faction)?.remove_leader(leader)?;
        leader.alive = false;
        self.leader_tanks
            .entry(faction.to_string())
            .or_default()
            .push(leader);
        Ok(())
    }

    /// Revive a dead leader for its strength in spice. Returns the cost.
    pub fn revive_leader(&mut self, faction: &str, leader: &str) -> EngineResult<u32> {
        let kind = self.faction(faction)?.kind();
        let (index, strength) = self
            .leader_tanks
            .get(faction)
            .and_then(|tank| {
                tank.iter()
                    .position(|l| l.name == leader)
                    .map(|i| (i, tank[i].strength))
            })
            .ok_or_else(|| EngineError::not_found("dead leader", leader))?;

        let f = self.faction_mut(faction)?;
        f.subtract_spice(i64::from(strength))?;
        if kind == FactionKind::BeneTleilax {
            f.record_ghola(leader);
        }
        let mut revived = match self.leader_tanks.get_mut(faction) {
            Some(tank) => tank.remove(index),
            None => return Err(EngineError::not_found("dead leader", leader)),
        };
        if self.leader_tanks.get(faction).is_some_and(Vec::is_empty) {
            self.leader_tanks.remove(faction);
        }
        revived.alive = true;
        self.faction_mut(faction)?.add_leader(revived)?;
        Ok(strength)
    }

    // === Treachery deck ===

    #[must_use]
    pub fn treachery_deck(&self) -> &[TreacheryCard] {
        &self.treachery_deck
    }

    #[must_use]
    pub fn treachery_discard(&self) -> &[TreacheryCard] {
        &self.treachery_discard
    }

    /// Draw the top treachery card into a faction's hand; returns the card
    /// name. An exhausted deck recycles the discard pile first.
    pub fn draw_treachery(&mut self, faction: &str) -> EngineResult<String> {
        {
            let f = self.faction(faction)?;
            if f.treachery_hand().len() >= f.hand_limit() {
                return Err(EngineError::invalid_game_state(format!(
                    "{faction}'s treachery hand is full"
                )));
            }
        }
        if self.treachery_deck.is_empty() {
            self.treachery_deck.append(&mut self.treachery_discard);
            self.rng.shuffle(&mut self.treachery_deck);
        }
        let Some(card) = self.treachery_deck.pop() else {
            return Err(EngineError::invalid_game_state(
                "the treachery deck is exhausted",
            ));
        };
        let name = card.name.clone();
        self.faction_mut(faction)?.add_treachery_card(card)?;
        Ok(name)
    }

    pub fn discard_treachery(&mut self, faction: &str, card: &str) -> EngineResult<()> {
        let card = self.faction_mut(faction)?.remove_treachery_card(card)?;
        self.treachery_discard.push(card);
        Ok(())
    }

    /// Move a treachery card between hands. The card never leaves `from`
    /// unless `to` can take it.
    pub fn transfer_treachery(&mut self, from: &str, to: &str, card: &str) -> EngineResult<()> {
        {
            let receiver = self.faction(to)?;
            if receiver.treachery_hand().len() >= receiver.hand_limit() {
                return Err(EngineError::invalid_game_state(format!(
                    "{to}'s treachery hand is full"
                )));
            }
            if receiver.has_treachery_card(card) {
                return Err(EngineError::invalid_argument(format!(
                    "{to} already holds {card}"
                )));
            }
        }
        let card = self.faction_mut(from)?.remove_treachery_card(card)?;
        self.faction_mut(to)?.add_treachery_card(card)?;
        Ok(())
    }

    // === Spice deck ===

    #[must_use]
    pub fn spice_deck(&self) -> &[SpiceCard] {
        &self.spice_deck
    }

    #[must_use]
    pub fn spice_discard(&self) -> &[SpiceCard] {
        &self.spice_discard
    }

    /// Reveal the next spice blow. Territory cards put their spice on the
    /// ground; Shai-Hulud is returned for the caller to resolve.
    pub fn draw_spice_blow(&mut self) -> EngineResult<SpiceCard> {
        if self.spice_deck.is_empty() {
            self.spice_deck.append(&mut self.spice_discard);
            self.rng.shuffle(&mut self.spice_deck);
        }
        let Some(card) = self.spice_deck.pop() else {
            return Err(EngineError::invalid_game_state("the spice deck is exhausted"));
        };
        if let SpiceCard::Territory { territory, amount } = &card {
            match self.territories.get_mut(territory) {
                Some(t) => t.add_spice(*amount),
                None => {
                    let name = territory.clone();
                    self.spice_deck.push(card);
                    return Err(EngineError::not_found("territory", name));
                }
            }
        }
        self.spice_discard.push(card.clone());
        Ok(card)
    }

    // === Traitor deck ===

    #[must_use]
    pub fn traitor_deck(&self) -> &[TraitorCard] {
        &self.traitor_deck
    }

    /// Rebuild and shuffle the traitor deck from every seated faction's
    /// leader roster.
    pub fn build_traitor_deck(&mut self, catalogs: &Catalogs) {
        let mut deck = Vec::new();
        for faction in &self.factions {
            for info in catalogs.leaders(faction.kind()) {
                deck.push(TraitorCard::new(info.name, faction.name(), info.strength));
            }
        }
        self.rng.shuffle(&mut deck);
        self.traitor_deck = deck;
    }

    /// Deal the top traitor card to a faction; returns the leader named.
    pub fn draw_traitor(&mut self, faction: &str) -> EngineResult<String> {
        self.faction(faction)?;
        let Some(card) = self.traitor_deck.pop() else {
            return Err(EngineError::invalid_game_state(
                "the traitor deck is exhausted",
            ));
        };
        if self
            .faction(faction)?
            .traitor_hand()
            .iter()
            .any(|c| c.leader == card.leader)
        {
            let leader = card.leader.clone();
            self.traitor_deck.push(card);
            return Err(EngineError::invalid_argument(format!(
                "{faction} already holds the {leader} traitor card"
            )));
        }
        let leader = card.leader.clone();
        self.faction_mut(faction)?.add_traitor_card(card)?;
        Ok(leader)
    }

    // === Spice collection ===

    /// Whether the faction solely controls Arrakeen or Carthag.
    #[must_use]
    pub fn has_ornithopters(&self, faction: &str) -> bool {
        [layout::ARRAKEEN, layout::CARTHAG].iter().any(|name| {
            self.territories
                .get(*name)
                .and_then(Territory::controlling_faction)
                == Some(faction)
        })
    }

    /// Collect spice from a territory into the faction's front-of-shield
    /// pile. On a homeworld this is the occupancy-tier income; elsewhere it
    /// is ground spice, capped by force count times the collection rate.
    /// Returns the amount collected.
    pub fn collect_spice(
        &mut self,
        catalogs: &Catalogs,
        faction: &str,
        territory: &str,
    ) -> EngineResult<u32> {
        if self.territory(territory)?.is_homeworld() {
            return self.collect_homeworld_income(catalogs, faction, territory);
        }
        let cap = {
            let f = self.faction(faction)?;
            let strength = {
                let t = self.territory(territory)?;
                t.force_strength(&f.force_name(false)) + t.force_strength(&f.force_name(true))
            };
            if strength == 0 {
                return Err(EngineError::invalid_game_state(format!(
                    "{faction} has no forces in {territory}"
                )));
            }
            let rate = f.kind().spice_collection_rate(self.has_ornithopters(faction));
            strength.saturating_mul(rate)
        };
        let collected = self.territory_mut(territory)?.take_spice(cap);
        self.faction_mut(faction)?
            .add_front_of_shield(i64::from(collected))?;
        Ok(collected)
    }

    fn collect_homeworld_income(
        &mut self,
        catalogs: &Catalogs,
        faction: &str,
        world: &str,
    ) -> EngineResult<u32> {
        if self.homeworlds.get(world).map(String::as_str) != Some(faction) {
            return Err(EngineError::invalid_game_state(format!(
                "{world} is not {faction}'s homeworld"
            )));
        }
        let info = catalogs
            .homeworlds
            .lookup(world)
            .ok_or_else(|| EngineError::not_found("homeworld", world))?;
        let income = match self.homeworld_threshold(catalogs, world)? {
            Threshold::High => info.high_income,
            Threshold::Low => info.low_income,
        };
        self.faction_mut(faction)?
            .add_front_of_shield(i64::from(income))?;
        Ok(income)
    }

    /// The occupancy tier of a homeworld, from its owner's native strength
    /// there.
    pub fn homeworld_threshold(&self, catalogs: &Catalogs, world: &str) -> EngineResult<Threshold> {
        let info = catalogs
            .homeworlds
            .lookup(world)
            .ok_or_else(|| EngineError::not_found("homeworld", world))?;
        let owner = self
            .homeworlds
            .get(world)
            .map(String::as_str)
            .unwrap_or_else(|| info.faction.name());
        let t = self.territory(world)?;
        let strength = t.force_strength(&crate::board::force_name(owner, false))
            + t.force_strength(&crate::board::force_name(owner, true));
        Ok(if strength >= info.threshold {
            Threshold::High
        } else {
            Threshold::Low
        })
    }

    // === Homeworlds ===

    #[must_use]
    pub fn homeworlds(&self) -> &BTreeMap<String, String> {
        &self.homeworlds
    }

    /// Register a homeworld for a faction, creating and flagging the
    /// territory as needed. Idempotent; returns whether anything changed.
    pub fn add_homeworld(&mut self, faction: &str, world: &str) -> EngineResult<bool> {
        self.faction(faction)?;
        let mut changed = false;
        match self.territories.get_mut(world) {
            Some(t) => {
                if !t.is_homeworld() {
                    t.set_homeworld(true);
                    changed = true;
                }
            }
            None => {
                self.insert_territory(Territory::homeworld(world));
                changed = true;
            }
        }
        if self.homeworlds.get(world).map(String::as_str) != Some(faction) {
            self.homeworlds.insert(world.to_string(), faction.to_string());
            changed = true;
        }
        Ok(changed)
    }

    // === Tech tokens ===

    #[must_use]
    pub fn tech_tokens(&self) -> &BTreeMap<TechToken, String> {
        &self.tech_tokens
    }

    #[must_use]
    pub fn tech_token_owner(&self, token: TechToken) -> Option<&str> {
        self.tech_tokens.get(&token).map(String::as_str)
    }

    /// Assign (or reassign) a tech token to a faction.
    pub fn assign_tech_token(&mut self, token: TechToken, faction: &str) -> EngineResult<()> {
        self.faction(faction)?;
        self.tech_tokens.insert(token, faction.to_string());
        Ok(())
    }

    // === Options ===

    #[must_use]
    pub fn options(&self) -> &BTreeSet<GameOption> {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: GameOption) -> bool {
        self.options.contains(&option)
    }

    // === Ambassadors ===

    /// The faction holding ambassador tokens, if one is seated.
    #[must_use]
    pub fn ambassador_faction(&self) -> Option<&str> {
        self.factions
            .iter()
            .find(|f| f.ambassadors().is_some())
            .map(Faction::name)
    }

    fn self_token_on_board(&self) -> bool {
        self.territories
            .values()
            .any(|t| t.ambassador() == Some(Ambassador::Ecaz))
    }

    fn nonself_token_on_board(&self) -> bool {
        self.territories
            .values()
            .any(|t| t.ambassador().is_some_and(|a| !a.is_self_token()))
    }

    /// Place an ambassador from the supply onto a stronghold for `cost`
    /// spice. Nothing is debited unless the placement succeeds.
    pub fn place_ambassador(
        &mut self,
        territory: &str,
        token: Ambassador,
        cost: u32,
    ) -> EngineResult<()> {
        let owner = self
            .ambassador_faction()
            .ok_or_else(|| {
                EngineError::invalid_game_state("no faction with ambassadors is seated")
            })?
            .to_string();
        {
            let target = self.territory(territory)?;
            if !target.is_stronghold() {
                return Err(EngineError::invalid_game_state(format!(
                    "{territory} is not a stronghold"
                )));
            }
            if let Some(existing) = target.ambassador() {
                return Err(EngineError::invalid_game_state(format!(
                    "{territory} already holds the {existing} ambassador"
                )));
            }
        }
        {
            let f = self.faction(&owner)?;
            let state = f.ambassadors().ok_or_else(|| {
                EngineError::invalid_game_state(format!("{owner} has no ambassador tokens"))
            })?;
            if !state.in_supply(token) {
                return Err(EngineError::invalid_game_state(format!(
                    "the {token} ambassador is not in the supply"
                )));
            }
            if f.spice() < cost {
                return Err(EngineError::invalid_game_state(format!(
                    "{owner} cannot afford the {cost} spice placement"
                )));
            }
        }
        let f = self.faction_mut(&owner)?;
        f.subtract_spice(i64::from(cost))?;
        if let Some(state) = f.ambassadors_mut() {
            state.take_from_supply(token)?;
        }
        self.territory_mut(territory)?.place_ambassador(token)?;
        Ok(())
    }

    /// Whether an action by `acting` on `territory` would set off an
    /// ambassador. Owner and owner's ally never set one off.
    #[must_use]
    pub fn check_ambassador_trigger(
        &self,
        territory: &str,
        acting: &str,
    ) -> Option<AmbassadorPrompt> {
        let token = self.territories.get(territory)?.ambassador()?;
        let owner = self.ambassador_faction()?;
        if acting == owner {
            return None;
        }
        if self.faction(owner).ok()?.ally() == Some(acting) {
            return None;
        }
        Some(AmbassadorPrompt {
            owner: owner.to_string(),
            acting: acting.to_string(),
            territory: territory.to_string(),
            token,
        })
    }

    /// Trigger the ambassador in a territory. The effect benefits the owner,
    /// or the owner's ally when `for_ally` is set. Exhausting the last
    /// non-self token replenishes the supply automatically.
    pub fn trigger_ambassador(
        &mut self,
        territory: &str,
        triggering: &str,
        for_ally: bool,
    ) -> EngineResult<TriggerOutcome> {
        let owner = self
            .ambassador_faction()
            .ok_or_else(|| {
                EngineError::invalid_game_state("no faction with ambassadors is seated")
            })?
            .to_string();
        if triggering == owner {
            return Err(EngineError::invalid_argument(format!(
                "{owner} cannot trigger its own ambassador"
            )));
        }
        self.faction(triggering)?;
        let token = self.territory(territory)?.ambassador().ok_or_else(|| {
            EngineError::invalid_game_state(format!("no ambassador in {territory}"))
        })?;
        let beneficiary = if for_ally {
            self.faction(&owner)?
                .ally()
                .ok_or_else(|| {
                    EngineError::invalid_game_state(format!("{owner} has no ally"))
                })?
                .to_string()
        } else {
            owner.clone()
        };

        self.territory_mut(territory)?.remove_ambassador();
        if let Some(state) = self.faction_mut(&owner)?.ambassadors_mut() {
            state.mark_triggered(token);
        }

        let (mut events, prompt) = resolve_effect(self, token, triggering, &beneficiary)?;
        events.insert(
            0,
            format!(
                "{triggering} triggered the {token} ambassador in {territory}; {beneficiary} resolves it"
            ),
        );

        let nonself_left = self
            .faction(&owner)?
            .ambassadors()
            .is_some_and(AmbassadorState::has_nonself_in_supply)
            || self.nonself_token_on_board();
        let mut supply_refilled = false;
        if !nonself_left {
            let self_on_board = self.self_token_on_board();
            if let Some(f) = self.factions.iter_mut().find(|f| f.name() == owner) {
                if let Some(state) = f.ambassadors_mut() {
                    state.draw_new_supply(&mut self.rng, self_on_board);
                    supply_refilled = true;
                    events.push(format!("{owner}'s ambassador supply is replenished"));
                }
            }
        }
        Ok(TriggerOutcome {
            events,
            prompt,
            supply_refilled,
        })
    }

    /// All ambassador tokens in play: held buckets plus the board.
    #[must_use]
    pub fn ambassador_token_count(&self) -> usize {
        let held = self
            .factions
            .iter()
            .filter_map(Faction::ambassadors)
            .map(AmbassadorState::held)
            .sum::<usize>();
        let on_board = self
            .territories
            .values()
            .filter(|t| t.ambassador().is_some())
            .count();
        held + on_board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::force_name;

    fn two_faction_game() -> Game {
        let mut game = Game::empty(42);
        for territory in layout::standard_territories() {
            game.insert_territory(territory);
        }
        game.add_faction(Faction::new(FactionKind::Atreides, "paul"))
            .unwrap();
        game.add_faction(Faction::new(FactionKind::Harkonnen, "glossu"))
            .unwrap();
        game
    }

    #[test]
    fn test_ship_and_remove_conserve_forces() {
        let mut game = two_faction_game();
        game.ship_forces("Atreides", "Arrakeen", 5, false).unwrap();
        assert_eq!(game.on_board_strength("Atreides"), 5);
        assert_eq!(game.faction("Atreides").unwrap().reserve_strength(false), 15);

        game.remove_forces("Atreides", "Arrakeen", 2, false, false)
            .unwrap();
        assert_eq!(game.on_board_strength("Atreides"), 3);
        assert_eq!(game.faction("Atreides").unwrap().reserve_strength(false), 17);
        assert_eq!(game.force_tanks_strength("Atreides"), 0);

        game.remove_forces("Atreides", "Arrakeen", 3, false, true)
            .unwrap();
        assert_eq!(game.on_board_strength("Atreides"), 0);
        assert_eq!(game.force_tanks_strength("Atreides"), 3);

        let total = game.faction("Atreides").unwrap().reserve_strength(false)
            + game.on_board_strength("Atreides")
            + game.force_tanks_strength("Atreides");
        assert_eq!(total, FactionKind::Atreides.force_pool());
    }

    #[test]
    fn test_overdraft_shipping_fails_cleanly() {
        let mut game = two_faction_game();
        let err = game.ship_forces("Atreides", "Arrakeen", 21, false).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert_eq!(game.faction("Atreides").unwrap().reserve_strength(false), 20);
        assert_eq!(game.on_board_strength("Atreides"), 0);
    }

    #[test]
    fn test_fremen_deployment_restriction() {
        let mut game = two_faction_game();
        game.add_faction(Faction::new(FactionKind::Fremen, "stilgar"))
            .unwrap();
        let err = game.ship_forces("Fremen", "Arrakeen", 2, false).unwrap_err();
        assert!(matches!(err, EngineError::InvalidGameState(_)));
        game.ship_forces("Fremen", "The Great Flat", 2, false).unwrap();
        game.ship_forces("Fremen", "Sietch Tabr", 1, true).unwrap();
        assert_eq!(game.on_board_strength(&force_name("Fremen", true)), 1);
    }

    #[test]
    fn test_revival_charges_beyond_free_allotment() {
        let mut game = two_faction_game();
        game.ship_forces("Harkonnen", "Carthag", 10, false).unwrap();
        game.remove_forces("Harkonnen", "Carthag", 6, false, true).unwrap();
        assert_eq!(game.force_tanks_strength("Harkonnen"), 6);

        // Harkonnen start with 10 spice and 2 free revivals.
        let cost = game.revive_forces("Harkonnen", 5, false).unwrap();
        assert_eq!(cost, 6);
        assert_eq!(game.faction("Harkonnen").unwrap().spice(), 4);
        assert_eq!(game.force_tanks_strength("Harkonnen"), 1);
        assert_eq!(game.faction("Harkonnen").unwrap().reserve_strength(false), 15);

        // The free allotment is spent for the rest of the turn.
        let cost = game.revive_forces("Harkonnen", 1, false).unwrap();
        assert_eq!(cost, 2);

        game.advance_turn();
        game.remove_forces("Harkonnen", "Carthag", 4, false, true).unwrap();
        let cost = game.revive_forces("Harkonnen", 2, false).unwrap();
        assert_eq!(cost, 0);
    }

    #[test]
    fn test_revival_rejects_more_than_tanked() {
        let mut game = two_faction_game();
        let err = game.revive_forces("Atreides", 1, false).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert_eq!(game.faction("Atreides").unwrap().spice(), 10);
    }

    #[test]
    fn test_alliances_are_symmetric_and_exclusive() {
        let mut game = two_faction_game();
        game.add_faction(Faction::new(FactionKind::Fremen, "stilgar"))
            .unwrap();
        game.create_alliance("Atreides", "Fremen").unwrap();
        assert_eq!(game.faction("Atreides").unwrap().ally(), Some("Fremen"));
        assert_eq!(game.faction("Fremen").unwrap().ally(), Some("Atreides"));
        assert_eq!(game.alliances().len(), 1);

        let err = game.create_alliance("Harkonnen", "Fremen").unwrap_err();
        assert!(matches!(err, EngineError::InvalidGameState(_)));
        assert!(game.create_alliance("Atreides", "Atreides").is_err());

        game.break_alliance("Fremen", "Atreides").unwrap();
        assert_eq!(game.faction("Atreides").unwrap().ally(), None);
        assert!(game.alliances().is_empty());
        assert!(game.break_alliance("Atreides", "Fremen").is_err());
    }

    #[test]
    fn test_kill_and_revive_leader() {
        let mut game = two_faction_game();
        game.faction_mut("Atreides")
            .unwrap()
            .add_leader(Leader::new("Gurney Halleck", 4))
            .unwrap();
        game.kill_leader("Atreides", "Gurney Halleck").unwrap();
        assert!(game.faction("Atreides").unwrap().leader("Gurney Halleck").is_none());
        assert_eq!(game.dead_leaders("Atreides").len(), 1);
        assert!(!game.dead_leaders("Atreides")[0].alive);

        let cost = game.revive_leader("Atreides", "Gurney Halleck").unwrap();
        assert_eq!(cost, 4);
        assert_eq!(game.faction("Atreides").unwrap().spice(), 6);
        assert!(game.dead_leaders("Atreides").is_empty());
        assert!(game.faction("Atreides").unwrap().leader("Gurney Halleck").unwrap().alive);
    }

    #[test]
    fn test_bene_tleilax_records_gholas() {
        let mut game = two_faction_game();
        game.add_faction(Faction::new(FactionKind::BeneTleilax, "wykk"))
            .unwrap();
        game.faction_mut("Bene Tleilax")
            .unwrap()
            .add_leader(Leader::new("Zaaf", 3))
            .unwrap();
        game.kill_leader("Bene Tleilax", "Zaaf").unwrap();
        game.revive_leader("Bene Tleilax", "Zaaf").unwrap();
        assert_eq!(game.faction("Bene Tleilax").unwrap().gholas(), ["Zaaf"]);
    }

    #[test]
    fn test_treachery_draw_recycles_discard() {
        let mut game = two_faction_game();
        game.treachery_deck = vec![TreacheryCard::new("Shield(1)")];
        game.treachery_discard = vec![TreacheryCard::new("Snooper(1)")];

        let first = game.draw_treachery("Atreides").unwrap();
        assert_eq!(first, "Shield(1)");
        game.discard_treachery("Atreides", "Shield(1)").unwrap();

        // Deck is empty; the discard pile recycles.
        let second = game.draw_treachery("Atreides").unwrap();
        assert!(second == "Snooper(1)" || second == "Shield(1)");
        let third = game.draw_treachery("Atreides").unwrap();
        assert_ne!(second, third);
        assert!(game.draw_treachery("Atreides").is_err());
    }

    #[test]
    fn test_transfer_respects_receiver_limit() {
        let mut game = two_faction_game();
        game.faction_mut("Atreides")
            .unwrap()
            .add_treachery_card(TreacheryCard::new("Lasgun"))
            .unwrap();
        for name in ["Shield(1)", "Shield(2)", "Shield(3)", "Shield(4)",
                     "Snooper(1)", "Snooper(2)", "Snooper(3)", "Snooper(4)"] {
            game.faction_mut("Harkonnen")
                .unwrap()
                .add_treachery_card(TreacheryCard::new(name))
                .unwrap();
        }
        let err = game.transfer_treachery("Atreides", "Harkonnen", "Lasgun").unwrap_err();
        assert!(matches!(err, EngineError::InvalidGameState(_)));
        assert!(game.faction("Atreides").unwrap().has_treachery_card("Lasgun"));

        game.transfer_treachery("Harkonnen", "Atreides", "Shield(1)").unwrap();
        assert!(game.faction("Atreides").unwrap().has_treachery_card("Shield(1)"));
        assert!(!game.faction("Harkonnen").unwrap().has_treachery_card("Shield(1)"));
    }

    #[test]
    fn test_spice_blow_lands_on_the_ground() {
        let mut game = two_faction_game();
        game.spice_deck = vec![
            SpiceCard::ShaiHulud,
            SpiceCard::Territory {
                territory: "Red Chasm".to_string(),
                amount: 8,
            },
        ];
        let card = game.draw_spice_blow().unwrap();
        assert!(matches!(card, SpiceCard::Territory { .. }));
        assert_eq!(game.territory("Red Chasm").unwrap().spice(), 8);
        assert_eq!(game.spice_discard().len(), 1);

        let card = game.draw_spice_blow().unwrap();
        assert!(matches!(card, SpiceCard::ShaiHulud));
        // Deck exhausted; next draw recycles the discard.
        assert!(game.draw_spice_blow().is_ok());
    }

    #[test]
    fn test_spice_blow_for_unknown_territory_stays_in_the_deck() {
        let mut game = two_faction_game();
        game.spice_deck = vec![SpiceCard::Territory {
            territory: "Caladan Deeps".to_string(),
            amount: 6,
        }];
        let err = game.draw_spice_blow().unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "territory", .. }));
        assert_eq!(game.spice_deck().len(), 1);
        assert!(game.spice_discard().is_empty());
    }

    #[test]
    fn test_collect_spice_caps_at_rate_times_forces() {
        let mut game = two_faction_game();
        let catalogs = Catalogs::standard();
        game.territory_mut("Red Chasm").unwrap().add_spice(8);
        game.ship_forces("Harkonnen", "Red Chasm", 3, false).unwrap();

        // 3 forces at 2 spice each without ornithopters.
        let collected = game.collect_spice(&catalogs, "Harkonnen", "Red Chasm").unwrap();
        assert_eq!(collected, 6);
        assert_eq!(game.territory("Red Chasm").unwrap().spice(), 2);
        assert_eq!(game.faction("Harkonnen").unwrap().front_of_shield(), 6);

        // Front-of-shield spice moves behind the shield when collected.
        let moved = game.faction_mut("Harkonnen").unwrap().collect_front_of_shield().unwrap();
        assert_eq!(moved, 6);
        assert_eq!(game.faction("Harkonnen").unwrap().spice(), 16);
    }

    #[test]
    fn test_ornithopters_raise_the_rate() {
        let mut game = two_faction_game();
        let catalogs = Catalogs::standard();
        game.ship_forces("Harkonnen", "Carthag", 1, false).unwrap();
        assert!(game.has_ornithopters("Harkonnen"));
        game.territory_mut("Red Chasm").unwrap().add_spice(8);
        game.ship_forces("Harkonnen", "Red Chasm", 2, false).unwrap();
        let collected = game.collect_spice(&catalogs, "Harkonnen", "Red Chasm").unwrap();
        assert_eq!(collected, 6);
    }

    #[test]
    fn test_homeworld_threshold_and_income() {
        let mut game = two_faction_game();
        let catalogs = Catalogs::standard();
        game.add_faction(Faction::new(FactionKind::Emperor, "shaddam"))
            .unwrap();
        assert!(game.add_homeworld("Emperor", "Kaitain").unwrap());
        assert!(!game.add_homeworld("Emperor", "Kaitain").unwrap());

        game.ship_forces("Emperor", "Kaitain", 6, false).unwrap();
        assert_eq!(
            game.homeworld_threshold(&catalogs, "Kaitain").unwrap(),
            Threshold::High
        );
        let income = game.collect_spice(&catalogs, "Emperor", "Kaitain").unwrap();
        assert_eq!(income, 3);

        game.remove_forces("Emperor", "Kaitain", 5, false, false).unwrap();
        assert_eq!(
            game.homeworld_threshold(&catalogs, "Kaitain").unwrap(),
            Threshold::Low
        );
        let income = game.collect_spice(&catalogs, "Emperor", "Kaitain").unwrap();
        assert_eq!(income, 2);

        let err = game.collect_spice(&catalogs, "Atreides", "Kaitain").unwrap_err();
        assert!(matches!(err, EngineError::InvalidGameState(_)));
    }

    #[test]
    fn test_tech_tokens_reassign() {
        let mut game = two_faction_game();
        game.assign_tech_token(TechToken::Heighliners, "Atreides").unwrap();
        assert_eq!(game.tech_token_owner(TechToken::Heighliners), Some("Atreides"));
        game.assign_tech_token(TechToken::Heighliners, "Harkonnen").unwrap();
        assert_eq!(game.tech_token_owner(TechToken::Heighliners), Some("Harkonnen"));
        assert!(game.assign_tech_token(TechToken::AxlotlTanks, "Guild").is_err());
    }

    #[test]
    fn test_shield_wall_breaks_once() {
        let mut game = two_faction_game();
        assert!(!game.shield_wall_broken());
        assert!(game.break_shield_wall());
        assert!(game.shield_wall_broken());
        assert!(!game.break_shield_wall());
    }

    #[test]
    fn test_traitor_deck_covers_all_seated_rosters() {
        let mut game = two_faction_game();
        let catalogs = Catalogs::standard();
        game.build_traitor_deck(&catalogs);
        assert_eq!(game.traitor_deck().len(), 10);
        let drawn = game.draw_traitor("Atreides").unwrap();
        assert!(!drawn.is_empty());
        assert_eq!(game.faction("Atreides").unwrap().traitor_hand().len(), 1);
        assert_eq!(game.traitor_deck().len(), 9);
    }
}
