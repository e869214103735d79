//! Faction state and the common faction contract.
//!
//! Every seated faction is one [`Faction`] record. What *kind* of faction it
//! is (and therefore which rules tables apply) is carried by a
//! [`FactionKind`] discriminant rather than a type per faction, so all
//! twelve factions (and homebrews proxying one of them) flow through the
//! same operations. The kind is never persisted: it is re-derived from the
//! faction's name (or its `proxy` for homebrews) when a snapshot loads.
//!
//! Spice and card mutations validate first and mutate second; a failed
//! operation leaves the record exactly as it was.

mod ambassadors;
mod kind;

pub use ambassadors::{
    Ambassador, AmbassadorPrompt, AmbassadorState, ChoicePrompt, TriggerOutcome,
    AMBASSADOR_TOKEN_COUNT,
};
pub use kind::{FactionKind, StartingPlacement};

pub(crate) use ambassadors::resolve_effect;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{force_name, Force};
use crate::cards::{LeaderSkillCard, TraitorCard, TreacheryCard};
use crate::error::{EngineError, EngineResult, SchemaError};

/// One value in a faction's free-form resource bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl ResourceValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ResourceValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ResourceValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResourceValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for ResourceValue {
    fn from(v: i64) -> Self {
        ResourceValue::Int(v)
    }
}

impl From<bool> for ResourceValue {
    fn from(v: bool) -> Self {
        ResourceValue::Bool(v)
    }
}

impl From<&str> for ResourceValue {
    fn from(v: &str) -> Self {
        ResourceValue::Text(v.to_string())
    }
}

impl From<String> for ResourceValue {
    fn from(v: String) -> Self {
        ResourceValue::Text(v)
    }
}

/// Named odds and ends that do not warrant a dedicated field: per-turn
/// counters, expansion flags, transport bookkeeping.
pub type Resources = BTreeMap<String, ResourceValue>;

/// Resource key for forces revived free of charge this turn.
pub(crate) const FREE_REVIVALS_USED: &str = "free_revivals_used";

/// Homeworld occupancy tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Threshold {
    Low,
    High,
}

/// One leader disc.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub name: String,
    /// Combat strength; also the spice cost to revive.
    pub strength: u32,
    /// Assigned skill card, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default = "Leader::default_alive")]
    pub alive: bool,
}

impl Leader {
    pub fn new(name: impl Into<String>, strength: u32) -> Self {
        Leader {
            name: name.into(),
            strength,
            skill: None,
            alive: true,
        }
    }

    fn default_alive() -> bool {
        true
    }
}

/// One seated faction.
///
/// The `name` field doubles as the snapshot discriminator; `kind` is derived
/// from it on load and never serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    name: String,
    #[serde(skip)]
    kind: FactionKind,
    player: String,
    display_name: String,
    spice: u32,
    front_of_shield: u32,
    hand_limit: usize,
    reserves: Force,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    special_reserves: Option<Force>,
    free_revival: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ally: Option<String>,
    #[serde(default)]
    treachery_hand: Vec<TreacheryCard>,
    #[serde(default)]
    traitor_hand: Vec<TraitorCard>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    leader_skill_hand: Vec<LeaderSkillCard>,
    #[serde(default)]
    leaders: Vec<Leader>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    resources: Resources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ambassadors: Option<AmbassadorState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    gholas: Vec<String>,
    /// For homebrew factions: the canonical kind whose rules they borrow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxy: Option<String>,
}

impl Faction {
    /// Seat a canonical faction with its starting tables.
    pub fn new(kind: FactionKind, player: impl Into<String>) -> Self {
        let name = kind.name().to_string();
        Faction::seat(name, kind, player.into(), None)
    }

    /// Seat a homebrew faction that borrows `proxy`'s rules tables.
    pub fn homebrew(name: impl Into<String>, proxy: FactionKind, player: impl Into<String>) -> Self {
        Faction::seat(
            name.into(),
            proxy,
            player.into(),
            Some(proxy.name().to_string()),
        )
    }

    fn seat(name: String, kind: FactionKind, player: String, proxy: Option<String>) -> Self {
        Faction {
            display_name: name.clone(),
            reserves: Force::new(name.clone(), kind.force_pool()),
            special_reserves: kind.has_special_forces().then(|| {
                Force::new(force_name(&name, true), kind.special_force_pool())
            }),
            name,
            kind,
            player,
            spice: kind.starting_spice(),
            front_of_shield: 0,
            hand_limit: kind.hand_limit(),
            free_revival: kind.free_revival(),
            ally: None,
            treachery_hand: Vec::new(),
            traitor_hand: Vec::new(),
            leader_skill_hand: Vec::new(),
            leaders: Vec::new(),
            resources: Resources::new(),
            ambassadors: (kind == FactionKind::Ecaz).then(AmbassadorState::new),
            gholas: Vec::new(),
            proxy,
        }
    }

    // === Identity ===

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FactionKind {
        self.kind
    }

    #[must_use]
    pub fn player(&self) -> &str {
        &self.player
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    /// Whether this faction borrows its rules through a proxy.
    #[must_use]
    pub fn is_homebrew(&self) -> bool {
        self.proxy.is_some()
    }

    /// Re-derive `kind` from the name, or from the proxy for homebrews.
    pub(crate) fn resolve_kind(&mut self) -> Result<(), SchemaError> {
        if let Some(kind) = FactionKind::from_name(&self.name) {
            self.kind = kind;
            return Ok(());
        }
        match self.proxy.as_deref().and_then(FactionKind::from_name) {
            Some(kind) => {
                self.kind = kind;
                Ok(())
            }
            None => Err(SchemaError::UnknownFaction(self.name.clone())),
        }
    }

    // === Spice ===

    #[must_use]
    pub fn spice(&self) -> u32 {
        self.spice
    }

    /// Spice sitting in front of the shield, visible to everyone.
    #[must_use]
    pub fn front_of_shield(&self) -> u32 {
        self.front_of_shield
    }

    pub fn add_spice(&mut self, amount: i64) -> EngineResult<()> {
        let amount = u32::try_from(amount).map_err(|_| {
            EngineError::invalid_argument(format!("cannot add {amount} spice to {}", self.name))
        })?;
        self.spice = self.spice.checked_add(amount).ok_or_else(|| {
            EngineError::invalid_argument(format!(
                "{} holds {} spice, cannot add {amount} more",
                self.name, self.spice
            ))
        })?;
        Ok(())
    }

    pub fn subtract_spice(&mut self, amount: i64) -> EngineResult<()> {
        let amount = u32::try_from(amount).map_err(|_| {
            EngineError::invalid_argument(format!(
                "cannot remove {amount} spice from {}",
                self.name
            ))
        })?;
        if amount > self.spice {
            return Err(EngineError::invalid_argument(format!(
                "{} holds {} spice, cannot remove {amount}",
                self.name, self.spice
            )));
        }
        self.spice -= amount;
        Ok(())
    }

    pub fn add_front_of_shield(&mut self, amount: i64) -> EngineResult<()> {
        let amount = u32::try_from(amount).map_err(|_| {
            EngineError::invalid_argument(format!(
                "cannot add {amount} spice in front of {}'s shield",
                self.name
            ))
        })?;
        self.front_of_shield = self.front_of_shield.checked_add(amount).ok_or_else(|| {
            EngineError::invalid_argument(format!(
                "{} has {} spice in front of the shield, cannot add {amount} more",
                self.name, self.front_of_shield
            ))
        })?;
        Ok(())
    }

    pub fn subtract_front_of_shield(&mut self, amount: i64) -> EngineResult<()> {
        let amount = u32::try_from(amount).map_err(|_| {
            EngineError::invalid_argument(format!(
                "cannot remove {amount} spice from in front of {}'s shield",
                self.name
            ))
        })?;
        if amount > self.front_of_shield {
            return Err(EngineError::invalid_argument(format!(
                "{} has {} spice in front of the shield, cannot remove {amount}",
                self.name, self.front_of_shield
            )));
        }
        self.front_of_shield -= amount;
        Ok(())
    }

    /// Move all front-of-shield spice behind the shield; returns the amount.
    /// Nothing moves if the behind-shield balance cannot hold it.
    pub fn collect_front_of_shield(&mut self) -> EngineResult<u32> {
        let collected = self.front_of_shield;
        self.spice = self.spice.checked_add(collected).ok_or_else(|| {
            EngineError::invalid_argument(format!(
                "{} holds {} spice, cannot add {collected} more",
                self.name, self.spice
            ))
        })?;
        self.front_of_shield = 0;
        Ok(collected)
    }

    // === Cards ===

    #[must_use]
    pub fn hand_limit(&self) -> usize {
        self.hand_limit
    }

    #[must_use]
    pub fn treachery_hand(&self) -> &[TreacheryCard] {
        &self.treachery_hand
    }

    #[must_use]
    pub fn has_treachery_card(&self, name: &str) -> bool {
        self.treachery_hand.iter().any(|c| c.name == name)
    }

    pub fn add_treachery_card(&mut self, card: TreacheryCard) -> EngineResult<()> {
        if self.treachery_hand.len() >= self.hand_limit {
            return Err(EngineError::invalid_game_state(format!(
                "{}'s treachery hand is full ({} cards)",
                self.name, self.hand_limit
            )));
        }
        if self.has_treachery_card(&card.name) {
            return Err(EngineError::invalid_argument(format!(
                "{} already holds {}",
                self.name, card.name
            )));
        }
        self.treachery_hand.push(card);
        Ok(())
    }

    pub fn remove_treachery_card(&mut self, name: &str) -> EngineResult<TreacheryCard> {
        match self.treachery_hand.iter().position(|c| c.name == name) {
            Some(index) => Ok(self.treachery_hand.remove(index)),
            None => Err(EngineError::not_found("treachery card", name)),
        }
    }

    #[must_use]
    pub fn traitor_hand(&self) -> &[TraitorCard] {
        &self.traitor_hand
    }

    pub fn add_traitor_card(&mut self, card: TraitorCard) -> EngineResult<()> {
        if self.traitor_hand.iter().any(|c| c.leader == card.leader) {
            return Err(EngineError::invalid_argument(format!(
                "{} already holds the {} traitor card",
                self.name, card.leader
            )));
        }
        self.traitor_hand.push(card);
        Ok(())
    }

    pub fn remove_traitor_card(&mut self, leader: &str) -> EngineResult<TraitorCard> {
        match self.traitor_hand.iter().position(|c| c.leader == leader) {
            Some(index) => Ok(self.traitor_hand.remove(index)),
            None => Err(EngineError::not_found("traitor card", leader)),
        }
    }

    #[must_use]
    pub fn leader_skill_hand(&self) -> &[LeaderSkillCard] {
        &self.leader_skill_hand
    }

    pub fn add_leader_skill_card(&mut self, card: LeaderSkillCard) -> EngineResult<()> {
        if self.leader_skill_hand.iter().any(|c| c.name == card.name) {
            return Err(EngineError::invalid_argument(format!(
                "{} already holds the {} skill card",
                self.name, card.name
            )));
        }
        self.leader_skill_hand.push(card);
        Ok(())
    }

    pub fn remove_leader_skill_card(&mut self, name: &str) -> EngineResult<LeaderSkillCard> {
        match self.leader_skill_hand.iter().position(|c| c.name == name) {
            Some(index) => Ok(self.leader_skill_hand.remove(index)),
            None => Err(EngineError::not_found("leader skill card", name)),
        }
    }

    // === Leaders ===

    #[must_use]
    pub fn leaders(&self) -> &[Leader] {
        &self.leaders
    }

    #[must_use]
    pub fn leader(&self, name: &str) -> Option<&Leader> {
        self.leaders.iter().find(|l| l.name == name)
    }

    pub fn add_leader(&mut self, leader: Leader) -> EngineResult<()> {
        if self.leader(&leader.name).is_some() {
            return Err(EngineError::invalid_argument(format!(
                "{} already has leader {}",
                self.name, leader.name
            )));
        }
        self.leaders.push(leader);
        Ok(())
    }

    pub fn remove_leader(&mut self, name: &str) -> EngineResult<Leader> {
        match self.leaders.iter().position(|l| l.name == name) {
            Some(index) => Ok(self.leaders.remove(index)),
            None => Err(EngineError::not_found("leader", name)),
        }
    }

    pub fn set_leader_skill(&mut self, leader: &str, skill: Option<String>) -> EngineResult<()> {
        match self.leaders.iter_mut().find(|l| l.name == leader) {
            Some(leader) => {
                leader.skill = skill;
                Ok(())
            }
            None => Err(EngineError::not_found("leader", leader)),
        }
    }

    // === Forces ===

    /// The board name of this faction's forces.
    #[must_use]
    pub fn force_name(&self, special: bool) -> String {
        force_name(&self.name, special)
    }

    #[must_use]
    pub fn has_special_forces(&self) -> bool {
        self.special_reserves.is_some()
    }

    #[must_use]
    pub fn reserves(&self) -> &Force {
        &self.reserves
    }

    #[must_use]
    pub fn special_reserves(&self) -> Option<&Force> {
        self.special_reserves.as_ref()
    }

    /// Strength currently in reserve.
    #[must_use]
    pub fn reserve_strength(&self, special: bool) -> u32 {
        if special {
            self.special_reserves.as_ref().map_or(0, |f| f.strength)
        } else {
            self.reserves.strength
        }
    }

    pub fn add_to_reserves(&mut self, amount: u32, special: bool) -> EngineResult<()> {
        let pool = self.reserve_pool(special)?;
        pool.strength += amount;
        Ok(())
    }

    pub fn take_from_reserves(&mut self, amount: u32, special: bool) -> EngineResult<()> {
        let name = self.name.clone();
        let pool = self.reserve_pool(special)?;
        if pool.strength < amount {
            return Err(EngineError::invalid_argument(format!(
                "{name} has {} forces in reserve, cannot take {amount}",
                pool.strength
            )));
        }
        pool.strength -= amount;
        Ok(())
    }

    fn reserve_pool(&mut self, special: bool) -> EngineResult<&mut Force> {
        if special {
            self.special_reserves.as_mut().ok_or_else(|| {
                EngineError::invalid_argument(format!("{} has no special forces", self.name))
            })
        } else {
            Ok(&mut self.reserves)
        }
    }

    // === Revival ===

    #[must_use]
    pub fn free_revival(&self) -> u32 {
        self.free_revival
    }

    // === Alliance ===

    #[must_use]
    pub fn ally(&self) -> Option<&str> {
        self.ally.as_deref()
    }

    pub(crate) fn set_ally(&mut self, ally: Option<String>) {
        self.ally = ally;
    }

    // === Resources ===

    #[must_use]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    #[must_use]
    pub fn resource(&self, key: &str) -> Option<&ResourceValue> {
        self.resources.get(key)
    }

    pub fn set_resource(&mut self, key: impl Into<String>, value: ResourceValue) {
        self.resources.insert(key.into(), value);
    }

    pub fn clear_resource(&mut self, key: &str) -> Option<ResourceValue> {
        self.resources.remove(key)
    }

    /// Integer resource, defaulting to zero when absent or non-integer.
    pub(crate) fn resource_int(&self, key: &str) -> i64 {
        self.resource(key).and_then(ResourceValue::as_int).unwrap_or(0)
    }

    // === Ambassadors ===

    #[must_use]
    pub fn ambassadors(&self) -> Option<&AmbassadorState> {
        self.ambassadors.as_ref()
    }

    pub(crate) fn ambassadors_mut(&mut self) -> Option<&mut AmbassadorState> {
        self.ambassadors.as_mut()
    }

    // === Gholas ===

    /// Leaders this faction has revived as gholas.
    #[must_use]
    pub fn gholas(&self) -> &[String] {
        &self.gholas
    }

    pub(crate) fn record_ghola(&mut self, leader: impl Into<String>) {
        self.gholas.push(leader.into());
    }
}
