//! Territories: the spaces forces occupy.
//!
//! A territory is a mutable record of everything sitting in one space: spice,
//! force groups, and at most one ambassador token. Force groups are kept in
//! insertion order and never at zero strength, so serialized output is stable
//! and the force list is exactly what is physically on the board.
//!
//! Homeworlds, the Polar Sink, and the Hidden Mobile Stronghold sit off the
//! storm track; they carry sector `-1`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::force::Force;
use crate::error::{EngineError, EngineResult};
use crate::factions::Ambassador;

/// Sector value for territories the storm never touches.
pub const OFF_STORM_TRACK: i32 = -1;

/// Forces parked on a named child territory.
///
/// Older snapshots nested forces inside container territories this way; the
/// current schema stores every territory flat. The field survives only so the
/// post-load fix-up can re-attach the forces, after which it is always empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostedForces {
    /// Name of the territory the forces logically occupy.
    pub territory: String,
    /// The parked force groups.
    pub forces: Vec<Force>,
}

/// One space on the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    name: String,
    sector: i32,
    #[serde(default)]
    stronghold: bool,
    #[serde(default)]
    rock: bool,
    #[serde(default)]
    fremen_shippable: bool,
    #[serde(default)]
    discovery_token: bool,
    #[serde(default)]
    homeworld: bool,
    #[serde(default)]
    spice: u32,
    #[serde(default)]
    forces: SmallVec<[Force; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ambassador: Option<Ambassador>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hosted: Vec<HostedForces>,
}

impl Territory {
    /// Create a plain sand territory.
    pub fn new(name: impl Into<String>, sector: i32) -> Self {
        Territory {
            name: name.into(),
            sector,
            stronghold: false,
            rock: false,
            fremen_shippable: false,
            discovery_token: false,
            homeworld: false,
            spice: 0,
            forces: SmallVec::new(),
            ambassador: None,
            hosted: Vec::new(),
        }
    }

    /// Create a homeworld territory (off the storm track).
    pub fn homeworld(name: impl Into<String>) -> Self {
        let mut territory = Territory::new(name, OFF_STORM_TRACK);
        territory.homeworld = true;
        territory
    }

    /// Mark as a stronghold.
    #[must_use]
    pub fn with_stronghold(mut self) -> Self {
        self.stronghold = true;
        self
    }

    /// Mark as rock (protected from the storm).
    #[must_use]
    pub fn with_rock(mut self) -> Self {
        self.rock = true;
        self
    }

    /// Mark as a territory Fremen reserves may deploy into directly.
    #[must_use]
    pub fn with_fremen_shippable(mut self) -> Self {
        self.fremen_shippable = true;
        self
    }

    /// Mark as a discovery token location.
    #[must_use]
    pub fn with_discovery_token(mut self) -> Self {
        self.discovery_token = true;
        self
    }

    /// Territory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storm sector, or [`OFF_STORM_TRACK`].
    #[must_use]
    pub fn sector(&self) -> i32 {
        self.sector
    }

    /// Whether this is a stronghold.
    #[must_use]
    pub fn is_stronghold(&self) -> bool {
        self.stronghold
    }

    /// Whether this is rock terrain.
    #[must_use]
    pub fn is_rock(&self) -> bool {
        self.rock
    }

    /// Whether Fremen reserves may deploy here directly.
    #[must_use]
    pub fn is_fremen_shippable(&self) -> bool {
        self.fremen_shippable
    }

    /// Whether this is a discovery token location.
    #[must_use]
    pub fn has_discovery_token(&self) -> bool {
        self.discovery_token
    }

    pub(crate) fn set_discovery_token(&mut self, value: bool) {
        self.discovery_token = value;
    }

    /// Whether this is a homeworld.
    #[must_use]
    pub fn is_homeworld(&self) -> bool {
        self.homeworld
    }

    pub(crate) fn set_homeworld(&mut self, value: bool) {
        self.homeworld = value;
    }

    /// Spice currently on the ground.
    #[must_use]
    pub fn spice(&self) -> u32 {
        self.spice
    }

    /// Add spice to the territory.
    pub fn add_spice(&mut self, amount: u32) {
        self.spice += amount;
    }

    /// Take up to `amount` spice from the territory, returning what was taken.
    pub fn take_spice(&mut self, amount: u32) -> u32 {
        let taken = self.spice.min(amount);
        self.spice -= taken;
        taken
    }

    /// The force groups in this territory.
    #[must_use]
    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    /// Strength of the named force group (zero if absent).
    #[must_use]
    pub fn force_strength(&self, name: &str) -> u32 {
        self.forces
            .iter()
            .find(|f| f.name == name)
            .map_or(0, |f| f.strength)
    }

    /// Total strength of all force groups.
    #[must_use]
    pub fn total_forces(&self) -> u32 {
        self.forces.iter().map(|f| f.strength).sum()
    }

    /// Add strength to the named force group, creating it if absent.
    pub fn add_forces(&mut self, name: &str, amount: u32) {
        if amount == 0 {
            return;
        }
        match self.forces.iter_mut().find(|f| f.name == name) {
            Some(force) => force.strength += amount,
            None => self.forces.push(Force::new(name, amount)),
        }
    }

    /// Remove strength from the named force group.
    ///
    /// Groups never linger at zero strength; removing the last token removes
    /// the group. Fails if the group holds fewer tokens than requested.
    pub fn remove_forces(&mut self, name: &str, amount: u32) -> EngineResult<()> {
        let Some(index) = self.forces.iter().position(|f| f.name == name) else {
            return Err(EngineError::invalid_argument(format!(
                "no {name} forces in {}",
                self.name
            )));
        };
        let force = &mut self.forces[index];
        if force.strength < amount {
            return Err(EngineError::invalid_argument(format!(
                "only {} {name} forces in {}, cannot remove {amount}",
                force.strength, self.name
            )));
        }
        force.strength -= amount;
        if force.strength == 0 {
            self.forces.remove(index);
        }
        Ok(())
    }

    /// Set the named force group to an exact strength.
    ///
    /// Setting zero removes the group; existing groups keep their list slot.
    pub fn set_force_strength(&mut self, name: &str, strength: u32) {
        match self.forces.iter().position(|f| f.name == name) {
            Some(index) if strength == 0 => {
                self.forces.remove(index);
            }
            Some(index) => self.forces[index].strength = strength,
            None if strength > 0 => self.forces.push(Force::new(name, strength)),
            None => {}
        }
    }

    /// Distinct faction names with forces here, in force-list order.
    #[must_use]
    pub fn occupying_factions(&self) -> Vec<&str> {
        let mut factions: Vec<&str> = Vec::new();
        for force in &self.forces {
            let faction = force.faction();
            if !factions.contains(&faction) {
                factions.push(faction);
            }
        }
        factions
    }

    /// Whether the named faction has any forces here.
    #[must_use]
    pub fn is_occupied_by(&self, faction: &str) -> bool {
        self.forces.iter().any(|f| f.faction() == faction)
    }

    /// The sole occupying faction, if exactly one faction is present.
    #[must_use]
    pub fn controlling_faction(&self) -> Option<&str> {
        let factions = self.occupying_factions();
        match factions.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    /// The ambassador token here, if any.
    #[must_use]
    pub fn ambassador(&self) -> Option<Ambassador> {
        self.ambassador
    }

    /// Place an ambassador token. Fails if one is already here.
    pub fn place_ambassador(&mut self, token: Ambassador) -> EngineResult<()> {
        if let Some(existing) = self.ambassador {
            return Err(EngineError::invalid_game_state(format!(
                "{} already holds the {existing} ambassador",
                self.name
            )));
        }
        self.ambassador = Some(token);
        Ok(())
    }

    /// Remove and return the ambassador token, if any.
    pub fn remove_ambassador(&mut self) -> Option<Ambassador> {
        self.ambassador.take()
    }

    /// Drain any legacy hosted-forces entries.
    pub(crate) fn take_hosted(&mut self) -> Vec<HostedForces> {
        std::mem::take(&mut self.hosted)
    }
}
