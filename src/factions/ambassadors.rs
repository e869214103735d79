//! Ecaz ambassador tokens and their lifecycle.
//!
//! Ecaz owns ten tokens: one for each of nine other factions plus its own.
//! Tokens cycle through three buckets (a face-down `pool`, a drawn `supply`
//! the player places from, and a `triggered` pile), with the board itself as
//! the fourth location. The buckets plus the board always account for all
//! ten tokens.
//!
//! The self token (Ecaz) never sits in the pool: whenever it is not on the
//! board it rides along in the supply for free. Triggering the last non-self
//! token anywhere replenishes the supply automatically.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::game::Game;
use crate::rng::GameRng;

/// Total ambassador tokens in the Ecaz component set.
pub const AMBASSADOR_TOKEN_COUNT: usize = 10;

/// How many non-self tokens a fresh supply holds.
const SUPPLY_DRAW: usize = 5;

/// One ambassador token, named for the faction whose effect it carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ambassador {
    #[serde(rename = "Bene Gesserit")]
    BeneGesserit,
    #[serde(rename = "Bene Tleilax")]
    BeneTleilax,
    #[serde(rename = "CHOAM")]
    Choam,
    Emperor,
    Fremen,
    Guild,
    Harkonnen,
    Ix,
    Richese,
    Ecaz,
}

impl Ambassador {
    /// Every token in the set.
    pub const ALL: [Ambassador; AMBASSADOR_TOKEN_COUNT] = [
        Ambassador::BeneGesserit,
        Ambassador::BeneTleilax,
        Ambassador::Choam,
        Ambassador::Emperor,
        Ambassador::Fremen,
        Ambassador::Guild,
        Ambassador::Harkonnen,
        Ambassador::Ix,
        Ambassador::Richese,
        Ambassador::Ecaz,
    ];

    /// The nine tokens that cycle through the pool.
    pub const NON_SELF: [Ambassador; 9] = [
        Ambassador::BeneGesserit,
        Ambassador::BeneTleilax,
        Ambassador::Choam,
        Ambassador::Emperor,
        Ambassador::Fremen,
        Ambassador::Guild,
        Ambassador::Harkonnen,
        Ambassador::Ix,
        Ambassador::Richese,
    ];

    /// Display name, matching the ambassador catalog key.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Ambassador::BeneGesserit => "Bene Gesserit",
            Ambassador::BeneTleilax => "Bene Tleilax",
            Ambassador::Choam => "CHOAM",
            Ambassador::Emperor => "Emperor",
            Ambassador::Fremen => "Fremen",
            Ambassador::Guild => "Guild",
            Ambassador::Harkonnen => "Harkonnen",
            Ambassador::Ix => "Ix",
            Ambassador::Richese => "Richese",
            Ambassador::Ecaz => "Ecaz",
        }
    }

    /// Look a token up by its display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Ambassador> {
        Ambassador::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Whether this is the Ecaz self token.
    #[must_use]
    pub fn is_self_token(self) -> bool {
        self == Ambassador::Ecaz
    }
}

impl fmt::Display for Ambassador {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three off-board token buckets, as persisted on the Ecaz faction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbassadorState {
    pool: Vec<Ambassador>,
    supply: Vec<Ambassador>,
    triggered: Vec<Ambassador>,
}

impl AmbassadorState {
    /// Fresh component set: nine tokens pooled, the self token in supply.
    #[must_use]
    pub fn new() -> Self {
        AmbassadorState {
            pool: Ambassador::NON_SELF.to_vec(),
            supply: vec![Ambassador::Ecaz],
            triggered: Vec::new(),
        }
    }

    /// Tokens still face-down in the pool.
    #[must_use]
    pub fn pool(&self) -> &[Ambassador] {
        &self.pool
    }

    /// Tokens available to place.
    #[must_use]
    pub fn supply(&self) -> &[Ambassador] {
        &self.supply
    }

    /// Tokens used since the last supply draw.
    #[must_use]
    pub fn triggered(&self) -> &[Ambassador] {
        &self.triggered
    }

    /// How many tokens the three buckets hold in total.
    #[must_use]
    pub fn held(&self) -> usize {
        self.pool.len() + self.supply.len() + self.triggered.len()
    }

    /// Whether the supply holds this token.
    #[must_use]
    pub fn in_supply(&self, token: Ambassador) -> bool {
        self.supply.contains(&token)
    }

    /// Whether the supply holds any non-self token.
    #[must_use]
    pub fn has_nonself_in_supply(&self) -> bool {
        self.supply.iter().any(|t| !t.is_self_token())
    }

    /// Remove a token from the supply so it can go on the board.
    pub fn take_from_supply(&mut self, token: Ambassador) -> EngineResult<()> {
        match self.supply.iter().position(|t| *t == token) {
            Some(index) => {
                self.supply.remove(index);
                Ok(())
            }
            None => Err(EngineError::invalid_game_state(format!(
                "the {token} ambassador is not in the supply"
            ))),
        }
    }

    /// File a token that just resolved its effect.
    pub(crate) fn mark_triggered(&mut self, token: Ambassador) {
        self.triggered.push(token);
    }

    /// Replenish the supply: fold everything held back into the pool,
    /// shuffle, and draw five. The self token rejoins the supply unless it
    /// is currently on the board.
    pub fn draw_new_supply(&mut self, rng: &mut GameRng, self_token_on_board: bool) {
        self.pool.append(&mut self.triggered);
        self.pool.extend(self.supply.drain(..));
        self.pool.retain(|t| !t.is_self_token());
        rng.shuffle(&mut self.pool);
        let keep = self.pool.len().saturating_sub(SUPPLY_DRAW);
        self.supply = self.pool.split_off(keep);
        if !self_token_on_board {
            self.supply.push(Ambassador::Ecaz);
        }
    }
}

impl Default for AmbassadorState {
    fn default() -> Self {
        AmbassadorState::new()
    }
}

/// A decision put to one faction's player, rendered by the transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoicePrompt {
    /// Faction whose player decides.
    pub faction: String,
    /// What is being decided.
    pub prompt: String,
    /// Concrete options, or empty when the choice is free-form.
    pub options: Vec<String>,
}

impl ChoicePrompt {
    pub fn new(
        faction: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        ChoicePrompt {
            faction: faction.into(),
            prompt: prompt.into(),
            options,
        }
    }
}

impl fmt::Display for ChoicePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.faction, self.prompt)?;
        if !self.options.is_empty() {
            write!(f, " [{}]", self.options.join(" | "))?;
        }
        Ok(())
    }
}

/// The ternary decision offered to the ambassador's owner when another
/// faction's action lands on a token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbassadorPrompt {
    /// Faction owning the token (and the decision).
    pub owner: String,
    /// Faction whose action hit the territory.
    pub acting: String,
    pub territory: String,
    pub token: Ambassador,
}

impl fmt::Display for AmbassadorPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} may trigger the {} ambassador in {} against {}: trigger, trigger for ally, or decline",
            self.owner, self.token, self.territory, self.acting
        )
    }
}

/// What a trigger produced, beyond the state changes themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerOutcome {
    /// Chronicle lines describing what happened.
    pub events: Vec<String>,
    /// Follow-up decision, if the effect needs player input.
    pub prompt: Option<ChoicePrompt>,
    /// Whether this trigger exhausted the supply and forced a redraw.
    pub supply_refilled: bool,
}

/// Resolve one token's effect for `beneficiary` (the owner, or the owner's
/// ally when triggered for the ally). `triggering` is the faction whose
/// action set the token off.
pub(crate) fn resolve_effect(
    game: &mut Game,
    token: Ambassador,
    triggering: &str,
    beneficiary: &str,
) -> EngineResult<(Vec<String>, Option<ChoicePrompt>)> {
    let mut events = Vec::new();
    let mut prompt = None;
    match token {
        Ambassador::BeneGesserit => {
            let hand: Vec<String> = game
                .faction(triggering)?
                .treachery_hand()
                .iter()
                .map(|c| c.name.clone())
                .collect();
            if hand.is_empty() {
                events.push(format!(
                    "{beneficiary} inspects {triggering}'s treachery hand: empty"
                ));
            } else {
                events.push(format!(
                    "{beneficiary} inspects {triggering}'s treachery hand: {}",
                    hand.join(", ")
                ));
            }
        }
        Ambassador::BeneTleilax => {
            let force = game.faction(beneficiary)?.force_name(false);
            let revivable = game.force_tanks_strength(&force).min(4);
            if revivable > 0 {
                game.raise_from_tanks(beneficiary, revivable, false)?;
                events.push(format!(
                    "{beneficiary} revives {revivable} forces at no cost"
                ));
            } else {
                let leaders: Vec<String> = game
                    .dead_leaders(beneficiary)
                    .iter()
                    .map(|l| l.name.clone())
                    .collect();
                if leaders.is_empty() {
                    events.push(format!("{beneficiary} has nothing in the tanks"));
                } else {
                    prompt = Some(ChoicePrompt::new(
                        beneficiary,
                        "Revive one leader at no cost",
                        leaders,
                    ));
                }
            }
        }
        Ambassador::Choam => {
            let hand: Vec<String> = game
                .faction(beneficiary)?
                .treachery_hand()
                .iter()
                .map(|c| c.name.clone())
                .collect();
            if hand.is_empty() {
                events.push(format!("{beneficiary} has no treachery cards to discard"));
            } else {
                prompt = Some(ChoicePrompt::new(
                    beneficiary,
                    "Discard any number of treachery cards for 3 spice each",
                    hand,
                ));
            }
        }
        Ambassador::Emperor => {
            game.faction_mut(beneficiary)?.add_spice(5)?;
            events.push(format!("{beneficiary} gains 5 spice"));
        }
        Ambassador::Fremen => {
            let occupied: Vec<String> = game
                .occupied_territories(beneficiary)
                .into_iter()
                .map(str::to_string)
                .collect();
            if occupied.is_empty() {
                events.push(format!("{beneficiary} has no force group to move"));
            } else {
                prompt = Some(ChoicePrompt::new(
                    beneficiary,
                    "Move one of your force groups to any territory",
                    occupied,
                ));
            }
        }
        Ambassador::Guild => {
            prompt = Some(ChoicePrompt::new(
                beneficiary,
                "Ship up to 4 forces from reserves at no cost",
                Vec::new(),
            ));
        }
        Ambassador::Harkonnen => {
            let faction = game.faction(beneficiary)?;
            if faction.treachery_hand().len() >= faction.hand_limit() {
                events.push(format!("{beneficiary}'s treachery hand is full"));
            } else {
                let card = game.draw_treachery(beneficiary)?;
                events.push(format!("{beneficiary} draws {card} from the treachery deck"));
            }
        }
        Ambassador::Ix => {
            let hand: Vec<String> = game
                .faction(beneficiary)?
                .treachery_hand()
                .iter()
                .map(|c| c.name.clone())
                .collect();
            if hand.is_empty() {
                events.push(format!("{beneficiary} has no treachery card to exchange"));
            } else {
                prompt = Some(ChoicePrompt::new(
                    beneficiary,
                    "Exchange one treachery card with the top of the deck",
                    hand,
                ));
            }
        }
        Ambassador::Richese => {
            let faction = game.faction(beneficiary)?;
            if faction.spice() < 3 {
                events.push(format!(
                    "{beneficiary} cannot afford a treachery card (3 spice)"
                ));
            } else if faction.treachery_hand().len() >= faction.hand_limit() {
                events.push(format!("{beneficiary}'s treachery hand is full"));
            } else {
                prompt = Some(ChoicePrompt::new(
                    beneficiary,
                    "Buy a treachery card for 3 spice",
                    vec!["Buy".to_string(), "Decline".to_string()],
                ));
            }
        }
        Ambassador::Ecaz => {
            prompt = Some(ChoicePrompt::new(
                triggering,
                format!("Form an alliance with {beneficiary}?"),
                vec!["Accept".to_string(), "Decline".to_string()],
            ));
        }
    }
    Ok((events, prompt))
}
