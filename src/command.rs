//! The command surface.
//!
//! Every mutation the transport can request is a [`Command`] value; the
//! tagged JSON encoding (`{"type": "ShipForces", ...}`) is the wire format
//! bots and tooling speak. [`execute`] applies one command to a game and
//! returns chronicle events, human-readable strings describing what
//! happened. Events never leak hidden information: draws report that a card
//! was drawn, not which one.
//!
//! A command either fully applies or returns an error. Callers that care
//! about on-disk atomicity (the engine) discard the aggregate on error and
//! fall back to the last published snapshot.

use serde::{Deserialize, Serialize};

use crate::cards::Catalogs;
use crate::error::{EngineError, EngineResult};
use crate::factions::{Ambassador, ResourceValue};
use crate::game::{Game, TechToken};

/// One requested mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Add spice behind a faction's shield.
    AddSpice { faction: String, amount: i64 },
    /// Remove spice from behind a faction's shield.
    SubtractSpice { faction: String, amount: i64 },
    /// Move front-of-shield spice behind the shield.
    CollectFrontOfShield { faction: String },
    /// Ship forces from reserves onto the board.
    ShipForces {
        faction: String,
        territory: String,
        amount: u32,
        #[serde(default)]
        special: bool,
    },
    /// Take forces off the board, to reserves or the tanks.
    RemoveForces {
        faction: String,
        territory: String,
        amount: u32,
        #[serde(default)]
        special: bool,
        #[serde(default)]
        to_tanks: bool,
    },
    /// Revive forces from the tanks.
    ReviveForces {
        faction: String,
        amount: u32,
        #[serde(default)]
        special: bool,
    },
    /// Collect spice from a territory (ground spice or homeworld income).
    CollectSpice { faction: String, territory: String },
    /// Draw the top treachery card.
    DrawTreachery { faction: String },
    /// Discard a treachery card from hand.
    DiscardTreachery { faction: String, card: String },
    /// Move a treachery card between hands.
    TransferTreachery {
        from: String,
        to: String,
        card: String,
    },
    /// Reveal the next spice blow.
    DrawSpiceBlow,
    /// Deal the top traitor card to a faction.
    DealTraitor { faction: String },
    /// Form an alliance.
    CreateAlliance { first: String, second: String },
    /// Dissolve an alliance.
    BreakAlliance { first: String, second: String },
    /// Advance to the next turn.
    AdvanceTurn,
    /// Destroy the Shield Wall.
    BreakShieldWall,
    /// Send a leader to the tanks.
    KillLeader { faction: String, leader: String },
    /// Revive a dead leader.
    ReviveLeader { faction: String, leader: String },
    /// Assign a tech token to a faction.
    AssignTechToken { token: TechToken, faction: String },
    /// Place an ambassador from the supply onto a stronghold.
    PlaceAmbassador {
        territory: String,
        ambassador: Ambassador,
        cost: u32,
    },
    /// Trigger the ambassador in a territory.
    TriggerAmbassador {
        territory: String,
        faction: String,
        #[serde(default)]
        for_ally: bool,
    },
    /// Set an entry in a faction's resource bag.
    SetResource {
        faction: String,
        key: String,
        value: ResourceValue,
    },
    /// Move a skill card from a faction's hand onto one of its leaders.
    AssignLeaderSkill {
        faction: String,
        leader: String,
        skill: String,
    },
    /// Apply several commands in order.
    Batch(Vec<Command>),
}

/// Apply one command, returning the chronicle events it produced.
pub fn execute(game: &mut Game, catalogs: &Catalogs, command: &Command) -> EngineResult<Vec<String>> {
    let mut events = Vec::new();
    apply(game, catalogs, command, &mut events)?;
    Ok(events)
}

fn apply(
    game: &mut Game,
    catalogs: &Catalogs,
    command: &Command,
    events: &mut Vec<String>,
) -> EngineResult<()> {
    match command {
        Command::AddSpice { faction, amount } => {
            game.faction_mut(faction)?.add_spice(*amount)?;
            let balance = game.faction(faction)?.spice();
            events.push(format!("{faction} gains {amount} spice ({balance} total)"));
        }
        Command::SubtractSpice { faction, amount } => {
            game.faction_mut(faction)?.subtract_spice(*amount)?;
            let balance = game.faction(faction)?.spice();
            events.push(format!("{faction} pays {amount} spice ({balance} left)"));
        }
        Command::CollectFrontOfShield { faction } => {
            let moved = game.faction_mut(faction)?.collect_front_of_shield()?;
            events.push(format!(
                "{faction} moves {moved} spice behind the shield"
            ));
        }
        Command::ShipForces {
            faction,
            territory,
            amount,
            special,
        } => {
            game.ship_forces(faction, territory, *amount, *special)?;
            let kind = if *special { "special forces" } else { "forces" };
            events.push(format!("{faction} ships {amount} {kind} to {territory}"));
            if let Some(prompt) = game.check_ambassador_trigger(territory, faction) {
                events.push(prompt.to_string());
            }
        }
        Command::RemoveForces {
            faction,
            territory,
            amount,
            special,
            to_tanks,
        } => {
            game.remove_forces(faction, territory, *amount, *special, *to_tanks)?;
            let destination = if *to_tanks { "the tanks" } else { "reserves" };
            events.push(format!(
                "{amount} of {faction}'s forces leave {territory} for {destination}"
            ));
        }
        Command::ReviveForces {
            faction,
            amount,
            special,
        } => {
            let cost = game.revive_forces(faction, *amount, *special)?;
            events.push(format!(
                "{faction} revives {amount} forces for {cost} spice"
            ));
        }
        Command::CollectSpice { faction, territory } => {
            let collected = game.collect_spice(catalogs, faction, territory)?;
            events.push(format!(
                "{faction} collects {collected} spice from {territory}"
            ));
        }
        Command::DrawTreachery { faction } => {
            game.draw_treachery(faction)?;
            events.push(format!("{faction} draws a treachery card"));
        }
        Command::DiscardTreachery { faction, card } => {
            game.discard_treachery(faction, card)?;
            events.push(format!("{faction} discards {card}"));
        }
        Command::TransferTreachery { from, to, card } => {
            game.transfer_treachery(from, to, card)?;
            events.push(format!("{from} passes a treachery card to {to}"));
        }
        Command::DrawSpiceBlow => {
            let card = game.draw_spice_blow()?;
            events.push(format!("spice blow: {card}"));
        }
        Command::DealTraitor { faction } => {
            game.draw_traitor(faction)?;
            events.push(format!("{faction} is dealt a traitor card"));
        }
        Command::CreateAlliance { first, second } => {
            game.create_alliance(first, second)?;
            events.push(format!("{first} and {second} form an alliance"));
        }
        Command::BreakAlliance { first, second } => {
            game.break_alliance(first, second)?;
            events.push(format!("the alliance between {first} and {second} ends"));
        }
        Command::AdvanceTurn => {
            let turn = game.advance_turn();
            events.push(format!("turn {turn} begins"));
        }
        Command::BreakShieldWall => {
            if !game.break_shield_wall() {
                return Err(EngineError::invalid_game_state(
                    "the Shield Wall is already broken",
                ));
            }
            events.push("the Shield Wall is destroyed".to_string());
        }
        Command::KillLeader { faction, leader } => {
            game.kill_leader(faction, leader)?;
            events.push(format!("{leader} is sent to the tanks"));
        }
        Command::ReviveLeader { faction, leader } => {
            let cost = game.revive_leader(faction, leader)?;
            events.push(format!("{faction} revives {leader} for {cost} spice"));
        }
        Command::AssignTechToken { token, faction } => {
            game.assign_tech_token(*token, faction)?;
            events.push(format!("{faction} takes the {token} tech token"));
        }
        Command::PlaceAmbassador {
            territory,
            ambassador,
            cost,
        } => {
            game.place_ambassador(territory, *ambassador, *cost)?;
            events.push(format!(
                "the {ambassador} ambassador is placed in {territory} ({cost} spice)"
            ));
        }
        Command::TriggerAmbassador {
            territory,
            faction,
            for_ally,
        } => {
            let outcome = game.trigger_ambassador(territory, faction, *for_ally)?;
            events.extend(outcome.events);
            if let Some(prompt) = outcome.prompt {
                events.push(prompt.to_string());
            }
        }
        Command::SetResource {
            faction,
            key,
            value,
        } => {
            game.faction_mut(faction)?
                .set_resource(key.clone(), value.clone());
            events.push(format!("{faction}: {key} set"));
        }
        Command::AssignLeaderSkill {
            faction,
            leader,
            skill,
        } => {
            let card = game.faction_mut(faction)?.remove_leader_skill_card(skill)?;
            if let Err(err) = game
                .faction_mut(faction)
                .and_then(|f| f.set_leader_skill(leader, Some(card.name.clone())))
            {
                // Put the card back; the hand is unchanged on failure.
                game.faction_mut(faction)?.add_leader_skill_card(card)?;
                return Err(err);
            }
            events.push(format!("{leader} takes the {skill} skill"));
        }
        Command::Batch(commands) => {
            for command in commands {
                apply(game, catalogs, command, events)?;
            }
        }
    }
    Ok(())
}
