//! Standing up a new game: seats, board, garrisons, and decks.

use std::collections::BTreeSet;

use crate::board::{layout, Territory, OFF_STORM_TRACK};
use crate::cards::{Catalogs, LeaderSkillCard, TreacheryCard};
use crate::error::{EngineError, EngineResult};
use crate::factions::{Faction, FactionKind, Leader};
use crate::game::{Game, GameOption, TechToken};

/// One seat at the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seat {
    pub kind: FactionKind,
    pub player: String,
}

impl Seat {
    pub fn new(kind: FactionKind, player: impl Into<String>) -> Self {
        Seat {
            kind,
            player: player.into(),
        }
    }
}

/// Build a ready-to-play game: board laid out, factions seated with their
/// leader rosters and starting garrisons, decks shuffled from `seed`.
pub fn new_game(
    seats: &[Seat],
    options: &BTreeSet<GameOption>,
    seed: u64,
    catalogs: &Catalogs,
) -> EngineResult<Game> {
    if seats.is_empty() {
        return Err(EngineError::invalid_argument(
            "at least one faction must be seated",
        ));
    }
    let mut seated = BTreeSet::new();
    for seat in seats {
        if !seated.insert(seat.kind) {
            return Err(EngineError::invalid_argument(format!(
                "{} is seated twice",
                seat.kind
            )));
        }
    }

    let mut game = Game::empty(seed);
    game.options = options.clone();

    for territory in layout::standard_territories() {
        game.insert_territory(territory);
    }
    // The Hidden Mobile Stronghold enters play only with Ix at the table.
    if seated.contains(&FactionKind::Ix) {
        game.insert_territory(
            Territory::new(layout::HIDDEN_MOBILE_STRONGHOLD, OFF_STORM_TRACK).with_stronghold(),
        );
    }

    for seat in seats {
        let mut faction = Faction::new(seat.kind, &seat.player);
        for info in catalogs.leaders(seat.kind) {
            faction.add_leader(Leader::new(info.name, info.strength))?;
        }
        game.add_faction(faction)?;
    }

    // Opening garrisons are placed, not shipped; the Fremen deployment
    // restriction applies only to in-game shipments.
    for seat in seats {
        let name = seat.kind.name();
        for &(territory, regular, special) in seat.kind.starting_placements() {
            place_starting(&mut game, name, territory, regular, false)?;
            place_starting(&mut game, name, territory, special, true)?;
        }
    }

    let mut treachery: Vec<TreacheryCard> = catalogs
        .treachery_deck_names()
        .into_iter()
        .map(TreacheryCard::new)
        .collect();
    game.rng.shuffle(&mut treachery);
    game.treachery_deck = treachery;

    let mut spice = layout::spice_deck();
    game.rng.shuffle(&mut spice);
    game.spice_deck = spice;

    game.build_traitor_deck(catalogs);

    if options.contains(&GameOption::Homeworlds) {
        for seat in seats {
            for world in seat.kind.homeworlds() {
                game.add_homeworld(seat.kind.name(), world)?;
            }
        }
    }

    if options.contains(&GameOption::TechTokens) {
        for (token, kind) in [
            (TechToken::AxlotlTanks, FactionKind::BeneTleilax),
            (TechToken::Heighliners, FactionKind::Guild),
            (TechToken::SpiceProduction, FactionKind::Fremen),
        ] {
            if seated.contains(&kind) {
                game.assign_tech_token(token, kind.name())?;
            }
        }
    }

    // One skill card per seat; picking which leader carries it is a
    // separate command.
    if options.contains(&GameOption::LeaderSkills) {
        let mut skills = catalogs.leader_skill_names();
        game.rng.shuffle(&mut skills);
        for seat in seats {
            if let Some(name) = skills.pop() {
                game.faction_mut(seat.kind.name())?
                    .add_leader_skill_card(LeaderSkillCard::new(name))?;
            }
        }
    }

    // Ecaz draws its opening ambassador supply.
    if seated.contains(&FactionKind::Ecaz) {
        let name = FactionKind::Ecaz.name();
        if let Some(faction) = game.factions.iter_mut().find(|f| f.name() == name) {
            if let Some(state) = faction.ambassadors_mut() {
                state.draw_new_supply(&mut game.rng, false);
            }
        }
    }

    Ok(game)
}

fn place_starting(
    game: &mut Game,
    faction: &str,
    territory: &str,
    amount: u32,
    special: bool,
) -> EngineResult<()> {
    if amount == 0 {
        return Ok(());
    }
    let force = game.faction(faction)?.force_name(special);
    game.faction_mut(faction)?.take_from_reserves(amount, special)?;
    game.territory_mut(territory)?.add_forces(&force, amount);
    Ok(())
}
