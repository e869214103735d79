//! Force conservation verification tests.
//!
//! Force tokens only move between reserves, the board, and the tanks.
//! These tests verify that no operation mints or destroys a token and
//! that failed operations change nothing at all.

use std::collections::BTreeSet;

use proptest::prelude::*;

use arrakis_engine::{force_name, new_game, Catalogs, EngineError, FactionKind, Game, Seat};

fn standard_game(kinds: &[FactionKind], seed: u64) -> Game {
    let catalogs = Catalogs::standard();
    let seats: Vec<Seat> = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| Seat::new(*kind, format!("player-{i}")))
        .collect();
    new_game(&seats, &BTreeSet::new(), seed, &catalogs).unwrap()
}

/// Every token of a faction's pool is in exactly one of reserves, the
/// board, or the tanks.
fn assert_forces_conserved(game: &Game, faction: &str) {
    let f = game.faction(faction).unwrap();
    let kind = f.kind();
    let regular = force_name(faction, false);
    assert_eq!(
        f.reserve_strength(false)
            + game.on_board_strength(&regular)
            + game.force_tanks_strength(&regular),
        kind.force_pool(),
        "{faction} regular forces leaked"
    );
    if kind.has_special_forces() {
        let special = force_name(faction, true);
        assert_eq!(
            f.reserve_strength(true)
                + game.on_board_strength(&special)
                + game.force_tanks_strength(&special),
            kind.special_force_pool(),
            "{faction} special forces leaked"
        );
    }
}

/// Test that setup distributes each pool without loss, including the
/// factions whose garrisons split across several territories.
#[test]
fn test_setup_conserves_every_pool() {
    let game = standard_game(
        &[
            FactionKind::Atreides,
            FactionKind::Fremen,
            FactionKind::Emperor,
            FactionKind::Ix,
        ],
        11,
    );
    for faction in ["Atreides", "Fremen", "Emperor", "Ix"] {
        assert_forces_conserved(&game, faction);
    }
}

/// Test that shipping moves tokens from reserves to the board and that an
/// overdraw is rejected without touching either side.
#[test]
fn test_shipping_moves_tokens_without_minting() {
    let mut game = standard_game(&[FactionKind::Atreides, FactionKind::Harkonnen], 11);

    game.ship_forces("Atreides", "Sihaya Ridge", 5, false)
        .unwrap();
    assert_eq!(game.faction("Atreides").unwrap().reserve_strength(false), 5);
    assert_eq!(game.on_board_strength("Atreides"), 15);
    assert_forces_conserved(&game, "Atreides");

    let err = game
        .ship_forces("Atreides", "Sihaya Ridge", 6, false)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
    assert_eq!(game.faction("Atreides").unwrap().reserve_strength(false), 5);
    assert_eq!(game.on_board_strength("Atreides"), 15);
    assert_forces_conserved(&game, "Atreides");
}

/// Test that forces sent to the tanks come back through revival with the
/// free allotment honored and spice charged beyond it.
#[test]
fn test_tanks_round_trip_through_revival() {
    let mut game = standard_game(&[FactionKind::Atreides, FactionKind::Harkonnen], 11);

    game.remove_forces("Atreides", "Arrakeen", 6, false, true)
        .unwrap();
    assert_eq!(game.force_tanks_strength("Atreides"), 6);
    assert_forces_conserved(&game, "Atreides");

    // Two free revivals, then 2 spice per force.
    let cost = game.revive_forces("Atreides", 2, false).unwrap();
    assert_eq!(cost, 0);
    assert_eq!(game.faction("Atreides").unwrap().spice(), 10);

    let cost = game.revive_forces("Atreides", 3, false).unwrap();
    assert_eq!(cost, 6);
    assert_eq!(game.faction("Atreides").unwrap().spice(), 4);
    assert_eq!(game.force_tanks_strength("Atreides"), 1);
    assert_eq!(
        game.faction("Atreides").unwrap().reserve_strength(false),
        15
    );
    assert_forces_conserved(&game, "Atreides");
}

/// Test that an unaffordable revival is rejected before anything moves.
#[test]
fn test_failed_revival_charges_nothing() {
    let mut game = standard_game(&[FactionKind::Choam], 11);
    game.ship_forces("CHOAM", "Polar Sink", 5, false).unwrap();
    game.remove_forces("CHOAM", "Polar Sink", 4, false, true)
        .unwrap();

    // Two forces cost 4 spice; CHOAM holds 2 and has no free revivals.
    assert!(game.revive_forces("CHOAM", 2, false).is_err());
    assert_eq!(game.faction("CHOAM").unwrap().spice(), 2);
    assert_eq!(game.force_tanks_strength("CHOAM"), 4);
    assert_forces_conserved(&game, "CHOAM");

    let cost = game.revive_forces("CHOAM", 1, false).unwrap();
    assert_eq!(cost, 2);
    assert_eq!(game.faction("CHOAM").unwrap().spice(), 0);
    assert_forces_conserved(&game, "CHOAM");
}

/// Test that removal back to reserves credits exactly what left the
/// territory and never touches the tanks.
#[test]
fn test_removal_credits_reserves_not_tanks() {
    let mut game = standard_game(&[FactionKind::Emperor], 11);
    game.ship_forces("Emperor", "Imperial Basin", 5, false)
        .unwrap();
    assert_eq!(game.faction("Emperor").unwrap().reserve_strength(false), 10);

    game.remove_forces("Emperor", "Imperial Basin", 2, false, false)
        .unwrap();
    assert_eq!(
        game.territory("Imperial Basin")
            .unwrap()
            .force_strength("Emperor"),
        3
    );
    assert_eq!(game.faction("Emperor").unwrap().reserve_strength(false), 12);
    assert_eq!(game.force_tanks_strength("Emperor"), 0);
    assert_forces_conserved(&game, "Emperor");
}

/// Test that removing more forces than a territory holds is rejected and
/// leaves the garrison intact.
#[test]
fn test_overdrawn_removal_rejected() {
    let mut game = standard_game(&[FactionKind::Guild], 11);
    assert!(game
        .remove_forces("Guild", "Tuek's Sietch", 6, false, false)
        .is_err());
    assert_eq!(
        game.territory("Tuek's Sietch")
            .unwrap()
            .force_strength("Guild"),
        5
    );
    assert_forces_conserved(&game, "Guild");
}

/// Test that a spice debit validates the balance before mutating it.
#[test]
fn test_spice_debit_validates_before_mutating() {
    let mut game = standard_game(&[FactionKind::Atreides, FactionKind::Harkonnen], 11);
    let err = game
        .faction_mut("Atreides")
        .unwrap()
        .subtract_spice(11)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
    assert_eq!(game.faction("Atreides").unwrap().spice(), 10);

    game.faction_mut("Atreides").unwrap().subtract_spice(10).unwrap();
    assert_eq!(game.faction("Atreides").unwrap().spice(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No sequence of shipments, removals, and revivals mints or destroys
    /// a force token, whether the individual operations succeed or fail.
    #[test]
    fn prop_force_tokens_conserved(
        seed in any::<u64>(),
        ops in prop::collection::vec(
            (0u8..4, 0usize..2, 0usize..5, 0u32..8, any::<bool>()),
            1..40,
        )
    ) {
        let mut game = standard_game(&[FactionKind::Atreides, FactionKind::Emperor], seed);
        let factions = ["Atreides", "Emperor"];
        let territories = [
            "Arrakeen",
            "Sihaya Ridge",
            "Polar Sink",
            "Funeral Plain",
            "Carthag",
        ];

        for (op, f, t, amount, special) in ops {
            let faction = factions[f];
            let territory = territories[t];
            let _ = match op {
                0 => game.ship_forces(faction, territory, amount, special),
                1 => game.remove_forces(faction, territory, amount, special, false),
                2 => game.remove_forces(faction, territory, amount, special, true),
                _ => game.revive_forces(faction, amount, special).map(|_| ()),
            };

            for faction in factions {
                let record = game.faction(faction).unwrap();
                let kind = record.kind();
                let regular = force_name(faction, false);
                prop_assert_eq!(
                    record.reserve_strength(false)
                        + game.on_board_strength(&regular)
                        + game.force_tanks_strength(&regular),
                    kind.force_pool(),
                    "{} regular forces leaked",
                    faction
                );
                if kind.has_special_forces() {
                    let special_name = force_name(faction, true);
                    prop_assert_eq!(
                        record.reserve_strength(true)
                            + game.on_board_strength(&special_name)
                            + game.force_tanks_strength(&special_name),
                        kind.special_force_pool(),
                        "{} special forces leaked",
                        faction
                    );
                }
            }
        }
    }

    /// Revival never pays out more than the tanks hold and never leaves a
    /// negative balance.
    #[test]
    fn prop_revival_bounded_by_tanks_and_spice(
        seed in any::<u64>(),
        to_tanks in 0u32..11,
        revive in 0u32..11,
    ) {
        let mut game = standard_game(&[FactionKind::Harkonnen], seed);
        game.remove_forces("Harkonnen", "Carthag", to_tanks, false, true).unwrap();

        let spice_before = game.faction("Harkonnen").unwrap().spice();
        match game.revive_forces("Harkonnen", revive, false) {
            Ok(cost) => {
                prop_assert!(revive <= to_tanks);
                prop_assert_eq!(
                    game.faction("Harkonnen").unwrap().spice(),
                    spice_before - cost
                );
                prop_assert_eq!(game.force_tanks_strength("Harkonnen"), to_tanks - revive);
            }
            Err(_) => {
                prop_assert_eq!(game.faction("Harkonnen").unwrap().spice(), spice_before);
                prop_assert_eq!(game.force_tanks_strength("Harkonnen"), to_tanks);
            }
        }
    }
}
