//! Engine integration verification tests.
//!
//! The published snapshot is canonical: rejected commands publish nothing,
//! partial work is discarded, and concurrent commands against one game
//! serialize without losing updates.

use std::collections::BTreeSet;
use std::thread;

use arrakis_engine::{Command, Engine, EngineError, FactionKind, GameId, MemoryStore, Seat};

fn engine() -> Engine {
    Engine::new(Box::new(MemoryStore::new()))
}

fn seats() -> Vec<Seat> {
    vec![
        Seat::new(FactionKind::Atreides, "p1"),
        Seat::new(FactionKind::Harkonnen, "p2"),
    ]
}

fn add_spice(faction: &str, amount: i64) -> Command {
    Command::AddSpice {
        faction: faction.into(),
        amount,
    }
}

/// Test that a rejected command publishes nothing: the reload sees the
/// balance from before the attempt.
#[test]
fn test_rejected_command_publishes_nothing() {
    let engine = engine();
    let id = GameId::from("atomic");
    engine.create_game(&id, &seats(), &BTreeSet::new(), 7).unwrap();

    let err = engine
        .apply_command(
            &id,
            &Command::SubtractSpice {
                faction: "Atreides".into(),
                amount: 999,
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let game = engine.game(&id).unwrap();
    assert_eq!(game.faction("Atreides").unwrap().spice(), 10);
}

/// Test that a batch failing halfway discards the half that applied.
#[test]
fn test_failed_batch_discards_partial_work() {
    let engine = engine();
    let id = GameId::from("batch");
    engine.create_game(&id, &seats(), &BTreeSet::new(), 7).unwrap();

    let batch = Command::Batch(vec![
        add_spice("Atreides", 5),
        Command::SubtractSpice {
            faction: "Harkonnen".into(),
            amount: 999,
        },
    ]);
    assert!(engine.apply_command(&id, &batch).is_err());

    let game = engine.game(&id).unwrap();
    assert_eq!(game.faction("Atreides").unwrap().spice(), 10);
    assert_eq!(game.faction("Harkonnen").unwrap().spice(), 10);

    // The surviving half applies fine on its own.
    engine.apply_command(&id, &add_spice("Atreides", 5)).unwrap();
    assert_eq!(
        engine.game(&id).unwrap().faction("Atreides").unwrap().spice(),
        15
    );
}

/// Test that concurrent commands against one game serialize under its
/// lock: every increment lands.
#[test]
fn test_contended_game_loses_no_updates() {
    let engine = engine();
    let id = GameId::from("contended");
    engine.create_game(&id, &seats(), &BTreeSet::new(), 7).unwrap();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    engine.apply_command(&id, &add_spice("Atreides", 1)).unwrap();
                }
            });
        }
    });

    assert_eq!(
        engine.game(&id).unwrap().faction("Atreides").unwrap().spice(),
        110
    );
    assert!(!engine.guard().in_progress());
}

/// Test that a drain clears the cache but the store keeps every game
/// serviceable afterwards.
#[test]
fn test_drain_then_resume() {
    let engine = engine();
    let id = GameId::from("drained");
    engine.create_game(&id, &seats(), &BTreeSet::new(), 7).unwrap();
    engine.apply_command(&id, &add_spice("Atreides", 2)).unwrap();

    engine.drain();

    let game = engine.game(&id).unwrap();
    assert_eq!(game.faction("Atreides").unwrap().spice(), 12);
    assert_eq!(game.turn(), 1);

    let delta = engine.apply_command(&id, &Command::AdvanceTurn).unwrap();
    assert_eq!(delta.turn, 2);
}

/// Test that a command against an unknown game reports a miss instead of
/// inventing a game.
#[test]
fn test_unknown_game_is_not_found() {
    let engine = engine();
    let id = GameId::from("missing");
    let err = engine.apply_command(&id, &Command::AdvanceTurn).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
    assert!(engine.game(&id).is_err());
}

/// Test that the delta names both sides of a new alliance and nothing
/// else.
#[test]
fn test_delta_lists_both_sides_of_an_alliance() {
    let engine = engine();
    let id = GameId::from("pact");
    engine.create_game(&id, &seats(), &BTreeSet::new(), 7).unwrap();

    let delta = engine
        .apply_command(
            &id,
            &Command::CreateAlliance {
                first: "Harkonnen".into(),
                second: "Atreides".into(),
            },
        )
        .unwrap();
    assert_eq!(delta.changed_factions, vec!["Atreides", "Harkonnen"]);
    assert!(delta.changed_territories.is_empty());
    assert_eq!(
        delta.events,
        vec!["Harkonnen and Atreides form an alliance".to_string()]
    );
}

/// Test that invalidation drops cached work but never published state.
#[test]
fn test_invalidate_reloads_published_state() {
    let engine = engine();
    let id = GameId::from("reload");
    engine.create_game(&id, &seats(), &BTreeSet::new(), 7).unwrap();
    engine.apply_command(&id, &add_spice("Harkonnen", 4)).unwrap();

    assert!(engine.invalidate(&id));
    assert!(!engine.invalidate(&id));

    assert_eq!(
        engine.game(&id).unwrap().faction("Harkonnen").unwrap().spice(),
        14
    );
}
