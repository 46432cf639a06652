//! Тесты детерминизма
//!
//! Одинаковый seed + одинаковые входы == байт-в-байт одинаковый мир.
//! Снепшот — JSON всех акторов, отсортированный по Entity ID.

use bevy::prelude::*;
use fistfall_simulation::spawn::spawn_player;
use fistfall_simulation::*;

/// Полный матч со спавнером: игрок стоит на месте и машет кулаком
fn run_match_and_snapshot(seed: u64, ticks: u32) -> String {
    let mut app = create_headless_app(seed);
    let tuning = app.world().resource::<SimTuning>().clone();

    let world = app.world_mut();
    let player = {
        let mut commands = world.commands();
        spawn_player(&mut commands, &tuning, Vec2::ZERO)
    };
    world.flush();

    app.insert_resource(MatchContext { player });
    app.insert_resource(EnemySpawner::new(Vec2::new(6.0, 0.0), 4, &tuning));

    if let Some(mut command) = app.world_mut().get_mut::<PlayerCommand>(player) {
        command.attack = true;
    }

    run_ticks(&mut app, ticks);
    simulation_snapshot(app.world_mut())
}

#[test]
fn same_seed_three_runs_are_identical() {
    const SEED: u64 = 42;
    const TICKS: u32 = 600;

    let snapshot1 = run_match_and_snapshot(SEED, TICKS);
    let snapshot2 = run_match_and_snapshot(SEED, TICKS);
    let snapshot3 = run_match_and_snapshot(SEED, TICKS);

    assert_eq!(snapshot1, snapshot2, "run 1 != run 2 (seed {})", SEED);
    assert_eq!(snapshot2, snapshot3, "run 2 != run 3 (seed {})", SEED);
}

#[test]
fn different_seeds_diverge() {
    // Джиттер спавна и ролл сильного врага тянут из seeded RNG:
    // другие seed'ы обязаны дать другой мир
    let snapshot_a = run_match_and_snapshot(42, 600);
    let snapshot_b = run_match_and_snapshot(1337, 600);

    assert_ne!(snapshot_a, snapshot_b);
}

/// Инварианты, которые обязаны держаться после каждого тика:
/// здоровье в границах, слот пуст ровно у Approaching-акторов
#[test]
fn per_tick_invariants_hold_for_a_full_match() {
    let mut app = create_headless_app(7);
    let tuning = app.world().resource::<SimTuning>().clone();

    let world = app.world_mut();
    let player = {
        let mut commands = world.commands();
        spawn_player(&mut commands, &tuning, Vec2::ZERO)
    };
    world.flush();
    app.insert_resource(EnemySpawner::new(Vec2::new(6.0, 0.0), 3, &tuning));
    let _ = player;

    for tick in 0..900u32 {
        app.update();

        let world = app.world_mut();
        let mut actors = world.query::<(Entity, &Health, &CombatState, &ActionSlot)>();
        for (entity, health, state, slot) in actors.iter(world) {
            assert!(
                health.current() <= health.max(),
                "tick {}: {:?} health {}/{} out of bounds",
                tick,
                entity,
                health.current(),
                health.max()
            );
            assert_eq!(
                slot.is_idle(),
                *state == CombatState::Approaching,
                "tick {}: {:?} slot/state mismatch ({:?}, idle={})",
                tick,
                entity,
                state,
                slot.is_idle()
            );
            if *state == CombatState::Dead {
                assert!(
                    health.is_dead(),
                    "tick {}: {:?} is Dead with {} hp",
                    tick,
                    entity,
                    health.current()
                );
            }
        }
    }
}
