//! Headless-матч FISTFALL
//!
//! Прогоняет полный матч без рендера: скриптованный игрок против волны
//! врагов. Полезно для проверки детерминизма и таймингов глазами.

use bevy::prelude::*;
use fistfall_simulation::{
    create_headless_app, spawn::spawn_player, Actor, CombatState, EnemySpawner, Faction, Health,
    MatchContext, MatchState, PlayerCommand, SimTuning,
};

/// Простейший скрипт игрока: идём к ближайшему живому врагу, бьём когда
/// он в пределах досягаемости кулака.
fn drive_player(world: &mut World, player: Entity) {
    let mut nearest_dx: Option<f32> = None;
    {
        let player_x = match world.get::<Transform>(player) {
            Some(transform) => transform.translation.x,
            None => return,
        };
        let mut enemies = world.query::<(&Actor, &Transform, &Health)>();
        for (actor, transform, health) in enemies.iter(world) {
            if actor.faction != Faction::Enemy || health.is_dead() {
                continue;
            }
            let dx = transform.translation.x - player_x;
            if nearest_dx.map(|best| dx.abs() < best.abs()).unwrap_or(true) {
                nearest_dx = Some(dx);
            }
        }
    }

    let Some(mut command) = world.get_mut::<PlayerCommand>(player) else {
        return;
    };
    match nearest_dx {
        Some(dx) if dx.abs() > 1.0 => {
            command.move_axis = dx.signum();
            command.attack = false;
        }
        Some(dx) => {
            command.move_axis = dx.signum() * 0.2;
            command.attack = true;
        }
        None => {
            command.move_axis = 0.0;
            command.attack = false;
        }
    }
}

fn main() {
    let seed = 42;
    println!("Starting FISTFALL headless match (seed: {})", seed);

    let mut app = create_headless_app(seed);

    let tuning = app.world().resource::<SimTuning>().clone();
    let player = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let player = spawn_player(&mut commands, &tuning, Vec2::ZERO);
        world.flush();
        player
    };
    app.insert_resource(MatchContext { player });
    app.insert_resource(EnemySpawner::new(Vec2::new(8.0, 0.0), 5, &tuning));

    let mut outcome = MatchState::Running;
    for tick in 0..20_000u32 {
        drive_player(app.world_mut(), player);
        app.update();

        if tick % 600 == 0 {
            let alive = {
                let world = app.world_mut();
                let mut query = world.query::<(&Actor, &Health)>();
                query
                    .iter(world)
                    .filter(|(actor, health)| {
                        actor.faction == Faction::Enemy && health.is_alive()
                    })
                    .count()
            };
            let player_hp = app
                .world()
                .get::<Health>(player)
                .map(|health| health.current())
                .unwrap_or(0);
            println!(
                "Tick {}: player hp {}, enemies alive {}",
                tick, player_hp, alive
            );
        }

        outcome = *app.world().resource::<MatchState>();
        if outcome != MatchState::Running {
            println!("Match finished at tick {}: {:?}", tick, outcome);
            break;
        }
    }

    // Wall-clock хвост: даём трупам despawn'уться
    let linger_ticks = (tuning.death_linger * 60.0) as u32 + 10;
    for _ in 0..linger_ticks {
        app.update();
    }

    let corpses = {
        let world = app.world_mut();
        let mut query = world.query::<(&Actor, &CombatState)>();
        query
            .iter(world)
            .filter(|(_, state)| **state == CombatState::Dead)
            .count()
    };
    println!("Done. Outcome: {:?}, corpses left: {}", outcome, corpses);
}
