//! Спавн акторов и волновой спавнер врагов

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ai::PursuitTarget;
use crate::combat::proximity::StrikeRangeTracker;
use crate::combat::sequence::ActionSlot;
use crate::combat::state::CombatState;
use crate::components::{
    Actor, Facing, Faction, Health, HitVolume, LingerOnDeath, MoveSpeed, StrongEnemy, Striker,
};
use crate::config::SimTuning;
use crate::player::PlayerCommand;
use crate::spatial::{BodyExtent, RangeVolume};
use crate::DeterministicRng;

pub fn spawn_player(commands: &mut Commands, tuning: &SimTuning, position: Vec2) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Actor {
                faction: Faction::Player,
            },
            Health::new(tuning.player_max_health),
            Facing(1.0),
            CombatState::default(),
            ActionSlot::default(),
            PlayerCommand::default(),
            MoveSpeed(tuning.player_move_speed),
            Striker {
                damage: tuning.player_damage,
                attack_delay: tuning.player_attack_delay,
                attack_cooldown: tuning.player_attack_cooldown,
                strike_gate: None,
            },
            HitVolume {
                half_extents: Vec2::new(tuning.hit_box_width / 2.0, tuning.hit_box_height / 2.0),
                forward_offset: tuning.hit_box_offset,
            },
            BodyExtent {
                half_extents: Vec2::new(tuning.body_width / 2.0, tuning.body_height / 2.0),
            },
        ))
        .id()
}

/// Спавн врага. 50% шанс "сильного" варианта (двойной урон, маркер для
/// тинта на стороне презентации).
pub fn spawn_enemy(
    commands: &mut Commands,
    rng: &mut ChaCha8Rng,
    tuning: &SimTuning,
    position: Vec2,
    target: Entity,
) -> Entity {
    let is_strong = rng.gen_bool(0.5);
    let damage = if is_strong {
        tuning.enemy_strong_damage
    } else {
        tuning.enemy_damage
    };

    let mut enemy = commands.spawn((
        Transform::from_translation(position.extend(0.0)),
        Actor {
            faction: Faction::Enemy,
        },
        Health::new(tuning.enemy_max_health),
        Facing(-1.0),
        CombatState::default(),
        ActionSlot::default(),
        MoveSpeed(tuning.enemy_move_speed),
        Striker {
            damage,
            attack_delay: tuning.enemy_attack_delay,
            attack_cooldown: tuning.enemy_attack_cooldown,
            strike_gate: Some(tuning.strike_distance),
        },
        HitVolume {
            half_extents: Vec2::new(tuning.hit_box_width / 2.0, tuning.hit_box_height / 2.0),
            forward_offset: tuning.hit_box_offset,
        },
        BodyExtent {
            half_extents: Vec2::new(tuning.body_width / 2.0, tuning.body_height / 2.0),
        },
        RangeVolume::new(Vec2::new(tuning.range_width / 2.0, tuning.range_height / 2.0)),
        StrikeRangeTracker::default(),
        PursuitTarget(target),
        LingerOnDeath {
            seconds: tuning.death_linger,
        },
    ));
    if is_strong {
        enemy.insert(StrongEnemy);
    }
    let id = enemy.id();

    crate::logger::log_info(&format!(
        "Spawned {} enemy {:?} at {:?}",
        if is_strong { "strong" } else { "normal" },
        id,
        position
    ));
    id
}

/// Волновой спавнер: по врагу каждые `interval` секунд симуляции,
/// с горизонтальным джиттером, пока не исчерпан бюджет.
#[derive(Resource, Debug, Clone)]
pub struct EnemySpawner {
    pub origin: Vec2,
    pub interval: f32,
    pub jitter: f32,
    remaining: u32,
    timer: f32,
}

impl EnemySpawner {
    pub fn new(origin: Vec2, count: u32, tuning: &SimTuning) -> Self {
        Self {
            origin,
            interval: tuning.spawn_interval,
            jitter: tuning.spawn_jitter,
            remaining: count,
            // Первый враг появляется сразу
            timer: 0.0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Система: тикает спавнер на симулированном времени
pub fn tick_enemy_spawner(
    mut commands: Commands,
    spawner: Option<ResMut<EnemySpawner>>,
    mut rng: ResMut<DeterministicRng>,
    tuning: Res<SimTuning>,
    time: Res<Time<Fixed>>,
    players: Query<Entity, With<PlayerCommand>>,
) {
    let Some(mut spawner) = spawner else {
        return;
    };
    if spawner.exhausted() {
        return;
    }
    let Some(player) = players.iter().next() else {
        return;
    };

    spawner.timer -= time.delta_secs();
    if spawner.timer > 0.0 {
        return;
    }
    spawner.timer = spawner.interval;
    spawner.remaining -= 1;

    let jitter = if spawner.jitter > 0.0 {
        rng.rng.gen_range(-spawner.jitter..=spawner.jitter)
    } else {
        0.0
    };
    let position = spawner.origin + Vec2::new(jitter, 0.0);
    spawn_enemy(&mut commands, &mut rng.rng, &tuning, position, player);
}
