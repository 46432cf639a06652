//! FISTFALL Simulation Core
//!
//! Детерминированное 2D-боевое ядро на Bevy 0.16, headless.
//! ECS = авторитетный слой (здоровье, секвенции, FSM, удары);
//! рендер/ввод живут снаружи и общаются через события и `PlayerCommand`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod match_flow;
pub mod player;
pub mod spatial;
pub mod spawn;

// Re-export базовых типов для удобства
pub use ai::PursuitTarget;
pub use combat::{
    ActionSlot, ActiveSequence, ActorDied, Clock, CombatState, CombatStateChanged, DamageRequest,
    DamageTaken, HealthChanged, SequenceFired, SequenceSignal, SlotBusy, StrikeCommitted,
    StrikeRangeTracker,
};
pub use components::*;
pub use config::SimTuning;
pub use match_flow::{MatchContext, MatchState};
pub use player::PlayerCommand;
pub use spatial::{BodyExtent, RangeEvent, RangeVolume};
pub use spawn::EnemySpawner;

/// Частота симуляции. Все интервалы в конфиге — в секундах симулированного
/// времени, тик = 1/60 c.
pub const TICK_RATE_HZ: f64 = 60.0;

pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / TICK_RATE_HZ)
}

/// Главный plugin симуляции
///
/// Порядок внутри тика жёсткий (.chain()): spawn → proximity → решения →
/// секвенции → удары → внешний урон → чистка локов → переходы → движение.
/// Один и тот же входной мир всегда даёт один и тот же выходной.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_duration(tick_duration()))
            .init_resource::<SimTuning>()
            .init_resource::<MatchState>()
            .add_event::<RangeEvent>()
            .add_event::<SequenceFired>()
            .add_event::<CombatStateChanged>()
            .add_event::<StrikeCommitted>()
            .add_event::<DamageRequest>()
            .add_event::<DamageTaken>()
            .add_event::<HealthChanged>()
            .add_event::<ActorDied>()
            .add_systems(
                FixedUpdate,
                (
                    spawn::tick_enemy_spawner,
                    spatial::sweep_range_volumes,
                    combat::proximity::track_range_events,
                    player::player_decide,
                    ai::enemy_decide,
                    combat::sequence::advance_sequences,
                    combat::strike::resolve_strikes,
                    combat::health::apply_damage_requests,
                    combat::proximity::clear_stale_tracker_locks,
                    combat::state::apply_sequence_transitions,
                    player::player_move,
                    ai::enemy_move,
                )
                    .chain(),
            )
            // Wall-clock фаза: идёт и после заморозки виртуального времени
            .add_systems(
                Update,
                (
                    combat::sequence::advance_wall_clock_sequences,
                    combat::state::despawn_after_linger,
                    match_flow::update_match_state,
                )
                    .chain(),
            );

        if app.world().get_resource::<DeterministicRng>().is_none() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции.
///
/// ManualDuration с длиной тика: один app.update() == ровно один
/// FixedUpdate-тик, независимо от стенных часов. Тесты считают тики,
/// а не миллисекунды.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init();
    app.add_plugins(MinimalPlugins)
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            tick_duration(),
        ))
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Прогоняет ровно n тиков симуляции
pub fn run_ticks(app: &mut App, n: u32) {
    for _ in 0..n {
        app.update();
    }
}

#[derive(Serialize)]
struct ActorSnapshot {
    entity: u32,
    x: f32,
    y: f32,
    facing: f32,
    health: u32,
    state: String,
}

/// JSON-snapshot всех акторов для сравнения детерминизма.
/// Сортировка по Entity ID, поэтому два одинаковых прогона дают
/// байт-в-байт одинаковые строки.
pub fn simulation_snapshot(world: &mut World) -> String {
    let mut query = world.query::<(Entity, &Transform, &Facing, &Health, &CombatState)>();
    let mut actors: Vec<_> = query
        .iter(world)
        .map(|(entity, transform, facing, health, state)| ActorSnapshot {
            entity: entity.index(),
            x: transform.translation.x,
            y: transform.translation.y,
            facing: facing.0,
            health: health.current(),
            state: format!("{:?}", state),
        })
        .collect();
    actors.sort_by_key(|actor| actor.entity);

    match serde_json::to_string(&actors) {
        Ok(json) => json,
        Err(err) => {
            logger::log_error(&format!("Snapshot serialization failed: {}", err));
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_valid_json_with_one_entry_per_actor() {
        let mut app = create_headless_app(1);
        let tuning = app.world().resource::<SimTuning>().clone();

        let world = app.world_mut();
        {
            let mut commands = world.commands();
            spawn::spawn_player(&mut commands, &tuning, Vec2::new(1.5, 0.0));
        }
        world.flush();

        let json = simulation_snapshot(app.world_mut());
        assert!(!json.is_empty());

        let parsed: serde_json::Value = serde_json::from_str(&json).expect("snapshot is json");
        let entries = parsed.as_array().expect("snapshot is an array");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["health"], tuning.player_max_health);
    }
}
