//! Итог матча.
//!
//! Явный контекст вместо глобального singleton'а: кто здесь игрок —
//! говорит ресурс `MatchContext`. Оба исхода замораживают виртуальное
//! время (FixedUpdate останавливается); wall-clock фаза — linger трупов —
//! продолжает идти.

use bevy::prelude::*;

use crate::combat::health::ActorDied;
use crate::components::{Actor, Faction, Health};
use crate::spawn::EnemySpawner;

/// Явная ссылка на актора-игрока для match-контроллера
#[derive(Resource, Debug, Clone, Copy)]
pub struct MatchContext {
    pub player: Entity,
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchState {
    #[default]
    Running,
    /// Все враги мертвы и спавнер исчерпан
    Won,
    /// Игрок погиб
    Lost,
}

/// Система: следит за смертями и закрывает матч
pub fn update_match_state(
    mut state: ResMut<MatchState>,
    context: Option<Res<MatchContext>>,
    mut deaths: EventReader<ActorDied>,
    actors: Query<(&Actor, &Health)>,
    spawner: Option<Res<EnemySpawner>>,
    mut virtual_time: ResMut<Time<Virtual>>,
) {
    if *state != MatchState::Running {
        deaths.clear();
        return;
    }
    let Some(context) = context else {
        deaths.clear();
        return;
    };

    let player_died = deaths.read().any(|death| death.entity == context.player);
    if player_died {
        *state = MatchState::Lost;
        virtual_time.pause();
        crate::logger::log_info("💀 Match lost: player died");
        return;
    }

    let spawner_exhausted = spawner.map(|s| s.exhausted()).unwrap_or(true);
    let enemies_alive = actors
        .iter()
        .any(|(actor, health)| actor.faction == Faction::Enemy && health.is_alive());

    if spawner_exhausted && !enemies_alive {
        *state = MatchState::Won;
        virtual_time.pause();
        crate::logger::log_info("🏆 Match won: all enemies down");
    }
}
