//! AI-вариант состояния Approaching: преследование и решение атаковать.
//!
//! Триггер атаки двухступенчатый: range volume — авторитет (tracker),
//! дистанция по горизонтальной оси — второй, более жёсткий фильтр.

use bevy::prelude::*;

use crate::combat::proximity::StrikeRangeTracker;
use crate::combat::sequence::{ActionSlot, ActiveSequence};
use crate::combat::state::{set_state, CombatState, CombatStateChanged};
use crate::combat::strike::StrikeCommitted;
use crate::components::{Facing, Health, MoveSpeed, Striker};
use crate::config::SimTuning;

/// Кого преследует AI-актор. Явная ссылка, назначается при спавне.
#[derive(Component, Debug, Clone, Copy)]
pub struct PursuitTarget(pub Entity);

/// Система: решение атаковать.
///
/// Approaching → WindingUp когда tracker подтверждает цель в range volume
/// И горизонтальная дистанция не больше strike_distance.
pub fn enemy_decide(
    mut enemies: Query<(
        Entity,
        &Transform,
        &Striker,
        &StrikeRangeTracker,
        &mut CombatState,
        &mut ActionSlot,
    )>,
    targets: Query<(&Transform, &Health)>,
    tuning: Res<SimTuning>,
    mut committed: EventWriter<StrikeCommitted>,
    mut state_events: EventWriter<CombatStateChanged>,
) {
    for (entity, transform, striker, tracker, mut state, mut slot) in enemies.iter_mut() {
        if *state != CombatState::Approaching {
            continue;
        }
        if !tracker.in_range() {
            continue;
        }
        let Some(target) = tracker.tracked() else {
            continue;
        };
        let Ok((target_transform, target_health)) = targets.get(target) else {
            continue;
        };
        if !target_health.is_alive() {
            continue;
        }

        let dx = (target_transform.translation.x - transform.translation.x).abs();
        if dx > tuning.strike_distance {
            continue;
        }

        match slot.begin(ActiveSequence::strike(
            striker.attack_delay,
            striker.attack_cooldown,
        )) {
            Ok(()) => {
                set_state(entity, &mut state, CombatState::WindingUp, &mut state_events);
                committed.write(StrikeCommitted { attacker: entity });
            }
            Err(_) => {
                // Approaching с занятым слотом — нарушение инварианта
                crate::logger::log_warning(&format!(
                    "{:?} tried to attack with a busy action slot",
                    entity
                ));
            }
        }
    }
}

/// Система: преследование цели.
///
/// Двигается только в Approaching/Recovering; WindingUp, Stunned и Dead
/// никогда не перемещаются. Останавливается внутри strike_distance.
pub fn enemy_move(
    mut enemies: Query<(
        &mut Transform,
        &mut Facing,
        &MoveSpeed,
        &CombatState,
        &PursuitTarget,
    )>,
    targets: Query<&Transform, Without<PursuitTarget>>,
    tuning: Res<SimTuning>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();

    for (mut transform, mut facing, speed, state, pursuit) in enemies.iter_mut() {
        match state {
            CombatState::Approaching | CombatState::Recovering => {}
            _ => continue,
        }
        let Ok(target_transform) = targets.get(pursuit.0) else {
            // Цель исчезла (умерла без linger) — стоим
            continue;
        };

        let to_target =
            target_transform.translation.truncate() - transform.translation.truncate();
        facing.turn_towards(to_target.x);

        if to_target.length() <= tuning.strike_distance {
            continue;
        }

        let step = to_target.normalize_or_zero() * speed.0 * dt;
        transform.translation += step.extend(0.0);
    }
}
