//! Командный вариант состояния Approaching (игрок).
//!
//! Внешний источник ввода пишет `PlayerCommand` каждый тик; ядро видит
//! только нормализованную пару (ось движения, команда атаки).

use bevy::prelude::*;

use crate::combat::sequence::{ActionSlot, ActiveSequence};
use crate::combat::state::{set_state, CombatState, CombatStateChanged};
use crate::combat::strike::StrikeCommitted;
use crate::components::{Facing, MoveSpeed, Striker};

/// Пер-тиковый ввод игрока (заполняется хостом)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerCommand {
    /// Горизонтальная ось движения, [-1, 1]
    pub move_axis: f32,
    /// Команда атаки в этом тике
    pub attack: bool,
}

/// Система: атака по команде. Дистанция не проверяется — игрок может
/// бить воздух; хитбокс решит, попал ли он.
pub fn player_decide(
    mut players: Query<(
        Entity,
        &PlayerCommand,
        &Striker,
        &mut CombatState,
        &mut ActionSlot,
    )>,
    mut committed: EventWriter<StrikeCommitted>,
    mut state_events: EventWriter<CombatStateChanged>,
) {
    for (entity, command, striker, mut state, mut slot) in players.iter_mut() {
        if !command.attack {
            continue;
        }
        if *state != CombatState::Approaching {
            continue;
        }

        if slot
            .begin(ActiveSequence::strike(
                striker.attack_delay,
                striker.attack_cooldown,
            ))
            .is_ok()
        {
            set_state(entity, &mut state, CombatState::WindingUp, &mut state_events);
            committed.write(StrikeCommitted { attacker: entity });
        }
    }
}

/// Система: движение игрока по оси ввода.
///
/// Заблокировано в WindingUp, Stunned и Dead.
pub fn player_move(
    mut players: Query<(
        &PlayerCommand,
        &mut Transform,
        &mut Facing,
        &MoveSpeed,
        &CombatState,
    )>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();

    for (command, mut transform, mut facing, speed, state) in players.iter_mut() {
        match state {
            CombatState::Approaching | CombatState::Recovering => {}
            _ => continue,
        }

        let axis = command.move_axis.clamp(-1.0, 1.0);
        if axis == 0.0 {
            continue;
        }
        facing.turn_towards(axis);
        transform.translation.x += axis * speed.0 * dt;
    }
}
