//! Damage application и уведомления здоровья
//!
//! Единственная точка мутации здоровья — `Health::apply_damage`; этот
//! модуль оборачивает её в события с фиксированным порядком доставки
//! внутри тика: DamageTaken → HealthChanged → ActorDied.

use bevy::prelude::*;

use crate::combat::sequence::ActionSlot;
use crate::combat::state::{enter_dead, enter_stunned, CombatState, CombatStateChanged};
use crate::components::{DamageOutcome, Health, LingerOnDeath};
use crate::config::SimTuning;

/// Запрос урона извне боевого ядра (ловушки, скрипты, тесты).
///
/// Отрицательный amount — clamp к нулю, не ошибка.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    pub source: Option<Entity>,
}

/// Уведомление: актор получил удар (всегда первое, даже при летальном
/// уроне и при нулевом amount).
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageTaken {
    pub target: Entity,
    pub source: Option<Entity>,
    /// Запрошенный урон до clamp к текущему здоровью
    pub amount: u32,
}

/// Уведомление: новое значение здоровья (для health-бара)
#[derive(Event, Debug, Clone, Copy)]
pub struct HealthChanged {
    pub target: Entity,
    pub current: u32,
    pub max: u32,
}

/// Уведомление: актор умер. Ровно один раз за жизнь актора —
/// на применении урона, которое довело здоровье до нуля.
#[derive(Event, Debug, Clone, Copy)]
pub struct ActorDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Применяет урон и рассылает уведомления в каноническом порядке.
///
/// Урон по мертвому актору — полный no-op без уведомлений.
pub(crate) fn deal_damage(
    target: Entity,
    source: Option<Entity>,
    amount: u32,
    health: &mut Health,
    damaged: &mut EventWriter<DamageTaken>,
    changed: &mut EventWriter<HealthChanged>,
    died: &mut EventWriter<ActorDied>,
) -> DamageOutcome {
    let outcome = health.apply_damage(amount);
    if outcome.ignored {
        return outcome;
    }

    damaged.write(DamageTaken {
        target,
        source,
        amount,
    });
    changed.write(HealthChanged {
        target,
        current: health.current(),
        max: health.max(),
    });

    crate::logger::log(&format!(
        "{:?} health = {}/{}",
        target,
        health.current(),
        health.max()
    ));

    if outcome.died {
        died.write(ActorDied {
            entity: target,
            killer: source,
        });
        crate::logger::log_info(&format!("💀 {:?} killed by {:?}", target, source));
    }

    outcome
}

/// Система: применяет внешние DamageRequest.
///
/// Реакция жертвы (stun или смерть) выполняется здесь же, до того как
/// остальная часть тика увидит её состояние.
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut actors: Query<(
        &mut Health,
        &mut CombatState,
        &mut ActionSlot,
        Option<&LingerOnDeath>,
    )>,
    tuning: Res<SimTuning>,
    mut commands: Commands,
    mut damaged: EventWriter<DamageTaken>,
    mut changed: EventWriter<HealthChanged>,
    mut died: EventWriter<ActorDied>,
    mut state_events: EventWriter<CombatStateChanged>,
) {
    for request in requests.read() {
        let Ok((mut health, mut state, mut slot, linger)) = actors.get_mut(request.target)
        else {
            continue;
        };

        let amount = request.amount.max(0) as u32;
        let outcome = deal_damage(
            request.target,
            request.source,
            amount,
            &mut health,
            &mut damaged,
            &mut changed,
            &mut died,
        );
        if outcome.ignored {
            continue;
        }

        if outcome.died {
            enter_dead(
                request.target,
                &mut state,
                &mut slot,
                linger,
                &mut commands,
                &mut state_events,
            );
        } else {
            enter_stunned(
                request.target,
                &mut state,
                &mut slot,
                &tuning,
                &mut state_events,
            );
        }
    }
}
