//! Combat state machine: shared states and transitions.
//!
//! One `CombatState` per actor; the Approaching drivers differ (AI chases,
//! the player follows commands — see `ai` and `player` modules) while the
//! hurt/death transitions here are symmetric for both.

use bevy::prelude::*;

use crate::combat::proximity::StrikeRangeTracker;
use crate::combat::sequence::{ActionSlot, ActiveSequence, SequenceFired, SequenceSignal};
use crate::components::LingerOnDeath;
use crate::config::SimTuning;
use crate::spatial::{BodyExtent, RangeVolume};

/// Combat states. Exactly one active per actor; `Dead` is terminal.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombatState {
    /// Closing the distance (AI) or following movement input (player).
    #[default]
    Approaching,
    /// Attack committed, strike not yet resolved.
    WindingUp,
    /// Post-strike cooldown; cannot start another attack.
    Recovering,
    /// Hurt-lock after taking damage.
    Stunned,
    /// Terminal; corpse may linger before despawn.
    Dead,
}

/// Event: state transition, for presentation (animation triggers, tint,
/// corpse fade) and tests. Emitted for every real transition, never for
/// same-state writes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStateChanged {
    pub entity: Entity,
    pub from: CombatState,
    pub to: CombatState,
}

pub(crate) fn set_state(
    entity: Entity,
    state: &mut CombatState,
    to: CombatState,
    events: &mut EventWriter<CombatStateChanged>,
) {
    let from = *state;
    if from == to {
        return;
    }
    *state = to;
    events.write(CombatStateChanged { entity, from, to });
}

/// Hurt reaction: cancel whatever timed action is running and hold the
/// actor in a fixed-length stun.
///
/// Damage received while already stunned does NOT restart the timer —
/// otherwise sustained hits would lock an actor forever.
pub(crate) fn enter_stunned(
    entity: Entity,
    state: &mut CombatState,
    slot: &mut ActionSlot,
    tuning: &SimTuning,
    events: &mut EventWriter<CombatStateChanged>,
) {
    match *state {
        CombatState::Dead | CombatState::Stunned => return,
        _ => {}
    }

    slot.cancel();
    // Slot was just cleared, begin cannot fail
    let _ = slot.begin(ActiveSequence::stun(tuning.stun_duration));
    set_state(entity, state, CombatState::Stunned, events);
}

/// Death reaction, entered exactly once:
/// - cancels all timed actions
/// - strips body/sensor components so no tracker or strike can target the
///   corpse
/// - either starts the wall-clock linger or removes the actor immediately
pub(crate) fn enter_dead(
    entity: Entity,
    state: &mut CombatState,
    slot: &mut ActionSlot,
    linger: Option<&LingerOnDeath>,
    commands: &mut Commands,
    events: &mut EventWriter<CombatStateChanged>,
) {
    if *state == CombatState::Dead {
        return;
    }

    slot.cancel();
    set_state(entity, state, CombatState::Dead, events);

    if let Ok(mut entity_commands) = commands.get_entity(entity) {
        entity_commands.remove::<(BodyExtent, RangeVolume, StrikeRangeTracker)>();
    }

    match linger {
        Some(linger) => {
            let _ = slot.begin(ActiveSequence::death_linger(linger.seconds));
        }
        None => {
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
    }
}

/// System: return actors to `Approaching` when their recovery or stun
/// wait elapses. Stale signals (the actor died or got re-routed in the
/// same tick) are dropped by the state guard.
pub fn apply_sequence_transitions(
    mut fired: EventReader<SequenceFired>,
    mut actors: Query<&mut CombatState>,
    mut state_events: EventWriter<CombatStateChanged>,
) {
    for event in fired.read() {
        let expected = match event.signal {
            SequenceSignal::EndRecovery => CombatState::Recovering,
            SequenceSignal::EndStun => CombatState::Stunned,
            _ => continue,
        };

        let Ok(mut state) = actors.get_mut(event.entity) else {
            continue;
        };
        if *state != expected {
            continue;
        }
        set_state(
            event.entity,
            &mut state,
            CombatState::Approaching,
            &mut state_events,
        );
    }
}

/// System: remove corpses whose wall-clock linger elapsed. Runs in
/// `Update` so an end-of-match freeze never strands a corpse.
pub fn despawn_after_linger(
    mut fired: EventReader<SequenceFired>,
    mut commands: Commands,
) {
    for event in fired.read() {
        if event.signal != SequenceSignal::Despawn {
            continue;
        }
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.despawn();
            crate::logger::log(&format!("Corpse removed: {:?}", event.entity));
        }
    }
}
