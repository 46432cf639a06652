//! Melee strike resolution.
//!
//! A strike samples the world exactly once, at the instant its wind-up
//! wait elapses: compute the facing-dependent hit volume, pick at most one
//! valid opponent inside it, apply one damage application. Overlapping a
//! target across several ticks never multiplies damage because the
//! sequence emits `ResolveStrike` exactly once per swing.
//!
//! Strikes are resolved one at a time in stable entity order, and each
//! victim's hurt/death reaction is applied before the next strike is
//! looked at — an actor stunned by an earlier strike in the same tick
//! never gets to resolve its own pending swing.

use bevy::math::bounding::{Aabb2d, IntersectsVolume};
use bevy::prelude::*;

use crate::combat::health::{deal_damage, ActorDied, DamageTaken, HealthChanged};
use crate::combat::proximity::StrikeRangeTracker;
use crate::combat::sequence::{ActionSlot, SequenceFired, SequenceSignal};
use crate::combat::state::{enter_dead, enter_stunned, set_state, CombatState, CombatStateChanged};
use crate::components::{Actor, Facing, Health, HitVolume, LingerOnDeath, Striker};
use crate::config::SimTuning;
use crate::spatial::BodyExtent;

/// Event: an actor committed to an attack (wind-up started). Presentation
/// hook for the punch animation.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeCommitted {
    pub attacker: Entity,
}

/// The hit volume for one strike attempt: offset flips with facing,
/// magnitude is fixed configuration. Computed once per attempt.
pub fn strike_volume(position: Vec2, facing: f32, hit_volume: &HitVolume) -> Aabb2d {
    let center = position + Vec2::new(facing.signum() * hit_volume.forward_offset, 0.0);
    Aabb2d::new(center, hit_volume.half_extents)
}

/// Deterministic target choice among overlapping bodies: nearest by
/// horizontal distance, entity index breaks exact ties.
fn better_candidate(candidate: (Entity, f32), best: Option<(Entity, f32)>) -> bool {
    match best {
        None => true,
        Some((best_entity, best_dx)) => {
            candidate.1 < best_dx
                || (candidate.1 == best_dx && candidate.0.index() < best_entity.index())
        }
    }
}

type StrikeActorQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Actor,
        &'static Transform,
        &'static Facing,
        Option<&'static Striker>,
        Option<&'static HitVolume>,
        Option<&'static BodyExtent>,
        &'static mut Health,
        &'static mut CombatState,
        &'static mut ActionSlot,
        Option<&'static LingerOnDeath>,
    ),
>;

/// System: resolve every `ResolveStrike` signal fired this tick.
pub fn resolve_strikes(
    mut fired: EventReader<SequenceFired>,
    mut actors: StrikeActorQuery,
    trackers: Query<&StrikeRangeTracker>,
    tuning: Res<SimTuning>,
    mut commands: Commands,
    mut damaged: EventWriter<DamageTaken>,
    mut changed: EventWriter<HealthChanged>,
    mut died: EventWriter<ActorDied>,
    mut state_events: EventWriter<CombatStateChanged>,
) {
    for event in fired.read() {
        if event.signal != SequenceSignal::ResolveStrike {
            continue;
        }
        let attacker = event.entity;

        // Snapshot the attacker; copy everything out so the borrow ends
        // before the mutable victim access below.
        let (attacker_pos, facing_sign, faction, striker, hit_volume) = {
            let Ok((_, actor, transform, facing, striker, hit_volume, _, _, state, _, _)) =
                actors.get(attacker)
            else {
                continue;
            };
            // A stun or death that landed earlier this tick wins over the
            // stale signal.
            if *state != CombatState::WindingUp {
                continue;
            }
            let Some(striker) = striker.copied() else {
                continue;
            };
            (
                transform.translation.truncate(),
                facing.0,
                actor.faction,
                striker,
                hit_volume.copied(),
            )
        };

        let target = select_target(
            attacker,
            attacker_pos,
            facing_sign,
            faction,
            &striker,
            hit_volume,
            &actors,
            &trackers,
            &tuning,
        );

        if let Some(victim) = target {
            if let Ok((_, _, _, _, _, _, _, mut health, mut state, mut slot, linger)) =
                actors.get_mut(victim)
            {
                let outcome = deal_damage(
                    victim,
                    Some(attacker),
                    striker.damage,
                    &mut health,
                    &mut damaged,
                    &mut changed,
                    &mut died,
                );
                if !outcome.ignored {
                    crate::logger::log_info(&format!(
                        "⚔️ {:?} struck {:?} for {}",
                        attacker, victim, striker.damage
                    ));
                    if outcome.died {
                        enter_dead(
                            victim,
                            &mut state,
                            &mut slot,
                            linger,
                            &mut commands,
                            &mut state_events,
                        );
                    } else {
                        enter_stunned(victim, &mut state, &mut slot, &tuning, &mut state_events);
                    }
                }
            }
        }

        // Wind-up is over either way; the cooldown wait is already
        // running in the attacker's slot.
        if let Ok((_, _, _, _, _, _, _, _, mut state, _, _)) = actors.get_mut(attacker) {
            set_state(attacker, &mut state, CombatState::Recovering, &mut state_events);
        }
    }
}

/// Picks at most one victim for a strike attempt, re-validating
/// everything at the instant of the call.
#[allow(clippy::too_many_arguments)]
fn select_target(
    attacker: Entity,
    attacker_pos: Vec2,
    facing_sign: f32,
    faction: crate::components::Faction,
    striker: &Striker,
    hit_volume: Option<HitVolume>,
    actors: &StrikeActorQuery,
    trackers: &Query<&StrikeRangeTracker>,
    tuning: &SimTuning,
) -> Option<Entity> {
    // Configuration fault: strikes without a hit volume degrade into a
    // logged no-op, the simulation keeps running.
    let Some(hit_volume) = hit_volume else {
        crate::logger::log_warning(&format!(
            "{:?} has no hit volume configured; strike skipped",
            attacker
        ));
        return None;
    };

    // AI variant: the range volume is the authority, the distance gate is
    // the tighter secondary check — both re-validated now, not at wind-up
    // start.
    if let Some(gate) = striker.strike_gate {
        let tracker = trackers.get(attacker).ok()?;
        if !tracker.in_range() {
            return None;
        }
        let locked = tracker.tracked()?;
        let (_, _, locked_transform, _, _, _, _, locked_health, _, _, _) =
            actors.get(locked).ok()?;
        if !locked_health.is_alive() {
            return None;
        }
        let dx = (locked_transform.translation.x - attacker_pos.x).abs();
        if dx > gate + tuning.strike_grace {
            return None;
        }
    }

    let volume = strike_volume(attacker_pos, facing_sign, &hit_volume);

    let mut best: Option<(Entity, f32)> = None;
    for (entity, actor, transform, _, _, _, body, health, state, _, _) in actors.iter() {
        if entity == attacker {
            continue;
        }
        if !faction.opposes(actor.faction) {
            continue;
        }
        // No body extent — corpse or non-solid, never a strike target
        let Some(body) = body else {
            continue;
        };
        // Target may have died between wind-up and resolution
        if !health.is_alive() || *state == CombatState::Dead {
            continue;
        }

        let position = transform.translation.truncate();
        if !volume.intersects(&body.aabb(position)) {
            continue;
        }

        let dx = (position.x - attacker_pos.x).abs();
        if better_candidate((entity, dx), best) {
            best = Some((entity, dx));
        }
    }

    best.map(|(entity, _)| entity)
}
