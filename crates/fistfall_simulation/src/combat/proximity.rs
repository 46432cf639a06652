//! Strike-range tracking.
//!
//! Each AI actor caches one boolean ("an opponent is inside my range
//! volume") plus the entity id of that opponent. The id is a weak
//! reference: it is only ever used for lookups and is cleared when the
//! opponent leaves the volume or dies.

use bevy::prelude::*;

use crate::combat::health::ActorDied;
use crate::components::{Actor, Health};
use crate::spatial::RangeEvent;

/// Cached "opponent in strike range" state.
///
/// Fields are private so both are always written together: no observer
/// can ever see `in_range == true` with a stale or missing lock.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct StrikeRangeTracker {
    in_range: bool,
    tracked: Option<Entity>,
}

impl StrikeRangeTracker {
    pub fn in_range(&self) -> bool {
        self.in_range
    }

    /// The locked opponent, if any. Lookup may fail — never treat this
    /// as ownership.
    pub fn tracked(&self) -> Option<Entity> {
        self.tracked
    }

    pub(crate) fn claim(&mut self, opponent: Entity) {
        self.in_range = true;
        self.tracked = Some(opponent);
    }

    pub(crate) fn clear(&mut self) {
        self.in_range = false;
        self.tracked = None;
    }
}

/// System: update trackers from range volume enter/exit transitions.
///
/// Enter claims the visitor only when it belongs to the opposing faction
/// and carries a `Health`; a still-valid existing lock wins over any new
/// visitor (first-claimed-wins), so a second target grazing the volume
/// never steals an attacker's lock. Exit clears only when the leaving
/// entity is the tracked one.
pub fn track_range_events(
    mut events: EventReader<RangeEvent>,
    mut trackers: Query<(&Actor, &mut StrikeRangeTracker)>,
    visitors: Query<(&Actor, &Health)>,
) {
    for event in events.read() {
        match *event {
            RangeEvent::Entered {
                volume_owner,
                visitor,
            } => {
                let Ok((owner_actor, mut tracker)) = trackers.get_mut(volume_owner) else {
                    continue;
                };
                let Ok((visitor_actor, _)) = visitors.get(visitor) else {
                    // No vitality — not a combat body
                    continue;
                };
                if !owner_actor.faction.opposes(visitor_actor.faction) {
                    continue;
                }

                let lock_still_valid = tracker.in_range()
                    && tracker
                        .tracked()
                        .and_then(|t| visitors.get(t).ok())
                        .map(|(_, health)| health.is_alive())
                        .unwrap_or(false);
                if lock_still_valid {
                    continue;
                }

                tracker.claim(visitor);
                crate::logger::log(&format!(
                    "{:?} entered strike range of {:?}",
                    visitor, volume_owner
                ));
            }
            RangeEvent::Exited {
                volume_owner,
                visitor,
            } => {
                let Ok((_, mut tracker)) = trackers.get_mut(volume_owner) else {
                    continue;
                };
                if tracker.tracked() != Some(visitor) {
                    continue;
                }
                tracker.clear();
                crate::logger::log(&format!(
                    "{:?} left strike range of {:?}",
                    visitor, volume_owner
                ));
            }
        }
    }
}

/// System: drop every lock that points at an actor that died this tick.
///
/// Runs after damage application so no tracker references a dead actor
/// past the tick of its death.
pub fn clear_stale_tracker_locks(
    mut deaths: EventReader<ActorDied>,
    mut trackers: Query<&mut StrikeRangeTracker>,
) {
    for death in deaths.read() {
        for mut tracker in trackers.iter_mut() {
            if tracker.tracked() == Some(death.entity) {
                tracker.clear();
            }
        }
    }
}
