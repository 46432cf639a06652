//! Spatial overlap layer (tactical layer for headless simulation).
//!
//! The combat core only consumes the contract defined here:
//! - `RangeEvent::Entered`/`Exited` transitions for sensor volumes
//! - AABB overlap sampling for strike resolution
//!
//! The sweep is a deterministic brute-force pass over all solid bodies,
//! ordered by entity index. A real client may replace it with its own
//! physics engine as long as it feeds the same events.

use bevy::math::bounding::{Aabb2d, IntersectsVolume};
use bevy::prelude::*;

/// Solid body extents (AABB half-size around the actor's Transform).
///
/// Removed on death: a corpse neither blocks strikes nor triggers volumes.
#[derive(Component, Debug, Clone, Copy)]
pub struct BodyExtent {
    pub half_extents: Vec2,
}

impl BodyExtent {
    pub fn aabb(&self, center: Vec2) -> Aabb2d {
        Aabb2d::new(center, self.half_extents)
    }
}

/// Sensor volume centered on its owner.
///
/// Tracks which bodies are currently inside so the sweep can emit
/// enter/exit transitions instead of raw overlap sets.
#[derive(Component, Debug, Clone)]
pub struct RangeVolume {
    pub half_extents: Vec2,
    overlapping: Vec<Entity>,
}

impl RangeVolume {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            half_extents,
            overlapping: Vec::new(),
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.overlapping.contains(&entity)
    }
}

/// Enter/exit transition for a sensor volume.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEvent {
    Entered { volume_owner: Entity, visitor: Entity },
    Exited { volume_owner: Entity, visitor: Entity },
}

/// System: sweep every `RangeVolume` against every solid body and emit
/// enter/exit transitions.
///
/// Exits are emitted even when the visitor no longer has a body (death,
/// despawn) — consumers identity-check the entity id, never dereference it.
pub fn sweep_range_volumes(
    mut volumes: Query<(Entity, &Transform, &mut RangeVolume)>,
    bodies: Query<(Entity, &Transform, &BodyExtent)>,
    mut events: EventWriter<RangeEvent>,
) {
    // Stable body order keeps event order reproducible across runs.
    let mut sorted_bodies: Vec<_> = bodies.iter().collect();
    sorted_bodies.sort_by_key(|(entity, _, _)| entity.index());

    let mut sorted_volumes: Vec<_> = volumes.iter_mut().collect();
    sorted_volumes.sort_by_key(|(entity, _, _)| entity.index());

    for (owner, transform, volume) in sorted_volumes.iter_mut() {
        let center = transform.translation.truncate();
        let sensor = Aabb2d::new(center, volume.half_extents);

        let mut now_inside = Vec::new();
        for (body_entity, body_transform, extent) in &sorted_bodies {
            if *body_entity == *owner {
                continue;
            }
            let body_aabb = extent.aabb(body_transform.translation.truncate());
            if sensor.intersects(&body_aabb) {
                now_inside.push(*body_entity);
            }
        }

        for visitor in &now_inside {
            if !volume.overlapping.contains(visitor) {
                events.write(RangeEvent::Entered {
                    volume_owner: *owner,
                    visitor: *visitor,
                });
            }
        }
        for visitor in &volume.overlapping {
            if !now_inside.contains(visitor) {
                events.write(RangeEvent::Exited {
                    volume_owner: *owner,
                    visitor: *visitor,
                });
            }
        }

        volume.overlapping = now_inside;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_aabbs_overlap_by_extents() {
        let a = BodyExtent {
            half_extents: Vec2::new(0.5, 1.0),
        };
        let b = BodyExtent {
            half_extents: Vec2::new(0.5, 1.0),
        };

        let near = a
            .aabb(Vec2::ZERO)
            .intersects(&b.aabb(Vec2::new(0.9, 0.0)));
        let far = a
            .aabb(Vec2::ZERO)
            .intersects(&b.aabb(Vec2::new(1.2, 0.0)));

        assert!(near);
        assert!(!far);
    }

    #[test]
    fn range_volume_starts_empty() {
        let volume = RangeVolume::new(Vec2::splat(2.0));
        assert!(!volume.contains(Entity::PLACEHOLDER));
    }
}
