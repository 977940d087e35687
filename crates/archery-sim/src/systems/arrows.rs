//! Arrow systems: spawning from fire decisions, straight-line flight and
//! overlap checks against the shooter's own target.

use hecs::{Entity, World};

use archery_core::components::{Arrow, Position, Target, Velocity};
use archery_core::enums::Side;
use archery_core::events::DuelEvent;

use crate::world_setup;

/// Spawn an arrow for every `FireDecision` in `events`.
pub fn spawn_from_events(world: &mut World, events: &[DuelEvent]) -> usize {
    let mut spawned = 0;
    for event in events {
        if let DuelEvent::FireDecision {
            side,
            spawn,
            velocity,
            ..
        } = event
        {
            world_setup::spawn_arrow(world, *side, *spawn, *velocity);
            spawned += 1;
        }
    }
    spawned
}

/// Move arrows, then collect hits. An arrow scores at most once and is
/// removed on impact.
pub fn run(world: &mut World, dt: f64, hits: &mut Vec<Side>, despawn_buffer: &mut Vec<Entity>) {
    for (_entity, (arrow, pos, vel)) in world.query_mut::<(&mut Arrow, &mut Position, &Velocity)>() {
        pos.0 += vel.0 * dt;
        arrow.age_secs += dt;
    }

    let targets: Vec<(Side, Position, Target)> = world
        .query::<(&Target, &Position)>()
        .iter()
        .map(|(_, (target, pos))| (target.side, *pos, *target))
        .collect();

    despawn_buffer.clear();
    for (entity, (arrow, pos)) in world.query::<(&Arrow, &Position)>().iter() {
        let struck = targets.iter().any(|(side, target_pos, target)| {
            *side == arrow.side && overlaps(pos, target_pos, target)
        });
        if struck {
            hits.push(arrow.side);
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

/// Arrow tip inside the target's axis-aligned box.
pub fn overlaps(arrow: &Position, target_pos: &Position, target: &Target) -> bool {
    let d = (arrow.0 - target_pos.0).abs();
    d.x <= target.half_extents.x && d.y <= target.half_extents.y
}
