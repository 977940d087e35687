//! Cleanup system: removes arrows that left the arena or outlived their lifetime.

use hecs::{Entity, World};

use archery_core::components::{Arrow, Position};
use archery_core::constants::{ARENA_HALF_WIDTH, ARROW_LIFETIME_SECS};

/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (arrow, pos)) in world.query_mut::<(&Arrow, &Position)>() {
        if arrow.age_secs >= ARROW_LIFETIME_SECS || pos.0.x.abs() > ARENA_HALF_WIDTH {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

/// Remove every arrow, e.g. when a match is reset.
pub fn clear_arrows(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    despawn_buffer.extend(world.query_mut::<&Arrow>().into_iter().map(|(entity, _)| entity));
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
