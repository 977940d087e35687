//! Entity spawn factories for the arena harness.
//!
//! Creates one bow and one target per side, each on a vertical sweep.

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use archery_ai::ShooterRig;
use archery_core::components::*;
use archery_core::constants::*;
use archery_core::enums::Side;

/// Spawn both sides' bows and targets.
pub fn setup_arena(world: &mut World, rng: &mut ChaCha8Rng) {
    for side in [Side::Red, Side::Blue] {
        spawn_bow(world, rng, side);
        spawn_target(world, rng, side);
    }
}

/// Bow x position for a side.
pub fn bow_x(side: Side) -> f64 {
    match side {
        Side::Red => RED_BOW_X,
        Side::Blue => BLUE_BOW_X,
    }
}

/// Launch direction for a side: red shoots right, blue shoots left.
pub fn facing(side: Side) -> DVec2 {
    match side {
        Side::Red => DVec2::X,
        Side::Blue => DVec2::NEG_X,
    }
}

/// X coordinate arrows of a side spawn at.
pub fn shoot_point_x(side: Side) -> f64 {
    bow_x(side) + facing(side).x * SHOOT_POINT_OFFSET_X
}

/// Launch geometry for an AI shooter controlling `side`.
pub fn shooter_rig(side: Side) -> ShooterRig {
    ShooterRig {
        side,
        shoot_point_x: shoot_point_x(side),
        shoot_offset_y: 0.0,
        facing: facing(side),
        base_force: ARROW_BASE_FORCE,
    }
}

pub fn spawn_bow(world: &mut World, rng: &mut ChaCha8Rng, side: Side) -> hecs::Entity {
    let sweep = random_sweep(rng, BOW_MOVE_RANGE);
    world.spawn((
        Bow {
            side,
            facing: facing(side),
        },
        Position(DVec2::new(bow_x(side), sweep_height(&sweep))),
        sweep,
    ))
}

pub fn spawn_target(world: &mut World, rng: &mut ChaCha8Rng, side: Side) -> hecs::Entity {
    let x = match side {
        Side::Red => RED_TARGET_X,
        Side::Blue => BLUE_TARGET_X,
    };
    let (half_w, half_h) = TARGET_HALF_EXTENTS;
    let sweep = random_sweep(rng, TARGET_MOVE_RANGE);
    world.spawn((
        Target {
            side,
            half_extents: DVec2::new(half_w, half_h),
        },
        Position(DVec2::new(x, sweep_height(&sweep))),
        sweep,
    ))
}

/// Spawn an arrow in flight.
pub fn spawn_arrow(world: &mut World, side: Side, spawn: DVec2, velocity: DVec2) -> hecs::Entity {
    world.spawn((
        Arrow {
            side,
            age_secs: 0.0,
        },
        Position(spawn),
        Velocity(velocity),
    ))
}

fn random_sweep(rng: &mut ChaCha8Rng, range: f64) -> Sweep {
    Sweep {
        anchor_y: 0.0,
        range,
        speed: rng.gen_range(MOVE_SPEED_MIN..=MOVE_SPEED_MAX),
        phase: rng.gen_range(0.0..std::f64::consts::TAU),
        speed_timer_secs: SPEED_CHANGE_INTERVAL_SECS,
    }
}

/// Current height of a body on `sweep`.
pub fn sweep_height(sweep: &Sweep) -> f64 {
    sweep.anchor_y + sweep.range * sweep.phase.sin()
}
