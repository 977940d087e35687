//! Sweep motion: bows and targets oscillate vertically.
//!
//! Each body follows `anchor + range * sin(phase)`. Its linear speed is
//! re-rolled every `SPEED_CHANGE_INTERVAL_SECS` so the AI has to track a
//! target whose velocity changes.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use archery_core::components::{Position, Sweep};
use archery_core::constants::{MOVE_SPEED_MAX, MOVE_SPEED_MIN, SPEED_CHANGE_INTERVAL_SECS};

use crate::world_setup::sweep_height;

/// Advance every swept body by `dt` seconds.
pub fn run(world: &mut World, rng: &mut ChaCha8Rng, dt: f64) {
    for (_entity, (pos, sweep)) in world.query_mut::<(&mut Position, &mut Sweep)>() {
        sweep.speed_timer_secs -= dt;
        if sweep.speed_timer_secs <= 0.0 {
            sweep.speed = rng.gen_range(MOVE_SPEED_MIN..=MOVE_SPEED_MAX);
            sweep.speed_timer_secs += SPEED_CHANGE_INTERVAL_SECS;
        }

        if sweep.range > 0.0 {
            sweep.phase = (sweep.phase + sweep.speed / sweep.range * dt) % std::f64::consts::TAU;
        }
        pos.0.y = sweep_height(sweep);
    }
}
