//! ECS components for hecs entities in the arena harness.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::Side;

/// World-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// World-space velocity (units per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// A side's bow. Arrows spawn from its shoot point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bow {
    pub side: Side,
    /// Unit launch direction.
    pub facing: DVec2,
}

/// A scoring target. Arrows of the same side score on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Target {
    pub side: Side,
    pub half_extents: DVec2,
}

/// An arrow in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Arrow {
    pub side: Side,
    /// Seconds since release.
    pub age_secs: f64,
}

/// Vertical sinusoidal sweep with a periodically re-rolled speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sweep {
    /// Centre height of the sweep.
    pub anchor_y: f64,
    /// Amplitude.
    pub range: f64,
    /// Phase advance per second.
    pub speed: f64,
    /// Current phase (radians).
    pub phase: f64,
    /// Seconds until the next speed re-roll.
    pub speed_timer_secs: f64,
}
