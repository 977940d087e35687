//! Shot-decision heuristic.
//!
//! Pure functions that judge whether a bow is lined up with a moving target.
//! No state and no clock: callers pass the sampled heights and the current
//! velocity estimate.

use archery_core::constants::{CORRECTION_GAIN, MIN_CORRECTION_DISTANCE, MIN_CORRECTION_VELOCITY};
use archery_core::enums::FireTrigger;

use crate::profiles::TargetingProfile;

/// Input to the heuristic for a single tick.
#[derive(Debug, Clone, Copy)]
pub struct AimContext {
    pub bow_y: f64,
    pub target_y: f64,
    pub previous_bow_y: Option<f64>,
    pub previous_target_y: Option<f64>,
    /// Estimated vertical velocity of the target.
    pub target_velocity: f64,
}

impl AimContext {
    /// Vertical gap between bow and target.
    pub fn distance(&self) -> f64 {
        (self.bow_y - self.target_y).abs()
    }

    /// Bow motion since the previous tick (0 without a previous sample).
    pub fn bow_delta(&self) -> f64 {
        self.previous_bow_y.map_or(0.0, |prev| self.bow_y - prev)
    }

    /// Target motion since the previous tick (0 without a previous sample).
    pub fn target_delta(&self) -> f64 {
        self.previous_target_y.map_or(0.0, |prev| self.target_y - prev)
    }
}

/// Bow and target moving toward each other's height.
pub fn is_converging(bow_delta: f64, target_delta: f64) -> bool {
    (bow_delta < 0.0 && target_delta > 0.0) || (bow_delta > 0.0 && target_delta < 0.0)
}

/// Target height after `lookahead_secs` at constant velocity.
pub fn project_target_y(target_y: f64, target_velocity: f64, lookahead_secs: f64) -> f64 {
    target_y + target_velocity * lookahead_secs
}

/// Decide whether to fire this tick. Returns the branch that was satisfied.
pub fn evaluate(ctx: &AimContext, profile: &TargetingProfile) -> Option<FireTrigger> {
    let distance = ctx.distance();

    if !distance.is_finite() || distance >= profile.max_engage_distance {
        return None;
    }

    if is_converging(ctx.bow_delta(), ctx.target_delta()) && distance <= profile.converging_range
    {
        return Some(FireTrigger::Converging);
    }

    if distance <= profile.align_tolerance {
        let from_below =
            !profile.require_below_target || ctx.bow_y <= ctx.target_y + profile.below_epsilon;
        if from_below {
            return Some(FireTrigger::Aligned);
        }
    }

    if profile.forced_window.is_some_and(|window| distance <= window) {
        return Some(FireTrigger::Forced);
    }

    let projected = project_target_y(ctx.target_y, ctx.target_velocity, profile.prediction_time_secs);
    if (ctx.bow_y - projected).abs() <= profile.align_tolerance * profile.predictive_tolerance_scale
    {
        return Some(FireTrigger::Predictive);
    }

    None
}

/// Close enough to alignment that the shooter should re-check every tick.
pub fn is_near(distance: f64, profile: &TargetingProfile) -> bool {
    distance <= profile.align_tolerance * profile.near_window_multiplier
}

/// Vertical spawn offset that leads a moving target.
///
/// Proportional to the target velocity (opposite sign), clamped to
/// `max_correction`. Zero for a near-stationary target or an exact line-up.
pub fn aim_correction(
    bow_y: f64,
    target_y: f64,
    target_velocity: f64,
    profile: &TargetingProfile,
) -> f64 {
    if target_velocity.abs() <= MIN_CORRECTION_VELOCITY {
        return 0.0;
    }
    if (bow_y - target_y).abs() <= MIN_CORRECTION_DISTANCE {
        return 0.0;
    }
    let raw = -target_velocity * profile.correction_strength * CORRECTION_GAIN;
    raw.clamp(-profile.max_correction, profile.max_correction)
}
