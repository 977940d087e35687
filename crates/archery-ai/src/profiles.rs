//! Difficulty-specific targeting profiles.
//!
//! Consolidates every tunable of the shot heuristic into one structure per
//! difficulty. Profiles can be overridden from JSON.

use serde::{Deserialize, Serialize};

use archery_core::config::{check_non_negative, check_positive, ConfigError};
use archery_core::enums::Difficulty;
use archery_core::types::SecondsRange;

/// Tuning for one difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingProfile {
    /// Max height gap considered lined up.
    pub align_tolerance: f64,
    /// Only take aligned shots when the bow is at or below the target.
    pub require_below_target: bool,
    /// Slack allowed above the target when `require_below_target` is set.
    pub below_epsilon: f64,
    /// Loose window that always fires, None to disable.
    pub forced_window: Option<f64>,
    /// Max height gap for a converging-motion shot.
    pub converging_range: f64,
    /// No shot is considered at or beyond this height gap.
    pub max_engage_distance: f64,
    /// Lookahead used to project the target height (seconds).
    pub prediction_time_secs: f64,
    /// Multiplier on `align_tolerance` for the predictive check.
    pub predictive_tolerance_scale: f64,
    /// Within `align_tolerance * near_window_multiplier` the shooter re-evaluates every tick.
    pub near_window_multiplier: f64,
    /// Re-check delay when the target is far out of line (seconds).
    pub recheck_interval_secs: f64,
    /// Draw time between a decision and the release (seconds).
    pub hold_duration_secs: f64,
    /// Randomized gap after each release (seconds).
    pub cooldown_secs: SecondsRange,
    /// Launch speed multiplier.
    pub force_multiplier: f64,
    /// Strength of the velocity-proportional aim correction.
    pub correction_strength: f64,
    /// Clamp on the aim correction magnitude.
    pub max_correction: f64,
}

impl TargetingProfile {
    /// Parse and validate a profile from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let profile: TargetingProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("align_tolerance", self.align_tolerance)?;
        check_non_negative("below_epsilon", self.below_epsilon)?;
        if let Some(window) = self.forced_window {
            check_non_negative("forced_window", window)?;
        }
        check_non_negative("converging_range", self.converging_range)?;
        check_positive("max_engage_distance", self.max_engage_distance)?;
        check_non_negative("prediction_time_secs", self.prediction_time_secs)?;
        check_non_negative("predictive_tolerance_scale", self.predictive_tolerance_scale)?;
        check_non_negative("near_window_multiplier", self.near_window_multiplier)?;
        check_non_negative("recheck_interval_secs", self.recheck_interval_secs)?;
        check_non_negative("hold_duration_secs", self.hold_duration_secs)?;
        if !self.cooldown_secs.is_valid() {
            return Err(ConfigError::Invalid {
                field: "cooldown_secs",
                reason: "min must be non-negative and not above max",
            });
        }
        check_positive("force_multiplier", self.force_multiplier)?;
        check_non_negative("correction_strength", self.correction_strength)?;
        check_non_negative("max_correction", self.max_correction)?;
        Ok(())
    }
}

/// Validate `profile` as the tuning of a `difficulty` shooter.
///
/// The forced window is a Hard behaviour; Easy profiles must leave it unset.
pub fn validate_for(profile: &TargetingProfile, difficulty: Difficulty) -> Result<(), ConfigError> {
    profile.validate()?;
    if difficulty == Difficulty::Easy && profile.forced_window.is_some() {
        return Err(ConfigError::Invalid {
            field: "forced_window",
            reason: "only Hard profiles may set a forced window",
        });
    }
    Ok(())
}

/// Get the default targeting profile for a difficulty.
pub fn get_profile(difficulty: Difficulty) -> TargetingProfile {
    match difficulty {
        Difficulty::Easy => TargetingProfile {
            align_tolerance: 0.6,
            require_below_target: true,
            below_epsilon: 0.3,
            forced_window: None,
            converging_range: 1.0,
            max_engage_distance: 3.0,
            prediction_time_secs: 0.1,
            predictive_tolerance_scale: 0.9,
            near_window_multiplier: 2.0,
            recheck_interval_secs: 0.2,
            hold_duration_secs: 0.5,
            cooldown_secs: SecondsRange::new(2.0, 3.0),
            force_multiplier: 1.0,
            correction_strength: 0.72,
            max_correction: 0.5,
        },
        Difficulty::Hard => TargetingProfile {
            align_tolerance: 1.0,
            require_below_target: false,
            below_epsilon: 0.8,
            forced_window: Some(1.2),
            converging_range: 1.5,
            max_engage_distance: 3.0,
            prediction_time_secs: 0.2,
            predictive_tolerance_scale: 1.2,
            near_window_multiplier: 2.0,
            recheck_interval_secs: 0.05,
            hold_duration_secs: 0.3,
            cooldown_secs: SecondsRange::new(0.3, 0.6),
            force_multiplier: 1.2,
            correction_strength: 1.2,
            max_correction: 0.5,
        },
    }
}
