//! Match configuration: tunable timings loaded from JSON or defaults.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Timing and scoring rules for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Length of the active phase in seconds.
    pub duration_secs: f64,
    /// Spacing between countdown beats.
    pub countdown_beat_secs: f64,
    /// Delay between showing the result and reporting it.
    pub result_report_delay_secs: f64,
    /// Delay before reporting a forfeit.
    pub forfeit_report_delay_secs: f64,
    /// Time allowed for the platform to acknowledge a submission.
    pub submit_timeout_secs: f64,
    /// First side to reach this many hits wins immediately.
    pub score_limit: Option<u32>,
    /// Anchor the match clock to a shared wall-clock deadline.
    pub networked: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            duration_secs: MATCH_DURATION_SECS,
            countdown_beat_secs: COUNTDOWN_BEAT_SECS,
            result_report_delay_secs: RESULT_REPORT_DELAY_SECS,
            forfeit_report_delay_secs: FORFEIT_REPORT_DELAY_SECS,
            submit_timeout_secs: SUBMIT_TIMEOUT_SECS,
            score_limit: None,
            networked: false,
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("duration_secs", self.duration_secs)?;
        check_non_negative("countdown_beat_secs", self.countdown_beat_secs)?;
        check_non_negative("result_report_delay_secs", self.result_report_delay_secs)?;
        check_non_negative("forfeit_report_delay_secs", self.forfeit_report_delay_secs)?;
        check_positive("submit_timeout_secs", self.submit_timeout_secs)?;
        if self.score_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "score_limit",
                reason: "must be at least 1 when set",
            });
        }
        Ok(())
    }
}

/// Reject NaN, infinite and non-positive values.
pub fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be a finite positive number",
        });
    }
    Ok(())
}

/// Reject NaN, infinite and negative values.
pub fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be a finite non-negative number",
        });
    }
    Ok(())
}
