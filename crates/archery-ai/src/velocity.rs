//! Target velocity estimation.

use archery_core::constants::VELOCITY_SAMPLE_INTERVAL_SECS;

/// Finite-difference vertical velocity, re-sampled at a minimum interval so
/// tiny frame deltas never end up in the denominator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityEstimator {
    interval_secs: f64,
    last_y: Option<f64>,
    last_time: f64,
    velocity_y: f64,
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new(VELOCITY_SAMPLE_INTERVAL_SECS)
    }
}

impl VelocityEstimator {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            last_y: None,
            last_time: 0.0,
            velocity_y: 0.0,
        }
    }

    /// Feed a sample. Returns true when the estimate was refreshed.
    pub fn update(&mut self, now: f64, y: f64) -> bool {
        let Some(last_y) = self.last_y else {
            self.last_y = Some(y);
            self.last_time = now;
            return false;
        };

        let elapsed = now - self.last_time;
        // Clock stalled or went backwards.
        if elapsed <= 0.0 {
            return false;
        }
        if elapsed < self.interval_secs {
            return false;
        }

        self.velocity_y = (y - last_y) / elapsed;
        self.last_y = Some(y);
        self.last_time = now;
        true
    }

    pub fn velocity_y(&self) -> f64 {
        self.velocity_y
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.interval_secs);
    }
}
