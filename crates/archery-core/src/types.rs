//! Fundamental simulation types.

use serde::{Deserialize, Serialize};

use crate::ports::Clock;

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}

impl Clock for SimTime {
    fn now(&self) -> f64 {
        self.elapsed_secs
    }
}

/// Inclusive range of seconds, used for randomized intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: f64,
    pub max: f64,
}

impl SecondsRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Expected value of a uniform sample from this range.
    pub fn mean(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

/// Countdown timer advanced by tick deltas. Drift below `TIME_EPSILON` counts as expired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining_secs: f64,
}

impl Countdown {
    pub fn new(secs: f64) -> Self {
        Self {
            remaining_secs: secs.max(0.0),
        }
    }

    /// Advance by `dt`. Returns true once the timer has run out.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.remaining_secs -= dt;
        if self.remaining_secs <= crate::constants::TIME_EPSILON {
            self.remaining_secs = 0.0;
        }
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs <= 0.0
    }
}
