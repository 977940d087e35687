//! Ports the core consumes from its collaborators.
//!
//! Positions, clocks and the result reporting channel are injected rather than
//! reached through globals. Implementations live with whoever owns the data:
//! the arena harness, the engine, or the embedding platform.

use crate::events::{MatchAbort, MatchReport};

/// Per-tick vertical position sampling for one shooter.
///
/// `None` means the reference is currently unavailable.
pub trait PositionSource {
    fn bow_y(&self) -> Option<f64>;
    fn target_y(&self) -> Option<f64>;
}

/// Monotonic simulation clock in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Shared wall clock used to anchor networked match deadlines.
pub trait WallClock {
    fn now_unix_secs(&self) -> f64;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now_unix_secs(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Errors a reporting channel can surface. Never fatal to the match flow.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("reporting channel unavailable: {0}")]
    Unavailable(String),

    #[error("match parameters not set")]
    MissingParams,

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// External platform channel for match results and aborts.
pub trait ResultReporter {
    fn report_result(&mut self, report: &MatchReport) -> Result<(), ReportError>;
    fn report_abort(&mut self, abort: &MatchAbort) -> Result<(), ReportError>;
}
