//! Match data model: scores, phase, clock and the report bookkeeping.
//!
//! Owned by `MatchStateMachine`, NOT stored as ECS entities.

use archery_core::enums::{EndReason, MatchPhase, Outcome, Side};
use archery_core::state::MatchReplica;
use archery_core::types::Countdown;

/// Shared state of one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub red_score: u32,
    pub blue_score: u32,
    pub phase: MatchPhase,
    /// Seconds left in the active phase, never negative.
    pub remaining_time_secs: f64,
    /// Set exactly once when the match ends.
    pub outcome: Outcome,
    pub end_reason: Option<EndReason>,
    /// Guards `end_match` separately from `phase`, which observers overwrite.
    pub ended: bool,
    /// Guards duplicate result reporting.
    pub result_reported: bool,
    /// Absolute wall-clock deadline of a networked match.
    pub end_at_unix_secs: Option<f64>,
}

impl MatchState {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            red_score: 0,
            blue_score: 0,
            phase: MatchPhase::Countdown,
            remaining_time_secs: duration_secs,
            outcome: Outcome::Undetermined,
            end_reason: None,
            ended: false,
            result_reported: false,
            end_at_unix_secs: None,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Red => self.red_score,
            Side::Blue => self.blue_score,
        }
    }

    pub(crate) fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Red => &mut self.red_score,
            Side::Blue => &mut self.blue_score,
        }
    }

    pub fn replica(&self) -> MatchReplica {
        MatchReplica {
            red_score: self.red_score,
            blue_score: self.blue_score,
            phase: self.phase,
            remaining_time_secs: self.remaining_time_secs,
            end_at_unix_secs: self.end_at_unix_secs,
            end_reason: self.end_reason,
        }
    }
}

/// Progress through the 3-2-1-Go sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountdownProgress {
    /// Index into `CountdownBeat::SEQUENCE` of the last beat emitted.
    pub beat_index: usize,
    /// Seconds since the last beat.
    pub since_beat_secs: f64,
}

/// A result report waiting for its presentation delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingReport {
    pub outcome: Outcome,
    pub local_score: u32,
    pub opponent_score: u32,
    pub delay: Countdown,
    /// Emit `SessionTeardown` right after the report.
    pub teardown: bool,
}

/// Ordering used to keep phase monotonic when applying replicas.
pub fn phase_rank(phase: MatchPhase) -> u8 {
    match phase {
        MatchPhase::Countdown => 0,
        MatchPhase::Active => 1,
        MatchPhase::Ended => 2,
    }
}
