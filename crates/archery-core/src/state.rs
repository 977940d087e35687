//! Duel state snapshot: the complete visible state produced after each tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::DuelEvent;
use crate::types::SimTime;

/// Complete duel state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuelSnapshot {
    pub time: SimTime,
    pub phase: MatchPhase,
    pub score: ScoreView,
    pub remaining_time_secs: f64,
    pub outcome: Outcome,
    /// One entry per AI-controlled side.
    pub shooters: Vec<ShooterView>,
    pub bows: Vec<BodyView>,
    pub targets: Vec<BodyView>,
    pub arrows: Vec<BodyView>,
    pub events: Vec<DuelEvent>,
    /// Authoritative state to replicate to observers.
    pub replica: MatchReplica,
}

/// Running score for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub red: u32,
    pub blue: u32,
    pub local_side: Side,
}

/// AI shooter status for display and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShooterView {
    pub side: Side,
    pub difficulty: Difficulty,
    pub firing_state: FiringState,
    pub target_velocity: f64,
    pub shots_fired: u32,
}

/// A positioned body in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub side: Side,
    pub position: DVec2,
}

/// Shared match state published by the authority and applied by observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchReplica {
    pub red_score: u32,
    pub blue_score: u32,
    pub phase: MatchPhase,
    pub remaining_time_secs: f64,
    /// Absolute wall-clock deadline of a networked match.
    pub end_at_unix_secs: Option<f64>,
    pub end_reason: Option<EndReason>,
}
