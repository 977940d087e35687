//! Events emitted by the duel for presentation, physics and the platform.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Outbound notifications produced during a tick, drained into the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DuelEvent {
    /// Shooter started its draw (hold animation and pull sound).
    BeginDraw { side: Side, trigger: FireTrigger },
    /// Shooter finished its draw.
    EndDraw { side: Side },
    /// Arrow released; consumed by whoever spawns projectiles.
    FireDecision {
        side: Side,
        spawn: DVec2,
        velocity: DVec2,
        force_multiplier: f64,
    },
    /// A side's score changed.
    ScoreChanged { side: Side, value: u32 },
    /// Match phase changed.
    PhaseChanged { phase: MatchPhase },
    /// One countdown beat should be presented.
    CountdownBeat { beat: CountdownBeat },
    /// Result popup should be shown.
    ShowResult {
        outcome: Outcome,
        local_score: u32,
        opponent_score: u32,
    },
    /// Final result handed to the platform channel. Emitted once per match.
    MatchResult {
        outcome: Outcome,
        local_score: u32,
        opponent_score: u32,
    },
    /// Networked session should disconnect. Always after `MatchResult`.
    SessionTeardown,
}

/// Result payload forwarded to the external platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub match_id: String,
    pub player_id: String,
    pub opponent_id: String,
    pub outcome: Outcome,
    pub score: u32,
    pub opponent_score: u32,
    /// Not measured; the platform expects the field and it is always 0.
    #[serde(default)]
    pub average_ping: u32,
    pub region: String,
}

/// Abort notice forwarded to the external platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAbort {
    pub message: String,
    pub error: String,
    pub code: AbortCode,
}

impl MatchAbort {
    pub fn new(code: AbortCode, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let message = match code {
            AbortCode::GameStartFailure => format!("Game failed to start: {detail}"),
            AbortCode::PlayerDisconnect => format!("Player {detail} disconnected"),
            AbortCode::ConnectionError => format!("Connection error: {detail}"),
            AbortCode::InitializationError => format!("Initialization failed: {detail}"),
            AbortCode::CriticalError => format!("Critical error: {detail}"),
        };
        let error = match code {
            AbortCode::PlayerDisconnect => "Player disconnected".to_string(),
            _ => detail,
        };
        Self {
            message,
            error,
            code,
        }
    }
}
