//! Commands sent to the duel engine from the host, input layer or transport.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::state::MatchReplica;

/// All actions the engine accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DuelCommand {
    // --- Match flow ---
    /// Begin the 3-2-1-Go countdown.
    StartCountdown,
    /// Local player forfeited.
    Forfeit,
    /// Opponent left or forfeited; the local side wins.
    OpponentForfeit,
    /// Return an ended match to its initial state.
    Reset,

    // --- Shooting ---
    /// Release an arrow from the given side's bow (human input).
    Shoot { side: Side },
    /// A hit confirmed by an external physics collaborator.
    TargetHit { side: Side },

    // --- Platform / transport ---
    /// The platform confirmed it received the submitted result.
    AcknowledgeSubmission,
    /// Authoritative state received from the match authority.
    ApplyReplica { replica: MatchReplica },
    /// Abort the match and notify the platform.
    Abort { code: AbortCode, detail: String },
}
