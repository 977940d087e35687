//! Enumeration types used throughout the duel.

use serde::{Deserialize, Serialize};

/// AI difficulty, fixed for the whole match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

/// Team colour. Each side owns a bow and the target its arrows score on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Red,
    Blue,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// Networked slot assignment: slot 1 plays Red, every other slot plays Blue.
    pub fn from_player_slot(slot: u32) -> Side {
        if slot == 1 {
            Side::Red
        } else {
            Side::Blue
        }
    }
}

/// Fire-control state of an AI shooter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringState {
    /// Waiting for a fire decision.
    #[default]
    Idle,
    /// Bow drawn, arrow released when the hold timer elapses.
    Holding,
    /// Arrow released, waiting out the randomized cooldown.
    Cooldown,
}

/// Which branch of the shot heuristic produced a fire decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireTrigger {
    /// Bow and target moving toward each other within converging range.
    Converging,
    /// Heights within the alignment tolerance.
    Aligned,
    /// Inside the loose forced window (Hard only).
    Forced,
    /// Bow lines up with the projected target height.
    Predictive,
}

/// Match lifecycle phase. Only ever advances, except through an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    Countdown,
    Active,
    Ended,
}

/// Match result from the local participant's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Undetermined,
    Won,
    Lost,
    Draw,
}

impl Outcome {
    /// Compare scores from the local side's point of view.
    pub fn from_scores(local_score: u32, opponent_score: u32) -> Outcome {
        match local_score.cmp(&opponent_score) {
            std::cmp::Ordering::Greater => Outcome::Won,
            std::cmp::Ordering::Less => Outcome::Lost,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Match clock reached zero.
    Timer,
    /// A side reached the configured score limit.
    ScoreLimit,
    /// Forfeit or disconnect forced an explicit outcome.
    Forfeit,
}

/// Countdown beats shown before play starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownBeat {
    Three,
    Two,
    One,
    Go,
}

impl CountdownBeat {
    /// Beats in presentation order.
    pub const SEQUENCE: [CountdownBeat; 4] = [
        CountdownBeat::Three,
        CountdownBeat::Two,
        CountdownBeat::One,
        CountdownBeat::Go,
    ];
}

/// Single-player against a bot, or networked against another player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Singleplayer,
    Multiplayer,
}

/// Replication role. Only the authority mutates shared match state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Authority,
    Observer,
}

/// Platform abort codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbortCode {
    GameStartFailure,
    PlayerDisconnect,
    ConnectionError,
    InitializationError,
    CriticalError,
}
