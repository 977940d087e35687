//! Match parameters handed over by the hosting platform.
//!
//! The platform passes a small JSON object identifying the match and both
//! participants. Bot opponents are recognised by their id prefix, which also
//! selects the AI difficulty.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REGION, EASY_BOT_PREFIX, HARD_BOT_PREFIX};
use crate::enums::{Difficulty, GameMode};

/// Errors raised while parsing platform parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Empty parameter payload")]
    Empty,

    #[error("Malformed parameter payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Required match parameter missing or empty: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParams {
    #[serde(default)]
    match_id: String,
    #[serde(default)]
    player_id: String,
    #[serde(default)]
    opponent_id: String,
    #[serde(default)]
    region: Option<String>,
}

/// Validated match identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParams {
    pub match_id: String,
    pub player_id: String,
    pub opponent_id: String,
    pub region: String,
}

impl MatchParams {
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        if json.trim().is_empty() {
            return Err(ParamsError::Empty);
        }
        let raw: RawParams = serde_json::from_str(json)?;

        if raw.match_id.is_empty() {
            return Err(ParamsError::Missing("matchId"));
        }
        if raw.player_id.is_empty() {
            return Err(ParamsError::Missing("playerId"));
        }
        if raw.opponent_id.is_empty() {
            return Err(ParamsError::Missing("opponentId"));
        }

        let region = raw
            .region
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            match_id: raw.match_id,
            player_id: raw.player_id,
            opponent_id: raw.opponent_id,
            region,
        })
    }

    pub fn opponent_is_bot(&self) -> bool {
        is_bot_id(&self.opponent_id)
    }

    /// Bot difficulty encoded in the opponent id; `None` for human opponents.
    pub fn bot_difficulty(&self) -> Option<Difficulty> {
        bot_difficulty(&self.opponent_id)
    }

    pub fn game_mode(&self) -> GameMode {
        if self.opponent_is_bot() {
            GameMode::Singleplayer
        } else {
            GameMode::Multiplayer
        }
    }
}

pub fn is_bot_id(player_id: &str) -> bool {
    player_id.starts_with(EASY_BOT_PREFIX) || player_id.starts_with(HARD_BOT_PREFIX)
}

pub fn bot_difficulty(player_id: &str) -> Option<Difficulty> {
    if player_id.starts_with(EASY_BOT_PREFIX) {
        Some(Difficulty::Easy)
    } else if player_id.starts_with(HARD_BOT_PREFIX) {
        Some(Difficulty::Hard)
    } else {
        None
    }
}
