//! Targeting AI for the archery duel.
//!
//! Implements the shot-decision heuristic, per-difficulty tuning profiles,
//! and the hold/release/cooldown state machine of an AI-controlled bow.

pub mod aim;
pub mod profiles;
pub mod shooter;
pub mod velocity;

pub use archery_core as core;
pub use shooter::{AiShooter, ShooterRig, ShooterState};
