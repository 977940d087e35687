//! Simulation engine for the archery duel.
//!
//! Owns the hecs arena world and the match state machine, runs systems at a
//! fixed tick rate, and produces DuelSnapshots for the presentation layer.

pub mod engine;
pub mod match_flow;
pub mod match_state;
pub mod reporting;
pub mod systems;
pub mod world_setup;

pub use archery_core as core;
pub use engine::{DuelEngine, SimConfig};
pub use match_flow::{MatchError, MatchStateMachine};

#[cfg(test)]
mod tests;
