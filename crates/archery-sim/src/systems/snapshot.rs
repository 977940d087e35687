//! Snapshot system: queries the arena and match flow and builds a complete DuelSnapshot.
//!
//! This system is read-only and never modifies the world.

use hecs::World;

use archery_ai::AiShooter;
use archery_core::components::{Arrow, Bow, Position, Target};
use archery_core::enums::Side;
use archery_core::events::DuelEvent;
use archery_core::state::*;
use archery_core::types::SimTime;

use crate::match_flow::MatchStateMachine;

/// Build a complete DuelSnapshot from the current world and match state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    match_flow: &MatchStateMachine,
    shooters: &[AiShooter],
    events: Vec<DuelEvent>,
) -> DuelSnapshot {
    let state = match_flow.state();

    DuelSnapshot {
        time: *time,
        phase: state.phase,
        score: ScoreView {
            red: state.red_score,
            blue: state.blue_score,
            local_side: match_flow.local_side(),
        },
        remaining_time_secs: state.remaining_time_secs,
        outcome: state.outcome,
        shooters: shooters.iter().map(AiShooter::view).collect(),
        bows: collect_bodies(world, |w| {
            w.query::<(&Bow, &Position)>()
                .iter()
                .map(|(_, (bow, pos))| body(bow.side, pos))
                .collect()
        }),
        targets: collect_bodies(world, |w| {
            w.query::<(&Target, &Position)>()
                .iter()
                .map(|(_, (target, pos))| body(target.side, pos))
                .collect()
        }),
        arrows: build_arrows(world),
        events,
        replica: match_flow.replica(),
    }
}

fn body(side: Side, pos: &Position) -> BodyView {
    BodyView {
        side,
        position: pos.0,
    }
}

/// Bows and targets, red first.
fn collect_bodies(world: &World, query: impl Fn(&World) -> Vec<BodyView>) -> Vec<BodyView> {
    let mut bodies = query(world);
    bodies.sort_by_key(|b| b.side == Side::Blue);
    bodies
}

fn build_arrows(world: &World) -> Vec<BodyView> {
    world
        .query::<(&Arrow, &Position)>()
        .iter()
        .map(|(_, (arrow, pos))| body(arrow.side, pos))
        .collect()
}
