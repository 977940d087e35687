//! Tests for the match state machine, the arena systems and the duel engine.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec2;
use hecs::World;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use archery_core::commands::DuelCommand;
use archery_core::components::{Arrow, Position, Target};
use archery_core::config::MatchConfig;
use archery_core::constants::DT;
use archery_core::enums::*;
use archery_core::events::{DuelEvent, MatchAbort, MatchReport};
use archery_core::params::MatchParams;
use archery_core::ports::{ReportError, ResultReporter, WallClock};
use archery_core::state::{DuelSnapshot, MatchReplica};

use crate::engine::{DuelEngine, SimConfig};
use crate::match_flow::{MatchError, MatchStateMachine};
use crate::reporting::RecordingReporter;
use crate::systems;
use crate::world_setup;

// ---- Helpers ----

fn params() -> MatchParams {
    MatchParams::from_json(r#"{"matchId":"m-1","playerId":"p-1","opponentId":"p-2"}"#).unwrap()
}

/// Countdown collapses into the first tick.
fn quick_config() -> MatchConfig {
    MatchConfig {
        countdown_beat_secs: 0.0,
        ..Default::default()
    }
}

fn active_machine(config: MatchConfig, local_side: Side) -> (MatchStateMachine, Vec<DuelEvent>) {
    let mut machine = MatchStateMachine::new(config, Role::Authority, local_side);
    let mut events = Vec::new();
    assert!(machine.start_countdown(&mut events));
    machine.tick(0.0, &mut events);
    assert_eq!(machine.state().phase, MatchPhase::Active);
    (machine, events)
}

fn score(machine: &mut MatchStateMachine, side: Side, hits: u32, events: &mut Vec<DuelEvent>) {
    for _ in 0..hits {
        machine.record_score(side, 1, events);
    }
}

fn count(events: &[DuelEvent], pred: impl Fn(&DuelEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn is_match_result(e: &DuelEvent) -> bool {
    matches!(e, DuelEvent::MatchResult { .. })
}

fn is_show_result(e: &DuelEvent) -> bool {
    matches!(e, DuelEvent::ShowResult { .. })
}

struct ManualWallClock(Rc<Cell<f64>>);

impl WallClock for ManualWallClock {
    fn now_unix_secs(&self) -> f64 {
        self.0.get()
    }
}

struct FailingReporter;

impl ResultReporter for FailingReporter {
    fn report_result(&mut self, _report: &MatchReport) -> Result<(), ReportError> {
        Err(ReportError::Unavailable("platform bridge closed".into()))
    }
    fn report_abort(&mut self, _abort: &MatchAbort) -> Result<(), ReportError> {
        Err(ReportError::Unavailable("platform bridge closed".into()))
    }
}

// ---- Countdown ----

#[test]
fn test_countdown_beats_then_active() {
    let mut machine = MatchStateMachine::new(MatchConfig::default(), Role::Authority, Side::Red);
    let mut events = Vec::new();
    machine.start_countdown(&mut events);

    machine.tick(1.0, &mut events);
    machine.tick(1.0, &mut events);
    assert_eq!(machine.state().phase, MatchPhase::Countdown);
    machine.tick(1.0, &mut events);
    assert_eq!(machine.state().phase, MatchPhase::Active);
    assert_eq!(machine.state().remaining_time_secs, 60.0);

    let beats: Vec<CountdownBeat> = events
        .iter()
        .filter_map(|e| match e {
            DuelEvent::CountdownBeat { beat } => Some(*beat),
            _ => None,
        })
        .collect();
    assert_eq!(beats, CountdownBeat::SEQUENCE.to_vec());
    assert_eq!(
        count(&events, |e| *e
            == DuelEvent::PhaseChanged {
                phase: MatchPhase::Active
            }),
        1
    );
}

#[test]
fn test_countdown_starts_once() {
    let mut machine = MatchStateMachine::new(MatchConfig::default(), Role::Authority, Side::Red);
    let mut events = Vec::new();
    assert!(machine.start_countdown(&mut events));
    assert!(!machine.start_countdown(&mut events));
    assert_eq!(events.len(), 1);
}

#[test]
fn test_nothing_happens_without_countdown() {
    let mut machine = MatchStateMachine::new(quick_config(), Role::Authority, Side::Red);
    let mut events = Vec::new();
    for _ in 0..100 {
        machine.tick(DT, &mut events);
    }
    assert_eq!(machine.state().phase, MatchPhase::Countdown);
    assert!(events.is_empty());
}

// ---- Outcome ----

#[test]
fn test_outcome_table_local_red() {
    for (red, blue, expected) in [
        (7, 3, Outcome::Won),
        (3, 7, Outcome::Lost),
        (5, 5, Outcome::Draw),
    ] {
        let (mut machine, mut events) = active_machine(quick_config(), Side::Red);
        score(&mut machine, Side::Red, red, &mut events);
        score(&mut machine, Side::Blue, blue, &mut events);
        assert!(machine.end_match(EndReason::Timer, &mut events));

        assert_eq!(machine.state().outcome, expected);
        assert!(events.contains(&DuelEvent::ShowResult {
            outcome: expected,
            local_score: red,
            opponent_score: blue,
        }));
    }
}

#[test]
fn test_outcome_from_blue_perspective() {
    let (mut machine, mut events) = active_machine(quick_config(), Side::Blue);
    score(&mut machine, Side::Red, 7, &mut events);
    score(&mut machine, Side::Blue, 3, &mut events);
    machine.end_match(EndReason::Timer, &mut events);
    assert_eq!(machine.state().outcome, Outcome::Lost);
    assert_eq!(machine.local_scores(), (3, 7));
}

// ---- Timer ----

#[test]
fn test_timer_overshoot_clamps_and_ends_once() {
    let config = MatchConfig {
        duration_secs: 1.0,
        ..quick_config()
    };
    let (mut machine, mut events) = active_machine(config, Side::Red);

    machine.tick(1.5, &mut events);
    assert_eq!(machine.state().remaining_time_secs, 0.0);
    assert_eq!(machine.state().phase, MatchPhase::Ended);
    assert_eq!(machine.state().end_reason, Some(EndReason::Timer));

    for _ in 0..10 {
        machine.tick(1.5, &mut events);
    }
    assert_eq!(count(&events, is_show_result), 1);
    assert_eq!(count(&events, is_match_result), 1);
    assert_eq!(machine.state().remaining_time_secs, 0.0);
}

#[test]
fn test_clock_runs_per_tick() {
    let (mut machine, mut events) = active_machine(quick_config(), Side::Red);
    for _ in 0..30 {
        machine.tick(DT, &mut events);
    }
    assert!((machine.state().remaining_time_secs - 59.0).abs() < 1e-6);
}

#[test]
fn test_networked_clock_follows_wall_deadline() {
    let wall = Rc::new(Cell::new(1_000.0));
    let config = MatchConfig {
        networked: true,
        ..quick_config()
    };
    let mut machine = MatchStateMachine::new(config, Role::Authority, Side::Red)
        .with_wall_clock(Box::new(ManualWallClock(wall.clone())));
    let mut events = Vec::new();
    machine.start_countdown(&mut events);
    machine.tick(0.0, &mut events);
    assert_eq!(machine.state().end_at_unix_secs, Some(1_060.0));

    // Local ticks stall, the wall clock does not.
    wall.set(1_030.0);
    machine.tick(DT, &mut events);
    assert!((machine.state().remaining_time_secs - 30.0).abs() < 1e-9);

    wall.set(1_061.0);
    machine.tick(DT, &mut events);
    assert_eq!(machine.state().phase, MatchPhase::Ended);
    assert_eq!(machine.state().remaining_time_secs, 0.0);
}

// ---- Scoring ----

#[test]
fn test_scores_only_move_forward() {
    let mut machine = MatchStateMachine::new(quick_config(), Role::Authority, Side::Red);
    let mut events = Vec::new();
    assert!(!machine.record_score(Side::Red, 1, &mut events));

    machine.start_countdown(&mut events);
    machine.tick(0.0, &mut events);
    assert!(machine.record_score(Side::Red, 1, &mut events));
    assert!(!machine.record_score(Side::Red, 0, &mut events));
    assert!(machine.record_score(Side::Blue, 2, &mut events));

    machine.end_match(EndReason::Timer, &mut events);
    assert!(!machine.record_score(Side::Blue, 5, &mut events));

    assert_eq!(machine.state().red_score, 1);
    assert_eq!(machine.state().blue_score, 2);

    let mut last = [0u32; 2];
    for event in &events {
        if let DuelEvent::ScoreChanged { side, value } = event {
            let slot = &mut last[*side as usize];
            assert!(*value > *slot);
            *slot = *value;
        }
    }
}

#[test]
fn test_score_limit_ends_match() {
    let config = MatchConfig {
        score_limit: Some(3),
        ..quick_config()
    };
    let (mut machine, mut events) = active_machine(config, Side::Red);
    score(&mut machine, Side::Blue, 1, &mut events);
    score(&mut machine, Side::Red, 3, &mut events);

    assert_eq!(machine.state().phase, MatchPhase::Ended);
    assert_eq!(machine.state().end_reason, Some(EndReason::ScoreLimit));
    assert_eq!(machine.state().outcome, Outcome::Won);

    score(&mut machine, Side::Red, 1, &mut events);
    assert_eq!(machine.state().red_score, 3);
    assert_eq!(count(&events, is_show_result), 1);
}

// ---- End and report ----

#[test]
fn test_end_match_is_idempotent() {
    let (mut machine, mut events) = active_machine(quick_config(), Side::Red);
    score(&mut machine, Side::Red, 2, &mut events);

    let ended = (0..5)
        .filter(|_| machine.end_match(EndReason::Timer, &mut events))
        .count();
    assert_eq!(ended, 1);

    for _ in 0..(5.0 / DT) as usize {
        machine.tick(DT, &mut events);
    }
    assert_eq!(count(&events, is_show_result), 1);
    assert_eq!(count(&events, is_match_result), 1);
    assert!(!machine.report_result(Outcome::Won, 2, 0, &mut events));
    assert_eq!(count(&events, is_match_result), 1);
}

#[test]
fn test_report_waits_for_result_delay() {
    let (mut machine, mut events) = active_machine(quick_config(), Side::Red);
    machine.end_match(EndReason::Timer, &mut events);

    machine.tick(2.9, &mut events);
    assert_eq!(count(&events, is_match_result), 0);
    machine.tick(0.2, &mut events);
    assert_eq!(count(&events, is_match_result), 1);
    assert!(machine.state().result_reported);
}

#[test]
fn test_forfeit_reports_before_teardown() {
    let reporter = RecordingReporter::new();
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine
        .with_params(params())
        .with_reporter(Box::new(reporter.clone()));

    score(&mut machine, Side::Red, 4, &mut events);
    assert!(machine.force_end(Outcome::Lost, true, &mut events));
    assert!(!machine.force_end(Outcome::Won, true, &mut events));
    assert_eq!(machine.state().end_reason, Some(EndReason::Forfeit));

    for _ in 0..6 {
        machine.tick(DT, &mut events);
    }

    let result_at = events.iter().position(is_match_result).unwrap();
    let teardown_at = events
        .iter()
        .position(|e| *e == DuelEvent::SessionTeardown)
        .unwrap();
    assert!(result_at < teardown_at);

    let log = reporter.log();
    assert_eq!(log.results.len(), 1);
    assert_eq!(log.results[0].outcome, Outcome::Lost);
    assert_eq!(log.results[0].score, 4);
    assert_eq!(log.results[0].match_id, "m-1");
}

#[test]
fn test_opponent_leaves_during_countdown() {
    let mut machine = MatchStateMachine::new(MatchConfig::default(), Role::Authority, Side::Red);
    let mut events = Vec::new();
    machine.start_countdown(&mut events);
    machine.tick(0.5, &mut events);

    assert!(machine.force_end(Outcome::Won, false, &mut events));
    for _ in 0..10 {
        machine.tick(1.0, &mut events);
    }
    assert_eq!(machine.state().outcome, Outcome::Won);
    assert!(!events.contains(&DuelEvent::CountdownBeat {
        beat: CountdownBeat::Go
    }));
    assert!(!events.contains(&DuelEvent::SessionTeardown));
    assert_eq!(count(&events, is_match_result), 1);
}

#[test]
fn test_forced_end_needs_decided_outcome() {
    let (mut machine, mut events) = active_machine(quick_config(), Side::Red);
    assert!(!machine.force_end(Outcome::Undetermined, false, &mut events));
    assert!(machine.is_active());
}

// ---- Submission ----

#[test]
fn test_submission_timeout_gives_up_once() {
    let reporter = RecordingReporter::new();
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine
        .with_params(params())
        .with_reporter(Box::new(reporter.clone()));
    machine.end_match(EndReason::Timer, &mut events);

    machine.tick(3.0, &mut events);
    assert!(machine.awaiting_acknowledgement());
    machine.tick(4.9, &mut events);
    assert!(!machine.submission_timed_out());

    machine.tick(0.2, &mut events);
    assert!(machine.submission_timed_out());
    assert!(!machine.awaiting_acknowledgement());

    for _ in 0..20 {
        machine.tick(1.0, &mut events);
    }
    assert_eq!(reporter.log().results.len(), 1);
}

#[test]
fn test_acknowledgement_stops_timeout() {
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine
        .with_params(params())
        .with_reporter(Box::new(RecordingReporter::new()));
    machine.end_match(EndReason::Timer, &mut events);
    machine.tick(3.0, &mut events);

    machine.acknowledge_submission();
    machine.tick(10.0, &mut events);
    assert!(!machine.awaiting_acknowledgement());
    assert!(!machine.submission_timed_out());
}

#[test]
fn test_failing_reporter_does_not_stall_flow() {
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine
        .with_params(params())
        .with_reporter(Box::new(FailingReporter));
    machine.end_match(EndReason::Timer, &mut events);
    machine.tick(3.0, &mut events);

    assert_eq!(count(&events, is_match_result), 1);
    assert!(machine.state().result_reported);
    assert!(!machine.awaiting_acknowledgement());
    assert!(machine.reset(&mut events).is_ok());
}

#[test]
fn test_missing_params_skips_submission() {
    let reporter = RecordingReporter::new();
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine.with_reporter(Box::new(reporter.clone()));
    machine.end_match(EndReason::Timer, &mut events);
    machine.tick(3.0, &mut events);

    assert_eq!(count(&events, is_match_result), 1);
    assert!(reporter.log().results.is_empty());
}

#[test]
fn test_abort_forwarded() {
    let reporter = RecordingReporter::new();
    let mut machine = MatchStateMachine::new(MatchConfig::default(), Role::Authority, Side::Red)
        .with_reporter(Box::new(reporter.clone()));
    machine.report_abort(AbortCode::PlayerDisconnect, "p-2");

    let log = reporter.log();
    assert_eq!(log.aborts.len(), 1);
    assert_eq!(log.aborts[0].code, AbortCode::PlayerDisconnect);
    assert_eq!(log.aborts[0].message, "Player p-2 disconnected");
}

// ---- Reset ----

#[test]
fn test_reset_only_when_ended() {
    let reporter = RecordingReporter::new();
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine
        .with_params(params())
        .with_reporter(Box::new(reporter.clone()));
    assert_eq!(
        machine.reset(&mut events),
        Err(MatchError::NotEnded(MatchPhase::Active))
    );

    score(&mut machine, Side::Red, 2, &mut events);
    machine.end_match(EndReason::Timer, &mut events);
    machine.tick(3.0, &mut events);
    assert_eq!(machine.reset(&mut events), Ok(()));

    assert_eq!(machine.state().phase, MatchPhase::Countdown);
    assert_eq!(machine.state().red_score, 0);
    assert_eq!(machine.state().outcome, Outcome::Undetermined);
    assert!(!machine.state().result_reported);
    assert!(!machine.awaiting_acknowledgement());
    assert_eq!(reporter.log().results.len(), 1);
    assert!(machine.start_countdown(&mut events));
}

#[test]
fn test_reset_during_result_delay_still_reports_once() {
    let reporter = RecordingReporter::new();
    let (machine, mut events) = active_machine(quick_config(), Side::Red);
    let mut machine = machine
        .with_params(params())
        .with_reporter(Box::new(reporter.clone()));

    score(&mut machine, Side::Red, 1, &mut events);
    machine.end_match(EndReason::Timer, &mut events);
    machine.tick(1.0, &mut events);
    assert_eq!(count(&events, is_match_result), 0);

    let mut after = Vec::new();
    assert_eq!(machine.reset(&mut after), Ok(()));
    machine.tick(10.0, &mut after);

    assert_eq!(count(&after, is_match_result), 1);
    let log = reporter.log();
    assert_eq!(log.results.len(), 1);
    assert_eq!(log.results[0].outcome, Outcome::Won);
    assert_eq!(log.results[0].score, 1);
    assert_eq!(log.results[0].average_ping, 0);
    assert_eq!(log.results[0].match_id, "m-1");
}

#[test]
fn test_reset_after_forfeit_keeps_teardown_order() {
    let (mut machine, _) = active_machine(quick_config(), Side::Red);
    let mut events = Vec::new();
    assert!(machine.force_end(Outcome::Lost, true, &mut events));

    let mut after = Vec::new();
    assert_eq!(machine.reset(&mut after), Ok(()));
    assert_eq!(
        after,
        vec![
            DuelEvent::MatchResult {
                outcome: Outcome::Lost,
                local_score: 0,
                opponent_score: 0,
            },
            DuelEvent::SessionTeardown,
        ]
    );
}

// ---- Replication ----

#[test]
fn test_observer_cannot_mutate() {
    let mut machine = MatchStateMachine::new(quick_config(), Role::Observer, Side::Blue);
    let mut events = Vec::new();

    assert!(!machine.start_countdown(&mut events));
    machine.apply_replica(
        MatchReplica {
            phase: MatchPhase::Active,
            remaining_time_secs: 60.0,
            ..Default::default()
        },
        &mut events,
    );
    assert!(!machine.record_score(Side::Blue, 1, &mut events));
    assert!(!machine.end_match(EndReason::Timer, &mut events));
    assert_eq!(
        machine.reset(&mut events),
        Err(MatchError::NotAuthority("reset the match"))
    );

    // Observers never run the clock down themselves.
    machine.tick(100.0, &mut events);
    assert_eq!(machine.state().phase, MatchPhase::Active);
    assert_eq!(machine.state().blue_score, 0);
}

#[test]
fn test_observer_follows_replica_and_resolves_outcome() {
    let mut machine = MatchStateMachine::new(quick_config(), Role::Observer, Side::Blue);
    let mut events = Vec::new();

    let mut replica = MatchReplica {
        red_score: 2,
        blue_score: 0,
        phase: MatchPhase::Active,
        remaining_time_secs: 30.0,
        ..Default::default()
    };
    machine.apply_replica(replica, &mut events);
    assert_eq!(machine.state().red_score, 2);
    assert_eq!(machine.state().remaining_time_secs, 30.0);

    // A stale replica cannot roll the score back.
    machine.apply_replica(
        MatchReplica {
            red_score: 1,
            ..replica
        },
        &mut events,
    );
    assert_eq!(machine.state().red_score, 2);

    replica.blue_score = 1;
    replica.phase = MatchPhase::Ended;
    replica.remaining_time_secs = 0.0;
    replica.end_reason = Some(EndReason::Timer);
    machine.apply_replica(replica, &mut events);

    assert_eq!(machine.state().phase, MatchPhase::Ended);
    assert_eq!(machine.state().outcome, Outcome::Lost);
    assert!(events.contains(&DuelEvent::ShowResult {
        outcome: Outcome::Lost,
        local_score: 1,
        opponent_score: 2,
    }));

    machine.tick(3.0, &mut events);
    assert_eq!(count(&events, is_match_result), 1);

    // Late replicas after the end change nothing.
    machine.apply_replica(MatchReplica { red_score: 9, ..replica }, &mut events);
    assert_eq!(machine.state().red_score, 2);
}

#[test]
fn test_authority_ignores_replica() {
    let (mut machine, mut events) = active_machine(quick_config(), Side::Red);
    machine.apply_replica(
        MatchReplica {
            red_score: 5,
            phase: MatchPhase::Ended,
            ..Default::default()
        },
        &mut events,
    );
    assert_eq!(machine.state().red_score, 0);
    assert!(machine.is_active());
}

// ---- Arena systems ----

fn still_target(world: &mut World, side: Side, at: DVec2) {
    world.spawn((
        Target {
            side,
            half_extents: DVec2::new(0.35, 0.6),
        },
        Position(at),
    ));
}

#[test]
fn test_arrow_scores_on_own_target_only() {
    let mut world = World::new();
    still_target(&mut world, Side::Red, DVec2::new(6.0, 0.0));
    world_setup::spawn_arrow(&mut world, Side::Red, DVec2::new(5.0, 0.2), DVec2::new(8.0, 0.0));
    world_setup::spawn_arrow(&mut world, Side::Blue, DVec2::new(5.0, 0.2), DVec2::new(8.0, 0.0));

    let mut hits = Vec::new();
    let mut buffer = Vec::new();
    for _ in 0..10 {
        systems::arrows::run(&mut world, DT, &mut hits, &mut buffer);
    }

    assert_eq!(hits, vec![Side::Red]);
    let arrows: Vec<Side> = world
        .query::<&Arrow>()
        .iter()
        .map(|(_, arrow)| arrow.side)
        .collect();
    assert_eq!(arrows, vec![Side::Blue]);
}

#[test]
fn test_arrow_misses_above_target() {
    let mut world = World::new();
    still_target(&mut world, Side::Red, DVec2::new(6.0, 0.0));
    world_setup::spawn_arrow(&mut world, Side::Red, DVec2::new(5.0, 0.7), DVec2::new(8.0, 0.0));

    let mut hits = Vec::new();
    let mut buffer = Vec::new();
    for _ in 0..30 {
        systems::arrows::run(&mut world, DT, &mut hits, &mut buffer);
        systems::cleanup::run(&mut world, &mut buffer);
    }
    assert!(hits.is_empty());
    // Left the arena and was cleaned up.
    assert_eq!(world.query::<&Arrow>().iter().count(), 0);
}

#[test]
fn test_arena_view_samples_heights() {
    use archery_core::ports::PositionSource;

    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    world_setup::setup_arena(&mut world, &mut rng);

    let view = systems::sampling::ArenaView::new(&world, Side::Blue);
    let bow = view.bow_y().unwrap();
    let target = view.target_y().unwrap();
    assert!(bow.abs() <= archery_core::constants::BOW_MOVE_RANGE);
    assert!(target.abs() <= archery_core::constants::TARGET_MOVE_RANGE);

    let empty = World::new();
    assert_eq!(systems::sampling::ArenaView::new(&empty, Side::Red).bow_y(), None);
}

#[test]
fn test_shooter_rig_geometry() {
    let blue = world_setup::shooter_rig(Side::Blue);
    assert_eq!(blue.shoot_point_x, 6.5);
    assert_eq!(blue.facing, DVec2::NEG_X);
    let red = world_setup::shooter_rig(Side::Red);
    assert_eq!(red.shoot_point_x, -6.5);
    assert_eq!(red.facing, DVec2::X);
}

// ---- Engine ----

fn engine(config: SimConfig) -> DuelEngine {
    DuelEngine::new(config).unwrap()
}

/// Authority without AI shooters: scores only come from commands.
fn bare_authority(match_config: MatchConfig) -> SimConfig {
    SimConfig {
        mode: GameMode::Multiplayer,
        match_config,
        ..Default::default()
    }
}

fn run_collecting(engine: &mut DuelEngine, ticks: usize) -> (DuelSnapshot, Vec<DuelEvent>) {
    let mut events = Vec::new();
    let mut snapshot = DuelSnapshot::default();
    for _ in 0..ticks {
        snapshot = engine.tick();
        events.extend(snapshot.events.iter().cloned());
    }
    (snapshot, events)
}

#[test]
fn test_determinism_same_seed() {
    let config = SimConfig {
        seed: 12345,
        difficulty: Difficulty::Hard,
        autopilot: true,
        ..Default::default()
    };
    let mut engine_a = engine(config.clone());
    let mut engine_b = engine(config);
    engine_a.queue_command(DuelCommand::StartCountdown);
    engine_b.queue_command(DuelCommand::StartCountdown);

    for _ in 0..900 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = engine(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = engine(SimConfig {
        seed: 222,
        ..Default::default()
    });
    let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
    let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should place the arena differently");
}

#[test]
fn test_tick_timing_30_ticks_one_second() {
    let mut engine = engine(SimConfig::default());
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 30);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-9);
}

#[test]
fn test_snapshot_lists_both_sides() {
    let mut engine = engine(SimConfig::default());
    let snapshot = engine.tick();
    assert_eq!(snapshot.bows.len(), 2);
    assert_eq!(snapshot.targets.len(), 2);
    assert_eq!(snapshot.bows[0].side, Side::Red);
    assert_eq!(snapshot.score.local_side, Side::Red);
    assert_eq!(snapshot.shooters.len(), 1);
    assert_eq!(snapshot.shooters[0].side, Side::Blue);
    assert_eq!(snapshot.shooters[0].firing_state, FiringState::Idle);
}

#[test]
fn test_snapshot_lists_every_ai_shooter_with_autopilot() {
    let mut engine = engine(SimConfig {
        autopilot: true,
        ..Default::default()
    });
    let snapshot = engine.tick();
    let sides: Vec<Side> = snapshot.shooters.iter().map(|s| s.side).collect();
    assert_eq!(sides, vec![Side::Blue, Side::Red]);
}

#[test]
fn test_ai_holds_fire_until_match_starts() {
    let mut engine = engine(SimConfig {
        difficulty: Difficulty::Hard,
        ..Default::default()
    });
    let (_, events) = run_collecting(&mut engine, 300);
    assert_eq!(
        count(&events, |e| matches!(e, DuelEvent::FireDecision { .. })),
        0
    );
}

#[test]
fn test_ai_fires_during_play() {
    let mut engine = engine(SimConfig {
        difficulty: Difficulty::Hard,
        match_config: quick_config(),
        ..Default::default()
    });
    engine.queue_command(DuelCommand::StartCountdown);

    let mut saw_arrow = false;
    let mut fired = 0;
    for _ in 0..300 {
        let snapshot = engine.tick();
        saw_arrow |= !snapshot.arrows.is_empty();
        fired += count(&snapshot.events, |e| {
            matches!(e, DuelEvent::FireDecision { side: Side::Blue, .. })
        });
    }
    assert!(fired > 0);
    assert!(saw_arrow);
    assert_eq!(engine.shooters()[0].state().shots_fired as usize, fired);
}

#[test]
fn test_hard_bot_outshoots_easy_bot() {
    let mut shots = Vec::new();
    for difficulty in [Difficulty::Easy, Difficulty::Hard] {
        let mut engine = engine(SimConfig {
            seed: 7,
            difficulty,
            match_config: quick_config(),
            ..Default::default()
        });
        engine.queue_command(DuelCommand::StartCountdown);
        run_collecting(&mut engine, (60.0 / DT) as usize);
        shots.push(engine.shooters()[0].state().shots_fired);
    }
    assert!(shots[1] > shots[0], "hard {} vs easy {}", shots[1], shots[0]);
}

#[test]
fn test_manual_shot_only_during_play() {
    let mut engine = engine(bare_authority(quick_config()));
    engine.queue_command(DuelCommand::Shoot { side: Side::Red });
    let snapshot = engine.tick();
    assert!(snapshot.arrows.is_empty());

    engine.queue_command(DuelCommand::Shoot { side: Side::Red });
    let snapshot = engine.tick();
    assert!(snapshot.arrows.is_empty(), "countdown still running");

    engine.queue_command(DuelCommand::StartCountdown);
    engine.tick();
    engine.queue_command(DuelCommand::Shoot { side: Side::Red });
    let snapshot = engine.tick();
    assert_eq!(snapshot.arrows.len(), 1);
    assert_eq!(snapshot.arrows[0].side, Side::Red);
}

#[test]
fn test_manual_shot_rejected_for_ai_side() {
    let mut engine = engine(SimConfig {
        match_config: quick_config(),
        ..Default::default()
    });
    engine.queue_command(DuelCommand::StartCountdown);
    engine.tick();
    engine.queue_command(DuelCommand::Shoot { side: Side::Blue });
    let snapshot = engine.tick();
    assert!(snapshot.arrows.is_empty());
}

#[test]
fn test_hit_on_final_tick_beats_timer_draw() {
    for (hit_on_last_tick, expected) in [(true, Outcome::Won), (false, Outcome::Draw)] {
        let mut engine = engine(bare_authority(MatchConfig {
            duration_secs: 1.0,
            ..quick_config()
        }));
        engine.queue_command(DuelCommand::StartCountdown);
        let mut snapshot = engine.tick();
        assert_eq!(snapshot.phase, MatchPhase::Active);

        for _ in 0..60 {
            if snapshot.remaining_time_secs < DT * 1.5 {
                break;
            }
            snapshot = engine.tick();
        }
        assert_eq!(snapshot.phase, MatchPhase::Active);

        if hit_on_last_tick {
            engine.queue_command(DuelCommand::TargetHit { side: Side::Red });
        }
        let snapshot = engine.tick();
        assert_eq!(snapshot.phase, MatchPhase::Ended);
        assert_eq!(snapshot.outcome, expected);
    }
}

#[test]
fn test_engine_forfeit_flow() {
    let reporter = RecordingReporter::new();
    let mut engine = engine(SimConfig {
        params: Some(params()),
        ..bare_authority(quick_config())
    })
    .with_reporter(Box::new(reporter.clone()));
    engine.queue_command(DuelCommand::StartCountdown);
    engine.queue_command(DuelCommand::TargetHit { side: Side::Blue });
    engine.tick();
    engine.queue_command(DuelCommand::OpponentForfeit);
    let (snapshot, events) = run_collecting(&mut engine, 10);

    assert_eq!(snapshot.outcome, Outcome::Won);
    assert_eq!(snapshot.replica.end_reason, Some(EndReason::Forfeit));
    let result_at = events.iter().position(is_match_result).unwrap();
    let teardown_at = events
        .iter()
        .position(|e| *e == DuelEvent::SessionTeardown)
        .unwrap();
    assert!(result_at < teardown_at);
    assert_eq!(reporter.log().results[0].outcome, Outcome::Won);

    engine.queue_command(DuelCommand::AcknowledgeSubmission);
    engine.tick();
    assert!(!engine.match_flow().awaiting_acknowledgement());
}

#[test]
fn test_engine_reset_after_end() {
    let mut engine = engine(SimConfig {
        difficulty: Difficulty::Hard,
        match_config: MatchConfig {
            duration_secs: 2.0,
            ..quick_config()
        },
        ..Default::default()
    });
    engine.queue_command(DuelCommand::Reset);
    engine.queue_command(DuelCommand::StartCountdown);
    let (snapshot, _) = run_collecting(&mut engine, 90);
    assert_eq!(snapshot.phase, MatchPhase::Ended);

    engine.queue_command(DuelCommand::Reset);
    let snapshot = engine.tick();
    assert_eq!(snapshot.phase, MatchPhase::Countdown);
    assert_eq!(snapshot.outcome, Outcome::Undetermined);
    assert!(snapshot.arrows.is_empty());
    assert_eq!(engine.shooters()[0].state().shots_fired, 0);
}

#[test]
fn test_observer_engine_mirrors_authority() {
    let mut authority = engine(bare_authority(quick_config()));
    let mut observer = engine(SimConfig {
        role: Role::Observer,
        local_side: Side::Blue,
        ..bare_authority(quick_config())
    });

    authority.queue_command(DuelCommand::StartCountdown);
    authority.queue_command(DuelCommand::TargetHit { side: Side::Blue });
    observer.queue_command(DuelCommand::StartCountdown);
    observer.queue_command(DuelCommand::TargetHit { side: Side::Red });

    let mut replica = authority.tick().replica;
    for _ in 0..3 {
        observer.queue_command(DuelCommand::ApplyReplica { replica });
        observer.tick();
        authority.queue_command(DuelCommand::TargetHit { side: Side::Blue });
        replica = authority.tick().replica;
    }
    observer.queue_command(DuelCommand::ApplyReplica { replica });
    let snapshot = observer.tick();

    assert_eq!(snapshot.phase, MatchPhase::Active);
    assert_eq!(snapshot.score.blue, authority.match_flow().state().blue_score);
    assert_eq!(snapshot.score.red, 0);
}

#[test]
fn test_engine_rejects_invalid_config() {
    let result = DuelEngine::new(SimConfig {
        match_config: MatchConfig {
            duration_secs: 0.0,
            ..Default::default()
        },
        ..Default::default()
    });
    assert!(result.is_err());
}

#[test]
fn test_engine_rejects_forced_window_for_easy_bot() {
    let mut profile = archery_ai::profiles::get_profile(Difficulty::Easy);
    profile.forced_window = Some(1.0);
    let result = DuelEngine::new(SimConfig {
        difficulty: Difficulty::Easy,
        profile: Some(profile.clone()),
        ..Default::default()
    });
    assert!(result.is_err());

    let result = DuelEngine::new(SimConfig {
        difficulty: Difficulty::Hard,
        profile: Some(profile),
        ..Default::default()
    });
    assert!(result.is_ok());
}

#[test]
fn test_sim_config_from_params() {
    let bot = MatchParams::from_json(r#"{"matchId":"m","playerId":"p","opponentId":"b9-bot"}"#)
        .unwrap();
    let config = SimConfig::for_match(bot, 2, 1);
    assert_eq!(config.mode, GameMode::Singleplayer);
    assert_eq!(config.difficulty, Difficulty::Hard);
    assert_eq!(config.local_side, Side::Red);
    assert_eq!(config.role, Role::Authority);

    let config = SimConfig::for_match(params(), 2, 1);
    assert_eq!(config.mode, GameMode::Multiplayer);
    assert_eq!(config.local_side, Side::Blue);
    assert_eq!(config.role, Role::Observer);
    assert!(config.match_config.networked);

    let engine = engine(config);
    assert!(engine.shooters().is_empty());
}

#[test]
fn test_loaded_match_config_keeps_networked_clock() {
    let loaded = MatchConfig {
        duration_secs: 30.0,
        ..Default::default()
    };
    assert!(!loaded.networked);

    let config = SimConfig::for_match(params(), 1, 1).with_match_config(loaded.clone());
    assert_eq!(config.match_config.duration_secs, 30.0);
    assert!(config.match_config.networked);

    let bot = MatchParams::from_json(r#"{"matchId":"m","playerId":"p","opponentId":"a9-bot"}"#)
        .unwrap();
    let config = SimConfig::for_match(bot, 1, 1).with_match_config(loaded);
    assert!(!config.match_config.networked);
}

#[test]
fn test_loaded_match_config_anchors_wall_deadline() {
    let config = SimConfig::for_match(params(), 1, 1).with_match_config(quick_config());
    let mut engine = DuelEngine::new(config)
        .unwrap()
        .with_wall_clock(Box::new(ManualWallClock(Rc::new(Cell::new(1_000.0)))));
    engine.queue_command(DuelCommand::StartCountdown);
    let snapshot = engine.tick();

    assert_eq!(snapshot.phase, MatchPhase::Active);
    assert_eq!(snapshot.replica.end_at_unix_secs, Some(1_060.0));
}

#[test]
fn test_abort_command_reaches_reporter() {
    let reporter = RecordingReporter::new();
    let mut engine = engine(SimConfig::default()).with_reporter(Box::new(reporter.clone()));
    engine.queue_command(DuelCommand::Abort {
        code: AbortCode::GameStartFailure,
        detail: "arena missing".into(),
    });
    engine.tick();
    assert_eq!(
        reporter.log().aborts,
        vec![MatchAbort::new(AbortCode::GameStartFailure, "arena missing")]
    );
}
