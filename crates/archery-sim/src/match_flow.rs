//! Match state machine: countdown, timed play, scoring, end-of-match
//! resolution and bounded result reporting.
//!
//! Driven once per tick by the engine. Every wait is a deadline field
//! advanced by `tick`; nothing sleeps. Only the authority mutates shared
//! state; observers follow the authority through `apply_replica`.

use tracing::{debug, info, warn};

use archery_core::config::MatchConfig;
use archery_core::constants::TIME_EPSILON;
use archery_core::enums::{AbortCode, CountdownBeat, EndReason, MatchPhase, Outcome, Role, Side};
use archery_core::events::{DuelEvent, MatchAbort};
use archery_core::params::MatchParams;
use archery_core::ports::{ResultReporter, SystemWallClock, WallClock};
use archery_core::state::MatchReplica;
use archery_core::types::Countdown;

use crate::match_state::{phase_rank, CountdownProgress, MatchState, PendingReport};
use crate::reporting::build_report;

/// Rejected match-flow operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    #[error("match can only be reset once ended (current phase: {0:?})")]
    NotEnded(MatchPhase),

    #[error("only the match authority may {0}")]
    NotAuthority(&'static str),
}

/// Lifecycle of one match.
pub struct MatchStateMachine {
    config: MatchConfig,
    role: Role,
    local_side: Side,
    state: MatchState,
    countdown: Option<CountdownProgress>,
    pending_report: Option<PendingReport>,
    /// Time left to receive the submission acknowledgement.
    awaiting_ack: Option<Countdown>,
    submission_timed_out: bool,
    params: Option<MatchParams>,
    reporter: Option<Box<dyn ResultReporter>>,
    wall_clock: Box<dyn WallClock>,
}

impl MatchStateMachine {
    pub fn new(config: MatchConfig, role: Role, local_side: Side) -> Self {
        Self {
            state: MatchState::new(config.duration_secs),
            config,
            role,
            local_side,
            countdown: None,
            pending_report: None,
            awaiting_ack: None,
            submission_timed_out: false,
            params: None,
            reporter: None,
            wall_clock: Box::new(SystemWallClock),
        }
    }

    pub fn with_params(mut self, params: MatchParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn ResultReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn with_wall_clock(mut self, wall_clock: Box<dyn WallClock>) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn local_side(&self) -> Side {
        self.local_side
    }

    pub fn params(&self) -> Option<&MatchParams> {
        self.params.as_ref()
    }

    /// Play is running: Active and not yet ended.
    pub fn is_active(&self) -> bool {
        self.state.phase == MatchPhase::Active && !self.state.ended
    }

    /// True once the acknowledgement wait expired without a reply.
    pub fn submission_timed_out(&self) -> bool {
        self.submission_timed_out
    }

    pub fn awaiting_acknowledgement(&self) -> bool {
        self.awaiting_ack.is_some()
    }

    /// Scores as (local, opponent).
    pub fn local_scores(&self) -> (u32, u32) {
        (
            self.state.score(self.local_side),
            self.state.score(self.local_side.opponent()),
        )
    }

    pub fn replica(&self) -> MatchReplica {
        self.state.replica()
    }

    /// Begin the 3-2-1-Go sequence. The first beat is emitted immediately.
    pub fn start_countdown(&mut self, events: &mut Vec<DuelEvent>) -> bool {
        if !self.is_authority("start the countdown") {
            return false;
        }
        if self.state.phase != MatchPhase::Countdown || self.state.ended || self.countdown.is_some() {
            debug!(phase = ?self.state.phase, "Countdown already started, ignoring");
            return false;
        }

        self.countdown = Some(CountdownProgress {
            beat_index: 0,
            since_beat_secs: 0.0,
        });
        events.push(DuelEvent::CountdownBeat {
            beat: CountdownBeat::SEQUENCE[0],
        });
        info!(beat_secs = self.config.countdown_beat_secs, "Countdown started");
        true
    }

    /// Advance countdown, match clock, the delayed report and the
    /// acknowledgement timeout by `dt` seconds.
    pub fn tick(&mut self, dt: f64, events: &mut Vec<DuelEvent>) {
        self.advance_report_timers(dt, events);

        if self.role == Role::Observer {
            self.refresh_observer_clock();
            return;
        }

        let was_active = self.is_active();
        self.advance_countdown(dt, events);

        if was_active {
            self.advance_clock(dt);
            if self.state.remaining_time_secs <= 0.0 {
                self.end_match(EndReason::Timer, events);
            }
        }
    }

    /// Add `delta` hits to `side`. Ignored unless the match is running.
    pub fn record_score(&mut self, side: Side, delta: u32, events: &mut Vec<DuelEvent>) -> bool {
        if !self.is_authority("record a score") {
            return false;
        }
        if !self.is_active() {
            debug!(?side, phase = ?self.state.phase, "Score outside active play, ignoring");
            return false;
        }
        if delta == 0 {
            return false;
        }

        let score = self.state.score_mut(side);
        *score = score.saturating_add(delta);
        let value = *score;
        events.push(DuelEvent::ScoreChanged { side, value });
        debug!(?side, value, "Score recorded");

        if self.config.score_limit.is_some_and(|limit| value >= limit) {
            info!(?side, value, "Score limit reached");
            self.end_match(EndReason::ScoreLimit, events);
        }
        true
    }

    /// End active play and resolve the outcome from the scores.
    /// Repeated calls are no-ops.
    pub fn end_match(&mut self, reason: EndReason, events: &mut Vec<DuelEvent>) -> bool {
        if !self.is_authority("end the match") {
            return false;
        }
        if self.state.ended {
            debug!(?reason, "Match already ended, ignoring");
            return false;
        }
        if self.state.phase != MatchPhase::Active {
            debug!(?reason, phase = ?self.state.phase, "End requested outside active play, ignoring");
            return false;
        }

        let (local, opponent) = self.local_scores();
        let outcome = Outcome::from_scores(local, opponent);
        let delay = self.config.result_report_delay_secs;
        self.conclude(outcome, reason, delay, false, events);
        true
    }

    /// Short-circuit the match with an explicit outcome (forfeit or disconnect).
    ///
    /// Resolves the local outcome only, so observers may call it too. The
    /// report follows after `forfeit_report_delay_secs`; with `teardown` set a
    /// `SessionTeardown` event follows the report.
    pub fn force_end(
        &mut self,
        outcome: Outcome,
        teardown: bool,
        events: &mut Vec<DuelEvent>,
    ) -> bool {
        if outcome == Outcome::Undetermined {
            warn!("Forced end needs a decided outcome, ignoring");
            return false;
        }
        if self.state.ended {
            debug!(?outcome, "Match already ended, ignoring forced end");
            return false;
        }

        self.countdown = None;
        let delay = self.config.forfeit_report_delay_secs;
        self.conclude(outcome, EndReason::Forfeit, delay, teardown, events);
        true
    }

    /// Hand the result to the platform. Runs at most once per match.
    pub fn report_result(
        &mut self,
        outcome: Outcome,
        local_score: u32,
        opponent_score: u32,
        events: &mut Vec<DuelEvent>,
    ) -> bool {
        if self.state.result_reported {
            debug!(?outcome, "Result already reported, ignoring");
            return false;
        }
        self.state.result_reported = true;

        events.push(DuelEvent::MatchResult {
            outcome,
            local_score,
            opponent_score,
        });

        let Some(reporter) = self.reporter.as_mut() else {
            warn!(?outcome, "No result reporter attached, result not submitted");
            return true;
        };

        let submitted = build_report(self.params.as_ref(), outcome, local_score, opponent_score)
            .and_then(|report| reporter.report_result(&report));
        match submitted {
            Ok(()) => {
                info!(?outcome, local_score, opponent_score, "Match result submitted");
                self.awaiting_ack = Some(Countdown::new(self.config.submit_timeout_secs));
            }
            Err(err) => warn!(%err, "Failed to submit match result"),
        }
        true
    }

    /// The platform confirmed the submission.
    pub fn acknowledge_submission(&mut self) {
        if self.awaiting_ack.take().is_some() {
            info!("Match result acknowledged");
        } else {
            debug!("Unexpected submission acknowledgement");
        }
    }

    /// Forward an abort notice to the platform.
    pub fn report_abort(&mut self, code: AbortCode, detail: &str) {
        let abort = MatchAbort::new(code, detail);
        warn!(?code, message = %abort.message, "Match aborted");

        let Some(reporter) = self.reporter.as_mut() else {
            warn!(?code, "No result reporter attached, abort not submitted");
            return;
        };
        if let Err(err) = reporter.report_abort(&abort) {
            warn!(%err, "Failed to submit abort");
        }
    }

    /// Return an ended match to its initial state.
    ///
    /// A result still waiting out its presentation delay is reported first.
    pub fn reset(&mut self, events: &mut Vec<DuelEvent>) -> Result<(), MatchError> {
        if self.role != Role::Authority {
            return Err(MatchError::NotAuthority("reset the match"));
        }
        if self.state.phase != MatchPhase::Ended {
            return Err(MatchError::NotEnded(self.state.phase));
        }

        if let Some(pending) = self.pending_report.take() {
            debug!(outcome = ?pending.outcome, "Reporting pending result before reset");
            self.send_pending(pending, events);
        }

        self.state = MatchState::new(self.config.duration_secs);
        self.countdown = None;
        self.awaiting_ack = None;
        self.submission_timed_out = false;
        info!("Match reset");
        Ok(())
    }

    /// Follow authoritative state. Ignored on the authority itself.
    ///
    /// Scores and phase only move forward. A replicated `Ended` resolves the
    /// local outcome from the replicated scores.
    pub fn apply_replica(&mut self, replica: MatchReplica, events: &mut Vec<DuelEvent>) {
        if self.role == Role::Authority {
            debug!("Authority ignores replicated state");
            return;
        }
        if self.state.ended {
            return;
        }

        for (side, value) in [(Side::Red, replica.red_score), (Side::Blue, replica.blue_score)] {
            let score = self.state.score_mut(side);
            if value > *score {
                *score = value;
                events.push(DuelEvent::ScoreChanged { side, value });
            } else if value < *score {
                warn!(?side, value, current = *score, "Replicated score went backwards, ignoring");
            }
        }

        self.state.end_at_unix_secs = replica.end_at_unix_secs;
        self.state.remaining_time_secs = replica.remaining_time_secs.max(0.0);

        if phase_rank(replica.phase) <= phase_rank(self.state.phase) {
            return;
        }
        match replica.phase {
            MatchPhase::Ended => {
                let (local, opponent) = self.local_scores();
                let reason = replica.end_reason.unwrap_or(EndReason::Timer);
                let delay = self.config.result_report_delay_secs;
                self.conclude(Outcome::from_scores(local, opponent), reason, delay, false, events);
            }
            phase => {
                self.state.phase = phase;
                events.push(DuelEvent::PhaseChanged { phase });
            }
        }
    }

    fn is_authority(&self, action: &'static str) -> bool {
        if self.role == Role::Authority {
            return true;
        }
        debug!(action, "Observer cannot mutate match state");
        false
    }

    fn advance_countdown(&mut self, dt: f64, events: &mut Vec<DuelEvent>) {
        if self.state.phase != MatchPhase::Countdown {
            return;
        }
        let Some(mut progress) = self.countdown else {
            return;
        };

        progress.since_beat_secs += dt;
        let beat_secs = self.config.countdown_beat_secs;
        while progress.since_beat_secs + TIME_EPSILON >= beat_secs
            && progress.beat_index + 1 < CountdownBeat::SEQUENCE.len()
        {
            progress.since_beat_secs -= beat_secs;
            progress.beat_index += 1;
            let beat = CountdownBeat::SEQUENCE[progress.beat_index];
            events.push(DuelEvent::CountdownBeat { beat });
            if beat == CountdownBeat::Go {
                self.countdown = None;
                self.begin_active(events);
                return;
            }
        }
        self.countdown = Some(progress);
    }

    fn begin_active(&mut self, events: &mut Vec<DuelEvent>) {
        self.state.phase = MatchPhase::Active;
        self.state.remaining_time_secs = self.config.duration_secs;
        if self.config.networked {
            self.state.end_at_unix_secs =
                Some(self.wall_clock.now_unix_secs() + self.config.duration_secs);
        }
        events.push(DuelEvent::PhaseChanged {
            phase: MatchPhase::Active,
        });
        info!(
            duration_secs = self.config.duration_secs,
            networked = self.config.networked,
            "Match started"
        );
    }

    fn advance_clock(&mut self, dt: f64) {
        let remaining = match self.state.end_at_unix_secs {
            Some(end_at) => end_at - self.wall_clock.now_unix_secs(),
            None => self.state.remaining_time_secs - dt,
        };
        self.state.remaining_time_secs = if remaining <= TIME_EPSILON {
            0.0
        } else {
            remaining
        };
    }

    /// Observers show the shared deadline without ever acting on it.
    fn refresh_observer_clock(&mut self) {
        if self.state.phase != MatchPhase::Active {
            return;
        }
        if let Some(end_at) = self.state.end_at_unix_secs {
            self.state.remaining_time_secs = (end_at - self.wall_clock.now_unix_secs()).max(0.0);
        }
    }

    fn conclude(
        &mut self,
        outcome: Outcome,
        reason: EndReason,
        report_delay_secs: f64,
        teardown: bool,
        events: &mut Vec<DuelEvent>,
    ) {
        let (local_score, opponent_score) = self.local_scores();
        self.state.ended = true;
        self.state.phase = MatchPhase::Ended;
        self.state.outcome = outcome;
        self.state.end_reason = Some(reason);

        events.push(DuelEvent::PhaseChanged {
            phase: MatchPhase::Ended,
        });
        events.push(DuelEvent::ShowResult {
            outcome,
            local_score,
            opponent_score,
        });
        self.pending_report = Some(PendingReport {
            outcome,
            local_score,
            opponent_score,
            delay: Countdown::new(report_delay_secs),
            teardown,
        });
        info!(?outcome, ?reason, local_score, opponent_score, "Match ended");
    }

    fn advance_report_timers(&mut self, dt: f64, events: &mut Vec<DuelEvent>) {
        if let Some(timer) = self.awaiting_ack.as_mut() {
            if timer.tick(dt) {
                self.awaiting_ack = None;
                self.submission_timed_out = true;
                warn!(
                    timeout_secs = self.config.submit_timeout_secs,
                    "No acknowledgement for submitted result, giving up"
                );
            }
        }

        if let Some(mut pending) = self.pending_report.take() {
            if pending.delay.tick(dt) {
                self.send_pending(pending, events);
            } else {
                self.pending_report = Some(pending);
            }
        }
    }

    fn send_pending(&mut self, pending: PendingReport, events: &mut Vec<DuelEvent>) {
        self.report_result(
            pending.outcome,
            pending.local_score,
            pending.opponent_score,
            events,
        );
        if pending.teardown {
            events.push(DuelEvent::SessionTeardown);
        }
    }
}
