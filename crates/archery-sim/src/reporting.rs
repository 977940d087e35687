//! Result reporting helpers.
//!
//! Builds platform payloads from the match parameters and provides an
//! in-memory `ResultReporter` for headless runs.

use std::cell::RefCell;
use std::rc::Rc;

use archery_core::enums::Outcome;
use archery_core::events::{MatchAbort, MatchReport};
use archery_core::params::MatchParams;
use archery_core::ports::{ReportError, ResultReporter};

/// Assemble the result payload. Fails when the platform never sent parameters.
pub fn build_report(
    params: Option<&MatchParams>,
    outcome: Outcome,
    score: u32,
    opponent_score: u32,
) -> Result<MatchReport, ReportError> {
    let params = params.ok_or(ReportError::MissingParams)?;
    Ok(MatchReport {
        match_id: params.match_id.clone(),
        player_id: params.player_id.clone(),
        opponent_id: params.opponent_id.clone(),
        outcome,
        score,
        opponent_score,
        average_ping: 0,
        region: params.region.clone(),
    })
}

/// Everything a `RecordingReporter` has received, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLog {
    pub results: Vec<MatchReport>,
    pub aborts: Vec<MatchAbort>,
}

/// Reporter that keeps every payload in a shared log.
///
/// Clones share the same log, so a caller can keep a handle after boxing one
/// into the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    log: Rc<RefCell<ReportLog>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> ReportLog {
        self.log.borrow().clone()
    }
}

impl ResultReporter for RecordingReporter {
    fn report_result(&mut self, report: &MatchReport) -> Result<(), ReportError> {
        self.log.borrow_mut().results.push(report.clone());
        Ok(())
    }

    fn report_abort(&mut self, abort: &MatchAbort) -> Result<(), ReportError> {
        self.log.borrow_mut().aborts.push(abort.clone());
        Ok(())
    }
}
