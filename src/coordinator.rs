// src/coordinator.rs

//! Drives a stepper unit by unit and decides which units the consumer sees.
//!
//! The coordinator re-checks the session epoch before every unit, so a
//! superseded or stopped run ends at the next unit boundary without an error.
//! Each materialized frame carries a pacing delay that the consumer is expected
//! to honor before asking for the next one.

use crate::controls::{SortParams, Visibility};
use crate::error::EngineError;
use crate::session::SessionLock;
use crate::sorter::{Advance, Algorithm, Finish, JobQueue, Stepper};
use crate::state::{ArrayState, Snapshot};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Converts swap distance into display delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    base: Duration,
    animate: bool,
}

impl Pacing {
    pub fn new(base: Duration, animate: bool) -> Self {
        Pacing { base, animate }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn animates(&self) -> bool {
        self.animate
    }

    /// `base * log2(2 + distance)` while animating swaps, `base` otherwise.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn delay_for(&self, distance: Option<usize>) -> Duration {
        match (self.animate, distance) {
            (true, Some(distance)) => {
                let factor = (distance as f64 + 2.0).log2();
                Duration::try_from_secs_f64(self.base.as_secs_f64() * factor)
                    .unwrap_or(Duration::MAX)
            }
            _ => self.base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// An ordinary comparison or swap.
    Unit,
    /// A partition, pass or position was completed.
    Milestone,
    /// Run to completion finished; annotations are cleared.
    Final,
}

/// One emitted snapshot plus the delay to hold it for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub epoch: i32,
    /// Position of this frame within its run, starting at zero.
    pub sequence: u64,
    pub kind: FrameKind,
    pub delay: Duration,
    pub snapshot: Snapshot,
}

/// Why a run stopped producing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Finished(Finish),
    /// The epoch was superseded or stopped.
    Cancelled,
}

/// Per-run driver holding the epoch it is authorized under.
pub struct StepCoordinator {
    lock: Arc<SessionLock>,
    epoch: i32,
    pacing: Pacing,
    visibility: Visibility,
    sequence: u64,
    outcome: Option<Outcome>,
}

impl StepCoordinator {
    pub fn new(lock: Arc<SessionLock>, epoch: i32, params: &SortParams) -> Self {
        StepCoordinator {
            lock,
            epoch,
            pacing: params.pacing,
            visibility: params.visibility,
            sequence: 0,
            outcome: None,
        }
    }

    pub fn epoch(&self) -> i32 {
        self.epoch
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Frames emitted so far.
    pub fn emitted(&self) -> u64 {
        self.sequence
    }

    /// Whether a unit that just ran should become a frame.
    pub fn materializes(&self, advance: Advance, state: &ArrayState) -> bool {
        let milestone = matches!(advance, Advance::Milestone(_));
        if !self.visibility.contains(Visibility::QUERIES) {
            return milestone;
        }
        milestone
            || (state.is_swapping && self.visibility.contains(Visibility::SWAPS))
            || self.visibility.contains(Visibility::COMPARISONS)
    }

    /// Advances `stepper` until a unit materializes a frame.
    ///
    /// Returns `Ok(None)` once the run is over; `outcome()` says why.
    pub fn run_step(
        &mut self,
        stepper: &mut dyn Stepper,
        state: &mut ArrayState,
    ) -> Result<Option<Frame>, EngineError> {
        if self.outcome.is_some() {
            return Ok(None);
        }
        loop {
            if !self.lock.is_owner(self.epoch) {
                debug!(
                    "StepCoordinator: epoch {} superseded after {} frame(s)",
                    self.epoch, self.sequence
                );
                self.outcome = Some(Outcome::Cancelled);
                return Ok(None);
            }

            let advance = stepper.advance(state)?;
            trace!("StepCoordinator: {:?} -> {:?}", stepper.algorithm(), advance);

            let kind = match advance {
                Advance::Finished(how) => {
                    self.outcome = Some(Outcome::Finished(how));
                    return Ok(None);
                }
                Advance::Milestone(_) => FrameKind::Milestone,
                Advance::Continue => FrameKind::Unit,
            };
            if self.materializes(advance, state) {
                let delay = self.pacing.delay_for(state.swap_distance());
                return Ok(Some(self.emit(state, kind, delay)));
            }
        }
    }

    fn emit(&mut self, state: &mut ArrayState, kind: FrameKind, delay: Duration) -> Frame {
        state.pending_delay = delay.as_secs_f64();
        let frame = Frame {
            epoch: self.epoch,
            sequence: self.sequence,
            kind,
            delay,
            snapshot: state.snapshot(),
        };
        self.sequence += 1;
        frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Stops after the requested number of milestones.
    Step,
    /// Runs until sorted and closes with a `FrameKind::Final` frame.
    Completion,
}

/// An in-progress run: the stepper, the coordinator driving it, and its mode.
///
/// A `Run` does not borrow the array. The `Session` lends its state to
/// `next_frame` for the duration of one call.
pub struct Run {
    stepper: Box<dyn Stepper>,
    coordinator: StepCoordinator,
    mode: RunMode,
    generation: u64,
    closed: bool,
}

impl Run {
    pub(crate) fn new(
        stepper: Box<dyn Stepper>,
        coordinator: StepCoordinator,
        mode: RunMode,
        generation: u64,
    ) -> Self {
        Run {
            stepper,
            coordinator,
            mode,
            generation,
            closed: false,
        }
    }

    pub fn epoch(&self) -> i32 {
        self.coordinator.epoch()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.stepper.algorithm()
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.coordinator.outcome()
    }

    pub fn emitted(&self) -> u64 {
        self.coordinator.emitted()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// The next frame of this run, or `None` once it is over.
    pub fn next_frame(&mut self, state: &mut ArrayState) -> Result<Option<Frame>, EngineError> {
        if let Some(frame) = self.coordinator.run_step(self.stepper.as_mut(), state)? {
            return Ok(Some(frame));
        }
        if self.closed {
            return Ok(None);
        }
        self.closed = true;
        match (self.mode, self.coordinator.outcome()) {
            (RunMode::Completion, Some(Outcome::Finished(Finish::Sorted))) => {
                state.clear_annotations();
                Ok(Some(self.coordinator.emit(state, FrameKind::Final, Duration::ZERO)))
            }
            _ => Ok(None),
        }
    }

    /// Ends the run, yielding the work it leaves behind.
    pub(crate) fn into_pending(self) -> (Outcome, JobQueue) {
        let outcome = self.coordinator.outcome().unwrap_or(Outcome::Cancelled);
        (outcome, self.stepper.into_pending())
    }
}
