// src/session.rs

//! One client's sorting session.
//!
//! A `Session` owns the array, the work left over from earlier step requests,
//! and the `SessionLock` that decides which run is current. Runs are started
//! with `begin_step`/`begin_completion`, driven with `advance`, and closed with
//! `finish`, which writes their outstanding work back. `step` and
//! `run_to_completion` wrap that cycle in a borrowing iterator.

use crate::config::Config;
use crate::controls::{interval_from_secs, validate_element_count, validate_shuffle_strength};
use crate::controls::{ControlParams, SortParams};
use crate::coordinator::{Frame, FrameKind, Outcome, Run, RunMode, StepCoordinator};
use crate::error::{EngineError, SessionError};
use crate::permutation::plan_shuffle;
use crate::sorter::{Algorithm, PendingWork};
use crate::state::{regenerate, ArrayState, Snapshot};
use log::{debug, error, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod lock;

pub use lock::{SessionLock, StopHandle, START_EPOCH};

/// Informational results that are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Run to completion was skipped: the array is sorted and the pivot
    /// policy would only disturb it.
    AlreadySorted,
}

/// Result of asking for a run to completion.
#[derive(Debug)]
pub enum Launch<T> {
    Running(T),
    Skipped(Notice),
}

/// Summary of a closed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub epoch: i32,
    pub algorithm: Algorithm,
    pub outcome: Outcome,
    pub frames: u64,
    /// Whether work was left for a later step request.
    pub pending: bool,
}

pub struct Session {
    state: ArrayState,
    pending: Option<PendingWork>,
    lock: Arc<SessionLock>,
    rng: StdRng,
    max_elements: usize,
    shuffle_delay: Duration,
    /// Bumped by every run start; only the newest run may write pending work.
    generation: u64,
    in_flight: Option<u64>,
}

impl Session {
    /// A session over `config.session.default_elements` random values.
    pub fn new(config: &Config) -> Self {
        Session::from_rng(config, StdRng::from_entropy())
    }

    /// Like `new`, with a deterministic random stream.
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Session::from_rng(config, StdRng::seed_from_u64(seed))
    }

    /// A session over the given values, using default configuration.
    pub fn with_values(values: Vec<i32>) -> Self {
        let mut session = Session::from_rng(&Config::default(), StdRng::from_entropy());
        session.state = ArrayState::new(values);
        session
    }

    fn from_rng(config: &Config, mut rng: StdRng) -> Self {
        let mut values = Vec::new();
        regenerate(&mut values, config.session.default_elements, &mut rng);
        let shuffle_delay =
            interval_from_secs(config.pacing.base_interval_secs).unwrap_or_else(|e| {
                warn!("Session: {}; shuffling without delay", e);
                Duration::ZERO
            });
        Session {
            state: ArrayState::new(values),
            pending: None,
            lock: Arc::new(SessionLock::new()),
            rng,
            max_elements: config.session.max_elements,
            shuffle_delay,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &ArrayState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn pending(&self) -> Option<&PendingWork> {
        self.pending.as_ref()
    }

    pub fn lock(&self) -> &Arc<SessionLock> {
        &self.lock
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(self.lock.clone())
    }

    pub fn is_active(&self) -> bool {
        self.lock.is_active()
    }

    /// Starts a step-mode run of `params.steps` milestones.
    pub fn begin_step(&mut self, params: &ControlParams) -> Result<Run, SessionError> {
        let params = params.validate()?;
        Ok(self.begin(&params, RunMode::Step))
    }

    /// Starts a run to completion, unless the array is already sorted and a
    /// non-default pivot would only scramble it.
    pub fn begin_completion(&mut self, params: &ControlParams) -> Result<Launch<Run>, SessionError> {
        let params = params.validate()?;
        if params.algorithm == Algorithm::QuickSort
            && !params.pivot.is_default()
            && self.state.is_sorted()
        {
            info!("Session: array already sorted; skipping run with {:?} pivot", params.pivot);
            return Ok(Launch::Skipped(Notice::AlreadySorted));
        }
        Ok(Launch::Running(self.begin(&params, RunMode::Completion)))
    }

    fn begin(&mut self, params: &SortParams, mode: RunMode) -> Run {
        if self.in_flight.is_some() {
            // The unfinished run may have moved elements its queue no longer describes.
            warn!("Session: starting a run while another is unfinished; dropping pending work");
            self.pending = None;
        }
        let epoch = self.lock.acquire();
        self.generation += 1;
        self.in_flight = Some(self.generation);

        let resume = self
            .pending
            .take()
            .and_then(|work| work.take_for(params.algorithm));
        debug!(
            "Session: epoch {} starts {:?} {:?}, resuming {} job(s)",
            epoch,
            params.algorithm,
            mode,
            resume.as_ref().map_or(0, |jobs| jobs.len())
        );

        let factories = params.algorithm.factories();
        let factory = match mode {
            RunMode::Step => factories.step,
            RunMode::Completion => factories.complete,
        };
        self.state.animate_swaps = params.pacing.animates();
        let stepper = factory(&self.state, resume, params);
        let coordinator = StepCoordinator::new(self.lock.clone(), epoch, params);
        Run::new(stepper, coordinator, mode, self.generation)
    }

    /// The next frame of `run`, or `None` once it is over.
    pub fn advance(&mut self, run: &mut Run) -> Result<Option<Frame>, EngineError> {
        run.next_frame(&mut self.state)
    }

    /// Closes `run`, keeps its outstanding work for a later step and releases
    /// its epoch.
    pub fn finish(&mut self, run: Run) -> RunReport {
        let epoch = run.epoch();
        let algorithm = run.algorithm();
        let frames = run.emitted();
        let generation = run.generation();
        let (outcome, jobs) = run.into_pending();

        let mut pending = false;
        if self.in_flight == Some(generation) {
            self.in_flight = None;
            self.pending = PendingWork::from_jobs(algorithm, jobs);
            pending = self.pending.is_some();
        } else {
            debug!("Session: discarding work of superseded epoch {}", epoch);
        }
        self.lock.release(epoch);
        info!(
            "Session: epoch {} closed ({:?}, {} frame(s), pending: {})",
            epoch, outcome, frames, pending
        );
        RunReport {
            epoch,
            algorithm,
            outcome,
            frames,
            pending,
        }
    }

    /// Runs up to `params.steps` milestones, yielding frames as they appear.
    pub fn step(&mut self, params: &ControlParams) -> Result<Frames<'_>, SessionError> {
        let run = self.begin_step(params)?;
        Ok(Frames::new(self, run))
    }

    /// Sorts the whole array, yielding frames as they appear.
    pub fn run_to_completion(
        &mut self,
        params: &ControlParams,
    ) -> Result<Launch<Frames<'_>>, SessionError> {
        match self.begin_completion(params)? {
            Launch::Running(run) => Ok(Launch::Running(Frames::new(self, run))),
            Launch::Skipped(notice) => Ok(Launch::Skipped(notice)),
        }
    }

    /// Ends the active run at its next unit boundary without starting another.
    pub fn stop(&self) {
        let id = self.lock.stop();
        info!("Session: stopped (epoch now {})", id);
    }

    /// Replaces the array with `count` fresh random values.
    pub fn reset(&mut self, count: usize) -> Result<Snapshot, SessionError> {
        if self.lock.is_active() {
            warn!("Session: reset rejected while a run is active");
            return Err(SessionError::Busy);
        }
        let count = validate_element_count(count, self.max_elements)?;
        regenerate(&mut self.state.values, count, &mut self.rng);
        self.state.clear_annotations();
        self.discard_work();
        info!("Session: reset to {} element(s)", count);
        Ok(self.state.snapshot())
    }

    /// Shuffles with probability `strength` per position and returns the
    /// relocation frame followed by the result frame.
    pub fn shuffle(&mut self, strength: f64) -> Result<Vec<Frame>, SessionError> {
        if self.lock.is_active() {
            warn!("Session: shuffle rejected while a run is active");
            return Err(SessionError::Busy);
        }
        let strength = validate_shuffle_strength(strength)?;
        let epoch = self.lock.acquire();

        let plan = plan_shuffle(&self.state.values, strength, &mut self.rng);
        let relocations = plan.reduced();
        debug!(
            "Session: shuffle at strength {} relocates {} element(s)",
            strength,
            relocations.len()
        );

        self.state.clear_annotations();
        self.state.mark_bulk(relocations);
        let intent = self.shuffle_frame(epoch, 0);

        self.state.values = plan.shuffled;
        self.state.clear_annotations();
        let result = self.shuffle_frame(epoch, 1);

        self.discard_work();
        self.lock.release(epoch);
        Ok(vec![intent, result])
    }

    /// Forgets resume offsets once they no longer describe the array. A
    /// stopped run that is finished later is treated as superseded.
    fn discard_work(&mut self) {
        self.pending = None;
        self.in_flight = None;
    }

    fn shuffle_frame(&mut self, epoch: i32, sequence: u64) -> Frame {
        self.state.pending_delay = self.shuffle_delay.as_secs_f64();
        Frame {
            epoch,
            sequence,
            kind: FrameKind::Unit,
            delay: self.shuffle_delay,
            snapshot: self.state.snapshot(),
        }
    }
}

/// Frames of one run, borrowed from its session.
///
/// Dropping the iterator closes the run, so abandoning it part-way behaves like
/// a stop: outstanding work is kept for the next step request.
pub struct Frames<'s> {
    session: &'s mut Session,
    run: Option<Run>,
    report: RunReport,
    error: Option<EngineError>,
}

impl<'s> Frames<'s> {
    fn new(session: &'s mut Session, run: Run) -> Self {
        let report = RunReport {
            epoch: run.epoch(),
            algorithm: run.algorithm(),
            outcome: Outcome::Cancelled,
            frames: 0,
            pending: false,
        };
        Frames {
            session,
            run: Some(run),
            report,
            error: None,
        }
    }

    pub fn epoch(&self) -> i32 {
        self.report.epoch
    }

    /// A handle that stops this run from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.session.stop_handle()
    }

    /// Runs the remaining units, discarding their frames, and reports.
    pub fn drain(mut self) -> Result<RunReport, EngineError> {
        for _ in self.by_ref() {}
        self.finish()
    }

    /// Closes the run where it stands and reports how it ended.
    pub fn finish(mut self) -> Result<RunReport, EngineError> {
        self.close();
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self.report),
        }
    }

    fn close(&mut self) {
        if let Some(run) = self.run.take() {
            self.report = self.session.finish(run);
        }
    }
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let run = self.run.as_mut()?;
        match self.session.advance(run) {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                error!("Session: {}", e);
                self.error = Some(e);
                self.close();
                None
            }
        }
    }
}

impl Drop for Frames<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
