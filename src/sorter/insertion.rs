// src/sorter/insertion.rs

//! Insertion sort, one comparison or shift per unit.

use super::{Advance, Algorithm, Budget, Finish, Job, JobQueue, Milestone, Stepper};
use crate::controls::SortParams;
use crate::error::EngineError;
use crate::state::ArrayState;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// The element being inserted currently sits at `key`.
    Shifting,
}

pub struct InsertionSort {
    end: usize,
    position: usize,
    key: usize,
    phase: Phase,
    budget: Budget,
    finished: bool,
}

impl InsertionSort {
    pub fn new(len: usize, pending: Option<JobQueue>, budget: Budget) -> Self {
        let (start, end) = match pending.and_then(|jobs| jobs.peek().copied()) {
            Some(job) if job.start < len => (job.start, job.end.min(len)),
            Some(job) => {
                warn!(
                    "InsertionSort: resume offset {} is past the end of an array of length {}",
                    job.start, len
                );
                (len, len)
            }
            None => (0, len),
        };
        let position = start.max(1);
        InsertionSort {
            end,
            position,
            key: position,
            phase: Phase::Idle,
            budget,
            finished: false,
        }
    }

    /// First outer index whose element is not yet known to be in the sorted prefix.
    fn resume_offset(&self) -> usize {
        match self.phase {
            Phase::Idle => self.position,
            // Everything left of the element in flight is sorted.
            Phase::Shifting => self.key,
        }
    }

    fn finalize(&mut self) -> Advance {
        let index = self.position;
        self.position += 1;
        self.budget.spend();
        self.phase = Phase::Idle;
        Advance::Milestone(Milestone::PositionFinalized { index })
    }

    fn finish(&mut self, state: &mut ArrayState, how: Finish) -> Advance {
        self.finished = true;
        if how == Finish::Sorted {
            self.position = self.end;
        }
        state.is_swapping = false;
        debug!("InsertionSort: finished ({:?}) at position {}", how, self.position);
        Advance::Finished(how)
    }
}

impl Stepper for InsertionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::InsertionSort
    }

    fn advance(&mut self, state: &mut ArrayState) -> Result<Advance, EngineError> {
        if self.finished {
            return Err(EngineError::StepperExhausted(Algorithm::InsertionSort));
        }

        loop {
            match self.phase {
                Phase::Idle => {
                    if self.position >= self.end {
                        return Ok(self.finish(state, Finish::Sorted));
                    }
                    if self.budget.is_spent() {
                        return Ok(self.finish(state, Finish::BudgetSpent));
                    }
                    self.key = self.position;
                    state.pivot_index = None;
                    state.set_range(0, self.position, false);
                    self.phase = Phase::Shifting;
                }
                Phase::Shifting => {
                    let j = self.key;
                    let greater = state.values[j - 1] > state.values[j];
                    state.mark_pair(j - 1, j, greater);
                    if !greater {
                        return Ok(self.finalize());
                    }
                    state.swap(j - 1, j);
                    self.key -= 1;
                    if self.key == 0 {
                        return Ok(self.finalize());
                    }
                    return Ok(Advance::Continue);
                }
            }
        }
    }

    fn into_pending(self: Box<Self>) -> JobQueue {
        let offset = self.resume_offset();
        if offset < self.end {
            JobQueue::single(Job::new(offset, self.end))
        } else {
            JobQueue::new()
        }
    }
}

pub(crate) fn stepwise(
    state: &ArrayState,
    pending: Option<JobQueue>,
    params: &SortParams,
) -> Box<dyn Stepper> {
    Box::new(InsertionSort::new(
        state.len(),
        pending,
        Budget::Milestones(params.steps),
    ))
}

pub(crate) fn to_completion(
    state: &ArrayState,
    pending: Option<JobQueue>,
    _params: &SortParams,
) -> Box<dyn Stepper> {
    Box::new(InsertionSort::new(state.len(), pending, Budget::Unbounded))
}
