// src/sorter/selection.rs

//! Selection sort: scan for the minimum, then at most one swap per position.

use super::{Advance, Algorithm, Budget, Finish, Job, JobQueue, Milestone, Stepper};
use crate::controls::SortParams;
use crate::error::EngineError;
use crate::state::ArrayState;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Comparing `scan` against the running minimum.
    Scanning,
    /// Moving the minimum into `position`.
    Exchange,
}

pub struct SelectionSort {
    len: usize,
    end: usize,
    position: usize,
    min: usize,
    scan: usize,
    phase: Phase,
    budget: Budget,
    finished: bool,
}

impl SelectionSort {
    pub fn new(len: usize, pending: Option<JobQueue>, budget: Budget) -> Self {
        let (start, end) = match pending.and_then(|jobs| jobs.peek().copied()) {
            Some(job) if job.start < len => (job.start, job.end.min(len)),
            Some(job) => {
                warn!(
                    "SelectionSort: resume offset {} is past the end of an array of length {}",
                    job.start, len
                );
                (len, len)
            }
            None => (0, len),
        };
        SelectionSort {
            len,
            end,
            position: start,
            min: start,
            scan: start,
            phase: Phase::Idle,
            budget,
            finished: false,
        }
    }

    /// Settles `position` and moves on to the next one.
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
        debug!("SelectionSort: finished ({:?}) at position {}", how, self.position);
        Advance::Finished(how)
    }
}

impl Stepper for SelectionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SelectionSort
    }

    fn advance(&mut self, state: &mut ArrayState) -> Result<Advance, EngineError> {
        if self.finished {
            return Err(EngineError::StepperExhausted(Algorithm::SelectionSort));
        }

        loop {
            match self.phase {
                Phase::Idle => {
                    if self.position + 1 >= self.end {
                        return Ok(self.finish(state, Finish::Sorted));
                    }
                    if self.budget.is_spent() {
                        return Ok(self.finish(state, Finish::BudgetSpent));
                    }
                    self.min = self.position;
                    self.scan = self.position + 1;
                    state.pivot_index = None;
                    state.set_range(self.position, self.len - 1, false);
                    self.phase = Phase::Scanning;
                }
                Phase::Scanning => {
                    let j = self.scan;
                    state.mark_pair(self.min, j, false);
                    if state.values[j] < state.values[self.min] {
                        self.min = j;
                    }
                    self.scan += 1;
                    if self.scan < self.len {
                        return Ok(Advance::Continue);
                    }
                    if self.min != self.position {
                        self.phase = Phase::Exchange;
                        return Ok(Advance::Continue);
                    }
                    // Already in place: the last comparison settles it.
                    return Ok(self.finalize());
                }
                Phase::Exchange => {
                    state.swap(self.position, self.min);
                    state.mark_pair(self.position, self.min, true);
                    return Ok(self.finalize());
                }
            }
        }
    }

    fn into_pending(self: Box<Self>) -> JobQueue {
        // An unfinished scan restarts at its position; the prefix is still final.
        if self.position + 1 < self.end {
            JobQueue::single(Job::new(self.position, self.end))
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
    Box::new(SelectionSort::new(
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
    Box::new(SelectionSort::new(state.len(), pending, Budget::Unbounded))
}
