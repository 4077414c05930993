// src/sorter/bubble.rs

//! Bubble sort, one adjacent comparison per unit.

use super::{Advance, Algorithm, Budget, Finish, Job, JobQueue, Milestone, Stepper};
use crate::controls::SortParams;
use crate::error::EngineError;
use crate::state::ArrayState;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Between passes.
    Idle,
    /// Comparing `cursor` with `cursor + 1`.
    Comparing,
}

pub struct BubbleSort {
    len: usize,
    /// Exclusive bound on the outer pass index.
    end: usize,
    pass: usize,
    cursor: usize,
    swaps: usize,
    /// Swaps performed by the most recent completed pass, if one ran.
    last_swaps: Option<usize>,
    phase: Phase,
    budget: Budget,
    finished: bool,
}

impl BubbleSort {
    pub fn new(len: usize, pending: Option<JobQueue>, budget: Budget) -> Self {
        let (start, end) = match pending.and_then(|jobs| jobs.peek().copied()) {
            Some(job) if job.start < len => (job.start, job.end.min(len)),
            Some(job) => {
                warn!(
                    "BubbleSort: resume offset {} is past the end of an array of length {}",
                    job.start, len
                );
                (len, len)
            }
            None => (0, len),
        };
        BubbleSort {
            len,
            end,
            pass: start,
            cursor: 0,
            swaps: 0,
            last_swaps: None,
            phase: Phase::Idle,
            budget,
            finished: false,
        }
    }

    /// Index one past the last element compared in the current pass.
    fn pass_limit(&self) -> usize {
        self.len - 1 - self.pass
    }

    fn finish(&mut self, state: &mut ArrayState, how: Finish) -> Advance {
        self.finished = true;
        if how == Finish::Sorted {
            self.phase = Phase::Idle;
            self.pass = self.end;
        }
        state.is_swapping = false;
        debug!("BubbleSort: finished ({:?}) at pass {}", how, self.pass);
        Advance::Finished(how)
    }
}

impl Stepper for BubbleSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BubbleSort
    }

    fn advance(&mut self, state: &mut ArrayState) -> Result<Advance, EngineError> {
        if self.finished {
            return Err(EngineError::StepperExhausted(Algorithm::BubbleSort));
        }

        loop {
            match self.phase {
                Phase::Idle => {
                    if self.last_swaps == Some(0) || self.pass + 1 >= self.end {
                        return Ok(self.finish(state, Finish::Sorted));
                    }
                    if self.budget.is_spent() {
                        return Ok(self.finish(state, Finish::BudgetSpent));
                    }
                    self.cursor = 0;
                    self.swaps = 0;
                    state.pivot_index = None;
                    state.set_range(0, self.pass_limit(), false);
                    self.phase = Phase::Comparing;
                }
                Phase::Comparing => {
                    let j = self.cursor;
                    let swapped = state.values[j] > state.values[j + 1];
                    if swapped {
                        state.swap(j, j + 1);
                        self.swaps += 1;
                    }
                    state.mark_pair(j, j + 1, swapped);
                    self.cursor += 1;
                    if self.cursor < self.pass_limit() {
                        return Ok(Advance::Continue);
                    }
                    // The last comparison of the pass completes it.
                    let pass = self.pass;
                    self.pass += 1;
                    self.last_swaps = Some(self.swaps);
                    self.budget.spend();
                    self.phase = Phase::Idle;
                    return Ok(Advance::Milestone(Milestone::PassCompleted {
                        pass,
                        swaps: self.swaps,
                    }));
                }
            }
        }
    }

    fn into_pending(self: Box<Self>) -> JobQueue {
        // A pass cut short is simply run again from its start.
        if self.pass + 1 < self.end {
            JobQueue::single(Job::new(self.pass, self.end))
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
    Box::new(BubbleSort::new(
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
    Box::new(BubbleSort::new(state.len(), pending, Budget::Unbounded))
}
