// src/sorter/quick.rs

//! Quicksort with a configurable pivot, driven one unit at a time.
//!
//! `Partition` is a single Lomuto partition over an inclusive range. The chosen
//! pivot is first moved to the end of the range, the range is scanned with a
//! free index, and the pivot is finally swapped into the free slot. The unit
//! that performs that last swap also reports the placement.
//! `QuickSort` pops ranges from a LIFO `JobQueue`, partitions them, and pushes
//! the non-trivial halves back.

use super::{Advance, Algorithm, Budget, Finish, Job, JobQueue, Milestone, Stepper};
use crate::controls::{pivot_index, PivotPolicy, SortParams};
use crate::error::EngineError;
use crate::state::ArrayState;
use log::{debug, trace, warn};
use rand::{rngs::StdRng, SeedableRng};

/// Outcome of one `Partition::advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStep {
    /// The partition yielded at a suspend point.
    Suspended,
    /// The partition is complete; the pivot sits at the given index.
    Placed(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Pick the pivot, showing the move to the end when it is not already there.
    Select,
    /// Move the pivot to the end.
    MovePivot,
    /// Compare the element under the cursor with the pivot.
    Compare,
    /// Act on the last comparison. `takes` means the element belongs left of the pivot.
    Exchange { takes: bool },
    /// Show the intent to drop the pivot into the free slot.
    PlaceIntent,
    /// Swap the pivot into the free slot.
    Place,
}

/// One Lomuto partition over `[start, end]`, suspended between units.
#[derive(Debug, Clone)]
pub struct Partition {
    start: usize,
    end: usize,
    chosen: usize,
    pivot_value: i32,
    free: usize,
    cursor: usize,
    phase: Phase,
}

impl Partition {
    /// Requires `start < end`; callers never enqueue smaller ranges.
    pub fn new(start: usize, end: usize, alpha: f64) -> Self {
        debug_assert!(start < end, "degenerate partition range");
        Partition {
            start,
            end,
            chosen: pivot_index(start, end, alpha),
            pivot_value: 0,
            free: start,
            cursor: start,
            phase: Phase::Select,
        }
    }

    pub fn range(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Runs until the next suspend point or until the pivot is placed.
    pub fn advance(&mut self, state: &mut ArrayState) -> PartitionStep {
        loop {
            match self.phase {
                Phase::Select if self.chosen == self.end => {
                    state.pivot_index = Some(self.end);
                    state.mark_pair(self.end, self.end, false);
                    self.pivot_value = state.values[self.end];
                    self.phase = Phase::Compare;
                    return PartitionStep::Suspended;
                }
                Phase::Select => {
                    state.pivot_index = Some(self.chosen);
                    state.mark_pair(self.chosen, self.end, true);
                    self.phase = Phase::MovePivot;
                    return PartitionStep::Suspended;
                }
                Phase::MovePivot => {
                    state.swap(self.chosen, self.end);
                    state.pivot_index = Some(self.end);
                    state.is_swapping = false;
                    self.pivot_value = state.values[self.end];
                    self.phase = Phase::Compare;
                    return PartitionStep::Suspended;
                }
                Phase::Compare => {
                    if self.cursor == self.end {
                        // Nothing to show when the pivot already sits in the free slot.
                        self.phase = if self.free == self.end {
                            Phase::Place
                        } else {
                            Phase::PlaceIntent
                        };
                        continue;
                    }
                    let takes = state.values[self.cursor] <= self.pivot_value;
                    let moves = takes && self.cursor != self.free;
                    state.mark_pair(self.cursor, self.free, moves);
                    self.phase = Phase::Exchange { takes };
                    return PartitionStep::Suspended;
                }
                Phase::Exchange { takes } => {
                    let i = self.cursor;
                    self.cursor += 1;
                    self.phase = Phase::Compare;
                    if !takes {
                        continue;
                    }
                    let free = self.free;
                    self.free += 1;
                    if i != free {
                        state.swap(i, free);
                        state.is_swapping = false;
                        return PartitionStep::Suspended;
                    }
                }
                Phase::PlaceIntent => {
                    state.mark_pair(self.end, self.free, true);
                    self.phase = Phase::Place;
                    return PartitionStep::Suspended;
                }
                Phase::Place => {
                    state.swap(self.end, self.free);
                    state.mark_pair(self.end, self.free, false);
                    state.pivot_index = Some(self.free);
                    return PartitionStep::Placed(self.free);
                }
            }
        }
    }
}

/// Depth-first quicksort over a persistent job stack.
pub struct QuickSort {
    jobs: JobQueue,
    current: Option<Partition>,
    pivot: PivotPolicy,
    rng: StdRng,
    budget: Budget,
    finished: bool,
}

impl QuickSort {
    /// Resumes `pending` when it holds jobs, otherwise starts on the whole array.
    pub fn new(
        len: usize,
        pending: Option<JobQueue>,
        pivot: PivotPolicy,
        budget: Budget,
        seed: Option<u64>,
    ) -> Self {
        let jobs = match pending {
            Some(mut jobs) if !jobs.is_empty() => {
                let before = jobs.len();
                jobs.retain(|job| job.start < job.end && job.end < len);
                if jobs.len() != before {
                    warn!(
                        "QuickSort: dropped {} pending job(s) outside an array of length {}",
                        before - jobs.len(),
                        len
                    );
                }
                jobs
            }
            _ if len > 1 => JobQueue::single(Job::new(0, len - 1)),
            _ => JobQueue::new(),
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!("QuickSort: starting with {} job(s), {:?}", jobs.len(), budget);
        QuickSort {
            jobs,
            current: None,
            pivot,
            rng,
            budget,
            finished: false,
        }
    }

    /// Jobs still waiting on the stack, excluding the one in flight.
    pub fn jobs(&self) -> &JobQueue {
        &self.jobs
    }

    fn finish(&mut self, state: &mut ArrayState, how: Finish) -> Advance {
        self.finished = true;
        state.is_partitioning = false;
        debug!("QuickSort: finished ({:?}), {} job(s) pending", how, self.jobs.len());
        Advance::Finished(how)
    }

    /// Pushes the halves either side of `pivot` that still need sorting.
    fn schedule_halves(&mut self, start: usize, end: usize, pivot: usize) {
        if pivot > start && start < pivot - 1 {
            self.jobs.push(Job::new(start, pivot - 1));
        }
        if pivot + 1 < end {
            self.jobs.push(Job::new(pivot + 1, end));
        }
    }
}

impl Stepper for QuickSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::QuickSort
    }

    fn advance(&mut self, state: &mut ArrayState) -> Result<Advance, EngineError> {
        if self.finished {
            return Err(EngineError::StepperExhausted(Algorithm::QuickSort));
        }

        let partition = match self.current.as_mut() {
            Some(partition) => partition,
            None => {
                if self.jobs.is_empty() {
                    return Ok(self.finish(state, Finish::Sorted));
                }
                if self.budget.is_spent() {
                    return Ok(self.finish(state, Finish::BudgetSpent));
                }
                let Some(job) = self.jobs.pop() else {
                    return Ok(self.finish(state, Finish::Sorted));
                };
                let alpha = self.pivot.alpha(&mut self.rng);
                trace!(
                    "QuickSort: partitioning [{}, {}] with alpha {:.3}",
                    job.start,
                    job.end,
                    alpha
                );
                state.set_range(job.start, job.end, true);
                self.current.insert(Partition::new(job.start, job.end, alpha))
            }
        };

        match partition.advance(state) {
            PartitionStep::Suspended => Ok(Advance::Continue),
            PartitionStep::Placed(pivot) => {
                let (start, end) = partition.range();
                self.current = None;
                self.schedule_halves(start, end, pivot);
                self.budget.spend();
                Ok(Advance::Milestone(Milestone::PartitionPlaced { start, end, pivot }))
            }
        }
    }

    fn into_pending(self: Box<Self>) -> JobQueue {
        let QuickSort {
            mut jobs, current, ..
        } = *self;
        // An interrupted partition is restarted from scratch; its range is
        // still a permutation of the same elements.
        if let Some(partition) = current {
            let (start, end) = partition.range();
            jobs.push(Job::new(start, end));
        }
        jobs
    }
}

pub(crate) fn stepwise(
    state: &ArrayState,
    pending: Option<JobQueue>,
    params: &SortParams,
) -> Box<dyn Stepper> {
    Box::new(QuickSort::new(
        state.len(),
        pending,
        params.pivot,
        Budget::Milestones(params.steps),
        params.seed,
    ))
}

pub(crate) fn to_completion(
    state: &ArrayState,
    pending: Option<JobQueue>,
    params: &SortParams,
) -> Box<dyn Stepper> {
    Box::new(QuickSort::new(
        state.len(),
        pending,
        params.pivot,
        Budget::Unbounded,
        params.seed,
    ))
}
