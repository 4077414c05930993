// src/sorter.rs

//! Incremental sorting algorithms.
//!
//! Each algorithm is an explicit state machine implementing [`Stepper`]. One
//! call to [`Stepper::advance`] performs exactly one unit of work (a comparison
//! or a swap boundary) on the borrowed [`ArrayState`] and reports what happened.
//! Loop indices and phase live in the stepper, so a run can be paused between
//! any two units and its outstanding work written back as a [`JobQueue`].

use crate::controls::SortParams;
use crate::error::EngineError;
use crate::state::ArrayState;
use serde::{Deserialize, Serialize};

pub mod bubble;
pub mod insertion;
pub mod job;
pub mod quick;
pub mod selection;

pub use bubble::BubbleSort;
pub use insertion::InsertionSort;
pub use job::{Job, JobQueue, PendingWork};
pub use quick::{Partition, PartitionStep, QuickSort};
pub use selection::SelectionSort;

/// The closed set of algorithms the engine can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    QuickSort,
    BubbleSort,
    SelectionSort,
    InsertionSort,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::QuickSort,
        Algorithm::BubbleSort,
        Algorithm::SelectionSort,
        Algorithm::InsertionSort,
    ];

    /// The step-mode and run-to-completion constructors for this algorithm.
    pub fn factories(self) -> StepperFactories {
        match self {
            Algorithm::QuickSort => StepperFactories {
                step: quick::stepwise,
                complete: quick::to_completion,
            },
            Algorithm::BubbleSort => StepperFactories {
                step: bubble::stepwise,
                complete: bubble::to_completion,
            },
            Algorithm::SelectionSort => StepperFactories {
                step: selection::stepwise,
                complete: selection::to_completion,
            },
            Algorithm::InsertionSort => StepperFactories {
                step: insertion::stepwise,
                complete: insertion::to_completion,
            },
        }
    }

    /// Parses the short names accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quick" | "quick_sort" | "quicksort" => Some(Algorithm::QuickSort),
            "bubble" | "bubble_sort" => Some(Algorithm::BubbleSort),
            "selection" | "selection_sort" => Some(Algorithm::SelectionSort),
            "insertion" | "insertion_sort" => Some(Algorithm::InsertionSort),
            _ => None,
        }
    }
}

/// Builds a stepper over `state`, resuming from `pending` when it is present.
pub type StepperFactory = fn(&ArrayState, Option<JobQueue>, &SortParams) -> Box<dyn Stepper>;

/// Both calling modes share one signature; they differ only in budget.
#[derive(Clone, Copy)]
pub struct StepperFactories {
    /// Stops after `SortParams::steps` milestones.
    pub step: StepperFactory,
    /// Runs until the array is sorted.
    pub complete: StepperFactory,
}

/// What one unit of work produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// An ordinary comparison or swap boundary.
    Continue,
    /// A partition, pass or position was finished by this unit.
    Milestone(Milestone),
    /// No work remains for this run.
    Finished(Finish),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// A quicksort partition placed its pivot at its final index.
    PartitionPlaced { start: usize, end: usize, pivot: usize },
    /// A bubble pass ended after performing `swaps` exchanges.
    PassCompleted { pass: usize, swaps: usize },
    /// Selection or insertion settled the element at `index`.
    PositionFinalized { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    /// The array is sorted; nothing is left pending.
    Sorted,
    /// The step budget ran out with work left over.
    BudgetSpent,
}

/// How many milestones a run may produce before it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Milestones(usize),
    Unbounded,
}

impl Budget {
    pub fn is_spent(&self) -> bool {
        matches!(self, Budget::Milestones(0))
    }

    pub fn spend(&mut self) {
        if let Budget::Milestones(remaining) = self {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

/// A resumable, incremental sorting procedure.
pub trait Stepper: Send {
    fn algorithm(&self) -> Algorithm;

    /// Performs one unit of work.
    ///
    /// Returns `EngineError::StepperExhausted` if called again after
    /// `Advance::Finished` was reported.
    fn advance(&mut self, state: &mut ArrayState) -> Result<Advance, EngineError>;

    /// Outstanding work, so that a later request can pick up where this one
    /// stopped. Empty when the run finished sorting.
    fn into_pending(self: Box<Self>) -> JobQueue;
}

#[cfg(test)]
mod tests;
