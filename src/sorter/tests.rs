// src/sorter/tests.rs

//! Unit tests for the incremental steppers.

use super::*;
use crate::controls::{ControlParams, PivotPolicy};
use crate::state::{is_sorted, ArrayState};
use proptest::prelude::*;

// --- Test Helpers ---

fn params_for(algorithm: Algorithm, steps: i64) -> SortParams {
    ControlParams {
        algorithm,
        steps,
        seed: Some(42),
        ..Default::default()
    }
    .validate()
    .unwrap()
}

/// Advances until the stepper finishes, collecting every result.
fn drive(stepper: &mut dyn Stepper, state: &mut ArrayState) -> Vec<Advance> {
    let mut out = Vec::new();
    loop {
        let advance = stepper.advance(state).unwrap();
        out.push(advance);
        if matches!(advance, Advance::Finished(_)) {
            return out;
        }
    }
}

fn milestones(advances: &[Advance]) -> Vec<Milestone> {
    advances
        .iter()
        .filter_map(|a| match a {
            Advance::Milestone(m) => Some(*m),
            _ => None,
        })
        .collect()
}

fn sort_fully(algorithm: Algorithm, values: Vec<i32>) -> (ArrayState, JobQueue) {
    let mut state = ArrayState::new(values);
    let params = params_for(algorithm, 1);
    let mut stepper = (algorithm.factories().complete)(&state, None, &params);
    drive(stepper.as_mut(), &mut state);
    (state, stepper.into_pending())
}

// --- Quicksort ---

#[test_log::test]
fn quicksort_scenario_sorts_and_places_first_pivot_at_zero() {
    let mut state = ArrayState::new(vec![5, 3, 8, 1]);
    let params = params_for(Algorithm::QuickSort, 1);
    let mut stepper = (Algorithm::QuickSort.factories().complete)(&state, None, &params);
    let advances = drive(stepper.as_mut(), &mut state);

    assert_eq!(state.values, vec![1, 3, 5, 8]);
    assert_eq!(
        milestones(&advances)[0],
        Milestone::PartitionPlaced {
            start: 0,
            end: 3,
            pivot: 0
        }
    );
    assert_eq!(advances.last(), Some(&Advance::Finished(Finish::Sorted)));
    assert!(stepper.into_pending().is_empty());
    assert!(!state.is_partitioning);
}

#[test_log::test]
fn partition_suspends_once_per_comparison_without_movement() {
    let mut state = ArrayState::new(vec![5, 3, 8, 1]);
    let mut partition = Partition::new(0, 3, 1.0);
    let mut suspends = 0;
    let placed = loop {
        match partition.advance(&mut state) {
            PartitionStep::Suspended => suspends += 1,
            PartitionStep::Placed(at) => break at,
        }
    };
    // pivot already at the end, three plain comparisons, place intent
    assert_eq!(suspends, 5);
    assert_eq!(placed, 0);
    assert_eq!(state.values, vec![1, 3, 8, 5]);
}

#[test_log::test]
fn partition_shows_intent_before_and_result_after_each_exchange() {
    let mut state = ArrayState::new(vec![9, 1, 5]);
    let mut partition = Partition::new(0, 2, 1.0);
    let mut frames = Vec::new();
    let placed = loop {
        let step = partition.advance(&mut state);
        frames.push((state.values.clone(), state.swap_a, state.swap_b, state.is_swapping));
        if let PartitionStep::Placed(at) = step {
            break at;
        }
    };
    // pivot 5 already sits at the end
    assert_eq!(frames[0], (vec![9, 1, 5], Some(2), Some(2), false));
    // 9 > 5: comparison only
    assert_eq!(frames[1], (vec![9, 1, 5], Some(0), Some(0), false));
    // 1 <= 5 and must move to the free slot: intent, then result
    assert_eq!(frames[2], (vec![9, 1, 5], Some(1), Some(0), true));
    assert_eq!(frames[3], (vec![1, 9, 5], Some(1), Some(0), false));
    // the unit that drops the pivot into index 1 reports the placement
    assert_eq!(frames[4], (vec![1, 9, 5], Some(2), Some(1), true));
    assert_eq!(frames[5], (vec![1, 5, 9], Some(2), Some(1), false));
    assert_eq!(frames.len(), 6);
    assert_eq!(placed, 1);
}

#[test_log::test]
fn partition_moves_an_inner_pivot_to_the_end_first() {
    let mut state = ArrayState::new(vec![4, 2, 6]);
    let mut partition = Partition::new(0, 2, 0.0);
    assert_eq!(partition.advance(&mut state), PartitionStep::Suspended);
    assert_eq!(state.values, vec![4, 2, 6]);
    assert!(state.is_swapping);
    assert_eq!(partition.advance(&mut state), PartitionStep::Suspended);
    assert_eq!(state.values, vec![6, 2, 4]);
    assert_eq!(state.pivot_index, Some(2));
    let placed = loop {
        if let PartitionStep::Placed(at) = partition.advance(&mut state) {
            break at;
        }
    };
    assert_eq!(placed, 1);
    assert_eq!(state.values, vec![2, 4, 6]);
}

#[test_log::test]
fn quicksort_on_tiny_arrays_finishes_immediately() {
    for values in [vec![], vec![4]] {
        let mut state = ArrayState::new(values.clone());
        let params = params_for(Algorithm::QuickSort, 1);
        let mut stepper = (Algorithm::QuickSort.factories().step)(&state, None, &params);
        assert_eq!(
            stepper.advance(&mut state),
            Ok(Advance::Finished(Finish::Sorted))
        );
        assert_eq!(state.values, values);
        assert!(stepper.into_pending().is_empty());
    }
}

#[test_log::test]
fn quicksort_step_budget_persists_job_stack() {
    let mut state = ArrayState::new(vec![7, 2, 9, 4, 1, 8, 3]);
    let params = params_for(Algorithm::QuickSort, 1);
    let factories = Algorithm::QuickSort.factories();

    let mut stepper = (factories.step)(&state, None, &params);
    let advances = drive(stepper.as_mut(), &mut state);
    assert_eq!(milestones(&advances).len(), 1);
    assert_eq!(advances.last(), Some(&Advance::Finished(Finish::BudgetSpent)));
    let mut pending = stepper.into_pending();
    assert!(!pending.is_empty());

    let mut rounds = 0;
    while !pending.is_empty() {
        let mut stepper = (factories.step)(&state, Some(pending), &params);
        drive(stepper.as_mut(), &mut state);
        pending = stepper.into_pending();
        rounds += 1;
        assert!(rounds < 20, "step mode never converged");
    }
    assert!(is_sorted(&state.values));
}

#[test_log::test]
fn quicksort_drops_pending_jobs_outside_the_array() {
    let mut state = ArrayState::new(vec![3, 1, 2]);
    let mut pending = JobQueue::new();
    pending.push(Job::new(4, 9));
    let mut stepper = QuickSort::new(state.len(), Some(pending), PivotPolicy::default(), Budget::Unbounded, None);
    assert_eq!(
        stepper.advance(&mut state),
        Ok(Advance::Finished(Finish::Sorted))
    );
    assert_eq!(state.values, vec![3, 1, 2]);
}

#[test_log::test]
fn interrupted_partition_is_requeued() {
    let mut state = ArrayState::new(vec![4, 3, 2, 1]);
    let mut stepper = QuickSort::new(state.len(), None, PivotPolicy::default(), Budget::Unbounded, None);
    stepper.advance(&mut state).unwrap();
    stepper.advance(&mut state).unwrap();
    let pending = Box::new(stepper).into_pending();
    assert_eq!(pending.peek(), Some(&Job::new(0, 3)));
}

#[test_log::test]
fn exhausted_stepper_reports_contract_violation() {
    for algorithm in Algorithm::ALL {
        let mut state = ArrayState::new(vec![2, 1]);
        let params = params_for(algorithm, 1);
        let mut stepper = (algorithm.factories().complete)(&state, None, &params);
        drive(stepper.as_mut(), &mut state);
        assert_eq!(
            stepper.advance(&mut state),
            Err(EngineError::StepperExhausted(algorithm))
        );
    }
}

// --- Single-pass algorithms ---

#[test_log::test]
fn bubble_stops_after_a_pass_without_swaps() {
    let mut state = ArrayState::new(vec![1, 2, 3, 4, 5]);
    let params = params_for(Algorithm::BubbleSort, 1);
    let mut stepper = (Algorithm::BubbleSort.factories().complete)(&state, None, &params);
    let advances = drive(stepper.as_mut(), &mut state);
    assert_eq!(
        milestones(&advances),
        vec![Milestone::PassCompleted { pass: 0, swaps: 0 }]
    );
    assert!(stepper.into_pending().is_empty());
}

#[test_log::test]
fn bubble_suspends_once_per_adjacent_pair() {
    let mut state = ArrayState::new(vec![3, 1, 2]);
    let mut stepper = BubbleSort::new(state.len(), None, Budget::Milestones(1));
    let advances = drive(&mut stepper, &mut state);
    let continues = advances
        .iter()
        .filter(|a| matches!(a, Advance::Continue))
        .count();
    // the second comparison closes the pass
    assert_eq!(continues, 1);
    assert_eq!(
        milestones(&advances),
        vec![Milestone::PassCompleted { pass: 0, swaps: 2 }]
    );
    assert_eq!(state.values, vec![1, 2, 3]);
    assert_eq!(
        Box::new(stepper).into_pending().peek(),
        Some(&Job::new(1, 3))
    );
}

#[test_log::test]
fn selection_swaps_at_most_once_per_position() {
    let mut state = ArrayState::new(vec![4, 2, 3, 1]);
    let mut stepper = SelectionSort::new(state.len(), None, Budget::Unbounded);
    let mut swaps = 0;
    loop {
        let before = state.values.clone();
        match stepper.advance(&mut state).unwrap() {
            Advance::Finished(_) => break,
            _ => {
                if before != state.values {
                    swaps += 1;
                }
            }
        }
    }
    assert_eq!(state.values, vec![1, 2, 3, 4]);
    assert!(swaps <= 3);
}

#[test_log::test]
fn selection_records_resume_offset_when_budget_runs_out() {
    let mut state = ArrayState::new(vec![5, 4, 3, 2, 1]);
    let params = params_for(Algorithm::SelectionSort, 2);
    let mut stepper = (Algorithm::SelectionSort.factories().step)(&state, None, &params);
    let advances = drive(stepper.as_mut(), &mut state);
    assert_eq!(
        milestones(&advances),
        vec![
            Milestone::PositionFinalized { index: 0 },
            Milestone::PositionFinalized { index: 1 }
        ]
    );
    assert_eq!(&state.values[..2], &[1, 2]);
    assert_eq!(stepper.into_pending().peek(), Some(&Job::new(2, 5)));
}

#[test_log::test]
fn insertion_finalizes_each_position() {
    let (state, pending) = sort_fully(Algorithm::InsertionSort, vec![3, 1, 2]);
    assert_eq!(state.values, vec![1, 2, 3]);
    assert!(pending.is_empty());
}

#[test_log::test]
fn resume_offset_past_end_completes_instead_of_indexing() {
    for algorithm in [
        Algorithm::BubbleSort,
        Algorithm::SelectionSort,
        Algorithm::InsertionSort,
    ] {
        let mut state = ArrayState::new(vec![2, 1, 3]);
        let params = params_for(algorithm, 1);
        let stale = JobQueue::single(Job::new(10, 50));
        let mut stepper = (algorithm.factories().step)(&state, Some(stale), &params);
        assert_eq!(
            stepper.advance(&mut state),
            Ok(Advance::Finished(Finish::Sorted)),
            "{:?}",
            algorithm
        );
        assert!(stepper.into_pending().is_empty());
    }
}

#[test_log::test]
fn pending_work_is_discarded_for_another_algorithm() {
    let work = PendingWork::from_jobs(Algorithm::BubbleSort, JobQueue::single(Job::new(2, 5)))
        .unwrap();
    assert_eq!(work.clone().take_for(Algorithm::InsertionSort), None);
    assert!(work.take_for(Algorithm::BubbleSort).is_some());
    assert_eq!(PendingWork::from_jobs(Algorithm::QuickSort, JobQueue::new()), None);
}

#[test_log::test]
fn algorithm_names_parse() {
    assert_eq!(Algorithm::from_name("quick"), Some(Algorithm::QuickSort));
    assert_eq!(Algorithm::from_name("insertion"), Some(Algorithm::InsertionSort));
    assert_eq!(Algorithm::from_name("bogo"), None);
}

// --- Properties ---

proptest! {
    #[test]
    fn every_algorithm_sorts(values in proptest::collection::vec(-100i32..100, 0..48)) {
        for algorithm in Algorithm::ALL {
            let (state, pending) = sort_fully(algorithm, values.clone());
            prop_assert!(is_sorted(&state.values), "{:?} left {:?}", algorithm, state.values);
            prop_assert!(pending.is_empty());
            let mut expected = values.clone();
            expected.sort_unstable();
            prop_assert_eq!(&state.values, &expected);
        }
    }

    #[test]
    fn random_pivot_sorts(values in proptest::collection::vec(0i32..20, 0..40), seed in any::<u64>()) {
        let mut state = ArrayState::new(values);
        let mut stepper = QuickSort::new(state.len(), None, PivotPolicy::Random, Budget::Unbounded, Some(seed));
        drive(&mut stepper, &mut state);
        prop_assert!(is_sorted(&state.values));
    }

    #[test]
    fn partition_orders_around_pivot(
        values in proptest::collection::vec(-30i32..30, 2..40),
        lo_frac in 0.0f64..1.0,
        alpha in 0.0f64..=1.0,
    ) {
        let len = values.len();
        let start = ((len - 1) as f64 * lo_frac) as usize;
        prop_assume!(start < len - 1);
        let end = len - 1;
        let mut state = ArrayState::new(values.clone());
        let mut partition = Partition::new(start, end, alpha);
        let placed = loop {
            if let PartitionStep::Placed(at) = partition.advance(&mut state) {
                break at;
            }
        };
        let pivot = state.values[placed];
        prop_assert!((start..=end).contains(&placed));
        prop_assert!(state.values[start..placed].iter().all(|v| *v <= pivot));
        prop_assert!(state.values[placed + 1..=end].iter().all(|v| *v >= pivot));
        prop_assert_eq!(&state.values[..start], &values[..start]);
    }

    #[test]
    fn interrupted_runs_resume_to_sorted(
        values in proptest::collection::vec(-50i32..50, 0..32),
        cut in 0usize..200,
    ) {
        for algorithm in Algorithm::ALL {
            let mut state = ArrayState::new(values.clone());
            let params = params_for(algorithm, 1);
            let factories = algorithm.factories();

            let mut first = (factories.complete)(&state, None, &params);
            for _ in 0..cut {
                if let Advance::Finished(_) = first.advance(&mut state).unwrap() {
                    break;
                }
            }
            let pending = first.into_pending();
            let resume = if pending.is_empty() { None } else { Some(pending) };
            let mut second = (factories.complete)(&state, resume, &params);
            drive(second.as_mut(), &mut state);
            prop_assert!(is_sorted(&state.values), "{:?} left {:?}", algorithm, state.values);
        }
    }
}
