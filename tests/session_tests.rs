// tests/session_tests.rs

//! End-to-end behavior of the public session API.

use proptest::prelude::*;
use std::thread;
use std::time::Duration;
use stepsort::state::is_sorted;
use stepsort::{
    Algorithm, ControlParams, Frame, FrameKind, Launch, Outcome, Session, Visibility,
};

fn params(algorithm: Algorithm) -> ControlParams {
    ControlParams {
        algorithm,
        base_interval_secs: 0.0,
        seed: Some(17),
        ..Default::default()
    }
}

fn complete(session: &mut Session, params: &ControlParams) -> Vec<Frame> {
    match session.run_to_completion(params).unwrap() {
        Launch::Running(frames) => frames.collect(),
        Launch::Skipped(notice) => panic!("run skipped: {:?}", notice),
    }
}

#[test_log::test]
fn quicksort_scenario_end_to_end() {
    let mut session = Session::with_values(vec![5, 3, 8, 1]);
    let frames = complete(&mut session, &params(Algorithm::QuickSort));
    assert_eq!(session.state().values, vec![1, 3, 5, 8]);

    let first_milestone = frames
        .iter()
        .find(|f| f.kind == FrameKind::Milestone)
        .unwrap();
    assert_eq!(first_milestone.snapshot.pivot_index, Some(0));
    assert_eq!(first_milestone.snapshot.values, vec![1, 3, 8, 5]);
}

#[test_log::test]
fn quicksort_scenario_never_repeats_a_frame() {
    let mut session = Session::with_values(vec![5, 3, 8, 1]);
    let frames = complete(&mut session, &params(Algorithm::QuickSort));
    for pair in frames.windows(2) {
        assert_ne!(pair[0].snapshot, pair[1].snapshot, "frame {} repeats", pair[1].sequence);
    }
    // Each partition's milestone is the frame that placed its pivot.
    let placed: Vec<_> = frames
        .iter()
        .filter(|f| f.kind == FrameKind::Milestone)
        .map(|f| (f.snapshot.values.clone(), f.snapshot.pivot_index))
        .collect();
    assert_eq!(
        placed,
        vec![(vec![1, 3, 8, 5], Some(0)), (vec![1, 3, 5, 8], Some(2))]
    );
}

#[test_log::test]
fn frames_serialize_with_a_stable_field_set() {
    let mut session = Session::with_values(vec![3, 1, 2]);
    let frames = complete(&mut session, &params(Algorithm::InsertionSort));
    let keys: Vec<Vec<String>> = frames
        .iter()
        .map(|frame| {
            let json = serde_json::to_value(frame).unwrap();
            json["snapshot"]
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect()
        })
        .collect();
    assert!(keys.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(keys[0].len(), 11);
}

#[test_log::test]
fn stopping_from_another_thread_keeps_the_place() {
    let mut session = Session::with_values((1..=200).rev().collect());
    let slow = ControlParams {
        base_interval_secs: 0.001,
        ..params(Algorithm::BubbleSort)
    };
    let Launch::Running(mut frames) = session.run_to_completion(&slow).unwrap() else {
        panic!("run skipped");
    };
    let handle = frames.stop_handle();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.stop();
    });

    let mut count = 0;
    for frame in frames.by_ref() {
        count += 1;
        // A consumer honoring the pacing.
        thread::sleep(frame.delay);
    }
    stopper.join().unwrap();
    let report = frames.finish().unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert!(count > 0);
    assert!(report.pending);

    // Finish the rest in step mode.
    for _ in 0..1000 {
        let report = session
            .step(&ControlParams {
                steps: 50,
                ..slow.clone()
            })
            .unwrap()
            .drain()
            .unwrap();
        if !report.pending {
            break;
        }
    }
    assert!(session.state().is_sorted());
}

#[test_log::test]
fn milestone_only_visibility_still_sorts() {
    let mut session = Session::with_values((1..=25).rev().collect());
    let quiet = ControlParams {
        visibility: Visibility::SWAPS,
        ..params(Algorithm::SelectionSort)
    };
    let frames = complete(&mut session, &quiet);
    assert!(session.state().is_sorted());
    // 24 finalized positions plus the closing frame.
    assert_eq!(frames.len(), 25);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_algorithm_sorts_through_a_session(
        values in proptest::collection::vec(1i32..=1000, 0..40),
        which in 0usize..4,
    ) {
        let algorithm = Algorithm::ALL[which];
        let mut session = Session::with_values(values.clone());
        let frames = complete(&mut session, &params(algorithm));

        let mut expected = values;
        expected.sort_unstable();
        prop_assert_eq!(&session.state().values, &expected);
        prop_assert!(frames.iter().all(|f| f.snapshot.values.len() == expected.len()));
        for pair in frames.windows(2) {
            prop_assert_ne!(&pair[0].snapshot, &pair[1].snapshot);
        }
        prop_assert!(!session.is_active());
        prop_assert!(session.pending().is_none());
    }

    #[test]
    fn step_mode_converges(
        values in proptest::collection::vec(1i32..=1000, 2..30),
        which in 0usize..4,
        steps in 1i64..4,
    ) {
        let algorithm = Algorithm::ALL[which];
        let mut session = Session::with_values(values);
        let step = ControlParams { steps, ..params(algorithm) };
        let mut converged = false;
        for _ in 0..200 {
            let report = session.step(&step).unwrap().drain().unwrap();
            if !report.pending {
                converged = true;
                break;
            }
        }
        prop_assert!(converged);
        prop_assert!(is_sorted(&session.state().values));
    }
}
