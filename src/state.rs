// src/state.rs

//! The array being sorted and the annotations a renderer needs to draw it.
//!
//! `ArrayState` is owned by the `Session` and lent exclusively to the active
//! stepper for the duration of a unit of work. Observers never see it directly;
//! they receive `Snapshot`s, which carry every field on every frame so that
//! consumers can diff by field.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive bounds for freshly generated element values.
pub const MIN_GENERATED_VALUE: i32 = 1;
pub const MAX_GENERATED_VALUE: i32 = 1000;

/// The mutable sequence plus its visualization annotations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayState {
    pub values: Vec<i32>,
    /// Lower bound of the sub-range being processed.
    pub range_lo: usize,
    /// Upper bound of the sub-range being processed.
    pub range_hi: usize,
    pub pivot_index: Option<usize>,
    pub swap_a: Option<usize>,
    pub swap_b: Option<usize>,
    pub is_swapping: bool,
    pub is_partitioning: bool,
    /// Relocations animated together. Only populated while a shuffle is shown.
    pub bulk_pairs: Option<Vec<(usize, usize)>>,
    /// Seconds the consumer should hold the current frame.
    pub pending_delay: f64,
    /// Whether pacing scales with swap distance.
    pub animate_swaps: bool,
}

impl ArrayState {
    pub fn new(values: Vec<i32>) -> Self {
        ArrayState {
            values,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Marks `[lo, hi]` as the range under work.
    pub fn set_range(&mut self, lo: usize, hi: usize, partitioning: bool) {
        debug_assert!(lo <= hi || !partitioning, "partition range inverted");
        self.range_lo = lo;
        self.range_hi = hi;
        self.is_partitioning = partitioning;
    }

    /// Highlights a pair of indices. Clears any bulk relocation so the two
    /// kinds of swap annotation are never populated together.
    pub fn mark_pair(&mut self, a: usize, b: usize, swapping: bool) {
        self.bulk_pairs = None;
        self.swap_a = Some(a);
        self.swap_b = Some(b);
        self.is_swapping = swapping;
    }

    /// Shows a batch of relocations. Clears the single-swap annotation.
    pub fn mark_bulk(&mut self, pairs: Vec<(usize, usize)>) {
        self.swap_a = None;
        self.swap_b = None;
        self.is_swapping = false;
        self.bulk_pairs = Some(pairs);
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.values.swap(a, b);
    }

    /// Index distance of the swap currently in progress, if any.
    pub fn swap_distance(&self) -> Option<usize> {
        if !self.is_swapping {
            return None;
        }
        match (self.swap_a, self.swap_b) {
            (Some(a), Some(b)) => Some(a.abs_diff(b)),
            _ => None,
        }
    }

    /// Resets every annotation, leaving the values untouched.
    pub fn clear_annotations(&mut self) {
        let animate_swaps = self.animate_swaps;
        let values = std::mem::take(&mut self.values);
        *self = ArrayState {
            values,
            animate_swaps,
            ..Default::default()
        };
    }

    pub fn is_sorted(&self) -> bool {
        is_sorted(&self.values)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }
}

/// Serializable, self-contained copy of an `ArrayState`.
///
/// Optional fields serialize as `null`; no field is ever omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub values: Vec<i32>,
    pub range_lo: usize,
    pub range_hi: usize,
    pub pivot_index: Option<usize>,
    pub swap_a: Option<usize>,
    pub swap_b: Option<usize>,
    pub is_swapping: bool,
    pub is_partitioning: bool,
    pub bulk_pairs: Option<Vec<(usize, usize)>>,
    pub pending_delay: f64,
    pub animate_swaps: bool,
}

impl From<&ArrayState> for Snapshot {
    fn from(state: &ArrayState) -> Self {
        Snapshot {
            values: state.values.clone(),
            range_lo: state.range_lo,
            range_hi: state.range_hi,
            pivot_index: state.pivot_index,
            swap_a: state.swap_a,
            swap_b: state.swap_b,
            is_swapping: state.is_swapping,
            is_partitioning: state.is_partitioning,
            bulk_pairs: state.bulk_pairs.clone(),
            pending_delay: state.pending_delay,
            animate_swaps: state.animate_swaps,
        }
    }
}

/// `true` when `values` is non-decreasing.
pub fn is_sorted(values: &[i32]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Refills `values` with `count` uniformly drawn elements.
pub fn regenerate<R: Rng + ?Sized>(values: &mut Vec<i32>, count: usize, rng: &mut R) {
    values.clear();
    values.extend((0..count).map(|_| rng.gen_range(MIN_GENERATED_VALUE..=MAX_GENERATED_VALUE)));
}
