// src/permutation.rs

//! Bulk relocations used to animate a shuffle.
//!
//! A shuffle is computed up front as a `ShufflePlan`: the final arrangement
//! plus the net `(origin, destination)` relation of every element. The relation
//! is reduced before it is shown so that elements which stay put are not drawn
//! as moving, and a two-element exchange is drawn once rather than twice.

use log::trace;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Removes reflexive pairs and the second direction of symmetric pairs.
///
/// The relation is scanned from the back. A pair `(a, b)` is dropped when
/// `a == b`, or when `(b, a)` was already retained further along the sequence.
/// The surviving pairs keep their original relative order.
pub fn reduce_relation(mut pairs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut retained: HashMap<usize, usize> = HashMap::with_capacity(pairs.len());
    let mut keep = vec![true; pairs.len()];

    for (idx, &(from, to)) in pairs.iter().enumerate().rev() {
        if from == to || retained.get(&to) == Some(&from) {
            keep[idx] = false;
            continue;
        }
        retained.insert(from, to);
    }

    let mut flags = keep.into_iter();
    pairs.retain(|_| flags.next().unwrap_or(false));
    trace!("reduce_relation: {} pairs retained", pairs.len());
    pairs
}

/// Applies a reduced permutation relation to `values` in one step.
///
/// Every pair moves `values[from]` to `to`. A pair whose destination never
/// appears as a source is the surviving half of a two-element exchange, so the
/// displaced element travels back to `from`.
pub fn apply_bulk(values: &[i32], pairs: &[(usize, usize)]) -> Vec<i32> {
    let sources: HashSet<usize> = pairs.iter().map(|&(from, _)| from).collect();
    let mut out = values.to_vec();
    for &(from, to) in pairs {
        out[to] = values[from];
        if !sources.contains(&to) {
            out[from] = values[to];
        }
    }
    out
}

/// Result of a weighted Fisher-Yates pass over a copy of the array.
#[derive(Debug, Clone, PartialEq)]
pub struct ShufflePlan {
    /// The arrangement after the shuffle.
    pub shuffled: Vec<i32>,
    /// `(origin, destination)` for every index, unreduced.
    pub relation: Vec<(usize, usize)>,
}

impl ShufflePlan {
    /// The relation with no-op and duplicate entries removed.
    pub fn reduced(&self) -> Vec<(usize, usize)> {
        reduce_relation(self.relation.clone())
    }
}

/// Fisher-Yates where each position is only swapped with probability `strength`.
///
/// `strength` must already be validated to lie in `[0, 1]`.
pub fn plan_shuffle<R: Rng + ?Sized>(values: &[i32], strength: f64, rng: &mut R) -> ShufflePlan {
    let mut shuffled = values.to_vec();
    let mut origin: Vec<usize> = (0..values.len()).collect();

    for i in (1..values.len()).rev() {
        if !rng.gen_bool(strength) {
            continue;
        }
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
        origin.swap(i, j);
    }

    let relation = origin
        .into_iter()
        .enumerate()
        .map(|(destination, source)| (source, destination))
        .collect();

    ShufflePlan { shuffled, relation }
}
