// src/controls.rs

//! The control-parameter bundle supplied by the UI before each request, and
//! its validation into the typed parameters the engine runs with.
//!
//! Nothing invalid gets past `ControlParams::validate`; steppers and the
//! coordinator assume well-formed input.

use crate::coordinator::Pacing;
use crate::error::ControlError;
use crate::sorter::Algorithm;
use bitflags::bitflags;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest base interval a collaborator may request, in seconds.
pub const MAX_BASE_INTERVAL_SECS: f64 = 60.0;

bitflags! {
    /// Which units of work produce frames.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Visibility: u8 {
        /// Show units where elements are being exchanged.
        const SWAPS         = 1 << 0;
        /// Show units that only compare.
        const COMPARISONS   = 1 << 1;
        /// Emit per-unit frames at all. Without it only milestones are shown.
        const QUERIES       = 1 << 2;
        /// Scale the pacing delay by swap distance.
        const ANIMATE_SWAPS = 1 << 3;
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::SWAPS | Visibility::COMPARISONS | Visibility::QUERIES
    }
}

/// How the quicksort partitioner chooses its pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PivotPolicy {
    /// Fractional position between `start` and `end`. `1.0` is the last element.
    Fixed(f64),
    /// A fresh alpha is drawn for every partition.
    Random,
}

impl Default for PivotPolicy {
    fn default() -> Self {
        PivotPolicy::Fixed(1.0)
    }
}

impl PivotPolicy {
    /// `true` for the textbook Lomuto choice of the last element.
    pub fn is_default(&self) -> bool {
        matches!(self, PivotPolicy::Fixed(alpha) if *alpha == 1.0)
    }

    pub fn alpha<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            PivotPolicy::Fixed(alpha) => alpha,
            PivotPolicy::Random => rng.gen::<f64>(),
        }
    }
}

/// Linear interpolation between `v0` and `v1`.
pub fn lerp(v0: f64, v1: f64, alpha: f64) -> f64 {
    (1.0 - alpha) * v0 + v1 * alpha
}

/// `floor(lerp(start, end, alpha))`, kept inside `[start, end]`.
pub fn pivot_index(start: usize, end: usize, alpha: f64) -> usize {
    let raw = lerp(start as f64, end as f64, alpha).floor();
    (raw.max(start as f64) as usize).min(end)
}

/// Raw parameters as they arrive from the control surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParams {
    pub algorithm: Algorithm,
    pub pivot_alpha: f64,
    pub random_pivot: bool,
    /// Milestones per step request (partitions, passes or positions).
    pub steps: i64,
    pub base_interval_secs: f64,
    pub visibility: Visibility,
    pub shuffle_strength: f64,
    /// Seeds the random pivot stream. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ControlParams {
    fn default() -> Self {
        ControlParams {
            algorithm: Algorithm::QuickSort,
            pivot_alpha: 1.0,
            random_pivot: false,
            steps: 1,
            base_interval_secs: 0.05,
            visibility: Visibility::default(),
            shuffle_strength: 0.1,
            seed: None,
        }
    }
}

/// Validated parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SortParams {
    pub algorithm: Algorithm,
    pub pivot: PivotPolicy,
    pub steps: usize,
    pub pacing: Pacing,
    pub visibility: Visibility,
    pub seed: Option<u64>,
}

impl ControlParams {
    pub fn validate(&self) -> Result<SortParams, ControlError> {
        if !(0.0..=1.0).contains(&self.pivot_alpha) {
            return Err(ControlError::PivotAlphaOutOfRange(self.pivot_alpha));
        }
        if self.steps < 1 {
            return Err(ControlError::NonPositiveStepCount(self.steps));
        }
        let base = interval_from_secs(self.base_interval_secs)?;

        let pivot = if self.random_pivot {
            PivotPolicy::Random
        } else {
            PivotPolicy::Fixed(self.pivot_alpha)
        };

        Ok(SortParams {
            algorithm: self.algorithm,
            pivot,
            steps: self.steps as usize,
            pacing: Pacing::new(base, self.visibility.contains(Visibility::ANIMATE_SWAPS)),
            visibility: self.visibility,
            seed: self.seed,
        })
    }
}

/// Converts a collaborator-supplied interval in seconds.
///
/// Accepts `0..=MAX_BASE_INTERVAL_SECS`.
pub fn interval_from_secs(secs: f64) -> Result<Duration, ControlError> {
    if !(0.0..=MAX_BASE_INTERVAL_SECS).contains(&secs) {
        return Err(ControlError::InvalidInterval(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ControlError::InvalidInterval(secs))
}

pub fn validate_shuffle_strength(strength: f64) -> Result<f64, ControlError> {
    if !(0.0..=1.0).contains(&strength) {
        return Err(ControlError::ShuffleStrengthOutOfRange(strength));
    }
    Ok(strength)
}

pub fn validate_element_count(count: usize, max: usize) -> Result<usize, ControlError> {
    if count == 0 || count > max {
        return Err(ControlError::ElementCountOutOfRange { count, max });
    }
    Ok(count)
}
