// src/error.rs

//! Error types for the step engine.
//!
//! Only conditions that a caller can act on are errors. Cancellation and
//! degenerate input are normal outcomes and never show up here.

use crate::sorter::Algorithm;
use thiserror::Error;

/// A control parameter supplied by a collaborator was out of range.
///
/// These are rejected at the session boundary, before any stepper is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("pivot alpha {0} is outside [0, 1]")]
    PivotAlphaOutOfRange(f64),
    #[error("step count must be at least 1, got {0}")]
    NonPositiveStepCount(i64),
    #[error("base interval must be between 0 and 60 seconds, got {0}")]
    InvalidInterval(f64),
    #[error("shuffle strength {0} is outside [0, 1]")]
    ShuffleStrengthOutOfRange(f64),
    #[error("element count {count} is outside 1..={max}")]
    ElementCountOutOfRange { count: usize, max: usize },
}

/// Failures of a session-level operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A sort is in progress and the operation needs exclusive use of the array.
    #[error("a sort is in progress")]
    Busy,
    #[error("invalid control parameters: {0}")]
    InvalidControls(#[from] ControlError),
}

/// Contract violations inside the engine. These indicate a bug in the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0:?} stepper advanced after it had already finished")]
    StepperExhausted(Algorithm),
}
