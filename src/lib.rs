// src/lib.rs

//! `stepsort` - a resumable, step-at-a-time sorting engine for visualizers.
//!
//! Sorting algorithms run as explicit state machines that perform one
//! comparison or swap per call. A `Session` owns the array, hands out run
//! epochs through its `SessionLock` so that a newer request always supersedes
//! an older one, and keeps partially finished work so that step requests pick
//! up where the last one stopped. Each visible unit becomes a `Frame`: a
//! serializable `Snapshot` of the array and its annotations plus a pacing delay.

pub mod color;
pub mod config;
pub mod controls;
pub mod coordinator;
pub mod error;
pub mod orchestrator;
pub mod permutation;
pub mod renderer;
pub mod session;
pub mod sorter;
pub mod state;

pub use config::{Config, CONFIG};
pub use controls::{ControlParams, PivotPolicy, SortParams, Visibility};
pub use coordinator::{Frame, FrameKind, Outcome, Pacing};
pub use error::{ControlError, EngineError, SessionError};
pub use orchestrator::{SessionActor, SessionCommand, SessionEvent};
pub use session::{Launch, Notice, RunReport, Session, SessionLock, StopHandle};
pub use sorter::{Algorithm, Stepper};
pub use state::{ArrayState, Snapshot};
