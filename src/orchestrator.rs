// src/orchestrator.rs

//! Message types for driving a `Session` from another thread.
//!
//! A `SessionActor` owns one session on a background thread. Collaborators send
//! `SessionCommand`s and receive `SessionEvent`s; frames are paced on the actor
//! thread, which keeps listening for commands while it waits.

use crate::controls::ControlParams;
use crate::coordinator::Frame;
use crate::session::Notice;
use crate::state::Snapshot;
use serde::{Deserialize, Serialize};

pub mod session_actor;

pub use session_actor::SessionActor;

/// Requests accepted by a `SessionActor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCommand {
    /// Run `steps` milestones, superseding any active run.
    Step(ControlParams),
    /// Sort the whole array, superseding any active run.
    RunToCompletion(ControlParams),
    /// End the active run at its next unit boundary.
    Stop,
    Reset { count: usize },
    Shuffle { strength: f64 },
    /// Ask for the current array state.
    Snapshot,
    Shutdown,
}

/// Everything a `SessionActor` reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Frame(Frame),
    Notice(Notice),
    /// A command could not be carried out.
    Rejected { reason: String },
    /// Reply to `Snapshot` and `Reset`.
    State(Snapshot),
    /// The active run ended; the array as it was left.
    Idle(Snapshot),
}
