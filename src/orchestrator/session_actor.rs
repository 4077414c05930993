// src/orchestrator/session_actor.rs

//! Session actor - owns a `Session` and paces its runs on a background thread.
//!
//! The actor holds at most one `Run`. While a run is active it waits for the
//! next command until the deadline set by the delay of the last frame, so a new
//! request or a stop is handled during the pause rather than after it. Other
//! commands do not move the deadline. When it passes the next frame is produced.

use super::{SessionCommand, SessionEvent};
use crate::coordinator::Run;
use crate::session::{Launch, Session, StopHandle};
use anyhow::{Context, Result};
use log::*;
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

/// Handle to a session running on its own thread.
///
/// Dropping the handle sends `Shutdown` and joins the thread.
pub struct SessionActor {
    commands: Sender<SessionCommand>,
    stop: StopHandle,
    thread_handle: Option<JoinHandle<()>>,
}

impl SessionActor {
    /// Moves `session` onto a new thread and returns the handle together with
    /// the receiving end of its event channel.
    pub fn spawn(session: Session) -> Result<(Self, Receiver<SessionEvent>)> {
        info!("SessionActor: Spawning background thread");
        let (commands, command_rx) = mpsc::channel();
        let (event_tx, events) = mpsc::channel();
        let stop = session.stop_handle();

        let thread_handle = thread::Builder::new()
            .name("session".to_string())
            .spawn(move || {
                if let Err(e) = Self::actor_thread_main(session, command_rx, event_tx) {
                    error!("SessionActor thread error: {:#}", e);
                }
            })
            .context("Failed to spawn session actor thread")?;

        Ok((
            SessionActor {
                commands,
                stop,
                thread_handle: Some(thread_handle),
            },
            events,
        ))
    }

    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .context("Session actor is no longer running")
    }

    /// Another sender for the same actor.
    pub fn sender(&self) -> Sender<SessionCommand> {
        self.commands.clone()
    }

    /// Stops the active run without going through the command queue.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn actor_thread_main(
        mut session: Session,
        commands: Receiver<SessionCommand>,
        events: Sender<SessionEvent>,
    ) -> Result<()> {
        debug!("SessionActor: Starting event loop");
        let mut current: Option<Run> = None;
        // When the active run produces its next frame. `None` while idle, or
        // when the last delay does not fit in an `Instant`.
        let mut next_frame_at: Option<Instant> = None;

        loop {
            let deadline = next_frame_at.filter(|_| current.is_some());
            let command = if let Some(deadline) = deadline {
                let wait = deadline.saturating_duration_since(Instant::now());
                match commands.recv_timeout(wait) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        info!("SessionActor: Command channel disconnected, shutting down");
                        Self::close_run(&mut session, &mut current);
                        return Ok(());
                    }
                }
            } else {
                match commands.recv() {
                    Ok(command) => Some(command),
                    Err(RecvError) => {
                        info!("SessionActor: Command channel disconnected, shutting down");
                        Self::close_run(&mut session, &mut current);
                        return Ok(());
                    }
                }
            };

            match command {
                Some(command) => {
                    let flow = Self::handle_command(
                        command,
                        &mut session,
                        &mut current,
                        &mut next_frame_at,
                        &events,
                    )?;
                    if flow == Flow::Shutdown {
                        return Ok(());
                    }
                }
                None => {
                    Self::produce_frame(&mut session, &mut current, &mut next_frame_at, &events)?
                }
            }
        }
    }

    fn handle_command(
        command: SessionCommand,
        session: &mut Session,
        current: &mut Option<Run>,
        next_frame_at: &mut Option<Instant>,
        events: &Sender<SessionEvent>,
    ) -> Result<Flow> {
        debug!("SessionActor: Received {:?}", command);
        match command {
            SessionCommand::Step(params) => {
                Self::close_run(session, current);
                match session.begin_step(&params) {
                    Ok(run) => {
                        *current = Some(run);
                        *next_frame_at = Some(Instant::now());
                    }
                    Err(e) => Self::reject(events, e.to_string())?,
                }
            }
            SessionCommand::RunToCompletion(params) => {
                Self::close_run(session, current);
                match session.begin_completion(&params) {
                    Ok(Launch::Running(run)) => {
                        *current = Some(run);
                        *next_frame_at = Some(Instant::now());
                    }
                    Ok(Launch::Skipped(notice)) => {
                        events
                            .send(SessionEvent::Notice(notice))
                            .context("Failed to send Notice")?;
                    }
                    Err(e) => Self::reject(events, e.to_string())?,
                }
            }
            SessionCommand::Stop => {
                session.stop();
                *next_frame_at = Some(Instant::now());
            }
            SessionCommand::Reset { count } => match session.reset(count) {
                Ok(snapshot) => events
                    .send(SessionEvent::State(snapshot))
                    .context("Failed to send State")?,
                Err(e) => Self::reject(events, e.to_string())?,
            },
            SessionCommand::Shuffle { strength } => match session.shuffle(strength) {
                Ok(frames) => {
                    for frame in frames {
                        events
                            .send(SessionEvent::Frame(frame))
                            .context("Failed to send shuffle Frame")?;
                    }
                }
                Err(e) => Self::reject(events, e.to_string())?,
            },
            SessionCommand::Snapshot => events
                .send(SessionEvent::State(session.snapshot()))
                .context("Failed to send State")?,
            SessionCommand::Shutdown => {
                info!("SessionActor: Shutdown requested");
                Self::close_run(session, current);
                return Ok(Flow::Shutdown);
            }
        }
        Ok(Flow::Continue)
    }

    fn produce_frame(
        session: &mut Session,
        current: &mut Option<Run>,
        next_frame_at: &mut Option<Instant>,
        events: &Sender<SessionEvent>,
    ) -> Result<()> {
        let Some(run) = current.as_mut() else {
            return Ok(());
        };
        match session.advance(run) {
            Ok(Some(frame)) => {
                trace!("SessionActor: frame {} of epoch {}", frame.sequence, frame.epoch);
                *next_frame_at = Instant::now().checked_add(frame.delay);
                events
                    .send(SessionEvent::Frame(frame))
                    .context("Failed to send Frame")?;
            }
            Ok(None) => {
                Self::close_run(session, current);
                events
                    .send(SessionEvent::Idle(session.snapshot()))
                    .context("Failed to send Idle")?;
            }
            Err(e) => {
                error!("SessionActor: {}", e);
                Self::close_run(session, current);
                events
                    .send(SessionEvent::Idle(session.snapshot()))
                    .context("Failed to send Idle")?;
            }
        }
        Ok(())
    }

    fn close_run(session: &mut Session, current: &mut Option<Run>) {
        if let Some(run) = current.take() {
            session.finish(run);
        }
    }

    fn reject(events: &Sender<SessionEvent>, reason: String) -> Result<()> {
        warn!("SessionActor: Rejected command: {}", reason);
        events
            .send(SessionEvent::Rejected { reason })
            .context("Failed to send Rejected")
    }
}

impl Drop for SessionActor {
    fn drop(&mut self) {
        debug!("SessionActor dropped");
        // Fails only when the thread has already exited.
        let _ = self.commands.send(SessionCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("SessionActor thread panicked: {:?}", e);
            }
        }
    }
}
