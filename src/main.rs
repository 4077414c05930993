// src/main.rs

//! `stepsort [algorithm] [count]`
//!
//! Sorts a fresh random array on a session actor and writes every frame to
//! stdout as one JSON object per line, paced by the frame delays.

use anyhow::Context;
use log::{info, warn};
use std::io::{self, Write};
use stepsort::{Algorithm, Session, SessionActor, SessionCommand, SessionEvent, CONFIG};

fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let mut args = std::env::args().skip(1);
    let algorithm = match args.next() {
        Some(name) => Algorithm::from_name(&name)
            .with_context(|| format!("Unknown algorithm {:?}", name))?,
        None => CONFIG.controls.algorithm,
    };
    let count = args
        .next()
        .map(|arg| arg.parse::<usize>())
        .transpose()
        .context("Element count must be a non-negative integer")?;

    info!("Starting stepsort ({:?})", algorithm);

    let (actor, events) =
        SessionActor::spawn(Session::new(&CONFIG)).context("Failed to start session actor")?;
    if let Some(count) = count {
        actor.send(SessionCommand::Reset { count })?;
    }
    let params = stepsort::ControlParams {
        algorithm,
        ..CONFIG.control_params()
    };
    actor.send(SessionCommand::RunToCompletion(params))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in events.iter() {
        match event {
            SessionEvent::Frame(frame) => {
                let line = serde_json::to_string(&frame).context("Failed to encode frame")?;
                writeln!(out, "{}", line).context("Failed to write frame")?;
            }
            SessionEvent::State(snapshot) => {
                info!("Array has {} element(s)", snapshot.values.len());
            }
            SessionEvent::Rejected { reason } => {
                anyhow::bail!("Request rejected: {}", reason);
            }
            SessionEvent::Notice(notice) => {
                warn!("{:?}", notice);
                break;
            }
            SessionEvent::Idle(_) => break,
        }
    }
    out.flush().context("Failed to flush stdout")?;

    info!("stepsort finished");
    Ok(())
}
