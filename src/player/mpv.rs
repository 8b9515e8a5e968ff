// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! MPV-backed media sink.
//!
//! [`MpvSink`] is a command proxy: it does no audio work itself but forwards
//! commands over a channel to a background worker that owns the `libmpv`
//! context. The worker translates MPV events back into tagged [`SinkEvent`]s
//! on the event channel supplied by the host.
//!
//! # Architecture
//!
//! The worker alternates between two loops:
//! 1. **Commands**: drains pending [`EngineCommand`]s (load, pause, seek, ...).
//! 2. **Events**: waits briefly for an MPV event and reports load
//!    confirmations, progress, natural ends and failures against the load
//!    MPV is actually playing (see [`LoadTracker`]).

use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use anyhow::{Context, Result};
use mpv::Format;

use crate::{
    model::Tag,
    player::{
        MediaSink, SinkEvent,
        engine::{self, Engine, EngineCommand, EngineEvent, LoadTracker},
    },
    provision::FileHandle,
};

/// A handle to the MPV worker thread.
pub struct MpvSink {
    command_tx: Sender<EngineCommand>,
}

impl MpvSink {
    /// Spawns the MPV worker thread and returns a new sink handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - Channel on which the worker reports [`SinkEvent`]s.
    pub fn new(event_tx: Sender<SinkEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<EngineCommand>();

        thread::spawn(move || {
            if let Err(e) = mpv_worker(command_rx, event_tx) {
                log::error!("MPV worker failure: {:#}", e);
            }
        });

        Self { command_tx }
    }

    fn send(&self, command: EngineCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .context("MPV worker is not running")
    }
}

impl MediaSink for MpvSink {
    type Handle = FileHandle;

    fn load_and_play(&mut self, handle: &FileHandle, tag: Tag) -> Result<()> {
        self.send(EngineCommand::Load(handle.path().to_path_buf(), tag))
    }

    fn pause(&mut self) -> Result<()> {
        self.send(EngineCommand::Pause)
    }

    fn resume(&mut self, tag: Tag) -> Result<()> {
        self.send(EngineCommand::Resume(tag))
    }

    fn stop(&mut self) -> Result<()> {
        self.send(EngineCommand::Stop)
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.send(EngineCommand::Seek(position))
    }

    fn set_volume(&mut self, level: f64) -> Result<()> {
        self.send(EngineCommand::Volume(level))
    }
}

impl Engine for mpv::MpvHandler {
    fn load(&mut self, filename: &str) -> Result<()> {
        self.command(&["loadfile", filename, "replace"])
            .with_context(|| format!("Failed to load file: {}", filename))
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.set_property("pause", paused)
            .context("Failed to set pause")
    }

    fn stop(&mut self) -> Result<()> {
        self.command(&["stop"]).context("Failed to stop")
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.command(&["seek", &position.to_string(), "absolute"])
            .with_context(|| format!("Failed to seek to {}", position))
    }

    fn set_volume(&mut self, level: f64) -> Result<()> {
        self.set_property("volume", level * 100.0)
            .context("Failed to set volume")
    }
}

/// The primary execution loop for the MPV backend.
///
/// Returns when the sink handle is dropped, or with an error if the MPV
/// context cannot be created or the event channel is closed.
fn mpv_worker(command_rx: Receiver<EngineCommand>, event_tx: Sender<SinkEvent>) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("vo", "null")
            .context("Failed to set no video output")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;

    let mut tracker = LoadTracker::default();

    while process_commands(&mut handler, &command_rx, &mut tracker, &event_tx)? {
        process_mpv_events(&mut handler, &mut tracker, &event_tx)?;
    }

    log::debug!("MPV sink dropped, worker exiting");

    Ok(())
}

/// Drains and applies all pending commands. Returns `false` once the sink
/// handle has gone away.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &Receiver<EngineCommand>,
    tracker: &mut LoadTracker,
    event_tx: &Sender<SinkEvent>,
) -> Result<bool> {
    loop {
        match command_rx.try_recv() {
            Ok(command) => engine::apply_command(handler, tracker, command, event_tx)?,
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Disconnected) => return Ok(false),
        }
    }
}

/// Polls for an MPV event for up to 50ms and reports it against the load it
/// belongs to.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    tracker: &mut LoadTracker,
    event_tx: &Sender<SinkEvent>,
) -> Result<()> {
    let Some(engine_event) = handler.wait_event(0.05).and_then(engine_event) else {
        return Ok(());
    };

    if let Some(event) = tracker.translate(engine_event) {
        event_tx.send(event).context("Failed to send sink event")?;
    }

    Ok(())
}

fn engine_event(event: mpv::Event) -> Option<EngineEvent> {
    match event {
        mpv::Event::StartFile => Some(EngineEvent::FileStarted),
        mpv::Event::FileLoaded => Some(EngineEvent::FileLoaded),
        mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
            ("duration", Format::Double(duration)) => Some(EngineEvent::Duration(duration)),
            ("time-pos", Format::Double(seconds)) => Some(EngineEvent::Position(seconds)),
            _ => None,
        },
        mpv::Event::EndFile(result) => Some(match result {
            Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF) => EngineEvent::EndOfFile,
            Ok(mpv::EndFileReason::MPV_END_FILE_REASON_ERROR) => {
                EngineEvent::EndWithError("MPV could not play the file".to_string())
            }
            Ok(_) => EngineEvent::EndOther,
            Err(e) => EngineEvent::EndWithError(format!("{:?}", e)),
        }),
        _ => None,
    }
}
