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

//! Engine-independent half of the sink worker.
//!
//! The worker owning an audio engine does two things that have nothing to do
//! with the engine itself: applying [`EngineCommand`]s without letting a
//! single failed command take the worker down, and deciding which [`Tag`] an
//! engine event belongs to.
//!
//! The second matters because a load command is applied before events that
//! were already queued for the previous file have been read. A new tag is
//! therefore only *pending* until the engine reports that the new file has
//! started; events arriving before that still belong to the old tag, which the
//! controller then discards as stale.

use std::{path::PathBuf, sync::mpsc::Sender};

use anyhow::{Context, Result};

use crate::{model::Tag, player::SinkEvent};

#[derive(Debug)]
pub(crate) enum EngineCommand {
    Load(PathBuf, Tag),
    Pause,
    Resume(Tag),
    Stop,
    Seek(f64),
    Volume(f64),
}

/// Playback operations the worker needs from an audio engine.
pub(crate) trait Engine {
    fn load(&mut self, filename: &str) -> Result<()>;
    fn set_paused(&mut self, paused: bool) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn seek(&mut self, position: f64) -> Result<()>;
    /// `level` is in `[0, 1]`.
    fn set_volume(&mut self, level: f64) -> Result<()>;
}

/// Engine events the worker cares about.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineEvent {
    FileStarted,
    FileLoaded,
    Duration(f64),
    Position(f64),
    EndOfFile,
    EndWithError(String),
    /// The file ended because it was stopped or replaced.
    EndOther,
}

/// Tracks which load the engine is currently playing.
#[derive(Debug, Default)]
pub(crate) struct LoadTracker {
    pending: Option<Tag>,
    active: Option<Tag>,
    duration: Option<f64>,
}

impl LoadTracker {
    pub(crate) fn load_requested(&mut self, tag: Tag) {
        self.pending = Some(tag);
    }

    pub(crate) fn stopped(&mut self) {
        *self = Self::default();
    }

    /// Attributes an engine event to a load, returning the sink callback to
    /// report, if any.
    pub(crate) fn translate(&mut self, event: EngineEvent) -> Option<SinkEvent> {
        if event == EngineEvent::FileStarted {
            if let Some(tag) = self.pending.take() {
                self.active = Some(tag);
                self.duration = None;
            }
            return None;
        }

        let tag = self.active?;

        match event {
            EngineEvent::FileStarted | EngineEvent::EndOther => None,
            EngineEvent::FileLoaded => Some(SinkEvent::Started(tag)),
            EngineEvent::Duration(duration) => {
                self.duration = Some(duration);
                None
            }
            EngineEvent::Position(seconds) if seconds >= 0.0 => Some(SinkEvent::Progress {
                tag,
                position: seconds,
                duration: self.duration.unwrap_or(f64::NAN),
            }),
            EngineEvent::Position(_) => None,
            EngineEvent::EndOfFile => {
                self.active = None;
                Some(SinkEvent::Ended(tag))
            }
            EngineEvent::EndWithError(reason) => {
                self.active = None;
                Some(SinkEvent::Failed(tag, reason))
            }
        }
    }
}

/// Applies one command to the engine.
///
/// A command the engine rejects is reported (load and resume failures as
/// [`SinkEvent::Failed`], anything else in the log) and the worker carries
/// on. Only a closed event channel is returned as an error.
pub(crate) fn apply_command<E: Engine>(
    engine: &mut E,
    tracker: &mut LoadTracker,
    command: EngineCommand,
    event_tx: &Sender<SinkEvent>,
) -> Result<()> {
    match command {
        EngineCommand::Load(path, tag) => {
            let started = path
                .to_str()
                .context("Path contains invalid UTF-8")
                .and_then(|filename| {
                    engine.load(filename)?;
                    engine.set_paused(false)
                });

            match started {
                Ok(()) => tracker.load_requested(tag),
                Err(e) => event_tx.send(SinkEvent::Failed(tag, format!("{:#}", e)))?,
            }
        }
        EngineCommand::Pause => warn_on_failure("pause", engine.set_paused(true)),
        EngineCommand::Resume(tag) => match engine.set_paused(false) {
            Ok(()) => event_tx.send(SinkEvent::Started(tag))?,
            Err(e) => event_tx.send(SinkEvent::Failed(tag, format!("{:#}", e)))?,
        },
        EngineCommand::Stop => {
            tracker.stopped();
            warn_on_failure("stop", engine.stop());
        }
        EngineCommand::Seek(position) => warn_on_failure("seek", engine.seek(position)),
        EngineCommand::Volume(level) => warn_on_failure("volume", engine.set_volume(level)),
    }

    Ok(())
}

fn warn_on_failure(name: &str, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("Engine {} command failed: {:#}", name, e);
    }
}
