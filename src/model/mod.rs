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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the music panel: tracks and the
//! sources they are created from, the playback state machine's states, and the
//! tags used to correlate asynchronous sink callbacks with the load command
//! that caused them.

use std::{fmt, path::PathBuf, time::Duration};

/// Stable identifier assigned to a track when it enters the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Describes where a track comes from, before a resource handle exists for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// User-facing label, the source file name.
    pub name: String,
    pub path: PathBuf,
}

impl SourceDescriptor {
    /// Builds a descriptor for a file, labelled with its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self { name, path }
    }
}

/// Read-only view of a track, safe to hand out to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: TrackId,
    pub display_name: String,
    pub duration: Option<Duration>,
}

/// Represents the current status of the playback state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No current track.
    Idle,
    /// Start requested, the sink has not confirmed yet.
    Loading,
    Playing,
    Paused,
    /// The last start attempt failed, the current index is kept for a retry.
    Errored,
}

/// Identifies one load command issued to the media sink.
///
/// `index` is the playlist index at the time the command was issued,
/// `generation` increases with every load and every stop. Only callbacks
/// carrying the live generation are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    pub index: usize,
    pub generation: u64,
}

/// Last known playback position reported by the sink, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub position: f64,
    pub duration: f64,
}

impl Progress {
    /// Position as a fraction of the duration, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
