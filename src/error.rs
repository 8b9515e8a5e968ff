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

//! Error taxonomy for the playlist and playback controller.
//!
//! None of these are fatal. Stale sink callbacks are not errors at all, they
//! are dropped by the controller.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    /// An index outside `[0, len)` was passed to a playlist operation.
    #[error("index {index} is out of range for a playlist of {len} track(s)")]
    OutOfRange { index: usize, len: usize },

    /// The resource provider could not produce a handle for a source. The
    /// source is skipped, the rest of its batch is unaffected.
    #[error("failed to acquire '{name}': {reason}")]
    AcquisitionFailed { name: String, reason: String },

    /// The media sink reported a failure for the current track.
    #[error("playback of track {index} failed: {reason}")]
    PlaybackFailed { index: usize, reason: String },
}
