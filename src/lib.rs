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

//! # Music panel playlist and playback controller.
//!
//! The crate owns an ordered playlist of user-supplied tracks, each backed by
//! an explicitly released resource handle, and drives an external media sink
//! through an asynchronous start/stop protocol.
//!
//! ## Architecture
//!
//! * [`registry`]: the playlist and the lifecycle of its resource handles.
//! * [`player`]: the playback state machine, which talks to the media sink
//!   and interprets its tagged callbacks.
//! * [`transport`]: the facade the surrounding UI calls, keeping the two
//!   consistent.
//!
//! Everything runs on a single thread of control: public operations and sink
//! callbacks are applied one at a time, in arrival order.

pub mod config;
pub mod error;
pub mod model;
pub mod player;
pub mod provision;
pub mod registry;
pub mod transport;
pub mod util;

pub use error::PlaylistError;
pub use model::{PlaybackState, Progress, SourceDescriptor, Tag, TrackId, TrackInfo};
pub use player::{MediaSink, PlaybackObserver, PlayerNotification, SinkEvent};
pub use registry::{AddReport, ResourceProvider};
pub use transport::{Transport, TransportOptions};
