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

//! Playback control and state management.
//!
//! This module provides the [`Controller`], which owns the current-track
//! pointer and the playback state machine. It issues commands to a
//! [`MediaSink`] and interprets the sink's asynchronous [`SinkEvent`]s, keeping
//! a [`PlaybackObserver`] informed of every change.
//!
//! # Stale callbacks
//!
//! Sink commands return immediately and their outcome arrives later, possibly
//! after newer commands were issued. Every load carries a [`Tag`] and every
//! callback echoes it back; a callback whose tag no longer matches the live
//! load is dropped. No cancellation handshake with the sink is needed.

#[cfg(any(feature = "mpv", test))]
mod engine;
#[cfg(feature = "mpv")]
pub mod mpv;

use std::sync::mpsc::Sender;

use anyhow::Result;

use crate::{
    error::PlaylistError,
    model::{PlaybackState, Progress, Tag, TrackId},
    registry::{Registry, ResourceProvider},
};

/// The external media-playback primitive.
///
/// Every method only issues a command. Outcomes come back later as
/// [`SinkEvent`]s tagged with the [`Tag`] given to `load_and_play` or
/// `resume`. An `Err` means the command could not be issued at all.
pub trait MediaSink {
    type Handle;

    fn load_and_play(&mut self, handle: &Self::Handle, tag: Tag) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self, tag: Tag) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    /// Moves playback to `position` seconds.
    fn seek(&mut self, position: f64) -> Result<()>;
    /// Sets the output level, always in `[0, 1]`.
    fn set_volume(&mut self, level: f64) -> Result<()>;
}

/// Asynchronous notifications emitted by a [`MediaSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Started(Tag),
    Failed(Tag, String),
    Progress {
        tag: Tag,
        position: f64,
        duration: f64,
    },
    Ended(Tag),
}

impl SinkEvent {
    pub fn tag(&self) -> Tag {
        match self {
            SinkEvent::Started(tag)
            | SinkEvent::Failed(tag, _)
            | SinkEvent::Progress { tag, .. }
            | SinkEvent::Ended(tag) => *tag,
        }
    }
}

/// Receives read-only notifications for rendering the player.
pub trait PlaybackObserver {
    fn state_changed(&mut self, _state: PlaybackState, _current: Option<usize>) {}

    fn progress(&mut self, _index: usize, _progress: Progress) {}

    fn playback_failed(&mut self, _error: &PlaylistError) {}
}

impl PlaybackObserver for () {}

/// Observer notifications in message form, for hosts that run an event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotification {
    StateChanged {
        state: PlaybackState,
        current: Option<usize>,
    },
    Progress {
        index: usize,
        progress: Progress,
    },
    Failed(PlaylistError),
}

impl PlaybackObserver for Sender<PlayerNotification> {
    fn state_changed(&mut self, state: PlaybackState, current: Option<usize>) {
        let _ = self.send(PlayerNotification::StateChanged { state, current });
    }

    fn progress(&mut self, index: usize, progress: Progress) {
        let _ = self.send(PlayerNotification::Progress { index, progress });
    }

    fn playback_failed(&mut self, error: &PlaylistError) {
        let _ = self.send(PlayerNotification::Failed(error.clone()));
    }
}

/// The playback state machine.
///
/// Invariant: `current` is `None` exactly when the state is
/// [`PlaybackState::Idle`]. Keeping `current` inside the playlist bounds after
/// structural changes relies on the owner calling
/// [`on_registry_removed`](Self::on_registry_removed) and
/// [`on_registry_cleared`](Self::on_registry_cleared).
pub struct Controller<S, O> {
    sink: S,
    observer: O,
    state: PlaybackState,
    current: Option<usize>,
    generation: u64,
    progress: Option<Progress>,
    volume: f64,
}

impl<S: MediaSink, O: PlaybackObserver> Controller<S, O> {
    pub fn new(sink: S, observer: O) -> Self {
        Self {
            sink,
            observer,
            state: PlaybackState::Idle,
            current: None,
            generation: 0,
            progress: None,
            volume: 1.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Last position/duration reported for the current track.
    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Loads and starts the track at `index`.
    ///
    /// Fails with [`PlaylistError::OutOfRange`] without touching any state.
    /// Otherwise the controller enters [`PlaybackState::Loading`] and waits for
    /// the sink to confirm or reject the start.
    pub fn play_at<P>(&mut self, registry: &Registry<P>, index: usize) -> Result<(), PlaylistError>
    where
        P: ResourceProvider<Handle = S::Handle>,
    {
        let track = registry.get(index)?;

        if self.current.is_some_and(|current| current != index) {
            let result = self.sink.stop();
            self.command("stop", result);
        }

        self.generation += 1;
        let tag = Tag {
            index,
            generation: self.generation,
        };

        self.current = Some(index);
        self.progress = None;
        self.set_state(PlaybackState::Loading);

        log::info!("Loading track {} '{}' at position {}", track.id, track.display_name, index);

        if let Err(e) = self.sink.load_and_play(&track.handle, tag) {
            self.fail(index, format!("{:#}", e));
        }

        Ok(())
    }

    /// Starts, pauses, resumes or retries depending on the current state.
    pub fn toggle_play_pause<P>(&mut self, registry: &Registry<P>) -> Result<(), PlaylistError>
    where
        P: ResourceProvider<Handle = S::Handle>,
    {
        match (self.state, self.current) {
            (PlaybackState::Idle, _) => {
                if !registry.is_empty() {
                    self.play_at(registry, 0)?;
                }
            }
            (PlaybackState::Playing, Some(_)) => {
                let result = self.sink.pause();
                if self.command("pause", result) {
                    self.set_state(PlaybackState::Paused);
                }
            }
            (PlaybackState::Paused, Some(index)) => {
                self.set_state(PlaybackState::Loading);
                let tag = self.live_tag(index);
                if let Err(e) = self.sink.resume(tag) {
                    self.fail(index, format!("{:#}", e));
                }
            }
            (PlaybackState::Errored, Some(index)) => self.play_at(registry, index)?,
            (state, current) => {
                log::debug!("Ignoring play/pause while {:?} at {:?}", state, current);
            }
        }

        Ok(())
    }

    /// Plays the following track, wrapping from the last to the first.
    pub fn next<P>(&mut self, registry: &Registry<P>) -> Result<(), PlaylistError>
    where
        P: ResourceProvider<Handle = S::Handle>,
    {
        let len = registry.len();
        if len == 0 {
            return Ok(());
        }

        let index = match self.current {
            Some(current) => (current + 1) % len,
            None => 0,
        };

        self.play_at(registry, index)
    }

    /// Plays the preceding track, wrapping from the first to the last.
    pub fn prev<P>(&mut self, registry: &Registry<P>) -> Result<(), PlaylistError>
    where
        P: ResourceProvider<Handle = S::Handle>,
    {
        let len = registry.len();
        if len == 0 {
            return Ok(());
        }

        let index = match self.current {
            Some(current) => (current + len - 1) % len,
            None => 0,
        };

        self.play_at(registry, index)
    }

    /// Unloads the sink and forgets the current track. Idempotent.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }

        let result = self.sink.stop();
        self.command("stop", result);

        self.generation += 1;
        self.current = None;
        self.progress = None;
        self.set_state(PlaybackState::Idle);
    }

    /// Re-aligns the current index after the track at `removed_index` left the
    /// playlist.
    pub fn on_registry_removed(&mut self, removed_index: usize, removed: TrackId) {
        let Some(current) = self.current else {
            return;
        };

        if removed_index == current {
            log::debug!("Current track {} was removed, stopping", removed);
            self.stop();
        } else if removed_index < current {
            // Same track, one position earlier
            self.current = Some(current - 1);
            self.observer.state_changed(self.state, self.current);
        }
    }

    pub fn on_registry_cleared(&mut self) {
        self.stop();
    }

    /// Applies a sink callback, unless it belongs to a superseded load.
    pub fn handle_sink_event<P>(&mut self, registry: &Registry<P>, event: SinkEvent)
    where
        P: ResourceProvider<Handle = S::Handle>,
    {
        let Some(index) = self.current.filter(|_| event.tag().generation == self.generation) else {
            log::debug!("Discarding stale sink event {:?}", event);
            return;
        };

        match event {
            SinkEvent::Started(_) => {
                if self.state == PlaybackState::Loading {
                    self.set_state(PlaybackState::Playing);
                }
            }
            SinkEvent::Failed(_, reason) => self.fail(index, reason),
            SinkEvent::Progress {
                position, duration, ..
            } => {
                if !duration.is_finite() || !position.is_finite() {
                    return;
                }
                let progress = Progress { position, duration };
                self.progress = Some(progress);
                self.observer.progress(index, progress);
            }
            SinkEvent::Ended(_) => {
                log::debug!("Track at position {} finished", index);
                if let Err(e) = self.next(registry) {
                    log::warn!("Failed to advance after track end: {}", e);
                }
            }
        }
    }

    /// Moves playback to `fraction` of the current track, clamped to `[0, 1]`.
    ///
    /// Does nothing unless a track is playing or paused and its duration is
    /// known.
    pub fn seek(&mut self, fraction: f64) {
        if !matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) || fraction.is_nan() {
            return;
        }

        let Some(progress) = self.progress.filter(|p| p.duration.is_finite()) else {
            return;
        };

        let position = fraction.clamp(0.0, 1.0) * progress.duration;
        let result = self.sink.seek(position);
        if self.command("seek", result) {
            self.progress = Some(Progress { position, ..progress });
        }
    }

    /// Sets the output level, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, level: f64) {
        let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
        self.volume = level;

        let result = self.sink.set_volume(level);
        self.command("set volume", result);
    }

    fn live_tag(&self, index: usize) -> Tag {
        Tag {
            index,
            generation: self.generation,
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
        self.observer.state_changed(state, self.current);
    }

    fn fail(&mut self, index: usize, reason: String) {
        let error = PlaylistError::PlaybackFailed { index, reason };
        log::warn!("{}", error);

        self.set_state(PlaybackState::Errored);
        self.observer.playback_failed(&error);
    }

    // Logs a sink command failure, returns whether the command was issued.
    fn command(&self, name: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Sink {} command failed: {:#}", name, e);
                false
            }
        }
    }
}
