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

//! Transport facade.
//!
//! [`Transport`] is the only surface the surrounding UI talks to. It composes
//! the [`Registry`] and the [`Controller`] and keeps the two consistent: every
//! structural change to the playlist is followed, before returning, by the
//! controller update that keeps the current index pointing at the same track.

use crate::{
    config::AppConfig,
    error::PlaylistError,
    model::{PlaybackState, Progress, SourceDescriptor, TrackInfo},
    player::{Controller, MediaSink, PlaybackObserver, SinkEvent},
    registry::{AddReport, Registry, ResourceProvider},
};

/// Behaviour switches for a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportOptions {
    /// Start the first track when tracks are added while nothing is current.
    pub autoplay: bool,
    /// Volume applied to the sink when the transport is created.
    pub volume: f64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            volume: 1.0,
        }
    }
}

impl From<&AppConfig> for TransportOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            autoplay: config.autoplay,
            volume: config.volume,
        }
    }
}

pub struct Transport<P, S, O>
where
    P: ResourceProvider,
    S: MediaSink<Handle = P::Handle>,
    O: PlaybackObserver,
{
    registry: Registry<P>,
    controller: Controller<S, O>,
    autoplay: bool,
}

impl<P, S, O> Transport<P, S, O>
where
    P: ResourceProvider,
    S: MediaSink<Handle = P::Handle>,
    O: PlaybackObserver,
{
    pub fn new(provider: P, sink: S, observer: O, options: TransportOptions) -> Self {
        let mut controller = Controller::new(sink, observer);
        controller.set_volume(options.volume);

        Self {
            registry: Registry::new(provider),
            controller,
            autoplay: options.autoplay,
        }
    }

    /// Appends tracks for `sources`, skipping (and reporting) any source whose
    /// handle cannot be acquired.
    pub fn add_tracks<I>(&mut self, sources: I) -> AddReport
    where
        I: IntoIterator<Item = SourceDescriptor>,
    {
        let report = self.registry.add(sources);

        log::info!(
            "Added {} track(s), {} skipped",
            report.added.len(),
            report.failed.len()
        );

        if self.autoplay && !report.added.is_empty() && self.controller.state() == PlaybackState::Idle {
            if let Err(e) = self.controller.play_at(&self.registry, 0) {
                log::warn!("Autoplay failed: {}", e);
            }
        }

        report
    }

    /// Removes the track at `index`, stopping playback first if it is the
    /// current track.
    pub fn remove_track(&mut self, index: usize) -> Result<TrackInfo, PlaylistError> {
        self.registry.check_index(index)?;

        // The sink must let go of a handle before it is released
        if self.controller.current_index() == Some(index) {
            self.controller.stop();
        }

        let removed = self.registry.remove_at(index)?;
        self.controller.on_registry_removed(index, removed.id);

        Ok(removed)
    }

    /// Stops playback and removes every track.
    pub fn clear_all(&mut self) {
        self.controller.on_registry_cleared();
        self.registry.clear();
    }

    pub fn play_at(&mut self, index: usize) -> Result<(), PlaylistError> {
        self.controller.play_at(&self.registry, index)
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), PlaylistError> {
        self.controller.toggle_play_pause(&self.registry)
    }

    pub fn next(&mut self) -> Result<(), PlaylistError> {
        self.controller.next(&self.registry)
    }

    pub fn prev(&mut self) -> Result<(), PlaylistError> {
        self.controller.prev(&self.registry)
    }

    pub fn seek(&mut self, fraction: f64) {
        self.controller.seek(fraction);
    }

    pub fn set_volume(&mut self, level: f64) {
        self.controller.set_volume(level);
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Feeds an asynchronous sink callback into the controller.
    pub fn handle_sink_event(&mut self, event: SinkEvent) {
        self.controller.handle_sink_event(&self.registry, event);
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.controller.current_index()
    }

    pub fn current_track(&self) -> Option<TrackInfo> {
        let index = self.controller.current_index()?;
        self.registry.get(index).ok().map(|track| track.info())
    }

    /// Label for the now-playing line.
    pub fn now_playing(&self) -> String {
        self.track_label(self.controller.current_index())
    }

    /// Now-playing label for the track at `index`, as reported by a
    /// notification. The playlist may have changed since it was sent.
    pub fn track_label(&self, index: Option<usize>) -> String {
        match index.and_then(|i| self.registry.get(i).ok()) {
            Some(track) => format!("Playing: {}", track.display_name),
            None => "No track".to_string(),
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        self.controller.progress()
    }

    pub fn volume(&self) -> f64 {
        self.controller.volume()
    }

    pub fn tracks(&self) -> Vec<TrackInfo> {
        self.registry.tracks()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn provider(&self) -> &P {
        self.registry.provider()
    }

    pub fn sink(&self) -> &S {
        self.controller.sink()
    }

    pub fn observer(&self) -> &O {
        self.controller.observer()
    }
}

impl<P, S, O> Drop for Transport<P, S, O>
where
    P: ResourceProvider,
    S: MediaSink<Handle = P::Handle>,
    O: PlaybackObserver,
{
    fn drop(&mut self) {
        // Unload before the registry releases the remaining handles
        self.controller.stop();
    }
}
