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

//! Track registry.
//!
//! The registry owns the ordered playlist and the resource handle behind every
//! track in it. Handles are obtained from a [`ResourceProvider`] when tracks are
//! added and handed back to it, exactly once, when tracks are removed or the
//! playlist is cleared.
//!
//! The registry knows nothing about playback. Stopping the sink before a
//! loaded track's handle is released is the caller's job, see
//! [`Transport`](crate::transport::Transport).

use std::time::Duration;

use anyhow::Result;

use crate::{
    error::PlaylistError,
    model::{SourceDescriptor, TrackId, TrackInfo},
};

/// Produces and reclaims the resource handles that back playlist tracks.
pub trait ResourceProvider {
    type Handle;

    /// Obtains a handle for a source.
    fn acquire(&mut self, source: &SourceDescriptor) -> Result<Self::Handle>;

    /// Returns a handle to the provider. Taking the handle by value makes a
    /// second release of the same handle impossible.
    fn release(&mut self, handle: Self::Handle);

    /// Duration of the audio behind a handle, if the provider knows it.
    fn duration_hint(&self, _handle: &Self::Handle) -> Option<Duration> {
        None
    }
}

/// One playable item in the playlist.
#[derive(Debug)]
pub struct Track<H> {
    pub id: TrackId,
    pub display_name: String,
    pub duration: Option<Duration>,
    pub handle: H,
}

impl<H> Track<H> {
    pub fn info(&self) -> TrackInfo {
        TrackInfo {
            id: self.id,
            display_name: self.display_name.clone(),
            duration: self.duration,
        }
    }
}

/// Outcome of adding a batch of sources.
#[derive(Debug, Default)]
pub struct AddReport {
    /// Tracks appended to the playlist, in input order.
    pub added: Vec<TrackInfo>,
    /// One [`PlaylistError::AcquisitionFailed`] per skipped source.
    pub failed: Vec<PlaylistError>,
}

pub struct Registry<P: ResourceProvider> {
    provider: P,
    tracks: Vec<Track<P::Handle>>,
    next_id: u64,
}

impl<P: ResourceProvider> Registry<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            tracks: Vec::new(),
            next_id: 1,
        }
    }

    /// Acquires a handle for each source and appends the resulting tracks.
    ///
    /// Sources are independent: a source whose acquisition fails is skipped
    /// and reported, the others are still added in their original order.
    pub fn add<I>(&mut self, sources: I) -> AddReport
    where
        I: IntoIterator<Item = SourceDescriptor>,
    {
        let mut report = AddReport::default();

        for source in sources {
            let handle = match self.provider.acquire(&source) {
                Ok(handle) => handle,
                Err(e) => {
                    log::warn!("Skipping {:?}: {:#}", source.path, e);
                    report.failed.push(PlaylistError::AcquisitionFailed {
                        name: source.name,
                        reason: format!("{:#}", e),
                    });
                    continue;
                }
            };

            let track = Track {
                id: TrackId(self.next_id),
                display_name: source.name,
                duration: self.provider.duration_hint(&handle),
                handle,
            };
            self.next_id += 1;

            log::debug!("Added track {} '{}'", track.id, track.display_name);
            report.added.push(track.info());
            self.tracks.push(track);
        }

        report
    }

    /// Removes the track at `index` and releases its handle.
    pub fn remove_at(&mut self, index: usize) -> Result<TrackInfo, PlaylistError> {
        self.check_index(index)?;

        let track = self.tracks.remove(index);
        let info = track.info();
        self.provider.release(track.handle);

        log::debug!("Removed track {} '{}' from position {}", info.id, info.display_name, index);

        Ok(info)
    }

    /// Releases every handle and empties the playlist.
    pub fn clear(&mut self) {
        if self.tracks.is_empty() {
            return;
        }

        let count = self.tracks.len();
        for track in self.tracks.drain(..) {
            self.provider.release(track.handle);
        }

        log::debug!("Cleared {} track(s)", count);
    }

    pub fn get(&self, index: usize) -> Result<&Track<P::Handle>, PlaylistError> {
        self.check_index(index)?;
        Ok(&self.tracks[index])
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Snapshot of the playlist for list rendering.
    pub fn tracks(&self) -> Vec<TrackInfo> {
        self.tracks.iter().map(Track::info).collect()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), PlaylistError> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaylistError::OutOfRange {
                index,
                len: self.tracks.len(),
            })
        }
    }
}

impl<P: ResourceProvider> Drop for Registry<P> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashMap;

    /// Hands out numbered handles and counts how often each one comes back.
    #[derive(Default)]
    struct CountingProvider {
        next: u32,
        released: HashMap<u32, usize>,
    }

    impl ResourceProvider for CountingProvider {
        type Handle = u32;

        fn acquire(&mut self, source: &SourceDescriptor) -> Result<u32> {
            if source.name.starts_with("bad") {
                bail!("unreadable");
            }
            self.next += 1;
            Ok(self.next)
        }

        fn release(&mut self, handle: u32) {
            *self.released.entry(handle).or_default() += 1;
        }
    }

    fn sources(names: &[&str]) -> Vec<SourceDescriptor> {
        names
            .iter()
            .map(|n| SourceDescriptor::from_path(format!("/music/{}", n)))
            .collect()
    }

    #[test]
    fn add_preserves_order_and_assigns_fresh_ids() {
        let mut registry = Registry::new(CountingProvider::default());

        let report = registry.add(sources(&["a.mp3", "b.mp3", "a.mp3"]));

        assert!(report.failed.is_empty());
        let names: Vec<_> = registry.tracks().into_iter().map(|t| t.display_name).collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3", "a.mp3"]);

        let ids: Vec<_> = report.added.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TrackId(1), TrackId(2), TrackId(3)]);
    }

    #[test]
    fn failed_acquisition_skips_only_that_source() {
        let mut registry = Registry::new(CountingProvider::default());

        let report = registry.add(sources(&["a.mp3", "bad.mp3", "c.mp3"]));

        assert_eq!(report.added.len(), 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            report.failed,
            vec![PlaylistError::AcquisitionFailed {
                name: "bad.mp3".into(),
                reason: "unreadable".into()
            }]
        );
        assert_eq!(registry.get(1).unwrap().display_name, "c.mp3");
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut registry = Registry::new(CountingProvider::default());
        registry.add(sources(&["a.mp3", "b.mp3"]));
        registry.remove_at(1).unwrap();

        let report = registry.add(sources(&["c.mp3"]));

        assert_eq!(report.added[0].id, TrackId(3));
    }

    #[test]
    fn remove_at_releases_the_handle_once() {
        let mut registry = Registry::new(CountingProvider::default());
        registry.add(sources(&["a.mp3", "b.mp3"]));

        let removed = registry.remove_at(0).unwrap();

        assert_eq!(removed.display_name, "a.mp3");
        assert_eq!(registry.provider().released.get(&1), Some(&1));
        assert_eq!(registry.provider().released.get(&2), None);
        assert_eq!(registry.get(0).unwrap().display_name, "b.mp3");
    }

    #[test]
    fn remove_at_rejects_bad_index_without_change() {
        let mut registry = Registry::new(CountingProvider::default());
        registry.add(sources(&["a.mp3"]));

        let err = registry.remove_at(1).unwrap_err();

        assert_eq!(err, PlaylistError::OutOfRange { index: 1, len: 1 });
        assert_eq!(registry.len(), 1);
        assert!(registry.provider().released.is_empty());
    }

    #[test]
    fn clear_releases_everything_and_is_repeatable() {
        let mut registry = Registry::new(CountingProvider::default());
        registry.add(sources(&["a.mp3", "b.mp3"]));

        registry.clear();
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.provider().released.get(&1), Some(&1));
        assert_eq!(registry.provider().released.get(&2), Some(&1));
    }

    #[test]
    fn get_is_bounds_checked() {
        let registry = Registry::new(CountingProvider::default());
        assert_eq!(
            registry.get(0).unwrap_err(),
            PlaylistError::OutOfRange { index: 0, len: 0 }
        );
    }
}
