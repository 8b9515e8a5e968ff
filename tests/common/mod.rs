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

//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use anyhow::{Result, bail};
use panelplay::{
    MediaSink, PlaybackObserver, ResourceProvider, SinkEvent, SourceDescriptor, Tag, Transport,
    TransportOptions,
};

/// Everything the fakes were asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Acquired(String),
    Released(String),
    Load(String, Tag),
    Pause,
    Resume(Tag),
    Stop,
    Seek(f64),
    Volume(f64),
}

pub type Journal = Rc<RefCell<Vec<Entry>>>;

#[derive(Debug)]
pub struct FakeHandle(String);

/// Acquires any source except those named `broken*`.
pub struct FakeProvider {
    journal: Journal,
}

impl ResourceProvider for FakeProvider {
    type Handle = FakeHandle;

    fn acquire(&mut self, source: &SourceDescriptor) -> Result<FakeHandle> {
        if source.name.starts_with("broken") {
            bail!("cannot read {}", source.name);
        }
        self.journal.borrow_mut().push(Entry::Acquired(source.name.clone()));
        Ok(FakeHandle(source.name.clone()))
    }

    fn release(&mut self, handle: FakeHandle) {
        self.journal.borrow_mut().push(Entry::Released(handle.0));
    }
}

pub struct FakeSink {
    journal: Journal,
}

impl FakeSink {
    fn record(&self, entry: Entry) -> Result<()> {
        self.journal.borrow_mut().push(entry);
        Ok(())
    }
}

impl MediaSink for FakeSink {
    type Handle = FakeHandle;

    fn load_and_play(&mut self, handle: &FakeHandle, tag: Tag) -> Result<()> {
        self.record(Entry::Load(handle.0.clone(), tag))
    }

    fn pause(&mut self) -> Result<()> {
        self.record(Entry::Pause)
    }

    fn resume(&mut self, tag: Tag) -> Result<()> {
        self.record(Entry::Resume(tag))
    }

    fn stop(&mut self) -> Result<()> {
        self.record(Entry::Stop)
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.record(Entry::Seek(position))
    }

    fn set_volume(&mut self, level: f64) -> Result<()> {
        self.record(Entry::Volume(level))
    }
}

pub type TestTransport = Transport<FakeProvider, FakeSink, ()>;

pub struct Harness {
    pub transport: TestTransport,
    pub journal: Journal,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(TransportOptions::default())
    }

    pub fn with_options(options: TransportOptions) -> Self {
        let journal = Journal::default();
        let transport = Transport::new(provider(&journal), sink(&journal), (), options);

        Self { transport, journal }
    }

    /// A harness whose playlist holds `names`, in order.
    pub fn with_tracks(names: &[&str]) -> Self {
        let mut harness = Self::new();
        harness.transport.add_tracks(sources(names));
        harness
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.journal.borrow().clone()
    }

    /// Tag of the most recent load command.
    pub fn last_load(&self) -> Tag {
        self.journal
            .borrow()
            .iter()
            .rev()
            .find_map(|e| match e {
                Entry::Load(_, tag) => Some(*tag),
                _ => None,
            })
            .expect("no load issued")
    }

    pub fn last_loaded_name(&self) -> String {
        self.journal
            .borrow()
            .iter()
            .rev()
            .find_map(|e| match e {
                Entry::Load(name, _) => Some(name.clone()),
                _ => None,
            })
            .expect("no load issued")
    }

    pub fn count(&self, entry: &Entry) -> usize {
        self.journal.borrow().iter().filter(|e| *e == entry).count()
    }

    /// Plays `index` and confirms the start from the sink.
    pub fn start(&mut self, index: usize) {
        self.transport.play_at(index).unwrap();
        let tag = self.last_load();
        self.transport.handle_sink_event(SinkEvent::Started(tag));
    }

    pub fn report_duration(&mut self, duration: f64) {
        let tag = self.last_load();
        self.transport.handle_sink_event(SinkEvent::Progress {
            tag,
            position: 0.0,
            duration,
        });
    }

    /// Checks the controller invariant against the current playlist.
    pub fn assert_consistent(&self) {
        let state = self.transport.state();
        match self.transport.current_index() {
            None => assert_eq!(state, panelplay::PlaybackState::Idle),
            Some(index) => {
                assert_ne!(state, panelplay::PlaybackState::Idle);
                assert!(index < self.transport.len());
            }
        }
    }
}

pub fn provider(journal: &Journal) -> FakeProvider {
    FakeProvider {
        journal: Rc::clone(journal),
    }
}

pub fn sink(journal: &Journal) -> FakeSink {
    FakeSink {
        journal: Rc::clone(journal),
    }
}

pub fn sources(names: &[&str]) -> Vec<SourceDescriptor> {
    names
        .iter()
        .map(|name| SourceDescriptor::from_path(format!("/music/{}", name)))
        .collect()
}

/// Observer that remembers every state it was told about.
#[derive(Default)]
pub struct StateLog(pub Vec<panelplay::PlaybackState>);

impl PlaybackObserver for StateLog {
    fn state_changed(&mut self, state: panelplay::PlaybackState, _current: Option<usize>) {
        self.0.push(state);
    }
}
