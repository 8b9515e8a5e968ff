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

//! File-backed track provisioning.
//!
//! This module turns user-selected files and directories into
//! [`SourceDescriptor`]s, and provides [`FileProvider`], the
//! [`ResourceProvider`] that backs tracks with local audio files.
//!
//! It utilizes `WalkDir` for directory traversal and `Lofty` for reading the
//! duration hint shown in the playlist. Decoding is left entirely to the media
//! sink, so a file `Lofty` cannot read is still accepted.

use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use lofty::prelude::*;
use lofty::probe::Probe;
use walkdir::WalkDir;

use crate::{model::SourceDescriptor, registry::ResourceProvider};

/// Exclusive handle on a local audio file.
///
/// Not `Clone`: the only way to give one up is
/// [`ResourceProvider::release`].
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    duration: Option<Duration>,
}

impl FileHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Provides [`FileHandle`]s for files on the local filesystem.
#[derive(Debug, Default)]
pub struct FileProvider {
    outstanding: usize,
}

impl FileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl ResourceProvider for FileProvider {
    type Handle = FileHandle;

    fn acquire(&mut self, source: &SourceDescriptor) -> Result<FileHandle> {
        let path = &source.path;

        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        let duration = match Probe::open(path).and_then(|p| p.read()) {
            Ok(tagged_file) => Some(tagged_file.properties().duration()).filter(|d| !d.is_zero()),
            Err(e) => {
                log::debug!("No duration for {:?}: {}", path, e);
                None
            }
        };

        self.outstanding += 1;
        log::debug!("Acquired {:?}", path);

        Ok(FileHandle {
            path: path.clone(),
            duration,
        })
    }

    fn release(&mut self, handle: FileHandle) {
        self.outstanding = self.outstanding.saturating_sub(1);
        log::debug!("Released {:?}", handle.path);
    }

    fn duration_hint(&self, handle: &FileHandle) -> Option<Duration> {
        handle.duration
    }
}

/// Expands files and directories into track sources.
///
/// Files are taken as given. Directories are walked recursively, in file name
/// order, keeping only files whose extension is in `extensions` (compared
/// case-insensitively). Unreadable directory entries are skipped.
pub fn expand_sources<I, P>(paths: I, extensions: &[String]) -> Vec<SourceDescriptor>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut sources = Vec::new();

    for path in paths {
        let path = path.as_ref();

        if !path.is_dir() {
            sources.push(SourceDescriptor::from_path(path));
            continue;
        }

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| has_extension(e.path(), extensions))
        {
            sources.push(SourceDescriptor::from_path(entry.path()));
        }
    }

    sources
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        vec!["mp3".to_string(), "flac".to_string()]
    }

    #[test]
    fn expands_directories_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("disc2")).unwrap();
        fs::write(dir.path().join("b.mp3"), b"").unwrap();
        fs::write(dir.path().join("a.FLAC"), b"").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"").unwrap();
        fs::write(dir.path().join("disc2").join("c.mp3"), b"").unwrap();

        let sources = expand_sources([dir.path()], &extensions());

        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a.FLAC", "b.mp3", "c.mp3"]);
    }

    #[test]
    fn files_are_taken_as_given() {
        let sources = expand_sources(["/nowhere/notes.txt"], &extensions());

        assert_eq!(sources, vec![SourceDescriptor::from_path("/nowhere/notes.txt")]);
    }

    #[test]
    fn acquire_fails_for_missing_file() {
        let mut provider = FileProvider::new();

        let err = provider
            .acquire(&SourceDescriptor::from_path("/nowhere/missing.mp3"))
            .unwrap_err();

        assert!(format!("{:#}", err).contains("missing.mp3"));
        assert_eq!(provider.outstanding(), 0);
    }

    #[test]
    fn undecodable_file_is_acquired_without_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not-really.mp3");
        fs::write(&path, b"plain text").unwrap();
        let mut provider = FileProvider::new();

        let handle = provider.acquire(&SourceDescriptor::from_path(&path)).unwrap();

        assert_eq!(handle.path(), path.as_path());
        assert_eq!(provider.duration_hint(&handle), None);
        assert_eq!(provider.outstanding(), 1);

        provider.release(handle);
        assert_eq!(provider.outstanding(), 0);
    }
}
