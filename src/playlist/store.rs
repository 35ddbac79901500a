use std::cmp::Ordering;

use tracing::{debug, info};

use crate::library::{
    BlobId, FileHandle, Locator, Track, is_audio_name, natural_cmp, normalize_extensions,
};
use crate::resource::Location;

use super::blobs::BlobRegistry;

/// One entry for [`PlaylistStore::set_external`].
#[derive(Debug, Clone)]
pub enum ExternalItem {
    /// A path or `http(s)` URL.
    Source(String),
    File(FileHandle),
}

/// Ordered tracks plus the current index.
///
/// `index` is always in range while the playlist is non-empty and `0` when it
/// is empty. Every successful reload releases the transient locators issued
/// by the load it replaces.
pub struct PlaylistStore {
    tracks: Vec<Track>,
    index: usize,
    blobs: BlobRegistry,
    issued: Vec<BlobId>,
    extensions: Vec<String>,
}

fn play_order(a: &Track, b: &Track) -> Ordering {
    natural_cmp(&a.filename, &b.filename)
        .then_with(|| natural_cmp(&a.locator.to_string(), &b.locator.to_string()))
}

impl PlaylistStore {
    pub fn new(blobs: BlobRegistry, extensions: &[String]) -> Self {
        Self {
            tracks: Vec::new(),
            index: 0,
            blobs,
            issued: Vec::new(),
            extensions: normalize_extensions(extensions),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    pub fn is_last(&self) -> bool {
        !self.tracks.is_empty() && self.index + 1 == self.tracks.len()
    }

    /// Move the current index. Returns false (and changes nothing) when out of range.
    pub fn set_index(&mut self, i: usize) -> bool {
        if i < self.tracks.len() {
            self.index = i;
            true
        } else {
            false
        }
    }

    fn is_audio(&self, handle: &FileHandle) -> bool {
        let mime_is_audio = handle
            .mime
            .as_deref()
            .map(|m| m.trim().to_ascii_lowercase().starts_with("audio/"))
            .unwrap_or(false);
        mime_is_audio || is_audio_name(&handle.name, &self.extensions)
    }

    fn issue_track(&self, handle: FileHandle, issued: &mut Vec<BlobId>) -> Track {
        let id = self.blobs.issue(handle.content);
        issued.push(id);
        Track::new(Locator::Blob(id), handle.name)
    }

    fn replace(&mut self, mut tracks: Vec<Track>, issued: Vec<BlobId>) {
        tracks.sort_by(play_order);
        for id in std::mem::replace(&mut self.issued, issued) {
            self.blobs.revoke(id);
        }
        self.tracks = tracks;
        self.index = 0;
        debug!(live = self.blobs.live_count(), "transient locators after reload");
    }

    /// Replace the playlist with manifest `entries` resolved against `base`.
    pub fn load_from_manifest(&mut self, base: &Location, entries: Vec<String>) -> usize {
        let tracks: Vec<Track> = entries
            .into_iter()
            .map(|entry| {
                let location = base.join(&entry);
                let filename = location.file_name().unwrap_or_else(|| entry.clone());
                Track::new(Locator::from(location), filename)
            })
            .collect();
        self.replace(tracks, Vec::new());
        info!(count = self.tracks.len(), %base, "playlist loaded from manifest");
        self.tracks.len()
    }

    /// Replace the playlist with the audio files among `handles`.
    ///
    /// Returns false, leaving everything untouched, when no handle is audio.
    pub fn load_from_local_selection(&mut self, handles: Vec<FileHandle>) -> bool {
        let mut audio: Vec<FileHandle> = handles.into_iter().filter(|h| self.is_audio(h)).collect();
        if audio.is_empty() {
            debug!("local selection has no audio files; ignoring");
            return false;
        }
        audio.sort_by(|a, b| natural_cmp(&a.name, &b.name));

        let mut issued = Vec::with_capacity(audio.len());
        let tracks: Vec<Track> = audio
            .into_iter()
            .map(|h| self.issue_track(h, &mut issued))
            .collect();
        self.replace(tracks, issued);
        info!(count = self.tracks.len(), "playlist loaded from local selection");
        true
    }

    /// Replace the playlist from a mix of source strings and file handles.
    ///
    /// File handles go through the same audio filter as a local selection.
    /// Returns false when nothing playable remains.
    pub fn set_external(&mut self, items: Vec<ExternalItem>) -> bool {
        let mut sources = Vec::new();
        let mut files = Vec::new();
        for item in items {
            match item {
                ExternalItem::Source(s) if !s.trim().is_empty() => sources.push(s),
                ExternalItem::Source(_) => {}
                ExternalItem::File(h) if self.is_audio(&h) => files.push(h),
                ExternalItem::File(h) => debug!(name = %h.name, "skipping non-audio file"),
            }
        }
        if sources.is_empty() && files.is_empty() {
            debug!("external playlist is empty; ignoring");
            return false;
        }

        let mut issued = Vec::with_capacity(files.len());
        let mut tracks: Vec<Track> = sources
            .into_iter()
            .map(|s| {
                let location = Location::parse(&s);
                let filename = location.file_name().unwrap_or_else(|| s.clone());
                Track::new(Locator::from(location), filename)
            })
            .collect();
        for h in files {
            tracks.push(self.issue_track(h, &mut issued));
        }
        self.replace(tracks, issued);
        info!(count = self.tracks.len(), "playlist set externally");
        true
    }
}

impl Drop for PlaylistStore {
    fn drop(&mut self) {
        for id in self.issued.drain(..) {
            self.blobs.revoke(id);
        }
    }
}
