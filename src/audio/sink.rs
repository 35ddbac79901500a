//! Opening `rodio` sinks for a track locator.
//!
//! Sources are read fully into memory (local file, remote URL or transient
//! locator) off the audio thread, then probed for their duration and
//! decoded from a cursor.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use lofty::file::AudioFile;
use lofty::probe::Probe;
use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use crate::error::{Error, Result};
use crate::library::Locator;
use crate::playlist::BlobRegistry;
use crate::resource::{self, Location};

/// Bytes behind `locator`.
pub(super) fn read_source(locator: &Locator, blobs: &BlobRegistry) -> Result<Arc<[u8]>> {
    match locator {
        Locator::Path(p) => Ok(resource::fetch_bytes(&Location::Path(p.clone()))?.into()),
        Locator::Url(u) => Ok(resource::fetch_bytes(&Location::Url(u.clone()))?.into()),
        Locator::Blob(id) => {
            let content = blobs.resolve(*id).ok_or(Error::Released(*id))?;
            Ok(content.read()?)
        }
    }
}

/// Duration from container metadata, when the format carries one.
pub(super) fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration()).filter(|d| !d.is_zero())
}

/// Create a paused `Sink` on `mixer` for already-read source bytes,
/// returning it with the track duration.
pub(super) fn sink_from_bytes(mixer: &Mixer, bytes: Arc<[u8]>) -> Result<(Sink, Option<Duration>)> {
    let probed = probe_duration(&bytes);

    let source = Decoder::new(Cursor::new(bytes)).map_err(|e| Error::Decode(e.to_string()))?;
    let duration = probed.or_else(|| source.total_duration());

    let sink = Sink::connect_new(mixer);
    sink.pause();
    sink.append(source);
    Ok((sink, duration))
}
