//! Audio-related small types and handles.
//!
//! This module defines the output trait the player drives, the events the
//! output reports back, the commands sent to the audio thread and the shared
//! playback info handle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::library::Locator;

/// A single audio output handle holding at most one loaded source.
pub trait AudioOutput {
    /// Replace the current source with `locator` and start loading it, paused.
    fn load(&mut self, locator: &Locator);
    /// Start or resume playback of the loaded source.
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    /// Linear gain in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    /// Next pending event for the currently loaded source, if any.
    fn poll_event(&mut self) -> Option<MediaEvent>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Periodic position report while playing.
    TimeUpdate {
        position: Duration,
        duration: Option<Duration>,
    },
    /// The source played to its end.
    Ended,
    /// The source could not be loaded or decoded.
    Failed(String),
}

#[derive(Debug)]
pub(crate) enum AudioCmd {
    /// Replace the current sink with a paused one for `locator`.
    Load { generation: u64, locator: Locator },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
    /// Source bytes read by a fetch worker for load `generation`.
    Fetched {
        generation: u64,
        result: Result<Arc<[u8]>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceStatus {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed(String),
}

/// Playback information shared between the audio thread and the UI thread.
#[derive(Debug, Clone, Default)]
pub struct OutputInfo {
    /// Load generation the rest of the fields describe.
    pub generation: u64,
    pub status: SourceStatus,
    pub position: Duration,
    pub duration: Option<Duration>,
    /// Set when no output device could be opened.
    pub device_error: Option<String>,
}

pub type OutputHandle = Arc<Mutex<OutputInfo>>;

pub(crate) fn update_info(info: &OutputHandle, f: impl FnOnce(&mut OutputInfo)) {
    if let Ok(mut i) = info.lock() {
        f(&mut i);
    }
}

/// Like [`update_info`] but only while `generation` is still the current load.
pub(crate) fn update_info_for(info: &OutputHandle, generation: u64, f: impl FnOnce(&mut OutputInfo)) {
    update_info(info, |i| {
        if i.generation == generation {
            f(i);
        }
    });
}
