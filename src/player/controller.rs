use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::audio::{AudioOutput, MediaEvent};
use crate::config::Settings;
use crate::library::{FileHandle, Track};
use crate::lyrics::{LyricSync, TextRequest, TextResponse, TextSource};
use crate::playlist::{ExternalItem, PlaylistStore};
use crate::resource::Location;

use super::events::{PlayerEvent, Subscribers};
use super::state::{PlaybackState, normalize_volume};

/// Shown in place of the verse list when a chapter has no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text found";

/// Where the current track's chapter text stands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextStatus {
    /// No track has been loaded yet.
    Idle,
    Loading,
    Loaded,
    /// Fetch failed or the text was empty.
    Missing,
}

#[derive(Debug, Clone)]
pub struct PlayerOptions {
    pub loop_enabled: bool,
    pub volume: Option<f64>,
    /// Delay between an end-of-track and the automatic `next()`.
    pub advance_delay: Duration,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            loop_enabled: true,
            volume: None,
            advance_delay: Duration::from_millis(300),
        }
    }
}

impl From<&Settings> for PlayerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            loop_enabled: settings.playback.loop_enabled,
            volume: Some(f64::from(settings.audio.volume)),
            advance_delay: Duration::from_millis(settings.playback.advance_delay_ms),
        }
    }
}

/// The playback controller.
///
/// All mutation goes through these methods on the event-loop thread; media
/// events and text replies are fed in by the loop (`pump_media`,
/// `apply_text`, `tick`).
pub struct Player<O, T> {
    store: PlaylistStore,
    state: PlaybackState,
    output: O,
    texts: T,
    lyrics: LyricSync,
    text_generation: u64,
    text_status: TextStatus,
    pending_advance: Option<Instant>,
    advance_delay: Duration,
    subscribers: Subscribers,
}

impl<O: AudioOutput, T: TextSource> Player<O, T> {
    pub fn new(store: PlaylistStore, mut output: O, texts: T, options: PlayerOptions) -> Self {
        let state = PlaybackState {
            is_playing: false,
            loop_enabled: options.loop_enabled,
            volume: normalize_volume(options.volume),
        };
        output.set_volume(state.gain());

        Self {
            store,
            state,
            output,
            texts,
            lyrics: LyricSync::default(),
            text_generation: 0,
            text_status: TextStatus::Idle,
            pending_advance: None,
            advance_delay: options.advance_delay,
            subscribers: Subscribers::default(),
        }
    }

    /// Register an observer; it receives every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        self.subscribers.subscribe()
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.store.current()
    }

    pub fn verses(&self) -> &[String] {
        self.lyrics.verses()
    }

    pub fn active_verse(&self) -> Option<usize> {
        self.lyrics.active()
    }

    pub fn text_status(&self) -> TextStatus {
        self.text_status
    }

    /// Placeholder to show instead of verses, if any.
    pub fn text_placeholder(&self) -> Option<&'static str> {
        match self.text_status {
            TextStatus::Missing => Some(NO_TEXT_PLACEHOLDER),
            _ => None,
        }
    }

    pub fn position(&self) -> Duration {
        self.output.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.output.duration()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    #[cfg(test)]
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    #[cfg(test)]
    pub fn text_source(&self) -> &T {
        &self.texts
    }

    #[cfg(test)]
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    fn publish(&mut self, event: PlayerEvent) {
        self.subscribers.publish(event);
    }

    /// Publish a user-facing notice.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.publish(PlayerEvent::Notice(message.into()));
    }

    fn set_playing(&mut self, playing: bool) {
        self.state.is_playing = playing;
        self.publish(PlayerEvent::PlaybackChanged { playing });
    }

    // --- playlist loading -------------------------------------------------

    /// Replace the playlist with manifest entries and load the first track.
    /// Playback is left as it was; the caller decides whether to start it.
    pub fn load_manifest(&mut self, base: &Location, entries: Vec<String>) -> usize {
        let len = self.store.load_from_manifest(base, entries);
        self.publish(PlayerEvent::PlaylistReplaced { len });
        if len == 0 {
            self.pause();
            self.lyrics.clear();
            self.text_status = TextStatus::Idle;
            self.publish(PlayerEvent::VersesReplaced { count: 0 });
        } else {
            self.load_track(0);
        }
        len
    }

    /// Replace the playlist with the audio files among `handles` and start
    /// playing the first one. Returns false when nothing was selected.
    pub fn select_local_files(&mut self, handles: Vec<FileHandle>) -> bool {
        if !self.store.load_from_local_selection(handles) {
            return false;
        }
        let len = self.store.len();
        self.publish(PlayerEvent::PlaylistReplaced { len });
        self.load_track(0);
        self.play();
        true
    }

    /// Programmatic replacement of the playlist. Keeps playing if it was.
    pub fn set_external(&mut self, items: Vec<ExternalItem>) -> bool {
        let was_playing = self.state.is_playing;
        if !self.store.set_external(items) {
            return false;
        }
        let len = self.store.len();
        self.publish(PlayerEvent::PlaylistReplaced { len });
        self.load_track(0);
        if was_playing {
            self.play();
        }
        true
    }

    // --- transport ----------------------------------------------------------

    /// Load track `i` into the output and request its chapter text.
    /// Out-of-range indices are ignored; `is_playing` is not touched.
    pub fn load_track(&mut self, i: usize) {
        if !self.store.set_index(i) {
            debug!(index = i, len = self.store.len(), "track index out of range; ignoring");
            return;
        }
        let Some(track) = self.store.current() else {
            return;
        };
        let locator = track.locator.clone();
        let book = track.book.clone();
        let chapter = track.chapter.clone();
        info!(index = i, title = %track.title, %locator, "loading track");

        self.output.load(&locator);
        self.pending_advance = None;

        self.text_generation += 1;
        self.lyrics.clear();
        self.text_status = TextStatus::Loading;
        self.texts.request(TextRequest {
            generation: self.text_generation,
            book,
            chapter,
        });

        self.publish(PlayerEvent::TrackLoaded { index: i });
        self.publish(PlayerEvent::VersesReplaced { count: 0 });
    }

    /// Start playback. A rejection leaves the player paused and is reported
    /// as a notice; the user can simply try again.
    pub fn play(&mut self) {
        if self.store.is_empty() {
            debug!("play requested with an empty playlist");
            return;
        }
        match self.output.play() {
            Ok(()) => self.set_playing(true),
            Err(e) => {
                warn!(error = %e, "playback start rejected");
                self.set_playing(false);
                self.publish(PlayerEvent::Notice(format!(
                    "Playback blocked ({e}); press space to retry"
                )));
            }
        }
    }

    /// Pause playback. A pending automatic advance is cancelled.
    pub fn pause(&mut self) {
        self.pending_advance = None;
        self.output.pause();
        self.set_playing(false);
    }

    /// Pause and rewind the current track.
    pub fn stop(&mut self) {
        self.pause();
        if !self.store.is_empty() {
            self.output.seek(Duration::ZERO);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance one track. Wraps when looping; otherwise stays on the last
    /// track and pauses.
    pub fn next(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = self.store.index();
        let (target, forced_pause) = if i + 1 < len {
            (i + 1, false)
        } else if self.state.loop_enabled {
            (0, false)
        } else {
            (len - 1, true)
        };
        self.go_to(target, forced_pause);
    }

    /// Go back one track. Wraps when looping; otherwise stays on the first
    /// track and pauses.
    pub fn prev(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = self.store.index();
        let (target, forced_pause) = if i > 0 {
            (i - 1, false)
        } else if self.state.loop_enabled {
            (len - 1, false)
        } else {
            (0, true)
        };
        self.go_to(target, forced_pause);
    }

    fn go_to(&mut self, target: usize, forced_pause: bool) {
        let was_playing = self.state.is_playing;
        self.load_track(target);
        if forced_pause {
            self.pause();
        } else if was_playing {
            self.play();
        }
    }

    /// Scrub by `delta_secs` within the current track.
    pub fn seek_by(&mut self, delta_secs: i64) {
        if self.store.is_empty() {
            return;
        }
        let current = self.output.position().as_secs_f64();
        let mut target = (current + delta_secs as f64).max(0.0);
        if let Some(d) = self.output.duration() {
            target = target.min(d.as_secs_f64());
        }
        let target = Duration::from_secs_f64(target);
        self.output.seek(target);
        if let Some(change) = self.lyrics.sync(target, self.output.duration()) {
            trace!(?change, "active verse changed by seek");
            self.publish(PlayerEvent::VerseActivated(change));
        }
    }

    // --- settings -----------------------------------------------------------

    /// Set the volume (0-100). `None` or a non-finite value resets to the default.
    pub fn set_volume(&mut self, volume: Option<f64>) {
        self.state.volume = normalize_volume(volume);
        self.output.set_volume(self.state.gain());
        self.publish(PlayerEvent::VolumeChanged {
            volume: self.state.volume,
        });
    }

    pub fn nudge_volume(&mut self, delta: i16) {
        self.set_volume(Some(f64::from(self.state.volume) + f64::from(delta)));
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.state.loop_enabled = enabled;
        self.publish(PlayerEvent::LoopChanged { enabled });
    }

    pub fn toggle_loop(&mut self) {
        self.set_loop(!self.state.loop_enabled);
    }

    // --- inputs from the output and the text loader ---------------------------

    /// Drain and handle every pending media event.
    pub fn pump_media(&mut self, now: Instant) {
        while let Some(event) = self.output.poll_event() {
            self.handle_media_event(event, now);
        }
    }

    pub fn handle_media_event(&mut self, event: MediaEvent, now: Instant) {
        match event {
            MediaEvent::TimeUpdate { position, duration } => {
                if let Some(change) = self.lyrics.sync(position, duration) {
                    trace!(?change, "active verse changed");
                    self.publish(PlayerEvent::VerseActivated(change));
                }
            }
            MediaEvent::Ended => {
                if self.pending_advance.is_some() {
                    trace!("duplicate end-of-track ignored");
                    return;
                }
                if !self.state.loop_enabled && self.store.is_last() {
                    info!("reached the end of the playlist");
                    self.pause();
                } else {
                    self.pending_advance = Some(now + self.advance_delay);
                }
            }
            MediaEvent::Failed(reason) => {
                warn!(%reason, "track could not be played");
                self.set_playing(false);
                self.publish(PlayerEvent::Notice(format!("Cannot play track: {reason}")));
            }
        }
    }

    /// Run the automatic advance once its delay has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(due) = self.pending_advance {
            if now >= due {
                self.pending_advance = None;
                self.next();
            }
        }
    }

    /// Install the chapter text for the current track. Replies for an older
    /// track load are dropped.
    pub fn apply_text(&mut self, response: TextResponse) {
        if response.generation != self.text_generation {
            debug!(
                generation = response.generation,
                current = self.text_generation,
                "dropping stale chapter text"
            );
            return;
        }
        match response.result {
            Ok(verses) => {
                let count = verses.len();
                self.text_status = if count == 0 {
                    TextStatus::Missing
                } else {
                    TextStatus::Loaded
                };
                self.lyrics.set_verses(verses);
                self.publish(PlayerEvent::VersesReplaced { count });
            }
            Err(e) => {
                debug!(error = %e, "no chapter text for current track");
                self.lyrics.clear();
                self.text_status = TextStatus::Missing;
                self.publish(PlayerEvent::VersesReplaced { count: 0 });
            }
        }
    }
}
