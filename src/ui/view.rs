use std::sync::mpsc::Receiver;

use crate::config::UiSettings;
use crate::player::PlayerEvent;

/// View-only state fed by the player's event stream.
///
/// Holds the highlighted verse, the latest notice and which panes are shown;
/// everything else the renderer reads straight from the player.
pub struct ViewState {
    events: Receiver<PlayerEvent>,
    highlighted: Option<usize>,
    notice: Option<String>,
    show_playlist: bool,
    show_controls: bool,
}

impl ViewState {
    pub fn new(events: Receiver<PlayerEvent>, ui: &UiSettings) -> Self {
        Self {
            events,
            highlighted: None,
            notice: None,
            show_playlist: ui.show_playlist,
            show_controls: true,
        }
    }

    pub fn show_playlist(&self) -> bool {
        self.show_playlist
    }

    pub fn show_controls(&self) -> bool {
        self.show_controls
    }

    pub fn toggle_playlist(&mut self) {
        self.show_playlist = !self.show_playlist;
    }

    pub fn toggle_controls(&mut self) {
        self.show_controls = !self.show_controls;
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply every queued event. Returns true when anything arrived.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            changed = true;
        }
        changed
    }

    fn apply(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::VerseActivated(change) => self.highlighted = Some(change.current),
            PlayerEvent::VersesReplaced { .. } => self.highlighted = None,
            PlayerEvent::PlaybackChanged { playing: true } => self.notice = None,
            PlayerEvent::Notice(message) => self.notice = Some(message),
            _ => {}
        }
    }
}
