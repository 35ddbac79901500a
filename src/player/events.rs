use std::sync::mpsc::{self, Receiver, Sender};

use crate::lyrics::VerseChange;

/// State changes published by the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    PlaylistReplaced { len: usize },
    TrackLoaded { index: usize },
    PlaybackChanged { playing: bool },
    LoopChanged { enabled: bool },
    VolumeChanged { volume: u8 },
    /// A new verse list (possibly empty) was installed.
    VersesReplaced { count: usize },
    /// Unmark `previous`, mark `current` and bring it into view.
    VerseActivated(VerseChange),
    /// Recoverable problem worth showing to the user.
    Notice(String),
}

/// Fan-out of player events; disconnected receivers are pruned on publish.
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Vec<Sender<PlayerEvent>>,
}

impl Subscribers {
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub fn publish(&mut self, event: PlayerEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
