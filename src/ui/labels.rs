use crate::library::Track;
use crate::player::PlaybackState;

/// Text for the now-playing and transport widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportLabels {
    pub now_playing: String,
    pub book_chapter: String,
    pub play_pause: &'static str,
    pub loop_mode: &'static str,
    pub volume: String,
}

/// Playlist row: the recording id, when the filename carries one, then the title.
pub fn playlist_row(track: &Track) -> String {
    match &track.id {
        Some(id) => format!("{id}  {}", track.title),
        None => track.title.clone(),
    }
}

/// Project the current track and playback flags into label text.
pub fn transport_labels(track: Option<&Track>, state: &PlaybackState) -> TransportLabels {
    let (now_playing, book_chapter) = match track {
        Some(t) => (format!("Now Playing: {}", t.title), t.book_chapter()),
        None => ("Now Playing: -".to_string(), String::new()),
    };
    TransportLabels {
        now_playing,
        book_chapter,
        play_pause: if state.is_playing {
            "⏸ Pause"
        } else {
            "▶ Play"
        },
        loop_mode: if state.loop_enabled {
            "Loop: On"
        } else {
            "Loop: Off"
        },
        volume: format!("Vol: {}%", state.volume),
    }
}
