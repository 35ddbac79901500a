//! Playback controller: owns the playlist store, the playback flags, the
//! verse synchronizer and the audio output, and publishes `PlayerEvent`s to
//! subscribers such as the UI.

mod controller;
mod events;
mod state;

pub use controller::{NO_TEXT_PLACEHOLDER, Player, PlayerOptions, TextStatus};
pub use events::PlayerEvent;
pub use state::{DEFAULT_VOLUME, PlaybackState, normalize_volume};

#[cfg(test)]
mod tests;
