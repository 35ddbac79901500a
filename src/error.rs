//! Error type shared by the loaders, the playlist store and the audio output.
//!
//! Nothing in the player treats these as fatal: callers log them and fall
//! back to an empty or placeholder state.

use crate::library::BlobId;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Filesystem read failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote fetch failed (connection, TLS or non-success status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Manifest body was not a JSON array of strings.
    #[error("manifest parse error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The audio bytes could not be decoded.
    #[error("audio decode error: {0}")]
    Decode(String),

    /// No audio device could be opened.
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    /// The output refused to start playback (nothing loaded, load failed).
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    /// A transient locator was resolved after its selection was superseded.
    #[error("transient locator {0} has been released")]
    Released(BlobId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
