use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lectern/config.toml` or `~/.config/lectern/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LECTERN__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Startup volume, 0-100.
    pub volume: u8,
    /// Fade-out duration when quitting (milliseconds). 0 stops immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 70,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Wrap around at either end of the playlist.
    pub loop_enabled: bool,
    /// Delay between a track ending and the next one loading (milliseconds).
    pub advance_delay_ms: u64,
    /// Start playing once the manifest has loaded.
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            loop_enabled: true,
            advance_delay_ms: 300,
            autoplay: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// JSON array of filenames; a path or an `http(s)` URL.
    pub manifest: String,
    /// Directory (or base URL) the manifest entries are relative to.
    pub audio_dir: String,
    /// Directory (or base URL) holding `{book}_{chapter}.txt` files.
    pub text_dir: String,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when scanning directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles) when scanning.
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            manifest: "audio/playlist.json".to_string(),
            audio_dir: "audio".to_string(),
            text_dir: "audio_text".to_string(),
            extensions: vec!["mp3".into(), "wav".into(), "ogg".into(), "m4a".into()],
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Show the playlist pane next to the chapter text.
    pub show_playlist: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ lectern ~ ".to_string(),
            show_playlist: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Log file; defaults to `lectern.log` in the temp directory.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
