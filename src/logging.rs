//! Tracing setup. The terminal belongs to the TUI, so logs go to a file.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogSettings;

/// `log.file`, or `lectern.log` in the temp directory.
pub fn log_path(settings: &LogSettings) -> PathBuf {
    settings
        .file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("lectern.log"))
}

/// `RUST_LOG` when set and valid, otherwise `log.level`, otherwise `info`.
pub fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the log file path.
pub fn init(settings: &LogSettings) -> io::Result<PathBuf> {
    let path = log_path(settings);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter(settings)),
        )
        .try_init();
    if let Err(e) = installed {
        // Already installed (tests, embedding); keep the existing one.
        eprintln!("lectern: logging not initialized: {e}");
    }
    Ok(path)
}
