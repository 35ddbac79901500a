use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::FileHandle;

/// Lowercase extensions without the leading dot; blanks dropped.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// True when `name` ends in one of the (normalized) `extensions`.
pub fn is_audio_name(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collect handles for every audio file under `dir`.
///
/// Used for command-line directories and as the fallback selection when the
/// manifest cannot be loaded. Ordering is left to the playlist store.
pub fn scan_dir(dir: &Path, settings: &LibrarySettings) -> Vec<FileHandle> {
    let extensions = normalize_extensions(&settings.extensions);

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    let handles: Vec<FileHandle> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|n| is_audio_name(n, &extensions))
                .unwrap_or(false)
        })
        .map(|e| FileHandle::from_path(e.path()))
        .collect();

    debug!(dir = %dir.display(), count = handles.len(), "scanned directory");
    handles
}
