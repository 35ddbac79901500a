use std::path::Path;

use tracing::{info, warn};

use crate::audio::AudioOutput;
use crate::config::{LibrarySettings, Settings};
use crate::library::{FileHandle, scan_dir};
use crate::lyrics::TextSource;
use crate::player::Player;
use crate::playlist::ExternalItem;
use crate::resource::Location;

use super::workers::{ManifestReply, ManifestWorker};

/// Turn command-line arguments into playlist items. URLs are kept as
/// sources, directories are scanned and other paths become file handles.
pub fn cli_items(args: &[String], library: &LibrarySettings) -> Vec<ExternalItem> {
    let mut items = Vec::new();
    for arg in args {
        match Location::parse(arg) {
            Location::Url(url) => items.push(ExternalItem::Source(url)),
            Location::Path(path) if path.is_dir() => items.extend(
                scan_dir(&path, library)
                    .into_iter()
                    .map(ExternalItem::File),
            ),
            Location::Path(path) if path.is_file() => {
                items.push(ExternalItem::File(FileHandle::from_path(&path)))
            }
            Location::Path(path) => warn!(path = %path.display(), "no such file; skipping"),
        }
    }
    items
}

/// Ask for the configured manifest.
pub fn request_manifest(manifests: &mut ManifestWorker, library: &LibrarySettings) {
    manifests.request(
        Location::parse(&library.manifest),
        Location::parse(&library.audio_dir),
    );
}

/// Populate the playlist from the command line, or start the manifest fetch.
pub fn begin<O: AudioOutput, T: TextSource>(
    player: &mut Player<O, T>,
    manifests: &mut ManifestWorker,
    settings: &Settings,
    args: &[String],
) {
    if args.is_empty() {
        request_manifest(manifests, &settings.library);
        return;
    }

    let items = cli_items(args, &settings.library);
    let all_local = items.iter().all(|i| matches!(i, ExternalItem::File(_)));
    let loaded = if all_local {
        let handles = items
            .into_iter()
            .filter_map(|i| match i {
                ExternalItem::File(h) => Some(h),
                ExternalItem::Source(_) => None,
            })
            .collect();
        player.select_local_files(handles)
    } else {
        let replaced = player.set_external(items);
        if replaced {
            player.play();
        }
        replaced
    };

    if !loaded {
        warn!("no playable files on the command line; falling back to the manifest");
        request_manifest(manifests, &settings.library);
    }
}

/// Install a fetched manifest, or fall back to scanning the audio directory.
pub fn apply_manifest<O: AudioOutput, T: TextSource>(
    player: &mut Player<O, T>,
    reply: ManifestReply,
    settings: &Settings,
) {
    match reply.result {
        Ok(entries) => {
            let len = player.load_manifest(&reply.base, entries);
            if len == 0 {
                player.notice("Playlist is empty");
            } else if settings.playback.autoplay {
                player.play();
            }
        }
        Err(e) => {
            warn!(error = %e, "manifest unavailable; scanning audio directory");
            let dir = Path::new(&settings.library.audio_dir);
            let handles = scan_dir(dir, &settings.library);
            if player.select_local_files(handles) {
                info!(dir = %dir.display(), "playlist built from audio directory");
            } else {
                player.notice(format!("No playlist: {e}"));
            }
        }
    }
}
