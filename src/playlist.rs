//! Playlist store: ordered tracks, the current index and the registry of
//! transient locators issued for local file selections.

mod blobs;
mod manifest;
mod store;

pub use blobs::BlobRegistry;
pub use manifest::{fetch_manifest, parse_manifest};
pub use store::{ExternalItem, PlaylistStore};
