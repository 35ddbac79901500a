use tracing::info;

use crate::error::Result;
use crate::resource::{self, Location};

/// Parse a manifest body: a JSON array of filenames.
pub fn parse_manifest(body: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str::<Vec<String>>(body)?)
}

/// Fetch and parse the manifest at `location`.
pub fn fetch_manifest(location: &Location) -> Result<Vec<String>> {
    let body = resource::fetch_text(location)?;
    let entries = parse_manifest(&body)?;
    info!(%location, count = entries.len(), "manifest fetched");
    Ok(entries)
}
