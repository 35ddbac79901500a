//! Location-addressable resources: local paths or `http(s)` URLs.
//!
//! Manifests, chapter texts and remote audio all go through `fetch_bytes` /
//! `fetch_text`. There are no timeouts or retries here.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Path(PathBuf),
    Url(String),
}

impl Location {
    /// Interpret `raw` as a URL when it carries an `http`/`https` scheme,
    /// otherwise as a filesystem path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// Resolve `relative` against this location.
    pub fn join(&self, relative: &str) -> Self {
        let relative = relative.trim_start_matches(['/', '\\']);
        match self {
            Self::Path(base) => Self::Path(base.join(relative)),
            Self::Url(base) => Self::Url(format!("{}/{}", base.trim_end_matches('/'), relative)),
        }
    }

    /// Last path segment, if any.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Path(p) => p.file_name().map(|s| s.to_string_lossy().into_owned()),
            Self::Url(u) => {
                let without_query = u.split(['?', '#']).next().unwrap_or(u);
                without_query
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// Read the whole resource into memory.
pub fn fetch_bytes(location: &Location) -> Result<Vec<u8>> {
    debug!(%location, "fetching bytes");
    match location {
        Location::Path(p) => Ok(fs::read(p)?),
        Location::Url(u) => {
            let response = reqwest::blocking::get(u.as_str())?.error_for_status()?;
            Ok(response.bytes()?.to_vec())
        }
    }
}

/// Read the whole resource as UTF-8 text (lossy for local files).
pub fn fetch_text(location: &Location) -> Result<String> {
    debug!(%location, "fetching text");
    match location {
        Location::Path(p) => {
            let bytes = fs::read(p)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Location::Url(u) => {
            let response = reqwest::blocking::get(u.as_str())?.error_for_status()?;
            Ok(response.text()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            Location::parse("https://example.org/audio"),
            Location::Url("https://example.org/audio".into())
        );
        assert_eq!(
            Location::parse("HTTP://example.org/a.json"),
            Location::Url("HTTP://example.org/a.json".into())
        );
        assert_eq!(
            Location::parse("audio/playlist.json"),
            Location::Path(PathBuf::from("audio/playlist.json"))
        );
    }

    #[test]
    fn join_handles_trailing_and_leading_slashes() {
        let base = Location::parse("https://example.org/audio/");
        assert_eq!(
            base.join("/A01_01_Genesis.mp3"),
            Location::Url("https://example.org/audio/A01_01_Genesis.mp3".into())
        );

        let base = Location::parse("audio");
        assert_eq!(
            base.join("sub/x.mp3"),
            Location::Path(Path::new("audio").join("sub/x.mp3"))
        );
    }

    #[test]
    fn file_name_strips_query_for_urls() {
        let loc = Location::parse("https://example.org/a/b/c.mp3?token=1");
        assert_eq!(loc.file_name().as_deref(), Some("c.mp3"));
        assert_eq!(
            Location::parse("/tmp/x/y.ogg").file_name().as_deref(),
            Some("y.ogg")
        );
        assert_eq!(Location::parse("https://example.org/").file_name(), None);
    }

    #[test]
    fn fetch_text_reads_local_files_and_reports_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Genesis_1.txt");
        std::fs::write(&path, "In the beginning\nAnd the earth\n").unwrap();

        let text = fetch_text(&Location::Path(path)).unwrap();
        assert!(text.starts_with("In the beginning"));

        let missing = fetch_text(&Location::Path(dir.path().join("nope.txt")));
        assert!(matches!(missing, Err(crate::error::Error::Io(_))));
    }
}
