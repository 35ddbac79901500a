use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::resource::Location;

use super::filename::parse_filename;

/// Identifier of a transient, per-session locator issued for a local file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobId(pub(crate) u64);

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:lectern/{}", self.0)
    }
}

/// Where the audio for a track comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Path(PathBuf),
    Url(String),
    /// Transient locator; only valid while the selection that issued it is live.
    Blob(BlobId),
}

impl From<Location> for Locator {
    fn from(location: Location) -> Self {
        match location {
            Location::Path(p) => Self::Path(p),
            Location::Url(u) => Self::Url(u),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
            Self::Blob(id) => id.fmt(f),
        }
    }
}

/// One playable item with display metadata derived from its filename.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub locator: Locator,
    pub filename: String,
    pub id: Option<String>,
    pub book: String,
    pub chapter: String,
    pub title: String,
}

impl Track {
    /// Build a track from its locator and raw filename.
    pub fn new(locator: Locator, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let meta = parse_filename(&filename);
        Self {
            locator,
            filename,
            id: meta.id,
            book: meta.book,
            chapter: meta.chapter,
            title: meta.title,
        }
    }

    /// Chapter as a number when it is one.
    pub fn chapter_number(&self) -> Option<u32> {
        self.chapter.trim().parse().ok()
    }

    /// `"{book} {chapter}"`, without a dangling space for chapterless tracks.
    pub fn book_chapter(&self) -> String {
        format!("{} {}", self.book, self.chapter).trim().to_string()
    }
}

/// Content behind a file handle.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// Read from disk when the track is loaded.
    Path(PathBuf),
    /// In-memory content, for tests that never touch the disk.
    #[cfg(test)]
    Bytes(Arc<[u8]>),
}

impl FileContent {
    pub fn read(&self) -> io::Result<Arc<[u8]>> {
        match self {
            Self::Path(p) => Ok(fs::read(p)?.into()),
            #[cfg(test)]
            Self::Bytes(b) => Ok(b.clone()),
        }
    }
}

/// A user-selected file: a name, an optional MIME type and its content.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub mime: Option<String>,
    pub content: FileContent,
}

impl FileHandle {
    /// Handle onto a file on disk. No MIME type is reported, so the extension
    /// filter alone decides whether it counts as audio.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime: None,
            content: FileContent::Path(path.to_path_buf()),
        }
    }

    #[cfg(test)]
    pub fn from_bytes(
        name: impl Into<String>,
        mime: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            content: FileContent::Bytes(bytes.into()),
        }
    }
}
