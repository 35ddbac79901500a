//! Chapter text: fetching verse lists and keeping the active verse in step
//! with the playback position.

mod loader;
mod sync;

pub use loader::{TextLoader, TextRequest, TextResponse, TextSource, split_verses, text_location};
pub use sync::{LyricSync, VerseChange, verse_index};
