use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::error::Result;
use crate::resource::{self, Location};

/// Ask for the text of `book` `chapter`. `generation` identifies the track
/// load that asked, so late replies for an older track can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub generation: u64,
    pub book: String,
    pub chapter: String,
}

#[derive(Debug)]
pub struct TextResponse {
    pub generation: u64,
    pub result: Result<Vec<String>>,
}

/// Something that can fetch chapter text and reply later.
pub trait TextSource {
    fn request(&self, request: TextRequest);
}

/// `{base}/{book}_{chapter}.txt`
pub fn text_location(base: &Location, book: &str, chapter: &str) -> Location {
    base.join(&format!("{book}_{chapter}.txt"))
}

/// One verse per non-blank line, surrounding whitespace trimmed.
pub fn split_verses(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fetches chapter text on a short-lived worker thread per request and sends
/// the reply back over a channel drained by the event loop.
pub struct TextLoader {
    base: Location,
    tx: Sender<TextResponse>,
}

impl TextLoader {
    pub fn new(base: Location, tx: Sender<TextResponse>) -> Self {
        Self { base, tx }
    }
}

impl TextSource for TextLoader {
    fn request(&self, request: TextRequest) {
        let location = text_location(&self.base, &request.book, &request.chapter);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = resource::fetch_text(&location).map(|t| split_verses(&t));
            match &result {
                Ok(verses) => debug!(%location, count = verses.len(), "chapter text loaded"),
                Err(e) => warn!(%location, error = %e, "chapter text unavailable"),
            }
            let _ = tx.send(TextResponse {
                generation: request.generation,
                result,
            });
        });
    }
}
