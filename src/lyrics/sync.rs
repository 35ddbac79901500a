use std::time::Duration;

/// The active verse moved from `previous` to `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseChange {
    pub previous: Option<usize>,
    pub current: usize,
}

/// Map a playback position onto one of `count` evenly spaced verses.
///
/// Returns `None` when there are no verses or the duration is unknown/zero.
pub fn verse_index(position: Duration, duration: Option<Duration>, count: usize) -> Option<usize> {
    let duration = duration.filter(|d| !d.is_zero())?;
    if count == 0 {
        return None;
    }
    let t = (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
    let idx = (t * count as f64).floor() as usize;
    Some(idx.min(count - 1))
}

/// Verse list of the current track plus the highlighted line.
#[derive(Debug, Default)]
pub struct LyricSync {
    verses: Vec<String>,
    active: Option<usize>,
}

impl LyricSync {
    /// Install a new verse list; nothing is highlighted until the next sync.
    pub fn set_verses(&mut self, verses: Vec<String>) {
        self.verses = verses;
        self.active = None;
    }

    pub fn clear(&mut self) {
        self.set_verses(Vec::new());
    }

    pub fn verses(&self) -> &[String] {
        &self.verses
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Recompute the active verse. Only an index change yields a `VerseChange`;
    /// repeated calls landing on the same verse return `None`.
    pub fn sync(&mut self, position: Duration, duration: Option<Duration>) -> Option<VerseChange> {
        let idx = verse_index(position, duration, self.verses.len())?;
        if self.active == Some(idx) {
            return None;
        }
        let change = VerseChange {
            previous: self.active,
            current: idx,
        };
        self.active = Some(idx);
        Some(change)
    }
}
