/// Volume used at startup and whenever a requested volume is missing or invalid.
pub const DEFAULT_VOLUME: u8 = 70;

/// Playback flags. Never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub loop_enabled: bool,
    /// 0-100.
    pub volume: u8,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            loop_enabled: true,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl PlaybackState {
    /// Output gain in `[0, 1]`.
    pub fn gain(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }
}

/// Clamp a requested volume into `0..=100`; missing or non-finite input
/// yields [`DEFAULT_VOLUME`].
pub fn normalize_volume(requested: Option<f64>) -> u8 {
    match requested {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
        _ => DEFAULT_VOLUME,
    }
}
