use std::sync::mpsc;
use std::time::Duration;

use ratatui::{Terminal, backend::TestBackend};

use super::*;
use crate::audio::MediaEvent;
use crate::config::LibrarySettings;
use crate::error::Result;
use crate::library::{Locator, Track};
use crate::lyrics::{TextRequest, TextResponse, VerseChange};
use crate::player::{PlaybackState, PlayerEvent, PlayerOptions};
use crate::playlist::{BlobRegistry, PlaylistStore};
use crate::resource::Location;

#[derive(Default)]
struct SilentOutput {
    position: Duration,
}

impl AudioOutput for SilentOutput {
    fn load(&mut self, _locator: &Locator) {}
    fn play(&mut self) -> Result<()> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn seek(&mut self, position: Duration) {
        self.position = position;
    }
    fn set_volume(&mut self, _volume: f32) {}
    fn position(&self) -> Duration {
        self.position
    }
    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(200))
    }
    fn poll_event(&mut self) -> Option<MediaEvent> {
        None
    }
}

struct NoTexts;

impl TextSource for NoTexts {
    fn request(&self, _request: TextRequest) {}
}

fn genesis(chapter: u32) -> Track {
    Track::new(
        Locator::Path(format!("audio/A01_{chapter:02}_Genesis.mp3").into()),
        format!("A01_{chapter:02}_Genesis.mp3"),
    )
}

fn player() -> Player<SilentOutput, NoTexts> {
    let store = PlaylistStore::new(
        BlobRegistry::default(),
        &LibrarySettings::default().extensions,
    );
    let mut p = Player::new(store, SilentOutput::default(), NoTexts, PlayerOptions::default());
    p.load_manifest(
        &Location::parse("audio"),
        vec!["A01_01_Genesis.mp3".into(), "A01_02_Genesis.mp3".into()],
    );
    p
}

fn render(player: &Player<SilentOutput, NoTexts>, view: &ViewState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal
        .draw(|f| {
            draw(
                f,
                player,
                view,
                &UiSettings::default(),
                &ControlsSettings::default(),
            )
        })
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect()
}

#[test]
fn transport_labels_reflect_playing_state() {
    let track = genesis(3);
    let state = PlaybackState {
        is_playing: true,
        loop_enabled: false,
        volume: 40,
    };
    let labels = transport_labels(Some(&track), &state);
    assert_eq!(labels.now_playing, "Now Playing: Genesis 3");
    assert_eq!(labels.book_chapter, "Genesis 3");
    assert_eq!(labels.play_pause, "⏸ Pause");
    assert_eq!(labels.loop_mode, "Loop: Off");
    assert_eq!(labels.volume, "Vol: 40%");

    let paused = PlaybackState::default();
    let labels = transport_labels(Some(&track), &paused);
    assert_eq!(labels.play_pause, "▶ Play");
    assert_eq!(labels.loop_mode, "Loop: On");
}

#[test]
fn transport_labels_without_track() {
    let labels = transport_labels(None, &PlaybackState::default());
    assert_eq!(labels.now_playing, "Now Playing: -");
    assert!(labels.book_chapter.is_empty());
}

#[test]
fn transport_labels_are_idempotent() {
    let track = genesis(1);
    let state = PlaybackState::default();
    assert_eq!(
        transport_labels(Some(&track), &state),
        transport_labels(Some(&track), &state)
    );
}

#[test]
fn playlist_rows_lead_with_the_recording_id() {
    assert_eq!(playlist_row(&genesis(3)), "A01  Genesis 3");
    let intro = Track::new(Locator::Url("https://x/Prologue.mp3".into()), "Prologue.mp3");
    assert_eq!(playlist_row(&intro), "Prologue");
}

#[test]
fn format_mmss_pads_minutes_and_seconds() {
    assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
    assert_eq!(format_mmss(Duration::ZERO), "00:00");
    assert_eq!(
        time_text(Duration::from_secs(5), Some(Duration::from_secs(200))),
        "00:05 / 03:20"
    );
}

#[test]
fn visible_window_centers_selection() {
    assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
    assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
    assert_eq!(visible_window(100, 10, 2), (0, 10, 2));
    assert_eq!(visible_window(100, 10, 98), (90, 100, 8));
}

#[test]
fn controls_text_uses_configured_steps() {
    let controls = ControlsSettings {
        scrub_seconds: 10,
        volume_step: 2,
    };
    let text = controls_text(&controls);
    assert!(text.contains("[H/L] scrub -/+10s"));
    assert!(text.contains("[+/-] volume ±2"));
    assert!(text.starts_with("[space/p] play/pause"));
}

#[test]
fn view_state_tracks_highlight_and_notice() {
    let (tx, rx) = mpsc::channel();
    let mut view = ViewState::new(rx, &UiSettings::default());
    assert!(!view.drain());

    tx.send(PlayerEvent::VerseActivated(VerseChange {
        previous: None,
        current: 4,
    }))
    .unwrap();
    tx.send(PlayerEvent::Notice("blocked".into())).unwrap();
    assert!(view.drain());
    assert_eq!(view.highlighted(), Some(4));
    assert_eq!(view.notice(), Some("blocked"));

    tx.send(PlayerEvent::VersesReplaced { count: 0 }).unwrap();
    tx.send(PlayerEvent::PlaybackChanged { playing: true }).unwrap();
    view.drain();
    assert_eq!(view.highlighted(), None);
    assert_eq!(view.notice(), None);
}

#[test]
fn draw_shows_track_and_placeholder() {
    let mut p = player();
    let view = ViewState::new(p.subscribe(), &UiSettings::default());
    p.apply_text(TextResponse {
        generation: 1,
        result: Ok(Vec::new()),
    });

    let screen = render(&p, &view);
    assert!(screen.contains("Now Playing: Genesis 1"));
    assert!(screen.contains("No text found"));
    assert!(screen.contains("playlist (2)"));
}

#[test]
fn draw_shows_verses() {
    let mut p = player();
    let mut view = ViewState::new(p.subscribe(), &UiSettings::default());
    p.apply_text(TextResponse {
        generation: 1,
        result: Ok(vec!["In the beginning".into(), "And the earth".into()]),
    });
    p.handle_media_event(
        MediaEvent::TimeUpdate {
            position: Duration::from_secs(150),
            duration: Some(Duration::from_secs(200)),
        },
        std::time::Instant::now(),
    );
    view.drain();
    assert_eq!(view.highlighted(), Some(1));

    let screen = render(&p, &view);
    assert!(screen.contains("In the beginning"));
    assert!(screen.contains("And the earth"));
}

#[test]
fn view_state_pane_toggles_start_from_settings() {
    let (_tx, rx) = mpsc::channel();
    let ui = UiSettings {
        show_playlist: false,
        ..UiSettings::default()
    };
    let mut view = ViewState::new(rx, &ui);
    assert!(!view.show_playlist());
    assert!(view.show_controls());

    view.toggle_playlist();
    view.toggle_controls();
    assert!(view.show_playlist());
    assert!(!view.show_controls());
}

#[test]
fn draw_hides_toggled_panes() {
    let mut p = player();
    let mut view = ViewState::new(p.subscribe(), &UiSettings::default());

    let screen = render(&p, &view);
    assert!(screen.contains("A01  Genesis 1"));
    assert!(screen.contains(" controls "));

    view.toggle_playlist();
    view.toggle_controls();
    let screen = render(&p, &view);
    assert!(!screen.contains("playlist ("));
    assert!(!screen.contains("A01  Genesis 1"));
    assert!(!screen.contains("controls"));
    assert!(screen.contains("Now Playing: Genesis 1"));
}
