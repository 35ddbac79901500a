use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::{AudioOutput, MediaEvent};
use crate::config::LibrarySettings;
use crate::error::{Error, Result};
use crate::library::{FileHandle, Locator};
use crate::lyrics::{TextRequest, TextResponse, TextSource, VerseChange};
use crate::playlist::{BlobRegistry, ExternalItem, PlaylistStore};
use crate::resource::Location;

#[derive(Default)]
struct FakeOutput {
    loads: Vec<Locator>,
    playing: bool,
    play_calls: usize,
    reject: Option<String>,
    volume: f32,
    events: VecDeque<MediaEvent>,
    position: Duration,
    duration: Option<Duration>,
    seeks: Vec<Duration>,
}

impl AudioOutput for FakeOutput {
    fn load(&mut self, locator: &Locator) {
        self.loads.push(locator.clone());
        self.playing = false;
        self.position = Duration::ZERO;
    }

    fn play(&mut self) -> Result<()> {
        self.play_calls += 1;
        if let Some(reason) = &self.reject {
            return Err(Error::PlaybackRejected(reason.clone()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.seeks.push(position);
        self.position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.events.pop_front()
    }
}

#[derive(Default)]
struct FakeTexts {
    requests: RefCell<Vec<TextRequest>>,
}

impl TextSource for FakeTexts {
    fn request(&self, request: TextRequest) {
        self.requests.borrow_mut().push(request);
    }
}

type TestPlayer = Player<FakeOutput, FakeTexts>;

fn empty_player(loop_enabled: bool) -> TestPlayer {
    let store = PlaylistStore::new(
        BlobRegistry::default(),
        &LibrarySettings::default().extensions,
    );
    let options = PlayerOptions {
        loop_enabled,
        volume: None,
        advance_delay: Duration::from_millis(300),
    };
    Player::new(store, FakeOutput::default(), FakeTexts::default(), options)
}

fn player(tracks: usize, loop_enabled: bool) -> TestPlayer {
    let mut p = empty_player(loop_enabled);
    let entries = (1..=tracks).map(|c| format!("A01_{c}_Genesis.mp3")).collect();
    p.load_manifest(&Location::parse("audio"), entries);
    p
}

fn drain(rx: &Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    rx.try_iter().collect()
}

fn last_request(p: &TestPlayer) -> TextRequest {
    p.text_source()
        .requests
        .borrow()
        .last()
        .cloned()
        .expect("a text request")
}

fn verses(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("verse {i}")).collect()
}

#[test]
fn manifest_load_selects_first_track_without_playing() {
    let p = player(3, true);
    assert_eq!(p.store().len(), 3);
    assert_eq!(p.store().index(), 0);
    assert!(!p.state().is_playing);
    assert_eq!(p.output().loads.len(), 1);
    assert_eq!(p.text_status(), TextStatus::Loading);
    let req = last_request(&p);
    assert_eq!(req.book, "Genesis");
    assert_eq!(req.chapter, "1");
}

#[test]
fn next_wraps_to_first_track_when_looping() {
    let mut p = player(3, true);
    p.load_track(2);
    p.play();
    p.next();
    assert_eq!(p.store().index(), 0);
    assert!(p.state().is_playing);
    assert!(p.output().playing);
}

#[test]
fn next_on_last_track_without_loop_stays_and_pauses() {
    let mut p = player(3, false);
    p.load_track(2);
    p.play();
    let loads = p.output().loads.len();
    p.next();
    assert_eq!(p.store().index(), 2);
    assert!(!p.state().is_playing);
    assert!(!p.output().playing);
    assert_eq!(p.output().loads.len(), loads + 1);
}

#[test]
fn prev_wraps_or_clamps_at_first_track() {
    let mut p = player(3, true);
    p.prev();
    assert_eq!(p.store().index(), 2);

    let mut p = player(3, false);
    p.play();
    p.prev();
    assert_eq!(p.store().index(), 0);
    assert!(!p.state().is_playing);
}

#[test]
fn navigation_keeps_paused_state() {
    let mut p = player(3, true);
    p.next();
    assert_eq!(p.store().index(), 1);
    assert!(!p.state().is_playing);
    assert_eq!(p.output().play_calls, 0);
}

#[test]
fn navigation_on_empty_playlist_is_a_no_op() {
    let mut p = empty_player(true);
    p.next();
    p.prev();
    p.play();
    p.seek_by(10);
    assert!(p.output().loads.is_empty());
    assert_eq!(p.output().play_calls, 0);
    assert!(p.output().seeks.is_empty());
    assert!(!p.state().is_playing);
}

#[test]
fn load_track_out_of_range_is_ignored() {
    let mut p = player(2, true);
    p.load_track(5);
    assert_eq!(p.store().index(), 0);
    assert_eq!(p.output().loads.len(), 1);
}

#[test]
fn load_track_does_not_change_playing_flag() {
    let mut p = player(3, true);
    p.play();
    p.load_track(1);
    assert!(p.state().is_playing);
    assert_eq!(last_request(&p).chapter, "2");
}

#[test]
fn rejected_play_leaves_player_paused_with_notice() {
    let mut p = player(1, true);
    p.output_mut().reject = Some("no device".into());
    let rx = p.subscribe();
    p.play();
    assert!(!p.state().is_playing);
    let events = drain(&rx);
    assert!(events.contains(&PlayerEvent::PlaybackChanged { playing: false }));
    assert!(events.iter().any(|e| matches!(e, PlayerEvent::Notice(_))));

    // The user can retry once the output accepts.
    p.output_mut().reject = None;
    p.toggle_play_pause();
    assert!(p.state().is_playing);
}

#[test]
fn volume_is_clamped_and_defaulted() {
    let mut p = player(1, true);
    assert_eq!(p.state().volume, 70);
    assert!((p.output().volume - 0.7).abs() < f32::EPSILON);

    p.set_volume(Some(150.0));
    assert_eq!(p.state().volume, 100);
    assert!((p.output().volume - 1.0).abs() < f32::EPSILON);

    p.set_volume(Some(-5.0));
    assert_eq!(p.state().volume, 0);

    p.set_volume(Some(f64::NAN));
    assert_eq!(p.state().volume, 70);

    p.set_volume(None);
    assert_eq!(p.state().volume, 70);

    p.nudge_volume(40);
    assert_eq!(p.state().volume, 100);
}

#[test]
fn loop_toggle_only_changes_the_flag() {
    let mut p = player(2, true);
    let rx = p.subscribe();
    p.toggle_loop();
    assert!(!p.state().loop_enabled);
    assert_eq!(drain(&rx), vec![PlayerEvent::LoopChanged { enabled: false }]);
    assert_eq!(p.output().loads.len(), 1);
}

#[test]
fn ended_is_debounced_then_advances() {
    let mut p = player(3, true);
    p.play();
    let start = Instant::now();
    p.output_mut().events.push_back(MediaEvent::Ended);
    p.output_mut().events.push_back(MediaEvent::Ended);
    p.pump_media(start);
    assert!(p.has_pending_advance());

    p.tick(start + Duration::from_millis(100));
    assert_eq!(p.store().index(), 0);

    p.tick(start + Duration::from_millis(300));
    assert_eq!(p.store().index(), 1);
    assert!(p.state().is_playing);
    assert!(!p.has_pending_advance());

    // A later tick must not advance again.
    p.tick(start + Duration::from_secs(5));
    assert_eq!(p.store().index(), 1);
}

#[test]
fn ended_on_last_track_without_loop_pauses() {
    let mut p = player(2, false);
    p.load_track(1);
    p.play();
    p.handle_media_event(MediaEvent::Ended, Instant::now());
    assert!(!p.has_pending_advance());
    assert!(!p.state().is_playing);
    assert_eq!(p.store().index(), 1);
}

#[test]
fn manual_navigation_cancels_pending_advance() {
    let mut p = player(3, true);
    let now = Instant::now();
    p.handle_media_event(MediaEvent::Ended, now);
    p.load_track(2);
    p.tick(now + Duration::from_secs(1));
    assert_eq!(p.store().index(), 2);
}

#[test]
fn failed_source_pauses_with_notice() {
    let mut p = player(1, true);
    p.play();
    let rx = p.subscribe();
    p.handle_media_event(MediaEvent::Failed("bad data".into()), Instant::now());
    assert!(!p.state().is_playing);
    assert!(
        drain(&rx)
            .iter()
            .any(|e| matches!(e, PlayerEvent::Notice(m) if m.contains("bad data")))
    );
}

#[test]
fn verse_activation_is_published_once_per_change() {
    let mut p = player(1, true);
    let generation = last_request(&p).generation;
    p.apply_text(TextResponse {
        generation,
        result: Ok(verses(10)),
    });
    assert_eq!(p.text_status(), TextStatus::Loaded);
    assert_eq!(p.verses().len(), 10);

    let rx = p.subscribe();
    let update = MediaEvent::TimeUpdate {
        position: Duration::from_secs(25),
        duration: Some(Duration::from_secs(100)),
    };
    p.handle_media_event(update.clone(), Instant::now());
    p.handle_media_event(update, Instant::now());

    assert_eq!(
        drain(&rx),
        vec![PlayerEvent::VerseActivated(VerseChange {
            previous: None,
            current: 2
        })]
    );
    assert_eq!(p.active_verse(), Some(2));
}

#[test]
fn stale_text_reply_is_dropped() {
    let mut p = player(2, true);
    let first = last_request(&p).generation;
    p.load_track(1);
    p.apply_text(TextResponse {
        generation: first,
        result: Ok(verses(3)),
    });
    assert!(p.verses().is_empty());
    assert_eq!(p.text_status(), TextStatus::Loading);
}

#[test]
fn missing_text_shows_placeholder() {
    let mut p = player(1, true);
    let generation = last_request(&p).generation;
    p.apply_text(TextResponse {
        generation,
        result: Err(Error::Decode("404".into())),
    });
    assert!(p.verses().is_empty());
    assert_eq!(p.text_status(), TextStatus::Missing);
    assert_eq!(p.text_placeholder(), Some(NO_TEXT_PLACEHOLDER));
    assert_eq!(p.active_verse(), None);
}

#[test]
fn blank_text_counts_as_missing() {
    let mut p = player(1, true);
    let generation = last_request(&p).generation;
    p.apply_text(TextResponse {
        generation,
        result: Ok(Vec::new()),
    });
    assert_eq!(p.text_placeholder(), Some(NO_TEXT_PLACEHOLDER));
}

#[test]
fn selecting_local_files_plays_the_first() {
    let mut p = empty_player(true);
    let handles = vec![
        FileHandle::from_bytes("A01_2_Genesis.mp3", Some("audio/mpeg"), vec![1u8; 4]),
        FileHandle::from_bytes("A01_1_Genesis.mp3", Some("audio/mpeg"), vec![1u8; 4]),
        FileHandle::from_bytes("notes.txt", Some("text/plain"), vec![1u8; 4]),
    ];
    assert!(p.select_local_files(handles));
    assert_eq!(p.store().len(), 2);
    assert_eq!(p.store().index(), 0);
    assert!(p.state().is_playing);
    assert_eq!(p.current_track().map(|t| t.chapter.as_str()), Some("1"));
    assert!(matches!(p.output().loads[0], Locator::Blob(_)));
}

#[test]
fn selecting_no_audio_files_keeps_playlist() {
    let mut p = player(2, true);
    let handles = vec![FileHandle::from_bytes("readme.md", None, vec![0u8; 2])];
    assert!(!p.select_local_files(handles));
    assert_eq!(p.store().len(), 2);
}

#[test]
fn external_playlist_keeps_playing_state() {
    let mut p = player(2, true);
    p.play();
    let replaced = p.set_external(vec![
        ExternalItem::Source("https://example.org/B01_1_Matthew.mp3".into()),
        ExternalItem::Source("   ".into()),
    ]);
    assert!(replaced);
    assert_eq!(p.store().len(), 1);
    assert!(p.state().is_playing);
    assert_eq!(p.current_track().map(|t| t.book.as_str()), Some("Matthew"));
}

#[test]
fn seek_is_clamped_to_track_bounds() {
    let mut p = player(1, true);
    p.output_mut().duration = Some(Duration::from_secs(20));
    p.output_mut().position = Duration::from_secs(3);
    p.seek_by(-5);
    assert_eq!(p.output().seeks.last(), Some(&Duration::ZERO));
    p.seek_by(60);
    assert_eq!(p.output().seeks.last(), Some(&Duration::from_secs(20)));
}

#[test]
fn dropped_subscribers_are_pruned() {
    let mut p = player(1, true);
    let rx = p.subscribe();
    drop(rx);
    let kept = p.subscribe();
    p.toggle_loop();
    assert_eq!(drain(&kept).len(), 1);
}

#[test]
fn stop_pauses_and_rewinds() {
    let mut p = player(1, true);
    p.play();
    p.output_mut().position = Duration::from_secs(30);
    p.stop();
    assert!(!p.state().is_playing);
    assert_eq!(p.output().seeks.last(), Some(&Duration::ZERO));
}

#[test]
fn seeking_while_paused_moves_the_highlight() {
    let mut p = player(1, true);
    let generation = last_request(&p).generation;
    p.apply_text(TextResponse {
        generation,
        result: Ok(verses(10)),
    });
    p.output_mut().duration = Some(Duration::from_secs(100));
    p.handle_media_event(
        MediaEvent::TimeUpdate {
            position: Duration::ZERO,
            duration: Some(Duration::from_secs(100)),
        },
        Instant::now(),
    );
    assert_eq!(p.active_verse(), Some(0));
    assert!(!p.state().is_playing);

    let rx = p.subscribe();
    p.seek_by(55);
    assert_eq!(p.active_verse(), Some(5));
    assert_eq!(
        drain(&rx),
        vec![PlayerEvent::VerseActivated(VerseChange {
            previous: Some(0),
            current: 5
        })]
    );
}

#[test]
fn pausing_cancels_a_pending_advance() {
    let mut p = player(3, true);
    p.play();
    let now = Instant::now();
    p.handle_media_event(MediaEvent::Ended, now);
    assert!(p.has_pending_advance());

    p.pause();
    assert!(!p.has_pending_advance());
    p.tick(now + Duration::from_secs(1));
    assert_eq!(p.store().index(), 0);
    assert!(!p.state().is_playing);
}
