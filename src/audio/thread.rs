use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::library::Locator;
use crate::playlist::BlobRegistry;

use super::sink::{read_source, sink_from_bytes};
use super::types::{AudioCmd, MediaEvent, OutputHandle, SourceStatus, update_info, update_info_for};

/// Interval between position reports.
const TICK: Duration = Duration::from_millis(250);

pub(super) type EventSender = Sender<(u64, MediaEvent)>;

/// Builds a paused sink from source bytes.
pub(super) type Opener<'a> = dyn Fn(Arc<[u8]>) -> Result<(Sink, Option<Duration>)> + 'a;

struct Loaded {
    generation: u64,
    /// Kept so a finished track can restart without reading it again.
    bytes: Arc<[u8]>,
    sink: Sink,
    duration: Option<Duration>,
    ended: bool,
}

/// What was asked of a load whose bytes are still being read.
struct Pending {
    generation: u64,
    play: bool,
    seek: Option<Duration>,
}

/// Sink state owned by the audio thread.
pub(super) struct Deck {
    current: Option<Loaded>,
    pending: Option<Pending>,
    volume: f32,
    events: EventSender,
    info: OutputHandle,
}

impl Deck {
    pub(super) fn new(events: EventSender, info: OutputHandle) -> Self {
        Self {
            current: None,
            pending: None,
            volume: 1.0,
            events,
            info,
        }
    }

    /// Drop the current sink and wait for the bytes of load `generation`.
    pub(super) fn begin_load(&mut self, generation: u64) {
        if let Some(old) = self.current.take() {
            old.sink.stop();
        }
        self.pending = Some(Pending {
            generation,
            play: false,
            seek: None,
        });
    }

    pub(super) fn fetched(&mut self, generation: u64, result: Result<Arc<[u8]>>, open: &Opener) {
        let Some(pending) = self.pending.take_if(|p| p.generation == generation) else {
            debug!(generation, "dropping bytes for a superseded load");
            return;
        };
        let opened = result.and_then(|bytes| {
            let (sink, duration) = open(bytes.clone())?;
            Ok((bytes, sink, duration))
        });
        match opened {
            Ok((bytes, sink, duration)) => {
                sink.set_volume(self.volume);
                debug!(generation, ?duration, "track loaded");
                update_info_for(&self.info, generation, |i| {
                    i.status = SourceStatus::Ready;
                    i.duration = duration;
                    i.position = Duration::ZERO;
                });
                let mut loaded = Loaded {
                    generation,
                    bytes,
                    sink,
                    duration,
                    ended: false,
                };
                if let Some(position) = pending.seek {
                    seek_loaded(&mut loaded, position, &self.events, &self.info);
                }
                if pending.play {
                    loaded.sink.play();
                }
                self.current = Some(loaded);
            }
            Err(e) => {
                warn!(generation, error = %e, "failed to open track");
                self.fail(generation, e.to_string());
            }
        }
    }

    fn fail(&self, generation: u64, reason: String) {
        update_info_for(&self.info, generation, |i| {
            i.status = SourceStatus::Failed(reason.clone());
        });
        let _ = self.events.send((generation, MediaEvent::Failed(reason)));
    }

    /// A track that played to its end gets a fresh sink, like a media
    /// element starting over.
    fn restart_if_ended(&mut self, open: &Opener) {
        let Some(c) = self.current.as_ref().filter(|c| c.ended) else {
            return;
        };
        let (generation, bytes, duration) = (c.generation, c.bytes.clone(), c.duration);
        self.current = None;
        match open(bytes.clone()) {
            Ok((sink, _)) => {
                sink.set_volume(self.volume);
                update_info_for(&self.info, generation, |i| i.position = Duration::ZERO);
                self.current = Some(Loaded {
                    generation,
                    bytes,
                    sink,
                    duration,
                    ended: false,
                });
            }
            Err(e) => {
                warn!(generation, error = %e, "failed to restart track");
                self.fail(generation, e.to_string());
            }
        }
    }

    pub(super) fn play(&mut self, open: &Opener) {
        if let Some(p) = self.pending.as_mut() {
            p.play = true;
            return;
        }
        self.restart_if_ended(open);
        if let Some(c) = self.current.as_ref() {
            c.sink.play();
        }
    }

    pub(super) fn pause(&mut self) {
        if let Some(p) = self.pending.as_mut() {
            p.play = false;
        }
        if let Some(c) = self.current.as_ref() {
            c.sink.pause();
        }
    }

    pub(super) fn seek(&mut self, position: Duration, open: &Opener) {
        if let Some(p) = self.pending.as_mut() {
            p.seek = Some(position);
            return;
        }
        self.restart_if_ended(open);
        if let Some(c) = self.current.as_mut() {
            seek_loaded(c, position, &self.events, &self.info);
        }
    }

    pub(super) fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(c) = self.current.as_ref() {
            c.sink.set_volume(volume);
        }
    }

    pub(super) fn tick(&mut self) {
        if let Some(c) = self.current.as_mut() {
            report_progress(c, &self.events, &self.info);
        }
    }

    pub(super) fn quit(&mut self, fade_out_ms: u64) {
        if let Some(c) = self.current.take() {
            fade_out_sink(&c.sink, self.volume, fade_out_ms);
            c.sink.stop();
        }
        self.pending = None;
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    tx: Sender<AudioCmd>,
    events: EventSender,
    info: OutputHandle,
    blobs: BlobRegistry,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "no audio output device");
                run_without_device(&rx, &events, &info, e.to_string());
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);

        let open = |bytes: Arc<[u8]>| sink_from_bytes(stream.mixer(), bytes);
        let fetch = move |locator: &Locator| read_source(locator, &blobs);
        let mut deck = Deck::new(events, info);
        command_loop(&rx, &tx, &mut deck, &open, fetch);
        debug!("audio thread exiting");
    })
}

/// Serve commands until `Quit`. Source bytes are read by `fetch` on a
/// worker thread and come back as `AudioCmd::Fetched`, so a slow read never
/// holds up the queue.
pub(super) fn command_loop<F>(
    rx: &Receiver<AudioCmd>,
    tx: &Sender<AudioCmd>,
    deck: &mut Deck,
    open: &Opener,
    fetch: F,
) where
    F: Fn(&Locator) -> Result<Arc<[u8]>> + Clone + Send + 'static,
{
    let mut last_tick = Instant::now();
    loop {
        match rx.recv_timeout(TICK) {
            Ok(AudioCmd::Load {
                generation,
                locator,
            }) => {
                deck.begin_load(generation);
                let fetch = fetch.clone();
                let tx = tx.clone();
                thread::spawn(move || {
                    let result = fetch(&locator);
                    let _ = tx.send(AudioCmd::Fetched { generation, result });
                });
            }
            Ok(AudioCmd::Fetched { generation, result }) => deck.fetched(generation, result, open),
            Ok(AudioCmd::Play) => deck.play(open),
            Ok(AudioCmd::Pause) => deck.pause(),
            Ok(AudioCmd::Seek(position)) => deck.seek(position, open),
            Ok(AudioCmd::SetVolume(v)) => deck.set_volume(v),
            Ok(AudioCmd::Quit { fade_out_ms }) => {
                deck.quit(fade_out_ms);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_tick.elapsed() >= TICK {
            last_tick = Instant::now();
            deck.tick();
        }
    }
}

/// Seek within the loaded sink and report the new position right away, so
/// the verse highlight follows even while paused.
fn seek_loaded(c: &mut Loaded, position: Duration, events: &EventSender, info: &OutputHandle) {
    let target = match c.duration {
        Some(d) => position.min(d),
        None => position,
    };
    match c.sink.try_seek(target) {
        Ok(()) => {
            update_info_for(info, c.generation, |i| i.position = target);
            let _ = events.send((
                c.generation,
                MediaEvent::TimeUpdate {
                    position: target,
                    duration: c.duration,
                },
            ));
        }
        Err(e) => warn!(error = %e, "seek failed"),
    }
}

fn report_progress(c: &mut Loaded, events: &EventSender, info: &OutputHandle) {
    if c.ended || c.sink.is_paused() {
        return;
    }
    if c.sink.empty() {
        c.ended = true;
        let _ = events.send((c.generation, MediaEvent::Ended));
        return;
    }
    let position = c.sink.get_pos();
    update_info_for(info, c.generation, |i| i.position = position);
    let _ = events.send((
        c.generation,
        MediaEvent::TimeUpdate {
            position,
            duration: c.duration,
        },
    ));
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Command loop used when no device could be opened: every load fails.
pub(super) fn run_without_device(
    rx: &Receiver<AudioCmd>,
    events: &EventSender,
    info: &OutputHandle,
    reason: String,
) {
    update_info(info, |i| i.device_error = Some(reason.clone()));
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCmd::Load { generation, .. } => {
                update_info_for(info, generation, |i| {
                    i.status = SourceStatus::Failed(reason.clone());
                });
                let _ = events.send((generation, MediaEvent::Failed(reason.clone())));
            }
            AudioCmd::Quit { .. } => break,
            _ => {}
        }
    }
}
