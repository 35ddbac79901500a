use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};
use crate::library::Locator;
use crate::playlist::BlobRegistry;

use super::thread::spawn_audio_thread;
use super::types::{
    AudioCmd, AudioOutput, MediaEvent, OutputHandle, OutputInfo, SourceStatus, update_info,
};

/// `AudioOutput` backed by a `rodio` sink on its own thread.
pub struct RodioOutput {
    tx: Sender<AudioCmd>,
    events: Receiver<(u64, MediaEvent)>,
    info: OutputHandle,
    generation: u64,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioOutput {
    pub fn new(blobs: BlobRegistry) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel();
        let info: OutputHandle = Arc::new(Mutex::new(OutputInfo::default()));

        let handle = spawn_audio_thread(rx, tx.clone(), event_tx, info.clone(), blobs);

        Self {
            tx,
            events: event_rx,
            info,
            generation: 0,
            join: Mutex::new(Some(handle)),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone; command dropped");
        }
    }

    fn snapshot(&self) -> OutputInfo {
        self.info.lock().map(|i| i.clone()).unwrap_or_default()
    }

    /// Fade out, stop the audio thread and wait for it.
    pub fn shutdown(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        // The thread keeps a sender to its own queue, so it never sees a
        // disconnect; tell it to stop. A no-op after `shutdown`.
        let _ = self.tx.send(AudioCmd::Quit { fade_out_ms: 0 });
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, locator: &Locator) {
        self.generation += 1;
        let generation = self.generation;
        update_info(&self.info, |i| {
            i.generation = generation;
            i.status = SourceStatus::Loading;
            i.position = Duration::ZERO;
            i.duration = None;
        });
        self.send(AudioCmd::Load {
            generation,
            locator: locator.clone(),
        });
    }

    fn play(&mut self) -> Result<()> {
        let info = self.snapshot();
        if let Some(reason) = info.device_error {
            return Err(Error::OutputUnavailable(reason));
        }
        match info.status {
            SourceStatus::Empty => {
                return Err(Error::PlaybackRejected("nothing is loaded".to_string()));
            }
            SourceStatus::Failed(reason) => return Err(Error::PlaybackRejected(reason)),
            SourceStatus::Loading | SourceStatus::Ready => {}
        }
        self.send(AudioCmd::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume.clamp(0.0, 1.0)));
    }

    fn position(&self) -> Duration {
        self.snapshot().position
    }

    fn duration(&self) -> Option<Duration> {
        self.snapshot().duration
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        // Events for superseded loads are dropped here.
        while let Ok((generation, event)) = self.events.try_recv() {
            if generation == self.generation {
                return Some(event);
            }
        }
        None
    }
}
