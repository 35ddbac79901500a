use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::audio::AudioOutput;
use crate::config;
use crate::lyrics::{TextResponse, TextSource};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::Player;
use crate::runtime::mpris_sync::update_mpris;
use crate::runtime::startup;
use crate::runtime::workers::{ManifestReply, ManifestWorker};
use crate::ui::{self, ViewState};

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Receiving ends the loop drains every iteration.
pub struct Inbox {
    pub controls: Receiver<ControlCmd>,
    pub texts: Receiver<TextResponse>,
    pub manifests: Receiver<ManifestReply>,
}

/// Main terminal event loop: feeds worker replies and media events to the
/// player, keeps MPRIS in sync, draws and handles input. Returns `Ok(())`
/// when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run<O: AudioOutput, T: TextSource>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    player: &mut Player<O, T>,
    view: &mut ViewState,
    mpris: &MprisHandle,
    manifests: &mut ManifestWorker,
    control_tx: &Sender<ControlCmd>,
    inbox: &Inbox,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(reply) = inbox.manifests.try_recv() {
            if manifests.is_current(&reply) {
                startup::apply_manifest(player, reply, settings);
            } else {
                debug!(generation = reply.generation, "dropping superseded manifest");
            }
        }

        while let Ok(response) = inbox.texts.try_recv() {
            player.apply_text(response);
        }

        let now = Instant::now();
        player.pump_media(now);
        player.tick(now);

        while let Ok(cmd) = inbox.controls.try_recv() {
            if handle_control_cmd(cmd, player) {
                return Ok(());
            }
        }

        view.drain();
        // Keep MPRIS in sync even when changes come from media keys or auto-advance.
        update_mpris(mpris, player);

        terminal.draw(|f| ui::draw(f, player, view, &settings.ui, &settings.controls))?;

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, player, view, manifests, control_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply a transport command. Returns true on quit.
pub fn handle_control_cmd<O: AudioOutput, T: TextSource>(
    cmd: ControlCmd,
    player: &mut Player<O, T>,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            info!("quit requested");
            return true;
        }
        ControlCmd::Play => {
            if !player.state().is_playing {
                player.play();
            }
        }
        ControlCmd::Pause => player.pause(),
        ControlCmd::PlayPause => player.toggle_play_pause(),
        ControlCmd::Stop => player.stop(),
        ControlCmd::Next => player.next(),
        ControlCmd::Prev => player.prev(),
    }
    false
}

/// Apply a key press. Returns true on quit.
pub fn handle_key_event<O: AudioOutput, T: TextSource>(
    key: KeyEvent,
    settings: &config::Settings,
    player: &mut Player<O, T>,
    view: &mut ViewState,
    manifests: &mut ManifestWorker,
    control_tx: &Sender<ControlCmd>,
) -> bool {
    let scrub = i64::try_from(settings.controls.scrub_seconds).unwrap_or(i64::MAX);
    let step = i16::from(settings.controls.volume_step);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => player.seek_by(scrub),
        KeyCode::Char('H') => player.seek_by(-scrub),
        KeyCode::Char('r') => player.toggle_loop(),
        KeyCode::Char('+') | KeyCode::Char('=') => player.nudge_volume(step),
        KeyCode::Char('-') => player.nudge_volume(-step),
        KeyCode::Char('m') => {
            info!("reloading manifest");
            startup::request_manifest(manifests, &settings.library);
        }
        KeyCode::Char('v') => view.toggle_playlist(),
        KeyCode::Char('c') => view.toggle_controls(),
        _ => {}
    }
    false
}
