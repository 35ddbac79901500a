use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::audio::RodioOutput;
use crate::logging;
use crate::lyrics::TextLoader;
use crate::mpris::{ControlCmd, spawn_mpris};
use crate::player::{Player, PlayerOptions};
use crate::playlist::{BlobRegistry, PlaylistStore};
use crate::resource::Location;
use crate::ui::ViewState;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;
mod workers;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, warning) = settings::load_settings();
    let log_path = logging::init(&settings.log)?;
    if let Some(w) = warning {
        warn!("{w}");
    }
    info!(log = %log_path.display(), "lectern starting");

    let blobs = BlobRegistry::default();
    let output = RodioOutput::new(blobs.clone());
    let (text_tx, text_rx) = mpsc::channel();
    let texts = TextLoader::new(Location::parse(&settings.library.text_dir), text_tx);
    let store = PlaylistStore::new(blobs, &settings.library.extensions);
    let mut player = Player::new(store, output, texts, PlayerOptions::from(&settings));
    let mut view = ViewState::new(player.subscribe(), &settings.ui);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = spawn_mpris(control_tx.clone());

    let (manifest_tx, manifest_rx) = mpsc::channel();
    let mut manifests = workers::ManifestWorker::new(manifest_tx);

    let args: Vec<String> = env::args().skip(1).collect();
    startup::begin(&mut player, &mut manifests, &settings, &args);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let inbox = event_loop::Inbox {
        controls: control_rx,
        texts: text_rx,
        manifests: manifest_rx,
    };
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut player,
        &mut view,
        &mpris,
        &mut manifests,
        &control_tx,
        &inbox,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player
        .output()
        .shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
    info!("lectern stopped");

    run_result
}
