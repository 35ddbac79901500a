//! MPRIS service on the session bus so media keys and `playerctl` can drive
//! the player.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface, object_server::InterfaceRef};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::library::{Locator, Track};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.lectern";
const NOTIFY_POLL: Duration = Duration::from_millis(200);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum Status {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "Stopped",
            Status::Playing => "Playing",
            Status::Paused => "Paused",
        }
    }
}

#[derive(Debug, Default)]
struct SharedState {
    status: Status,
    title: Option<String>,
    /// The book, exposed as the album.
    album: Option<String>,
    url: Option<String>,
    /// The chapter, when it is numeric.
    track_number: Option<i32>,
    length_micros: Option<i64>,
    track_id: Option<ObjectPath<'static>>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, loaded: bool, playing: bool) {
        let status = match (loaded, playing) {
            (false, _) => Status::Stopped,
            (true, true) => Status::Playing,
            (true, false) => Status::Paused,
        };
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if s.status != status {
            s.status = status;
            let _ = self.notify.send(());
        }
    }

    pub fn set_track_metadata(
        &self,
        index: Option<usize>,
        track: Option<&Track>,
        length: Option<Duration>,
    ) {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let track_id = index.and_then(|i| {
            ObjectPath::try_from(format!("{OBJECT_PATH}/track/{i}"))
                .ok()
                .map(|p| p.into_owned())
        });
        let title = track.map(|t| t.title.clone());
        let length_micros = length.and_then(|d| i64::try_from(d.as_micros()).ok());
        if s.track_id == track_id && s.title == title && s.length_micros == length_micros {
            return;
        }

        s.track_id = track_id;
        s.title = title;
        s.album = track.map(|t| t.book.clone()).filter(|b| !b.is_empty());
        s.url = track.and_then(|t| locator_url(&t.locator));
        s.track_number = track
            .and_then(Track::chapter_number)
            .and_then(|n| i32::try_from(n).ok());
        s.length_micros = length_micros;
        let _ = self.notify.send(());
    }
}

/// URL for a locator; transient blob locators have none worth sharing.
fn locator_url(locator: &Locator) -> Option<String> {
    match locator {
        Locator::Path(p) => {
            let abs = std::fs::canonicalize(p).unwrap_or_else(|_| p.clone());
            Some(format!("file://{}", abs.display()))
        }
        Locator::Url(u) => Some(u.clone()),
        Locator::Blob(_) => None,
    }
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "lectern"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string(), "http".to_string(), "https".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        ["audio/mpeg", "audio/wav", "audio/ogg", "audio/mp4"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            .as_str()
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = HashMap::new();
        let mut put = |key: &str, value: Option<OwnedValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };

        put(
            "mpris:trackid",
            s.track_id.clone().and_then(|p| owned(Value::from(p))),
        );
        put(
            "xesam:title",
            owned(Value::from(s.title.clone().unwrap_or_default())),
        );
        put("xesam:album", s.album.clone().and_then(|a| owned(Value::from(a))));
        put("xesam:url", s.url.clone().and_then(|u| owned(Value::from(u))));
        put(
            "xesam:trackNumber",
            s.track_number.and_then(|n| owned(Value::from(n))),
        );
        put("mpris:length", s.length_micros.and_then(|l| owned(Value::from(l))));
        map
    }
}

/// Emit `PropertiesChanged` for the player properties we keep in sync.
async fn emit_changes(player: &InterfaceRef<PlayerIface>) {
    let emitter = player.signal_emitter();
    let iface = player.get().await;
    if let Err(e) = iface.playback_status_changed(emitter).await {
        debug!(error = %e, "MPRIS: failed to emit PlaybackStatus change");
    }
    if let Err(e) = iface.metadata_changed(emitter).await {
        debug!(error = %e, "MPRIS: failed to emit Metadata change");
    }
}

async fn serve(tx: Sender<ControlCmd>, state: Arc<Mutex<SharedState>>, notify: Receiver<()>) {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "MPRIS: failed to connect to session bus");
            return;
        }
    };

    if let Err(e) = connection.request_name(BUS_NAME).await {
        warn!(error = %e, "MPRIS: failed to acquire name");
        return;
    }

    let object_server = connection.object_server();

    if let Err(e) = object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
        warn!(error = %e, "MPRIS: failed to register root iface");
        return;
    }

    if let Err(e) = object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await {
        warn!(error = %e, "MPRIS: failed to register player iface");
        return;
    }

    let player = match object_server.interface::<_, PlayerIface>(OBJECT_PATH).await {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "MPRIS: player iface lookup failed");
            return;
        }
    };
    debug!(name = BUS_NAME, "MPRIS service registered");

    loop {
        Timer::after(NOTIFY_POLL).await;
        let mut changed = false;
        loop {
            match notify.try_recv() {
                Ok(()) => changed = true,
                Err(mpsc::TryRecvError::Empty) => break,
                // The handle is gone; the app is shutting down.
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }
        if changed {
            emit_changes(&player).await;
        }
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel();

    let state_for_thread = state.clone();
    std::thread::spawn(move || block_on(serve(tx, state_for_thread, notify_rx)));

    MprisHandle {
        state,
        notify: notify_tx,
    }
}
