use crate::audio::AudioOutput;
use crate::lyrics::TextSource;
use crate::mpris::MprisHandle;
use crate::player::Player;

pub fn update_mpris<O: AudioOutput, T: TextSource>(mpris: &MprisHandle, player: &Player<O, T>) {
    let track = player.current_track();
    let index = track.map(|_| player.store().index());
    mpris.set_track_metadata(index, track, player.duration());
    mpris.set_playback(track.is_some(), player.state().is_playing);
}
