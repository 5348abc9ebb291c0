//! Local demo playlist

use agritrack_common::events::NowPlaying;

use super::PlaybackAction;

struct DemoTrack {
    name: &'static str,
    artist: &'static str,
    album_art: &'static str,
    duration_ms: u64,
}

const DEMO_PLAYLIST: [DemoTrack; 5] = [
    DemoTrack {
        name: "International Harvester",
        artist: "Craig Morgan",
        album_art: "https://i.scdn.co/image/ab67616d0000b273ea3ef7697cfd57d99414f7bc",
        duration_ms: 215_000,
    },
    DemoTrack {
        name: "Amarillo By Morning",
        artist: "George Strait",
        album_art: "https://i.scdn.co/image/ab67616d0000b273e11a75a2f2ff39cec788a015",
        duration_ms: 172_000,
    },
    DemoTrack {
        name: "She Thinks My Tractor's Sexy",
        artist: "Kenny Chesney",
        album_art: "https://i.scdn.co/image/ab67616d0000b2735f367d17672857e9dfd16b75",
        duration_ms: 248_000,
    },
    DemoTrack {
        name: "God's Country",
        artist: "Blake Shelton",
        album_art: "https://i.scdn.co/image/ab67616d0000b273163322554683a097b610452e",
        duration_ms: 205_000,
    },
    DemoTrack {
        name: "Take Me Home, Country Roads",
        artist: "John Denver",
        album_art: "https://i.scdn.co/image/ab67616d0000b273d92d7c8c6c03e950c879a6a4",
        duration_ms: 198_000,
    },
];

/// Playlist cursor with no network behind it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoPlayer {
    index: usize,
    is_playing: bool,
}

impl DemoPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> NowPlaying {
        let track = &DEMO_PLAYLIST[self.index];
        NowPlaying {
            name: track.name.to_string(),
            artist: track.artist.to_string(),
            album_art: Some(track.album_art.to_string()),
            uri: format!("demo:{}", self.index + 1),
            duration_ms: Some(track.duration_ms),
        }
    }

    /// Skipping in either direction wraps and starts playing
    pub fn apply(&mut self, action: PlaybackAction) {
        let len = DEMO_PLAYLIST.len();
        match action {
            PlaybackAction::Play => self.is_playing = true,
            PlaybackAction::Pause => self.is_playing = false,
            PlaybackAction::Next => {
                self.index = (self.index + 1) % len;
                self.is_playing = true;
            }
            PlaybackAction::Previous => {
                self.index = (self.index + len - 1) % len;
                self.is_playing = true;
            }
        }
    }

    /// Back to the first track, stopped
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
