//! Music panel playback
//!
//! An independent subsystem: it never reads or mutates the record store.
//! Without a valid music-service token it runs a local demo playlist that
//! never touches the network.

pub mod demo;
pub mod session;
pub mod spotify;

use std::str::FromStr;

use agritrack_common::events::NowPlaying;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use demo::DemoPlayer;
pub use session::{spawn_playback_poller, PlaybackSession};
pub use spotify::SpotifyClient;

/// Playback control errors, worded for the music panel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Premium required for full control.")]
    PremiumRequired,

    #[error("No active device found. Open Spotify on your phone.")]
    NoActiveDevice,

    #[error("Command failed.")]
    CommandFailed(String),

    #[error("Client ID is required for real connection")]
    MissingClientId,

    #[error("Not connected to a music service")]
    NotConnected,
}

/// Transport commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackAction {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlaybackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackAction::Play => "play",
            PlaybackAction::Pause => "pause",
            PlaybackAction::Next => "next",
            PlaybackAction::Previous => "previous",
        }
    }
}

impl FromStr for PlaybackAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(PlaybackAction::Play),
            "pause" => Ok(PlaybackAction::Pause),
            "next" => Ok(PlaybackAction::Next),
            "previous" => Ok(PlaybackAction::Previous),
            other => Err(format!("unknown playback action: {}", other)),
        }
    }
}

/// What the music panel shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub track: Option<NowPlaying>,
    pub is_playing: bool,
    pub demo_mode: bool,
    /// Last control error, cleared by the next success
    pub error: Option<String>,
}

/// Playback capability the HTTP layer drives
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    async fn status(&self) -> PlaybackStatus;

    async fn control(&self, action: PlaybackAction) -> Result<PlaybackStatus, PlaybackError>;

    /// Re-read "currently playing" from the service; no-op in demo mode
    async fn refresh(&self);

    /// Build the authorize URL, remembering `client_id` when given
    async fn login_url(&self, client_id: Option<String>) -> Result<String, PlaybackError>;

    /// Store a token returned by the authorize callback and leave demo mode
    async fn connect(&self, access_token: &str, expires_in_secs: u64) -> PlaybackStatus;

    /// Forget the token and return to demo mode
    async fn disconnect(&self) -> PlaybackStatus;
}
