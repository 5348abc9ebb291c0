//! Playback session: demo playlist or a connected music-service account
//!
//! The cached token and its expiry live in preferences so a restart inside
//! the token lifetime stays connected. An expired token is treated as absent.

use std::sync::Arc;
use std::time::Duration;

use agritrack_common::config::SpotifyConfig;
use agritrack_common::events::{AgriEvent, EventBus, NowPlaying};
use agritrack_common::prefs::{
    KeyValueStore, KEY_SPOTIFY_CLIENT_ID, KEY_SPOTIFY_TOKEN, KEY_SPOTIFY_TOKEN_EXPIRY,
};
use agritrack_common::time;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::spotify::{authorize_url, SpotifyClient};
use super::{DemoPlayer, PlaybackAction, PlaybackControl, PlaybackError, PlaybackStatus};

#[derive(Debug, Clone)]
struct Token {
    access_token: String,
    expires_at_ms: i64,
}

impl Token {
    fn is_valid(&self) -> bool {
        time::now_epoch_ms() < self.expires_at_ms
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<Token>,
    track: Option<NowPlaying>,
    is_playing: bool,
    error: Option<String>,
    demo: DemoPlayer,
}

impl SessionState {
    fn status(&self) -> PlaybackStatus {
        match self.token {
            Some(_) => PlaybackStatus {
                track: self.track.clone(),
                is_playing: self.is_playing,
                demo_mode: false,
                error: self.error.clone(),
            },
            None => PlaybackStatus {
                track: Some(self.demo.current()),
                is_playing: self.demo.is_playing(),
                demo_mode: true,
                error: self.error.clone(),
            },
        }
    }

    /// Token to use for a request, dropping it first if it has expired
    fn live_token(&mut self) -> Option<String> {
        match &self.token {
            Some(token) if token.is_valid() => Some(token.access_token.clone()),
            Some(_) => {
                info!("Music-service token expired, returning to demo mode");
                self.token = None;
                self.track = None;
                self.is_playing = false;
                None
            }
            None => None,
        }
    }
}

/// Read a cached token from preferences, ignoring it once expired
fn load_cached_token(prefs: &dyn KeyValueStore) -> Option<Token> {
    let access_token = prefs.get(KEY_SPOTIFY_TOKEN)?;
    let expires_at_ms = prefs.get(KEY_SPOTIFY_TOKEN_EXPIRY)?.parse::<i64>().ok()?;
    let token = Token {
        access_token,
        expires_at_ms,
    };
    token.is_valid().then_some(token)
}

/// `PlaybackControl` over the demo playlist and the Spotify player API
pub struct PlaybackSession {
    state: Mutex<SessionState>,
    client: SpotifyClient,
    config: SpotifyConfig,
    redirect_uri: String,
    prefs: Arc<dyn KeyValueStore>,
    event_bus: EventBus,
}

impl PlaybackSession {
    pub fn new(
        config: SpotifyConfig,
        redirect_uri: String,
        prefs: Arc<dyn KeyValueStore>,
        event_bus: EventBus,
    ) -> Result<Self, PlaybackError> {
        let client = SpotifyClient::new(&config.api_base_url)?;
        let token = load_cached_token(prefs.as_ref());
        if token.is_some() {
            info!("Restored cached music-service session");
        } else {
            info!("No valid music-service session, playback in demo mode");
        }

        Ok(Self {
            state: Mutex::new(SessionState {
                token,
                ..SessionState::default()
            }),
            client,
            config,
            redirect_uri,
            prefs,
            event_bus,
        })
    }

    fn emit(&self, status: &PlaybackStatus) {
        self.event_bus.emit_lossy(AgriEvent::PlaybackChanged {
            track: status.track.clone(),
            is_playing: status.is_playing,
            demo_mode: status.demo_mode,
            timestamp: time::now(),
        });
    }

    fn forget_token(&self) {
        for key in [KEY_SPOTIFY_TOKEN, KEY_SPOTIFY_TOKEN_EXPIRY] {
            if let Err(e) = self.prefs.remove(key) {
                warn!("Failed to clear preference {}: {}", key, e);
            }
        }
    }
}

#[async_trait]
impl PlaybackControl for PlaybackSession {
    async fn status(&self) -> PlaybackStatus {
        self.state.lock().await.status()
    }

    async fn control(&self, action: PlaybackAction) -> Result<PlaybackStatus, PlaybackError> {
        let token = {
            let mut state = self.state.lock().await;
            match state.live_token() {
                Some(token) => token,
                None => {
                    state.demo.apply(action);
                    state.error = None;
                    let status = state.status();
                    drop(state);
                    debug!(action = action.as_str(), "Demo playback command");
                    self.emit(&status);
                    return Ok(status);
                }
            }
        };

        if let Err(e) = self.client.send(&token, action).await {
            warn!(action = action.as_str(), "Playback command failed: {:?}", e);
            self.state.lock().await.error = Some(e.to_string());
            return Err(e);
        }

        {
            let mut state = self.state.lock().await;
            state.error = None;
            match action {
                PlaybackAction::Play => state.is_playing = true,
                PlaybackAction::Pause => state.is_playing = false,
                PlaybackAction::Next | PlaybackAction::Previous => {}
            }
        }

        // Track changes only show up on the next currently-playing read
        self.refresh().await;
        Ok(self.status().await)
    }

    async fn refresh(&self) {
        let token = match self.state.lock().await.live_token() {
            Some(token) => token,
            None => return,
        };

        match self.client.currently_playing(&token).await {
            Ok(Some((track, is_playing))) => {
                let status = {
                    let mut state = self.state.lock().await;
                    let changed = state.track.as_ref() != Some(&track) || state.is_playing != is_playing;
                    state.track = Some(track);
                    state.is_playing = is_playing;
                    changed.then(|| state.status())
                };
                if let Some(status) = status {
                    self.emit(&status);
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Currently-playing poll failed: {:?}", e),
        }
    }

    async fn login_url(&self, client_id: Option<String>) -> Result<String, PlaybackError> {
        let client_id = match client_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => {
                let id = id.trim().to_string();
                if let Err(e) = self.prefs.set(KEY_SPOTIFY_CLIENT_ID, &id) {
                    warn!("Failed to save music client id: {}", e);
                }
                id
            }
            None => self
                .config
                .client_id
                .clone()
                .or_else(|| self.prefs.get(KEY_SPOTIFY_CLIENT_ID))
                .filter(|id| !id.trim().is_empty())
                .ok_or(PlaybackError::MissingClientId)?,
        };

        authorize_url(&self.config.accounts_url, &client_id, &self.redirect_uri)
    }

    async fn connect(&self, access_token: &str, expires_in_secs: u64) -> PlaybackStatus {
        let expires_in_ms = i64::try_from(expires_in_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let token = Token {
            access_token: access_token.to_string(),
            expires_at_ms: time::now_epoch_ms().saturating_add(expires_in_ms),
        };

        if let Err(e) = self.prefs.set(KEY_SPOTIFY_TOKEN, &token.access_token) {
            warn!("Failed to cache music-service token: {}", e);
        }
        if let Err(e) = self
            .prefs
            .set(KEY_SPOTIFY_TOKEN_EXPIRY, &token.expires_at_ms.to_string())
        {
            warn!("Failed to cache music-service token expiry: {}", e);
        }

        let status = {
            let mut state = self.state.lock().await;
            state.token = Some(token);
            state.track = None;
            state.is_playing = false;
            state.error = None;
            state.status()
        };
        info!("Connected to music service");
        self.emit(&status);

        self.refresh().await;
        self.status().await
    }

    async fn disconnect(&self) -> PlaybackStatus {
        self.forget_token();

        let status = {
            let mut state = self.state.lock().await;
            state.token = None;
            state.track = None;
            state.is_playing = false;
            state.error = None;
            state.demo.reset();
            state.status()
        };
        info!("Disconnected from music service, playback in demo mode");
        self.emit(&status);
        status
    }
}

/// Poll the music service on a fixed interval
pub fn spawn_playback_poller(
    playback: Arc<dyn PlaybackControl>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Playback poller started (every {:?})", period);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            playback.refresh().await;
        }
    })
}
