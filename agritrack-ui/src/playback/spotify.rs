//! Spotify Web API client
//!
//! Only the player endpoints the music panel needs: currently-playing and
//! the four transport commands. Authorization uses the implicit-grant
//! redirect; the token arrives through the session.

use std::time::Duration;

use agritrack_common::events::NowPlaying;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;

use super::{PlaybackAction, PlaybackError};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const SCOPES: &str =
    "user-read-playback-state user-modify-playback-state user-read-currently-playing";

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    #[serde(default)]
    is_playing: bool,
    item: Option<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    name: String,
    uri: String,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

impl Item {
    fn into_now_playing(self) -> NowPlaying {
        let artist = self
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let album_art = self
            .album
            .and_then(|a| a.images.into_iter().next())
            .map(|i| i.url);

        NowPlaying {
            name: self.name,
            artist,
            album_art,
            uri: self.uri,
            duration_ms: self.duration_ms,
        }
    }
}

/// Decode a currently-playing body; `None` when nothing is loaded
fn parse_currently_playing(body: &str) -> Result<Option<(NowPlaying, bool)>, PlaybackError> {
    let parsed: CurrentlyPlaying =
        serde_json::from_str(body).map_err(|e| PlaybackError::CommandFailed(e.to_string()))?;
    Ok(parsed
        .item
        .map(|item| (item.into_now_playing(), parsed.is_playing)))
}

/// Authorize URL for the implicit-grant login redirect
pub fn authorize_url(
    accounts_url: &str,
    client_id: &str,
    redirect_uri: &str,
) -> Result<String, PlaybackError> {
    let base = format!("{}/authorize", accounts_url.trim_end_matches('/'));
    let url = Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", SCOPES),
            ("response_type", "token"),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| PlaybackError::CommandFailed(e.to_string()))?;
    Ok(url.to_string())
}

/// Spotify player API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl SpotifyClient {
    pub fn new(api_base_url: &str) -> Result<Self, PlaybackError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlaybackError::CommandFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn player_url(&self, path: &str) -> String {
        format!("{}/v1/me/player/{}", self.api_base_url, path)
    }

    /// Current track and play state
    ///
    /// `Ok(None)` for "nothing playing" (204) and for error statuses, which
    /// the poller treats as "keep what is shown".
    pub async fn currently_playing(
        &self,
        token: &str,
    ) -> Result<Option<(NowPlaying, bool)>, PlaybackError> {
        let response = self
            .http_client
            .get(self.player_url("currently-playing"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlaybackError::CommandFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status.as_u16() > 400 {
            tracing::debug!(status = status.as_u16(), "No currently-playing update");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlaybackError::CommandFailed(e.to_string()))?;
        parse_currently_playing(&body)
    }

    /// Send one transport command
    pub async fn send(&self, token: &str, action: PlaybackAction) -> Result<(), PlaybackError> {
        let method = match action {
            PlaybackAction::Play | PlaybackAction::Pause => Method::PUT,
            PlaybackAction::Next | PlaybackAction::Previous => Method::POST,
        };

        let response = self
            .http_client
            .request(method, self.player_url(action.as_str()))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await
            .map_err(|e| PlaybackError::CommandFailed(e.to_string()))?;

        match response.status() {
            StatusCode::FORBIDDEN => Err(PlaybackError::PremiumRequired),
            StatusCode::NOT_FOUND => Err(PlaybackError::NoActiveDevice),
            status => {
                tracing::debug!(action = action.as_str(), status = status.as_u16(), "Playback command sent");
                Ok(())
            }
        }
    }
}
