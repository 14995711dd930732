use std::time::Duration;

use reqwest::StatusCode;

use crate::spotify_rs::error::RemoteServiceError;
use crate::spotify_rs::types::{CurrentlyPlaying, SearchResponse, SpotifyTrack};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Spotify Web API client for the player and search endpoints.
///
/// The access token is passed per call since it is rotated by the session while
/// requests are in flight.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: reqwest::Client,
}

impl SpotifyClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteServiceError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RemoteServiceError::from_response(response).await)
        }
    }

    /// Get the track playing on the user's active device
    pub async fn get_currently_playing(
        &self,
        access_token: &str,
    ) -> Result<SpotifyTrack, RemoteServiceError> {
        let response = self
            .client
            .get(format!("{}/me/player/currently-playing", SPOTIFY_API_URL))
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(RemoteServiceError::FailedToSendRequest)?;
        let response = Self::check(response).await?;

        // 204 means no device is playing anything
        if response.status() == StatusCode::NO_CONTENT {
            return Err(RemoteServiceError::NothingPlaying);
        }

        let playing: CurrentlyPlaying = response
            .json()
            .await
            .map_err(RemoteServiceError::FailedToParseResponse)?;
        playing.item.ok_or(RemoteServiceError::NothingPlaying)
    }

    /// Search the catalog for tracks, in Spotify's relevance order
    pub async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Vec<SpotifyTrack>, RemoteServiceError> {
        let response = self
            .client
            .get(format!("{}/search", SPOTIFY_API_URL))
            .query(&[("q", query), ("type", "track")])
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(RemoteServiceError::FailedToSendRequest)?;
        let response = Self::check(response).await?;

        let page: SearchResponse = response
            .json()
            .await
            .map_err(RemoteServiceError::FailedToParseResponse)?;
        Ok(page.tracks.items)
    }

    /// Add an item to the end of the user's playback queue
    pub async fn add_to_queue(
        &self,
        access_token: &str,
        uri: &str,
    ) -> Result<(), RemoteServiceError> {
        let response = self
            .client
            .post(format!("{}/me/player/queue", SPOTIFY_API_URL))
            .query(&[("uri", uri)])
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(RemoteServiceError::FailedToSendRequest)?;
        Self::check(response).await?;
        Ok(())
    }

    /// Skip to the next item in the user's queue
    pub async fn skip_to_next(&self, access_token: &str) -> Result<(), RemoteServiceError> {
        let response = self
            .client
            .post(format!("{}/me/player/next", SPOTIFY_API_URL))
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(RemoteServiceError::FailedToSendRequest)?;
        Self::check(response).await?;
        Ok(())
    }
}
