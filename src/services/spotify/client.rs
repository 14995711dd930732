use std::sync::Arc;

use crate::ports::spotify::{PlaybackClient, Track};
use crate::services::session::credentials::CredentialStore;
use crate::spotify_rs::auth;
use crate::spotify_rs::client::SpotifyClient;
use crate::spotify_rs::error::RemoteServiceError;
use crate::spotify_rs::types::{SpotifyTokenResponse, SpotifyTrack};

#[derive(Debug, Clone)]
pub struct SpotifyApiCredentials {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl SpotifyApiCredentials {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

impl From<SpotifyTrack> for Track {
    fn from(track: SpotifyTrack) -> Self {
        Track {
            title: track.name,
            artists: track.artists.into_iter().map(|artist| artist.name).collect(),
            cover_url: track.album.images.into_iter().next().map(|image| image.url),
            uri: track.uri,
        }
    }
}

/// Production `PlaybackClient` backed by the Spotify Web API.
pub struct SpotifyPlaybackAdapter {
    api: SpotifyClient,
    http: reqwest::Client,
    credentials: SpotifyApiCredentials,
    store: Arc<CredentialStore>,
}

impl SpotifyPlaybackAdapter {
    pub fn new(credentials: SpotifyApiCredentials, store: Arc<CredentialStore>) -> Self {
        let http = reqwest::Client::new();
        Self {
            api: SpotifyClient::new(http.clone()),
            http,
            credentials,
            store,
        }
    }
}

#[async_trait::async_trait]
impl PlaybackClient for SpotifyPlaybackAdapter {
    async fn current_track(&self) -> Result<Track, RemoteServiceError> {
        let track = self
            .api
            .get_currently_playing(&self.store.access_token())
            .await?;
        Ok(track.into())
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, RemoteServiceError> {
        let tracks = self
            .api
            .search_tracks(&self.store.access_token(), query)
            .await?;
        Ok(tracks.into_iter().map(Track::from).collect())
    }

    async fn enqueue(&self, track_uri: &str) -> Result<(), RemoteServiceError> {
        self.api
            .add_to_queue(&self.store.access_token(), track_uri)
            .await
    }

    async fn skip_to_next(&self) -> Result<(), RemoteServiceError> {
        self.api.skip_to_next(&self.store.access_token()).await
    }

    fn set_access_token(&self, token: String) {
        self.store.set_access_token(token);
    }

    fn set_refresh_token(&self, token: String) {
        self.store.set_refresh_token(token);
    }

    async fn refresh_access_token(&self) -> Result<SpotifyTokenResponse, RemoteServiceError> {
        let refresh_token = self.store.refresh_token();
        if refresh_token.is_empty() {
            return Err(RemoteServiceError::MissingRefreshToken);
        }

        let token = auth::refresh_access_token(
            &self.http,
            &self.credentials.client_id,
            &self.credentials.client_secret,
            &refresh_token,
        )
        .await?;

        self.store.set_access_token(token.access_token.clone());
        self.store.set_expires_in(token.expires_in);
        // Spotify may rotate the refresh token
        if let Some(refresh_token) = &token.refresh_token {
            self.store.set_refresh_token(refresh_token.clone());
        }

        Ok(token)
    }

    async fn exchange_code(&self, code: &str) -> Result<SpotifyTokenResponse, RemoteServiceError> {
        auth::exchange_code_for_token(
            &self.http,
            &self.credentials.client_id,
            &self.credentials.client_secret,
            code,
            &self.credentials.redirect_uri,
        )
        .await
    }

    fn authorize_url(&self, csrf_state: &str) -> String {
        auth::authorize_url(
            &self.credentials.client_id,
            &self.credentials.redirect_uri,
            &self.credentials.scopes,
            csrf_state,
        )
    }
}
