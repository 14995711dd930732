use crate::spotify_rs::error::RemoteServiceError;
use crate::spotify_rs::types::SpotifyTokenResponse;

/// Decoupled representation of a Spotify track from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artists: Vec<String>,
    pub cover_url: Option<String>,
    pub uri: String,
}

/// Port trait wrapping the Spotify playback capabilities used by the command dispatcher
/// and the session manager.
///
/// Implementations live in `services::spotify::client` (production) or test mocks.
/// Errors are surfaced as-is; no retries happen behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaybackClient: Send + Sync {
    async fn current_track(&self) -> Result<Track, RemoteServiceError>;

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, RemoteServiceError>;

    async fn enqueue(&self, track_uri: &str) -> Result<(), RemoteServiceError>;

    async fn skip_to_next(&self) -> Result<(), RemoteServiceError>;

    fn set_access_token(&self, token: String);

    fn set_refresh_token(&self, token: String);

    /// Trade the stored refresh token for a new access token and store it.
    async fn refresh_access_token(&self) -> Result<SpotifyTokenResponse, RemoteServiceError>;

    /// Trade an authorization code for a token pair. Does not store anything.
    async fn exchange_code(&self, code: &str) -> Result<SpotifyTokenResponse, RemoteServiceError>;

    fn authorize_url(&self, csrf_state: &str) -> String;
}
