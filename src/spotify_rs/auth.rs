use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;

use crate::spotify_rs::error::RemoteServiceError;
use crate::spotify_rs::types::SpotifyTokenResponse;

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

pub const SPOTIFY_SCOPES: [&str; 19] = [
    "ugc-image-upload",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "streaming",
    "app-remote-control",
    "user-read-email",
    "user-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-read-private",
    "playlist-modify-private",
    "user-library-modify",
    "user-library-read",
    "user-top-read",
    "user-read-playback-position",
    "user-read-recently-played",
    "user-follow-read",
    "user-follow-modify",
];

/// Generate a random state parameter for CSRF protection
pub fn generate_state() -> String {
    let mut rng = rand::rng();
    (0..16)
        .map(|_| {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
            CHARSET[rng.random_range(0..CHARSET.len())] as char
        })
        .collect()
}

/// Build the URL the user is redirected to in order to grant access
pub fn authorize_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> String {
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&state={}&scope={}",
        SPOTIFY_AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(state),
        urlencoding::encode(&scopes.join(" "))
    )
}

async fn request_token(
    client: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    params: &HashMap<&str, &str>,
) -> Result<SpotifyTokenResponse, RemoteServiceError> {
    let response = client
        .post(SPOTIFY_TOKEN_URL)
        // This automatically serializes to x-www-form-urlencoded and sets the header (as required by spotify)
        .form(params)
        .basic_auth(client_id, Some(client_secret))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(RemoteServiceError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(RemoteServiceError::from_response(response).await);
    }

    response
        .json()
        .await
        .map_err(RemoteServiceError::FailedToParseResponse)
}

/// Exchange authorization code for access token
/// https://developer.spotify.com/documentation/web-api/tutorials/code-flow
pub async fn exchange_code_for_token(
    client: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    code: &str,
    // Must match the redirect URI the flow was started with
    redirect_uri: &str,
) -> Result<SpotifyTokenResponse, RemoteServiceError> {
    let mut params = HashMap::new();
    params.insert("grant_type", "authorization_code");
    params.insert("code", code);
    params.insert("redirect_uri", redirect_uri);

    request_token(client, client_id, client_secret, &params).await
}

/// Refresh an access token using a refresh token
pub async fn refresh_access_token(
    client: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<SpotifyTokenResponse, RemoteServiceError> {
    let mut params = HashMap::new();
    params.insert("grant_type", "refresh_token");
    params.insert("refresh_token", refresh_token);

    request_token(client, client_id, client_secret, &params).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state() {
        let state = generate_state();
        assert_eq!(state.len(), 16);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_authorize_url() {
        let scopes = vec![
            "user-read-playback-state".to_string(),
            "user-modify-playback-state".to_string(),
        ];
        let url = authorize_url(
            "test_client_id",
            "http://localhost:3000/callback",
            &scopes,
            "abc123",
        );

        assert!(url.starts_with(SPOTIFY_AUTH_URL));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("scope=user-read-playback-state%20user-modify-playback-state"));
    }
}
