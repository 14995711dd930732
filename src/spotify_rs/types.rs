use serde::{Deserialize, Serialize};

/// Spotify OAuth token response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    /// Only present on the authorization code grant, and sometimes on refresh
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

/// Spotify track from API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    pub uri: String,
    pub artists: Vec<SpotifyArtist>,
    pub album: SpotifyAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

/// `GET /me/player/currently-playing`
///
/// `item` is null for ads and while switching tracks.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentlyPlaying {
    pub item: Option<SpotifyTrack>,
}

/// `GET /search?type=track`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracksPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracksPage {
    pub items: Vec<SpotifyTrack>,
}

/// Error envelope returned by the Web API and the accounts service.
///
/// The Web API nests the message (`{"error": {"status": 401, "message": ".."}}`),
/// the accounts service does not (`{"error": "invalid_grant", "error_description": ".."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyErrorBody {
    pub error: SpotifyErrorDetail,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SpotifyErrorDetail {
    // The nested `status` repeats the HTTP status and is not read
    Regular { message: Option<String> },
    Code(String),
}

impl SpotifyErrorBody {
    /// The human readable message, if the body carried one.
    pub fn message(&self) -> Option<String> {
        match &self.error {
            SpotifyErrorDetail::Regular { message } => message.clone(),
            SpotifyErrorDetail::Code(code) => Some(
                self.error_description
                    .clone()
                    .unwrap_or_else(|| code.clone()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_error_message() {
        let body: SpotifyErrorBody = serde_json::from_str(
            r#"{"error":{"status":404,"message":"Player command failed: No active device found"}}"#,
        )
        .unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some("Player command failed: No active device found")
        );
    }

    #[test]
    fn test_regular_error_without_message() {
        let body: SpotifyErrorBody = serde_json::from_str(r#"{"error":{"status":500}}"#).unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn test_auth_error_message() {
        let body: SpotifyErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
        )
        .unwrap();
        assert_eq!(body.message().as_deref(), Some("Invalid authorization code"));
    }

    #[test]
    fn test_search_response_without_images() {
        let page: SearchResponse = serde_json::from_str(
            r#"{"tracks":{"items":[{"name":"Yesterday","uri":"spotify:track:1",
                "artists":[{"name":"The Beatles"}],"album":{"name":"Help!"}}]}}"#,
        )
        .unwrap();
        assert_eq!(page.tracks.items.len(), 1);
        assert!(page.tracks.items[0].album.images.is_empty());
    }
}
