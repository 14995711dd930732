use reqwest::StatusCode;

use crate::spotify_rs::types::SpotifyErrorBody;

/// A failed call against the Spotify Web API or accounts service.
///
/// The structured message (if Spotify sent one) is resolved once, when the
/// response is read, so callers never have to dig into response bodies.
#[derive(Debug, thiserror::Error)]
pub enum RemoteServiceError {
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
    #[error("Spotify responded with {status}")]
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("Nothing is currently playing")]
    NothingPlaying,
    #[error("No refresh token available")]
    MissingRefreshToken,
}

impl RemoteServiceError {
    /// The human readable message Spotify attached to the error, falling back to
    /// the error's own string form.
    pub fn message(&self) -> String {
        match self {
            RemoteServiceError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Turn a non-success response into an error, reading the error body if it
    /// is one of Spotify's error envelopes. Any other body (gateway pages and
    /// the like) is dropped so `message()` falls back to the status.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let message = match response.text().await {
            Ok(text) => match serde_json::from_str::<SpotifyErrorBody>(&text) {
                Ok(body) => body.message(),
                Err(_) => {
                    tracing::debug!("Unstructured spotify error body ({}): {}", status, text);
                    None
                }
            },
            Err(error) => {
                tracing::warn!("Failed to read spotify error body: {}", error);
                None
            }
        };

        RemoteServiceError::Api { status, message }
    }
}
