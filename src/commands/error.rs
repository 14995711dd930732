use crate::spotify_rs::error::RemoteServiceError;

/// Why a command could not be carried out. The `Display` form is what the
/// user sees.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No song title provided 🤬☠💣")]
    MissingSong,
    #[error("{} 😭", .0.message())]
    Remote(#[from] RemoteServiceError),
    #[error("Song not found 😭")]
    SongNotFound,
    /// The cause is logged but never shown.
    #[error("Could not skip to next song 😭")]
    SkipFailed(#[source] RemoteServiceError),
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_remote_error_shows_spotify_message() {
        let error = DispatchError::from(RemoteServiceError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: Some("The access token expired".into()),
        });
        assert_eq!(error.to_string(), "The access token expired 😭");
    }

    #[test]
    fn test_skip_failure_hides_cause() {
        let error = DispatchError::SkipFailed(RemoteServiceError::Api {
            status: StatusCode::NOT_FOUND,
            message: Some("No active device found".into()),
        });
        assert_eq!(error.to_string(), "Could not skip to next song 😭");
    }
}
