use std::sync::Arc;

use tracing::instrument;

use crate::commands::error::DispatchError;
use crate::commands::intent::{Intent, ResolvedCommand};
use crate::commands::reply::{DispatchResult, Reply, ReplyCard};
use crate::ports::spotify::PlaybackClient;

pub const SONG_SLOT: &str = "Song";

/// Routes resolved commands to the playback client. Holds no per-command state,
/// so one dispatcher serves any number of concurrent commands.
pub struct CommandDispatcher<C: PlaybackClient> {
    client: Arc<C>,
    base_url: String,
}

impl<C: PlaybackClient> CommandDispatcher<C> {
    pub fn new(client: Arc<C>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[instrument(skip_all, fields(intent = %command.intent))]
    pub async fn dispatch(&self, command: ResolvedCommand) -> DispatchResult {
        tracing::info!("⚡\t{}", command.raw);

        let outcome = match command.intent {
            Intent::Help => Ok(Reply::Text(self.help())),
            Intent::Current => self.current().await,
            Intent::Queue => self.queue(command.entity(SONG_SLOT)).await,
            Intent::Next => self.next().await,
            Intent::Unknown => Ok(Reply::Text(format!(
                "command not Found \"{}\" 🤬",
                command.raw
            ))),
        };

        match outcome {
            Ok(reply) => DispatchResult::Success(reply),
            Err(error) => {
                match &error {
                    DispatchError::SkipFailed(cause) => {
                        tracing::warn!("Failed to skip to next song: {}", cause)
                    }
                    other => tracing::warn!("Command failed: {}", other),
                }
                DispatchResult::Failure(error.to_string())
            }
        }
    }

    fn help(&self) -> String {
        format!(
            r#"
    <h1>Spotify Commands</h1>
    <a href="{base}/login">Login</a><br/>
    <a href="{base}/logout">Logout</a><br/>
    <p>Commands:<p>
    <ul>
      <li>queue <song> - Queues a song</li>
      <li>current - Shows the current song playing</li>
      <li>next - Skips to the next song</li>
    </ul>"#,
            base = self.base_url
        )
    }

    async fn current(&self) -> Result<Reply, DispatchError> {
        let track = self.client.current_track().await?;
        Ok(Reply::Card(ReplyCard::from_track("Now Playing", &track)))
    }

    async fn queue(&self, song: Option<&str>) -> Result<Reply, DispatchError> {
        let query = song.map(str::trim).unwrap_or_default();
        if query.is_empty() {
            return Err(DispatchError::MissingSong);
        }

        let tracks = self.client.search_tracks(query).await?;
        // Spotify's own ordering decides which track is queued
        let track = tracks.into_iter().next().ok_or(DispatchError::SongNotFound)?;
        tracing::debug!("Queueing {} ({})", track.title, track.uri);

        self.client.enqueue(&track.uri).await?;
        Ok(Reply::Card(ReplyCard::from_track("Added", &track)))
    }

    async fn next(&self) -> Result<Reply, DispatchError> {
        self.client
            .skip_to_next()
            .await
            .map_err(DispatchError::SkipFailed)?;
        Ok(Reply::Text("Skipped to next song 🎶".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use reqwest::StatusCode;

    use super::*;
    use crate::commands::reply::format_card;
    use crate::ports::spotify::{MockPlaybackClient, Track};
    use crate::spotify_rs::error::RemoteServiceError;

    fn dispatcher(client: MockPlaybackClient) -> CommandDispatcher<MockPlaybackClient> {
        CommandDispatcher::new(Arc::new(client), "http://localhost:3000")
    }

    fn yesterday() -> Track {
        Track {
            title: "Yesterday".into(),
            artists: vec!["The Beatles".into()],
            cover_url: Some("http://x/1.jpg".into()),
            uri: "spotify:track:1".into(),
        }
    }

    fn queue_command(song: &str) -> ResolvedCommand {
        ResolvedCommand::new(format!("queue {}", song), Intent::Queue).with_entity(SONG_SLOT, song)
    }

    fn no_device() -> RemoteServiceError {
        RemoteServiceError::Api {
            status: StatusCode::NOT_FOUND,
            message: Some("Player command failed: No active device found".into()),
        }
    }

    fn card(result: DispatchResult) -> ReplyCard {
        match result {
            DispatchResult::Success(Reply::Card(card)) => card,
            other => panic!("Expected a card, got {:?}", other),
        }
    }

    fn failure(result: DispatchResult) -> String {
        match result {
            DispatchResult::Failure(message) => message,
            other => panic!("Expected a failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_help_makes_no_remote_calls() {
        // Any call on a mock without expectations panics
        let dispatcher = dispatcher(MockPlaybackClient::new());

        let result = dispatcher
            .dispatch(ResolvedCommand::new("help", Intent::Help))
            .await;

        match result {
            DispatchResult::Success(Reply::Text(text)) => {
                assert!(text.contains(r#"<a href="http://localhost:3000/login">Login</a>"#));
                assert!(text.contains(r#"<a href="http://localhost:3000/logout">Logout</a>"#));
                assert!(text.contains("queue <song> - Queues a song"));
            }
            other => panic!("Expected help text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_queue_adds_first_search_result() {
        let mut client = MockPlaybackClient::new();
        client
            .expect_search_tracks()
            .with(eq("Yesterday"))
            .times(1)
            .returning(|_| {
                let mut other = yesterday();
                other.title = "Yesterday (Remastered)".into();
                other.uri = "spotify:track:99".into();
                Ok(vec![yesterday(), other])
            });
        client
            .expect_enqueue()
            .with(eq("spotify:track:1"))
            .times(1)
            .returning(|_| Ok(()));

        let result = dispatcher(client).dispatch(queue_command("Yesterday")).await;

        assert_eq!(
            card(result),
            ReplyCard {
                action_label: "Added".into(),
                title: "Yesterday".into(),
                artist_line: "The Beatles".into(),
                cover_url: "http://x/1.jpg".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_queue_trims_query() {
        let mut client = MockPlaybackClient::new();
        client
            .expect_search_tracks()
            .with(eq("Let It Be"))
            .returning(|_| Ok(vec![yesterday()]));
        client.expect_enqueue().returning(|_| Ok(()));

        let result = dispatcher(client).dispatch(queue_command("  Let It Be\t")).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_queue_rejects_blank_song_without_remote_calls() {
        for song in ["", "   ", "\t\n"] {
            let mut client = MockPlaybackClient::new();
            client.expect_search_tracks().times(0);
            client.expect_enqueue().times(0);

            let message = failure(dispatcher(client).dispatch(queue_command(song)).await);
            assert!(message.contains("No song title provided"));
        }
    }

    #[tokio::test]
    async fn test_queue_without_song_slot() {
        let mut client = MockPlaybackClient::new();
        client.expect_search_tracks().times(0);

        let message = failure(
            dispatcher(client)
                .dispatch(ResolvedCommand::new("queue", Intent::Queue))
                .await,
        );
        assert!(message.contains("No song title provided"));
    }

    #[tokio::test]
    async fn test_queue_song_not_found() {
        let mut client = MockPlaybackClient::new();
        client.expect_search_tracks().returning(|_| Ok(vec![]));
        client.expect_enqueue().times(0);

        let message = failure(dispatcher(client).dispatch(queue_command("zzzz")).await);
        assert_eq!(message, "Song not found 😭");
    }

    #[tokio::test]
    async fn test_queue_search_error_surfaces_message() {
        let mut client = MockPlaybackClient::new();
        client.expect_search_tracks().returning(|_| {
            Err(RemoteServiceError::Api {
                status: StatusCode::UNAUTHORIZED,
                message: Some("The access token expired".into()),
            })
        });

        let message = failure(dispatcher(client).dispatch(queue_command("Yesterday")).await);
        assert_eq!(message, "The access token expired 😭");
    }

    #[tokio::test]
    async fn test_queue_enqueue_error_surfaces_message() {
        let mut client = MockPlaybackClient::new();
        client
            .expect_search_tracks()
            .returning(|_| Ok(vec![yesterday()]));
        client.expect_enqueue().returning(|_| Err(no_device()));

        let message = failure(dispatcher(client).dispatch(queue_command("Yesterday")).await);
        assert_eq!(message, "Player command failed: No active device found 😭");
    }

    #[tokio::test]
    async fn test_current_renders_now_playing() {
        let mut client = MockPlaybackClient::new();
        client.expect_current_track().times(1).returning(|| {
            Ok(Track {
                title: "Come Together".into(),
                artists: vec!["The Beatles".into(), "Billy Preston".into()],
                cover_url: None,
                uri: "spotify:track:2".into(),
            })
        });

        let card = card(
            dispatcher(client)
                .dispatch(ResolvedCommand::new("current", Intent::Current))
                .await,
        );

        assert_eq!(card.action_label, "Now Playing");
        assert_eq!(card.artist_line, "The Beatles,Billy Preston");
        assert_eq!(card.cover_url, "");
        assert!(format_card(&card).contains("Come Together"));
    }

    #[tokio::test]
    async fn test_current_error_without_message_uses_error_text() {
        let mut client = MockPlaybackClient::new();
        client
            .expect_current_track()
            .returning(|| Err(RemoteServiceError::NothingPlaying));

        let message = failure(
            dispatcher(client)
                .dispatch(ResolvedCommand::new("current", Intent::Current))
                .await,
        );
        assert_eq!(message, "Nothing is currently playing 😭");
    }

    #[tokio::test]
    async fn test_next_success() {
        let mut client = MockPlaybackClient::new();
        client.expect_skip_to_next().times(1).returning(|| Ok(()));

        let result = dispatcher(client)
            .dispatch(ResolvedCommand::new("next", Intent::Next))
            .await;
        assert_eq!(
            result,
            DispatchResult::Success(Reply::Text("Skipped to next song 🎶".into()))
        );
    }

    #[tokio::test]
    async fn test_next_failure_hides_detail() {
        let mut client = MockPlaybackClient::new();
        client.expect_skip_to_next().returning(|| Err(no_device()));

        let message = failure(
            dispatcher(client)
                .dispatch(ResolvedCommand::new("next", Intent::Next))
                .await,
        );
        assert_eq!(message, "Could not skip to next song 😭");
    }

    #[tokio::test]
    async fn test_unknown_command_is_a_success() {
        let dispatcher = dispatcher(MockPlaybackClient::new());

        let result = dispatcher
            .dispatch(ResolvedCommand::new("play \"jazz\" loud", Intent::Unknown))
            .await;
        assert_eq!(
            result,
            DispatchResult::Success(Reply::Text(
                "command not Found \"play \"jazz\" loud\" 🤬".into()
            ))
        );
    }
}
