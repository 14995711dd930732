use std::sync::Arc;

use axum::{Json, extract::State, response::Html};
use serde::Deserialize;

use crate::http_server::state::AppState;
use crate::ports::spotify::PlaybackClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub plain_text_content: String,
}

/// Run one chat command. Failures are answered with their message and a 200,
/// same as successes.
pub async fn submit_command<C: PlaybackClient + 'static>(
    State(app_state): State<Arc<AppState<C>>>,
    Json(request): Json<CommandRequest>,
) -> Html<String> {
    let command = app_state
        .resolver
        .resolve(&request.plain_text_content)
        .await;
    let result = app_state.dispatcher.dispatch(command).await;
    tracing::debug!(success = result.is_success(), "Command handled");
    Html(result.render())
}
