use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::http_server::state::AppState;
use crate::ports::spotify::PlaybackClient;
use crate::services::session::SessionError;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn login<C: PlaybackClient + 'static>(
    State(app_state): State<Arc<AppState<C>>>,
) -> Redirect {
    Redirect::to(&app_state.session.begin_authorization())
}

pub async fn callback<C: PlaybackClient + 'static>(
    State(app_state): State<Arc<AppState<C>>>,
    Query(params): Query<CallbackParams>,
) -> String {
    if let Some(error) = params.error {
        tracing::error!("Callback Error: {}", error);
        return format!("Callback Error: {}", error);
    }

    let Some(code) = params.code else {
        tracing::error!("Callback Error: no authorization code");
        return "Callback Error: no authorization code".to_string();
    };

    match app_state
        .session
        .complete_authorization(&code, params.state.as_deref())
        .await
    {
        Ok(_) => "Success! You can now close the window.".to_string(),
        Err(e @ SessionError::Exchange(_)) => format!("Error getting Tokens: {}", e),
        Err(e) => format!("Callback Error: {}", e),
    }
}

pub async fn logout<C: PlaybackClient + 'static>(
    State(app_state): State<Arc<AppState<C>>>,
) -> &'static str {
    app_state.session.logout();
    "Logged out"
}
