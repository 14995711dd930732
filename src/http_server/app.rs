use std::sync::Arc;

use axum::{Router, routing::get};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    commands::{dispatcher::CommandDispatcher, intent::PatternResolver},
    config::CommandPattern,
    http_server::{
        http_routes::{auth, command},
        state::AppState,
    },
    ports::spotify::PlaybackClient,
    services::{
        session::{RefreshSchedule, SessionManager, credentials::CredentialStore},
        spotify::client::{SpotifyApiCredentials, SpotifyPlaybackAdapter},
    },
};

pub struct HttpServerConfig {
    pub port: u16,
    pub base_url: String,
    pub credentials: SpotifyApiCredentials,
    pub refresh_schedule: RefreshSchedule,
    pub commands: Vec<CommandPattern>,
}

async fn root() -> &'static str {
    "Hello World!"
}

pub fn router<C: PlaybackClient + 'static>(app_state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/", get(root).post(command::submit_command::<C>))
        .route("/login", get(auth::login::<C>))
        .route("/logout", get(auth::logout::<C>))
        .route("/callback", get(auth::callback::<C>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let store = Arc::new(CredentialStore::new());
    let client = Arc::new(SpotifyPlaybackAdapter::new(config.credentials, store));
    let resolver = PatternResolver::with_patterns(&config.commands)
        .wrap_err("Failed to build command patterns")?;

    let app_state = Arc::new(AppState {
        resolver: Arc::new(resolver),
        dispatcher: CommandDispatcher::new(client.clone(), config.base_url.clone()),
        session: SessionManager::new(client, config.refresh_schedule),
    });

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", config.port))?;
    tracing::info!(
        "Listening on port {}, login at {}/login",
        config.port,
        config.base_url
    );
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
