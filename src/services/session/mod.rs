use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::ports::spotify::PlaybackClient;
use crate::spotify_rs::auth::generate_state;
use crate::spotify_rs::error::RemoteServiceError;
use crate::spotify_rs::types::SpotifyTokenResponse;

pub mod credentials;

use credentials::Credentials;

/// How the refresh interval is chosen after each refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshSchedule {
    /// Half of the expiry reported at login, for the whole session.
    #[default]
    Fixed,
    /// Half of the expiry reported by the most recent refresh.
    FromExpiry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authorizing { csrf_state: String },
    Authorized,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No login is waiting for a callback")]
    NotAuthorizing,
    #[error("Authorization state does not match the pending login")]
    StateMismatch,
    #[error("Login was cancelled before the tokens arrived")]
    Cancelled,
    #[error("{}", .0.message())]
    Exchange(RemoteServiceError),
    #[error("{}", .0.message())]
    Refresh(RemoteServiceError),
    #[error("No refresh token available")]
    MissingRefreshToken,
}

struct SessionInner {
    state: SessionState,
    /// CSRF state of the login that produced the current tokens
    authorized_with: Option<String>,
    /// Bumped by every new login and logout so an in-flight exchange can tell
    /// it was overtaken.
    generation: u64,
    refresh_task: Option<JoinHandle<()>>,
}

/// Owns the login lifecycle and the background token refresh.
pub struct SessionManager<C: PlaybackClient + 'static> {
    client: Arc<C>,
    schedule: RefreshSchedule,
    inner: Mutex<SessionInner>,
}

fn refresh_interval(expires_in: u64) -> Duration {
    Duration::from_secs((expires_in / 2).max(1))
}

impl<C: PlaybackClient + 'static> SessionManager<C> {
    pub fn new(client: Arc<C>, schedule: RefreshSchedule) -> Self {
        Self {
            client,
            schedule,
            inner: Mutex::new(SessionInner {
                state: SessionState::LoggedOut,
                authorized_with: None,
                generation: 0,
                refresh_task: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Start a login and return the URL the user has to visit.
    #[instrument(skip(self))]
    pub fn begin_authorization(&self) -> String {
        let csrf_state = generate_state();
        let url = self.client.authorize_url(&csrf_state);
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = SessionState::Authorizing { csrf_state };
        tracing::info!("Starting spotify authorization");
        url
    }

    /// Finish a login with the code handed to the OAuth callback.
    ///
    /// `csrf_state` must match the pending login. Once authorized, a repeated
    /// delivery of the same callback is accepted and re-arms the refresh timer.
    #[instrument(skip(self, code))]
    pub async fn complete_authorization(
        &self,
        code: &str,
        csrf_state: Option<&str>,
    ) -> Result<Credentials, SessionError> {
        let (expected, generation) = {
            let inner = self.lock();
            let expected = match (&inner.state, &inner.authorized_with) {
                (SessionState::Authorizing { csrf_state }, _) => csrf_state.clone(),
                (SessionState::Authorized, Some(csrf_state)) => csrf_state.clone(),
                _ => {
                    tracing::warn!("Callback arrived without a pending login");
                    return Err(SessionError::NotAuthorizing);
                }
            };
            (expected, inner.generation)
        };
        if csrf_state != Some(expected.as_str()) {
            tracing::warn!("Callback state does not match the pending login");
            return Err(SessionError::StateMismatch);
        }

        let token = self.client.exchange_code(code).await.map_err(|error| {
            tracing::error!("Error getting Tokens: {}", error);
            SessionError::Exchange(error)
        })?;

        let credentials = Credentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token.unwrap_or_default(),
            expires_in_seconds: token.expires_in,
        };

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::warn!("Discarding tokens from a login that was logged out or restarted");
            return Err(SessionError::Cancelled);
        }

        self.client.set_access_token(credentials.access_token.clone());
        self.client.set_refresh_token(credentials.refresh_token.clone());
        tracing::info!(
            "Sucessfully retrieved access token. Expires in {} s.",
            credentials.expires_in_seconds
        );

        // A repeated callback must not leave two timers running
        if let Some(previous) = inner.refresh_task.take() {
            previous.abort();
        }
        inner.refresh_task = Some(spawn_refresh_task(
            self.client.clone(),
            self.schedule,
            refresh_interval(credentials.expires_in_seconds),
        ));
        inner.state = SessionState::Authorized;
        inner.authorized_with = Some(expected);

        Ok(credentials)
    }

    /// Forget the tokens and stop refreshing.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        let mut inner = self.lock();
        if let Some(task) = inner.refresh_task.take() {
            task.abort();
        }
        inner.generation += 1;
        inner.state = SessionState::LoggedOut;
        inner.authorized_with = None;
        self.client.set_access_token(String::new());
        self.client.set_refresh_token(String::new());
        tracing::info!("Logged out of spotify");
    }
}

impl<C: PlaybackClient + 'static> Drop for SessionManager<C> {
    fn drop(&mut self) {
        if let Some(task) = self.lock().refresh_task.take() {
            task.abort();
        }
    }
}

/// One refresh tick: swap in a fresh access token.
async fn refresh_tokens<C: PlaybackClient>(
    client: &C,
) -> Result<SpotifyTokenResponse, SessionError> {
    client.refresh_access_token().await.map_err(|error| match error {
        RemoteServiceError::MissingRefreshToken => SessionError::MissingRefreshToken,
        other => SessionError::Refresh(other),
    })
}

fn spawn_refresh_task<C: PlaybackClient + 'static>(
    client: Arc<C>,
    schedule: RefreshSchedule,
    initial_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = initial_interval;
        tracing::debug!("Refreshing access token every {:?}", interval);
        loop {
            tokio::time::sleep(interval).await;
            match refresh_tokens(client.as_ref()).await {
                Ok(token) => {
                    tracing::info!("The access token has been refreshed!");
                    if schedule == RefreshSchedule::FromExpiry {
                        interval = refresh_interval(token.expires_in);
                        tracing::debug!("Next refresh in {:?}", interval);
                    }
                }
                Err(e) => {
                    // Keep the stale token and try again on the next tick
                    tracing::error!("Failed to refresh access token: {}", e);
                }
            }
        }
    })
}
