use std::sync::Arc;

use crate::commands::dispatcher::CommandDispatcher;
use crate::commands::intent::IntentResolver;
use crate::ports::spotify::PlaybackClient;
use crate::services::session::SessionManager;

pub struct AppState<C: PlaybackClient + 'static> {
    pub resolver: Arc<dyn IntentResolver>,
    pub dispatcher: CommandDispatcher<C>,
    pub session: SessionManager<C>,
}
