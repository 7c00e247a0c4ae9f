use std::sync::Arc;

use anyhow::Result;

use crate::auth::session::Session;
use crate::config::ProjectConfig;
use crate::storage_service::storage_client::StorageClient;

/// Shared handles wired once at startup. The session and client form the
/// single live pair carrying the token; everything else owns its own state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProjectConfig>,
    pub session: Arc<Session>,
    pub client: Arc<StorageClient>,
}

pub fn app_state_factory(config: ProjectConfig) -> Result<AppState> {
    let session = Arc::new(Session::new());
    let client = StorageClient::new(&config.settings.last_url, session.token_cell())?;

    Ok(AppState {
        config: Arc::new(config),
        session,
        client: Arc::new(client),
    })
}
