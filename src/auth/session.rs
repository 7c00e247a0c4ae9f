use std::sync::Arc;

use log::info;
use tokio::sync::RwLock;

use crate::error::ClientError;
use crate::storage_service::storage_client::StorageApi;

/// Authentication lifecycle of the client. The cycle repeats; there is no
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    Authenticating,
    LoggedIn,
}

/// Shared bearer token cell. Written only by [`Session`], read by the
/// storage client when building the `Authorization` header.
pub type TokenCell = Arc<RwLock<Option<String>>>;

#[derive(Debug, Default)]
struct SessionInner {
    state: SessionState,
    role: Option<String>,
    username: Option<String>,
}

/// Holds the authenticated identity for the duration of a login.
///
/// Created empty, populated by [`Session::login`], cleared by
/// [`Session::logout`] or on a server-address change. Every authenticated
/// component must pass [`Session::require_login`] before touching the API.
pub struct Session {
    inner: RwLock<SessionInner>,
    token: TokenCell,
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionInner::default()),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Handle to the token cell, for wiring into the storage client.
    pub fn token_cell(&self) -> TokenCell {
        self.token.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state().await == SessionState::LoggedIn
    }

    pub async fn role(&self) -> Option<String> {
        self.inner.read().await.role.clone()
    }

    /// Username of the logged-in user; `None` while logged out. This is the
    /// source the quota poller reads, not any display string.
    pub async fn username(&self) -> Option<String> {
        self.inner.read().await.username.clone()
    }

    /// Precondition gate for authenticated operations.
    pub async fn require_login(&self) -> Result<(), ClientError> {
        if self.is_logged_in().await {
            Ok(())
        } else {
            Err(ClientError::NotLoggedIn)
        }
    }

    /// Exchange credentials for a token.
    ///
    /// On any failure, including a 200 response that carries no token, the
    /// session returns to `LoggedOut` with nothing stored and the error is
    /// handed back for the caller's retry policy.
    pub async fn login(
        &self,
        api: &dyn StorageApi,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.inner.write().await.state = SessionState::Authenticating;

        let response = match api.login(username, password).await {
            Ok(response) => response,
            Err(e) => {
                self.clear().await;
                return Err(e.into());
            }
        };

        let Some(token) = response.token else {
            self.clear().await;
            return Err(ClientError::MissingToken);
        };

        *self.token.write().await = Some(token);
        let mut inner = self.inner.write().await;
        inner.state = SessionState::LoggedIn;
        inner.role = response.role;
        inner.username = Some(username.to_string());
        info!(
            "✅ Logged in as {} ({})",
            username,
            inner.role.as_deref().unwrap_or("unknown role")
        );
        Ok(())
    }

    /// Unconditionally drop the token and identity. Also used when the
    /// server address changes, since the token is only valid for the address
    /// that issued it.
    pub async fn logout(&self) {
        self.clear().await;
        info!("Logged out");
    }

    async fn clear(&self) {
        *self.token.write().await = None;
        let mut inner = self.inner.write().await;
        *inner = SessionInner::default();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
