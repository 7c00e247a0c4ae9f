use async_trait::async_trait;

use crate::auth::session::TokenCell;
use crate::error::TransportError;
use crate::storage_service::http_client::HttpClient;
use crate::storage_service::models::{
    DeleteRequest, FileContent, FileWriteRequest, LoginRequest, LoginResponse, QuotaUsage,
    RemoteEntry, RenameRequest,
};

/// Typed surface of the remote storage API.
///
/// The navigator, file operations and quota poller depend on this trait, not
/// the concrete client, so tests can swap in an in-memory mock.
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Exchange credentials for a token. The only unauthenticated call.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, TransportError>;

    /// List the entries of a remote directory, in server order.
    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteEntry>, TransportError>;

    /// Fetch the text content of a remote file.
    async fn read_file(&self, path: &str) -> Result<String, TransportError>;

    /// Write a file (`Some(content)`) or create a directory (`None`).
    /// Intermediate path segments are created server-side from the path.
    async fn write_file(&self, path: &str, content: Option<&str>) -> Result<(), TransportError>;

    /// Rename the entry at `path` in place.
    async fn rename(&self, path: &str, new_name: &str, is_dir: bool) -> Result<(), TransportError>;

    /// Delete the entry at `path`. Irreversible; confirmation is the
    /// caller's responsibility.
    async fn delete(&self, path: &str) -> Result<(), TransportError>;

    /// Current usage and limit for a user.
    async fn quota(&self, username: &str) -> Result<QuotaUsage, TransportError>;
}

/// API client for the storage server.
///
/// Reads the shared token cell on every call; the session layer is the only
/// writer, so a logout is picked up by the next request without re-wiring.
pub struct StorageClient {
    http: HttpClient,
    token: TokenCell,
}

impl StorageClient {
    pub fn new(server_url: &str, token: TokenCell) -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpClient::new(server_url)?,
            token,
        })
    }

    /// Authorization header value, when a token is held.
    async fn auth_header(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }
}

#[async_trait]
impl StorageApi for StorageClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, TransportError> {
        let body = LoginRequest { username, password };
        self.http.post("/api/login", &body, None).await
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteEntry>, TransportError> {
        let auth = self.auth_header().await;
        let url = format!("/api/files?path={}", urlencoding::encode(path));
        self.http.get(&url, auth.as_deref()).await
    }

    async fn read_file(&self, path: &str) -> Result<String, TransportError> {
        let auth = self.auth_header().await;
        let url = format!("/api/file?path={}", urlencoding::encode(path));
        let payload: FileContent = self.http.get(&url, auth.as_deref()).await?;
        Ok(payload.content)
    }

    async fn write_file(&self, path: &str, content: Option<&str>) -> Result<(), TransportError> {
        let auth = self.auth_header().await;
        let body = FileWriteRequest { path, content };
        // Ack shape is implementation-defined; parse and discard.
        let _ack: serde_json::Value = self.http.post("/api/file", &body, auth.as_deref()).await?;
        Ok(())
    }

    async fn rename(&self, path: &str, new_name: &str, is_dir: bool) -> Result<(), TransportError> {
        let auth = self.auth_header().await;
        let body = RenameRequest { path, new_name, is_dir };
        let _ack: serde_json::Value = self.http.post("/api/file", &body, auth.as_deref()).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), TransportError> {
        let auth = self.auth_header().await;
        let body = DeleteRequest { path };
        let _ack: serde_json::Value = self.http.delete("/api/file", &body, auth.as_deref()).await?;
        Ok(())
    }

    async fn quota(&self, username: &str) -> Result<QuotaUsage, TransportError> {
        let auth = self.auth_header().await;
        let url = format!("/api/limit/{}", urlencoding::encode(username));
        self.http.get(&url, auth.as_deref()).await
    }
}
