//! Shared test fixtures: an in-memory stand-in for the remote storage API.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ftpweb_client::error::TransportError;
use ftpweb_client::storage_service::models::{LoginResponse, QuotaUsage, RemoteEntry};
use ftpweb_client::storage_service::storage_client::StorageApi;

pub const TEST_USER: &str = "alice";
pub const TEST_PASSWORD: &str = "secret";

/// In-memory remote tree. Paths map to `Some(content)` for files and `None`
/// for explicit directories; writes create intermediate directories
/// implicitly from the path string, like the real server.
#[derive(Default)]
pub struct MockStorageApi {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    tree: BTreeMap<String, Option<String>>,
    users: BTreeMap<String, String>,
    fail_writes: Vec<String>,
    fail_listings: bool,
    omit_token: bool,
    quota: Option<(f64, f64)>,
    calls: Vec<String>,
}

impl MockStorageApi {
    pub fn new() -> Self {
        Self::default().with_user(TEST_USER, TEST_PASSWORD)
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tree
            .insert(path.to_string(), Some(content.to_string()));
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.state.lock().unwrap().tree.insert(path.to_string(), None);
        self
    }

    pub fn with_quota(self, used_gb: f64, limit_gb: f64) -> Self {
        self.state.lock().unwrap().quota = Some((used_gb, limit_gb));
        self
    }

    /// Answer subsequent logins with 200 but no token.
    pub fn omit_login_token(self) -> Self {
        self.state.lock().unwrap().omit_token = true;
        self
    }

    /// Make subsequent quota fetches fail with a 404.
    pub fn clear_quota(&self) {
        self.state.lock().unwrap().quota = None;
    }

    /// Make writes to `path` fail with a 403.
    pub fn deny_write(&self, path: &str) {
        self.state.lock().unwrap().fail_writes.push(path.to_string());
    }

    /// Make every listing fail with a 500.
    pub fn fail_listings(&self) {
        self.state.lock().unwrap().fail_listings = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn has_file(&self, path: &str) -> bool {
        matches!(self.state.lock().unwrap().tree.get(path), Some(Some(_)))
    }

    pub fn file_content(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().tree.get(path).cloned().flatten()
    }
}

impl MockState {
    fn directory_exists(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        if let Some(None) = self.tree.get(path) {
            return true;
        }
        let prefix = format!("{}/", path);
        self.tree.keys().any(|key| key.starts_with(&prefix))
    }

    fn list_children(&self, path: &str) -> Vec<RemoteEntry> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        let mut entries: Vec<RemoteEntry> = Vec::new();
        for (key, value) in &self.tree {
            let Some(rest) = key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let (name, is_dir) = match rest.split_once('/') {
                Some((name, _)) => (name, true),
                None => (rest, value.is_none()),
            };
            if let Some(existing) = entries.iter_mut().find(|entry| entry.name == name) {
                existing.is_dir |= is_dir;
            } else {
                entries.push(RemoteEntry {
                    name: name.to_string(),
                    is_dir,
                    size: None,
                });
            }
        }
        entries
    }
}

fn api_error(status: u16, body: &str) -> TransportError {
    TransportError::Api {
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl StorageApi for MockStorageApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("login {}", username));
        if state.users.get(username).map(String::as_str) != Some(password) {
            return Err(api_error(401, r#"{"error":"Invalid credentials"}"#));
        }
        let token = if state.omit_token {
            None
        } else {
            Some(format!("mock-token-{}", username))
        };
        Ok(LoginResponse {
            token,
            role: Some("user".to_string()),
        })
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteEntry>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list {}", path));
        if state.fail_listings {
            return Err(api_error(500, "listing unavailable"));
        }
        if !state.directory_exists(path) {
            return Err(api_error(400, r#"{"error":"Cannot read directory"}"#));
        }
        Ok(state.list_children(path))
    }

    async fn read_file(&self, path: &str) -> Result<String, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("read {}", path));
        match state.tree.get(path) {
            Some(Some(content)) => Ok(content.clone()),
            _ => Err(api_error(400, r#"{"error":"Cannot read file"}"#)),
        }
    }

    async fn write_file(&self, path: &str, content: Option<&str>) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("write {}", path));
        if state.fail_writes.iter().any(|denied| denied == path) {
            return Err(api_error(403, r#"{"error":"Uploading disabled"}"#));
        }
        state
            .tree
            .insert(path.to_string(), content.map(str::to_string));
        Ok(())
    }

    async fn rename(&self, path: &str, new_name: &str, _is_dir: bool) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("rename {} -> {}", path, new_name));
        let new_path = match path.rsplit_once('/') {
            Some((parent, _)) => format!("{}/{}", parent, new_name),
            None => new_name.to_string(),
        };
        let prefix = format!("{}/", path);
        let moved: Vec<(String, Option<String>)> = state
            .tree
            .iter()
            .filter(|(key, _)| key.as_str() == path || key.starts_with(&prefix))
            .map(|(key, value)| (key.replacen(path, &new_path, 1), value.clone()))
            .collect();
        if moved.is_empty() {
            return Err(api_error(400, r#"{"error":"Cannot rename"}"#));
        }
        state
            .tree
            .retain(|key, _| key != path && !key.starts_with(&prefix));
        state.tree.extend(moved);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {}", path));
        let prefix = format!("{}/", path);
        let before = state.tree.len();
        state
            .tree
            .retain(|key, _| key != path && !key.starts_with(&prefix));
        if state.tree.len() == before {
            return Err(api_error(400, r#"{"error":"Cannot delete"}"#));
        }
        Ok(())
    }

    async fn quota(&self, username: &str) -> Result<QuotaUsage, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("quota {}", username));
        match state.quota {
            Some((used_gb, limit_gb)) => Ok(QuotaUsage {
                used_gb,
                limit_gb: Some(limit_gb),
            }),
            None => Err(api_error(404, r#"{"error":"User not found"}"#)),
        }
    }
}
