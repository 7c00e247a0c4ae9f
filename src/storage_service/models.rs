use serde::{Deserialize, Serialize};

/// One entry of a remote directory listing.
///
/// A snapshot, not a handle: operations re-resolve the target by
/// (current path, name) at call time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteEntry {
    pub name: String,
    #[serde(rename = "isDir")]
    pub is_dir: bool,
    /// Server-supplied size in bytes, when the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Credentials for `POST /api/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login payload. The server may answer 200 without a token; the
/// session layer treats that as a rejected login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub role: Option<String>,
}

/// Body for `POST /api/file` when creating or writing.
///
/// `content: None` serializes to JSON `null`, which the server interprets as
/// directory creation; `Some("")` creates an empty file.
#[derive(Debug, Serialize)]
pub struct FileWriteRequest<'a> {
    pub path: &'a str,
    pub content: Option<&'a str>,
}

/// Body for `POST /api/file` when renaming.
#[derive(Debug, Serialize)]
pub struct RenameRequest<'a> {
    pub path: &'a str,
    #[serde(rename = "newName")]
    pub new_name: &'a str,
    #[serde(rename = "isDir")]
    pub is_dir: bool,
}

/// Body for `DELETE /api/file`.
#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub path: &'a str,
}

/// Payload of `GET /api/file`.
#[derive(Debug, Deserialize)]
pub struct FileContent {
    pub content: String,
}

/// Payload of `GET /api/limit/<username>`.
///
/// `limitGB` is absent or null for unlimited accounts; the quota snapshot
/// treats that the same as a zero limit.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuotaUsage {
    #[serde(rename = "usedGB", default)]
    pub used_gb: f64,
    #[serde(rename = "limitGB", default)]
    pub limit_gb: Option<f64>,
}
