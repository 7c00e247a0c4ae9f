use std::sync::Arc;

use log::debug;

use crate::auth::session::Session;
use crate::error::ClientError;
use crate::storage_service::models::RemoteEntry;
use crate::storage_service::storage_client::StorageApi;

/// Tracks the client's position in the remote tree and the last-fetched
/// listing for it.
///
/// The path is `/`-separated and never starts or ends with a slash; the root
/// is the empty string. The listing is replaced wholesale on every refresh
/// and kept in whatever order the server returned it.
pub struct Navigator {
    api: Arc<dyn StorageApi>,
    session: Arc<Session>,
    current_path: String,
    listing: Vec<RemoteEntry>,
}

impl Navigator {
    pub fn new(api: Arc<dyn StorageApi>, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            current_path: String::new(),
            listing: Vec::new(),
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn listing(&self) -> &[RemoteEntry] {
        &self.listing
    }

    /// Look up an entry of the current listing by name.
    pub fn entry(&self, name: &str) -> Option<&RemoteEntry> {
        self.listing.iter().find(|entry| entry.name == name)
    }

    /// Re-fetch the listing for the current path. On failure the previous
    /// listing is left in place and the error is returned.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.session.require_login().await?;
        let listing = self.api.list_directory(&self.current_path).await?;
        debug!("listed {} ({} entries)", display_path(&self.current_path), listing.len());
        self.listing = listing;
        Ok(())
    }

    /// Descend into a directory of the current listing, then refresh.
    ///
    /// Calling this with a name that is absent from the listing, or names a
    /// file, is a precondition failure and leaves the path untouched.
    pub async fn enter(&mut self, name: &str) -> Result<(), ClientError> {
        self.session.require_login().await?;
        let entry = self
            .entry(name)
            .ok_or_else(|| ClientError::UnknownEntry(name.to_string()))?;
        if !entry.is_dir {
            return Err(ClientError::NotADirectory(name.to_string()));
        }
        self.current_path = join_remote(&self.current_path, name);
        self.refresh().await
    }

    /// Move to the parent directory, then refresh. At the root this is a
    /// no-op and no request is issued.
    pub async fn up(&mut self) -> Result<(), ClientError> {
        self.session.require_login().await?;
        if self.current_path.is_empty() {
            return Ok(());
        }
        self.current_path = parent_path(&self.current_path);
        self.refresh().await
    }

    /// Drop back to the root without fetching. Used right after login.
    pub fn reset(&mut self) {
        self.current_path.clear();
        self.listing.clear();
    }
}

/// Join a remote prefix and a relative name. The result never starts or ends
/// with `/`; joining onto the root yields the bare name.
pub fn join_remote(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn parent_path(path: &str) -> String {
    match path.rfind('/') {
        Some(index) => path[..index].to_string(),
        None => String::new(),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
