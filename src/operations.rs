use std::sync::Arc;

use log::info;

use crate::auth::session::Session;
use crate::error::ClientError;
use crate::navigator::{join_remote, Navigator};
use crate::storage_service::storage_client::StorageApi;

/// CRUD operations against the remote tree.
///
/// Each mutating operation resolves its target as `current path + name`,
/// issues exactly one API call, and refreshes the navigator on success.
/// Failures are returned once, untouched; there is no retry and no rollback
/// of partially-applied remote state.
pub struct FileOperations {
    api: Arc<dyn StorageApi>,
    session: Arc<Session>,
}

impl FileOperations {
    pub fn new(api: Arc<dyn StorageApi>, session: Arc<Session>) -> Self {
        Self { api, session }
    }

    /// Create a directory named `name` under the current path. Name
    /// uniqueness and legality are enforced server-side.
    pub async fn create_folder(&self, nav: &mut Navigator, name: &str) -> Result<(), ClientError> {
        self.session.require_login().await?;
        require_name(name)?;
        let path = join_remote(nav.current_path(), name);
        self.api.write_file(&path, None).await?;
        info!("created folder {}", path);
        nav.refresh().await
    }

    /// Create an empty file named `name` under the current path.
    pub async fn create_file(&self, nav: &mut Navigator, name: &str) -> Result<(), ClientError> {
        self.session.require_login().await?;
        require_name(name)?;
        let path = join_remote(nav.current_path(), name);
        self.api.write_file(&path, Some("")).await?;
        info!("created file {}", path);
        nav.refresh().await
    }

    /// Rename an entry of the current directory in place.
    pub async fn rename(
        &self,
        nav: &mut Navigator,
        old_name: &str,
        new_name: &str,
        is_dir: bool,
    ) -> Result<(), ClientError> {
        self.session.require_login().await?;
        require_name(old_name)?;
        require_name(new_name)?;
        if old_name == new_name {
            return Err(ClientError::InvalidName(format!(
                "`{}` is already named that",
                old_name
            )));
        }
        let path = join_remote(nav.current_path(), old_name);
        self.api.rename(&path, new_name, is_dir).await?;
        info!("renamed {} -> {}", path, new_name);
        nav.refresh().await
    }

    /// Delete an entry of the current directory. Irreversible; the caller
    /// must have obtained confirmation before invoking this.
    pub async fn delete(&self, nav: &mut Navigator, name: &str) -> Result<(), ClientError> {
        self.session.require_login().await?;
        require_name(name)?;
        let path = join_remote(nav.current_path(), name);
        self.api.delete(&path).await?;
        info!("deleted {}", path);
        nav.refresh().await
    }

    /// Fetch the content of a file in the current directory. Persisting it
    /// locally is the caller's concern; nothing is written here.
    pub async fn download_file(&self, nav: &Navigator, name: &str) -> Result<String, ClientError> {
        self.session.require_login().await?;
        require_name(name)?;
        let path = join_remote(nav.current_path(), name);
        let content = self.api.read_file(&path).await?;
        Ok(content)
    }

    /// Write content to an absolute remote path. Leaf operation of the
    /// upload traversal; deliberately does not refresh, the batch caller
    /// refreshes once at the end.
    pub async fn put_file(&self, remote_path: &str, content: &str) -> Result<(), ClientError> {
        self.session.require_login().await?;
        self.api.write_file(remote_path, Some(content)).await?;
        Ok(())
    }
}

fn require_name(name: &str) -> Result<(), ClientError> {
    if name.is_empty() {
        Err(ClientError::InvalidName("empty name".to_string()))
    } else {
        Ok(())
    }
}
