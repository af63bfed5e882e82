//! On-disk storage of item images
//!
//! Layout: `<root>/<username>/<item name>/<file name>`. Every variable
//! segment must be a single plain path component, so neither a username nor
//! an item name can point the cleanup worker outside the root.

use crate::error::ApiError;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

fn plain_component(segment: &str) -> Option<&str> {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !segment.contains(['/', '\\']) => Some(segment),
        _ => None,
    }
}

impl ImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the images of one item
    pub fn item_dir(&self, username: &str, item_name: &str) -> Result<PathBuf, ApiError> {
        let username = plain_component(username)
            .ok_or_else(|| ApiError::Validation("Invalid username for storage".to_string()))?;
        let item_name = plain_component(item_name)
            .ok_or_else(|| ApiError::Validation("Invalid item name for storage".to_string()))?;
        Ok(self.root.join(username).join(item_name))
    }

    /// Write an uploaded image and return the stored file name
    ///
    /// Only the final component of the client-supplied file name is kept.
    pub async fn save(
        &self,
        username: &str,
        item_name: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<String, ApiError> {
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(plain_component)
            .ok_or_else(|| ApiError::Validation("Invalid image file name".to_string()))?
            .to_string();

        let dir = self.item_dir(username, item_name)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to create {}: {}", dir.display(), e)))?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), bytes = content.len(), "Stored item image");
        Ok(file_name)
    }

    /// Remove an image written for an item that never made it into the
    /// database, then its directory if that left it empty
    ///
    /// Failures are logged and swallowed.
    pub async fn discard(&self, username: &str, item_name: &str, file_name: &str) {
        let Ok(dir) = self.item_dir(username, item_name) else {
            return;
        };
        let path = dir.join(file_name);

        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to discard item image");
            }
        }
        // Fails while another upload still lives in the directory
        if tokio::fs::remove_dir(&dir).await.is_ok() {
            debug!(dir = %dir.display(), "Removed empty item directory");
        }
    }

    /// Move an item's image directory after the item was renamed
    ///
    /// An item without a directory is not an error.
    pub async fn rename_item(&self, username: &str, from: &str, to: &str) -> Result<(), ApiError> {
        let source = self.item_dir(username, from)?;
        let target = self.item_dir(username, to)?;

        match tokio::fs::rename(&source, &target).await {
            Ok(()) => {
                debug!(from = %source.display(), to = %target.display(), "Moved item images");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Internal(anyhow::anyhow!(
                "Failed to move {} to {}: {}",
                source.display(),
                target.display(),
                e
            ))),
        }
    }
}
