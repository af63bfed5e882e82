//! Item deletion with deferred file cleanup
//!
//! The database row goes first, inside its own transaction. Only once that
//! transaction has committed is a cleanup job handed to the background
//! worker. The caller gets its answer without waiting for the filesystem.

use super::item::ensure_owner;
use crate::auth::Identity;
use crate::cleanup::{CleanupQueue, DeletionJob};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{ItemRecord, ItemStore};
use crate::storage::ImageStorage;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct DeletionCoordinator {
    items: Arc<dyn ItemStore>,
    images: ImageStorage,
    cleanup: CleanupQueue,
}

impl DeletionCoordinator {
    pub fn new(items: Arc<dyn ItemStore>, images: ImageStorage, cleanup: CleanupQueue) -> Self {
        Self {
            items,
            images,
            cleanup,
        }
    }

    /// Delete an item owned by `identity` and schedule removal of its images
    pub async fn delete_item(&self, id: i64, identity: &Identity) -> ApiResult<ItemRecord> {
        let item = self
            .items
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No item with id={}", id)))?;

        ensure_owner(&item, identity)?;

        // `None` here means a concurrent request deleted it first
        let deleted = self
            .items
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No item with id={}", id)))?;

        info!(item_id = id, username = %identity.username, "Item deleted");

        match self.images.item_dir(&deleted.username, &deleted.name) {
            Ok(dir) => self.cleanup.enqueue(DeletionJob::new(dir)),
            Err(e) => warn!(item_id = id, error = %e, "Skipping file cleanup"),
        }

        Ok(deleted)
    }
}
