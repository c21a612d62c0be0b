//! Item Uploader (§4.4) — serializes items, batches small items when the
//! target supports multi-put, streams large resource blobs.

use std::sync::Arc;

use crate::collaborators::{FileApi, PutOptions};
use crate::error::{Result, SyncError};
use crate::model::Item;
use quill_sync_core::system_path;

pub struct ItemUploader {
    file_api: Arc<dyn FileApi>,
}

impl ItemUploader {
    pub fn new(file_api: Arc<dyn FileApi>) -> Self {
        Self { file_api }
    }

    /// Serialize an item in its canonical wire form.
    ///
    /// A single JSON document is the canonical form for every item variant;
    /// variant-specific fields already live in `Item::data` (§3).
    pub fn serialize(item: &Item) -> Result<Vec<u8>> {
        serde_json::to_vec(item).map_err(|e| SyncError::other(e.to_string(), false))
    }

    /// Pre-upload never-synced items ahead of the main per-item loop.
    ///
    /// A no-op when the backend doesn't advertise `supportsMultiPut` — the
    /// main loop uploads each of these items individually instead (§4.1
    /// Phase 1, step 2). Returns the ids (with their error) of items whose
    /// upload failed in a per-item-recoverable way (rejected by target,
    /// timed out) so the caller can disable just that item rather than
    /// aborting the whole phase (§7: one oversized item must not block the
    /// rest of the batch); a non-recoverable error still aborts.
    pub async fn pre_upload_items(&self, items: &[Item]) -> Result<Vec<(String, SyncError)>> {
        if !self.file_api.supports_multi_put() || items.is_empty() {
            return Ok(Vec::new());
        }
        let mut failures = Vec::new();
        for item in items {
            match self.serialize_and_upload_item(item).await {
                Ok(()) => {}
                Err(e) if e.is_per_item_recoverable() => failures.push((item.id.clone(), e)),
                Err(e) => return Err(e),
            }
        }
        Ok(failures)
    }

    /// Serialize `item` per its canonical form and write it to the remote
    /// at its system path.
    ///
    /// Surfaces [`SyncError::RejectedByTarget`] when the backend refuses the
    /// payload (size cap, forbidden characters) — that error is reclassified
    /// as a per-item failure by the caller, not a fatal one (§7).
    pub async fn serialize_and_upload_item(&self, item: &Item) -> Result<()> {
        let bytes = Self::serialize(item)?;
        let path = system_path(&item.id);
        self.file_api.put(&path, &bytes, PutOptions::default()).await
    }
}
