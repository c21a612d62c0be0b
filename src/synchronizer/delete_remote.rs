//! Phase 2 — DELETE_REMOTE (§4.1 Phase 2). Drains the Deleted Items queue.

use quill_sync_core::{resource_blob_path, system_path};

use crate::error::Result;
use crate::model::ItemType;
use crate::progress::{ProgressCounter, ProgressReport};

use super::Synchronizer;

pub(super) async fn run(sync: &Synchronizer, report: &ProgressReport) -> Result<()> {
    let target_id = sync.file_api.sync_target_id();
    let deleted = sync.item_store.deleted_items(target_id).await?;

    for entry in deleted {
        if sync.is_cancelling() {
            report.set_cancelling(true);
            return Ok(());
        }

        sync.file_api.delete(&system_path(&entry.item_id)).await?;
        if entry.item_type == ItemType::Resource {
            sync.file_api.delete(&resource_blob_path(&entry.item_id)).await?;
        }
        sync.item_store.consume_deleted_item(target_id, &entry.item_id).await?;
        report.increment(ProgressCounter::DeleteRemote);
    }

    Ok(())
}
