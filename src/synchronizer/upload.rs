//! Phase 1 — UPLOAD (§4.1 Phase 1). Drives the local→remote direction.

use std::collections::HashSet;

use quill_sync_core::system_path;
use serde_json::Value;

use crate::collaborators::{ChangeSource, PutOptions};
use crate::error::{Result, SyncError};
use crate::events::SyncEvent;
use crate::model::{Item, ItemType, SyncAction};
use crate::progress::{ProgressCounter, ProgressReport};

use super::options::StartOptions;
#[cfg(any(test, feature = "test-support"))]
use super::options::TestHook;
use super::Synchronizer;

pub(super) async fn run(sync: &Synchronizer, options: &StartOptions, report: &ProgressReport) -> Result<()> {
    let target_id = sync.file_api.sync_target_id();
    let mut done_paths: HashSet<String> = HashSet::new();

    loop {
        if sync.is_cancelling() {
            report.set_cancelling(true);
            return Ok(());
        }

        let batch = sync.item_store.next_sync_batch(target_id).await?;
        let never_synced: HashSet<&str> = batch.never_synced_ids.iter().map(String::as_str).collect();

        // Resources carry a separate blob-readiness check (§4.1 Phase 1),
        // so only non-Resource never-synced items are eligible for the
        // multi-put fast path; Resources always go through the main loop.
        let preupload_candidates: Vec<Item> = batch
            .items
            .iter()
            .filter(|item| never_synced.contains(item.id.as_str()) && item.type_ != ItemType::Resource)
            .cloned()
            .collect();
        let failures = sync.uploader.pre_upload_items(&preupload_candidates).await?;
        let mut failed_ids: HashSet<String> = HashSet::new();
        for (id, err) in failures {
            sync.item_store.disable_sync(target_id, &id, &err.to_string()).await?;
            failed_ids.insert(id);
        }
        // Items that were actually pre-uploaded (multi-put supported and
        // not among the failures above) must not be processed again by the
        // stat-based loop below, or they would be uploaded twice.
        let preuploaded_ids: HashSet<String> = if sync.file_api.supports_multi_put() {
            let mut ids = HashSet::new();
            for item in &preupload_candidates {
                if failed_ids.contains(&item.id) {
                    continue;
                }
                sync.item_store.set_sync_time(target_id, &item.id, item.updated_time).await?;
                report.increment(ProgressCounter::CreateRemote);
                ids.insert(item.id.clone());
            }
            ids
        } else {
            HashSet::new()
        };

        for item in &batch.items {
            if sync.is_cancelling() {
                report.set_cancelling(true);
                return Ok(());
            }

            let path = system_path(&item.id);
            if !done_paths.insert(path.clone()) {
                return Err(SyncError::ProcessingPathTwice(path));
            }

            if preuploaded_ids.contains(&item.id) || failed_ids.contains(&item.id) {
                continue;
            }

            process_item(sync, options, report, target_id, item, never_synced.contains(item.id.as_str())).await?;
            sync.report_progress(options, report);
        }

        if !batch.has_more {
            return Ok(());
        }
    }
}

async fn process_item(
    sync: &Synchronizer,
    options: &StartOptions,
    report: &ProgressReport,
    target_id: i64,
    item: &Item,
    never_synced: bool,
) -> Result<()> {
    let path = system_path(&item.id);
    let sync_item = sync.item_store.sync_item(target_id, &item.id).await?;
    let sync_time = sync_item.map(|s| s.sync_time).unwrap_or(0);

    let remote = if never_synced {
        None
    } else {
        sync.file_api.stat(&path).await?
    };

    let (action, remote_item) = match &remote {
        None if sync_time == 0 => (SyncAction::CreateRemote, None),
        None => (SyncAction::conflict_for(item.type_), None),
        Some(_) => {
            let bytes = sync.file_api.get(&path).await?;
            let remote_item: Item =
                serde_json::from_slice(&bytes).map_err(|e| SyncError::other(e.to_string(), false))?;
            if remote_item.updated_time > sync_time {
                (SyncAction::conflict_for(item.type_), Some(remote_item))
            } else {
                (SyncAction::UpdateRemote, Some(remote_item))
            }
        }
    };

    match action {
        SyncAction::CreateRemote | SyncAction::UpdateRemote => {
            if upload_item(sync, target_id, item).await? {
                report.increment(if action == SyncAction::CreateRemote {
                    ProgressCounter::CreateRemote
                } else {
                    ProgressCounter::UpdateRemote
                });
            }
            Ok(())
        }
        SyncAction::ItemConflict => {
            let deleted_local = resolve_as_item_conflict(sync, item, remote_item.as_ref()).await?;
            report.increment(ProgressCounter::ItemConflict);
            if deleted_local {
                report.increment(ProgressCounter::DeleteLocal);
            }
            Ok(())
        }
        SyncAction::NoteConflict => {
            if must_handle_conflict(item, remote_item.as_ref()) {
                sync.item_store.duplicate_to_conflicts(item).await?;
                report.increment(ProgressCounter::CreateLocal);
            }
            let deleted_local = resolve_as_item_conflict(sync, item, remote_item.as_ref()).await?;
            report.increment(ProgressCounter::NoteConflict);
            if deleted_local {
                report.increment(ProgressCounter::DeleteLocal);
            }
            Ok(())
        }
        SyncAction::ResourceConflict => {
            sync.item_store.duplicate_to_conflicts(item).await?;
            if let Some(remote_item) = &remote_item {
                sync.item_store.put_item(remote_item.clone(), ChangeSource::Sync).await?;
                sync.item_store
                    .put_resource_local_state(crate::model::ResourceLocalState::idle(item.id.clone()))
                    .await?;
            }
            report.increment(ProgressCounter::ResourceConflict);
            sync.dispatch(options, SyncEvent::SyncHasDisabledSyncItems);
            Ok(())
        }
        // CreateLocal/UpdateLocal/DeleteLocal never arise from an UPLOAD
        // decision; they are DELTA-phase-only actions.
        SyncAction::CreateLocal | SyncAction::UpdateLocal | SyncAction::DeleteLocal => unreachable!(),
    }
}

/// Uploads `item`'s metadata (and blob, for Resources). Returns `Ok(true)`
/// when the upload actually happened, `Ok(false)` when the item was instead
/// disabled for this run (not ready, or rejected by the target).
async fn upload_item(sync: &Synchronizer, target_id: i64, item: &Item) -> Result<bool> {
    #[cfg(any(test, feature = "test-support"))]
    if sync.test_hooks.contains(&TestHook::RejectAllUploads) {
        // Mirrors the per-item-recoverable branch below: a rejected upload
        // disables that item for this run but never aborts the phase.
        sync.item_store
            .disable_sync(target_id, &item.id, "rejected by target (test hook)")
            .await?;
        return Ok(false);
    }

    if item.type_ == ItemType::Resource {
        let ready = sync
            .item_store
            .resource_local_state(&item.id)
            .await?
            .map(|s| s.is_ready_to_upload())
            .unwrap_or(false);
        if !ready {
            sync.item_store
                .disable_sync(target_id, &item.id, "resource not ready to upload (fetch_status != DONE)")
                .await?;
            return Ok(false);
        }
        if let Some(blob_path) = sync.item_store.resource_blob_path(&item.id).await? {
            let blob_remote_path = quill_sync_core::resource_blob_path(&item.id);
            sync.file_api
                .put(
                    &blob_remote_path,
                    &[],
                    PutOptions {
                        source_file_path: Some(blob_path),
                        share_id: item.share_id.clone(),
                    },
                )
                .await?;
        }
    }

    let result = sync.uploader.serialize_and_upload_item(item).await;
    match result {
        Ok(()) => {
            sync.item_store.set_sync_time(target_id, &item.id, item.updated_time).await?;
            Ok(true)
        }
        Err(e) if e.is_per_item_recoverable() => {
            sync.item_store
                .disable_sync(target_id, &item.id, &e.to_string())
                .await?;
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Resolves a conflict by overwriting the local item with `remote_item`, or
/// deleting it locally when the remote has none (§4.1 Phase 1 `itemConflict`:
/// "overwrite local with remote (if any) or delete local (if none)").
/// Returns whether the local item was deleted, so the caller can bump
/// `DeleteLocal` (§8 S3: "N is duplicated into Conflicts, then deleted
/// locally. Report: noteConflict == 1, deleteLocal == 1").
async fn resolve_as_item_conflict(sync: &Synchronizer, item: &Item, remote_item: Option<&Item>) -> Result<bool> {
    match remote_item {
        Some(remote_item) => {
            sync.item_store.put_item(remote_item.clone(), ChangeSource::Sync).await?;
            Ok(false)
        }
        None => {
            sync.item_store.delete_item(&item.id, false).await?;
            Ok(true)
        }
    }
}

/// Whether the divergence between a local item and the remote content it
/// conflicts with is user-material (as opposed to a merely transient flag
/// like `todo_completed`), per §4.1 Phase 1 `noteConflict` handling.
fn must_handle_conflict(local: &Item, remote: Option<&Item>) -> bool {
    const TRANSIENT_FIELDS: &[&str] = &["todo_completed"];

    let Some(remote) = remote else {
        // Nothing to diff against (the remote was deleted): there is always
        // something worth preserving locally, so treat it as a real
        // conflict (§8 S3).
        return true;
    };

    let strip = |data: &Value| -> Value {
        let mut data = data.clone();
        if let Some(obj) = data.as_object_mut() {
            for field in TRANSIENT_FIELDS {
                obj.remove(*field);
            }
        }
        data
    };

    strip(&local.data) != strip(&remote.data)
}
