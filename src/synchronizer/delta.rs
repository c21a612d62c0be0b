//! Phase 3 — DELTA (§4.1 Phase 3). Pulls remote→local, driving the Download
//! Queue, auto-enabling encryption on the first observed Master Key, and
//! deferring Folder deletions until every other item in the run has been
//! processed.

use std::collections::HashMap;
use std::sync::Arc;

use quill_sync_core::{is_system_path, SyncContext};

use crate::collaborators::{ChangeSource, DeltaOptions};
use crate::download_queue::DownloadQueue;
use crate::error::Result;
use crate::events::SyncEvent;
use crate::model::{Item, ItemType, ResourceLocalState, SyncAction};
use crate::progress::{ProgressCounter, ProgressReport};

use super::options::StartOptions;
#[cfg(any(test, feature = "test-support"))]
use super::options::TestHook;
use super::Synchronizer;

pub(super) async fn run(sync: &Synchronizer, options: &StartOptions, report: &ProgressReport) -> Result<SyncContext> {
    let target_id = sync.file_api.sync_target_id();
    let queue = DownloadQueue::new(Arc::clone(&sync.file_api), sync.download_concurrency);

    let mut context = options.context.clone().unwrap_or_default();
    let mut last_persisted_context = context.clone();
    let mut local_folders_to_delete: Vec<String> = Vec::new();
    let master_key_count_before = sync.item_store.master_key_count().await?;
    let mut master_key_observed_this_run = false;
    let mut page_index: u32 = 0;

    loop {
        if sync.is_cancelling() {
            report.set_cancelling(true);
            queue.stop();
            break;
        }

        let page = sync
            .file_api
            .delta(DeltaOptions {
                context: context.continuation.clone(),
                all_item_ids: None,
                wipe_out_fail_safe: sync.wipe_out_fail_safe,
            })
            .await?;

        if let Some(threshold) = sync.wipe_out_fail_safe {
            let deletions = page.items.iter().filter(|r| r.is_deleted).count();
            if deletions > threshold {
                queue.stop();
                return Err(crate::error::SyncError::FailSafe {
                    reported: deletions,
                    threshold,
                });
            }
        }

        let mut should_fetch: HashMap<String, bool> = HashMap::new();
        for remote in &page.items {
            if remote.is_deleted || !is_system_path(&remote.path) {
                continue;
            }
            let fetch = if sync.file_api.supports_accurate_timestamp() {
                match sync.item_store.get_item(&remote.id).await? {
                    Some(local) if Some(local.updated_time) == remote.jop_updated_time => false,
                    _ => true,
                }
            } else {
                true
            };
            should_fetch.insert(remote.id.clone(), fetch);
            if fetch {
                queue.push(remote.id.clone(), remote.path.clone());
            }
        }
        report.set_fetching_total(should_fetch.values().filter(|f| **f).count() as u64);

        for remote in &page.items {
            if sync.is_cancelling() {
                report.set_cancelling(true);
                break;
            }
            if !is_system_path(&remote.path) {
                continue;
            }

            if remote.is_deleted {
                process_deletion(sync, remote, report, &mut local_folders_to_delete).await?;
                continue;
            }

            if !should_fetch.get(&remote.id).copied().unwrap_or(true) {
                continue;
            }

            let outcome = queue.wait_for_result(&remote.id).await?;
            report.increment_fetching_processed();
            let Some(bytes) = outcome.result else {
                report.push_error(format!(
                    "failed to fetch {}: {}",
                    remote.path,
                    outcome.error.unwrap_or_default()
                ));
                continue;
            };

            let mut item: Item = serde_json::from_slice(&bytes)
                .map_err(|e| crate::error::SyncError::other(e.to_string(), false))?;

            #[cfg(any(test, feature = "test-support"))]
            if sync.test_hooks.contains(&TestHook::SkipRevisions) && item.type_ == ItemType::Revision {
                continue;
            }

            item.backfill_user_timestamps();

            let local = sync.item_store.get_item(&item.id).await?;
            let action = match &local {
                None => SyncAction::CreateLocal,
                Some(l) if item.updated_time > l.updated_time => SyncAction::UpdateLocal,
                Some(_) => continue,
            };

            if item.type_ == ItemType::Resource {
                if let Some(max) = sync.max_resource_size {
                    let size = item.data.get("size").and_then(|v| v.as_u64()).unwrap_or(0);
                    if size >= max {
                        sync.item_store
                            .disable_sync(target_id, &item.id, "resource exceeds maxResourceSize")
                            .await?;
                        sync.dispatch(options, SyncEvent::SyncHasDisabledSyncItems);
                        continue;
                    }
                }
                sync.item_store
                    .put_resource_local_state(ResourceLocalState::idle(item.id.clone()))
                    .await?;
            }

            sync.item_store.put_item(item.clone(), ChangeSource::Sync).await?;
            sync.item_store.set_sync_time(target_id, &item.id, item.updated_time).await?;

            report.increment(match action {
                SyncAction::CreateLocal => ProgressCounter::CreateLocal,
                SyncAction::UpdateLocal => ProgressCounter::UpdateLocal,
                _ => unreachable!(),
            });

            if item.type_ == ItemType::Resource {
                sync.dispatch(
                    options,
                    SyncEvent::SyncCreatedOrUpdatedResource { id: item.id.clone() },
                );
            }

            if item.type_ == ItemType::MasterKey && !master_key_observed_this_run && master_key_count_before == 0 {
                master_key_observed_this_run = true;
                sync.encryption.enable_encryption(&item.data).await?;
                sync.encryption.load_master_keys_from_settings().await?;
                sync.dispatch(options, SyncEvent::SyncGotEncryptedItem);
            } else if item.encryption_applied {
                sync.dispatch(options, SyncEvent::SyncGotEncryptedItem);
            }

            sync.report_progress(options, report);
        }

        if sync.is_cancelling() {
            report.set_cancelling(true);
            // Roll back to the last fully-persisted context so the next run
            // repeats this page (§3 invariant, §8 S6).
            context = last_persisted_context;
            queue.stop();
            break;
        }

        context = SyncContext::new(page.context.clone());
        if let Some(handler) = &options.save_context_handler {
            handler.save(&context).await?;
        }
        last_persisted_context = context.clone();

        if !page.has_more {
            break;
        }
        page_index += 1;

        #[cfg(any(test, feature = "test-support"))]
        if sync
            .test_hooks
            .iter()
            .any(|h| matches!(h, TestHook::CancelDeltaLoopAfterPage(p) if *p == page_index))
        {
            sync.cancelling.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    process_deferred_folder_deletions(sync, report, local_folders_to_delete).await?;
    sync.item_store.purge_orphaned_sync_items(target_id).await?;

    Ok(context)
}

async fn process_deletion(
    sync: &Synchronizer,
    remote: &crate::model::RemoteItem,
    report: &ProgressReport,
    local_folders_to_delete: &mut Vec<String>,
) -> Result<()> {
    let Some(local) = sync.item_store.get_item(&remote.id).await? else {
        return Ok(());
    };

    if local.type_ == ItemType::Folder {
        local_folders_to_delete.push(local.id);
        return Ok(());
    }

    sync.item_store.delete_item(&local.id, false).await?;
    report.increment(ProgressCounter::DeleteLocal);
    Ok(())
}

/// §4.1 Phase 3 step 6: a Folder whose note-set is non-empty at deletion
/// time represents a cross-client conflict (notes were not simultaneously
/// deleted) — those notes are marked as conflicts before the folder itself
/// is removed, without recursing into other children.
async fn process_deferred_folder_deletions(
    sync: &Synchronizer,
    report: &ProgressReport,
    folders: Vec<String>,
) -> Result<()> {
    for folder_id in folders {
        let note_ids = sync.item_store.note_ids_in_folder(&folder_id).await?;
        for note_id in note_ids {
            if let Some(note) = sync.item_store.get_item(&note_id).await? {
                sync.item_store.duplicate_to_conflicts(&note).await?;
                report.increment(ProgressCounter::NoteConflict);
            }
        }
        sync.item_store.delete_item(&folder_id, false).await?;
        report.increment(ProgressCounter::DeleteLocal);
    }
    Ok(())
}
