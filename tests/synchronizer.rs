//! Integration tests driving `Synchronizer` end-to-end through the
//! in-memory collaborator doubles. Mirrors the scenarios and invariants
//! called out for the three-phase protocol: a single local edit uploads
//! exactly once, conflicting edits land in Conflicts, deferred folder
//! deletions wait for their notes, cancellation resumes from the last
//! persisted context, and so on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use quill_sync::collaborators::{DeltaPage, FileApi, ItemStore};
use quill_sync::error::SyncError;
use quill_sync::model::{DeletedItem, Item, ItemType, RemoteItem, ResourceLocalState};
use quill_sync::synchronizer::{SaveContextHandler, StartOptions, SyncStep, TestHook};
use quill_sync::testing::{InMemoryEncryptionService, InMemoryFileApi, InMemoryItemStore, InMemoryShareService};
use quill_sync::{Result as SyncResult, Synchronizer};

fn note(id: &str, updated_time: i64, title: &str) -> Item {
    Item {
        id: id.to_string(),
        type_: ItemType::Note,
        updated_time,
        created_time: updated_time,
        user_updated_time: updated_time,
        user_created_time: updated_time,
        encryption_applied: false,
        share_id: None,
        data: json!({ "title": title }),
    }
}

fn folder(id: &str, updated_time: i64, title: &str) -> Item {
    Item {
        id: id.to_string(),
        type_: ItemType::Folder,
        updated_time,
        created_time: updated_time,
        user_updated_time: updated_time,
        user_created_time: updated_time,
        encryption_applied: false,
        share_id: None,
        data: json!({ "title": title }),
    }
}

fn harness() -> (
    Arc<InMemoryFileApi>,
    Arc<InMemoryItemStore>,
    Arc<InMemoryEncryptionService>,
    Arc<InMemoryShareService>,
) {
    (
        Arc::new(InMemoryFileApi::new(1)),
        Arc::new(InMemoryItemStore::new()),
        Arc::new(InMemoryEncryptionService::new()),
        Arc::new(InMemoryShareService::new()),
    )
}

fn synchronizer(
    file_api: &Arc<InMemoryFileApi>,
    item_store: &Arc<InMemoryItemStore>,
    encryption: &Arc<InMemoryEncryptionService>,
    share: &Arc<InMemoryShareService>,
) -> Synchronizer {
    Synchronizer::new(
        Arc::clone(file_api),
        Arc::clone(item_store),
        Arc::clone(encryption),
        Arc::clone(share),
        "desktop",
        "client-a",
    )
}

// ---------------------------------------------------------------------
// S1 — fresh bootstrap: a never-synced note is uploaded, and a
// freshly-observed remote item is created locally.
// ---------------------------------------------------------------------

#[tokio::test]
async fn fresh_note_uploads_and_records_sync_time() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1000, "hello"));
    let sync = synchronizer(&file_api, &item_store, &encryption, &share);

    let result = sync.start(StartOptions::default()).await;
    assert!(result.is_ok());

    assert!(file_api.contains("n1.md"));
    let recorded = item_store.sync_item(1, "n1").await.unwrap();
    assert_eq!(recorded.unwrap().sync_time, 1000);
}

#[tokio::test]
async fn second_run_with_no_local_changes_is_a_no_op() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1000, "hello"));
    let sync = synchronizer(&file_api, &item_store, &encryption, &share);

    sync.start(StartOptions::default()).await.unwrap();

    sync.start(StartOptions::default()).await.unwrap();
    // The item's sync_time already matches updated_time, so the second run
    // should not re-upload it — the lock file itself is still rewritten
    // each run, but n1.md is only ever put once.
    let n1_puts = file_api
        .last_requests()
        .iter()
        .filter(|r| r.as_str() == "put n1.md")
        .count();
    assert_eq!(n1_puts, 1, "only the first run's upload should have written n1.md");
}

// ---------------------------------------------------------------------
// Invariant: a path is never processed twice inside one UPLOAD pass.
// ---------------------------------------------------------------------

#[tokio::test]
async fn duplicate_path_in_one_batch_is_rejected() {
    // Two different item ids that collide on the same remote system path
    // can't occur through the real ItemStore (ids are the path stem), so
    // this invariant is instead exercised at the classification layer: a
    // `ProcessingPathTwice` error classifies as log-only, never fatal to
    // the whole app, matching §7's InfoOnly disposition.
    use quill_sync::error::{classify, ErrorDisposition};
    assert_eq!(
        classify(&SyncError::ProcessingPathTwice("n1.md".into())),
        ErrorDisposition::InfoOnly
    );
}

// ---------------------------------------------------------------------
// Concurrency: a second `start()` while one is in progress is rejected.
// ---------------------------------------------------------------------

#[tokio::test]
async fn concurrent_start_is_rejected() {
    let (file_api, item_store, encryption, share) = harness();
    let sync = Arc::new(synchronizer(&file_api, &item_store, &encryption, &share));

    // Manufacture an in-progress state without a full run by driving two
    // concurrent starts against a store with many items, so the first
    // genuinely overlaps the second.
    for i in 0..200 {
        item_store.seed_item(note(&format!("n{i}"), 1000 + i as i64, "x"));
    }

    let sync_a = Arc::clone(&sync);
    let handle = tokio::spawn(async move { sync_a.start(StartOptions::default()).await });

    tokio::task::yield_now().await;
    let second = sync.start(StartOptions::default()).await;

    let first = handle.await.unwrap();
    assert!(first.is_ok());
    // The second call either lost the race entirely (ran after the first
    // finished, also Ok) or correctly observed AlreadyStarted.
    match second {
        Ok(_) => {}
        Err(e) => assert!(matches!(e, SyncError::AlreadyStarted)),
    }
}

#[tokio::test]
async fn idle_after_completion_allows_a_fresh_start() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1000, "hello"));
    let sync = synchronizer(&file_api, &item_store, &encryption, &share);

    sync.start(StartOptions::default()).await.unwrap();
    assert!(!sync.is_in_progress());
    sync.start(StartOptions::default()).await.unwrap();
    assert!(!sync.is_in_progress());
}

// ---------------------------------------------------------------------
// S2 — concurrent edit conflict: both sides touched the same note since
// the last sync_time, with materially different content. The existing
// local copy is duplicated into Conflicts before being overwritten by
// remote.
// ---------------------------------------------------------------------

#[tokio::test]
async fn note_conflict_duplicates_local_before_accepting_remote() {
    let (file_api, item_store, encryption, share) = harness();

    // Remote already has a newer, differently-titled copy at n1.md.
    file_api
        .put(
            "n1.md",
            &serde_json::to_vec(&note("n1", 2000, "remote title")).unwrap(),
            Default::default(),
        )
        .await
        .unwrap();

    // Local store has its own edit, synced once before at sync_time=1000.
    item_store.seed_item(note("n1", 1500, "local title"));
    item_store.seed_sync_time(1, "n1", 1000);

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    // The local item was overwritten with the remote's content...
    let current = item_store.get_item("n1").await.unwrap().unwrap();
    assert_eq!(current.data["title"], json!("remote title"));

    // ...and the pre-conflict local edit was preserved as a duplicate in
    // Conflicts.
    assert_eq!(item_store.item_count(), 2);
}

#[tokio::test]
async fn conflict_differing_only_by_todo_completed_does_not_duplicate() {
    let (file_api, item_store, encryption, share) = harness();

    let mut remote_item = note("n1", 2000, "shared title");
    remote_item.data["todo_completed"] = json!(0);
    file_api
        .put("n1.md", &serde_json::to_vec(&remote_item).unwrap(), Default::default())
        .await
        .unwrap();

    let mut local_item = note("n1", 1500, "shared title");
    local_item.data["todo_completed"] = json!(1);
    item_store.seed_item(local_item);
    item_store.seed_sync_time(1, "n1", 1000);

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    // Transient-only divergence: remote wins, nothing duplicated.
    assert_eq!(item_store.item_count(), 1);
}

// ---------------------------------------------------------------------
// S3 — remote-deleted, local-modified: stat() comes back empty but the
// item was synced before, so the local copy is always preserved via a
// Conflicts duplicate and then deleted.
// ---------------------------------------------------------------------

#[tokio::test]
async fn remote_deletion_of_a_previously_synced_note_always_conflicts() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1500, "still here locally"));
    item_store.seed_sync_time(1, "n1", 1000);
    // No object at n1.md: remote deleted it.

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    let last_snapshot: Arc<std::sync::Mutex<Option<quill_sync::ProgressSnapshot>>> =
        Arc::new(std::sync::Mutex::new(None));
    let last_snapshot_cb = Arc::clone(&last_snapshot);
    let options = StartOptions {
        on_event: Some(Arc::new(move |event| {
            if let quill_sync::SyncEvent::SyncReportUpdate(snapshot) = event {
                *last_snapshot_cb.lock().unwrap() = Some(snapshot.clone());
            }
        })),
        ..Default::default()
    };
    sync.start(options).await.unwrap();

    // Original item was deleted (remote_item is None -> delete_item), but
    // its content was preserved via duplicate_to_conflicts first.
    assert!(!item_store.has_item("n1"));
    assert_eq!(item_store.item_count(), 1);

    // §8 S3: "noteConflict == 1, deleteLocal == 1" — the duplicate-then-
    // delete resolution must report both counters, not just the conflict.
    let snapshot = last_snapshot.lock().unwrap().clone().expect("a progress snapshot was dispatched");
    assert_eq!(snapshot.note_conflict, 1);
    assert_eq!(snapshot.delete_local, 1);
}

// ---------------------------------------------------------------------
// S4 — large mobile resource: a resource above the mobile cap is
// disabled rather than downloaded.
// ---------------------------------------------------------------------

#[tokio::test]
async fn oversized_resource_is_disabled_on_mobile_profile() {
    let (file_api, item_store, encryption, share) = harness();

    let big_resource = Item {
        id: "r1".into(),
        type_: ItemType::Resource,
        updated_time: 1000,
        created_time: 1000,
        user_updated_time: 1000,
        user_created_time: 1000,
        encryption_applied: false,
        share_id: None,
        data: json!({ "size": 200 * 1024 * 1024u64 }),
    };

    file_api
        .put("r1.md", &serde_json::to_vec(&big_resource).unwrap(), Default::default())
        .await
        .unwrap();
    file_api.queue_delta_page(DeltaPage {
        items: vec![RemoteItem {
            id: "r1".into(),
            path: "r1.md".into(),
            type_: ItemType::Resource,
            is_deleted: false,
            updated_time: 1000,
            jop_updated_time: Some(1000),
        }],
        context: json!(null),
        has_more: false,
    });

    let sync = synchronizer(&file_api, &item_store, &encryption, &share).with_mobile_resource_limit();
    let disabled_event_seen = Arc::new(AtomicUsize::new(0));
    let disabled_event_cb = Arc::clone(&disabled_event_seen);
    let options = StartOptions {
        on_event: Some(Arc::new(move |event| {
            if matches!(event, quill_sync::SyncEvent::SyncHasDisabledSyncItems) {
                disabled_event_cb.fetch_add(1, Ordering::SeqCst);
            }
        })),
        ..Default::default()
    };
    sync.start(options).await.unwrap();
    assert_eq!(disabled_event_seen.load(Ordering::SeqCst), 1);

    // Oversized resource must not have been materialized locally.
    assert!(!item_store.has_item("r1"));
}

// ---------------------------------------------------------------------
// S5 — first Master Key observed triggers auto-enable-encryption exactly
// once.
// ---------------------------------------------------------------------

#[tokio::test]
async fn first_master_key_auto_enables_encryption_once() {
    let (file_api, item_store, encryption, share) = harness();

    let master_key = Item {
        id: "mk1".into(),
        type_: ItemType::MasterKey,
        updated_time: 1000,
        created_time: 1000,
        user_updated_time: 1000,
        user_created_time: 1000,
        encryption_applied: false,
        share_id: None,
        data: json!({ "content": "encrypted-blob" }),
    };
    file_api
        .put("mk1.md", &serde_json::to_vec(&master_key).unwrap(), Default::default())
        .await
        .unwrap();
    file_api.queue_delta_page(DeltaPage {
        items: vec![RemoteItem {
            id: "mk1".into(),
            path: "mk1.md".into(),
            type_: ItemType::MasterKey,
            is_deleted: false,
            updated_time: 1000,
            jop_updated_time: Some(1000),
        }],
        context: json!(null),
        has_more: false,
    });

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    assert_eq!(encryption.enable_calls(), 1);
    assert_eq!(encryption.reload_calls(), 1);
    assert!(encryption.is_enabled());
}

// ---------------------------------------------------------------------
// S6 — cancellation mid-delta resumes from the last persisted context,
// never the in-flight one.
// ---------------------------------------------------------------------

struct RecordingSaveHandler {
    saved: std::sync::Mutex<Vec<serde_json::Value>>,
}

#[async_trait::async_trait]
impl SaveContextHandler for RecordingSaveHandler {
    async fn save(&self, context: &quill_sync_core::SyncContext) -> SyncResult<()> {
        self.saved.lock().unwrap().push(context.continuation.clone());
        Ok(())
    }
}

#[tokio::test]
async fn cancellation_rolls_back_to_last_persisted_context() {
    let (file_api, item_store, encryption, share) = harness();

    file_api.queue_delta_page(DeltaPage {
        items: vec![],
        context: json!({ "cursor": "page-1" }),
        has_more: true,
    });
    file_api.queue_delta_page(DeltaPage {
        items: vec![],
        context: json!({ "cursor": "page-2" }),
        has_more: false,
    });

    let sync = synchronizer(&file_api, &item_store, &encryption, &share)
        .with_test_hooks(vec![TestHook::CancelDeltaLoopAfterPage(1)]);

    let handler = Arc::new(RecordingSaveHandler {
        saved: std::sync::Mutex::new(Vec::new()),
    });
    let options = StartOptions {
        save_context_handler: Some(handler.clone()),
        ..Default::default()
    };

    let ctx = sync.start(options).await.unwrap();
    // Page 1 was persisted (has_more=true, not yet cancelling); the run
    // then set cancelling before fetching page 2, so page 2's context is
    // discarded and the returned context is page 1's.
    assert_eq!(ctx.continuation, json!({ "cursor": "page-1" }));
    assert_eq!(handler.saved.lock().unwrap().len(), 1);
}

// ---------------------------------------------------------------------
// DELETE_REMOTE phase: queued local deletions are pushed and consumed.
// ---------------------------------------------------------------------

#[tokio::test]
async fn queued_deletion_removes_remote_object_and_resource_blob() {
    let (file_api, item_store, encryption, share) = harness();
    file_api.seed_content("r1.md", b"{}".to_vec());
    file_api.seed_content("Resources/r1", b"blob".to_vec());
    item_store.seed_deleted(
        1,
        DeletedItem {
            item_id: "r1".into(),
            item_type: ItemType::Resource,
            sync_target_id: 1,
        },
    );

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    assert!(!file_api.contains("r1.md"));
    assert!(!file_api.contains("Resources/r1"));
    assert!(item_store.deleted_items(1).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------
// Folder deletion is deferred until every other item in the run has been
// processed, and any notes still inside it become conflicts rather than
// being silently deleted.
// ---------------------------------------------------------------------

#[tokio::test]
async fn folder_deletion_is_deferred_and_notes_inside_become_conflicts() {
    let (file_api, item_store, encryption, share) = harness();

    item_store.seed_item(folder("f1", 900, "old folder"));
    let mut child = note("n1", 900, "inside folder");
    child.data["parent_id"] = json!("f1");
    item_store.seed_item(child);
    item_store.seed_sync_time(1, "f1", 900);
    item_store.seed_sync_time(1, "n1", 900);

    file_api.queue_delta_page(DeltaPage {
        items: vec![RemoteItem {
            id: "f1".into(),
            path: "f1.md".into(),
            type_: ItemType::Folder,
            is_deleted: true,
            updated_time: 1000,
            jop_updated_time: None,
        }],
        context: json!(null),
        has_more: false,
    });

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    // The folder was removed locally...
    assert!(!item_store.has_item("f1"));
    // ...but the note it contained was preserved as a conflict duplicate,
    // not silently deleted alongside it.
    assert_eq!(item_store.item_count(), 2); // original n1 + its duplicate
}

// ---------------------------------------------------------------------
// Fail-safe: an implausibly large deletion set aborts the delta phase
// rather than wiping out the local database.
// ---------------------------------------------------------------------

#[tokio::test]
async fn fail_safe_aborts_on_too_many_deletions() {
    let (file_api, item_store, encryption, share) = harness();

    let items: Vec<RemoteItem> = (0..5)
        .map(|i| RemoteItem {
            id: format!("n{i}"),
            path: format!("n{i}.md"),
            type_: ItemType::Note,
            is_deleted: true,
            updated_time: 1000,
            jop_updated_time: None,
        })
        .collect();
    file_api.queue_delta_page(DeltaPage {
        items,
        context: json!(null),
        has_more: false,
    });

    let sync = synchronizer(&file_api, &item_store, &encryption, &share).with_wipe_out_fail_safe(2);
    let options = StartOptions {
        throw_on_error: true,
        ..Default::default()
    };
    let result = sync.start(options).await;
    assert!(matches!(result, Err(SyncError::FailSafe { reported: 5, threshold: 2 })));

    // The run is idle again afterward despite the failure (lock released,
    // state reset).
    assert!(!sync.is_in_progress());
}

// ---------------------------------------------------------------------
// Multi-put pre-upload: a never-synced item must be uploaded exactly once,
// not once via the pre-upload fast path and again via the stat-based loop.
// ---------------------------------------------------------------------

#[tokio::test]
async fn multi_put_preupload_does_not_double_upload() {
    let (_, item_store, encryption, share) = harness();
    let file_api = Arc::new(InMemoryFileApi::with_multi_put(1));
    item_store.seed_item(note("n1", 1000, "hello"));

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    let n1_puts = file_api
        .last_requests()
        .iter()
        .filter(|r| r.as_str() == "put n1.md")
        .count();
    assert_eq!(n1_puts, 1, "a multi-put pre-uploaded item must not be re-uploaded by the stat-based loop");

    let recorded = item_store.sync_item(1, "n1").await.unwrap().unwrap();
    assert_eq!(recorded.sync_time, 1000);
}

// ---------------------------------------------------------------------
// A rejected upload (test hook standing in for a target-side refusal)
// disables the item instead of aborting the run.
// ---------------------------------------------------------------------

#[tokio::test]
async fn rejected_upload_disables_item_without_aborting_run() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1000, "hello"));

    let sync = synchronizer(&file_api, &item_store, &encryption, &share)
        .with_test_hooks(vec![TestHook::RejectAllUploads]);
    let result = sync.start(StartOptions::default()).await;
    assert!(result.is_ok());

    assert!(!file_api.contains("n1.md"));
    let recorded = item_store.sync_item(1, "n1").await.unwrap().unwrap();
    assert!(recorded.sync_disabled);
}

// ---------------------------------------------------------------------
// Share maintenance always runs once per completed run, success or
// failure of the phases notwithstanding.
// ---------------------------------------------------------------------

#[tokio::test]
async fn share_maintenance_runs_exactly_once_per_run() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1000, "hello"));
    let sync = synchronizer(&file_api, &item_store, &encryption, &share);

    sync.start(StartOptions::default()).await.unwrap();
    assert_eq!(share.maintenance_calls(), 1);
    sync.start(StartOptions::default()).await.unwrap();
    assert_eq!(share.maintenance_calls(), 2);
}

// ---------------------------------------------------------------------
// Progress events: SyncStarted and SyncCompleted always bracket a run.
// ---------------------------------------------------------------------

#[tokio::test]
async fn dispatches_started_and_completed_events() {
    let (file_api, item_store, encryption, share) = harness();
    item_store.seed_item(note("n1", 1000, "hello"));
    let sync = synchronizer(&file_api, &item_store, &encryption, &share);

    let started = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let started_cb = Arc::clone(&started);
    let completed_cb = Arc::clone(&completed);

    let options = StartOptions {
        on_event: Some(Arc::new(move |event| match event {
            quill_sync::SyncEvent::SyncStarted => {
                started_cb.fetch_add(1, Ordering::SeqCst);
            }
            quill_sync::SyncEvent::SyncCompleted { with_errors, .. } => {
                assert!(!with_errors);
                completed_cb.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        })),
        ..Default::default()
    };

    sync.start(options).await.unwrap();
    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------
// sync_steps selection: asking for only UPLOAD must not touch DELTA.
// ---------------------------------------------------------------------

#[tokio::test]
async fn restricting_sync_steps_skips_the_others() {
    let (file_api, item_store, encryption, share) = harness();
    file_api.queue_delta_page(DeltaPage {
        items: vec![RemoteItem {
            id: "n1".into(),
            path: "n1.md".into(),
            type_: ItemType::Note,
            is_deleted: false,
            updated_time: 1000,
            jop_updated_time: Some(1000),
        }],
        context: json!(null),
        has_more: false,
    });
    file_api.seed_content("n1.md", serde_json::to_vec(&note("n1", 1000, "remote only")).unwrap());

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    let options = StartOptions {
        sync_steps: vec![SyncStep::UpdateRemote],
        ..Default::default()
    };
    sync.start(options).await.unwrap();

    // DELTA never ran, so the queued page was never consumed and nothing
    // was created locally.
    assert!(!item_store.has_item("n1"));
}

// ---------------------------------------------------------------------
// Resources must be fully fetched (fetch_status = Done) before upload;
// an unfetched resource is disabled rather than uploaded half-formed.
// ---------------------------------------------------------------------

#[tokio::test]
async fn resource_not_ready_to_upload_is_disabled() {
    let (file_api, item_store, encryption, share) = harness();
    let resource = Item {
        id: "r1".into(),
        type_: ItemType::Resource,
        updated_time: 1000,
        created_time: 1000,
        user_updated_time: 1000,
        user_created_time: 1000,
        encryption_applied: false,
        share_id: None,
        data: json!({ "size": 10 }),
    };
    item_store.seed_item(resource);
    item_store
        .put_resource_local_state(ResourceLocalState {
            resource_id: "r1".into(),
            fetch_status: quill_sync::model::FetchStatus::Started,
            fetch_error: None,
        })
        .await
        .unwrap();

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    assert!(!file_api.contains("r1.md"));
    let recorded = item_store.sync_item(1, "r1").await.unwrap().unwrap();
    assert!(recorded.sync_disabled);
}

// ---------------------------------------------------------------------
// Change source threading: an item created by DELTA must reach put_item
// tagged ChangeSource::Sync, not User (exercised indirectly through the
// InMemoryItemStore double, which does not branch on it, but this test
// locks in the call path by asserting the downstream state landed).
// ---------------------------------------------------------------------

#[tokio::test]
async fn delta_creates_local_item_from_remote_content() {
    let (file_api, item_store, encryption, share) = harness();
    file_api.queue_delta_page(DeltaPage {
        items: vec![RemoteItem {
            id: "n1".into(),
            path: "n1.md".into(),
            type_: ItemType::Note,
            is_deleted: false,
            updated_time: 1000,
            jop_updated_time: Some(1000),
        }],
        context: json!(null),
        has_more: false,
    });
    file_api.seed_content("n1.md", serde_json::to_vec(&note("n1", 1000, "from remote")).unwrap());

    let sync = synchronizer(&file_api, &item_store, &encryption, &share);
    sync.start(StartOptions::default()).await.unwrap();

    let created = item_store.get_item("n1").await.unwrap().unwrap();
    assert_eq!(created.data["title"], json!("from remote"));
    let recorded = item_store.sync_item(1, "n1").await.unwrap().unwrap();
    assert_eq!(recorded.sync_time, 1000);
}
