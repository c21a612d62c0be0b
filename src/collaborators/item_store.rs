//! The Item Store contract (§2, §4.1) — local persistent database of items.
//! Supplies change queues, conflict creation, soft-delete tracking, and
//! per-target sync metadata. No storage backend is implemented here.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{DeletedItem, Item, ResourceLocalState, SyncItem};

/// One batch of local items awaiting upload, as handed back by
/// `ItemStore::next_sync_items` (§4.1 Phase 1, step 1).
#[derive(Debug, Clone, Default)]
pub struct SyncBatch {
    pub items: Vec<Item>,
    /// Subset of `items` that has never been synced to this target.
    pub never_synced_ids: Vec<String>,
    pub has_more: bool,
}

/// Who/what caused a local mutation, threaded through so storage layers can
/// distinguish user edits from sync-originated writes (§4.1 Phase 3: "Save
/// via Item Store with ... changeSource=SYNC").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    User,
    Sync,
}

/// Local persistent database of items (§2 "Item Store").
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Next batch of items needing sync for `sync_target_id`, plus which of
    /// them were never synced (§4.1 Phase 1, step 1).
    async fn next_sync_batch(&self, sync_target_id: i64) -> Result<SyncBatch>;

    /// Persist `sync_time = updated_time` for `item_id` after a successful
    /// upload (§3 invariant 1).
    async fn set_sync_time(&self, sync_target_id: i64, item_id: &str, sync_time: i64) -> Result<()>;

    /// Mark `item_id` sync-disabled for this target with a human-readable
    /// reason (e.g. pending resource upload, oversized download).
    async fn disable_sync(&self, sync_target_id: i64, item_id: &str, reason: &str) -> Result<()>;

    /// Look up per-(target, item) sync metadata, if any row exists.
    async fn sync_item(&self, sync_target_id: i64, item_id: &str) -> Result<Option<SyncItem>>;

    /// Fetch a single local item by id.
    async fn get_item(&self, item_id: &str) -> Result<Option<Item>>;

    /// Overwrite (or create) a local item. `change_source` controls whether
    /// the write re-enters the outbound change queue.
    async fn put_item(&self, item: Item, change_source: ChangeSource) -> Result<()>;

    /// Delete a local item. `track_deleted` controls whether a
    /// [`DeletedItem`] is queued for outbound deletion (§4.1 Phase 3, step 4:
    /// "delete via Item Store with `trackDeleted=false`").
    async fn delete_item(&self, item_id: &str, track_deleted: bool) -> Result<()>;

    /// Duplicate `item` into the Conflicts folder, returning the new item's
    /// id (§4.1 Phase 1, conflict handling).
    async fn duplicate_to_conflicts(&self, item: &Item) -> Result<String>;

    /// The Deleted Items queue for a target (§4.1 Phase 2).
    async fn deleted_items(&self, sync_target_id: i64) -> Result<Vec<DeletedItem>>;

    /// Mark a deleted-items queue entry consumed.
    async fn consume_deleted_item(&self, sync_target_id: i64, item_id: &str) -> Result<()>;

    /// Resource local fetch-state row, if any.
    async fn resource_local_state(&self, resource_id: &str) -> Result<Option<ResourceLocalState>>;

    /// Create or update a Resource's local fetch-state row.
    async fn put_resource_local_state(&self, state: ResourceLocalState) -> Result<()>;

    /// Local filesystem path to a Resource's blob content, for upload.
    async fn resource_blob_path(&self, resource_id: &str) -> Result<Option<String>>;

    /// Total count of locally-known Master Keys (used to detect "first
    /// Master Key observed" for §4.1 Phase 3 step on auto-enabling
    /// encryption).
    async fn master_key_count(&self) -> Result<usize>;

    /// All note ids whose parent folder is `folder_id` (used when a Folder
    /// delete-local is deferred, §4.1 Phase 3 step 6).
    async fn note_ids_in_folder(&self, folder_id: &str) -> Result<Vec<String>>;

    /// Delete every Sync Item row whose item no longer exists locally
    /// (§4.1 Phase 3 step 7, "purge orphaned Sync Item rows").
    async fn purge_orphaned_sync_items(&self, sync_target_id: i64) -> Result<usize>;
}
