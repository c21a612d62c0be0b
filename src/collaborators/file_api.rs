//! The File API contract (§6) — every remote storage backend the engine can
//! target conforms to this trait. No backend is implemented here; production
//! code only ever holds an `Arc<dyn FileApi>` supplied by the caller.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::RemoteItem;

/// Options accepted by [`FileApi::put`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Stream from a local file path instead of an in-memory buffer
    /// (used for large Resource blobs).
    pub source_file_path: Option<String>,
    pub share_id: Option<String>,
}

/// One page of a paginated delta listing.
#[derive(Debug, Clone, Default)]
pub struct DeltaPage {
    pub items: Vec<RemoteItem>,
    /// Opaque continuation for the next page.
    pub context: serde_json::Value,
    pub has_more: bool,
}

/// Options passed to [`FileApi::delta`].
pub struct DeltaOptions<'a> {
    pub context: serde_json::Value,
    /// Supplies the client's known id set, for backends without native
    /// delta support that must diff against it themselves.
    pub all_item_ids: Option<&'a [String]>,
    /// Abort the delta phase if the backend reports more than this many
    /// deletions in one page (§8 "Fail-safe").
    pub wipe_out_fail_safe: Option<usize>,
}

/// Opaque remote storage offering stat/get/put/delete/list/delta operations
/// over string paths (§6).
#[async_trait]
pub trait FileApi: Send + Sync {
    /// Idempotent setup; creates directory scaffolding.
    async fn initialize(&self) -> Result<()>;

    /// Configures a scratch directory under the target root.
    async fn set_temp_dir_name(&self, name: &str) -> Result<()>;

    /// Returns metadata or `None` if absent.
    async fn stat(&self, path: &str) -> Result<Option<RemoteItem>>;

    /// Retrieves serialized content.
    async fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Writes content, or streams from a local file when `options.source_file_path`
    /// is set (large Resource blobs).
    async fn put(&self, path: &str, content: &[u8], options: PutOptions) -> Result<()>;

    /// Removes a remote object; idempotent on missing.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Paginated change list with opaque continuation.
    async fn delta(&self, options: DeltaOptions<'_>) -> Result<DeltaPage>;

    /// Stable identifier of this backend.
    fn sync_target_id(&self) -> i64;

    /// Whether `jop_updated_time` in listing output exactly equals the
    /// client-written `updated_time`.
    fn supports_accurate_timestamp(&self) -> bool;

    /// Whether batched multi-item upload is available.
    fn supports_multi_put(&self) -> bool;

    /// Optional diagnostics buffer, dumped when a fail-safe or lock error
    /// is reported (§7).
    fn last_requests(&self) -> Vec<String> {
        Vec::new()
    }
}
