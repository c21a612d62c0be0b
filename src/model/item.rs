use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use quill_sync_core::ItemType;

/// A local item (§3 "Item") — polymorphic over [`ItemType`].
///
/// Variant-specific attributes live in `data`; the fields promoted to the
/// struct are the ones every variant carries and that the orchestrator
/// itself inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(rename = "type_")]
    pub type_: ItemType,
    pub updated_time: i64,
    pub created_time: i64,
    pub user_updated_time: i64,
    pub user_created_time: i64,
    pub encryption_applied: bool,
    pub share_id: Option<String>,
    /// Variant-specific payload (title, body, parent_id, mime_type, ...).
    #[serde(flatten)]
    pub data: Value,
}

impl Item {
    /// Backfill `user_updated_time`/`user_created_time` from the
    /// client-assigned timestamps when the remote payload omitted them
    /// (§4.1 Phase 3, `createLocal`/`updateLocal`).
    pub fn backfill_user_timestamps(&mut self) {
        if self.user_updated_time == 0 {
            self.user_updated_time = self.updated_time;
        }
        if self.user_created_time == 0 {
            self.user_created_time = self.created_time;
        }
    }
}
