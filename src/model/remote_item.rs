use serde::{Deserialize, Serialize};

use super::ItemType;

/// An item as returned by `stat`/`list`/`delta` (§3 "Remote Item").
///
/// `updated_time` is the target's own wall-clock mtime and may drift;
/// `jop_updated_time`, when the target advertises `supportsAccurateTimestamp`,
/// is the authoritative client-assigned `updated_time` echoed back exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub path: String,
    #[serde(rename = "type_")]
    pub type_: ItemType,
    pub is_deleted: bool,
    pub updated_time: i64,
    pub jop_updated_time: Option<i64>,
}
