use serde::{Deserialize, Serialize};

/// Per-(target, item) sync bookkeeping (§3 "Sync Item").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncItem {
    pub item_id: String,
    pub sync_target_id: i64,
    /// Millisecond epoch of the last successful upload of this item to this
    /// target. `0` marks a never-synced item.
    pub sync_time: i64,
    pub sync_disabled: bool,
    pub sync_disabled_reason: Option<String>,
}

impl SyncItem {
    pub fn never_synced(item_id: impl Into<String>, sync_target_id: i64) -> Self {
        Self {
            item_id: item_id.into(),
            sync_target_id,
            sync_time: 0,
            sync_disabled: false,
            sync_disabled_reason: None,
        }
    }

    pub fn is_never_synced(&self) -> bool {
        self.sync_time == 0
    }

    pub fn disable(&mut self, reason: impl Into<String>) {
        self.sync_disabled = true;
        self.sync_disabled_reason = Some(reason.into());
    }
}

/// A pending local deletion (§3 "Deleted Item").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedItem {
    pub item_id: String,
    pub item_type: super::ItemType,
    pub sync_target_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_synced_has_zero_sync_time() {
        let item = SyncItem::never_synced("abc", 1);
        assert!(item.is_never_synced());
    }

    #[test]
    fn disable_records_reason() {
        let mut item = SyncItem::never_synced("abc", 1);
        item.disable("exceeds maxResourceSize");
        assert!(item.sync_disabled);
        assert_eq!(item.sync_disabled_reason.as_deref(), Some("exceeds maxResourceSize"));
    }
}
