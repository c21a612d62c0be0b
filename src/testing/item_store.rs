//! In-memory [`ItemStore`] double. Test-only.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::collaborators::{ChangeSource, ItemStore, SyncBatch};
use crate::error::Result;
use crate::model::{DeletedItem, Item, ResourceLocalState, SyncItem};

#[derive(Default)]
struct State {
    items: HashMap<String, Item>,
    sync_items: HashMap<(i64, String), SyncItem>,
    deleted_items: HashMap<i64, Vec<DeletedItem>>,
    resource_states: HashMap<String, ResourceLocalState>,
    resource_blob_paths: HashMap<String, String>,
    master_key_count: usize,
    conflicts_folder_id: String,
}

pub struct InMemoryItemStore {
    state: Mutex<State>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        let mut state = State::default();
        state.conflicts_folder_id = "conflicts-folder".to_string();
        Self {
            state: Mutex::new(state),
        }
    }

    /// Seed a local item directly (bypassing sync bookkeeping), for test
    /// setup.
    pub fn seed_item(&self, item: Item) {
        self.state.lock().items.insert(item.id.clone(), item);
    }

    pub fn seed_sync_time(&self, sync_target_id: i64, item_id: &str, sync_time: i64) {
        let mut state = self.state.lock();
        state.sync_items.insert(
            (sync_target_id, item_id.to_string()),
            SyncItem {
                item_id: item_id.to_string(),
                sync_target_id,
                sync_time,
                sync_disabled: false,
                sync_disabled_reason: None,
            },
        );
    }

    pub fn seed_deleted(&self, sync_target_id: i64, deleted: DeletedItem) {
        self.state
            .lock()
            .deleted_items
            .entry(sync_target_id)
            .or_default()
            .push(deleted);
    }

    pub fn seed_resource_blob_path(&self, resource_id: &str, path: &str) {
        self.state
            .lock()
            .resource_blob_paths
            .insert(resource_id.to_string(), path.to_string());
    }

    pub fn conflicts_folder_id(&self) -> String {
        self.state.lock().conflicts_folder_id.clone()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.state.lock().items.contains_key(item_id)
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn next_sync_batch(&self, sync_target_id: i64) -> Result<SyncBatch> {
        let state = self.state.lock();
        let mut items = Vec::new();
        let mut never_synced_ids = Vec::new();
        for item in state.items.values() {
            let key = (sync_target_id, item.id.clone());
            match state.sync_items.get(&key) {
                None => {
                    never_synced_ids.push(item.id.clone());
                    items.push(item.clone());
                }
                Some(sync_item) if sync_item.sync_disabled => {}
                Some(sync_item) if sync_item.sync_time < item.updated_time => {
                    items.push(item.clone());
                }
                Some(_) => {}
            }
        }
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(SyncBatch {
            items,
            never_synced_ids,
            has_more: false,
        })
    }

    async fn set_sync_time(&self, sync_target_id: i64, item_id: &str, sync_time: i64) -> Result<()> {
        let mut state = self.state.lock();
        let key = (sync_target_id, item_id.to_string());
        state
            .sync_items
            .entry(key)
            .and_modify(|s| s.sync_time = sync_time)
            .or_insert(SyncItem {
                item_id: item_id.to_string(),
                sync_target_id,
                sync_time,
                sync_disabled: false,
                sync_disabled_reason: None,
            });
        Ok(())
    }

    async fn disable_sync(&self, sync_target_id: i64, item_id: &str, reason: &str) -> Result<()> {
        let mut state = self.state.lock();
        let key = (sync_target_id, item_id.to_string());
        state
            .sync_items
            .entry(key)
            .and_modify(|s| s.disable(reason))
            .or_insert_with(|| {
                let mut s = SyncItem::never_synced(item_id, sync_target_id);
                s.disable(reason);
                s
            });
        Ok(())
    }

    async fn sync_item(&self, sync_target_id: i64, item_id: &str) -> Result<Option<SyncItem>> {
        Ok(self
            .state
            .lock()
            .sync_items
            .get(&(sync_target_id, item_id.to_string()))
            .cloned())
    }

    async fn get_item(&self, item_id: &str) -> Result<Option<Item>> {
        Ok(self.state.lock().items.get(item_id).cloned())
    }

    async fn put_item(&self, item: Item, _change_source: ChangeSource) -> Result<()> {
        self.state.lock().items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn delete_item(&self, item_id: &str, track_deleted: bool) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(item) = state.items.remove(item_id) {
            if track_deleted {
                let sync_target_ids: Vec<i64> = state
                    .sync_items
                    .keys()
                    .filter(|(_, id)| id == item_id)
                    .map(|(target, _)| *target)
                    .collect();
                for target in sync_target_ids {
                    state.deleted_items.entry(target).or_default().push(DeletedItem {
                        item_id: item_id.to_string(),
                        item_type: item.type_,
                        sync_target_id: target,
                    });
                }
            }
        }
        Ok(())
    }

    async fn duplicate_to_conflicts(&self, item: &Item) -> Result<String> {
        let mut state = self.state.lock();
        let new_id = Uuid::new_v4().to_string();
        let mut duplicate = item.clone();
        duplicate.id = new_id.clone();
        if let Some(obj) = duplicate.data.as_object_mut() {
            obj.insert(
                "parent_id".to_string(),
                serde_json::Value::String(state.conflicts_folder_id.clone()),
            );
            obj.insert("is_conflict".to_string(), serde_json::Value::Bool(true));
        }
        state.items.insert(new_id.clone(), duplicate);
        Ok(new_id)
    }

    async fn deleted_items(&self, sync_target_id: i64) -> Result<Vec<DeletedItem>> {
        Ok(self
            .state
            .lock()
            .deleted_items
            .get(&sync_target_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn consume_deleted_item(&self, sync_target_id: i64, item_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(list) = state.deleted_items.get_mut(&sync_target_id) {
            list.retain(|d| d.item_id != item_id);
        }
        Ok(())
    }

    async fn resource_local_state(&self, resource_id: &str) -> Result<Option<ResourceLocalState>> {
        Ok(self.state.lock().resource_states.get(resource_id).cloned())
    }

    async fn put_resource_local_state(&self, state: ResourceLocalState) -> Result<()> {
        self.state
            .lock()
            .resource_states
            .insert(state.resource_id.clone(), state);
        Ok(())
    }

    async fn resource_blob_path(&self, resource_id: &str) -> Result<Option<String>> {
        Ok(self.state.lock().resource_blob_paths.get(resource_id).cloned())
    }

    async fn master_key_count(&self) -> Result<usize> {
        Ok(self.state.lock().master_key_count)
    }

    async fn note_ids_in_folder(&self, folder_id: &str) -> Result<Vec<String>> {
        let state = self.state.lock();
        Ok(state
            .items
            .values()
            .filter(|item| {
                item.type_ == crate::model::ItemType::Note
                    && item.data.get("parent_id").and_then(|v| v.as_str()) == Some(folder_id)
            })
            .map(|item| item.id.clone())
            .collect())
    }

    async fn purge_orphaned_sync_items(&self, sync_target_id: i64) -> Result<usize> {
        let mut state = self.state.lock();
        let orphans: Vec<String> = state
            .sync_items
            .keys()
            .filter(|(target, id)| *target == sync_target_id && !state.items.contains_key(id))
            .map(|(_, id)| id.clone())
            .collect();
        for id in &orphans {
            state.sync_items.remove(&(sync_target_id, id.clone()));
        }
        Ok(orphans.len())
    }
}

impl InMemoryItemStore {
    pub fn set_master_key_count(&self, count: usize) {
        self.state.lock().master_key_count = count;
    }
}
