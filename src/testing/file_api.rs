//! In-memory [`FileApi`] double. Test-only: never compiled into a
//! production build.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::collaborators::{DeltaOptions, DeltaPage, FileApi, PutOptions};
use crate::error::{Result, SyncError};
use crate::model::{ItemType, RemoteItem};

struct Object {
    content: Vec<u8>,
    updated_time: i64,
    jop_updated_time: Option<i64>,
}

pub struct InMemoryFileApi {
    sync_target_id: i64,
    supports_accurate_timestamp: bool,
    supports_multi_put: bool,
    clock: AtomicI64,
    objects: Mutex<HashMap<String, Object>>,
    delta_pages: Mutex<VecDeque<DeltaPage>>,
    last_requests: Mutex<Vec<String>>,
}

impl InMemoryFileApi {
    pub fn new(sync_target_id: i64) -> Self {
        Self {
            sync_target_id,
            supports_accurate_timestamp: true,
            supports_multi_put: false,
            clock: AtomicI64::new(1),
            objects: Mutex::new(HashMap::new()),
            delta_pages: Mutex::new(VecDeque::new()),
            last_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_multi_put(sync_target_id: i64) -> Self {
        let api = Self::new(sync_target_id);
        Self {
            supports_multi_put: true,
            ..api
        }
    }

    pub fn without_accurate_timestamp(sync_target_id: i64) -> Self {
        let api = Self::new(sync_target_id);
        Self {
            supports_accurate_timestamp: false,
            ..api
        }
    }

    /// Advance the fake wall clock; every `put` after this call stamps
    /// `updated_time` at the new value.
    pub fn advance_clock(&self, to: i64) {
        self.clock.store(to, Ordering::SeqCst);
    }

    /// Seed raw content at `path` without going through `put`, for tests
    /// that only care about `get`/`delta` plumbing (e.g. the download
    /// queue).
    pub fn seed_content(&self, path: &str, content: Vec<u8>) {
        let now = self.clock.load(Ordering::SeqCst);
        self.objects.lock().insert(
            path.to_string(),
            Object {
                content,
                updated_time: now,
                jop_updated_time: Some(now),
            },
        );
    }

    /// Seed content plus an explicit `jop_updated_time`, used to exercise
    /// the "accurate timestamp" skip-if-unchanged optimization.
    pub fn seed_item(&self, path: &str, content: Vec<u8>, updated_time: i64, jop_updated_time: i64) {
        self.objects.lock().insert(
            path.to_string(),
            Object {
                content,
                updated_time,
                jop_updated_time: Some(jop_updated_time),
            },
        );
    }

    /// Queue a page to be returned by the next `delta` call, in FIFO order.
    pub fn queue_delta_page(&self, page: DeltaPage) {
        self.delta_pages.lock().push_back(page);
    }

    pub fn remove(&self, path: &str) {
        self.objects.lock().remove(path);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().contains_key(path)
    }
}

#[async_trait]
impl FileApi for InMemoryFileApi {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn set_temp_dir_name(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<Option<RemoteItem>> {
        self.last_requests.lock().push(format!("stat {path}"));
        let objects = self.objects.lock();
        Ok(objects.get(path).map(|o| RemoteItem {
            id: path.trim_end_matches(".md").to_string(),
            path: path.to_string(),
            // Placeholder: lock/version files stat through this same path,
            // and their type is never inspected by callers.
            type_: ItemType::Note,
            is_deleted: false,
            updated_time: o.updated_time,
            jop_updated_time: o.jop_updated_time,
        }))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.last_requests.lock().push(format!("get {path}"));
        let objects = self.objects.lock();
        objects
            .get(path)
            .map(|o| o.content.clone())
            .ok_or_else(|| SyncError::FileNotFound(path.to_string()))
    }

    async fn put(&self, path: &str, content: &[u8], _options: PutOptions) -> Result<()> {
        self.last_requests.lock().push(format!("put {path}"));
        let now = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.objects.lock().insert(
            path.to_string(),
            Object {
                content: content.to_vec(),
                updated_time: now,
                jop_updated_time: Some(now),
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.last_requests.lock().push(format!("delete {path}"));
        self.objects.lock().remove(path);
        Ok(())
    }

    async fn delta(&self, _options: DeltaOptions<'_>) -> Result<DeltaPage> {
        let mut pages = self.delta_pages.lock();
        Ok(pages.pop_front().unwrap_or_default())
    }

    fn sync_target_id(&self) -> i64 {
        self.sync_target_id
    }

    fn supports_accurate_timestamp(&self) -> bool {
        self.supports_accurate_timestamp
    }

    fn supports_multi_put(&self) -> bool {
        self.supports_multi_put
    }

    fn last_requests(&self) -> Vec<String> {
        self.last_requests.lock().clone()
    }
}
