//! Download Queue (§4.5) — bounded-concurrency fetcher for delta-phase
//! content, keyed by remote path, with resumable futures consumable by the
//! processing loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::collaborators::FileApi;
use crate::error::{Result, SyncError};

/// Outcome of one job, mirroring the `{result, error}` shape `waitForResult`
/// returns in the spec.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub result: Option<Arc<Vec<u8>>>,
    pub error: Option<String>,
}

pub struct DownloadQueue {
    file_api: Arc<dyn FileApi>,
    semaphore: Arc<Semaphore>,
    jobs: Mutex<HashMap<String, JoinHandle<JobOutcome>>>,
    stopped: AtomicBool,
}

impl DownloadQueue {
    /// `max_concurrency` bounds how many `get` calls run at once.
    pub fn new(file_api: Arc<dyn FileApi>, max_concurrency: usize) -> Self {
        Self {
            file_api,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            jobs: Mutex::new(HashMap::new()),
            stopped: AtomicBool::new(false),
        }
    }

    /// Enqueue a fetch for `path`, keyed by `key`. Jobs start eagerly;
    /// re-pushing the same key is a no-op if a job is already in flight or
    /// memoized. Does nothing once [`Self::stop`] has been called — already
    /// running fetches are left to finish (§4.5).
    pub fn push(&self, key: String, path: String) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        let mut jobs = self.jobs.lock();
        if jobs.contains_key(&key) {
            return;
        }
        let file_api = Arc::clone(&self.file_api);
        let semaphore = Arc::clone(&self.semaphore);
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            match file_api.get(&path).await {
                Ok(bytes) => JobOutcome {
                    result: Some(Arc::new(bytes)),
                    error: None,
                },
                Err(e) => JobOutcome {
                    result: None,
                    error: Some(e.to_string()),
                },
            }
        });
        jobs.insert(key, handle);
    }

    /// Wait for the job keyed by `key` to complete. The result is memoized
    /// only until it is consumed here — per §4.5 ("results are memoized per
    /// key until consumed") — after which the key is removed; a second call
    /// for the same key is an error, matching the processing loop's
    /// exactly-once `wait_for_result` per remote in delta (§4.1 Phase 3).
    pub async fn wait_for_result(&self, key: &str) -> Result<JobOutcome> {
        let handle = {
            let mut jobs = self.jobs.lock();
            jobs.remove(key)
        };
        let Some(handle) = handle else {
            return Err(SyncError::other(format!("no queued job for key {key}"), false));
        };
        let outcome = handle
            .await
            .map_err(|e| SyncError::other(format!("download task panicked: {e}"), false))?;
        Ok(outcome)
    }

    /// Halt scheduling of new jobs; already-issued fetches are left to
    /// complete so their results remain consumable (§4.5, §5 cancellation
    /// semantics).
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
