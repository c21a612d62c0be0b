//! Lock Handler (§4.2) — distributed locking on the remote target.
//!
//! Two lock kinds: Sync (client-identified, refreshable, many clients may
//! hold one concurrently) and Exclusive (mutually exclusive with every
//! other lock, held by migration/upgrade). The handler itself never touches
//! the network directly beyond the [`FileApi`] it's given — a lock is just
//! a file under `.sync/` whose presence and timestamp this module
//! interprets.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::collaborators::{FileApi, PutOptions};
use crate::error::{Result, SyncError};
use quill_sync_core::SYNC_DIR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKind {
    Sync,
    Exclusive,
}

impl LockKind {
    fn file_prefix(&self) -> &'static str {
        match self {
            LockKind::Sync => "sync",
            LockKind::Exclusive => "exclusive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lock {
    pub kind: LockKind,
    pub app_type: String,
    pub client_id: String,
    pub acquired_at: i64,
}

impl Lock {
    fn path(&self) -> String {
        match self.kind {
            // Exclusive is a singleton: only one can ever exist, so its
            // path carries no client identity.
            LockKind::Exclusive => format!("{SYNC_DIR}/locks/exclusive"),
            LockKind::Sync => format!(
                "{SYNC_DIR}/locks/{}_{}_{}",
                self.kind.file_prefix(),
                self.app_type,
                self.client_id
            ),
        }
    }
}

fn exclusive_lock_path() -> String {
    format!("{SYNC_DIR}/locks/exclusive")
}

fn sync_lock_path(app_type: &str, client_id: &str) -> String {
    format!("{SYNC_DIR}/locks/sync_{app_type}_{client_id}")
}

/// Lock expiry: a lock not refreshed within this window is considered gone.
pub const LOCK_TTL_MS: i64 = 60_000;

/// How often `start_auto_lock_refresh` rewrites the lock's timestamp.
pub const LOCK_REFRESH_INTERVAL: Duration = Duration::from_secs(20);

pub struct LockHandler {
    file_api: Arc<dyn FileApi>,
}

impl LockHandler {
    pub fn new(file_api: Arc<dyn FileApi>) -> Self {
        Self { file_api }
    }

    pub async fn acquire_lock(
        &self,
        kind: LockKind,
        app_type: &str,
        client_id: &str,
        now: i64,
    ) -> Result<Lock> {
        // Exclusive is mutually exclusive with every other lock, of either
        // kind (§4.2); a Sync lock only needs to check for Exclusive, since
        // other clients' Sync locks are allowed to overlap.
        if self.exclusive_lock_is_active(now).await? {
            return Err(SyncError::LockError("hasExclusiveLock".into()));
        }
        if kind == LockKind::Exclusive && self.sync_lock_is_active(app_type, client_id, now).await? {
            return Err(SyncError::LockError("hasActiveLock".into()));
        }

        let lock = Lock {
            kind,
            app_type: app_type.to_string(),
            client_id: client_id.to_string(),
            acquired_at: now,
        };
        self.write_lock(&lock).await?;
        Ok(lock)
    }

    pub async fn release_lock(&self, lock: &Lock) -> Result<()> {
        self.file_api.delete(&lock.path()).await
    }

    pub async fn refresh_lock(&self, lock: &Lock, now: i64) -> Result<Lock> {
        let refreshed = Lock {
            acquired_at: now,
            ..lock.clone()
        };
        self.write_lock(&refreshed).await?;
        Ok(refreshed)
    }

    /// Whether this lock (identified by kind/app_type/client_id) is present
    /// on the remote target and not expired.
    pub async fn has_active_lock(
        &self,
        kind: LockKind,
        app_type: &str,
        client_id: &str,
        now: i64,
    ) -> Result<bool> {
        match kind {
            LockKind::Exclusive => self.exclusive_lock_is_active(now).await,
            LockKind::Sync => self.lock_fresh_at(&sync_lock_path(app_type, client_id), now).await,
        }
    }

    async fn exclusive_lock_is_active(&self, now: i64) -> Result<bool> {
        self.lock_fresh_at(&exclusive_lock_path(), now).await
    }

    async fn sync_lock_is_active(&self, app_type: &str, client_id: &str, now: i64) -> Result<bool> {
        self.lock_fresh_at(&sync_lock_path(app_type, client_id), now).await
    }

    async fn lock_fresh_at(&self, path: &str, now: i64) -> Result<bool> {
        let Some(remote) = self.file_api.stat(path).await? else {
            return Ok(false);
        };
        Ok(now - remote.updated_time < LOCK_TTL_MS)
    }

    async fn write_lock(&self, lock: &Lock) -> Result<()> {
        let payload = format!("{}", lock.acquired_at);
        self.file_api
            .put(&lock.path(), payload.as_bytes(), PutOptions::default())
            .await
    }

    /// Start a background task that rewrites the lock's timestamp every
    /// [`LOCK_REFRESH_INTERVAL`]. On refresh failure, `on_error` fires once
    /// and the task exits.
    pub fn start_auto_lock_refresh(
        self: &Arc<Self>,
        lock: Lock,
        on_error: Arc<dyn Fn(SyncError) + Send + Sync>,
    ) -> AutoRefreshHandle {
        let stop = Arc::new(Notify::new());
        let handler = Arc::clone(self);
        let stop_for_task = Arc::clone(&stop);
        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(LOCK_REFRESH_INTERVAL) => {}
                    _ = stop_for_task.notified() => break,
                }
                let now = chrono::Utc::now().timestamp_millis();
                if let Err(e) = handler.refresh_lock(&lock, now).await {
                    on_error(e);
                    break;
                }
            }
        });
        AutoRefreshHandle { stop, join }
    }
}

/// Handle returned by [`LockHandler::start_auto_lock_refresh`];
/// `stop_auto_lock_refresh` is just dropping/awaiting this.
pub struct AutoRefreshHandle {
    stop: Arc<Notify>,
    join: JoinHandle<()>,
}

impl AutoRefreshHandle {
    pub async fn stop_auto_lock_refresh(self) {
        self.stop.notify_one();
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryFileApi;

    #[tokio::test]
    async fn acquire_and_release_round_trips() {
        let api: Arc<dyn FileApi> = Arc::new(InMemoryFileApi::new(1));
        let handler = LockHandler::new(api);
        let lock = handler
            .acquire_lock(LockKind::Sync, "desktop", "client-a", 1000)
            .await
            .unwrap();
        handler.release_lock(&lock).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_bumps_timestamp() {
        let api: Arc<dyn FileApi> = Arc::new(InMemoryFileApi::new(1));
        let handler = LockHandler::new(api);
        let lock = handler
            .acquire_lock(LockKind::Sync, "desktop", "client-a", 1000)
            .await
            .unwrap();
        let refreshed = handler.refresh_lock(&lock, 2000).await.unwrap();
        assert_eq!(refreshed.acquired_at, 2000);
    }
}
