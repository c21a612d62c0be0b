//! Migration Handler (§4.3) — probes target version and upgrades layout
//! when empty or outdated.

use std::sync::Arc;

use crate::collaborators::{FileApi, PutOptions};
use crate::error::{Result, SyncError};
use crate::lock::{LockHandler, LockKind};

/// The layout version this client understands and writes.
pub const CLIENT_SYNC_VERSION: u32 = 3;

const VERSION_PATH: &str = ".sync/version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTargetStatus {
    /// `None` when the target is empty (never initialized by any client).
    pub version: Option<u32>,
}

pub struct MigrationHandler {
    file_api: Arc<dyn FileApi>,
    lock_handler: Arc<LockHandler>,
}

impl MigrationHandler {
    pub fn new(file_api: Arc<dyn FileApi>, lock_handler: Arc<LockHandler>) -> Self {
        Self {
            file_api,
            lock_handler,
        }
    }

    /// Probe the remote target's layout version (§4.3).
    ///
    /// Raises [`SyncError::OutdatedSyncTarget`] if the target is on a newer
    /// version than this client supports.
    pub async fn check_can_sync(&self) -> Result<SyncTargetStatus> {
        let version = match self.file_api.get(VERSION_PATH).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                text.trim().parse::<u32>().ok()
            }
            Err(SyncError::FileNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        if let Some(v) = version {
            if v > CLIENT_SYNC_VERSION {
                return Err(SyncError::OutdatedSyncTarget);
            }
        }

        Ok(SyncTargetStatus { version })
    }

    /// Atomically bootstrap or rewrite the layout, holding the Exclusive
    /// lock for the duration (§4.3).
    pub async fn upgrade(
        &self,
        target_version: u32,
        app_type: &str,
        client_id: &str,
        now: i64,
    ) -> Result<()> {
        let lock = self
            .lock_handler
            .acquire_lock(LockKind::Exclusive, app_type, client_id, now)
            .await?;

        let result = self.write_version(target_version).await;

        self.lock_handler.release_lock(&lock).await?;
        result
    }

    async fn write_version(&self, version: u32) -> Result<()> {
        self.file_api
            .put(VERSION_PATH, version.to_string().as_bytes(), PutOptions::default())
            .await
    }
}
