//! The Synchronizer (§4.1) — orchestrates the three-phase sync protocol
//! (UPLOAD, DELETE_REMOTE, DELTA) against the collaborator traits in
//! [`crate::collaborators`].

mod delete_remote;
mod delta;
mod options;
mod upload;

pub use options::{SaveContextHandler, StartOptions, SyncStep};
#[cfg(any(test, feature = "test-support"))]
pub use options::TestHook;

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{info, warn};

use quill_sync_core::SyncContext;

use crate::collaborators::{EncryptionService, FileApi, ItemStore, ShareService};
use crate::error::{classify, ErrorDisposition, Result, SyncError};
use crate::events::SyncEvent;
use crate::lock::{Lock, LockHandler, LockKind};
use crate::migration::MigrationHandler;
use crate::progress::{ProgressReport, RunCompletion};
use crate::uploader::ItemUploader;

const IDLE: u8 = 0;
const IN_PROGRESS: u8 = 1;

/// Resource size ceiling enforced when the client is `appType = "mobile"`
/// (§8 boundary: "100 MB on mobile, unbounded elsewhere").
pub const MOBILE_MAX_RESOURCE_SIZE: u64 = 100 * 1024 * 1024;

pub struct Synchronizer {
    file_api: Arc<dyn FileApi>,
    item_store: Arc<dyn ItemStore>,
    encryption: Arc<dyn EncryptionService>,
    share: Arc<dyn ShareService>,
    lock_handler: Arc<LockHandler>,
    migration_handler: MigrationHandler,
    uploader: ItemUploader,
    app_type: String,
    client_id: String,
    max_resource_size: Option<u64>,
    wipe_out_fail_safe: Option<usize>,
    download_concurrency: usize,
    state: AtomicU8,
    cancelling: Arc<AtomicBool>,
    lock_lost_reason: Arc<Mutex<Option<String>>>,
    idle_notify: Notify,
    #[cfg(any(test, feature = "test-support"))]
    test_hooks: Vec<options::TestHook>,
}

impl Synchronizer {
    pub fn new(
        file_api: Arc<dyn FileApi>,
        item_store: Arc<dyn ItemStore>,
        encryption: Arc<dyn EncryptionService>,
        share: Arc<dyn ShareService>,
        app_type: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        let lock_handler = Arc::new(LockHandler::new(Arc::clone(&file_api)));
        let migration_handler = MigrationHandler::new(Arc::clone(&file_api), Arc::clone(&lock_handler));
        let uploader = ItemUploader::new(Arc::clone(&file_api));
        Self {
            file_api,
            item_store,
            encryption,
            share,
            lock_handler,
            migration_handler,
            uploader,
            app_type: app_type.into(),
            client_id: client_id.into(),
            max_resource_size: None,
            wipe_out_fail_safe: None,
            download_concurrency: 3,
            state: AtomicU8::new(IDLE),
            cancelling: Arc::new(AtomicBool::new(false)),
            lock_lost_reason: Arc::new(Mutex::new(None)),
            idle_notify: Notify::new(),
            #[cfg(any(test, feature = "test-support"))]
            test_hooks: Vec::new(),
        }
    }

    pub fn with_mobile_resource_limit(mut self) -> Self {
        self.max_resource_size = Some(MOBILE_MAX_RESOURCE_SIZE);
        self
    }

    pub fn with_wipe_out_fail_safe(mut self, threshold: usize) -> Self {
        self.wipe_out_fail_safe = Some(threshold);
        self
    }

    pub fn with_download_concurrency(mut self, n: usize) -> Self {
        self.download_concurrency = n.max(1);
        self
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_test_hooks(mut self, hooks: Vec<options::TestHook>) -> Self {
        self.test_hooks = hooks;
        self
    }

    pub fn is_in_progress(&self) -> bool {
        self.state.load(Ordering::SeqCst) == IN_PROGRESS
    }

    fn is_cancelling(&self) -> bool {
        self.cancelling.load(Ordering::SeqCst)
    }

    /// Idempotent (§4.1 `cancel()`): flips the cooperative flag every
    /// suspension point in the three phases checks, then waits for the run
    /// to reach `idle`.
    pub async fn cancel(&self) {
        self.cancelling.store(true, Ordering::SeqCst);
        self.wait_for_sync_to_finish().await;
    }

    /// §4.1 `waitForSyncToFinish`: returns once `idle`. Implemented as an
    /// async wait on a `Notify`, with a bounded-interval fallback poll
    /// matching the spec's literal "polls state at 1-second intervals" in
    /// case a notification races a fresh `start()`.
    pub async fn wait_for_sync_to_finish(&self) {
        loop {
            if self.state.load(Ordering::SeqCst) == IDLE {
                return;
            }
            tokio::select! {
                _ = self.idle_notify.notified() => {}
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            }
        }
    }

    /// Drives one full run. See §4.1 for the phase breakdown.
    pub async fn start(&self, options: StartOptions) -> Result<SyncContext> {
        if self
            .state
            .compare_exchange(IDLE, IN_PROGRESS, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::AlreadyStarted);
        }
        self.cancelling.store(false, Ordering::SeqCst);
        *self.lock_lost_reason.lock() = None;

        let report = ProgressReport::new(now_ms());
        self.dispatch(&options, SyncEvent::SyncStarted);

        let (lock, result) = self.run_locked(&options, &report).await;
        if let Some(lock) = &lock {
            if let Err(e) = self.lock_handler.release_lock(lock).await {
                warn!("failed to release sync lock on cleanup: {e}");
            }
        }

        let completed_time = now_ms();
        let with_errors = match &result {
            Ok(_) => {
                let completion = if self.is_cancelling() {
                    RunCompletion::Cancelled
                } else {
                    RunCompletion::Completed
                };
                report.finish(completed_time, completion);
                false
            }
            Err(e) => {
                let disposition = classify(e);
                self.apply_disposition(&report, e, disposition);
                report.finish(completed_time, RunCompletion::Failed);
                true
            }
        };

        if let Some(reason) = self.lock_lost_reason.lock().take() {
            self.apply_disposition(&report, &SyncError::LockError(reason), ErrorDisposition::InfoAndReport);
        }

        let is_full_sync = options.sync_steps.len() == 3;
        self.dispatch(
            &options,
            SyncEvent::SyncCompleted {
                is_full_sync,
                with_errors,
            },
        );

        if let Err(e) = self.share.maintenance().await {
            warn!("share maintenance failed: {e}");
        }

        self.state.store(IDLE, Ordering::SeqCst);
        self.idle_notify.notify_waiters();

        if options.throw_on_error {
            result
        } else {
            match result {
                Ok(ctx) => Ok(ctx),
                Err(_) => Ok(options.context.unwrap_or_default()),
            }
        }
    }

    /// Acquires the Sync lock, drives the phases, stops auto-refresh, and
    /// hands the (possibly unacquired) lock back to `start` for release —
    /// Rust has no async `finally`, so the lock-release responsibility is
    /// threaded back through the return value instead.
    async fn run_locked(&self, options: &StartOptions, report: &ProgressReport) -> (Option<Lock>, Result<SyncContext>) {
        let lock = match self
            .lock_handler
            .acquire_lock(LockKind::Sync, &self.app_type, &self.client_id, now_ms())
            .await
        {
            Ok(lock) => lock,
            Err(e) => return (None, Err(e)),
        };

        let cancelling = Arc::clone(&self.cancelling);
        let lock_lost_reason = Arc::clone(&self.lock_lost_reason);
        let refresh_handle = self.lock_handler.start_auto_lock_refresh(
            lock.clone(),
            Arc::new(move |e: SyncError| {
                warn!("lock refresh failed, initiating cancellation: {e}");
                // §4.2: losing the Sync lock sets `syncTargetIsLocked_` and
                // kicks off cancellation; `lock_lost_reason` is what
                // `lockErrorStatus_()` re-wraps a subsequent API error into
                // on the way out of `start` (§7 "Re-wrapping under lock
                // loss"), so a dropped lock never reads as a plain item
                // rejection.
                *lock_lost_reason.lock() = Some(e.to_string());
                cancelling.store(true, Ordering::SeqCst);
            }),
        );

        let result = self.run_phases(options, report).await;
        refresh_handle.stop_auto_lock_refresh().await;

        (Some(lock), result)
    }

    async fn run_phases(&self, options: &StartOptions, report: &ProgressReport) -> Result<SyncContext> {
        self.migration_handler.check_can_sync().await?;

        if options.sync_steps.contains(&SyncStep::UpdateRemote) {
            upload::run(self, options, report).await?;
        }
        if self.is_cancelling() {
            report.set_cancelling(true);
            return Ok(options.context.clone().unwrap_or_default());
        }

        if options.sync_steps.contains(&SyncStep::DeleteRemote) {
            delete_remote::run(self, report).await?;
        }
        if self.is_cancelling() {
            report.set_cancelling(true);
            return Ok(options.context.clone().unwrap_or_default());
        }

        if options.sync_steps.contains(&SyncStep::Delta) {
            return delta::run(self, options, report).await;
        }

        Ok(options.context.clone().unwrap_or_default())
    }

    fn dispatch(&self, options: &StartOptions, event: SyncEvent) {
        if let Some(cb) = &options.on_event {
            cb(&event);
        }
    }

    fn report_progress(&self, options: &StartOptions, report: &ProgressReport) {
        self.dispatch(options, SyncEvent::SyncReportUpdate(report.snapshot()));
    }

    /// Implements §7's classification ladder for a terminal `start()` error.
    fn apply_disposition(&self, report: &ProgressReport, err: &SyncError, disposition: ErrorDisposition) {
        match disposition {
            ErrorDisposition::InfoOnly => info!("{err}"),
            ErrorDisposition::InfoAndReport => {
                info!("{err}");
                report.push_error(err.to_string());
                for request in self.file_api.last_requests() {
                    info!(request = %request, "recent request dumped after reported error");
                }
            }
            ErrorDisposition::UpgradeRequired => {
                tracing::error!("{err}");
                report.push_error("please upgrade to continue syncing".to_string());
            }
            ErrorDisposition::ReportIfNonRetryable => {
                tracing::error!("{err}");
                if !err.is_retryable() {
                    report.push_error(err.to_string());
                }
            }
            ErrorDisposition::PerItem => {
                // Per-item errors are normally reclassified inside the phase
                // loops before reaching this far; handle defensively if one
                // still does.
                warn!("{err}");
                report.push_error(err.to_string());
            }
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
