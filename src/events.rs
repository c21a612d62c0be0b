//! Domain events dispatched by the synchronizer (§6 "Events dispatched").

use crate::progress::ProgressSnapshot;

#[derive(Debug, Clone)]
pub enum SyncEvent {
    SyncStarted,
    SyncReportUpdate(ProgressSnapshot),
    SyncHasDisabledSyncItems,
    SyncGotEncryptedItem,
    SyncCreatedOrUpdatedResource { id: String },
    SyncCompleted { is_full_sync: bool, with_errors: bool },
}

/// Subscriber callback type, mirroring `SyncManagerOptions.on_progress` /
/// the teacher's `Arc<dyn Fn(...) + Send + Sync>` event-bus pattern.
pub type EventCallback = std::sync::Arc<dyn Fn(&SyncEvent) + Send + Sync>;
