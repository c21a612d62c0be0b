//! Error kinds surfaced by the synchronizer (§7).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors the core can raise. Most of these are *not* fatal to a run — see
/// [`classify`] for how `Synchronizer::start` reacts to each one.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A second `start()` was called while a run was already `in_progress`.
    #[error("sync already started")]
    AlreadyStarted,

    /// The sync lock could not be honored: either our own lock was lost, or
    /// another client is holding an Exclusive lock.
    #[error("lock error: {0}")]
    LockError(String),

    /// The remote target reports a layout version newer than this client
    /// understands.
    #[error("remote target is on a newer layout version than this client supports")]
    OutdatedSyncTarget,

    /// Safety net: the same remote path was about to be processed twice in
    /// one UPLOAD phase.
    #[error("path processed twice in a single upload pass: {0}")]
    ProcessingPathTwice(String),

    /// The delta driver reported a suspiciously large deletion set.
    #[error("fail-safe triggered: {reported} deletions exceeds threshold {threshold}")]
    FailSafe { reported: usize, threshold: usize },

    /// An item that is already encrypted was asked to be encrypted again.
    #[error("item is already encrypted")]
    CannotEncryptEncrypted,

    /// Encryption is enabled but no master key is active yet.
    #[error("no active master key")]
    NoActiveMasterKey,

    /// A remote item's `type_` does not match any known [`crate::model::ItemType`].
    #[error("unknown item type: {0}")]
    UnknownItemType(String),

    /// The backend refused a write (size cap, forbidden characters, quota).
    #[error("rejected by target: {0}")]
    RejectedByTarget(String),

    /// `get`/`stat` addressed a path that does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// A transport-level timeout. `retryable` mirrors the transport's own
    /// classification so callers can tell a momentary blip from a hard
    /// failure without inspecting the message text.
    #[error("request timed out")]
    Timeout { retryable: bool },

    /// Bubbled up from [`quill_sync_core`].
    #[error(transparent)]
    Core(#[from] quill_sync_core::SyncCoreError),

    /// Anything else, tagged with whether the transport declared it
    /// retryable (§7: "pushed to report.errors only if the transport
    /// declares it non-retryable").
    #[error("{message}")]
    Other { message: String, retryable: bool },
}

impl SyncError {
    pub fn other(message: impl Into<String>, retryable: bool) -> Self {
        SyncError::Other {
            message: message.into(),
            retryable,
        }
    }

    /// Whether a failing API call for one item should be reclassified as a
    /// per-item `cannotSyncItem` rather than aborting the whole run (§7).
    pub fn is_per_item_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::RejectedByTarget(_) | SyncError::Timeout { .. }
        )
    }

    /// Whether the transport/driver declared this error retryable, i.e. it
    /// should be swallowed rather than surfaced in `report.errors` (§7).
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Timeout { retryable } => *retryable,
            SyncError::Other { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

/// How `Synchronizer::start`'s outer error ladder should react to a given
/// [`SyncError`] (§7 "Classification policy inside `start`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Log at info level; not fatal, not user-visible.
    InfoOnly,
    /// Log at info level, not fatal, but push a message into `report.errors`
    /// and dump recent requests.
    InfoAndReport,
    /// Log fully and push a "please upgrade" style message.
    UpgradeRequired,
    /// Log; push to `report.errors` only if the error is non-retryable.
    ReportIfNonRetryable,
    /// Reclassify as a per-item failure; the item is marked sync-disabled
    /// and the run continues.
    PerItem,
}

/// Pure classification function — kept separate from the orchestration loop
/// so the error ladder is unit-testable on its own (§7 ambient design goal).
pub fn classify(err: &SyncError) -> ErrorDisposition {
    match err {
        SyncError::CannotEncryptEncrypted
        | SyncError::NoActiveMasterKey
        | SyncError::ProcessingPathTwice(_)
        | SyncError::OutdatedSyncTarget => ErrorDisposition::InfoOnly,
        SyncError::FailSafe { .. } | SyncError::LockError(_) => ErrorDisposition::InfoAndReport,
        SyncError::UnknownItemType(_) => ErrorDisposition::UpgradeRequired,
        SyncError::RejectedByTarget(_) | SyncError::Timeout { .. } => ErrorDisposition::PerItem,
        SyncError::AlreadyStarted | SyncError::FileNotFound(_) | SyncError::Core(_) => {
            ErrorDisposition::ReportIfNonRetryable
        }
        SyncError::Other { .. } => ErrorDisposition::ReportIfNonRetryable,
    }
}
