//! Options accepted by [`super::Synchronizer::start`] (§4.1).

use std::sync::Arc;

use async_trait::async_trait;
use quill_sync_core::SyncContext;

use crate::error::Result;
use crate::events::EventCallback;

/// Which of the three phases to run, in the fixed order UPLOAD →
/// DELETE_REMOTE → DELTA. [`StartOptions::default`] runs all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    UpdateRemote,
    DeleteRemote,
    Delta,
}

/// Caller hook for persisting the delta continuation between pages (§3,
/// §4.1 Phase 3 step 5). A trait rather than a plain `Fn` so the persistence
/// itself can be async (writing to a settings store, a database row, ...).
#[async_trait]
pub trait SaveContextHandler: Send + Sync {
    async fn save(&self, context: &SyncContext) -> Result<()>;
}

pub struct StartOptions {
    /// Subscriber for every dispatched [`crate::events::SyncEvent`],
    /// including `SyncReportUpdate` snapshots.
    pub on_event: Option<EventCallback>,
    /// The previous run's output context, if resuming.
    pub context: Option<SyncContext>,
    pub sync_steps: Vec<SyncStep>,
    /// Testing mode: re-raise the run's terminal error instead of swallowing
    /// it after cleanup (§7 "Classification policy inside start").
    pub throw_on_error: bool,
    pub save_context_handler: Option<Arc<dyn SaveContextHandler>>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            on_event: None,
            context: None,
            sync_steps: vec![SyncStep::UpdateRemote, SyncStep::DeleteRemote, SyncStep::Delta],
            throw_on_error: false,
            save_context_handler: None,
        }
    }
}

/// Typed test-hook whitelist (§9 design note: promote the hook-name strings
/// to an enum). Consulted only when the Synchronizer was constructed via
/// `with_test_hooks`, itself gated behind this same feature.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestHook {
    /// Start cancelling as soon as the named delta page finishes processing.
    CancelDeltaLoopAfterPage(u32),
    /// Force every upload to fail as if the backend rejected it.
    RejectAllUploads,
    /// Ignore Revision items during the delta phase.
    SkipRevisions,
}
