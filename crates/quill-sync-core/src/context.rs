//! Delta continuation ("Sync Context", §3) persistence codec.
//!
//! The continuation handed back by the remote target's `delta` operation is
//! opaque to the engine. It is persisted via a caller-supplied hook between
//! pages so an interrupted sync resumes without re-scanning (§3 invariant:
//! "the persisted delta context is the one from the previous completed
//! page, never the in-flight one").

use serde::{Deserialize, Serialize};

use crate::error::SyncCoreError;

/// A continuation token opaque to the engine, plus in-process-only derived
/// state that must never reach the persisted form.
///
/// `derived` is `#[serde(skip)]` so "strip large derived caches before
/// persistence" (§3) is structural: encoding a [`SyncContext`] can only ever
/// emit `continuation`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncContext {
    /// The backend-opaque continuation value (its shape is defined entirely
    /// by the `FileApi::delta` implementation).
    pub continuation: serde_json::Value,

    /// Large caches rebuilt cheaply from `continuation` (e.g. a known-id
    /// set used only by `allItemIdsHandler`). Never serialized.
    #[serde(skip)]
    pub derived: Option<serde_json::Value>,
}

impl SyncContext {
    pub fn new(continuation: serde_json::Value) -> Self {
        Self {
            continuation,
            derived: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.continuation.is_null()
    }
}

/// Encode a [`SyncContext`] for the `saveContextHandler` callback.
///
/// Only `continuation` survives; `derived` is dropped by construction.
pub fn encode_context(context: &SyncContext) -> Result<Vec<u8>, SyncCoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(context, &mut buf)
        .map_err(|e| SyncCoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

/// Decode a previously-persisted context (the `options.context` input to
/// `Synchronizer::start`).
pub fn decode_context(bytes: &[u8]) -> Result<SyncContext, SyncCoreError> {
    ciborium::from_reader(bytes).map_err(|e| SyncCoreError::CborDecode(e.to_string()))
}
