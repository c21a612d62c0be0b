//! Wire-format glue shared by the sync engine.
//!
//! Kept as a separate crate (mirroring `less-sync-core` in the wider
//! workspace this engine was split out of) so the path conventions and the
//! delta-context codec can be depended on without pulling in the whole
//! orchestrator.

pub mod context;
pub mod error;
pub mod item_type;
pub mod path;

pub use context::{decode_context, encode_context, SyncContext};
pub use error::SyncCoreError;
pub use item_type::ItemType;
pub use path::{
    has_blob_sidecar, is_system_path, item_id_from_path, resource_blob_path, system_path,
    RESOURCES_DIR, SYNC_DIR,
};
