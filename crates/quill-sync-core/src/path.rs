//! Remote path conventions (§6 "Path conventions").
//!
//! Top-level items live at `{id}.md`; resource blobs at `Resources/{id}`;
//! locks and scratch space under `.sync/` and a configurable temp directory.
//! Anything else encountered in a delta listing is not ours to process.

use crate::item_type::ItemType;

/// Directory prefix for resource blob content.
pub const RESOURCES_DIR: &str = "Resources";

/// Directory prefix for lock files and other scratch state.
pub const SYNC_DIR: &str = ".sync";

/// The canonical remote path for an item's metadata.
///
/// All item variants share the same naming scheme; only the extension is
/// fixed (`.md`) since the remote target only ever sees serialized metadata,
/// never the in-memory representation.
pub fn system_path(id: &str) -> String {
    format!("{id}.md")
}

/// The canonical remote path for a Resource's binary blob.
pub fn resource_blob_path(id: &str) -> String {
    format!("{RESOURCES_DIR}/{id}")
}

/// Whether `path` names an object the engine is responsible for
/// processing (as opposed to lock files, temp files, or folder markers).
///
/// Mirrors the delta-processing rule in §4.1 Phase 3: "Skip non-system
/// paths (e.g. `.sync`, `.resource`, directories)."
pub fn is_system_path(path: &str) -> bool {
    if path.starts_with(SYNC_DIR) || path.starts_with(".resource") {
        return false;
    }
    if path.ends_with('/') {
        return false;
    }
    path.ends_with(".md") && !path.contains('/')
}

/// Extract the item id from a system path, if it is one.
pub fn item_id_from_path(path: &str) -> Option<&str> {
    if !is_system_path(path) {
        return None;
    }
    path.strip_suffix(".md")
}

/// Whether `item_type` places its payload in [`RESOURCES_DIR`] in addition
/// to its `.md` metadata file.
pub fn has_blob_sidecar(item_type: ItemType) -> bool {
    item_type.has_blob()
}
