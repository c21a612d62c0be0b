//! External collaborators the synchronizer orchestrates but never
//! implements itself (§2).

pub mod encryption;
pub mod file_api;
pub mod item_store;
pub mod share;

pub use encryption::EncryptionService;
pub use file_api::{DeltaOptions, DeltaPage, FileApi, PutOptions};
pub use item_store::{ChangeSource, ItemStore, SyncBatch};
pub use share::ShareService;
