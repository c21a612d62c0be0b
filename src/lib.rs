//! Two-way, multi-client synchronization engine for a personal-notes item
//! store.
//!
//! The [`Synchronizer`] orchestrates a three-phase run (UPLOAD,
//! DELETE_REMOTE, DELTA) against four external collaborators
//! ([`collaborators::FileApi`], [`collaborators::ItemStore`],
//! [`collaborators::EncryptionService`], [`collaborators::ShareService`]),
//! none of which this crate implements — only consumes.

pub mod collaborators;
pub mod download_queue;
pub mod error;
pub mod events;
pub mod lock;
pub mod migration;
pub mod model;
pub mod progress;
pub mod synchronizer;
pub mod uploader;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{Result, SyncError};
pub use events::{EventCallback, SyncEvent};
pub use progress::{ProgressReport, ProgressSnapshot};
pub use synchronizer::{StartOptions, SyncStep, Synchronizer};
