//! The sync engine's data model (§3).

mod action;
mod item;
mod remote_item;
mod resource_state;
mod sync_item;

pub use action::SyncAction;
pub use item::{Item, ItemType};
pub use remote_item::RemoteItem;
pub use resource_state::{FetchStatus, ResourceLocalState};
pub use sync_item::{DeletedItem, SyncItem};
