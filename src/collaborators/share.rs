//! The Share Service collaborator (§7 "cleanup guarantees": its
//! `maintenance()` runs in a protected block after every run; failure is
//! logged and never affects the run's return value).

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait ShareService: Send + Sync {
    async fn maintenance(&self) -> Result<()>;
}
