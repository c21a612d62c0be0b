//! The encryption collaborator (§4.1, §9 open question).
//!
//! The engine never implements cryptographic primitives — it only ever
//! invokes this trait. Auto-enabling encryption on the first observed
//! Master Key does not imply success: items stay `encryption_applied` and
//! unreadable until the external service reports the user supplied a
//! password (§9: "must not assume success").

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait EncryptionService: Send + Sync {
    /// Whether encryption is currently enabled for this client.
    fn is_enabled(&self) -> bool;

    /// Enable encryption, seeded from the first Master Key content observed
    /// during a run.
    async fn enable_encryption(&self, master_key_content: &serde_json::Value) -> Result<()>;

    /// Reload master keys from settings (invoked immediately after
    /// `enable_encryption`, and whenever a subsequent Master Key arrives).
    async fn load_master_keys_from_settings(&self) -> Result<()>;
}
