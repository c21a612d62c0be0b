//! In-memory [`EncryptionService`] double. Test-only.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::collaborators::EncryptionService;
use crate::error::Result;

#[derive(Default)]
pub struct InMemoryEncryptionService {
    enabled: AtomicBool,
    enable_calls: AtomicUsize,
    reload_calls: AtomicUsize,
    last_master_key: Mutex<Option<Value>>,
}

impl InMemoryEncryptionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_enabled() -> Self {
        let service = Self::default();
        service.enabled.store(true, Ordering::SeqCst);
        service
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    pub fn reload_calls(&self) -> usize {
        self.reload_calls.load(Ordering::SeqCst)
    }

    pub fn last_master_key(&self) -> Option<Value> {
        self.last_master_key.lock().clone()
    }
}

#[async_trait]
impl EncryptionService for InMemoryEncryptionService {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn enable_encryption(&self, master_key_content: &Value) -> Result<()> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_master_key.lock() = Some(master_key_content.clone());
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn load_master_keys_from_settings(&self) -> Result<()> {
        self.reload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
