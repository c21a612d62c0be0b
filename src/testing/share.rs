//! In-memory [`ShareService`] double. Test-only.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::collaborators::ShareService;
use crate::error::Result;

#[derive(Default)]
pub struct InMemoryShareService {
    maintenance_calls: AtomicUsize,
}

impl InMemoryShareService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maintenance_calls(&self) -> usize {
        self.maintenance_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShareService for InMemoryShareService {
    async fn maintenance(&self) -> Result<()> {
        self.maintenance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
