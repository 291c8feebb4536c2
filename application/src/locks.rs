//! Per-accord critical sections
//!
//! The phase/round record has a strict single-writer-at-a-time
//! requirement: two participants racing for the last two open slots of a
//! round must produce exactly one synthesis invocation and one phase
//! transition. The coordinator, signature ledger, and invitation
//! redemption all serialize on this registry's per-accord mutex; the
//! store's conditional updates are the second enforcement layer.

use accord_domain::AccordId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-accord async mutexes
#[derive(Default)]
pub struct AccordLocks {
    inner: Mutex<HashMap<AccordId, Arc<Mutex<()>>>>,
}

impl AccordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for one accord, creating it on first use.
    ///
    /// The guard is owned so it can be held across awaits, including the
    /// bounded synthesizer call (the timeout caps hold time).
    pub async fn acquire(&self, id: AccordId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
