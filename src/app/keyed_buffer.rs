//! Per-key serialization of async calls.
//!
//! Calls sharing a key run one at a time, in arrival order; calls with
//! different keys run freely. A key's entry is dropped as soon as its last
//! queued call finishes, so the map only holds keys with work in flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// One lock per active key.
struct Slot {
    lock: Arc<tokio::sync::Mutex<()>>,
    /// Calls holding or waiting for `lock`.
    users: usize,
}

#[derive(Default)]
pub struct KeyedSerializer {
    slots: Mutex<HashMap<String, Slot>>,
}

/// Releases a caller's claim on a slot, including when the call is dropped
/// mid-flight.
struct SlotClaim<'a> {
    serializer: &'a KeyedSerializer,
    key: String,
}

impl Drop for SlotClaim<'_> {
    fn drop(&mut self) {
        let mut slots = self.serializer.slots();
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

impl KeyedSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `fut` once every earlier call with the same key has finished.
    pub async fn run<F, T>(&self, key: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let lock = {
            let mut slots = self.slots();
            let slot = slots.entry(key.to_string()).or_insert_with(|| Slot {
                lock: Arc::new(tokio::sync::Mutex::new(())),
                users: 0,
            });
            slot.users += 1;
            slot.lock.clone()
        };
        let _claim = SlotClaim {
            serializer: self,
            key: key.to_string(),
        };

        // tokio's mutex is fair, so waiters are served first-in first-out.
        let _turn = lock.lock().await;
        fut.await
    }

    /// Number of keys with calls in flight.
    pub fn active_keys(&self) -> usize {
        self.slots().len()
    }
}
