//! Per-identifier mutual exclusion for check-then-write sequences.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of async locks keyed by identifier.
///
/// Entries are created on demand and removed when the last holder or waiter
/// releases them, so the registry only grows with in-flight identifiers.
///
/// # Examples
/// ```
/// use cadinet::domain::KeyedLocks;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let locks = KeyedLocks::default();
/// let guard = locks.lock("thing-1").await;
/// assert_eq!(locks.active(), 1);
/// drop(guard);
/// assert_eq!(locks.active(), 0);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    registry: Registry,
}

/// Held while a key is locked.
#[derive(Debug)]
pub struct KeyGuard {
    key: String,
    registry: Registry,
    _guard: OwnedMutexGuard<()>,
}

impl KeyedLocks {
    /// Wait until `key` is free and lock it.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let entry = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(registry.entry(key.to_owned()).or_default())
        };
        let guard = entry.lock_owned().await;
        KeyGuard {
            key: key.to_owned(),
            registry: Arc::clone(&self.registry),
            _guard: guard,
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn active(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        // The registry and this guard hold the only references when nobody waits.
        let idle = registry
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) <= 2);
        if idle {
            registry.remove(&self.key);
        }
    }
}
