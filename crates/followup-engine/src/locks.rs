//! Per-key async mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<Mutex<()>>>;

/// A set of async locks addressed by string key.
///
/// Entries exist only while someone holds or waits for them.
#[derive(Debug, Default, Clone)]
pub struct KeyedLocks {
    inner: Arc<StdMutex<LockMap>>,
}

/// Holds the lock for one key until dropped.
#[derive(Debug)]
pub struct KeyedGuard {
    key: String,
    map: Arc<StdMutex<LockMap>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(key.to_string()).or_default().clone()
        };

        let guard = mutex.lock_owned().await;

        KeyedGuard {
            key: key.to_string(),
            map: self.inner.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one inside our guard; more means waiters.
        if let Some(entry) = map.get(&self.key) {
            if Arc::strong_count(entry) <= 2 {
                map.remove(&self.key);
            }
        }
        self.guard.take();
    }
}
