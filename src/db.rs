use crate::notifier::Notifier;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// State of one key. `signal` is only present while the key is unset and
/// somebody has waited on it.
struct Entry<V> {
    value: Option<V>,
    signal: Option<Arc<Notifier>>,
}

impl<V> Entry<V> {
    fn set(value: V) -> Self {
        Self {
            value: Some(value),
            signal: None,
        }
    }

    fn pending() -> Self {
        Self {
            value: None,
            signal: None,
        }
    }
}

enum Lookup<V> {
    Ready(V),
    Wait(Arc<Notifier>),
}

/// Key/value map where reading a missing key blocks until a writer supplies it.
///
/// Timeouts are reported as `None`. To store an explicit "nil", use
/// `V = Option<T>`: a Get then yields `Some(None)`, which never collides with
/// a timeout.
pub struct RendezvousMap<V> {
    map: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> RendezvousMap<V> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry<V>>> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry<V>>> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` under `key` (last write wins) and releases every
    /// reader waiting on it. Never waits for readers.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let mut map = self.write();
        match map.entry(key.into()) {
            MapEntry::Vacant(slot) => {
                slot.insert(Entry::set(value));
            }
            MapEntry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                entry.value = Some(value);
                // Fired under the write lock: no reader can join this signal afterwards.
                if let Some(signal) = entry.signal.take() {
                    signal.fire();
                    info!(key = %slot.key(), "key set, released waiters");
                }
            }
        }
    }

    /// Returns the value for `key`, waiting up to `timeout` for a writer if
    /// the key is not set yet. `None` means the wait timed out.
    ///
    /// A zero timeout never waits and never registers a pending entry.
    pub fn get(&self, key: &str, timeout: Duration) -> Option<V> {
        let signal = match self.lookup(key, timeout)? {
            Lookup::Ready(value) => return Some(value),
            Lookup::Wait(signal) => signal,
        };

        debug!(key, ?timeout, "waiting for key");
        if signal.wait_timeout(timeout) {
            self.current(key)
        } else {
            warn!(key, ?timeout, "timed out waiting for key");
            None
        }
    }

    /// Same as [`RendezvousMap::get`], but suspends the calling task instead
    /// of blocking the thread.
    pub async fn get_async(&self, key: &str, timeout: Duration) -> Option<V> {
        let signal = match self.lookup(key, timeout)? {
            Lookup::Ready(value) => return Some(value),
            Lookup::Wait(signal) => signal,
        };

        debug!(key, ?timeout, "waiting for key");
        if signal.wait_timeout_async(timeout).await {
            self.current(key)
        } else {
            warn!(key, ?timeout, "timed out waiting for key");
            None
        }
    }

    /// Returns the value if set, otherwise the episode's signal to wait on.
    /// `None` when the key is unset and the caller does not want to wait.
    fn lookup(&self, key: &str, timeout: Duration) -> Option<Lookup<V>> {
        if let Some(value) = self.current(key) {
            return Some(Lookup::Ready(value));
        }
        if timeout.is_zero() {
            return None;
        }

        let mut map = self.write();
        // Re-check: a writer may have slipped in between the two locks.
        let entry = map.entry(key.to_owned()).or_insert_with(Entry::pending);
        if let Some(value) = &entry.value {
            return Some(Lookup::Ready(value.clone()));
        }
        let signal = entry
            .signal
            .get_or_insert_with(|| Arc::new(Notifier::new()));
        Some(Lookup::Wait(Arc::clone(signal)))
    }

    fn current(&self, key: &str) -> Option<V> {
        self.read().get(key).and_then(|entry| entry.value.clone())
    }

    /// Whether at least one Put has happened for `key`.
    pub fn is_set(&self, key: &str) -> bool {
        self.read()
            .get(key)
            .is_some_and(|entry| entry.value.is_some())
    }

    /// Number of keys, set or pending.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<V: Clone> Default for RendezvousMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
