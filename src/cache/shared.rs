use crate::cache::core::BoundedCache;
use crate::cache::metrics::CacheMetricsSnapshot;
use crate::errors::Result;
use crate::item::Cacheable;
use crate::persist::Persister;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, thread-safe handle to a [`BoundedCache`].
///
/// Every operation runs the whole residency check, persister call, eviction,
/// insert and recency update under one lock, so concurrent callers observe a
/// linearizable sequence. The lock is held across persister calls.
/// Statistics are read under the same lock, so a snapshot never sees an
/// operation half counted.
pub struct SharedCache<T: Cacheable, P: Persister<T>> {
    inner: Arc<Mutex<BoundedCache<T, P>>>,
}

impl<T: Cacheable, P: Persister<T>> Clone for SharedCache<T, P> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T, P> SharedCache<T, P>
where
    T: Cacheable + Clone,
    T::Key: Send + 'static,
    P: Persister<T>,
{
    pub fn new(cache: BoundedCache<T, P>) -> Self {
        Self { inner: Arc::new(Mutex::new(cache)) }
    }

    /// # Errors
    /// See [`BoundedCache::get`].
    pub fn get(&self, key: &T::Key) -> Result<Option<T>> {
        Ok(self.inner.lock().get(key)?.cloned())
    }

    /// # Errors
    /// See [`BoundedCache::put`].
    pub fn put(&self, item: T) -> Result<()> {
        self.inner.lock().put(item)
    }

    /// # Errors
    /// See [`BoundedCache::remove`].
    pub fn remove(&self, key: &T::Key) -> Result<Option<T>> {
        self.inner.lock().remove(key)
    }

    /// # Errors
    /// See [`BoundedCache::resize`].
    pub fn resize(&self, new_capacity: usize) -> Result<()> {
        self.inner.lock().resize(new_capacity)
    }

    pub fn fault_rate_percent(&self) -> f64 {
        self.inner.lock().fault_rate_percent()
    }

    pub fn reset_stats(&self) {
        self.inner.lock().reset_stats();
    }

    pub fn stats(&self) -> CacheMetricsSnapshot {
        self.inner.lock().stats()
    }

    pub fn log_summary(&self, label: &str) {
        self.inner.lock().log_summary(label);
    }

    /// Snapshot of the resident keys, most recently used first.
    pub fn resident_keys_mru_first(&self) -> Vec<T::Key> {
        self.inner.lock().resident_keys_mru_first().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Runs `f` with exclusive access, for compound operations that must not interleave.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut BoundedCache<T, P>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
