use crate::cache::config::{CacheConfig, RecencyMode};
use crate::cache::metrics::{CacheMetrics, CacheMetricsSnapshot, METRICS_TARGET};
use crate::cache::recency::{RecencyTracker, tracker_for};
use crate::errors::{CacheError, ConfigError, Result};
use crate::item::Cacheable;
use crate::persist::Persister;
use std::collections::HashMap;

/// A bounded, write-through LRU cache in front of a [`Persister`].
///
/// Reads that miss the resident set are served from the persister and
/// installed; writes always go to the persister first. When a new key must be
/// admitted into a full resident set, exactly one least recently used key is
/// evicted. Eviction never writes back: the persister already holds every value.
///
/// Not synchronised; see [`SharedCache`](crate::cache::SharedCache) for a
/// thread-safe handle.
pub struct BoundedCache<T: Cacheable, P: Persister<T>> {
    items: HashMap<T::Key, T>,
    capacity: usize,
    mode: RecencyMode,
    recency: Box<dyn RecencyTracker<T::Key> + Send>,
    metrics: CacheMetrics,
    persister: P,
}

impl<T, P> BoundedCache<T, P>
where
    T: Cacheable,
    T::Key: Send + 'static,
    P: Persister<T>,
{
    /// Creates a cache holding at most `capacity` items, tracked by an access log.
    ///
    /// # Errors
    /// Returns [`CacheError::Config`] if `capacity` is zero.
    pub fn new(capacity: usize, persister: P) -> Result<Self> {
        Self::with_config(&CacheConfig { capacity, ..Default::default() }, persister)
    }

    /// Creates a cache from a validated configuration.
    ///
    /// # Errors
    /// Returns [`CacheError::Config`] if the configuration is invalid.
    pub fn with_config(config: &CacheConfig, persister: P) -> Result<Self> {
        config.validate()?;
        log::debug!("cache: created capacity={} recency={:?}", config.capacity, config.recency);
        Ok(Self {
            items: HashMap::with_capacity(config.capacity.min(4096)),
            capacity: config.capacity,
            mode: config.recency,
            recency: tracker_for(config.recency),
            metrics: CacheMetrics::default(),
            persister,
        })
    }

    /// Looks up `key`, falling through to the persister on a miss.
    ///
    /// A value found only in the persister counts as a fault and becomes
    /// resident, evicting the least recently used key if the cache is full.
    /// A key the persister does not know yields `Ok(None)` and is not a fault.
    ///
    /// # Errors
    /// Propagates persister failures; counters and residency are unchanged then.
    pub fn get(&mut self, key: &T::Key) -> Result<Option<&T>> {
        if self.items.contains_key(key) {
            CacheMetrics::bump(&self.metrics.accesses);
            CacheMetrics::bump(&self.metrics.hits);
            self.recency.record_access(key);
            log::trace!("cache: hit {:?}", key);
            return Ok(self.items.get(key));
        }

        let fetched = self.persister.fetch(key).map_err(|e| {
            log::warn!("cache: persister fetch failed for {:?}: {}", key, e);
            CacheError::persist("get", key, e)
        })?;
        CacheMetrics::bump(&self.metrics.accesses);
        match fetched {
            None => {
                CacheMetrics::bump(&self.metrics.absent);
                log::trace!("cache: {:?} absent from persister", key);
                Ok(None)
            }
            Some(item) => {
                CacheMetrics::bump(&self.metrics.faults);
                log::debug!("cache: fault on get {:?}", key);
                self.admit(key.clone(), item);
                Ok(self.items.get(key))
            }
        }
    }

    /// Writes `item` through to the persister, then makes it resident.
    ///
    /// Updating an already resident key refreshes its cached value and
    /// recency without a fault. A new key is a fault and may evict.
    ///
    /// # Errors
    /// Propagates persister failures; nothing else changes in that case.
    pub fn put(&mut self, item: T) -> Result<()> {
        self.persister.store(&item).map_err(|e| {
            log::warn!("cache: persister store failed for {:?}: {}", item.key(), e);
            CacheError::persist("put", item.key(), e)
        })?;
        CacheMetrics::bump(&self.metrics.accesses);

        let key = item.key().clone();
        if let Some(slot) = self.items.get_mut(&key) {
            *slot = item;
            CacheMetrics::bump(&self.metrics.hits);
            self.recency.record_access(&key);
            log::trace!("cache: put refreshed resident {:?}", key);
        } else {
            CacheMetrics::bump(&self.metrics.faults);
            log::debug!("cache: fault on put {:?}", key);
            self.admit(key, item);
        }
        Ok(())
    }

    /// Drops `key` from the resident set and returns the persister's current
    /// value for it. Non-resident keys yield `Ok(None)` without consulting the
    /// persister. Statistics and the persisted value are left alone.
    ///
    /// # Errors
    /// Propagates persister failures; the key stays resident in that case.
    pub fn remove(&mut self, key: &T::Key) -> Result<Option<T>> {
        if !self.items.contains_key(key) {
            return Ok(None);
        }
        let current = self.persister.fetch(key).map_err(|e| {
            log::warn!("cache: persister fetch failed while removing {:?}: {}", key, e);
            CacheError::persist("remove", key, e)
        })?;
        self.items.remove(key);
        self.recency.forget(key);
        CacheMetrics::bump(&self.metrics.removes);
        log::debug!("cache: removed {:?}", key);
        Ok(current)
    }

    /// Changes the capacity bound. Shrinking does not evict; the bound is
    /// enforced one eviction at a time as new keys are admitted.
    ///
    /// # Errors
    /// Returns [`CacheError::Config`] for a zero capacity, leaving the old bound.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { context: "resize" }.into());
        }
        log::debug!("cache: resize {} -> {} (resident={})", self.capacity, new_capacity, self.items.len());
        crate::dev!("resize {} {}", self.capacity, new_capacity);
        self.capacity = new_capacity;
        Ok(())
    }

    pub fn fault_rate_percent(&self) -> f64 {
        self.metrics.fault_rate_percent()
    }

    pub fn reset_stats(&self) {
        let before = self.metrics.snapshot();
        self.metrics.reset();
        log::info!(
            target: METRICS_TARGET,
            "reset: accesses={} faults={} fault_rate={:.2}%",
            before.accesses,
            before.faults,
            before.fault_rate_percent()
        );
    }

    pub fn stats(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Logs a one-line statistics summary under `label` to the metrics target.
    pub fn log_summary(&self, label: &str) {
        let s = self.metrics.snapshot();
        log::info!(
            target: METRICS_TARGET,
            "summary {}: capacity={} resident={} accesses={} faults={} hits={} evictions={} fault_rate={:.2}%",
            label,
            self.capacity,
            self.items.len(),
            s.accesses,
            s.faults,
            s.hits,
            s.evictions,
            s.fault_rate_percent()
        );
    }

    /// Resident keys, most recently used first. Each call walks afresh.
    pub fn resident_keys_mru_first(&self) -> impl Iterator<Item = &T::Key> + '_ {
        self.recency.keys_most_recent_first().filter(|k| self.items.contains_key(*k))
    }

    /// Every distinct key the tracker remembers, most recent first. With
    /// [`RecencyMode::AccessLog`] this includes keys no longer resident.
    pub fn accessed_keys_mru_first(&self) -> impl Iterator<Item = &T::Key> + '_ {
        self.recency.keys_most_recent_first()
    }

    /// The key that the next eviction would pick.
    pub fn least_recently_used(&self) -> Option<T::Key> {
        let items = &self.items;
        self.recency.least_recently_used(&|k: &T::Key| items.contains_key(k), self.ranking_limit())
    }

    /// Reads a resident item without touching recency or statistics.
    pub fn peek(&self, key: &T::Key) -> Option<&T> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn recency_mode(&self) -> RecencyMode {
        self.mode
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    // After a shrink more keys than `capacity` may be resident; the victim is
    // still the oldest of them.
    fn ranking_limit(&self) -> usize {
        self.capacity.max(self.items.len())
    }

    fn admit(&mut self, key: T::Key, item: T) {
        if self.items.len() >= self.capacity {
            self.evict_lru();
        }
        crate::dev!("admit {:?}", key);
        self.recency.record_access(&key);
        self.items.insert(key, item);
    }

    fn evict_lru(&mut self) {
        let Some(victim) = self.least_recently_used() else {
            panic!(
                "cache invariant violated: eviction requested with no resident keys (len={}, capacity={})",
                self.items.len(),
                self.capacity
            );
        };
        self.items.remove(&victim);
        self.recency.forget(&victim);
        CacheMetrics::bump(&self.metrics.evictions);
        log::debug!("cache: evicted {:?}", victim);
        crate::dev!("evict {:?}", victim);
    }
}
