//! throughcache: a bounded, write-through LRU cache in front of an
//! authoritative store.
//!
//! ```
//! use throughcache::cache::BoundedCache;
//! use throughcache::item::EmployeeRecord;
//! use throughcache::persist::MemoryPersister;
//!
//! let mut cache = BoundedCache::new(2, MemoryPersister::new()).unwrap();
//! cache.put(EmployeeRecord::new("ada", 120_000)).unwrap();
//! assert!(cache.get(&"ada".to_string()).unwrap().is_some());
//! assert_eq!(cache.fault_rate_percent(), 50.0);
//! ```

pub mod cache;
pub mod devlog;
pub mod errors;
pub mod item;
pub mod logger;
pub mod persist;

pub use cache::{BoundedCache, CacheConfig, RecencyMode, SharedCache};
pub use errors::{CacheError, ConfigError, PersistError, Result};
pub use item::Cacheable;
pub use persist::Persister;

/// Initializes logging from `log4rs.yaml` when one is present in the working directory.
pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
