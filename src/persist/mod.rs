//! Backing stores that hold the authoritative value for every key.
//!
//! The cache never owns data the store has not seen: every `put` is written
//! through before residency changes, and misses are served from here.
mod file;
mod memory;

pub use file::JsonFilePersister;
pub use memory::MemoryPersister;

use crate::errors::PersistError;
use crate::item::Cacheable;
use std::sync::Arc;

/// Authoritative key/value store behind a cache.
pub trait Persister<T: Cacheable> {
    /// Reads the stored value for `key`. Must succeed with `None` for keys never written.
    fn fetch(&self, key: &T::Key) -> Result<Option<T>, PersistError>;

    /// Writes `item`, replacing any previous value for its key. Durable on return.
    fn store(&self, item: &T) -> Result<(), PersistError>;
}

impl<T: Cacheable, P: Persister<T> + ?Sized> Persister<T> for Arc<P> {
    fn fetch(&self, key: &T::Key) -> Result<Option<T>, PersistError> {
        (**self).fetch(key)
    }

    fn store(&self, item: &T) -> Result<(), PersistError> {
        (**self).store(item)
    }
}

impl<T: Cacheable, P: Persister<T> + ?Sized> Persister<T> for &P {
    fn fetch(&self, key: &T::Key) -> Result<Option<T>, PersistError> {
        (**self).fetch(key)
    }

    fn store(&self, item: &T) -> Result<(), PersistError> {
        (**self).store(item)
    }
}
