use crate::errors::PersistError;
use crate::item::Cacheable;
use crate::persist::Persister;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process store backed by a `HashMap`. Values are cloned in and out.
pub struct MemoryPersister<T: Cacheable> {
    items: RwLock<HashMap<T::Key, T>>,
}

impl<T: Cacheable + Clone> MemoryPersister<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: RwLock::new(HashMap::new()) }
    }

    /// Creates a store pre-populated with `items`; later items win on duplicate keys.
    pub fn with_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        let map = items.into_iter().map(|it| (it.key().clone(), it)).collect();
        Self { items: RwLock::new(map) }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T: Cacheable + Clone> Default for MemoryPersister<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Cacheable + Clone> Persister<T> for MemoryPersister<T> {
    fn fetch(&self, key: &T::Key) -> Result<Option<T>, PersistError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn store(&self, item: &T) -> Result<(), PersistError> {
        self.items.write().insert(item.key().clone(), item.clone());
        Ok(())
    }
}
