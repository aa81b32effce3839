use crate::errors::PersistError;
use crate::item::Cacheable;
use crate::persist::Persister;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Store that keeps every item in a single JSON array file.
///
/// The whole file is rewritten on each `store` through a temp file in the same
/// directory followed by an atomic rename, so a reader never sees a torn file.
pub struct JsonFilePersister<T: Cacheable> {
    path: PathBuf,
    items: RwLock<HashMap<T::Key, T>>,
}

impl<T> JsonFilePersister<T>
where
    T: Cacheable + Clone + Serialize + DeserializeOwned,
{
    /// Opens `path`, loading existing items. A missing file starts an empty store.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let mut items = HashMap::new();
        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let stored: Vec<T> = serde_json::from_reader(reader)?;
            for it in stored {
                items.insert(it.key().clone(), it);
            }
            log::debug!("json store: loaded {} items from {}", items.len(), path.display());
        }
        Ok(Self { path, items: RwLock::new(items) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn write_snapshot(&self, items: &HashMap<T::Key, T>) -> Result<(), PersistError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = NamedTempFile::new_in(parent)?;
        {
            let mut w = BufWriter::new(tmp.as_file_mut());
            let values: Vec<&T> = items.values().collect();
            serde_json::to_writer(&mut w, &values)?;
            w.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|pe| PersistError::Io(pe.error))?;
        Ok(())
    }
}

impl<T> Persister<T> for JsonFilePersister<T>
where
    T: Cacheable + Clone + Serialize + DeserializeOwned,
{
    fn fetch(&self, key: &T::Key) -> Result<Option<T>, PersistError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn store(&self, item: &T) -> Result<(), PersistError> {
        let mut items = self.items.write();
        let previous = items.insert(item.key().clone(), item.clone());
        if let Err(e) = self.write_snapshot(&items) {
            // keep memory consistent with what is on disk
            match previous {
                Some(prev) => {
                    items.insert(item.key().clone(), prev);
                }
                None => {
                    items.remove(item.key());
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::EmployeeRecord;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let p: JsonFilePersister<EmployeeRecord> =
            JsonFilePersister::open(dir.path().join("store.json")).unwrap();
        assert!(p.is_empty());
        assert!(!p.path().exists());
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        {
            let p: JsonFilePersister<EmployeeRecord> = JsonFilePersister::open(&path).unwrap();
            p.store(&EmployeeRecord::new("a", 1)).unwrap();
            p.store(&EmployeeRecord::new("b", 2)).unwrap();
            p.store(&EmployeeRecord::new("a", 3)).unwrap();
        }
        let reopened: JsonFilePersister<EmployeeRecord> = JsonFilePersister::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.fetch(&"a".to_string()).unwrap(), Some(EmployeeRecord::new("a", 3)));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{not json").unwrap();
        let res: Result<JsonFilePersister<EmployeeRecord>, _> = JsonFilePersister::open(&path);
        assert!(matches!(res, Err(PersistError::Json(_))));
    }
}
