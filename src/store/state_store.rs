//! Key-value holders for the roster and the call queue.
//!
//! Values are serde_json encoded strings. Writes overwrite, last writer wins.
//!
//! Every store also carries the dispatch lock. Whoever holds `lock()` owns the
//! read-decide-write section over that store, however many controllers share it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::util::error::StoreError;

pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
    fn forget(&self, key: &str) -> Result<(), StoreError>;
    /// Exclusive section over this store's state, held until the guard drops.
    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError>;
}

/// Reads `key` and decodes it, `None` if nothing is stored.
pub fn get_json<T: serde::de::DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str::<T>(&raw)?)),
        None => Ok(None),
    }
}

pub fn put_json<T: serde::Serialize>(store: &dyn StateStore, key: &str, value: &T) -> Result<(), StoreError> {
    let serialized = serde_json::to_string(value)?;
    store.put(key, serialized)
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    section: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.section.lock().map_err(|_| StoreError::Poisoned)
    }
}

// One section per state directory, so every `FileStore` opened on the same
// directory in this process excludes the others.
static DIRECTORY_SECTIONS: Mutex<Vec<(PathBuf, Arc<Mutex<()>>)>> = Mutex::new(Vec::new());

fn directory_section(dir: &Path) -> Result<Arc<Mutex<()>>, StoreError> {
    let mut sections = DIRECTORY_SECTIONS.lock().map_err(|_| StoreError::Poisoned)?;
    if let Some((_, section)) = sections.iter().find(|(path, _)| path == dir) {
        return Ok(section.clone());
    }
    let section = Arc::new(Mutex::new(()));
    sections.push((dir.to_path_buf(), section.clone()));
    Ok(section)
}

/// One file per key under `dir`, so state survives a restart.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    section: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<FileStore, StoreError> {
        fs::create_dir_all(dir.as_ref())?;
        let dir = fs::canonicalize(dir.as_ref())?;
        let section = directory_section(&dir)?;
        Ok(FileStore {
            dir: dir,
            section: section,
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        // Write then rename so a reader never sees half a snapshot.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.section.lock().map_err(|_| StoreError::Poisoned)
    }
}
