//! Write-through id registries
//!
//! A registry maps string keys (normalized URLs or words) to dense integer
//! ids. The persistent store allocates ids; the registry caches them so the
//! hot path never touches the database for a key it has already seen.

use crate::storage::{Storage, StorageResult};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Which id space a registry allocates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyspace {
    Documents,
    Words,
}

impl Keyspace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Words => "words",
        }
    }
}

/// Cached key to id mapping backed by the store
///
/// The cache lock is held across the store insert on a miss, which makes
/// check-then-insert a single critical section: two workers asking for the
/// same unseen key always get the same id. Lock order is always cache, then
/// store.
pub struct IdRegistry {
    keyspace: Keyspace,
    cache: Mutex<HashMap<String, i64>>,
}

impl IdRegistry {
    pub fn new(keyspace: Keyspace) -> Self {
        Self {
            keyspace,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds the cache with ids already present in the store
    pub fn warm<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let mut cache = self.cache.lock();
        cache.extend(entries);
    }

    /// Returns the id for `key`, allocating one in the store on first sight
    pub fn id_for<S: Storage>(&self, key: &str, store: &Mutex<S>) -> StorageResult<i64> {
        let mut cache = self.cache.lock();

        if let Some(&id) = cache.get(key) {
            return Ok(id);
        }

        let id = {
            let mut store = store.lock();
            match self.keyspace {
                Keyspace::Documents => store.insert_or_get_document(key)?,
                Keyspace::Words => store.insert_or_get_word(key)?,
            }
        };

        tracing::trace!(keyspace = self.keyspace.as_str(), key, id, "Allocated id");
        cache.insert(key.to_string(), id);
        Ok(id)
    }

    /// Looks up an id without allocating
    pub fn get(&self, key: &str) -> Option<i64> {
        self.cache.lock().get(key).copied()
    }

    /// Copies out the current mapping
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.cache.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
