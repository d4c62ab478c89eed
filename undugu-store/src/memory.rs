use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::StoreError;
use crate::traits::ViewStore;

/// In-memory TTL store. Expired entries are dropped lazily on `get`.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Entry>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut data = self.data.write().map_err(|e| StoreError::ReadError {
            reason: e.to_string(),
        })?;
        match data.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                data.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut data = self.data.write().map_err(|e| StoreError::WriteError {
            reason: e.to_string(),
        })?;
        data.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().map_err(|e| StoreError::WriteError {
            reason: e.to_string(),
        })?;
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(3600);

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        store.put("views/Active", "[]", LONG).unwrap();
        assert_eq!(store.get("views/Active").unwrap(), Some("[]".to_string()));

        store.delete("views/Active").unwrap();
        assert_eq!(store.get("views/Active").unwrap(), None);
    }

    #[test]
    fn test_put_replaces_whole_value_and_resets_ttl() {
        let store = MemoryStore::new();
        store.put("k", "old", Duration::from_millis(1)).unwrap();
        store.put("k", "new", LONG).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.get("k").unwrap(), Some("new".to_string()));
    }

    #[test]
    fn test_expired_entry_reported_absent() {
        let store = MemoryStore::new();
        store.put("k", "v", Duration::from_millis(1)).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("nope").unwrap();
    }
}
