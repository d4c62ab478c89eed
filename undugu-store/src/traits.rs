use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;

/// Key-value store with per-entry expiry.
///
/// Values are plain text. A `put` fully replaces any prior value for the
/// key and restarts its TTL; `get` reports a present-but-expired entry as
/// absent. Partial merges never happen at this layer.
pub trait ViewStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Blanket implementation for `Arc<S>` so a store can be shared across
/// multiple owners.
impl<S: ViewStore + ?Sized> ViewStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).put(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Blanket implementation for `Box<dyn ViewStore>`.
impl ViewStore for Box<dyn ViewStore> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        (**self).put(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}
