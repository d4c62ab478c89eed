//! View cache manager: serialized view sets per status filter, with a fixed
//! TTL. The cache is a latency optimization only — every view request still
//! triggers a refresh — and a failed refresh never touches a cached value.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use undugu_store::ViewStore;
use undugu_types::campaign::{StatusFilter, ViewRecord};
use undugu_types::error::ClientError;

/// Default cache entry lifetime: one hour.
pub const DEFAULT_VIEW_TTL: Duration = Duration::from_secs(3600);

/// Reads and writes serialized view sets, one cache entry per view name.
///
/// Financial fields travel as decimal strings (the `ViewRecord` serde
/// shape), so the round trip is exact at any representable precision
/// regardless of the cache medium.
pub struct ViewCache {
    store: Arc<dyn ViewStore>,
    ttl: Duration,
    /// Path scope for the owning page, part of every key.
    namespace: String,
}

impl ViewCache {
    pub fn new(store: Arc<dyn ViewStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            ttl: DEFAULT_VIEW_TTL,
            namespace: namespace.into(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn key(&self, filter: StatusFilter) -> String {
        format!("{}/{}", self.namespace, filter.view_key())
    }

    /// The cached view set, or `None` when absent or expired. A corrupt
    /// entry is treated as absent (with a diagnostic), never as an error:
    /// the refresh path will overwrite it.
    pub fn read(&self, filter: StatusFilter) -> Result<Option<Vec<ViewRecord>>, ClientError> {
        let key = self.key(filter);
        let raw = self
            .store
            .get(&key)
            .map_err(|e| ClientError::Cache {
                reason: e.to_string(),
            })?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(Some(records)),
            Err(err) => {
                warn!(%key, %err, "discarding unreadable cache entry");
                Ok(None)
            }
        }
    }

    /// Replace the view's cache entry with a fresh set and restart its TTL.
    pub fn write(&self, filter: StatusFilter, records: &[ViewRecord]) -> Result<(), ClientError> {
        let serialized =
            serde_json::to_string(records).map_err(|e| ClientError::Serialization {
                reason: e.to_string(),
            })?;
        self.store
            .put(&self.key(filter), &serialized, self.ttl)
            .map_err(|e| ClientError::Cache {
                reason: e.to_string(),
            })
    }

    pub fn invalidate(&self, filter: StatusFilter) -> Result<(), ClientError> {
        self.store
            .delete(&self.key(filter))
            .map_err(|e| ClientError::Cache {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use undugu_store::MemoryStore;
    use undugu_types::campaign::CampaignRecord;

    fn cache() -> ViewCache {
        ViewCache::new(Arc::new(MemoryStore::new()), "my-fundraisers")
    }

    fn view(id: u64, raised: u128) -> ViewRecord {
        ViewRecord::from_campaign(
            CampaignRecord {
                id,
                campaign_address: "0xAbCd".to_string(),
                title: format!("c{id}"),
                description: "d".to_string(),
                target_amount: u128::MAX,
                raised_amount: raised,
                balance: raised,
                deadline: 1_700_000_000,
                is_completed: false,
                is_cancelled: false,
            },
            Some("https://img.example/x.png".to_string()),
        )
    }

    #[test]
    fn test_round_trip_is_exact_at_high_precision() {
        let cache = cache();
        let records = vec![view(1, 123456789012345678901234567890u128), view(2, 1)];
        cache.write(StatusFilter::Active, &records).unwrap();
        assert_eq!(cache.read(StatusFilter::Active).unwrap().unwrap(), records);
    }

    #[test]
    fn test_views_are_scoped_per_filter() {
        let cache = cache();
        cache.write(StatusFilter::Active, &[view(1, 5)]).unwrap();
        assert!(cache.read(StatusFilter::Completed).unwrap().is_none());
        assert!(cache.read(StatusFilter::All).unwrap().is_none());
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let cache = ViewCache::new(Arc::new(MemoryStore::new()), "ns")
            .with_ttl(Duration::from_millis(1));
        cache.write(StatusFilter::Active, &[view(1, 5)]).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.read(StatusFilter::Active).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_treated_as_absent() {
        let store = Arc::new(MemoryStore::new());
        let cache = ViewCache::new(store.clone(), "ns");
        use undugu_store::ViewStore as _;
        store
            .put("ns/Active", "{not json", DEFAULT_VIEW_TTL)
            .unwrap();
        assert!(cache.read(StatusFilter::Active).unwrap().is_none());
    }

    #[test]
    fn test_write_replaces_prior_value() {
        let cache = cache();
        cache.write(StatusFilter::Active, &[view(1, 5)]).unwrap();
        cache.write(StatusFilter::Active, &[view(2, 9)]).unwrap();
        let read = cache.read(StatusFilter::Active).unwrap().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, 2);
    }
}
