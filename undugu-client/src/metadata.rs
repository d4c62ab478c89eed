use std::sync::RwLock;

use async_trait::async_trait;

use undugu_types::campaign::MetadataRecord;
use undugu_types::error::ClientError;
use undugu_types::primitives::{Address, CampaignId};

/// Query filter for the metadata store. Address matching is
/// case-insensitive (the store's `ilike`); id matching is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub campaign_address: Option<Address>,
    pub campaign_id: Option<CampaignId>,
}

impl MetadataFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_address(address: impl Into<Address>) -> Self {
        Self {
            campaign_address: Some(address.into()),
            campaign_id: None,
        }
    }

    pub fn matches(&self, record: &MetadataRecord) -> bool {
        if let Some(address) = &self.campaign_address {
            if !record.campaign_address.eq_ignore_ascii_case(address) {
                return false;
            }
        }
        if let Some(id) = self.campaign_id {
            if record.campaign_id != id {
                return false;
            }
        }
        true
    }
}

/// Collapse duplicate `(address, id)` pairs, keeping the most recently
/// inserted record for each key while preserving overall order. The store
/// has no documented uniqueness guarantee, so consumers resolve duplicates
/// here, deterministically.
pub fn dedupe_latest(records: &[MetadataRecord]) -> Vec<MetadataRecord> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<MetadataRecord> = records
        .iter()
        .rev()
        .filter(|r| seen.insert((r.campaign_address.to_ascii_lowercase(), r.campaign_id)))
        .cloned()
        .collect();
    out.reverse();
    out
}

/// The off-chain image metadata store. External collaborator: queried and
/// written to, never reimplemented here.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Records matching the filter, in insertion order. When duplicate
    /// `(address, id)` pairs exist, consumers take the last match, so the
    /// most recently inserted record wins.
    async fn query(&self, filter: MetadataFilter) -> Result<Vec<MetadataRecord>, ClientError>;

    async fn insert(&self, record: MetadataRecord) -> Result<(), ClientError>;

    /// Store a binary object and return its public URL.
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, ClientError>;
}

/// In-memory metadata store for tests and offline runs.
pub struct MemoryMetadataStore {
    records: RwLock<Vec<MetadataRecord>>,
    /// Base used to fabricate public URLs for uploads.
    url_base: String,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            url_base: "memory://undugu".to_string(),
        }
    }

    pub fn with_records(records: Vec<MetadataRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            url_base: "memory://undugu".to_string(),
        }
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn query(&self, filter: MetadataFilter) -> Result<Vec<MetadataRecord>, ClientError> {
        let records = self.records.read().map_err(|e| ClientError::Cache {
            reason: e.to_string(),
        })?;
        Ok(records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: MetadataRecord) -> Result<(), ClientError> {
        let mut records = self.records.write().map_err(|e| ClientError::Cache {
            reason: e.to_string(),
        })?;
        records.push(record);
        Ok(())
    }

    async fn upload(&self, name: &str, _bytes: Vec<u8>) -> Result<String, ClientError> {
        Ok(format!("{}/{}", self.url_base, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str, id: CampaignId, url: &str) -> MetadataRecord {
        MetadataRecord {
            campaign_address: address.to_string(),
            campaign_id: id,
            image_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_query_filters_case_insensitively() {
        let store = MemoryMetadataStore::with_records(vec![
            record("0xAA", 1, "a"),
            record("0xBB", 1, "b"),
        ]);
        let hits = store
            .query(MetadataFilter::by_address("0xaa"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].image_url, "a");
    }

    #[tokio::test]
    async fn test_duplicates_keep_insertion_order() {
        let store = MemoryMetadataStore::new();
        store.insert(record("0xAA", 1, "old")).await.unwrap();
        store.insert(record("0xaa", 1, "new")).await.unwrap();
        let hits = store.query(MetadataFilter::all()).await.unwrap();
        // Most-recently-inserted is last; consumers take the last match.
        assert_eq!(hits.last().unwrap().image_url, "new");
    }
}
