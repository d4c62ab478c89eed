//! Metadata join engine: fans out to the ledger and the metadata store,
//! joins on `(campaign_address, id)`, and merges the owned and administered
//! perspectives into one deduplicated, order-independent view set.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tracing::{debug, warn};

use undugu_types::campaign::{MetadataRecord, StatusFilter, ViewRecord};
use undugu_types::error::ClientError;
use undugu_types::primitives::Address;

use crate::facade::DonationService;
use crate::metadata::{MetadataFilter, MetadataStore};

/// Lifecycle of one refresh. `Ready → Fetching` is re-entrant on manual
/// refresh or cache expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPhase {
    Idle,
    Fetching,
    Merging,
    Ready,
}

/// Builds merged view sets from the ledger and the metadata store.
pub struct JoinEngine {
    service: Arc<DonationService>,
    metadata: Arc<dyn MetadataStore>,
    /// Campaign contract whose admin list gates the browse-everything view.
    platform_address: Address,
    phase: Mutex<JoinPhase>,
}

impl JoinEngine {
    pub fn new(
        service: Arc<DonationService>,
        metadata: Arc<dyn MetadataStore>,
        platform_address: Address,
    ) -> Self {
        Self {
            service,
            metadata,
            platform_address,
            phase: Mutex::new(JoinPhase::Idle),
        }
    }

    pub fn phase(&self) -> JoinPhase {
        *self.phase.lock().expect("phase lock poisoned")
    }

    fn set_phase(&self, phase: JoinPhase) {
        *self.phase.lock().expect("phase lock poisoned") = phase;
    }

    /// Refresh the caller's view: campaigns they own merged with campaigns
    /// they administer, filtered by status, deduplicated by composite key
    /// with the owned perspective winning every collision.
    ///
    /// A metadata-store failure aborts the whole refresh as
    /// `AggregationFailed` (whatever is cached stays untouched). A failure
    /// on one administered campaign's detail drops just that record.
    pub async fn refresh_owned(
        &self,
        account: &str,
        filter: StatusFilter,
    ) -> Result<Vec<ViewRecord>, ClientError> {
        self.set_phase(JoinPhase::Fetching);
        let (owned, own_images, all_images) = tokio::join!(
            self.service.list_campaigns_owned_by(account),
            self.metadata.query(MetadataFilter::by_address(account)),
            self.metadata.query(MetadataFilter::all()),
        );
        let result = self
            .merge_perspectives(account, filter, owned, own_images, all_images)
            .await;
        match &result {
            Ok(records) => {
                debug!(view = filter.view_key(), count = records.len(), "refresh complete");
                self.set_phase(JoinPhase::Ready);
            }
            Err(_) => self.set_phase(JoinPhase::Idle),
        }
        result
    }

    async fn merge_perspectives(
        &self,
        account: &str,
        filter: StatusFilter,
        owned: Result<Vec<undugu_types::campaign::CampaignRecord>, ClientError>,
        own_images: Result<Vec<MetadataRecord>, ClientError>,
        all_images: Result<Vec<MetadataRecord>, ClientError>,
    ) -> Result<Vec<ViewRecord>, ClientError> {
        // Ledger list failures keep their own classification; metadata
        // failures collapse into AggregationFailed.
        let owned = owned?;
        let own_images = own_images.map_err(|e| ClientError::AggregationFailed {
            reason: e.to_string(),
        })?;
        let all_images = all_images.map_err(|e| ClientError::AggregationFailed {
            reason: e.to_string(),
        })?;

        self.set_phase(JoinPhase::Merging);

        // Owned path: status filter applies to the pre-join ledger records,
        // then each is joined with its image. On duplicate metadata for the
        // same key, the most recently inserted record wins.
        let owned_views: Vec<ViewRecord> = owned
            .into_iter()
            .filter(|campaign| filter.matches(campaign))
            .map(|campaign| {
                let image = own_images
                    .iter()
                    .rev()
                    .find(|m| m.matches(&campaign.campaign_address, campaign.id))
                    .map(|m| m.image_url.clone());
                ViewRecord::from_campaign(campaign, image)
            })
            .collect();

        // Administered path: every metadata record system-wide is a
        // candidate; keep those whose contract lists the caller as an
        // active admin. The status filter applies post-join.
        let candidates = crate::metadata::dedupe_latest(&all_images);
        let admin_views = self.administered_views(account, &candidates).await;
        let admin_views = admin_views
            .into_iter()
            .filter(|view| filter.matches_view(view));

        // Owned records are inserted first, so on any composite-key
        // collision the owned entry wins regardless of which fetch
        // completed first.
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for view in owned_views.into_iter().chain(admin_views) {
            if seen.insert(view.composite_key()) {
                merged.push(view);
            }
        }
        Ok(merged)
    }

    /// Fetch a view record for every metadata record whose campaign the
    /// account administers. Single-record failures are logged and dropped;
    /// the join proceeds with partial results.
    async fn administered_views(
        &self,
        account: &str,
        candidates: &[MetadataRecord],
    ) -> Vec<ViewRecord> {
        let fetches = candidates.iter().map(|record| async move {
            match self.administered_view(account, record).await {
                Ok(view) => view,
                Err(err) => {
                    warn!(
                        campaign = %record.campaign_address,
                        id = record.campaign_id,
                        %err,
                        "dropping campaign from join after fetch failure"
                    );
                    None
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn administered_view(
        &self,
        account: &str,
        record: &MetadataRecord,
    ) -> Result<Option<ViewRecord>, ClientError> {
        if !self
            .service
            .is_admin(account, &record.campaign_address)
            .await?
        {
            return Ok(None);
        }
        let detail = self
            .service
            .campaign_detail(record.campaign_id, &record.campaign_address)
            .await?;
        Ok(Some(ViewRecord::from_campaign(
            detail.campaign,
            Some(record.image_url.clone()),
        )))
    }

    /// Refresh the browse-everything view: one record per metadata entry,
    /// fetched from the ledger. Platform admins see every campaign;
    /// everyone else sees only active ones.
    pub async fn refresh_all(
        &self,
        viewer_is_admin: bool,
    ) -> Result<Vec<ViewRecord>, ClientError> {
        self.set_phase(JoinPhase::Fetching);
        let images = match self.metadata.query(MetadataFilter::all()).await {
            Ok(images) => images,
            Err(err) => {
                self.set_phase(JoinPhase::Idle);
                return Err(ClientError::AggregationFailed {
                    reason: err.to_string(),
                });
            }
        };

        self.set_phase(JoinPhase::Merging);
        let images = crate::metadata::dedupe_latest(&images);
        let fetches = images.iter().map(|record| async move {
            match self
                .service
                .campaign_detail(record.campaign_id, &record.campaign_address)
                .await
            {
                Ok(detail) => Some(ViewRecord::from_campaign(
                    detail.campaign,
                    Some(record.image_url.clone()),
                )),
                Err(err) => {
                    warn!(
                        campaign = %record.campaign_address,
                        id = record.campaign_id,
                        %err,
                        "dropping campaign from browse view after fetch failure"
                    );
                    None
                }
            }
        });

        let mut seen = HashSet::new();
        let views = join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .filter(|view| viewer_is_admin || StatusFilter::Active.matches_view(view))
            .filter(|view| seen.insert(view.composite_key()))
            .collect();
        self.set_phase(JoinPhase::Ready);
        Ok(views)
    }

    /// Whether the account administers the platform campaign contract.
    /// Errors degrade to "not an admin" — the browse view must render for
    /// everyone.
    pub async fn is_platform_admin(&self, account: &str) -> bool {
        match self.service.is_admin(account, &self.platform_address).await {
            Ok(admin) => admin,
            Err(err) => {
                warn!(%err, "platform admin check failed, assuming non-admin");
                false
            }
        }
    }
}
