//! Event-driven cache invalidation and notification.
//!
//! Listeners are one-shot: after first delivery each detaches on its own.
//! Every mutating event additionally triggers a view refresh through the
//! shared refresh hook — the ledger moved, so cached financial fields are
//! stale. (The original client only refreshed on creation events; that was
//! a gap, not a design.)

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, warn};

use undugu_types::campaign::MetadataRecord;
use undugu_types::event::{EventKind, LedgerEvent};
use undugu_types::primitives::short_address;
use undugu_types::units;

use crate::ledger::LedgerClient;
use crate::metadata::MetadataStore;
use crate::notify::Notifier;

/// Scope-owned set of listener tasks, released together when the owning
/// view goes away. Dropping the set aborts anything still waiting, so
/// re-subscribing never accumulates duplicate handlers.
pub struct SubscriptionSet {
    handles: Vec<JoinHandle<()>>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    pub fn push(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Detach every listener now.
    pub fn release(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Default for SubscriptionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Image captured at form time, uploaded once the creation event confirms
/// the campaign's ledger identity.
#[derive(Debug, Clone)]
pub struct PendingImage {
    /// Original file name; only the extension is kept.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PendingImage {
    fn extension(&self) -> &str {
        self.file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("png")
    }
}

/// Shared side effect run after any event that mutates campaign state.
pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

/// Wires one-shot ledger event listeners to their side effects.
pub struct Invalidator {
    ledger: Arc<dyn LedgerClient>,
    metadata: Arc<dyn MetadataStore>,
    notifier: Arc<dyn Notifier>,
    refresh_hook: RefreshHook,
}

impl Invalidator {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        metadata: Arc<dyn MetadataStore>,
        notifier: Arc<dyn Notifier>,
        refresh_hook: RefreshHook,
    ) -> Self {
        Self {
            ledger,
            metadata,
            notifier,
            refresh_hook,
        }
    }

    /// One one-shot listener for `kind`. Stream-level errors are logged
    /// here, per subscription, without touching the others.
    fn listen_once<F>(&self, kind: EventKind, handler: F) -> JoinHandle<()>
    where
        F: FnOnce(LedgerEvent) + Send + 'static,
    {
        let mut rx = self.ledger.subscribe(kind);
        tokio::spawn(async move {
            match rx.recv().await {
                Ok(event) => handler(event),
                Err(err) => error!(?kind, %err, "event stream error"),
            }
        })
    }

    /// Subscriptions for the caller's fundraiser page: creation (with the
    /// deferred image upload) and admin roster changes.
    pub fn watch_my_fundraisers(&self, pending: Option<PendingImage>) -> SubscriptionSet {
        let mut subs = SubscriptionSet::new();

        let metadata = Arc::clone(&self.metadata);
        let notifier = Arc::clone(&self.notifier);
        let refresh = Arc::clone(&self.refresh_hook);
        subs.push(
            self.listen_once(EventKind::CampaignCreated, move |event| {
                let LedgerEvent::CampaignCreated {
                    campaign_id,
                    campaign_address,
                    title,
                } = event
                else {
                    return;
                };
                tokio::spawn(async move {
                    if let Some(pending) = pending {
                        let name =
                            format!("{campaign_address}_{campaign_id}.{}", pending.extension());
                        match upload_campaign_image(
                            &*metadata,
                            &campaign_address,
                            campaign_id,
                            &name,
                            pending.bytes,
                        )
                        .await
                        {
                            Ok(()) => notifier.success(&format!(
                                "'{title}' Fundraiser Was Created Successfully!"
                            )),
                            Err(err) => warn!(%err, "failed to upload campaign image"),
                        }
                    }
                    refresh();
                });
            }),
        );

        let notifier = Arc::clone(&self.notifier);
        subs.push(self.listen_once(EventKind::AdminAdded, move |event| {
            if let LedgerEvent::AdminAdded { admin } = event {
                notifier.success(&format!(
                    "Added {} As Fundraiser Admin",
                    short_address(&admin)
                ));
            }
        }));

        let notifier = Arc::clone(&self.notifier);
        subs.push(self.listen_once(EventKind::AdminRemoved, move |event| {
            if let LedgerEvent::AdminRemoved { admin } = event {
                notifier.success(&format!(
                    "Removed {} As Fundraiser Admin",
                    short_address(&admin)
                ));
            }
        }));

        subs
    }

    /// Subscriptions for a campaign detail page: every fund movement and
    /// the cancellation, each notifying and refreshing once.
    pub fn watch_campaign_activity(&self) -> SubscriptionSet {
        let mut subs = SubscriptionSet::new();

        let notifier = Arc::clone(&self.notifier);
        let refresh = Arc::clone(&self.refresh_hook);
        subs.push(self.listen_once(EventKind::CampaignCancelled, move |event| {
            if let LedgerEvent::CampaignCancelled { campaign_id } = event {
                notifier.success(&format!("You Have Cancelled Fundraiser of ID {campaign_id}"));
                refresh();
            }
        }));

        let notifier = Arc::clone(&self.notifier);
        let refresh = Arc::clone(&self.refresh_hook);
        subs.push(self.listen_once(EventKind::DonationReceived, move |event| {
            if let LedgerEvent::DonationReceived { amount, .. } = event {
                notifier.success(&format!(
                    "Received Donation of {} ETH, Thank You",
                    units::from_wei(amount)
                ));
                refresh();
            }
        }));

        let notifier = Arc::clone(&self.notifier);
        let refresh = Arc::clone(&self.refresh_hook);
        subs.push(self.listen_once(EventKind::FundsWithdrawn, move |event| {
            if let LedgerEvent::FundsWithdrawn { amount, to, .. } = event {
                notifier.success(&format!(
                    "{} ETH Sent To {}",
                    units::from_wei(amount),
                    short_address(&to)
                ));
                refresh();
            }
        }));

        let notifier = Arc::clone(&self.notifier);
        let refresh = Arc::clone(&self.refresh_hook);
        subs.push(self.listen_once(EventKind::DonorsRefunded, move |event| {
            if let LedgerEvent::DonorsRefunded { amount, to, .. } = event {
                notifier.success(&format!(
                    "Refunded Donor {} Amount {} ETH",
                    short_address(&to),
                    units::from_wei(amount)
                ));
                refresh();
            }
        }));

        subs
    }
}

/// Store the uploaded image and its metadata record for a newly created
/// campaign.
async fn upload_campaign_image(
    metadata: &dyn MetadataStore,
    campaign_address: &str,
    campaign_id: u64,
    name: &str,
    bytes: Vec<u8>,
) -> Result<(), undugu_types::error::ClientError> {
    let url = metadata.upload(name, bytes).await?;
    metadata
        .insert(MetadataRecord {
            campaign_address: campaign_address.to_string(),
            campaign_id,
            image_url: url,
        })
        .await
}
