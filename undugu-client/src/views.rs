//! View manager: stale-while-revalidate over the join engine and the view
//! cache, with last-write-wins ordering across overlapping refreshes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use undugu_types::campaign::{StatusFilter, ViewRecord};
use undugu_types::error::ClientError;

use crate::cache::ViewCache;
use crate::join::JoinEngine;
use crate::notify::Notifier;

/// A refreshed view set as published to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewUpdate {
    pub filter: StatusFilter,
    pub records: Vec<ViewRecord>,
}

/// What a view request returns: whatever the cache had, immediately, plus
/// the in-flight background refresh.
pub struct ViewLoad {
    /// Cached records, present when the entry exists and is unexpired.
    pub cached: Option<Vec<ViewRecord>>,
    /// The refresh that was started unconditionally — the cache is never a
    /// substitute for one.
    pub refresh: JoinHandle<Result<Vec<ViewRecord>, ClientError>>,
}

/// Serves campaign views for one caller account.
pub struct CampaignViews {
    join: Arc<JoinEngine>,
    cache: ViewCache,
    notifier: Arc<dyn Notifier>,
    /// Monotonic tag handed to each refresh.
    next_generation: AtomicU64,
    /// Most recently applied refresh per view.
    applied: Mutex<HashMap<StatusFilter, AppliedView>>,
    results_tx: watch::Sender<Option<ViewUpdate>>,
}

struct AppliedView {
    generation: u64,
    records: Vec<ViewRecord>,
}

impl CampaignViews {
    pub fn new(join: Arc<JoinEngine>, cache: ViewCache, notifier: Arc<dyn Notifier>) -> Self {
        let (results_tx, _) = watch::channel(None);
        Self {
            join,
            cache,
            notifier,
            next_generation: AtomicU64::new(1),
            applied: Mutex::new(HashMap::new()),
            results_tx,
        }
    }

    /// Observe refreshed view sets as they are applied.
    pub fn subscribe_results(&self) -> watch::Receiver<Option<ViewUpdate>> {
        self.results_tx.subscribe()
    }

    /// Request a view: returns the cached set synchronously (if any) and
    /// starts a background refresh regardless of hit or miss.
    ///
    /// A failed refresh is returned typed and also routed to the
    /// notification channel with its fixed user-facing text.
    pub fn load(self: &Arc<Self>, account: &str, filter: StatusFilter) -> ViewLoad {
        let cached = self.cache.read(filter).unwrap_or(None);
        let this = Arc::clone(self);
        let account = account.to_string();
        let refresh = tokio::spawn(async move {
            let generation = this.begin_refresh();
            let result = match filter {
                StatusFilter::All => {
                    let is_admin = this.join.is_platform_admin(&account).await;
                    this.join.refresh_all(is_admin).await
                }
                _ => this.join.refresh_owned(&account, filter).await,
            };
            let outcome =
                result.and_then(|records| this.apply_refresh(filter, generation, records));
            if let Err(err) = &outcome {
                this.notifier.error(&err.user_message());
            }
            outcome
        });
        ViewLoad { cached, refresh }
    }

    /// Tag a new refresh. Exposed so overlap ordering is a testable
    /// property rather than an accident of scheduling.
    pub fn begin_refresh(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    /// Apply a finished refresh: write the cache entry and publish, unless
    /// a newer refresh for the same view already applied — then the late
    /// result is discarded and `false` returned (last-write-wins; stale
    /// data must not clobber fresh data).
    pub fn complete_refresh(
        &self,
        filter: StatusFilter,
        generation: u64,
        records: Vec<ViewRecord>,
    ) -> Result<bool, ClientError> {
        let mut applied = self.applied.lock().expect("applied lock poisoned");
        if applied
            .get(&filter)
            .is_some_and(|last| last.generation >= generation)
        {
            debug!(
                view = filter.view_key(),
                generation, "discarding stale refresh result"
            );
            return Ok(false);
        }
        self.cache.write(filter, &records)?;
        applied.insert(
            filter,
            AppliedView {
                generation,
                records: records.clone(),
            },
        );
        drop(applied);
        self.results_tx
            .send_replace(Some(ViewUpdate { filter, records }));
        Ok(true)
    }

    /// Apply a finished refresh and resolve it for the caller that awaited
    /// it. A refresh that lost the race resolves with the set the newer
    /// refresh published, never with the discarded records.
    pub fn apply_refresh(
        &self,
        filter: StatusFilter,
        generation: u64,
        records: Vec<ViewRecord>,
    ) -> Result<Vec<ViewRecord>, ClientError> {
        if self.complete_refresh(filter, generation, records.clone())? {
            Ok(records)
        } else {
            Ok(self.published(filter).unwrap_or(records))
        }
    }

    /// The most recently applied set for a view, if any refresh has
    /// completed for it.
    pub fn published(&self, filter: StatusFilter) -> Option<Vec<ViewRecord>> {
        self.applied
            .lock()
            .expect("applied lock poisoned")
            .get(&filter)
            .map(|applied| applied.records.clone())
    }
}
