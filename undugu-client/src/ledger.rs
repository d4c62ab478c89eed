use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use undugu_types::error::ClientError;
use undugu_types::event::{EventKind, LedgerEvent};
use undugu_types::primitives::{Address, Amount};

/// Wallet-level code for a user declining to sign.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Receipt for a mined state-changing transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub block_hash: String,
}

/// Raw failure from submitting a transaction, before classification.
///
/// `code` is the wallet-level error code when the wallet itself rejected
/// the request; `message` carries the revert reason (or transport error)
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxError {
    pub code: Option<i64>,
    pub message: String,
}

impl TxError {
    pub fn reverted(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn rejected() -> Self {
        Self {
            code: Some(USER_REJECTED_CODE),
            message: "user rejected the request".to_string(),
        }
    }
}

/// Read/write access to the donation contract.
///
/// Explicitly constructed and injected (never ambient global state) so the
/// facade and join engine can run against a test double. Read results are
/// loosely shaped: depending on the call path the same logical entity may
/// arrive as a named-field object or a positional tuple, so `call` returns
/// raw JSON and the normalizer sorts it out.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read-only contract query. `from` sets the caller perspective for
    /// methods that scope their result to the sender.
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        from: Option<&str>,
    ) -> Result<serde_json::Value, ClientError>;

    /// State-changing transaction from the given account, optionally
    /// attaching native value (donations).
    async fn send(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        from: &str,
        value: Option<Amount>,
    ) -> Result<TxReceipt, TxError>;

    /// The connected signing account, if any.
    fn active_account(&self) -> Option<Address>;

    /// Native-token balance of an account, in minor units.
    async fn balance_of(&self, account: &str) -> Result<Amount, ClientError>;

    /// Subscribe to contract events of one kind.
    fn subscribe(&self, kind: EventKind) -> broadcast::Receiver<LedgerEvent>;
}

/// Per-kind fan-out of contract events to any number of subscribers.
///
/// The sending side is fed by whatever watches the chain (a node push
/// channel, a log poller); this crate only consumes receivers.
pub struct EventHub {
    channels: std::collections::HashMap<EventKind, broadcast::Sender<LedgerEvent>>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let channels = EventKind::ALL
            .iter()
            .map(|kind| {
                let (tx, _) = broadcast::channel(capacity);
                (*kind, tx)
            })
            .collect();
        Self { channels }
    }

    pub fn subscribe(&self, kind: EventKind) -> broadcast::Receiver<LedgerEvent> {
        self.channels[&kind].subscribe()
    }

    /// Deliver an event to its kind's subscribers. Returns the number of
    /// receivers it reached.
    pub fn publish(&self, event: LedgerEvent) -> usize {
        let tx = &self.channels[&event.kind()];
        tx.send(event).unwrap_or(0)
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_hub_routes_by_kind() {
        let hub = EventHub::new(8);
        let mut cancelled = hub.subscribe(EventKind::CampaignCancelled);
        let mut created = hub.subscribe(EventKind::CampaignCreated);

        hub.publish(LedgerEvent::CampaignCancelled { campaign_id: 5 });
        assert_eq!(
            cancelled.recv().await.unwrap(),
            LedgerEvent::CampaignCancelled { campaign_id: 5 }
        );
        // Nothing crossed over to the other kind's channel.
        assert!(created.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let hub = EventHub::new(8);
        assert_eq!(
            hub.publish(LedgerEvent::CampaignCancelled { campaign_id: 1 }),
            0
        );
    }
}
