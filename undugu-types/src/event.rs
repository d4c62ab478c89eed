use serde::{Deserialize, Serialize};

use crate::primitives::{serde_amount, Address, Amount, CampaignId};

/// Contract-emitted events consumed by this client. Each carries the
/// identifiers and amounts the contract puts in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    CampaignCreated {
        campaign_id: CampaignId,
        campaign_address: Address,
        title: String,
    },
    CampaignCancelled {
        campaign_id: CampaignId,
    },
    DonationReceived {
        campaign_id: CampaignId,
        campaign_address: Address,
        #[serde(with = "serde_amount")]
        amount: Amount,
    },
    FundsWithdrawn {
        campaign_id: CampaignId,
        #[serde(with = "serde_amount")]
        amount: Amount,
        to: Address,
    },
    DonorsRefunded {
        campaign_id: CampaignId,
        #[serde(with = "serde_amount")]
        amount: Amount,
        to: Address,
    },
    AdminAdded {
        admin: Address,
    },
    AdminRemoved {
        admin: Address,
    },
}

/// Event type tag, used to route subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CampaignCreated,
    CampaignCancelled,
    DonationReceived,
    FundsWithdrawn,
    DonorsRefunded,
    AdminAdded,
    AdminRemoved,
}

impl EventKind {
    /// Every event kind this client consumes.
    pub const ALL: [EventKind; 7] = [
        EventKind::CampaignCreated,
        EventKind::CampaignCancelled,
        EventKind::DonationReceived,
        EventKind::FundsWithdrawn,
        EventKind::DonorsRefunded,
        EventKind::AdminAdded,
        EventKind::AdminRemoved,
    ];
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::CampaignCreated { .. } => EventKind::CampaignCreated,
            LedgerEvent::CampaignCancelled { .. } => EventKind::CampaignCancelled,
            LedgerEvent::DonationReceived { .. } => EventKind::DonationReceived,
            LedgerEvent::FundsWithdrawn { .. } => EventKind::FundsWithdrawn,
            LedgerEvent::DonorsRefunded { .. } => EventKind::DonorsRefunded,
            LedgerEvent::AdminAdded { .. } => EventKind::AdminAdded,
            LedgerEvent::AdminRemoved { .. } => EventKind::AdminRemoved,
        }
    }

    /// Whether the event indicates the financial state of some campaign
    /// changed, i.e. cached views may be stale.
    pub fn mutates_campaign_state(&self) -> bool {
        !matches!(
            self,
            LedgerEvent::AdminAdded { .. } | LedgerEvent::AdminRemoved { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let event = LedgerEvent::DonationReceived {
            campaign_id: 1,
            campaign_address: "0x01".to_string(),
            amount: 5,
        };
        assert_eq!(event.kind(), EventKind::DonationReceived);
    }

    #[test]
    fn test_admin_events_do_not_mutate_campaign_state() {
        let added = LedgerEvent::AdminAdded {
            admin: "0x02".to_string(),
        };
        assert!(!added.mutates_campaign_state());
        let cancelled = LedgerEvent::CampaignCancelled { campaign_id: 3 };
        assert!(cancelled.mutates_campaign_state());
    }
}
