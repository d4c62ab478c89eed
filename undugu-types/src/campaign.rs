use serde::{Deserialize, Serialize};

use crate::primitives::{serde_amount, Address, Amount, CampaignId, Timestamp};
use crate::units;

/// A campaign as recorded on the ledger. Authoritative for all financial
/// state; mutated only by further ledger transactions, never deleted.
///
/// The ledger enforces that `is_completed` and `is_cancelled` are mutually
/// exclusive once either is set; this client does not re-validate that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: CampaignId,
    pub campaign_address: Address,
    pub title: String,
    pub description: String,
    #[serde(with = "serde_amount")]
    pub target_amount: Amount,
    #[serde(with = "serde_amount")]
    pub raised_amount: Amount,
    /// Remaining withdrawable balance, always <= raised_amount.
    #[serde(with = "serde_amount")]
    pub balance: Amount,
    pub deadline: Timestamp,
    pub is_completed: bool,
    pub is_cancelled: bool,
}

/// Off-chain image metadata, keyed by `(campaign_address, campaign_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub campaign_address: Address,
    pub campaign_id: CampaignId,
    pub image_url: String,
}

impl MetadataRecord {
    /// Whether this record describes the given campaign. Address comparison
    /// is case-insensitive.
    pub fn matches(&self, campaign_address: &str, campaign_id: CampaignId) -> bool {
        self.campaign_id == campaign_id
            && self.campaign_address.eq_ignore_ascii_case(campaign_address)
    }
}

/// Display-ready projection of a campaign joined with its off-chain image.
///
/// Derived and ephemeral: the cache holds a serialized copy, never the live
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub id: CampaignId,
    pub campaign_address: Address,
    pub title: String,
    pub description: String,
    #[serde(with = "serde_amount")]
    pub target_amount: Amount,
    #[serde(with = "serde_amount")]
    pub raised_amount: Amount,
    #[serde(with = "serde_amount")]
    pub balance: Amount,
    pub deadline: Timestamp,
    pub is_completed: bool,
    pub is_cancelled: bool,
    pub image_url: Option<String>,
    /// Localized date string derived from `deadline`.
    pub end_date: String,
    /// floor(raised * 100 / target); 0 when the target is zero. May exceed
    /// 100 for over-raised campaigns; callers decide whether to clamp.
    pub progress: u64,
}

impl ViewRecord {
    /// Build a view record from a ledger campaign and an optional image URL.
    pub fn from_campaign(campaign: CampaignRecord, image_url: Option<String>) -> Self {
        let end_date = units::end_date_display(campaign.deadline);
        let progress = units::progress_percent(campaign.raised_amount, campaign.target_amount);
        Self {
            id: campaign.id,
            campaign_address: campaign.campaign_address,
            title: campaign.title,
            description: campaign.description,
            target_amount: campaign.target_amount,
            raised_amount: campaign.raised_amount,
            balance: campaign.balance,
            deadline: campaign.deadline,
            is_completed: campaign.is_completed,
            is_cancelled: campaign.is_cancelled,
            image_url,
            end_date,
            progress,
        }
    }

    /// The sole deduplication and map key: `"{address}-{id}"`, address
    /// lowercased so differently-checksummed copies of the same campaign
    /// collide as intended.
    pub fn composite_key(&self) -> String {
        format!("{}-{}", self.campaign_address.to_ascii_lowercase(), self.id)
    }
}

/// A donor entry from a campaign's ledger donor list. List order is the
/// ledger's declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRecord {
    pub address: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

/// A withdrawal entry from a campaign's ledger withdrawal log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub campaign_id: CampaignId,
    pub title: String,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
    /// Admin that initiated the withdrawal.
    pub by: Address,
    /// Recipient of the funds.
    pub to: Address,
}

/// One of the caller's own donations, as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub campaign_address: Address,
    pub campaign_id: CampaignId,
    pub title: String,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

/// Arguments for creating a new campaign. `target` is a display-unit
/// decimal string; conversion to minor units happens at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCampaignArgs {
    pub title: String,
    pub description: String,
    pub target: String,
    pub duration_days: u64,
}

/// Lifecycle filter applied to campaign views. Each filter owns one cache
/// entry, named by `view_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFilter {
    Active,
    Completed,
    Cancelled,
    /// The browse-everything view ("other" campaigns).
    All,
}

impl StatusFilter {
    /// Whether a campaign belongs to this view given its ledger state at
    /// fetch time.
    pub fn matches(&self, campaign: &CampaignRecord) -> bool {
        match self {
            StatusFilter::Active => !campaign.is_completed && !campaign.is_cancelled,
            StatusFilter::Completed => campaign.is_completed,
            StatusFilter::Cancelled => campaign.is_cancelled,
            StatusFilter::All => true,
        }
    }

    /// Same predicate, applied post-join.
    pub fn matches_view(&self, view: &ViewRecord) -> bool {
        match self {
            StatusFilter::Active => !view.is_completed && !view.is_cancelled,
            StatusFilter::Completed => view.is_completed,
            StatusFilter::Cancelled => view.is_cancelled,
            StatusFilter::All => true,
        }
    }

    /// Cache entry name for this view.
    pub fn view_key(&self) -> &'static str {
        match self {
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
            StatusFilter::Cancelled => "Cancelled",
            StatusFilter::All => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_matches_ignores_address_case() {
        let record = MetadataRecord {
            campaign_address: "0xAbC1".to_string(),
            campaign_id: 4,
            image_url: "https://img.example/4.png".to_string(),
        };
        assert!(record.matches("0xabc1", 4));
        assert!(!record.matches("0xabc1", 5));
        assert!(!record.matches("0xabc2", 4));
    }

    #[test]
    fn test_view_key_names() {
        assert_eq!(StatusFilter::Active.view_key(), "Active");
        assert_eq!(StatusFilter::Completed.view_key(), "Completed");
        assert_eq!(StatusFilter::Cancelled.view_key(), "Cancelled");
        assert_eq!(StatusFilter::All.view_key(), "other");
    }

    #[test]
    fn test_from_campaign_guards_zero_target() {
        let campaign = CampaignRecord {
            id: 1,
            campaign_address: "0x01".to_string(),
            title: String::new(),
            description: String::new(),
            target_amount: 0,
            raised_amount: 10,
            balance: 10,
            deadline: 0,
            is_completed: false,
            is_cancelled: false,
        };
        let view = ViewRecord::from_campaign(campaign, None);
        assert_eq!(view.progress, 0);
    }
}
