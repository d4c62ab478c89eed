//! Shared type definitions for the Undugu donation platform client.
//!
//! The ledger (smart contract) is authoritative for all financial state;
//! the off-chain metadata store only supplies presentation metadata. The
//! types here are the canonical shapes both sides are normalized into.

pub mod campaign;
pub mod error;
pub mod event;
pub mod primitives;
pub mod units;

#[cfg(test)]
mod tests {
    use crate::campaign::{CampaignRecord, StatusFilter, ViewRecord};
    use crate::primitives::Amount;

    fn campaign(id: u64, completed: bool, cancelled: bool) -> CampaignRecord {
        CampaignRecord {
            id,
            campaign_address: "0xAbCd000000000000000000000000000000000001".to_string(),
            title: format!("campaign-{id}"),
            description: "a test fundraiser".to_string(),
            target_amount: 2_000_000_000_000_000_000,
            raised_amount: 500_000_000_000_000_000,
            balance: 500_000_000_000_000_000,
            deadline: 1_735_689_600,
            is_completed: completed,
            is_cancelled: cancelled,
        }
    }

    #[test]
    fn test_status_filter_active() {
        assert!(StatusFilter::Active.matches(&campaign(1, false, false)));
        assert!(!StatusFilter::Active.matches(&campaign(1, true, false)));
        assert!(!StatusFilter::Active.matches(&campaign(1, false, true)));
    }

    #[test]
    fn test_status_filter_excludes_cancelled_from_active() {
        // A record that is both completed and cancelled must never show up
        // as Active, but is included under Cancelled.
        let both = campaign(7, true, true);
        assert!(!StatusFilter::Active.matches(&both));
        assert!(StatusFilter::Cancelled.matches(&both));
    }

    #[test]
    fn test_status_filter_all() {
        assert!(StatusFilter::All.matches(&campaign(1, true, false)));
        assert!(StatusFilter::All.matches(&campaign(1, false, true)));
        assert!(StatusFilter::All.matches(&campaign(1, false, false)));
    }

    #[test]
    fn test_composite_key_is_case_insensitive() {
        let mut a = campaign(3, false, false);
        let mut b = campaign(3, false, false);
        a.campaign_address = "0xABCD000000000000000000000000000000000001".to_string();
        b.campaign_address = "0xabcd000000000000000000000000000000000001".to_string();
        let va = ViewRecord::from_campaign(a, None);
        let vb = ViewRecord::from_campaign(b, None);
        assert_eq!(va.composite_key(), vb.composite_key());
    }

    #[test]
    fn test_view_record_serde_roundtrip_large_amounts() {
        let mut c = campaign(9, false, false);
        c.raised_amount = "123456789012345678901234567890".parse::<Amount>().unwrap();
        c.target_amount = Amount::MAX;
        let view = ViewRecord::from_campaign(c, Some("https://img.example/9.png".to_string()));
        let json = serde_json::to_string(&view).unwrap();
        let back: ViewRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(view, back);
        // Amounts must travel as decimal strings, never as JSON numbers.
        assert!(json.contains("\"123456789012345678901234567890\""));
    }
}
