//! Result normalizer: canonical records out of loosely-shaped call results.
//!
//! Depending on the call path, the same logical entity arrives either as a
//! named-field object or a positional tuple (and sometimes an object with
//! stringified index keys). Per field the extraction order is: named field,
//! then positional index, then a documented default (`0` for amounts, `""`
//! for strings, empty list for arrays). Both shapes are tolerated
//! indefinitely; nothing here ever errors — absent data degrades to an
//! empty/zero view.

use serde_json::Value;

use undugu_types::campaign::{
    CampaignRecord, DonationRecord, DonorRecord, WithdrawalRecord,
};
use undugu_types::primitives::{Address, Amount};

/// Resolve one logical field from a raw result: named lookup first, then
/// the stringified index key, then the positional array slot. `null` counts
/// as absent.
pub fn field<'a>(raw: &'a Value, name: &str, index: usize) -> Option<&'a Value> {
    let present = |v: &'a Value| if v.is_null() { None } else { Some(v) };
    match raw {
        Value::Object(map) => map
            .get(name)
            .and_then(present)
            .or_else(|| map.get(&index.to_string()).and_then(present)),
        Value::Array(items) => items.get(index).and_then(present),
        _ => None,
    }
}

/// Amount field: decimal string or integer, defaulting to 0.
pub fn read_amount(raw: &Value, name: &str, index: usize) -> Amount {
    match field(raw, name, index) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n
            .as_u128()
            .or_else(|| n.to_string().parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

/// Integer field, defaulting to 0.
pub fn read_u64(raw: &Value, name: &str, index: usize) -> u64 {
    match field(raw, name, index) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// String field, defaulting to the empty string.
pub fn read_string(raw: &Value, name: &str, index: usize) -> String {
    match field(raw, name, index) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Boolean field; accepts real booleans and `"true"`/`"false"` strings,
/// defaulting to false.
pub fn read_bool(raw: &Value, name: &str, index: usize) -> bool {
    match field(raw, name, index) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// List field, defaulting to empty.
pub fn read_array<'a>(raw: &'a Value, name: &str, index: usize) -> &'a [Value] {
    match field(raw, name, index) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// Canonical campaign out of either result shape.
pub fn normalize_campaign(raw: &Value) -> CampaignRecord {
    CampaignRecord {
        id: read_u64(raw, "campaign_id", 0),
        title: read_string(raw, "title", 1),
        description: read_string(raw, "description", 2),
        campaign_address: read_string(raw, "campaignAddress", 3),
        target_amount: read_amount(raw, "targetAmount", 4),
        raised_amount: read_amount(raw, "raisedAmount", 5),
        balance: read_amount(raw, "balance", 6),
        deadline: read_u64(raw, "deadline", 7),
        is_completed: read_bool(raw, "isCompleted", 8),
        is_cancelled: read_bool(raw, "isCancelled", 9),
    }
}

/// A whole `viewCampaigns` result.
pub fn normalize_campaign_list(raw: &Value) -> Vec<CampaignRecord> {
    match raw {
        Value::Array(items) => items.iter().map(normalize_campaign).collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_donor(raw: &Value) -> DonorRecord {
    DonorRecord {
        address: read_string(raw, "by", 0),
        amount: read_amount(raw, "amount", 1),
    }
}

pub fn normalize_withdrawal(raw: &Value) -> WithdrawalRecord {
    WithdrawalRecord {
        campaign_id: read_u64(raw, "campaignId", 0),
        title: read_string(raw, "title", 1),
        amount: read_amount(raw, "amount", 2),
        by: read_string(raw, "by", 3),
        to: read_string(raw, "to", 4),
    }
}

pub fn normalize_donation(raw: &Value) -> DonationRecord {
    DonationRecord {
        campaign_address: read_string(raw, "campaignAddress", 0),
        campaign_id: read_u64(raw, "campaignId", 1),
        title: read_string(raw, "title", 2),
        amount: read_amount(raw, "amount", 3),
    }
}

/// A `viewWithdrawals` result: the withdrawal log plus the admin candidate
/// list. The contract's own field name is the misspelled `withdrwals`, so
/// that spelling is tried first and the corrected one tolerated.
pub fn normalize_withdrawals_and_admins(raw: &Value) -> (Vec<WithdrawalRecord>, Vec<Address>) {
    let withdrawals_raw = field(raw, "withdrwals", 0)
        .or_else(|| field(raw, "withdrawals", 0))
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    let withdrawals = match &withdrawals_raw {
        Value::Array(items) => items.iter().map(normalize_withdrawal).collect(),
        _ => Vec::new(),
    };
    let admins = read_array(raw, "admins", 1)
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect();
    (withdrawals, admins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_campaign_from_object() {
        let raw = json!({
            "campaign_id": "7",
            "title": "Clean Water",
            "description": "borehole fund",
            "campaignAddress": "0xAb01",
            "targetAmount": "2000000000000000000",
            "raisedAmount": 500,
            "balance": "500",
            "deadline": 1735689600u64,
            "isCompleted": false,
            "isCancelled": "true",
        });
        let campaign = normalize_campaign(&raw);
        assert_eq!(campaign.id, 7);
        assert_eq!(campaign.title, "Clean Water");
        assert_eq!(campaign.target_amount, 2_000_000_000_000_000_000);
        assert_eq!(campaign.raised_amount, 500);
        assert!(!campaign.is_completed);
        assert!(campaign.is_cancelled);
    }

    #[test]
    fn test_normalize_campaign_from_tuple() {
        let raw = json!([
            3,
            "Школа",
            "library wing",
            "0xAb02",
            "1000",
            "250",
            "250",
            1700000000u64,
            true,
            false
        ]);
        let campaign = normalize_campaign(&raw);
        assert_eq!(campaign.id, 3);
        assert_eq!(campaign.campaign_address, "0xAb02");
        assert_eq!(campaign.raised_amount, 250);
        assert!(campaign.is_completed);
    }

    #[test]
    fn test_named_field_wins_over_positional() {
        let raw = json!({
            "0": "999",
            "campaign_id": "7",
        });
        assert_eq!(read_u64(&raw, "campaign_id", 0), 7);
        // With the name absent, the stringified index is the fallback.
        assert_eq!(read_u64(&raw, "missing", 0), 999);
    }

    #[test]
    fn test_absent_fields_degrade_to_defaults() {
        let campaign = normalize_campaign(&json!({}));
        assert_eq!(campaign.id, 0);
        assert_eq!(campaign.title, "");
        assert_eq!(campaign.target_amount, 0);
        assert!(!campaign.is_completed);

        // Null is absent, not a value.
        let raw = json!({ "amount": null });
        assert_eq!(read_amount(&raw, "amount", 1), 0);
    }

    #[test]
    fn test_normalize_donor_both_shapes() {
        let from_obj = normalize_donor(&json!({ "by": "0x01", "amount": "40" }));
        let from_tuple = normalize_donor(&json!(["0x01", "40"]));
        assert_eq!(from_obj, from_tuple);
        assert_eq!(from_obj.amount, 40);
    }

    #[test]
    fn test_normalize_withdrawals_tolerates_misspelling() {
        let misspelled = json!({
            "withdrwals": [["1", "Food Drive", "100", "0xaa", "0xbb"]],
            "admins": ["0xaa", "0xcc"],
        });
        let (withdrawals, admins) = normalize_withdrawals_and_admins(&misspelled);
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(withdrawals[0].amount, 100);
        assert_eq!(admins, vec!["0xaa".to_string(), "0xcc".to_string()]);

        let positional = json!([[["1", "Food Drive", "100", "0xaa", "0xbb"]], ["0xaa"]]);
        let (withdrawals, admins) = normalize_withdrawals_and_admins(&positional);
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(admins.len(), 1);
    }

    #[test]
    fn test_normalize_campaign_list_non_array() {
        assert!(normalize_campaign_list(&json!("nope")).is_empty());
    }

    #[test]
    fn test_huge_amount_survives_string_path() {
        let raw = json!({ "raisedAmount": "123456789012345678901234567890" });
        assert_eq!(
            read_amount(&raw, "raisedAmount", 5),
            123456789012345678901234567890u128
        );
    }
}
