/// 0x-prefixed hex account or contract identifier.
///
/// Addresses are compared case-insensitively wherever two sources are
/// joined, because the ledger and the metadata store do not agree on
/// checksum casing.
pub type Address = String;

/// Campaign identifier, unique per campaign address.
pub type CampaignId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Amount in minor units ("wei"; the native token uses 18 decimals).
pub type Amount = u128;

/// Minor units per display unit.
pub const WEI_PER_UNIT: Amount = 1_000_000_000_000_000_000;

/// Serde helper for `Amount` fields.
///
/// Serializes as a decimal string so the value survives any text cache
/// medium exactly; deserializes from either a decimal string or a JSON
/// integer, since ledger call results arrive in both shapes.
pub mod serde_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u128),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(t) => t
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom("expected a decimal amount string")),
        }
    }
}

/// Elide an address for user-facing notifications: `0x1234...abcd`.
///
/// Anything too short to elide, or not sliceable at the elision points
/// (addresses are ASCII, but the input is arbitrary text), is returned
/// unchanged.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    match (address.get(..6), address.get(address.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{head}...{tail}"),
        _ => address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "serde_amount")]
        amount: Amount,
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let w = Wrapper {
            amount: 123456789012345678901234567890,
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"amount":"123456789012345678901234567890"}"#);
    }

    #[test]
    fn test_amount_deserializes_from_string_or_number() {
        let from_str: Wrapper = serde_json::from_str(r#"{"amount":"42"}"#).unwrap();
        let from_num: Wrapper = serde_json::from_str(r#"{"amount":42}"#).unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_amount_rejects_garbage() {
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"amount":"not-a-number"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x7BFF65F1845b69Da42E64B68b64f49411874a22d"),
            "0x7BFF...a22d"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_short_address_non_ascii_returned_unchanged() {
        // A multibyte char straddling an elision point must not panic.
        let odd = "0x123é45678901";
        assert_eq!(short_address(odd), odd);
        // Boundary-aligned multibyte tails still elide: the last 4 bytes
        // here are the final two chars.
        let odd_tail = "0x1234567890ééé";
        assert_eq!(short_address(odd_tail), "0x1234...éé");
    }
}
