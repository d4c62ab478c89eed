//! Minor-unit / display-unit conversion.
//!
//! All financial arithmetic is integer-only; floating point is forbidden
//! anywhere an amount is computed. The only place floats would be tolerable
//! is terminal display formatting, which this crate does not do.

use crate::error::ClientError;
use crate::primitives::{Amount, Timestamp, WEI_PER_UNIT};

/// Number of decimal places in the native token.
const DECIMALS: usize = 18;

/// Convert a minor-unit amount to a display-unit decimal string, exactly.
///
/// Trailing fractional zeros are trimmed: `1_500_000_000_000_000_000` wei
/// renders as `"1.5"`, whole amounts render with no fractional part.
pub fn from_wei(amount: Amount) -> String {
    let whole = amount / WEI_PER_UNIT;
    let frac = amount % WEI_PER_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:018}");
    let frac = frac.trim_end_matches('0');
    format!("{whole}.{frac}")
}

/// Parse a display-unit decimal string into a minor-unit amount, exactly.
///
/// Accepts at most 18 fractional digits; rejects empty input, non-digit
/// characters, and values that overflow `Amount`.
pub fn to_wei(display: &str) -> Result<Amount, ClientError> {
    let display = display.trim();
    let (whole, frac) = match display.split_once('.') {
        Some((w, f)) => (w, f),
        None => (display, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(ClientError::InvalidAmount {
            reason: "empty amount".to_string(),
        });
    }
    if frac.len() > DECIMALS {
        return Err(ClientError::InvalidAmount {
            reason: format!("more than {DECIMALS} decimal places"),
        });
    }
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_only(whole) || !digits_only(frac) {
        return Err(ClientError::InvalidAmount {
            reason: format!("malformed decimal '{display}'"),
        });
    }
    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ClientError::InvalidAmount {
            reason: "integer part overflows".to_string(),
        })?
    };
    let mut padded = frac.to_string();
    while padded.len() < DECIMALS {
        padded.push('0');
    }
    let frac: Amount = if padded.is_empty() {
        0
    } else {
        padded.parse().map_err(|_| ClientError::InvalidAmount {
            reason: "fractional part unparsable".to_string(),
        })?
    };
    whole
        .checked_mul(WEI_PER_UNIT)
        .and_then(|w| w.checked_add(frac))
        .ok_or(ClientError::InvalidAmount {
            reason: "amount overflows".to_string(),
        })
}

/// floor(raised * 100 / target), with two guards: a zero target yields 0
/// rather than a division error, and amounts too large to multiply by 100
/// fall back to dividing first.
pub fn progress_percent(raised: Amount, target: Amount) -> u64 {
    if target == 0 {
        return 0;
    }
    let percent = match raised.checked_mul(100) {
        Some(scaled) => scaled / target,
        None => (raised / target).saturating_mul(100),
    };
    u64::try_from(percent).unwrap_or(u64::MAX)
}

/// Render a campaign deadline as a human-readable date.
pub fn end_date_display(deadline: Timestamp) -> String {
    chrono::DateTime::from_timestamp(deadline as i64, 0)
        .map(|dt| dt.format("%-d %b %Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wei_whole_and_fraction() {
        assert_eq!(from_wei(0), "0");
        assert_eq!(from_wei(WEI_PER_UNIT), "1");
        assert_eq!(from_wei(WEI_PER_UNIT + WEI_PER_UNIT / 2), "1.5");
        assert_eq!(from_wei(1), "0.000000000000000001");
    }

    #[test]
    fn test_to_wei_round_trips_from_wei() {
        for amount in [
            0,
            1,
            WEI_PER_UNIT,
            WEI_PER_UNIT * 3 / 2,
            123_456_789_012_345_678_901_234_567_890,
        ] {
            assert_eq!(to_wei(&from_wei(amount)).unwrap(), amount);
        }
    }

    #[test]
    fn test_to_wei_rejects_malformed_input() {
        assert!(to_wei("").is_err());
        assert!(to_wei(".").is_err());
        assert!(to_wei("1.2.3").is_err());
        assert!(to_wei("1e18").is_err());
        assert!(to_wei("-1").is_err());
        // 19 fractional digits
        assert!(to_wei("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_to_wei_accepts_bare_fraction() {
        assert_eq!(to_wei("0.5").unwrap(), WEI_PER_UNIT / 2);
        assert_eq!(to_wei(".5").unwrap(), WEI_PER_UNIT / 2);
    }

    #[test]
    fn test_progress_percent_floor() {
        assert_eq!(progress_percent(0, 100), 0);
        assert_eq!(progress_percent(33, 100), 33);
        assert_eq!(progress_percent(999, 1000), 99);
        assert_eq!(progress_percent(100, 100), 100);
    }

    #[test]
    fn test_progress_percent_zero_target() {
        assert_eq!(progress_percent(1_000_000, 0), 0);
    }

    #[test]
    fn test_progress_percent_over_raised() {
        // Over-raised campaigns legitimately exceed 100.
        assert_eq!(progress_percent(250, 100), 250);
    }

    #[test]
    fn test_progress_percent_huge_amounts() {
        let raised = Amount::MAX / 50;
        let target = Amount::MAX / 25;
        assert_eq!(progress_percent(raised, target), 50);
        // Saturating fallback path: raised * 100 overflows.
        let raised = Amount::MAX / 2;
        let target = Amount::MAX / 2;
        assert_eq!(progress_percent(raised, target), 100);
    }
}
