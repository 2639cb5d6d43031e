//! Fixed-point amount codec.
//!
//! Converts between the decimal strings a user types or reads and the integer
//! amounts the token contract stores, given the token's `decimals`.
//! Only integer and string arithmetic is used so large supplies never lose
//! precision.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Nothing to parse
    #[error("Amount is empty")]
    Empty,

    /// Not a plain base-10 number
    #[error("Invalid amount: {0}")]
    Malformed(String),

    /// Amounts are unsigned
    #[error("Amount must not be negative: {0}")]
    Negative(String),

    /// More significant fractional digits than the token supports
    #[error("Amount {amount} has more than {decimals} fractional digits")]
    ExcessPrecision { amount: String, decimals: u8 },

    /// Scaled value exceeds uint256
    #[error("Amount {0} does not fit in 256 bits")]
    Overflow(String),
}

/// Parse a decimal string into the contract's integer representation.
///
/// Accepts `"12"`, `"12.5"`, `"0.001"`, `".5"` and `"3."`. Trailing zeros past
/// `decimals` are ignored since they carry no value; any other digit past
/// `decimals` is rejected rather than truncated.
pub fn encode(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative(amount.to_string()));
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
    {
        return Err(AmountError::Malformed(amount.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    let scale = usize::from(decimals);
    if fraction.len() > scale {
        return Err(AmountError::ExcessPrecision {
            amount: amount.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + scale);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat_n('0', scale - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow(amount.to_string()))
}

/// Render an integer amount as the shortest exact decimal string.
///
/// `decode(1500000000000000000, 18)` is `"1.5"`, whole values have no
/// fractional part at all.
pub fn decode(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let scale = usize::from(decimals);
    if scale == 0 {
        return digits;
    }

    let padded = if digits.len() <= scale {
        let mut padded = "0".repeat(scale + 1 - digits.len());
        padded.push_str(&digits);
        padded
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - scale);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Insert thousands separators into the whole part of a decoded amount.
///
/// Display only; the result is not accepted by [`encode`].
pub fn group_thousands(amount: &str) -> String {
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 1);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_eighteen_decimals() {
        assert_eq!(
            encode("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u128)
        );
        assert_eq!(
            decode(U256::from(1_500_000_000_000_000_000u128), 18),
            "1.5"
        );
    }

    #[test]
    fn test_encode_two_decimals() {
        assert_eq!(encode("1.23", 2).unwrap(), U256::from(123));
        assert_eq!(
            encode("1.234", 2),
            Err(AmountError::ExcessPrecision {
                amount: "1.234".to_string(),
                decimals: 2
            })
        );
    }

    #[test]
    fn test_encode_ignores_trailing_zeros_past_precision() {
        assert_eq!(encode("1.230", 2).unwrap(), U256::from(123));
        assert_eq!(encode("7.000", 0).unwrap(), U256::from(7));
        assert!(encode("7.5", 0).is_err());
    }

    #[test]
    fn test_encode_accepts_partial_forms() {
        assert_eq!(encode(".5", 1).unwrap(), U256::from(5));
        assert_eq!(encode("3.", 1).unwrap(), U256::from(30));
        assert_eq!(encode("  42 ", 0).unwrap(), U256::from(42));
        assert_eq!(encode("000.010", 3).unwrap(), U256::from(10));
        assert_eq!(encode("0", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_encode_rejects_malformed_input() {
        assert_eq!(encode("", 18), Err(AmountError::Empty));
        assert_eq!(encode("   ", 18), Err(AmountError::Empty));
        assert!(matches!(encode(".", 18), Err(AmountError::Malformed(_))));
        assert!(matches!(encode("1.2.3", 18), Err(AmountError::Malformed(_))));
        assert!(matches!(encode("1e18", 18), Err(AmountError::Malformed(_))));
        assert!(matches!(encode("+1", 18), Err(AmountError::Malformed(_))));
        assert!(matches!(encode("1,000", 18), Err(AmountError::Malformed(_))));
        assert!(matches!(encode("-1", 18), Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_encode_overflow() {
        let max = U256::MAX.to_string();
        assert_eq!(encode(&max, 0).unwrap(), U256::MAX);
        assert!(matches!(encode(&max, 1), Err(AmountError::Overflow(_))));
    }

    #[test]
    fn test_decode_minimal_form() {
        assert_eq!(decode(U256::ZERO, 18), "0");
        assert_eq!(decode(U256::from(2), 0), "2");
        assert_eq!(decode(U256::from(1), 6), "0.000001");
        assert_eq!(decode(U256::from(1_000_000), 6), "1");
        assert_eq!(decode(U256::from(1_230_000), 6), "1.23");
        assert_eq!(
            decode(U256::from(2_500_000_000_000_000_000u128), 18),
            "2.5"
        );
    }

    #[test]
    fn test_decode_large_supply_is_exact() {
        // 10^30 tokens of 18 decimals, well past f64 precision
        let raw = U256::from(10).pow(U256::from(48)) + U256::from(1);
        assert_eq!(
            decode(raw, 18),
            "1000000000000000000000000000000.000000000000000001"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567.891"), "1,234,567.891");
    }

    proptest! {
        #[test]
        fn prop_decode_then_encode_round_trips(
            bytes in prop::array::uniform32(any::<u8>()),
            decimals in 0u8..=30,
        ) {
            let raw = U256::from_be_bytes(bytes);
            let text = decode(raw, decimals);
            prop_assert_eq!(encode(&text, decimals).unwrap(), raw);
        }

        #[test]
        fn prop_small_amounts_round_trip(raw in any::<u128>(), decimals in 0u8..=30) {
            let raw = U256::from(raw);
            prop_assert_eq!(encode(&decode(raw, decimals), decimals).unwrap(), raw);
        }
    }
}
