//! Tip amount validation.

use tipjar_error::{Result, TipjarError};
use tipjar_traits::Amount;

/// Address that receives every tip. Fixed at build time.
pub const TIP_RECIPIENT: &str = "0xb128FC43C07eBE66976f22CB736f166205C1CFa7";

/// Decimal exponent of the target chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Symbol of the target chain's native currency.
pub const NATIVE_SYMBOL: &str = "KAIA";

/// Advisory lower bound shown on the amount input. Not enforced.
pub const INPUT_MIN: &str = "0.001";

/// Advisory step shown on the amount input. Not enforced.
pub const INPUT_STEP: &str = "0.001";

/// Parses the raw tip input into an exact amount strictly greater than zero.
pub fn parse_tip_amount(input: &str, decimals: u8) -> Result<Amount> {
    let amount = Amount::parse_units(input, decimals)?;
    if amount.is_zero() {
        return Err(TipjarError::NonPositiveAmount);
    }
    Ok(amount)
}

/// Returns true when [`parse_tip_amount`] would accept `input`.
pub fn is_valid_tip_amount(input: &str, decimals: u8) -> bool {
    parse_tip_amount(input, decimals).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tipjar_error::ErrorCode;
    use tipjar_traits::U256;

    #[test]
    fn test_rejects_gating_inputs() {
        for input in ["", "0", "-1", "abc"] {
            assert!(parse_tip_amount(input, NATIVE_DECIMALS).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_zero_is_non_positive() {
        let err = parse_tip_amount("0.000", NATIVE_DECIMALS).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NonPositiveAmount);
    }

    #[test]
    fn test_below_advisory_minimum_is_accepted() {
        // min/step are input hints; only > 0 is enforced
        let amount = parse_tip_amount("0.0001", NATIVE_DECIMALS).unwrap();
        assert_eq!(amount.smallest_unit(), U256::from(100_000_000_000_000u64));
    }

    #[test]
    fn test_tip_value_in_smallest_units() {
        let amount = parse_tip_amount("0.01", NATIVE_DECIMALS).unwrap();
        assert_eq!(amount.smallest_unit(), U256::from(10_000_000_000_000_000u64));
    }

    #[test]
    fn test_recipient_is_an_evm_address() {
        assert!(TIP_RECIPIENT.starts_with("0x"));
        assert_eq!(TIP_RECIPIENT.len(), 42);
    }

    proptest! {
        #[test]
        fn test_negative_numbers_rejected(n in 0u64..1_000_000) {
            let input = format!("-{n}");
            prop_assert!(!is_valid_tip_amount(&input, NATIVE_DECIMALS));
        }

        #[test]
        fn test_positive_integers_accepted(n in 1u64..1_000_000) {
            prop_assert!(is_valid_tip_amount(&n.to_string(), NATIVE_DECIMALS));
        }
    }
}
