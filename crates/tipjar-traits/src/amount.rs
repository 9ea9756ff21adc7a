//! Exact fixed-point amounts in a currency's smallest unit.

use alloy_primitives::utils::{format_units, parse_units, UnitsError};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors produced while converting between human-readable and smallest-unit amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Input was empty or only whitespace
    #[error("amount is empty")]
    Empty,

    /// Input is not a plain decimal number
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// Input has more fractional digits than the currency can represent
    #[error("amount has more than {decimals} fractional digits")]
    TooPrecise {
        /// Decimal exponent of the currency
        decimals: u8,
    },

    /// The decimal exponent is outside what a 256-bit value can scale by
    #[error("unsupported decimals: {0}")]
    UnsupportedDecimals(u8),

    /// Scaled value does not fit in 256 bits
    #[error("amount overflows the smallest-unit range")]
    Overflow,
}

/// Represents a blockchain amount in the currency's smallest unit.
///
/// All arithmetic is integer arithmetic; floating point never touches the
/// value, so `"0.01"` with 18 decimals is exactly `10_000_000_000_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The value in the smallest unit of the currency
    pub value: U256,
    /// Number of decimal places for the currency (e.g., 18 for EVM native coins)
    pub decimals: u8,
}

impl Amount {
    /// Creates a new Amount from the smallest unit value
    pub fn from_smallest_unit(value: U256, decimals: u8) -> Self {
        Self { value, decimals }
    }

    /// Parses a human-readable decimal string and scales it by `10^decimals`.
    ///
    /// Accepts `12`, `12.5`, `.5` and `12.`, with surrounding whitespace
    /// ignored. Signs, exponents and digit separators are rejected, as is any
    /// input with more fractional digits than `decimals`.
    pub fn parse_units(text: &str, decimals: u8) -> Result<Self, AmountError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }

        // alloy truncates excess precision and accepts a sign, so both are
        // ruled out before handing over.
        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(AmountError::Malformed(text.to_string()));
        }
        if fraction.len() > decimals as usize {
            return Err(AmountError::TooPrecise { decimals });
        }

        let whole = if whole.is_empty() { "0" } else { whole };
        let normalized = if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        };
        let value = parse_units(&normalized, decimals)
            .map_err(|err| units_error(err, decimals))?
            .get_absolute();

        // Scaling wraps on overflow, which shows up as a changed whole part.
        let scaled = format_units(value, decimals).map_err(|err| units_error(err, decimals))?;
        let scaled_whole = scaled.split('.').next().unwrap_or_default();
        if scaled_whole.trim_start_matches('0') != whole.trim_start_matches('0') {
            return Err(AmountError::Overflow);
        }
        Ok(Self { value, decimals })
    }

    /// Returns the value in the smallest unit
    pub fn smallest_unit(&self) -> U256 {
        self.value
    }

    /// Formats the value in main units without losing precision.
    ///
    /// Trailing fractional zeros are trimmed but one fractional digit is
    /// always kept, so one whole coin renders as `1.0`.
    pub fn format_units(&self) -> String {
        if self.decimals == 0 {
            return self.value.to_string();
        }
        let Ok(formatted) = format_units(self.value, self.decimals) else {
            return self.value.to_string();
        };

        match formatted.split_once('.') {
            Some((whole, fraction)) => {
                let fraction = fraction.trim_end_matches('0');
                if fraction.is_empty() {
                    format!("{whole}.0")
                } else {
                    format!("{whole}.{fraction}")
                }
            }
            None => format!("{formatted}.0"),
        }
    }

    /// Returns zero amount with the specified decimals
    pub fn zero(decimals: u8) -> Self {
        Self { value: U256::ZERO, decimals }
    }

    /// Checks if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

fn units_error(err: UnitsError, decimals: u8) -> AmountError {
    match err {
        UnitsError::InvalidUnit(_) => AmountError::UnsupportedDecimals(decimals),
        // Digits were checked already, so the only remaining failure is range.
        _ => AmountError::Overflow,
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_units())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self { value: U256::ZERO, decimals: 18 }
    }
}
