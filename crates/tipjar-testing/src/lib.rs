//! # Tipjar Testing Infrastructure
//!
//! Testing utilities for the tipjar crates:
//! - Mock collaborators with scripted and gated outcomes
//! - Edge case inputs
//! - Property-based testing strategies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tipjar_testing::*;
//!
//! let sender = Arc::new(MockTransactionSender::gated());
//! // ... submit twice, then resolve the first call late
//! sender.wait_for_calls(2).await;
//! sender.resolve(0, Ok(TxHash::new("0xOLD")));
//!
//! proptest! {
//!     #[test]
//!     fn test_accepts_valid_input(input in valid_tip_input()) {
//!         // ...
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proptest::prelude::*;

mod mocks;
pub use mocks::{
    mock_balance, Gate, MockBalanceQuery, MockConnector, MockTransactionSender, MOCK_ADDRESS,
    MOCK_CHAIN_ID, MOCK_SYMBOL,
};

// ============================================================================
// Edge Case Tip Inputs
// ============================================================================

/// Edge case tip amount inputs, paired with the smallest-unit value they
/// should scale to at 18 decimals
pub struct EdgeCaseTipInputs;

impl EdgeCaseTipInputs {
    /// Inputs that must be accepted
    pub fn valid() -> Vec<(&'static str, u128)> {
        vec![
            ("0.01", 10_000_000_000_000_000),
            ("0.001", 1_000_000_000_000_000),
            ("1", 1_000_000_000_000_000_000),
            ("1.5", 1_500_000_000_000_000_000),
            (".5", 500_000_000_000_000_000),
            ("2.", 2_000_000_000_000_000_000),
            (" 3 ", 3_000_000_000_000_000_000),
            ("0.000000000000000001", 1),   // One smallest unit
            ("0.0001", 100_000_000_000_000), // Below the advisory minimum
        ]
    }

    /// Inputs that must be rejected
    pub fn invalid() -> Vec<&'static str> {
        vec![
            "",
            " ",
            "0",
            "0.0",
            "-1",
            "-0.01",
            "+1",
            "abc",
            "1e3",
            "1,000",
            "1.2.3",
            ".",
            "0x10",
            "0.0000000000000000001", // 19 fractional digits
            "NaN",
            "Infinity",
        ]
    }
}

// ============================================================================
// Edge Case Addresses
// ============================================================================

/// Edge case addresses for display tests
pub struct EdgeCaseAddresses;

impl EdgeCaseAddresses {
    /// The tip recipient
    pub const RECIPIENT: &'static str = "0xb128FC43C07eBE66976f22CB736f166205C1CFa7";

    /// Zero address
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    /// Exactly ten characters, so head and tail meet
    pub const TEN_CHARS: &'static str = "0123456789";

    /// Shorter than head plus tail
    pub const SHORT: &'static str = "0xAb";
}

// ============================================================================
// Property-Based Testing Strategies
// ============================================================================

/// Generates decimal strings of positive amounts with up to 18 fractional digits
pub fn valid_tip_input() -> impl Strategy<Value = String> {
    (0u64..1_000_000, "[0-9]{0,18}")
        .prop_filter("amount must be positive", |(whole, fraction)| {
            *whole > 0 || fraction.bytes().any(|b| b != b'0')
        })
        .prop_map(|(whole, fraction)| {
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        })
}

/// Generates negative decimal strings
pub fn negative_tip_input() -> impl Strategy<Value = String> {
    valid_tip_input().prop_map(|input| format!("-{input}"))
}

/// Generates zero written in various ways
pub fn zero_tip_input() -> impl Strategy<Value = String> {
    ("0{1,4}", "0{0,18}").prop_map(|(whole, fraction)| {
        if fraction.is_empty() {
            whole
        } else {
            format!("{whole}.{fraction}")
        }
    })
}

/// Generates EVM-style addresses
pub fn evm_address() -> impl Strategy<Value = String> {
    "[0-9a-fA-F]{40}".prop_map(|hex| format!("0x{hex}"))
}

/// Generates smallest-unit values that fit comfortably in 18 decimals
pub fn smallest_unit_value() -> impl Strategy<Value = u128> {
    0u128..=1_000_000_000_000_000_000_000_000
}

// ============================================================================
// Tests
// ============================================================================
