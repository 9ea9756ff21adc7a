//! # Tipjar Error
//!
//! Workspace-wide error type for the tipjar crates.
//!
//! ## Error Categories
//!
//! - Amount errors - tip input that is not a positive decimal amount
//! - Session errors - no connection, unknown connector, chain mismatch
//! - Collaborator errors - key, RPC and submission failures reported by a wallet or node
//! - Configuration errors - unreadable or invalid client configuration
//!
//! ## Example
//!
//! ```
//! use tipjar_error::{TipjarError, Result};
//!
//! fn require_connected(account: Option<&str>) -> Result<&str> {
//!     account.ok_or(TipjarError::NotConnected)
//! }
//!
//! assert!(require_connected(None).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;
use tipjar_traits::{AmountError, CapabilityError, CapabilityErrorKind};

/// The main error type for tipjar operations.
#[derive(Error, Debug)]
pub enum TipjarError {
    // ============ Amount Errors ============
    /// Tip amount could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Tip amount parsed but is zero
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    // ============ Session Errors ============
    /// No wallet session is established
    #[error("Wallet is not connected")]
    NotConnected,

    /// The requested connector is not currently offered
    #[error("Connector not available: {0}")]
    UnknownConnector(String),

    /// The wallet's chain differs from the configured chain
    #[error("Invalid chain ID: expected {expected}, got {got}")]
    ChainIdMismatch {
        /// Expected chain ID
        expected: u64,
        /// Actual chain ID
        got: u64,
    },

    /// Invalid address format
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The invalid address
        address: String,
        /// Reason for invalidity
        reason: String,
    },

    // ============ Collaborator Errors ============
    /// Transaction could not be signed or broadcast
    #[error("Failed to send transaction: {0}")]
    SubmissionFailed(String),

    /// RPC request failed
    #[error("RPC request failed: {method} - {reason}")]
    RpcRequestError {
        /// RPC method name
        method: String,
        /// Error reason
        reason: String,
    },

    /// Key material could not be loaded
    #[error("Key error: {0}")]
    KeyError(String),

    // ============ Configuration Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// JSON parse error
    #[error("JSON error: {0}")]
    JsonError(String),

    // ============ Generic ============
    /// Unknown/other error
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using TipjarError
pub type Result<T> = std::result::Result<T, TipjarError>;

// ============ From implementations for common error types ============

impl From<std::io::Error> for TipjarError {
    fn from(err: std::io::Error) -> Self {
        TipjarError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for TipjarError {
    fn from(err: serde_json::Error) -> Self {
        TipjarError::JsonError(err.to_string())
    }
}

impl From<TipjarError> for CapabilityError {
    fn from(err: TipjarError) -> Self {
        let kind = match &err {
            TipjarError::UnknownConnector(_) | TipjarError::NotConnected | TipjarError::KeyError(_) => {
                CapabilityErrorKind::Unavailable
            }
            TipjarError::RpcRequestError { .. } | TipjarError::IoError(_) => CapabilityErrorKind::Network,
            _ => CapabilityErrorKind::Other,
        };
        CapabilityError::new(kind, err.to_string())
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Unknown error
    Unknown = 0,
    /// Invalid address
    InvalidAddress = 1001,
    /// Invalid amount
    InvalidAmount = 2001,
    /// Amount not positive
    NonPositiveAmount = 2002,
    /// Submission failed
    SubmissionFailed = 3001,
    /// Not connected
    NotConnected = 4001,
    /// Unknown connector
    UnknownConnector = 4002,
    /// Chain mismatch
    ChainIdMismatch = 4004,
    /// RPC request error
    RpcRequestError = 5001,
    /// Configuration error
    ConfigError = 6001,
}

impl TipjarError {
    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            TipjarError::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            TipjarError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            TipjarError::NonPositiveAmount => ErrorCode::NonPositiveAmount,
            TipjarError::SubmissionFailed(_) => ErrorCode::SubmissionFailed,
            TipjarError::NotConnected => ErrorCode::NotConnected,
            TipjarError::UnknownConnector(_) => ErrorCode::UnknownConnector,
            TipjarError::ChainIdMismatch { .. } => ErrorCode::ChainIdMismatch,
            TipjarError::RpcRequestError { .. } => ErrorCode::RpcRequestError,
            TipjarError::ConfigError(_) | TipjarError::JsonError(_) => ErrorCode::ConfigError,
            _ => ErrorCode::Unknown,
        }
    }

    /// Returns true for errors caused by the user's own input rather than a collaborator
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TipjarError::InvalidAmount(_) | TipjarError::NonPositiveAmount | TipjarError::NotConnected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TipjarError::InvalidAddress {
            address: "0x123".to_string(),
            reason: "Too short".to_string(),
        };
        assert!(err.to_string().contains("0x123"));
        assert!(err.to_string().contains("Too short"));
    }

    #[test]
    fn test_error_code() {
        let err = TipjarError::ChainIdMismatch { expected: 1001, got: 1 };
        assert_eq!(err.code(), ErrorCode::ChainIdMismatch);
        assert_eq!(TipjarError::NonPositiveAmount.code(), ErrorCode::NonPositiveAmount);
        assert_eq!(TipjarError::Other("x".into()).code(), ErrorCode::Unknown);
    }

    #[test]
    fn test_amount_error_conversion() {
        let err: TipjarError = AmountError::Empty.into();
        assert!(err.is_validation());
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
    }

    #[test]
    fn test_validation_classification() {
        assert!(TipjarError::NonPositiveAmount.is_validation());
        assert!(!TipjarError::SubmissionFailed("boom".into()).is_validation());
    }

    #[test]
    fn test_into_capability_error() {
        let err: CapabilityError = TipjarError::UnknownConnector("safe".into()).into();
        assert_eq!(err.kind, CapabilityErrorKind::Unavailable);
        assert!(err.message().unwrap().contains("safe"));

        let err: CapabilityError = TipjarError::RpcRequestError {
            method: "eth_getBalance".into(),
            reason: "timeout".into(),
        }
        .into();
        assert_eq!(err.kind, CapabilityErrorKind::Network);
    }
}
