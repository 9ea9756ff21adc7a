//! # Tipjar Traits
//!
//! Capability traits and value types shared by the tipjar view-model and the
//! collaborators it drives. The view-model never talks to a wallet or a chain
//! directly; it consumes three capabilities:
//!
//! - [`WalletConnector`] - Enumerate connectors, connect and disconnect a wallet session
//! - [`BalanceQuery`] - Look up the native balance of an address
//! - [`TransactionSender`] - Submit a native-currency transfer
//!
//! ## Example
//!
//! ```ignore
//! use tipjar_traits::prelude::*;
//!
//! async fn tip(sender: &dyn TransactionSender, to: &str) -> CapabilityResult<TxHash> {
//!     let value = Amount::parse_units("0.01", 18).unwrap();
//!     sender.send_transaction(TransferRequest::new(to, value.smallest_unit())).await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

mod amount;
pub use alloy_primitives::U256;
pub use amount::{Amount, AmountError};

/// Represents a transaction hash/ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    /// Creates a new TxHash from a string
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Connectors and accounts
// ============================================================================

/// The family a connector belongs to.
///
/// Collaborators report which of these they can offer; the set actually
/// listed depends on the runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// A wallet injected into the host environment
    Injected,
    /// A wallet reached through a dedicated extension
    Extension,
    /// A smart-contract wallet reached through a relay
    SafeRelay,
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorKind::Injected => write!(f, "injected"),
            ConnectorKind::Extension => write!(f, "extension"),
            ConnectorKind::SafeRelay => write!(f, "safe-relay"),
        }
    }
}

/// A connector currently offered by a [`WalletConnector`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorInfo {
    /// Stable identifier passed back to [`WalletConnector::connect`]
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Connector family
    pub kind: ConnectorKind,
}

impl ConnectorInfo {
    /// Creates connector info
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// Result of a successful connection handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Connected account address
    pub address: String,
    /// Chain the account is on
    pub chain_id: u64,
}

impl Connection {
    /// Creates a connection record
    pub fn new(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            address: address.into(),
            chain_id,
        }
    }
}

/// Connection status as reported by the wallet connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// No wallet session
    #[default]
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Session established
    Connected,
}

/// Snapshot of the connector's account state, possibly pushed by a subscription
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountState {
    /// Current status
    pub status: AccountStatus,
    /// Connected address, when connected
    pub address: Option<String>,
    /// Chain of the connected address, when connected
    pub chain_id: Option<u64>,
}

impl AccountState {
    /// No session
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Handshake in progress
    pub fn connecting() -> Self {
        Self {
            status: AccountStatus::Connecting,
            ..Self::default()
        }
    }

    /// Session established for `address` on `chain_id`
    pub fn connected(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            status: AccountStatus::Connected,
            address: Some(address.into()),
            chain_id: Some(chain_id),
        }
    }
}

/// Native balance of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount in smallest units, carrying the currency's decimals
    pub amount: Amount,
    /// Currency symbol (e.g., "KAIA")
    pub symbol: String,
}

impl Balance {
    /// Creates a balance
    pub fn new(amount: Amount, symbol: impl Into<String>) -> Self {
        Self {
            amount,
            symbol: symbol.into(),
        }
    }

    /// Returns the amount scaled by its decimals followed by the symbol
    pub fn formatted(&self) -> String {
        format!("{} {}", self.amount.format_units(), self.symbol)
    }
}

/// A native-currency transfer request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Recipient address
    pub to: String,
    /// Value in smallest units
    pub value: U256,
}

impl TransferRequest {
    /// Creates a transfer request
    pub fn new(to: impl Into<String>, value: U256) -> Self {
        Self { to: to.into(), value }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Broad classification of a collaborator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityErrorKind {
    /// The user declined the request in their wallet
    Rejected,
    /// The requested wallet or connector is not available
    Unavailable,
    /// Transport or RPC failure
    Network,
    /// Anything else
    Other,
}

/// Error returned by every capability.
///
/// The message is optional: some collaborators fail without one, and callers
/// are expected to substitute their own fallback text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityError {
    /// Failure classification
    pub kind: CapabilityErrorKind,
    /// Collaborator-provided message, if any
    pub message: Option<String>,
}

impl CapabilityError {
    /// Creates an error with a message
    pub fn new(kind: CapabilityErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Creates an error that carries no message
    pub fn without_message(kind: CapabilityErrorKind) -> Self {
        Self { kind, message: None }
    }

    /// The user declined the request
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Rejected, message)
    }

    /// The connector or wallet is not available
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Unavailable, message)
    }

    /// Transport or RPC failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Network, message)
    }

    /// Any other failure
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Other, message)
    }

    /// Returns the message if one was provided and it is not blank
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{message}"),
            None => write!(f, "{:?} error without message", self.kind),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Result type for capability calls
pub type CapabilityResult<T> = Result<T, CapabilityError>;

// ============================================================================
// Capabilities
// ============================================================================

/// Wallet discovery and session management.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Returns the connectors currently offered, in display order.
    ///
    /// The set may change between calls as the environment changes.
    fn list_connectors(&self) -> Vec<ConnectorInfo>;

    /// Performs the connection handshake with the given connector
    async fn connect(&self, connector_id: &str) -> CapabilityResult<Connection>;

    /// Tears down the current session
    async fn disconnect(&self) -> CapabilityResult<()>;

    /// Returns the connector's view of the account right now
    fn current_account_state(&self) -> AccountState;

    /// Returns a subscription to account state changes, if the connector pushes them
    fn subscribe_account_state(&self) -> Option<watch::Receiver<AccountState>> {
        None
    }
}

/// Native balance lookups.
#[async_trait]
pub trait BalanceQuery: Send + Sync {
    /// Returns the native balance of `address`
    async fn get_balance(&self, address: &str) -> CapabilityResult<Balance>;
}

/// Transaction submission.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Signs and broadcasts a transfer, resolving to its hash
    async fn send_transaction(&self, request: TransferRequest) -> CapabilityResult<TxHash>;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AccountState, AccountStatus, Amount, AmountError, Balance, BalanceQuery, CapabilityError,
        CapabilityErrorKind, CapabilityResult, Connection, ConnectorInfo, ConnectorKind,
        TransactionSender, TransferRequest, TxHash, WalletConnector, U256,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // TxHash Tests
    // ============================================================================

    #[test]
    fn test_tx_hash() {
        let hash = TxHash::new("0x1234567890abcdef");
        assert_eq!(hash.as_str(), "0x1234567890abcdef");
        assert_eq!(format!("{}", hash), "0x1234567890abcdef");
    }

    #[test]
    fn test_tx_hash_from_string() {
        let hash: TxHash = "0xabcd".to_string().into();
        assert_eq!(hash.as_str(), "0xabcd");
    }

    // ============================================================================
    // Account Tests
    // ============================================================================

    #[test]
    fn test_account_state_constructors() {
        let state = AccountState::connected("0xAbc", 1001);
        assert_eq!(state.status, AccountStatus::Connected);
        assert_eq!(state.address.as_deref(), Some("0xAbc"));
        assert_eq!(state.chain_id, Some(1001));

        let connecting = AccountState::connecting();
        assert_eq!(connecting.status, AccountStatus::Connecting);
        assert!(connecting.address.is_none());

        assert_eq!(AccountState::disconnected(), AccountState::default());
    }

    #[test]
    fn test_connector_kind_display() {
        assert_eq!(ConnectorKind::Injected.to_string(), "injected");
        assert_eq!(ConnectorKind::SafeRelay.to_string(), "safe-relay");
    }

    #[test]
    fn test_balance_formatted() {
        let balance = Balance::new(Amount::from_smallest_unit(U256::from(1_500_000_000_000_000_000u128), 18), "KAIA");
        assert_eq!(balance.formatted(), "1.5 KAIA");
    }

    // ============================================================================
    // CapabilityError Tests
    // ============================================================================

    #[test]
    fn test_capability_error_message() {
        let err = CapabilityError::rejected("User rejected the request.");
        assert_eq!(err.message(), Some("User rejected the request."));
        assert_eq!(err.to_string(), "User rejected the request.");
    }

    #[test]
    fn test_capability_error_without_message() {
        let err = CapabilityError::without_message(CapabilityErrorKind::Network);
        assert_eq!(err.message(), None);
        assert!(err.to_string().contains("Network"));
    }

    #[test]
    fn test_capability_error_blank_message_is_absent() {
        let err = CapabilityError::other("   ");
        assert_eq!(err.message(), None);
    }

    // ============================================================================
    // Serialization Tests
    // ============================================================================

    #[test]
    fn test_connector_info_serialization() {
        let info = ConnectorInfo::new("safe", "Safe", ConnectorKind::SafeRelay);
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"safe_relay\""));
        let back: ConnectorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }

    #[test]
    fn test_amount_serialization() {
        let amount = Amount::parse_units("1.5", 18).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        let deserialized: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, deserialized);
    }
}
