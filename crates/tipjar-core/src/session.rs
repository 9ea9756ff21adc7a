//! Session state owned by the view-model.

use serde::Serialize;
use tipjar_traits::{Balance, TxHash};

/// Wallet connection status as shown on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No wallet session
    #[default]
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Session established
    Connected,
    /// Last handshake failed
    Error,
}

impl ConnectionStatus {
    /// Index into [`crate::Messages::status_labels`]
    pub fn label_index(&self) -> usize {
        match self {
            ConnectionStatus::Disconnected => 0,
            ConnectionStatus::Connecting => 1,
            ConnectionStatus::Connected => 2,
            ConnectionStatus::Error => 3,
        }
    }
}

/// Where an error came from; decides where the page shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected locally before any collaborator call
    Validation,
    /// Wallet session could not be established or torn down
    Connection,
    /// Transaction could not be sent
    Submission,
}

/// The most recent user-visible error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionError {
    /// Origin of the error
    pub kind: ErrorKind,
    /// Display text
    pub message: String,
}

impl SessionError {
    /// Local validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Validation, message: message.into() }
    }

    /// Connection failure
    pub fn connection(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Connection, message: message.into() }
    }

    /// Submission failure
    pub fn submission(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Submission, message: message.into() }
    }
}

/// Everything the page renders. Created empty, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionState {
    /// Connection status
    pub connection_status: ConnectionStatus,
    /// Connected address; present iff `connection_status` is `Connected`
    pub account: Option<String>,
    /// Chain of the connected account
    pub chain_id: Option<u64>,
    /// Balance of the connected account; `None` while loading
    pub balance: Option<Balance>,
    /// Raw tip input, validated only on submission
    pub tip_amount_input: String,
    /// A submission is in flight
    pub pending_transaction: bool,
    /// Hash of the last successful submission
    pub last_tx_hash: Option<TxHash>,
    /// Most recent error
    pub last_error: Option<SessionError>,
    /// Identifier of the latest submission attempt, 0 before the first one.
    /// Also advanced when a session ends with a tip still pending.
    pub attempt: u64,
    /// Incremented once per committed mutation batch
    pub revision: u64,
}

impl SessionState {
    /// True when a wallet session is established
    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }

    /// Checks the state invariants:
    /// the account is present exactly when connected, a pending submission
    /// needs a session, and it never coexists with a hash or a non-connection
    /// error.
    pub fn invariants_hold(&self) -> bool {
        let account_matches = self.account.is_some() == self.is_connected();
        let pending_needs_session = !self.pending_transaction || self.is_connected();
        let resolved_while_pending = self.pending_transaction
            && (self.last_tx_hash.is_some()
                || matches!(&self.last_error, Some(e) if e.kind != ErrorKind::Connection));
        account_matches && pending_needs_session && !resolved_while_pending
    }

    /// Drops the account. A tip still pending belongs to the ended session,
    /// so its slot is released and its attempt superseded.
    pub(crate) fn end_session(&mut self) {
        self.account = None;
        self.chain_id = None;
        self.balance = None;
        if self.pending_transaction {
            self.pending_transaction = false;
            self.attempt += 1;
        }
    }
}

/// Emitted once per committed mutation batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    /// Revision of `state`
    pub revision: u64,
    /// Full snapshot after the batch
    pub state: SessionState,
}
