//! Scriptable collaborators for driving the view-model in tests.

use std::collections::{HashMap, VecDeque};
use std::pin::pin;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tipjar_traits::{
    AccountState, Amount, Balance, BalanceQuery, CapabilityError, CapabilityResult, Connection,
    ConnectorInfo, ConnectorKind, TransactionSender, TransferRequest, TxHash, WalletConnector,
    U256,
};
use tokio::sync::{oneshot, watch, Notify};

/// Address returned by [`MockConnector`] when no outcome is scripted
pub const MOCK_ADDRESS: &str = "0xAbc0000000000000000000000000000000001234";

/// Chain id returned by [`MockConnector`] when no outcome is scripted
pub const MOCK_CHAIN_ID: u64 = 1001;

/// Symbol used by [`MockBalanceQuery`]
pub const MOCK_SYMBOL: &str = "KAIA";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not cascade into every other assertion
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Gate
// ============================================================================

/// Parks calls until the test resolves them one by one.
///
/// Each call made through a gate gets an index in arrival order; the test
/// completes it with [`Gate::resolve`] in whatever order it likes.
pub struct Gate<T> {
    pending: Mutex<Vec<Option<oneshot::Sender<T>>>>,
    arrived: Notify,
}

impl<T> Default for Gate<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            arrived: Notify::new(),
        }
    }
}

impl<T> Gate<T> {
    /// Creates an empty gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a call and returns the receiver it should await
    pub fn enter(&self) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).push(Some(tx));
        self.arrived.notify_waiters();
        rx
    }

    /// Number of calls that have entered so far
    pub fn calls(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Completes call `index`. Returns false if there is no such call, it was
    /// already resolved, or the caller stopped waiting.
    pub fn resolve(&self, index: usize, value: T) -> bool {
        let sender = lock(&self.pending).get_mut(index).and_then(Option::take);
        match sender {
            Some(sender) => sender.send(value).is_ok(),
            None => false,
        }
    }

    /// Waits until at least `n` calls have entered
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let mut notified = pin!(self.arrived.notified());
            notified.as_mut().enable();
            if self.calls() >= n {
                return;
            }
            notified.await;
        }
    }
}

async fn await_gate<T>(rx: oneshot::Receiver<CapabilityResult<T>>) -> CapabilityResult<T> {
    rx.await
        .unwrap_or_else(|_| Err(CapabilityError::other("gate dropped before resolution")))
}

// ============================================================================
// MockConnector
// ============================================================================

/// A [`WalletConnector`] with scripted outcomes and a push channel.
///
/// Successful connects and disconnects also publish the matching
/// [`AccountState`] on the subscription, like a real wallet would.
pub struct MockConnector {
    connectors: Mutex<Vec<ConnectorInfo>>,
    connect_outcomes: Mutex<VecDeque<CapabilityResult<Connection>>>,
    disconnect_outcomes: Mutex<VecDeque<CapabilityResult<()>>>,
    connect_calls: Mutex<Vec<String>>,
    disconnect_calls: Mutex<usize>,
    connect_gate: Option<Gate<CapabilityResult<Connection>>>,
    account: watch::Sender<AccountState>,
    pushes: bool,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Offers an `injected` and a `metaMask` connector; every connect succeeds
    pub fn new() -> Self {
        let (account, _) = watch::channel(AccountState::disconnected());
        Self {
            connectors: Mutex::new(vec![
                ConnectorInfo::new("injected", "Browser Wallet", ConnectorKind::Injected),
                ConnectorInfo::new("metaMask", "MetaMask", ConnectorKind::Extension),
            ]),
            connect_outcomes: Mutex::new(VecDeque::new()),
            disconnect_outcomes: Mutex::new(VecDeque::new()),
            connect_calls: Mutex::new(Vec::new()),
            disconnect_calls: Mutex::new(0),
            connect_gate: None,
            account,
            pushes: true,
        }
    }

    /// Parks every connect until [`MockConnector::resolve_connect`] is called
    pub fn gated() -> Self {
        Self {
            connect_gate: Some(Gate::new()),
            ..Self::new()
        }
    }

    /// Replaces the offered connectors
    pub fn with_connectors(self, connectors: Vec<ConnectorInfo>) -> Self {
        *lock(&self.connectors) = connectors;
        self
    }

    /// Makes [`WalletConnector::subscribe_account_state`] return `None`
    pub fn without_push(mut self) -> Self {
        self.pushes = false;
        self
    }

    /// Changes the offered connectors in place
    pub fn set_connectors(&self, connectors: Vec<ConnectorInfo>) {
        *lock(&self.connectors) = connectors;
    }

    /// Queues the outcome of the next ungated connect
    pub fn push_connect_outcome(&self, outcome: CapabilityResult<Connection>) {
        lock(&self.connect_outcomes).push_back(outcome);
    }

    /// Queues the outcome of the next disconnect
    pub fn push_disconnect_outcome(&self, outcome: CapabilityResult<()>) {
        lock(&self.disconnect_outcomes).push_back(outcome);
    }

    /// Completes gated connect `index`
    pub fn resolve_connect(&self, index: usize, outcome: CapabilityResult<Connection>) -> bool {
        self.connect_gate
            .as_ref()
            .is_some_and(|gate| gate.resolve(index, outcome))
    }

    /// Waits until `n` gated connects are parked
    pub async fn wait_for_connects(&self, n: usize) {
        if let Some(gate) = &self.connect_gate {
            gate.wait_for_calls(n).await;
        }
    }

    /// Publishes an account state as if the wallet changed it
    pub fn push_account(&self, state: AccountState) {
        self.account.send_replace(state);
    }

    /// Connector ids passed to `connect`, in call order
    pub fn connect_calls(&self) -> Vec<String> {
        lock(&self.connect_calls).clone()
    }

    /// Number of `disconnect` calls
    pub fn disconnect_calls(&self) -> usize {
        *lock(&self.disconnect_calls)
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    fn list_connectors(&self) -> Vec<ConnectorInfo> {
        lock(&self.connectors).clone()
    }

    async fn connect(&self, connector_id: &str) -> CapabilityResult<Connection> {
        lock(&self.connect_calls).push(connector_id.to_string());
        self.account.send_replace(AccountState::connecting());

        let outcome = match &self.connect_gate {
            Some(gate) => await_gate(gate.enter()).await,
            None => lock(&self.connect_outcomes)
                .pop_front()
                .unwrap_or_else(|| Ok(Connection::new(MOCK_ADDRESS, MOCK_CHAIN_ID))),
        };

        let state = match &outcome {
            Ok(connection) => AccountState::connected(connection.address.clone(), connection.chain_id),
            Err(_) => AccountState::disconnected(),
        };
        self.account.send_replace(state);
        outcome
    }

    async fn disconnect(&self) -> CapabilityResult<()> {
        *lock(&self.disconnect_calls) += 1;
        let outcome = lock(&self.disconnect_outcomes).pop_front().unwrap_or(Ok(()));
        if outcome.is_ok() {
            self.account.send_replace(AccountState::disconnected());
        }
        outcome
    }

    fn current_account_state(&self) -> AccountState {
        self.account.borrow().clone()
    }

    fn subscribe_account_state(&self) -> Option<watch::Receiver<AccountState>> {
        self.pushes.then(|| self.account.subscribe())
    }
}

// ============================================================================
// MockBalanceQuery
// ============================================================================

/// A [`BalanceQuery`] answering from a table, with an optional gate.
pub struct MockBalanceQuery {
    balances: Mutex<HashMap<String, CapabilityResult<Balance>>>,
    default_value: u128,
    queries: Mutex<Vec<String>>,
    gate: Option<Gate<CapabilityResult<Balance>>>,
}

impl Default for MockBalanceQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBalanceQuery {
    /// Unknown addresses hold 0 KAIA
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            default_value: 0,
            queries: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Parks every query until [`MockBalanceQuery::resolve`] is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Gate::new()),
            ..Self::new()
        }
    }

    /// Unknown addresses hold `value` smallest units
    pub fn with_default(mut self, value: u128) -> Self {
        self.default_value = value;
        self
    }

    /// Sets the balance of `address` in smallest units
    pub fn set_balance(&self, address: &str, value: u128) {
        lock(&self.balances).insert(address.to_string(), Ok(mock_balance(value)));
    }

    /// Makes queries for `address` fail
    pub fn set_failure(&self, address: &str, error: CapabilityError) {
        lock(&self.balances).insert(address.to_string(), Err(error));
    }

    /// Completes gated query `index`
    pub fn resolve(&self, index: usize, outcome: CapabilityResult<Balance>) -> bool {
        self.gate.as_ref().is_some_and(|gate| gate.resolve(index, outcome))
    }

    /// Waits until `n` gated queries are parked
    pub async fn wait_for_queries(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.wait_for_calls(n).await;
        }
    }

    /// Addresses queried, in call order
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

/// A balance of `value` smallest units of the mock currency
pub fn mock_balance(value: u128) -> Balance {
    Balance::new(Amount::from_smallest_unit(U256::from(value), 18), MOCK_SYMBOL)
}

#[async_trait]
impl BalanceQuery for MockBalanceQuery {
    async fn get_balance(&self, address: &str) -> CapabilityResult<Balance> {
        lock(&self.queries).push(address.to_string());
        if let Some(gate) = &self.gate {
            return await_gate(gate.enter()).await;
        }
        lock(&self.balances)
            .get(address)
            .cloned()
            .unwrap_or_else(|| Ok(mock_balance(self.default_value)))
    }
}

// ============================================================================
// MockTransactionSender
// ============================================================================

/// A [`TransactionSender`] that records requests.
///
/// In immediate mode each call pops a scripted outcome, or succeeds with
/// `0xHASH<n>` where `n` counts calls from 1. In gated mode each call parks
/// until the test resolves it.
pub struct MockTransactionSender {
    outcomes: Mutex<VecDeque<CapabilityResult<TxHash>>>,
    requests: Mutex<Vec<TransferRequest>>,
    gate: Option<Gate<CapabilityResult<TxHash>>>,
}

impl Default for MockTransactionSender {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransactionSender {
    /// Immediate mode
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Gated mode
    pub fn gated() -> Self {
        Self {
            gate: Some(Gate::new()),
            ..Self::new()
        }
    }

    /// Queues the outcome of the next immediate call
    pub fn push_outcome(&self, outcome: CapabilityResult<TxHash>) {
        lock(&self.outcomes).push_back(outcome);
    }

    /// Completes gated call `index`
    pub fn resolve(&self, index: usize, outcome: CapabilityResult<TxHash>) -> bool {
        self.gate.as_ref().is_some_and(|gate| gate.resolve(index, outcome))
    }

    /// Waits until `n` calls have been made
    pub async fn wait_for_calls(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.wait_for_calls(n).await;
        }
    }

    /// Requests received, in call order
    pub fn requests(&self) -> Vec<TransferRequest> {
        lock(&self.requests).clone()
    }

    /// Number of calls received
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl TransactionSender for MockTransactionSender {
    async fn send_transaction(&self, request: TransferRequest) -> CapabilityResult<TxHash> {
        let call = {
            let mut requests = lock(&self.requests);
            requests.push(request);
            requests.len()
        };
        if let Some(gate) = &self.gate {
            return await_gate(gate.enter()).await;
        }
        lock(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| Ok(TxHash::new(format!("0xHASH{call}"))))
    }
}
