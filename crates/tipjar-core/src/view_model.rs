//! The connection/transaction view-model.

use std::sync::Arc;

use tipjar_error::{Result, TipjarError};
use tipjar_traits::{
    AccountState, AccountStatus, Amount, BalanceQuery, ConnectorInfo, TransactionSender,
    TransferRequest, WalletConnector,
};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::messages::{Locale, Messages};
use crate::session::{ConnectionStatus, ErrorKind, SessionError, SessionEvent, SessionState};
use crate::tip::{parse_tip_amount, NATIVE_DECIMALS, TIP_RECIPIENT};

const EVENT_CAPACITY: usize = 64;

/// State guarded by the view-model's lock.
#[derive(Debug, Default)]
struct Shared {
    session: SessionState,
    /// Bumped whenever the connected account changes; late connection and
    /// balance results from an older epoch are dropped.
    epoch: u64,
}

struct Inner {
    connector: Arc<dyn WalletConnector>,
    balances: Arc<dyn BalanceQuery>,
    sender: Arc<dyn TransactionSender>,
    messages: &'static Messages,
    decimals: u8,
    shared: RwLock<Shared>,
    events: broadcast::Sender<SessionEvent>,
}

/// Holds the session state and the handlers that mutate it.
///
/// Cloning is cheap and every clone drives the same session, so handlers can
/// be run from separate tasks. Handlers never return errors: failures end up
/// in [`SessionState::last_error`].
#[derive(Clone)]
pub struct TipJar {
    inner: Arc<Inner>,
}

/// Builder for [`TipJar`]
#[derive(Default)]
pub struct TipJarBuilder {
    connector: Option<Arc<dyn WalletConnector>>,
    balances: Option<Arc<dyn BalanceQuery>>,
    sender: Option<Arc<dyn TransactionSender>>,
    locale: Locale,
    decimals: Option<u8>,
}

impl TipJarBuilder {
    /// Creates a builder with the English catalogue and 18 native decimals
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wallet-connector capability
    pub fn connector(mut self, connector: Arc<dyn WalletConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the balance-query capability
    pub fn balances(mut self, balances: Arc<dyn BalanceQuery>) -> Self {
        self.balances = Some(balances);
        self
    }

    /// Sets the transaction-submission capability
    pub fn sender(mut self, sender: Arc<dyn TransactionSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Sets the message locale
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Overrides the native currency's decimal exponent
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Builds the view-model; all three capabilities are required
    pub fn build(self) -> Result<TipJar> {
        let missing = |name: &str| TipjarError::ConfigError(format!("{name} capability was not provided"));
        let connector = self.connector.ok_or_else(|| missing("wallet-connector"))?;
        let balances = self.balances.ok_or_else(|| missing("balance-query"))?;
        let sender = self.sender.ok_or_else(|| missing("transaction-submission"))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(TipJar {
            inner: Arc::new(Inner {
                connector,
                balances,
                sender,
                messages: Messages::for_locale(self.locale),
                decimals: self.decimals.unwrap_or(NATIVE_DECIMALS),
                shared: RwLock::new(Shared::default()),
                events,
            }),
        })
    }
}

impl TipJar {
    /// Returns a builder
    pub fn builder() -> TipJarBuilder {
        TipJarBuilder::new()
    }

    /// Creates a view-model with default locale and decimals
    pub fn new(
        connector: Arc<dyn WalletConnector>,
        balances: Arc<dyn BalanceQuery>,
        sender: Arc<dyn TransactionSender>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                connector,
                balances,
                sender,
                messages: Messages::for_locale(Locale::default()),
                decimals: NATIVE_DECIMALS,
                shared: RwLock::new(Shared::default()),
                events,
            }),
        }
    }

    /// Message catalogue in use
    pub fn messages(&self) -> &'static Messages {
        self.inner.messages
    }

    /// Decimal exponent used to scale tip amounts
    pub fn decimals(&self) -> u8 {
        self.inner.decimals
    }

    /// The fixed tip recipient
    pub fn recipient(&self) -> &'static str {
        TIP_RECIPIENT
    }

    /// Returns a copy of the current session state
    pub async fn snapshot(&self) -> SessionState {
        self.inner.shared.read().await.session.clone()
    }

    /// Subscribes to change events, one per committed mutation batch
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Connectors currently offered; queried from the collaborator on every call
    pub fn available_connectors(&self) -> Vec<ConnectorInfo> {
        self.inner.connector.list_connectors()
    }

    // ============================================================================
    // Commit helpers
    // ============================================================================

    /// Applies `mutate` under the write lock. When it returns `Some`, the
    /// batch is published; `None` leaves the state untouched.
    async fn commit_if<R>(&self, mutate: impl FnOnce(&mut Shared) -> Option<R>) -> Option<R> {
        let mut shared = self.inner.shared.write().await;
        let result = mutate(&mut *shared)?;
        self.publish(&mut *shared);
        Some(result)
    }

    async fn commit<R>(&self, mutate: impl FnOnce(&mut Shared) -> R) -> R {
        let mut shared = self.inner.shared.write().await;
        let result = mutate(&mut *shared);
        self.publish(&mut *shared);
        result
    }

    /// Bumps the revision and sends one event carrying the new snapshot.
    /// Called with the write lock held so events leave in revision order.
    fn publish(&self, shared: &mut Shared) {
        shared.session.revision += 1;
        debug_assert!(
            shared.session.invariants_hold(),
            "session invariants violated: {:?}",
            shared.session
        );
        let event = SessionEvent {
            revision: shared.session.revision,
            state: shared.session.clone(),
        };
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    // ============================================================================
    // Connection
    // ============================================================================

    /// Starts a connection handshake with `connector_id`.
    ///
    /// The connector must be one the collaborator currently offers. The
    /// outcome is only observable through the session state.
    pub async fn initiate_connection(&self, connector_id: &str) {
        let messages = self.inner.messages;
        let offered = self.inner.connector.list_connectors();
        let Some(info) = offered.into_iter().find(|c| c.id == connector_id) else {
            tracing::warn!(connector = %connector_id, "connector not offered");
            self.commit_if(|shared| {
                if matches!(
                    shared.session.connection_status,
                    ConnectionStatus::Connected | ConnectionStatus::Connecting
                ) {
                    return None;
                }
                shared.session.connection_status = ConnectionStatus::Error;
                shared.session.end_session();
                shared.session.last_error = Some(SessionError::connection(messages.connector_unavailable));
                Some(())
            })
            .await;
            return;
        };

        let epoch = self
            .commit_if(|shared| {
                if matches!(
                    shared.session.connection_status,
                    ConnectionStatus::Connected | ConnectionStatus::Connecting
                ) {
                    return None;
                }
                shared.epoch += 1;
                shared.session.connection_status = ConnectionStatus::Connecting;
                shared.session.end_session();
                Some(shared.epoch)
            })
            .await;
        let Some(epoch) = epoch else {
            tracing::debug!(connector = %info.id, "connection already established or in flight");
            return;
        };

        tracing::info!(connector = %info.id, kind = %info.kind, "starting wallet connection");
        let outcome = self.inner.connector.connect(&info.id).await;

        let applied = self
            .commit_if(|shared| {
                if shared.epoch != epoch {
                    return None;
                }
                let session = &mut shared.session;
                match &outcome {
                    Ok(connection) => {
                        session.connection_status = ConnectionStatus::Connected;
                        session.account = Some(connection.address.clone());
                        session.chain_id = Some(connection.chain_id);
                        session.balance = None;
                        session.last_error = None;
                    }
                    Err(err) => {
                        session.connection_status = ConnectionStatus::Error;
                        session.end_session();
                        let message = err.message().unwrap_or(messages.connection_fallback);
                        session.last_error = Some(SessionError::connection(message));
                    }
                }
                Some(())
            })
            .await;

        match (&outcome, applied) {
            (_, None) => tracing::debug!(epoch, "discarding stale connection result"),
            (Ok(connection), Some(())) => {
                tracing::info!(address = %connection.address, chain_id = connection.chain_id, "wallet connected");
                self.refresh_balance().await;
            }
            (Err(err), Some(())) => tracing::warn!(connector = %info.id, error = %err, "wallet connection failed"),
        }
    }

    /// Tears down the wallet session. Does nothing unless connected.
    pub async fn disconnect(&self) {
        if !self.inner.shared.read().await.session.is_connected() {
            tracing::debug!("disconnect requested without a session");
            return;
        }

        let messages = self.inner.messages;
        match self.inner.connector.disconnect().await {
            Ok(()) => {
                self.commit(|shared| {
                    shared.epoch += 1;
                    shared.session.connection_status = ConnectionStatus::Disconnected;
                    shared.session.end_session();
                })
                .await;
                tracing::info!("wallet disconnected");
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet disconnect failed");
                let message = err.message().unwrap_or(messages.disconnect_fallback).to_string();
                self.commit(|shared| shared.session.last_error = Some(SessionError::connection(message)))
                    .await;
            }
        }
    }

    /// Fetches the balance of the connected account.
    ///
    /// The result is dropped if the account changed while the query ran.
    /// Failures leave the balance in its loading state.
    pub async fn refresh_balance(&self) {
        let (address, epoch) = {
            let shared = self.inner.shared.read().await;
            match &shared.session.account {
                Some(address) => (address.clone(), shared.epoch),
                None => return,
            }
        };

        match self.inner.balances.get_balance(&address).await {
            Ok(balance) => {
                let applied = self
                    .commit_if(|shared| {
                        if shared.epoch != epoch || shared.session.account.as_deref() != Some(address.as_str()) {
                            return None;
                        }
                        shared.session.balance = Some(balance);
                        Some(())
                    })
                    .await;
                if applied.is_none() {
                    tracing::debug!(%address, "discarding stale balance");
                }
            }
            Err(err) => tracing::warn!(%address, error = %err, "balance query failed"),
        }
    }

    /// Applies an account state reported by the connector.
    pub async fn apply_account_state(&self, state: AccountState) {
        let refresh = self
            .commit_if(|shared| {
                let session = &mut shared.session;
                match (state.status, state.address) {
                    (AccountStatus::Connected, Some(address)) => {
                        let account_changed = session.account.as_deref() != Some(address.as_str());
                        if !account_changed && session.chain_id == state.chain_id && session.is_connected() {
                            return None;
                        }
                        if account_changed {
                            shared.epoch += 1;
                            session.balance = None;
                        }
                        session.connection_status = ConnectionStatus::Connected;
                        session.account = Some(address);
                        session.chain_id = state.chain_id;
                        session.last_error = session.last_error.take().filter(|e| {
                            e.kind != ErrorKind::Connection
                        });
                        Some(account_changed)
                    }
                    (AccountStatus::Disconnected, _) if session.is_connected() => {
                        shared.epoch += 1;
                        session.connection_status = ConnectionStatus::Disconnected;
                        session.end_session();
                        Some(false)
                    }
                    (AccountStatus::Connecting, _) if session.is_connected() => {
                        // Wallet is re-establishing; the previous account no longer holds
                        shared.epoch += 1;
                        session.connection_status = ConnectionStatus::Connecting;
                        session.end_session();
                        Some(false)
                    }
                    _ => None,
                }
            })
            .await;

        if refresh == Some(true) {
            tracing::info!("connected account changed");
            self.refresh_balance().await;
        }
    }

    /// Polls the connector's account state once and applies it
    pub async fn sync_account_state(&self) {
        let state = self.inner.connector.current_account_state();
        self.apply_account_state(state).await;
    }

    /// Spawns a task applying pushed account states until the connector
    /// closes its subscription. Returns `None` if the connector does not push.
    pub fn follow_account_updates(&self) -> Option<JoinHandle<()>> {
        let mut updates = self.inner.connector.subscribe_account_state()?;
        let jar = self.clone();
        Some(tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().clone();
                tracing::debug!(status = ?state.status, "account state pushed");
                jar.apply_account_state(state).await;
            }
            tracing::debug!("account subscription closed");
        }))
    }

    // ============================================================================
    // Tipping
    // ============================================================================

    /// Stores the raw tip input verbatim
    pub async fn update_tip_amount(&self, text: impl Into<String>) {
        let text = text.into();
        self.commit(|shared| shared.session.tip_amount_input = text).await;
    }

    /// Validates the tip input and, if it is a positive amount, sends it to
    /// the fixed recipient.
    ///
    /// Does nothing while an earlier tip is pending; the check and the start
    /// of the new attempt happen under one write lock. Invalid input or a
    /// missing session is rejected locally without contacting the
    /// collaborator. Each accepted submission gets a fresh attempt id; a
    /// resolution is applied only while its attempt is still the latest.
    pub async fn submit_tip(&self) {
        let messages = self.inner.messages;
        let decimals = self.inner.decimals;

        let started = self
            .commit_if(|shared| {
                let session = &mut shared.session;
                if session.pending_transaction {
                    return None;
                }
                match validate_submission(session, decimals) {
                    Err(err) => {
                        let message = match err {
                            TipjarError::NotConnected => messages.not_connected,
                            _ => messages.invalid_amount,
                        };
                        session.last_error = Some(SessionError::validation(message));
                        Some(Err(err))
                    }
                    Ok(amount) => {
                        session.attempt += 1;
                        session.last_error = None;
                        session.last_tx_hash = None;
                        session.pending_transaction = true;
                        Some(Ok((session.attempt, amount)))
                    }
                }
            })
            .await;

        let (attempt, amount) = match started {
            Some(Ok(started)) => started,
            Some(Err(err)) => {
                tracing::debug!(error = %err, "tip rejected before submission");
                return;
            }
            None => {
                tracing::debug!("tip already pending");
                return;
            }
        };

        let request = TransferRequest::new(TIP_RECIPIENT, amount.smallest_unit());
        tracing::info!(attempt, value = %request.value, to = %request.to, "submitting tip");
        let outcome = self.inner.sender.send_transaction(request).await;

        let applied = self
            .commit_if(|shared| {
                let session = &mut shared.session;
                if session.attempt != attempt {
                    return None;
                }
                session.pending_transaction = false;
                match &outcome {
                    Ok(hash) => session.last_tx_hash = Some(hash.clone()),
                    Err(err) => {
                        let message = err.message().unwrap_or(messages.submission_fallback);
                        session.last_error = Some(SessionError::submission(message));
                    }
                }
                Some(())
            })
            .await;

        match (&outcome, applied) {
            (_, None) => tracing::debug!(attempt, "discarding stale submission result"),
            (Ok(hash), Some(())) => tracing::info!(attempt, tx_hash = %hash, "tip sent"),
            (Err(err), Some(())) => tracing::warn!(attempt, error = %err, "tip submission failed"),
        }
    }
}

fn validate_submission(session: &SessionState, decimals: u8) -> Result<Amount> {
    if !session.is_connected() {
        return Err(TipjarError::NotConnected);
    }
    parse_tip_amount(&session.tip_amount_input, decimals)
}
