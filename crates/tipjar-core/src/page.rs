//! Plain render layer over the session state.

use std::fmt;

use serde::Serialize;
use tipjar_traits::{ConnectorInfo, TxHash};

use crate::display::{balance_text, shorten, shorten_opt};
use crate::messages::Messages;
use crate::session::{ConnectionStatus, ErrorKind, SessionState};
use crate::tip::{
    is_valid_tip_amount, INPUT_MIN, INPUT_STEP, NATIVE_DECIMALS, NATIVE_SYMBOL, TIP_RECIPIENT,
};
use crate::view_model::TipJar;

/// One connect button per offered connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectButton {
    /// Connector id passed to [`TipJar::initiate_connection`]
    pub connector_id: String,
    /// Button text
    pub label: String,
    /// False while a handshake is in flight
    pub enabled: bool,
}

/// The tip amount input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TipInput {
    /// Label including the currency symbol
    pub label: String,
    /// Raw input text
    pub value: String,
    /// Advisory minimum
    pub min: &'static str,
    /// Advisory step
    pub step: &'static str,
    /// False while a submission is pending
    pub enabled: bool,
}

/// The submit control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    /// Button text
    pub label: &'static str,
    /// True only when connected, idle, and the input is a positive amount
    pub enabled: bool,
}

/// Outcome area under the tip form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ResultPanel {
    /// Nothing submitted yet
    Idle,
    /// A submission is in flight
    Pending,
    /// Last submission succeeded
    Success(TxHash),
    /// Last submission or validation failed
    Failure(String),
}

/// A rendered snapshot of the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Status the view was built from
    pub status: ConnectionStatus,
    /// Status label text
    pub status_label: &'static str,
    /// Chain of the connected account
    pub chain_id: Option<u64>,
    /// Shortened account address, empty when disconnected
    pub short_address: String,
    /// Full account address
    pub full_address: Option<String>,
    /// Balance with symbol, or the loading placeholder
    pub balance: String,
    /// Connect buttons; empty while connected
    pub connect_buttons: Vec<ConnectButton>,
    /// Whether the disconnect control is shown
    pub show_disconnect: bool,
    /// Shortened recipient address
    pub recipient: String,
    /// Tip input, present only while connected
    pub tip_input: Option<TipInput>,
    /// Submit control, present only while connected
    pub submit: Option<SubmitControl>,
    /// Result panel
    pub result: ResultPanel,
    /// Connection error line
    pub connection_error: Option<String>,
    #[serde(skip)]
    messages: &'static Messages,
}

impl PageView {
    /// Builds the view for the native 18-decimal currency
    pub fn build(state: &SessionState, connectors: &[ConnectorInfo], messages: &'static Messages) -> Self {
        Self::build_with_decimals(state, connectors, messages, NATIVE_DECIMALS)
    }

    /// Builds the view, validating the tip input against `decimals`
    pub fn build_with_decimals(
        state: &SessionState,
        connectors: &[ConnectorInfo],
        messages: &'static Messages,
        decimals: u8,
    ) -> Self {
        let connected = state.is_connected();
        let connecting = state.connection_status == ConnectionStatus::Connecting;

        let connect_buttons = if connected {
            Vec::new()
        } else {
            connectors
                .iter()
                .map(|info| ConnectButton {
                    connector_id: info.id.clone(),
                    label: messages.connect_label(&info.name),
                    enabled: !connecting,
                })
                .collect()
        };

        let symbol = state
            .balance
            .as_ref()
            .map(|b| b.symbol.as_str())
            .unwrap_or(NATIVE_SYMBOL);

        let (tip_input, submit) = if connected {
            let pending = state.pending_transaction;
            let input = TipInput {
                label: messages.tip_amount_label(symbol),
                value: state.tip_amount_input.clone(),
                min: INPUT_MIN,
                step: INPUT_STEP,
                enabled: !pending,
            };
            let submit = SubmitControl {
                label: if pending { messages.sending } else { messages.send },
                enabled: !pending && is_valid_tip_amount(&state.tip_amount_input, decimals),
            };
            (Some(input), Some(submit))
        } else {
            (None, None)
        };

        // A validation error raised after a success is newer than its hash
        let result = match (&state.last_error, &state.last_tx_hash) {
            _ if state.pending_transaction => ResultPanel::Pending,
            (Some(err), _) if err.kind != ErrorKind::Connection => ResultPanel::Failure(err.message.clone()),
            (_, Some(hash)) => ResultPanel::Success(hash.clone()),
            _ => ResultPanel::Idle,
        };

        let connection_error = state
            .last_error
            .as_ref()
            .filter(|err| err.kind == ErrorKind::Connection)
            .map(|err| err.message.clone());

        Self {
            status: state.connection_status,
            status_label: messages.status_labels[state.connection_status.label_index()],
            chain_id: state.chain_id,
            short_address: shorten_opt(state.account.as_deref()),
            full_address: state.account.clone(),
            balance: balance_text(state.balance.as_ref(), messages.loading),
            connect_buttons,
            show_disconnect: connected,
            recipient: shorten(TIP_RECIPIENT),
            tip_input,
            submit,
            result,
            connection_error,
            messages,
        }
    }

    /// True when the submit control accepts clicks
    pub fn can_submit(&self) -> bool {
        self.submit.as_ref().is_some_and(|s| s.enabled)
    }

    /// True when the connect button for `connector_id` accepts clicks
    pub fn can_connect(&self, connector_id: &str) -> bool {
        self.connect_buttons
            .iter()
            .any(|b| b.connector_id == connector_id && b.enabled)
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.messages;

        writeln!(f, "== {} ==", m.account_heading)?;
        writeln!(f, "{}: {}", m.status, self.status_label)?;
        if let Some(address) = &self.full_address {
            if let Some(chain_id) = self.chain_id {
                writeln!(f, "{}: {chain_id}", m.chain_id)?;
            }
            writeln!(f, "{}: {}", m.address, self.short_address)?;
            writeln!(f, "{}: {address}", m.full_address)?;
            writeln!(f, "{}: {}", m.balance, self.balance)?;
            writeln!(f, "[{}]", m.disconnect)?;
        } else {
            writeln!(f, "== {} ==", m.connect_heading)?;
            for button in &self.connect_buttons {
                let marker = if button.enabled { "" } else { " (disabled)" };
                writeln!(f, "[{}]{marker}", button.label)?;
            }
            if self.status == ConnectionStatus::Connecting {
                writeln!(f, "{}", m.connecting)?;
            }
        }
        if let Some(message) = &self.connection_error {
            writeln!(f, "{}: {message}", m.error)?;
        }

        writeln!(f, "== {} ==", m.tip_heading)?;
        writeln!(f, "{}: {}", m.recipient, self.recipient)?;
        match (&self.tip_input, &self.submit) {
            (Some(input), Some(submit)) => {
                writeln!(f, "{}: [{}] (min {}, step {})", input.label, input.value, input.min, input.step)?;
                let marker = if submit.enabled { "" } else { " (disabled)" };
                writeln!(f, "[{}]{marker}", submit.label)?;
            }
            _ => writeln!(f, "{}", m.connect_first)?,
        }

        match &self.result {
            ResultPanel::Idle | ResultPanel::Pending => Ok(()),
            ResultPanel::Success(hash) => {
                writeln!(f, "{}", m.success)?;
                writeln!(f, "{}: {hash}", m.tx_hash)
            }
            ResultPanel::Failure(message) => writeln!(f, "{}: {message}", m.error),
        }
    }
}

/// Interactive page over a [`TipJar`].
///
/// Clicks are checked against a freshly built view and ignored when the
/// control is disabled, so a pending submission cannot be duplicated from
/// the page.
#[derive(Clone)]
pub struct Page {
    jar: TipJar,
}

impl Page {
    /// Wraps a view-model
    pub fn new(jar: TipJar) -> Self {
        Self { jar }
    }

    /// The underlying view-model
    pub fn jar(&self) -> &TipJar {
        &self.jar
    }

    /// Renders the current state
    pub async fn view(&self) -> PageView {
        let state = self.jar.snapshot().await;
        PageView::build_with_decimals(
            &state,
            &self.jar.available_connectors(),
            self.jar.messages(),
            self.jar.decimals(),
        )
    }

    /// Clicks a connect button. Returns false if the click was ignored.
    pub async fn click_connect(&self, connector_id: &str) -> bool {
        if !self.view().await.can_connect(connector_id) {
            tracing::debug!(connector = %connector_id, "connect click ignored");
            return false;
        }
        self.jar.initiate_connection(connector_id).await;
        true
    }

    /// Clicks the disconnect control. Returns false if it is not shown.
    pub async fn click_disconnect(&self) -> bool {
        if !self.view().await.show_disconnect {
            return false;
        }
        self.jar.disconnect().await;
        true
    }

    /// Replaces the amount input text
    pub async fn type_amount(&self, text: &str) {
        self.jar.update_tip_amount(text).await;
    }

    /// Clicks the submit control. Returns false if the click was ignored.
    pub async fn click_submit(&self) -> bool {
        if !self.view().await.can_submit() {
            tracing::debug!("submit click ignored");
            return false;
        }
        self.jar.submit_tip().await;
        true
    }
}
