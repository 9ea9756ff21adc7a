//! # Tipjar Core
//!
//! View-model for connecting a wallet and sending a fixed-recipient tip.
//!
//! [`TipJar`] owns the [`SessionState`] and exposes the user-triggered
//! handlers (connect, disconnect, edit amount, submit). Every committed
//! mutation batch is published as a [`SessionEvent`]; the render layer in
//! [`page`] projects a snapshot into a [`PageView`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tipjar_core::{Page, TipJar};
//!
//! let jar = TipJar::new(connector, balances, sender);
//! let page = Page::new(jar.clone());
//!
//! page.click_connect("injected").await;
//! page.type_amount("0.01").await;
//! page.click_submit().await;
//! println!("{}", page.view().await);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod display;
pub mod messages;
pub mod page;
pub mod session;
pub mod tip;
mod view_model;

pub use display::{balance_text, shorten, shorten_opt};
pub use messages::{Locale, Messages};
pub use page::{ConnectButton, Page, PageView, ResultPanel, SubmitControl, TipInput};
pub use session::{ConnectionStatus, ErrorKind, SessionError, SessionEvent, SessionState};
pub use tip::{
    is_valid_tip_amount, parse_tip_amount, INPUT_MIN, INPUT_STEP, NATIVE_DECIMALS, NATIVE_SYMBOL,
    TIP_RECIPIENT,
};
pub use view_model::{TipJar, TipJarBuilder};

pub use tipjar_error::{ErrorCode, Result, TipjarError};
pub use tipjar_traits::{
    AccountState, AccountStatus, Amount, Balance, BalanceQuery, CapabilityError,
    CapabilityErrorKind, Connection, ConnectorInfo, ConnectorKind, TransactionSender,
    TransferRequest, TxHash, WalletConnector, U256,
};
