//! # Tipjar EVM
//!
//! Concrete wallet collaborators over an EVM JSON-RPC endpoint, built on
//! `alloy`. [`EvmWallet`] implements all three tipjar capabilities: it signs
//! with a key handed out by a [`Connector`], checks the endpoint's chain id on
//! connect, reads native balances and broadcasts plain value transfers.
//!
//! ```ignore
//! use tipjar_evm::{ClientConfig, EvmWallet};
//!
//! let config = ClientConfig::from_env()?; // Kairos testnet unless overridden
//! let wallet = EvmWallet::new(&config)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chains;
pub mod config;
pub mod connectors;
mod wallet;

pub use chains::{ChainConfig, NativeCurrency};
pub use config::{ClientConfig, ConnectorConfig, METAMASK_KEY_ENV, PRIVATE_KEY_ENV, RPC_URL_ENV};
pub use connectors::{Connector, EnvKeyConnector, LocalKeyConnector};
pub use wallet::EvmWallet;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ChainConfig, ClientConfig, Connector, EnvKeyConnector, EvmWallet};
}
