//! # Tipjar
//!
//! Connect a wallet, show the account, and send a fixed-recipient tip.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | View-model only |
//! | `core` | View-model, render layer and shared types |
//! | `evm` | EVM collaborators over JSON-RPC (Kaia Kairos by default) |
//! | `logging` | `init_logging()` with a `tracing-subscriber` formatter |
//! | `full` | Everything |
//!
//! ## Example
//!
//! ```ignore
//! use tipjar::prelude::*;
//!
//! tipjar::init_logging();
//! let config = ClientConfig::from_env()?;
//! let (jar, _wallet) = tipjar::evm_tip_jar(&config, Locale::English)?;
//! let page = Page::new(jar);
//!
//! page.click_connect("injected").await;
//! page.type_amount("0.01").await;
//! page.click_submit().await;
//! println!("{}", page.view().await);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use tipjar_error as error;

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use tipjar_traits as traits;

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use tipjar_core as core;

/// EVM collaborators
#[cfg(feature = "evm")]
#[cfg_attr(docsrs, doc(cfg(feature = "evm")))]
pub mod evm {
    pub use tipjar_evm::*;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use tipjar_error::{Result, TipjarError};

    #[cfg(feature = "core")]
    pub use tipjar_traits::prelude::*;

    #[cfg(feature = "core")]
    pub use tipjar_core::{
        shorten, ConnectionStatus, Locale, Messages, Page, PageView, ResultPanel, SessionEvent,
        SessionState, TipJar, TIP_RECIPIENT,
    };

    #[cfg(feature = "evm")]
    pub use tipjar_evm::{ChainConfig, ClientConfig, EvmWallet};
}

/// Builds a view-model whose three capabilities are served by one
/// [`tipjar_evm::EvmWallet`], with messages in `locale` and the chain's
/// native decimals.
#[cfg(feature = "evm")]
#[cfg_attr(docsrs, doc(cfg(feature = "evm")))]
pub fn evm_tip_jar(
    config: &tipjar_evm::ClientConfig,
    locale: tipjar_core::Locale,
) -> tipjar_error::Result<(tipjar_core::TipJar, std::sync::Arc<tipjar_evm::EvmWallet>)> {
    let wallet = std::sync::Arc::new(tipjar_evm::EvmWallet::new(config)?);
    let jar = tipjar_core::TipJar::builder()
        .connector(wallet.clone())
        .balances(wallet.clone())
        .sender(wallet.clone())
        .locale(locale)
        .decimals(config.chain.native_currency.decimals)
        .build()?;
    Ok((jar, wallet))
}

/// Installs a `tracing` formatter filtered by `RUST_LOG`, defaulting to `info`.
///
/// Does nothing if a global subscriber is already set.
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Returns the tipjar version
pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns enabled features
pub fn enabled_features() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut features = Vec::new();

    #[cfg(feature = "core")]
    features.push("core");

    #[cfg(feature = "evm")]
    features.push("evm");

    #[cfg(feature = "logging")]
    features.push("logging");

    features
}
