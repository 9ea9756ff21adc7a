//! Chain definitions.

use serde::{Deserialize, Serialize};

/// Native currency of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal exponent of the smallest unit
    pub decimals: u8,
}

/// An EVM chain and the HTTP endpoint used to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// EIP-155 chain id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Native currency
    pub native_currency: NativeCurrency,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Block explorer, if any
    #[serde(default)]
    pub explorer_url: Option<String>,
    /// Whether this is a test network
    #[serde(default)]
    pub testnet: bool,
}

impl ChainConfig {
    /// Kaia Kairos testnet
    pub fn kairos() -> Self {
        Self {
            id: 1001,
            name: "Kaia Kairos Testnet".to_string(),
            native_currency: kaia(),
            rpc_url: "https://public-en-kairos.node.kaia.io".to_string(),
            explorer_url: Some("https://kairos.kaiascan.io".to_string()),
            testnet: true,
        }
    }

    /// Kaia mainnet
    pub fn kaia() -> Self {
        Self {
            id: 8217,
            name: "Kaia Mainnet".to_string(),
            native_currency: kaia(),
            rpc_url: "https://public-en.node.kaia.io".to_string(),
            explorer_url: Some("https://kaiascan.io".to_string()),
            testnet: false,
        }
    }

    /// Looks up a known chain by id
    pub fn by_id(id: u64) -> Option<Self> {
        match id {
            1001 => Some(Self::kairos()),
            8217 => Some(Self::kaia()),
            _ => None,
        }
    }

    /// Explorer link for a transaction hash
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::kairos()
    }
}

fn kaia() -> NativeCurrency {
    NativeCurrency {
        name: "KAIA".to_string(),
        symbol: "KAIA".to_string(),
        decimals: 18,
    }
}
