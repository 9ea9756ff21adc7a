//! Connectors that hand out a local signing key.

use alloy::signers::local::PrivateKeySigner;
use tipjar_error::{Result, TipjarError};
use tipjar_traits::ConnectorInfo;

use crate::config::ConnectorConfig;

/// A source of signing keys offered to the user.
///
/// Availability is re-evaluated on every listing since the environment may
/// change between calls.
pub trait Connector: Send + Sync {
    /// Identity shown to the user
    fn info(&self) -> ConnectorInfo;

    /// Whether the connector can currently produce a signer
    fn is_available(&self) -> bool;

    /// Produces the signer for a new session
    fn signer(&self) -> Result<PrivateKeySigner>;
}

/// Reads a hex private key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvKeyConnector {
    info: ConnectorInfo,
    key_env: String,
}

impl EnvKeyConnector {
    /// Creates a connector reading `key_env`
    pub fn new(info: ConnectorInfo, key_env: impl Into<String>) -> Self {
        Self {
            info,
            key_env: key_env.into(),
        }
    }

    /// Builds a connector from its config entry
    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self::new(
            ConnectorInfo::new(config.id.clone(), config.name.clone(), config.kind),
            config.key_env.clone(),
        )
    }

    /// Name of the environment variable holding the key
    pub fn key_env(&self) -> &str {
        &self.key_env
    }

    fn read_key(&self) -> Option<String> {
        std::env::var(&self.key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Connector for EnvKeyConnector {
    fn info(&self) -> ConnectorInfo {
        self.info.clone()
    }

    fn is_available(&self) -> bool {
        self.read_key().is_some()
    }

    fn signer(&self) -> Result<PrivateKeySigner> {
        let key = self
            .read_key()
            .ok_or_else(|| TipjarError::KeyError(format!("{} is not set", self.key_env)))?;
        parse_signer(&key)
    }
}

/// Holds a signer in memory; always available.
#[derive(Debug, Clone)]
pub struct LocalKeyConnector {
    info: ConnectorInfo,
    signer: PrivateKeySigner,
}

impl LocalKeyConnector {
    /// Wraps an existing signer
    pub fn new(info: ConnectorInfo, signer: PrivateKeySigner) -> Self {
        Self { info, signer }
    }

    /// Parses a hex private key
    pub fn from_hex(info: ConnectorInfo, key: &str) -> Result<Self> {
        Ok(Self::new(info, parse_signer(key)?))
    }
}

impl Connector for LocalKeyConnector {
    fn info(&self) -> ConnectorInfo {
        self.info.clone()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn signer(&self) -> Result<PrivateKeySigner> {
        Ok(self.signer.clone())
    }
}

fn parse_signer(key: &str) -> Result<PrivateKeySigner> {
    key.trim()
        .parse::<PrivateKeySigner>()
        .map_err(|e| TipjarError::KeyError(format!("Failed to create signer: {e}")))
}
