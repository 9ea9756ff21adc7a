//! Client configuration

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tipjar_error::{Result, TipjarError};
use tipjar_traits::ConnectorKind;
use url::Url;

use crate::chains::ChainConfig;

/// Environment variable that replaces the chain's RPC URL
pub const RPC_URL_ENV: &str = "TIPJAR_RPC_URL";

/// Environment variable holding the default connector's private key
pub const PRIVATE_KEY_ENV: &str = "TIPJAR_PRIVATE_KEY";

/// Environment variable holding the extension connector's private key
pub const METAMASK_KEY_ENV: &str = "TIPJAR_METAMASK_PRIVATE_KEY";

/// A connector offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Identifier passed to `connect`
    pub id: String,
    /// Display name
    pub name: String,
    /// Connector kind
    pub kind: ConnectorKind,
    /// Environment variable the key is read from
    #[serde(default = "default_key_env")]
    pub key_env: String,
}

fn default_key_env() -> String {
    PRIVATE_KEY_ENV.to_string()
}

impl ConnectorConfig {
    /// Injected-style connector reading its key from `key_env`
    pub fn injected(id: impl Into<String>, name: impl Into<String>, key_env: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ConnectorKind::Injected,
            key_env: key_env.into(),
        }
    }

    /// Extension-style connector reading its key from `key_env`
    pub fn extension(id: impl Into<String>, name: impl Into<String>, key_env: impl Into<String>) -> Self {
        Self {
            kind: ConnectorKind::Extension,
            ..Self::injected(id, name, key_env)
        }
    }
}

/// Chain, transport and connectors used by the EVM collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target chain
    pub chain: ChainConfig,
    /// Connectors in display order
    pub connectors: Vec<ConnectorConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::kairos(),
            connectors: vec![
                ConnectorConfig::injected("injected", "Injected", PRIVATE_KEY_ENV),
                ConnectorConfig::extension("metaMask", "MetaMask", METAMASK_KEY_ENV),
            ],
        }
    }
}

impl ClientConfig {
    /// Reads a JSON config, applies environment overrides and validates it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&json)?;
        load_dotenv();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        tracing::debug!(path = %path.display(), chain_id = config.chain.id, "loaded client config");
        Ok(config)
    }

    /// Default config with environment overrides applied
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Writes the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Applies overrides looked up by environment variable name
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(RPC_URL_ENV).filter(|u| !u.trim().is_empty()) {
            tracing::info!(rpc_url = %url, "rpc url overridden from environment");
            self.chain.rpc_url = url.trim().to_string();
        }
    }

    /// Parsed RPC endpoint
    pub fn rpc_url(&self) -> Result<Url> {
        let url = Url::parse(&self.chain.rpc_url)
            .map_err(|e| TipjarError::ConfigError(format!("invalid rpc url {:?}: {e}", self.chain.rpc_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(TipjarError::ConfigError(format!("unsupported rpc scheme: {scheme}"))),
        }
    }

    /// Checks the RPC URL and connector list
    pub fn validate(&self) -> Result<()> {
        self.rpc_url()?;

        let mut seen = HashSet::new();
        for connector in &self.connectors {
            if connector.id.trim().is_empty() {
                return Err(TipjarError::ConfigError("connector id must not be empty".into()));
            }
            if !seen.insert(connector.id.as_str()) {
                return Err(TipjarError::ConfigError(format!("duplicate connector id: {}", connector.id)));
            }
            if connector.kind == ConnectorKind::SafeRelay {
                return Err(TipjarError::ConfigError(format!(
                    "connector {} uses a safe relay, which cannot sign with a local key",
                    connector.id
                )));
            }
        }
        Ok(())
    }
}

fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chain.id, 1001);
        assert_eq!(config.connectors[0].key_env, PRIVATE_KEY_ENV);
    }

    #[test]
    fn test_default_connectors() {
        let config = ClientConfig::default();
        let listed: Vec<_> = config
            .connectors
            .iter()
            .map(|c| (c.id.as_str(), c.kind, c.key_env.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("injected", ConnectorKind::Injected, PRIVATE_KEY_ENV),
                ("metaMask", ConnectorKind::Extension, METAMASK_KEY_ENV),
            ]
        );
    }

    #[test]
    fn test_rpc_override() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| (key == RPC_URL_ENV).then(|| " http://localhost:8551 ".to_string()));
        assert_eq!(config.chain.rpc_url, "http://localhost:8551");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.chain.rpc_url, ChainConfig::kairos().rpc_url);
    }

    #[test]
    fn test_invalid_rpc_url() {
        let mut config = ClientConfig::default();
        config.chain.rpc_url = "not a url".into();
        assert!(matches!(config.validate(), Err(TipjarError::ConfigError(_))));

        config.chain.rpc_url = "ws://localhost:8546".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_connector_ids() {
        let mut config = ClientConfig::default();
        config.connectors.push(ConnectorConfig::injected("injected", "Again", "OTHER_KEY"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_safe_relay_rejected() {
        let mut config = ClientConfig::default();
        config.connectors.push(ConnectorConfig {
            id: "safe".into(),
            name: "Safe".into(),
            kind: ConnectorKind::SafeRelay,
            key_env: PRIVATE_KEY_ENV.into(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_key_env_defaults_when_missing() {
        let json = r#"{"id":"metaMask","name":"MetaMask","kind":"extension"}"#;
        let connector: ConnectorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(connector.kind, ConnectorKind::Extension);
        assert_eq!(connector.key_env, PRIVATE_KEY_ENV);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tipjar.json");

        let mut config = ClientConfig::default();
        config.connectors.push(ConnectorConfig::injected("second", "Second", "SECOND_KEY"));
        config.save(&path).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded.connectors, config.connectors);
        assert_eq!(loaded.chain.id, config.chain.id);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/tipjar.json").unwrap_err();
        assert!(matches!(err, TipjarError::IoError(_)));
    }
}
