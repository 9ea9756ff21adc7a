//! An EVM wallet backed by local keys and a JSON-RPC endpoint.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tipjar_error::{Result, TipjarError};
use tipjar_traits::{
    AccountState, Amount, Balance, BalanceQuery, CapabilityResult, Connection, ConnectorInfo,
    TransactionSender, TransferRequest, TxHash, WalletConnector,
};
use tokio::sync::watch;
use url::Url;

use crate::chains::ChainConfig;
use crate::config::ClientConfig;
use crate::connectors::{Connector, EnvKeyConnector};

struct ActiveSession {
    connector_id: String,
    signer: PrivateKeySigner,
}

/// Implements the three tipjar capabilities over one chain.
///
/// `connect` picks a connector's signer and checks the endpoint serves the
/// configured chain; transfers are signed with that signer and resolve once
/// the node accepts them, without waiting for a receipt.
pub struct EvmWallet {
    chain: ChainConfig,
    rpc_url: Url,
    connectors: Vec<Arc<dyn Connector>>,
    session: Mutex<Option<ActiveSession>>,
    account: watch::Sender<AccountState>,
}

impl EvmWallet {
    /// Builds a wallet with one [`EnvKeyConnector`] per configured connector
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let connectors = config
            .connectors
            .iter()
            .map(|c| Arc::new(EnvKeyConnector::from_config(c)) as Arc<dyn Connector>)
            .collect();
        Self::with_connectors(config.chain.clone(), connectors)
    }

    /// Builds a wallet with explicit connectors
    pub fn with_connectors(chain: ChainConfig, connectors: Vec<Arc<dyn Connector>>) -> Result<Self> {
        let rpc_url = Url::parse(&chain.rpc_url)
            .map_err(|e| TipjarError::ConfigError(format!("invalid rpc url {:?}: {e}", chain.rpc_url)))?;
        let (account, _) = watch::channel(AccountState::disconnected());
        Ok(Self {
            chain,
            rpc_url,
            connectors,
            session: Mutex::new(None),
            account,
        })
    }

    /// The configured chain
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Id of the connector backing the current session
    pub fn active_connector(&self) -> Option<String> {
        self.session().as_ref().map(|s| s.connector_id.clone())
    }

    fn session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn find_connector(&self, connector_id: &str) -> Option<&Arc<dyn Connector>> {
        self.connectors
            .iter()
            .find(|c| c.info().id == connector_id && c.is_available())
    }

    async fn open_session(&self, connector_id: &str) -> Result<Connection> {
        let connector = self
            .find_connector(connector_id)
            .ok_or_else(|| TipjarError::UnknownConnector(connector_id.to_string()))?;
        let signer = connector.signer()?;

        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| TipjarError::RpcRequestError {
                method: "eth_chainId".into(),
                reason: e.to_string(),
            })?;
        if chain_id != self.chain.id {
            return Err(TipjarError::ChainIdMismatch {
                expected: self.chain.id,
                got: chain_id,
            });
        }

        let address = signer.address().to_checksum(None);
        *self.session() = Some(ActiveSession {
            connector_id: connector_id.to_string(),
            signer,
        });
        Ok(Connection::new(address, chain_id))
    }

    async fn fetch_balance(&self, address: &str) -> Result<Balance> {
        let parsed = parse_address(address)?;
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let wei = provider
            .get_balance(parsed)
            .await
            .map_err(|e| TipjarError::RpcRequestError {
                method: "eth_getBalance".into(),
                reason: e.to_string(),
            })?;
        let currency = &self.chain.native_currency;
        Ok(Balance::new(
            Amount::from_smallest_unit(wei, currency.decimals),
            currency.symbol.clone(),
        ))
    }

    async fn transfer(&self, request: TransferRequest) -> Result<TxHash> {
        let signer = self
            .session()
            .as_ref()
            .map(|s| s.signer.clone())
            .ok_or(TipjarError::NotConnected)?;
        let to = parse_address(&request.to)?;

        let provider = ProviderBuilder::new()
            .wallet(alloy::network::EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone());

        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(request.value)
            .with_chain_id(self.chain.id);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| TipjarError::SubmissionFailed(e.to_string()))?;
        Ok(TxHash::new(pending.tx_hash().to_string()))
    }
}

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).map_err(|e| TipjarError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl WalletConnector for EvmWallet {
    fn list_connectors(&self) -> Vec<ConnectorInfo> {
        self.connectors
            .iter()
            .filter(|c| c.is_available())
            .map(|c| c.info())
            .collect()
    }

    async fn connect(&self, connector_id: &str) -> CapabilityResult<Connection> {
        tracing::info!(connector = %connector_id, chain_id = self.chain.id, "opening wallet session");
        self.account.send_replace(AccountState::connecting());

        match self.open_session(connector_id).await {
            Ok(connection) => {
                tracing::info!(address = %connection.address, "wallet session open");
                self.account
                    .send_replace(AccountState::connected(connection.address.clone(), connection.chain_id));
                Ok(connection)
            }
            Err(err) => {
                tracing::warn!(connector = %connector_id, error = %err, "wallet session failed");
                self.account.send_replace(AccountState::disconnected());
                Err(err.into())
            }
        }
    }

    async fn disconnect(&self) -> CapabilityResult<()> {
        if let Some(session) = self.session().take() {
            tracing::info!(connector = %session.connector_id, "wallet session closed");
        }
        self.account.send_replace(AccountState::disconnected());
        Ok(())
    }

    fn current_account_state(&self) -> AccountState {
        self.account.borrow().clone()
    }

    fn subscribe_account_state(&self) -> Option<watch::Receiver<AccountState>> {
        Some(self.account.subscribe())
    }
}

#[async_trait]
impl BalanceQuery for EvmWallet {
    async fn get_balance(&self, address: &str) -> CapabilityResult<Balance> {
        self.fetch_balance(address).await.map_err(|err| {
            tracing::debug!(%address, error = %err, "balance lookup failed");
            err.into()
        })
    }
}

#[async_trait]
impl TransactionSender for EvmWallet {
    async fn send_transaction(&self, request: TransferRequest) -> CapabilityResult<TxHash> {
        tracing::info!(to = %request.to, value = %request.value, chain_id = self.chain.id, "sending transfer");
        let hash = self.transfer(request).await?;
        tracing::info!(tx_hash = %hash, "transfer broadcast");
        Ok(hash)
    }
}
