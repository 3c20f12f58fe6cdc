//! Network and transaction configuration.
//!
//! [`AptosConfig`] says where the ledger is and how to talk to it.
//! [`TransactionOptions`] holds the gas terms and expiration window every
//! transfer is built with.

use crate::error::{TransferError, TransferResult};
use crate::transaction::{DEFAULT_EXPIRATION_SECONDS, DEFAULT_GAS_UNIT_PRICE, DEFAULT_MAX_GAS_AMOUNT};
use crate::types::ChainId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle connections per host.
    /// Default: unlimited (no limit)
    pub max_idle_per_host: Option<usize>,
    /// How long to keep idle connections alive.
    /// Default: 90 seconds
    pub idle_timeout: Duration,
    /// TCP keepalive interval, if enabled.
    /// Default: 60 seconds
    pub tcp_keepalive: Option<Duration>,
    /// Whether to enable TCP nodelay (disable Nagle's algorithm).
    /// Default: true
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// Few, short-lived idle connections. Suits a local node.
    pub fn low_latency() -> Self {
        Self {
            max_idle_per_host: Some(8),
            idle_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(15)),
            tcp_nodelay: true,
        }
    }
}

/// Known Aptos networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Aptos mainnet
    Mainnet,
    /// Aptos testnet
    Testnet,
    /// Aptos devnet
    Devnet,
    /// Local development network
    Local,
    /// Custom network
    Custom,
}

impl Network {
    /// Returns the chain ID when it is fixed for this network.
    ///
    /// Devnet and local networks are recreated with new ids, so callers should
    /// ask the node instead.
    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            Network::Mainnet => Some(ChainId::mainnet()),
            Network::Testnet => Some(ChainId::testnet()),
            Network::Devnet | Network::Local | Network::Custom => None,
        }
    }

    /// Returns the network name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Local => "local",
            Network::Custom => "custom",
        }
    }
}

/// Configuration for the ledger clients.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::config::{AptosConfig, Network};
/// use std::time::Duration;
///
/// let config = AptosConfig::default().with_timeout(Duration::from_secs(10));
/// assert_eq!(config.network(), Network::Devnet);
/// assert_eq!(config.fullnode_url().as_str(), "https://fullnode.devnet.aptoslabs.com/v1");
/// ```
#[derive(Debug, Clone)]
pub struct AptosConfig {
    network: Network,
    fullnode_url: Url,
    faucet_url: Option<Url>,
    timeout: Duration,
    pool_config: PoolConfig,
}

impl Default for AptosConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

impl AptosConfig {
    /// Creates a configuration for Aptos devnet.
    pub fn devnet() -> Self {
        Self {
            network: Network::Devnet,
            fullnode_url: Url::parse("https://fullnode.devnet.aptoslabs.com/v1")
                .expect("valid devnet URL"),
            faucet_url: Some(
                Url::parse("https://faucet.devnet.aptoslabs.com").expect("valid faucet URL"),
            ),
            timeout: Duration::from_secs(30),
            pool_config: PoolConfig::default(),
        }
    }

    /// Creates a configuration for Aptos testnet.
    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            fullnode_url: Url::parse("https://fullnode.testnet.aptoslabs.com/v1")
                .expect("valid testnet URL"),
            faucet_url: Some(
                Url::parse("https://faucet.testnet.aptoslabs.com").expect("valid faucet URL"),
            ),
            timeout: Duration::from_secs(30),
            pool_config: PoolConfig::default(),
        }
    }

    /// Creates a configuration for Aptos mainnet. Mainnet has no faucet.
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            fullnode_url: Url::parse("https://fullnode.mainnet.aptoslabs.com/v1")
                .expect("valid mainnet URL"),
            faucet_url: None,
            timeout: Duration::from_secs(30),
            pool_config: PoolConfig::default(),
        }
    }

    /// Creates a configuration for a local network with the REST API on
    /// port 8080 and the faucet on 8081.
    pub fn local() -> Self {
        Self {
            network: Network::Local,
            fullnode_url: Url::parse("http://127.0.0.1:8080/v1").expect("valid local URL"),
            faucet_url: Some(Url::parse("http://127.0.0.1:8081").expect("valid local faucet URL")),
            timeout: Duration::from_secs(10),
            pool_config: PoolConfig::low_latency(),
        }
    }

    /// Creates a custom configuration with the specified fullnode URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Url`] if `fullnode_url` does not parse.
    pub fn custom(fullnode_url: &str) -> TransferResult<Self> {
        Ok(Self {
            network: Network::Custom,
            fullnode_url: Url::parse(fullnode_url)?,
            faucet_url: None,
            timeout: Duration::from_secs(30),
            pool_config: PoolConfig::default(),
        })
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection pool configuration.
    #[must_use]
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// Sets a custom faucet URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Url`] if `url` does not parse.
    pub fn with_faucet_url(mut self, url: &str) -> TransferResult<Self> {
        self.faucet_url = Some(Url::parse(url)?);
        Ok(self)
    }

    /// Returns the network this config is for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the fullnode URL.
    pub fn fullnode_url(&self) -> &Url {
        &self.fullnode_url
    }

    /// Returns the faucet URL, if configured.
    pub fn faucet_url(&self) -> Option<&Url> {
        self.faucet_url.as_ref()
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connection pool configuration.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }
}

/// Gas terms and expiration window applied to every transfer.
///
/// Deserializes from JSON with any field omitted falling back to its default.
///
/// ```rust
/// use aptos_transfer::config::TransactionOptions;
///
/// let options: TransactionOptions = serde_json::from_str(r#"{"gas_unit_price": 100}"#).unwrap();
/// assert_eq!(options.gas_unit_price, 100);
/// assert_eq!(options.max_gas_amount, 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionOptions {
    /// Maximum gas units the sender will pay for.
    pub max_gas_amount: u64,
    /// Price per gas unit in octas.
    pub gas_unit_price: u64,
    /// Seconds between building a transaction and its expiration.
    pub expiration_window_secs: u64,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_window_secs: DEFAULT_EXPIRATION_SECONDS,
        }
    }
}

impl TransactionOptions {
    /// Sets the maximum gas amount.
    #[must_use]
    pub fn with_max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    /// Sets the gas unit price.
    #[must_use]
    pub fn with_gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    /// Sets the expiration window in seconds.
    #[must_use]
    pub fn with_expiration_window_secs(mut self, secs: u64) -> Self {
        self.expiration_window_secs = secs;
        self
    }

    /// Returns the expiration window.
    pub fn expiration_window(&self) -> Duration {
        Duration::from_secs(self.expiration_window_secs)
    }

    /// Rejects options no ledger would accept.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Config`] if any field is zero.
    pub fn validate(&self) -> TransferResult<()> {
        if self.max_gas_amount == 0 {
            return Err(TransferError::Config(
                "max_gas_amount must be greater than zero".to_string(),
            ));
        }
        if self.gas_unit_price == 0 {
            return Err(TransferError::Config(
                "gas_unit_price must be greater than zero".to_string(),
            ));
        }
        if self.expiration_window_secs == 0 {
            return Err(TransferError::Config(
                "expiration_window_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
