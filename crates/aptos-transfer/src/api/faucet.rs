//! Faucet client for funding accounts on devnet and testnet.

use crate::config::AptosConfig;
use crate::error::{TransferError, TransferResult};
use crate::types::{AccountAddress, HashValue};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;
use url::Url;

/// Client for the Aptos faucet service.
///
/// # Example
///
/// ```rust,no_run
/// use aptos_transfer::api::FaucetClient;
/// use aptos_transfer::config::AptosConfig;
/// use aptos_transfer::AccountAddress;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = FaucetClient::new(&AptosConfig::devnet())?;
///     let address = AccountAddress::from_hex("0x123")?;
///     client.fund_account(address, 20_000).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FaucetClient {
    faucet_url: Url,
    client: Client,
}

/// The faucet answers with either a bare array of hashes or an object
/// holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FaucetResponse {
    Direct(Vec<String>),
    Object { txn_hashes: Vec<String> },
}

impl FaucetResponse {
    fn into_hashes(self) -> Vec<String> {
        match self {
            FaucetResponse::Direct(hashes) => hashes,
            FaucetResponse::Object { txn_hashes } => txn_hashes,
        }
    }
}

impl FaucetClient {
    /// Creates a new faucet client.
    ///
    /// # Errors
    ///
    /// Returns an error if the faucet URL is not configured in the config, or if the HTTP client
    /// fails to build.
    pub fn new(config: &AptosConfig) -> TransferResult<Self> {
        let faucet_url = config
            .faucet_url()
            .cloned()
            .ok_or_else(|| TransferError::Config("faucet URL not configured".into()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(TransferError::Http)?;

        Ok(Self { faucet_url, client })
    }

    /// Mints `amount` octas into `address`, creating the account if needed.
    ///
    /// Returns the hashes of the funding transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the faucet answers with an
    /// error status, or a returned hash does not parse.
    pub async fn fund_account(
        &self,
        address: AccountAddress,
        amount: u64,
    ) -> TransferResult<Vec<HashValue>> {
        let url = self.build_url(&format!("mint?address={address}&amount={amount}"))?;
        let response = self.client.post(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::api(status.as_u16(), body));
        }

        let faucet_response: FaucetResponse = response.json().await?;
        let hashes = faucet_response
            .into_hashes()
            .iter()
            .map(HashValue::from_hex)
            .collect::<TransferResult<Vec<_>>>()?;
        info!(%address, amount, txn_count = hashes.len(), "Funded account from faucet");
        Ok(hashes)
    }

    fn build_url(&self, path: &str) -> TransferResult<Url> {
        let base = self.faucet_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(TransferError::Url)
    }
}
