//! Fullnode REST API client.

use crate::api::gateway::{LedgerGateway, TransactionStatus};
use crate::api::response::{AccountData, AptosResponse, LedgerInfo, PendingTransaction, TransactionData};
use crate::config::AptosConfig;
use crate::error::{TransferError, TransferResult};
use crate::transaction::SignedTransaction;
use crate::types::{AccountAddress, ChainId, HashValue, StructTag};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

const SIGNED_TXN_BCS_CONTENT_TYPE: &str = "application/x.aptos.signed_transaction+bcs";
const BCS_CONTENT_TYPE: &str = "application/x-bcs";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the Aptos fullnode REST API.
///
/// Each call is a single request. Nothing is retried here; the orchestrator's
/// poll loop is the only place a failed read is tried again.
///
/// # Example
///
/// ```rust,no_run
/// use aptos_transfer::api::FullnodeClient;
/// use aptos_transfer::config::AptosConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = FullnodeClient::new(AptosConfig::devnet())?;
///     let ledger_info = client.get_ledger_info().await?;
///     println!("Chain id: {}", ledger_info.data.chain_id);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FullnodeClient {
    config: AptosConfig,
    client: Client,
}

impl FullnodeClient {
    /// Creates a new fullnode client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build (e.g., invalid TLS configuration).
    pub fn new(config: AptosConfig) -> TransferResult<Self> {
        let pool = config.pool_config();

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.tcp_nodelay);

        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build().map_err(TransferError::Http)?;

        Ok(Self { config, client })
    }

    /// Returns the base URL for the fullnode.
    pub fn base_url(&self) -> &Url {
        self.config.fullnode_url()
    }

    /// Gets the current ledger information.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API returns an error status code,
    /// or the response cannot be parsed as JSON.
    pub async fn get_ledger_info(&self) -> TransferResult<AptosResponse<LedgerInfo>> {
        let url = self.build_url("");
        self.get_json(url).await
    }

    /// Gets account information.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API returns an error status code,
    /// the response cannot be parsed as JSON, or the account is not found (404).
    pub async fn get_account(
        &self,
        address: AccountAddress,
    ) -> TransferResult<AptosResponse<AccountData>> {
        let url = self.build_url(&format!("accounts/{address}"));
        self.get_json(url).await
    }

    /// Gets a resource as canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API returns an error
    /// status code, or the resource is not found (404).
    pub async fn get_account_resource_bcs(
        &self,
        address: AccountAddress,
        resource_type: &StructTag,
    ) -> TransferResult<AptosResponse<Vec<u8>>> {
        let url = self.build_url(&format!(
            "accounts/{}/resource/{}",
            address,
            urlencoding::encode(&resource_type.to_string())
        ));
        let response = self
            .client
            .get(url)
            .header(ACCEPT, BCS_CONTENT_TYPE)
            .send()
            .await?;
        Self::handle_bytes_response(response).await
    }

    /// Submits a signed transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be serialized to BCS, the HTTP request fails,
    /// the API returns an error status code, or the response cannot be parsed as JSON.
    pub async fn submit_transaction(
        &self,
        signed_txn: &SignedTransaction,
    ) -> TransferResult<AptosResponse<PendingTransaction>> {
        let url = self.build_url("transactions");
        let bcs_bytes = signed_txn.to_bcs()?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, SIGNED_TXN_BCS_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(bcs_bytes)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Gets a transaction by hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API returns an error status code,
    /// the response cannot be parsed as JSON, or the transaction is not found (404).
    pub async fn get_transaction_by_hash(
        &self,
        hash: &HashValue,
    ) -> TransferResult<AptosResponse<TransactionData>> {
        let url = self.build_url(&format!("transactions/by_hash/{hash}"));
        self.get_json(url).await
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.config.fullnode_url().clone();
        if !path.is_empty() {
            if !url.path().ends_with('/') {
                url.set_path(&format!("{}/", url.path()));
            }
            url.set_path(&format!("{}{}", url.path(), path));
        }
        url
    }

    async fn get_json<T: for<'de> serde::Deserialize<'de>>(
        &self,
        url: Url,
    ) -> TransferResult<AptosResponse<T>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: for<'de> serde::Deserialize<'de>>(
        response: Response,
    ) -> TransferResult<AptosResponse<T>> {
        let metadata = Self::response_metadata(&response);
        if response.status().is_success() {
            let data: T = response.json().await?;
            Ok(metadata.map(|()| data))
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn handle_bytes_response(response: Response) -> TransferResult<AptosResponse<Vec<u8>>> {
        let metadata = Self::response_metadata(&response);
        if response.status().is_success() {
            let data = response.bytes().await?.to_vec();
            Ok(metadata.map(|()| data))
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Reads the ledger headers every fullnode response carries.
    fn response_metadata(response: &Response) -> AptosResponse<()> {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };
        AptosResponse {
            data: (),
            ledger_version: header("x-aptos-ledger-version"),
            ledger_timestamp: header("x-aptos-ledger-timestamp"),
            epoch: header("x-aptos-epoch"),
            block_height: header("x-aptos-block-height"),
        }
    }

    async fn error_from_response(response: Response) -> TransferError {
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let error_code = body
            .get("error_code")
            .and_then(|v| v.as_str())
            .map(ToString::to_string);
        let vm_error_code = body
            .get("vm_error_code")
            .and_then(serde_json::Value::as_u64);

        TransferError::api_with_details(status.as_u16(), message, error_code, vm_error_code)
    }
}

#[async_trait]
impl LedgerGateway for FullnodeClient {
    async fn get_sequence_number(&self, address: AccountAddress) -> TransferResult<u64> {
        let account = self.get_account(address).await.map_err(|e| {
            if e.is_not_found() {
                TransferError::AccountNotFound(address.to_string())
            } else {
                e
            }
        })?;
        account.data.sequence_number().map_err(|e| {
            TransferError::Serialization(format!("failed to parse sequence number: {e}"))
        })
    }

    async fn get_chain_id(&self) -> TransferResult<ChainId> {
        let info = self.get_ledger_info().await?;
        Ok(ChainId::new(info.data.chain_id))
    }

    async fn get_resource(
        &self,
        address: AccountAddress,
        resource_type: &StructTag,
    ) -> TransferResult<Option<Vec<u8>>> {
        match self.get_account_resource_bcs(address, resource_type).await {
            Ok(response) => Ok(Some(response.into_inner())),
            Err(e) if e.is_not_found() => {
                debug!(%address, resource_type = %resource_type, "Resource not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn submit(&self, signed_txn: &SignedTransaction) -> TransferResult<HashValue> {
        debug!(
            sender = %signed_txn.sender(),
            sequence_number = signed_txn.sequence_number(),
            "Submitting transaction to fullnode"
        );
        match self.submit_transaction(signed_txn).await {
            Ok(response) => Ok(response.into_inner().hash),
            Err(TransferError::Api {
                status_code,
                message,
                vm_error_code,
                ..
            }) if (400..500).contains(&status_code) => {
                warn!(status_code, reason = %message, "Fullnode rejected transaction");
                Err(TransferError::SubmissionRejected {
                    reason: message,
                    vm_error_code,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn get_status(&self, hash: &HashValue) -> TransferResult<TransactionStatus> {
        match self.get_transaction_by_hash(hash).await {
            Ok(response) => response.data.status(),
            Err(e) if e.is_not_found() => Ok(TransactionStatus::Submitted),
            Err(e) => Err(e),
        }
    }
}
