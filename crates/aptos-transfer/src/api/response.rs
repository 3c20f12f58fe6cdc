//! API response types.

use crate::api::gateway::TransactionStatus;
use crate::error::{TransferError, TransferResult};
use crate::types::HashValue;
use serde::{Deserialize, Serialize};

/// A response from the Aptos API with headers metadata.
#[derive(Debug, Clone)]
pub struct AptosResponse<T> {
    /// The response body.
    pub data: T,
    /// The ledger version at the time of the request.
    pub ledger_version: Option<u64>,
    /// The ledger timestamp in microseconds.
    pub ledger_timestamp: Option<u64>,
    /// The epoch number.
    pub epoch: Option<u64>,
    /// The block height.
    pub block_height: Option<u64>,
}

impl<T> AptosResponse<T> {
    /// Creates a new response with data only.
    pub fn new(data: T) -> Self {
        Self {
            data,
            ledger_version: None,
            ledger_timestamp: None,
            epoch: None,
            block_height: None,
        }
    }

    /// Returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Maps the inner data using a function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AptosResponse<U> {
        AptosResponse {
            data: f(self.data),
            ledger_version: self.ledger_version,
            ledger_timestamp: self.ledger_timestamp,
            epoch: self.epoch,
            block_height: self.block_height,
        }
    }
}

/// Response when submitting a transaction.
///
/// Only the hash is needed to poll; the rest of the echo is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// The transaction hash.
    pub hash: HashValue,
}

/// Ledger information from `GET /v1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInfo {
    /// The chain ID.
    pub chain_id: u8,
    /// The epoch number.
    pub epoch: String,
    /// The ledger version.
    pub ledger_version: String,
    /// The ledger timestamp in microseconds.
    pub ledger_timestamp: String,
    /// The block height.
    pub block_height: String,
}

impl LedgerInfo {
    /// Returns the ledger version as u64.
    ///
    /// # Errors
    /// Returns an error if the ledger version string cannot be parsed as u64.
    pub fn version(&self) -> Result<u64, std::num::ParseIntError> {
        self.ledger_version.parse()
    }

    /// Returns the ledger timestamp in seconds.
    ///
    /// # Errors
    /// Returns an error if the timestamp string cannot be parsed as u64.
    pub fn timestamp_secs(&self) -> Result<u64, std::num::ParseIntError> {
        Ok(self.ledger_timestamp.parse::<u64>()? / 1_000_000)
    }
}

/// Account data from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    /// The sequence number.
    pub sequence_number: String,
    /// The authentication key.
    pub authentication_key: String,
}

impl AccountData {
    /// Returns the sequence number as u64.
    ///
    /// # Errors
    /// Returns an error if the sequence number string cannot be parsed as u64.
    pub fn sequence_number(&self) -> Result<u64, std::num::ParseIntError> {
        self.sequence_number.parse()
    }
}

/// The fields of `GET /v1/transactions/by_hash/{hash}` needed to classify
/// a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    /// `pending_transaction`, `user_transaction`, ...
    #[serde(rename = "type")]
    pub typ: String,
    /// The transaction hash.
    pub hash: HashValue,
    /// Ledger version, present once committed.
    #[serde(default)]
    pub version: Option<String>,
    /// Execution result, present once committed.
    #[serde(default)]
    pub success: Option<bool>,
    /// VM status string, present once committed.
    #[serde(default)]
    pub vm_status: Option<String>,
    /// Gas units consumed, present once committed.
    #[serde(default)]
    pub gas_used: Option<String>,
}

impl TransactionData {
    /// Returns true if the node still holds the transaction in its mempool.
    pub fn is_pending(&self) -> bool {
        self.typ == "pending_transaction"
    }

    /// Classifies the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Serialization`] if a numeric field is not a
    /// decimal string.
    pub fn status(&self) -> TransferResult<TransactionStatus> {
        if self.is_pending() {
            return Ok(TransactionStatus::Pending);
        }
        let Some(version) = self.version.as_deref() else {
            return Ok(TransactionStatus::Pending);
        };
        let vm_status = self.vm_status.clone().unwrap_or_default();
        if is_discarded(&vm_status) {
            return Ok(TransactionStatus::Rejected { reason: vm_status });
        }
        Ok(TransactionStatus::Committed {
            version: parse_u64("version", version)?,
            success: self.success.unwrap_or(false),
            vm_status,
            gas_used: self
                .gas_used
                .as_deref()
                .map(|gas| parse_u64("gas_used", gas))
                .transpose()?
                .unwrap_or(0),
        })
    }
}

fn is_discarded(vm_status: &str) -> bool {
    vm_status.to_ascii_lowercase().contains("discard")
}

fn parse_u64(field: &str, value: &str) -> TransferResult<u64> {
    value
        .parse()
        .map_err(|e| TransferError::Serialization(format!("invalid {field} {value:?}: {e}")))
}
