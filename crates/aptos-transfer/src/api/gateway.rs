//! The ledger gateway abstraction.
//!
//! Everything the orchestrator needs from a ledger fits in five calls. The
//! orchestrator holds an `Arc<dyn LedgerGateway>`, so tests can hand it an
//! in-memory ledger and production code a [`FullnodeClient`](super::FullnodeClient).

use crate::error::TransferResult;
use crate::transaction::SignedTransaction;
use crate::types::{AccountAddress, ChainId, HashValue, StructTag};
use async_trait::async_trait;

/// What the ledger currently says about a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepted by the node but not yet visible to reads.
    Submitted,
    /// Sitting in the mempool.
    Pending,
    /// Included in the ledger at `version`.
    Committed {
        /// Ledger version the transaction was committed at.
        version: u64,
        /// Whether on-ledger execution succeeded.
        success: bool,
        /// The VM status string.
        vm_status: String,
        /// Gas units consumed.
        gas_used: u64,
    },
    /// The expiration timestamp passed before the transaction was included.
    Expired,
    /// The ledger dropped the transaction after accepting it.
    Rejected {
        /// The reason reported by the ledger.
        reason: String,
    },
}

impl TransactionStatus {
    /// Returns true if the status will not change any more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Committed { .. } | Self::Expired | Self::Rejected { .. }
        )
    }
}

/// Read and write access to a ledger.
///
/// Implementations make exactly one network round trip per call and never
/// retry on their own.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Returns the account's current sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransferError::AccountNotFound`] if the account does
    /// not exist on the ledger.
    async fn get_sequence_number(&self, address: AccountAddress) -> TransferResult<u64>;

    /// Returns the ledger's chain id.
    async fn get_chain_id(&self) -> TransferResult<ChainId>;

    /// Returns the canonical bytes of a resource, or `None` if the account
    /// does not hold one of that type.
    async fn get_resource(
        &self,
        address: AccountAddress,
        resource_type: &StructTag,
    ) -> TransferResult<Option<Vec<u8>>>;

    /// Submits a signed transaction and returns the hash the ledger knows it by.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransferError::SubmissionRejected`] if the ledger
    /// refuses the transaction during validation.
    async fn submit(&self, signed_txn: &SignedTransaction) -> TransferResult<HashValue>;

    /// Reads the current status of a transaction once.
    async fn get_status(&self, hash: &HashValue) -> TransferResult<TransactionStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TransactionStatus::Submitted.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Expired.is_terminal());
        assert!(TransactionStatus::Rejected {
            reason: "discarded".to_string()
        }
        .is_terminal());
        assert!(TransactionStatus::Committed {
            version: 1,
            success: false,
            vm_status: "Move abort".to_string(),
            gas_used: 9,
        }
        .is_terminal());
    }
}
