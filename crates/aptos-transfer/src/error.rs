//! Error types for the transfer pipeline.
//!
//! Every fallible operation in this crate returns [`TransferError`]. The
//! variants follow the lifecycle of a transfer: encoding and input validation
//! first, then signing, then the ledger's answers to submission and polling,
//! and finally the transport errors underneath all of it.

use crate::types::HashValue;
use std::fmt;
use thiserror::Error;

/// A specialized Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// The error type for building, signing, submitting and confirming transfers.
#[derive(Error, Debug)]
pub enum TransferError {
    /// A value could not be encoded or decoded canonically
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid account address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid identifier or type tag
    #[error("Invalid type tag: {0}")]
    InvalidTypeTag(String),

    /// Key material or signature problem
    #[error("Signing error: {0}")]
    Signing(String),

    /// The account has no on-ledger presence
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The ledger refused the transaction during synchronous validation
    #[error("Submission rejected: {reason}")]
    SubmissionRejected {
        /// The reason reported by the ledger
        reason: String,
        /// The VM status code, if the ledger provided one
        vm_error_code: Option<u64>,
    },

    /// The transaction was not finalized before its expiration timestamp
    #[error("Transaction expired at {expiration_timestamp_secs}")]
    Expired {
        /// Hash of the expired transaction, `None` if it was never submitted
        hash: Option<HashValue>,
        /// The expiration timestamp carried by the transaction
        expiration_timestamp_secs: u64,
    },

    /// The caller's polling deadline elapsed or polling was cancelled
    #[error("Timed out after {waited_ms}ms waiting for transaction {hash}")]
    TimedOut {
        /// Hash of the transaction whose fate is still unknown
        hash: HashValue,
        /// How long polling ran before giving up
        waited_ms: u64,
    },

    /// The ledger discarded the transaction after accepting it
    #[error("Transaction {hash} rejected: {reason}")]
    Rejected {
        /// Hash of the rejected transaction
        hash: HashValue,
        /// The reason reported by the ledger
        reason: String,
    },

    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// API returned an error response
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
        /// Optional error code from the API
        error_code: Option<String>,
        /// Optional VM error code
        vm_error_code: Option<u64>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransferError {
    /// Creates a new serialization error
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Creates a new signing error
    pub fn signing<E: fmt::Display>(err: E) -> Self {
        Self::Signing(err.to_string())
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code: None,
            vm_error_code: None,
        }
    }

    /// Creates a new API error with additional details
    pub fn api_with_details(
        status_code: u16,
        message: impl Into<String>,
        error_code: Option<String>,
        vm_error_code: Option<u64>,
    ) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code,
            vm_error_code,
        }
    }

    /// Returns true if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::Api {
                    status_code: 404,
                    ..
                }
        )
    }

    /// Returns true if this is a transient error that might succeed on retry.
    ///
    /// Only the poll loop acts on this; submission is never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns true if the ledger has made a final decision against the
    /// transaction.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::SubmissionRejected { .. } | Self::Expired { .. } | Self::Rejected { .. }
        )
    }
}
