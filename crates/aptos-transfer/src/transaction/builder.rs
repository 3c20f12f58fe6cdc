//! Transaction builder.

use crate::error::{TransferError, TransferResult};
use crate::transaction::payload::TransactionPayload;
use crate::transaction::types::RawTransaction;
use crate::types::{AccountAddress, ChainId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default maximum gas amount.
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 1_000;
/// Default gas unit price in octas.
pub const DEFAULT_GAS_UNIT_PRICE: u64 = 1;
/// Default transaction expiration window in seconds.
pub const DEFAULT_EXPIRATION_SECONDS: u64 = 10;

/// Current wall-clock time in whole seconds since the Unix epoch.
///
/// A clock set before the epoch reads as zero.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A builder for constructing transactions.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::transaction::{EntryFunction, TransactionBuilder};
/// use aptos_transfer::types::{AccountAddress, ChainId};
///
/// let payload = EntryFunction::apt_transfer(
///     AccountAddress::from_hex("0x123").unwrap(),
///     1000,
/// ).unwrap();
///
/// let txn = TransactionBuilder::new()
///     .sender(AccountAddress::ONE)
///     .sequence_number(0)
///     .payload(payload.into())
///     .chain_id(ChainId::testnet())
///     .build()
///     .unwrap();
/// assert_eq!(txn.max_gas_amount, 1000);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: Option<AccountAddress>,
    sequence_number: Option<u64>,
    payload: Option<TransactionPayload>,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_timestamp_secs: Option<u64>,
    chain_id: Option<ChainId>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// Creates a new transaction builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: None,
            sequence_number: None,
            payload: None,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_timestamp_secs: None,
            chain_id: None,
        }
    }

    /// Sets the sender address.
    #[must_use]
    pub fn sender(mut self, sender: AccountAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Sets the sequence number.
    #[must_use]
    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Sets the transaction payload.
    #[must_use]
    pub fn payload(mut self, payload: TransactionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the maximum gas amount.
    #[must_use]
    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    /// Sets the gas unit price in octas.
    #[must_use]
    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    /// Sets the expiration timestamp in seconds since Unix epoch.
    #[must_use]
    pub fn expiration_timestamp_secs(mut self, expiration_timestamp_secs: u64) -> Self {
        self.expiration_timestamp_secs = Some(expiration_timestamp_secs);
        self
    }

    /// Sets the expiration time relative to now.
    #[must_use]
    pub fn expiration_from_now(mut self, seconds: u64) -> Self {
        self.expiration_timestamp_secs = Some(now_secs().saturating_add(seconds));
        self
    }

    /// Sets the chain ID.
    #[must_use]
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Builds the raw transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Config`] if `sender`, `sequence_number`,
    /// `payload` or `chain_id` is missing.
    pub fn build(self) -> TransferResult<RawTransaction> {
        let sender = self.sender.ok_or_else(|| missing("sender"))?;
        let sequence_number = self
            .sequence_number
            .ok_or_else(|| missing("sequence_number"))?;
        let payload = self.payload.ok_or_else(|| missing("payload"))?;
        let chain_id = self.chain_id.ok_or_else(|| missing("chain_id"))?;

        let expiration_timestamp_secs = self
            .expiration_timestamp_secs
            .unwrap_or_else(|| now_secs().saturating_add(DEFAULT_EXPIRATION_SECONDS));

        Ok(RawTransaction::new(
            sender,
            sequence_number,
            payload,
            self.max_gas_amount,
            self.gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        ))
    }
}

fn missing(field: &str) -> TransferError {
    TransferError::Config(format!("transaction {field} is required"))
}
