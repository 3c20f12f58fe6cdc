//! The submission orchestrator.
//!
//! A transfer moves through [`TransferState`]s in order:
//!
//! 1. *Preparing*: read the sender's sequence number and the chain id
//!    concurrently, then build the raw transaction.
//! 2. *Built*: refuse to sign a transaction that has already expired,
//!    otherwise sign it.
//! 3. *Signed*: submit it. A synchronous rejection ends the transfer here.
//! 4. *Submitted*: poll its status until the ledger decides, the
//!    transaction's own expiration passes, or the caller stops waiting.
//!
//! Nothing is ever resubmitted. If a transfer fails with
//! [`TransferError::Expired`] the caller decides whether to build a new one.
//!
//! # Example
//!
//! ```rust,no_run
//! use aptos_transfer::account::Ed25519Account;
//! use aptos_transfer::api::FullnodeClient;
//! use aptos_transfer::config::{AptosConfig, TransactionOptions};
//! use aptos_transfer::poll::PollConfig;
//! use aptos_transfer::{AccountAddress, TransferOrchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = FullnodeClient::new(AptosConfig::devnet())?;
//!     let orchestrator = TransferOrchestrator::new(
//!         Arc::new(client),
//!         TransactionOptions::default(),
//!         PollConfig::default(),
//!     );
//!
//!     let sender = Ed25519Account::from_private_key_hex("0x...")?;
//!     let recipient = AccountAddress::from_hex("0xb0b")?;
//!     let outcome = orchestrator.execute_transfer(&sender, recipient, 1_000).await?;
//!     println!("committed at version {}", outcome.version);
//!     Ok(())
//! }
//! ```

use crate::account::Ed25519Account;
use crate::api::{FaucetClient, LedgerGateway, TransactionStatus};
use crate::config::TransactionOptions;
use crate::error::{TransferError, TransferResult};
use crate::poll::PollConfig;
use crate::transaction::{
    now_secs, sign_transaction, EntryFunction, RawTransaction, SignedTransaction,
    TransactionBuilder, TransactionPayload,
};
use crate::types::{
    AccountAddress, CoinStoreResource, HashValue, LedgerResource, StructTag, TypeTag,
};
use std::fmt;
use std::sync::Arc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a transfer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Reading the sequence number and chain id.
    Preparing,
    /// The raw transaction exists.
    Built,
    /// The transaction is signed.
    Signed,
    /// The ledger accepted the transaction.
    Submitted,
    /// The transaction is committed.
    Confirmed,
    /// The transfer ended with an error.
    Failed,
}

impl TransferState {
    /// Returns true once the transfer has ended either way.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preparing => "preparing",
            Self::Built => "built",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the ledger recorded for a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Ledger version of the transaction.
    pub version: u64,
    /// Whether on-ledger execution succeeded.
    pub success: bool,
    /// The VM status string.
    pub vm_status: String,
    /// Gas units consumed.
    pub gas_used: u64,
}

/// The result of a transfer that reached the ledger.
///
/// `success == false` means the transaction was committed, and its sequence
/// number consumed, but execution aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// Transaction hash.
    pub hash: HashValue,
    /// Sender address.
    pub sender: AccountAddress,
    /// Sequence number the transaction used.
    pub sequence_number: u64,
    /// Ledger version of the transaction.
    pub version: u64,
    /// Whether on-ledger execution succeeded.
    pub success: bool,
    /// The VM status string.
    pub vm_status: String,
    /// Gas units consumed.
    pub gas_used: u64,
}

impl TransactionOutcome {
    fn new(hash: HashValue, signed_txn: &SignedTransaction, commit: CommitInfo) -> Self {
        Self {
            hash,
            sender: signed_txn.sender(),
            sequence_number: signed_txn.sequence_number(),
            version: commit.version,
            success: commit.success,
            vm_status: commit.vm_status,
            gas_used: commit.gas_used,
        }
    }
}

/// Builds, signs, submits and confirms transfers against a [`LedgerGateway`].
///
/// Each call owns its own transaction values, so one orchestrator can run
/// any number of transfers concurrently.
#[derive(Clone)]
pub struct TransferOrchestrator {
    gateway: Arc<dyn LedgerGateway>,
    options: TransactionOptions,
    poll: PollConfig,
}

impl fmt::Debug for TransferOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOrchestrator")
            .field("options", &self.options)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl TransferOrchestrator {
    /// Creates an orchestrator over the given gateway.
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        options: TransactionOptions,
        poll: PollConfig,
    ) -> Self {
        Self {
            gateway,
            options,
            poll,
        }
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &Arc<dyn LedgerGateway> {
        &self.gateway
    }

    /// Returns the transaction options.
    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    /// Returns the polling configuration.
    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Transfers `amount` octas of APT from `sender` to `recipient` and waits
    /// for the ledger to commit it.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::SubmissionRejected`] if the ledger refuses the
    /// transaction, [`TransferError::Expired`] if it is not committed before
    /// its expiration, [`TransferError::Rejected`] if the ledger discards it
    /// after accepting it, and [`TransferError::TimedOut`] if
    /// [`PollConfig::timeout`] elapses first.
    pub async fn execute_transfer(
        &self,
        sender: &Ed25519Account,
        recipient: AccountAddress,
        amount: u64,
    ) -> TransferResult<TransactionOutcome> {
        self.execute_transfer_with_cancel(sender, recipient, amount, CancellationToken::new())
            .await
    }

    /// Like [`execute_transfer`](Self::execute_transfer), but stops waiting
    /// with [`TransferError::TimedOut`] when `cancel` fires.
    ///
    /// Cancelling does not withdraw a submitted transaction. The ledger may
    /// still commit it.
    ///
    /// # Errors
    ///
    /// See [`execute_transfer`](Self::execute_transfer).
    pub async fn execute_transfer_with_cancel(
        &self,
        sender: &Ed25519Account,
        recipient: AccountAddress,
        amount: u64,
        cancel: CancellationToken,
    ) -> TransferResult<TransactionOutcome> {
        let payload = EntryFunction::apt_transfer(recipient, amount)?.into();
        self.run(sender, payload, &cancel).await
    }

    /// Transfers any coin type, `0x1::coin::transfer<coin_type>`.
    ///
    /// # Errors
    ///
    /// See [`execute_transfer`](Self::execute_transfer).
    pub async fn execute_coin_transfer(
        &self,
        sender: &Ed25519Account,
        coin_type: TypeTag,
        recipient: AccountAddress,
        amount: u64,
        cancel: CancellationToken,
    ) -> TransferResult<TransactionOutcome> {
        let payload = EntryFunction::coin_transfer(coin_type, recipient, amount)?.into();
        self.run(sender, payload, &cancel).await
    }

    async fn run(
        &self,
        sender: &Ed25519Account,
        payload: TransactionPayload,
        cancel: &CancellationToken,
    ) -> TransferResult<TransactionOutcome> {
        let mut state = TransferState::Preparing;
        debug!(sender = %sender.address(), state = %state, "Starting transfer");

        let result = self.drive(sender, payload, cancel, &mut state).await;
        if let Err(e) = &result {
            warn!(sender = %sender.address(), failed_in = %state, error = %e, "Transfer failed");
            advance(&mut state, TransferState::Failed);
        }
        result
    }

    async fn drive(
        &self,
        sender: &Ed25519Account,
        payload: TransactionPayload,
        cancel: &CancellationToken,
        state: &mut TransferState,
    ) -> TransferResult<TransactionOutcome> {
        self.options.validate()?;

        let raw_txn = self.prepare(sender.address(), payload).await?;
        advance(state, TransferState::Built);

        let expiration_timestamp_secs = raw_txn.expiration_timestamp_secs;
        let signed_txn = self.sign(raw_txn, sender)?;
        advance(state, TransferState::Signed);

        let hash = self.submit(&signed_txn).await?;
        advance(state, TransferState::Submitted);

        let commit = self
            .await_finality(hash, expiration_timestamp_secs, cancel)
            .await?;
        advance(state, TransferState::Confirmed);

        Ok(TransactionOutcome::new(hash, &signed_txn, commit))
    }

    /// Reads the sender's sequence number and the chain id, then builds a raw
    /// transaction expiring one expiration window from now.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::AccountNotFound`] if the sender does not
    /// exist, or whatever error the gateway reports.
    pub async fn prepare(
        &self,
        sender: AccountAddress,
        payload: TransactionPayload,
    ) -> TransferResult<RawTransaction> {
        let (sequence_number, chain_id) = tokio::join!(
            self.gateway.get_sequence_number(sender),
            self.gateway.get_chain_id()
        );
        let sequence_number = sequence_number?;
        let chain_id = chain_id?;
        debug!(%sender, sequence_number, chain_id = chain_id.id(), "Retrieved transfer prerequisites");

        TransactionBuilder::new()
            .sender(sender)
            .sequence_number(sequence_number)
            .payload(payload)
            .max_gas_amount(self.options.max_gas_amount)
            .gas_unit_price(self.options.gas_unit_price)
            .expiration_timestamp_secs(
                now_secs().saturating_add(self.options.expiration_window_secs),
            )
            .chain_id(chain_id)
            .build()
    }

    /// Signs `raw_txn` unless its expiration has already passed.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Expired`] with no hash if the transaction is
    /// already expired, or [`TransferError::Signing`] if `account` does not
    /// own the sender address.
    pub fn sign(
        &self,
        raw_txn: RawTransaction,
        account: &Ed25519Account,
    ) -> TransferResult<SignedTransaction> {
        let now = now_secs();
        if raw_txn.expiration_timestamp_secs <= now {
            return Err(TransferError::Expired {
                hash: None,
                expiration_timestamp_secs: raw_txn.expiration_timestamp_secs,
            });
        }
        sign_transaction(raw_txn, account)
    }

    /// Submits a signed transaction and returns the hash to poll.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::SubmissionRejected`] if the ledger refuses the
    /// transaction. Submission is never retried.
    pub async fn submit(&self, signed_txn: &SignedTransaction) -> TransferResult<HashValue> {
        let local_hash = signed_txn.hash()?;
        let hash = self.gateway.submit(signed_txn).await?;
        if hash != local_hash {
            warn!(
                local_hash = %local_hash,
                node_hash = %hash,
                "Ledger reported a different transaction hash than computed locally"
            );
        }
        info!(
            txn_hash = %hash,
            sender = %signed_txn.sender(),
            sequence_number = signed_txn.sequence_number(),
            "Transaction submitted"
        );
        Ok(hash)
    }

    /// Polls the status of `hash` until the ledger commits or rejects it.
    ///
    /// A transaction still unknown or pending once the local clock passes
    /// `expiration_timestamp_secs` plus [`PollConfig::expiration_grace`] is
    /// reported as expired. Transient read errors are retried on the same
    /// schedule.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Expired`], [`TransferError::Rejected`],
    /// [`TransferError::TimedOut`] when `cancel` fires or the poll timeout
    /// elapses, or the first non-transient gateway error.
    pub async fn await_finality(
        &self,
        hash: HashValue,
        expiration_timestamp_secs: u64,
        cancel: &CancellationToken,
    ) -> TransferResult<CommitInfo> {
        let started = Instant::now();
        // A timeout past the clock's range means no deadline.
        let deadline = self
            .poll
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let expires_at = expiration_timestamp_secs.saturating_add(self.poll.expiration_grace_secs);
        let mut attempt: u32 = 0;

        loop {
            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(stopped_waiting(hash, started, "cancelled")),
                () = sleep_until(deadline) => return Err(stopped_waiting(hash, started, "deadline elapsed")),
                read = self.gateway.get_status(&hash) => read,
            };

            match read {
                Ok(TransactionStatus::Committed {
                    version,
                    success,
                    vm_status,
                    gas_used,
                }) => {
                    info!(txn_hash = %hash, version, success, gas_used, "Transaction committed");
                    return Ok(CommitInfo {
                        version,
                        success,
                        vm_status,
                        gas_used,
                    });
                }
                Ok(TransactionStatus::Rejected { reason }) => {
                    warn!(txn_hash = %hash, reason = %reason, "Transaction rejected");
                    return Err(TransferError::Rejected { hash, reason });
                }
                Ok(TransactionStatus::Expired) => {
                    return Err(TransferError::Expired {
                        hash: Some(hash),
                        expiration_timestamp_secs,
                    });
                }
                Ok(status) => {
                    debug!(txn_hash = %hash, attempt, status = ?status, "Transaction not final yet");
                    if now_secs() > expires_at {
                        warn!(txn_hash = %hash, expiration_timestamp_secs, "Transaction expired before commit");
                        return Err(TransferError::Expired {
                            hash: Some(hash),
                            expiration_timestamp_secs,
                        });
                    }
                }
                Err(e) if e.is_retryable() => {
                    warn!(txn_hash = %hash, attempt, error = %e, "Transient error reading transaction status, retrying");
                }
                Err(e) => return Err(e),
            }

            let delay = self.poll.delay_for_attempt(attempt);
            attempt = attempt.saturating_add(1);

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(stopped_waiting(hash, started, "cancelled")),
                () = sleep_until(deadline) => return Err(stopped_waiting(hash, started, "deadline elapsed")),
                () = time::sleep(delay) => {}
            }
        }
    }

    /// Mints `amount` octas into `address` through `faucet` and waits until
    /// every funding transaction has committed, so the new balance is
    /// readable as soon as this returns.
    ///
    /// Returns the hashes of the funding transactions.
    ///
    /// # Errors
    ///
    /// Returns the faucet's error, anything [`Self::await_finality`] returns,
    /// or [`TransferError::Rejected`] if a funding transaction commits with a
    /// failed execution.
    pub async fn fund_account(
        &self,
        faucet: &FaucetClient,
        address: AccountAddress,
        amount: u64,
    ) -> TransferResult<Vec<HashValue>> {
        let hashes = faucet.fund_account(address, amount).await?;
        let cancel = CancellationToken::new();
        for &hash in &hashes {
            // Faucet transactions carry no expiration we can see, so only the
            // poll timeout bounds this wait.
            let commit = self.await_finality(hash, u64::MAX, &cancel).await?;
            if !commit.success {
                warn!(txn_hash = %hash, %address, vm_status = %commit.vm_status, "Funding transaction failed");
                return Err(TransferError::Rejected {
                    hash,
                    reason: commit.vm_status,
                });
            }
        }
        info!(%address, amount, txn_count = hashes.len(), "Faucet funding committed");
        Ok(hashes)
    }

    /// Returns the APT balance of `address`, or `None` if it holds no APT
    /// coin store.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the resource does not decode.
    pub async fn account_balance(&self, address: AccountAddress) -> TransferResult<Option<u64>> {
        self.coin_balance(address, TypeTag::aptos_coin()).await
    }

    /// Returns the balance of `coin_type` held by `address`, or `None` if it
    /// holds no coin store for that type.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the resource does not decode.
    pub async fn coin_balance(
        &self,
        address: AccountAddress,
        coin_type: TypeTag,
    ) -> TransferResult<Option<u64>> {
        let tag = StructTag::coin_store(coin_type);
        let resource = self.get_typed_resource(address, &tag).await?;
        Ok(resource
            .as_ref()
            .and_then(LedgerResource::as_coin_store)
            .map(CoinStoreResource::balance))
    }

    /// Reads and decodes a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the resource does not decode.
    pub async fn get_typed_resource(
        &self,
        address: AccountAddress,
        resource_type: &StructTag,
    ) -> TransferResult<Option<LedgerResource>> {
        match self.gateway.get_resource(address, resource_type).await? {
            Some(bytes) => LedgerResource::decode(resource_type, &bytes).map(Some),
            None => Ok(None),
        }
    }
}

fn advance(state: &mut TransferState, next: TransferState) {
    debug!(from = %state, to = %next, "Transfer state transition");
    *state = next;
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn stopped_waiting(hash: HashValue, started: Instant, why: &str) -> TransferError {
    let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(txn_hash = %hash, waited_ms, why, "Stopped waiting for transaction");
    TransferError::TimedOut { hash, waited_ms }
}
