//! Behavioral tests for the transfer pipeline.
//!
//! These tests drive the orchestrator against [`MockLedger`], an in-memory
//! [`LedgerGateway`] that validates and applies coin transfers the way a
//! fullnode would, without requiring a live network.

use aptos_transfer::account::Ed25519Account;
use aptos_transfer::bcs::{decode_value, encode_value};
use aptos_transfer::poll::PollConfig;
use aptos_transfer::transaction::{now_secs, EntryFunction, SignedTransaction, TransactionBuilder};
use aptos_transfer::types::{Coin, CoinStoreResource, EventHandle, Guid, StructTag, TypeTag};
use aptos_transfer::{
    AccountAddress, ChainId, HashValue, LedgerGateway, TransactionOptions, TransactionStatus,
    TransferError, TransferOrchestrator, TransferResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const CHAIN_ID: u8 = 4;
const GAS_USED: u64 = 10;

#[derive(Debug, Clone, Copy)]
struct MockAccount {
    sequence_number: u64,
    balance: Option<u64>,
}

#[derive(Debug, Clone)]
enum MockPayload {
    Signed(SignedTransaction),
    /// A faucet mint, which creates the account if needed.
    Mint { address: AccountAddress, amount: u64 },
}

#[derive(Debug, Clone)]
struct MockTransaction {
    payload: MockPayload,
    reads: u32,
    status: TransactionStatus,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountAddress, MockAccount>,
    transactions: HashMap<HashValue, MockTransaction>,
    version: u64,
    submissions: u32,
}

/// An in-memory ledger.
///
/// Submitted transactions stay pending for `pending_reads` status reads and
/// then commit. A stalled ledger never commits anything.
struct MockLedger {
    state: Mutex<LedgerState>,
    latency: Duration,
    pending_reads: u32,
    stalled: Mutex<bool>,
    discard_reason: Option<String>,
}

impl MockLedger {
    fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            latency: Duration::ZERO,
            pending_reads: 2,
            stalled: Mutex::new(false),
            discard_reason: None,
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn stalled(self) -> Self {
        *self.stalled.lock().unwrap() = true;
        self
    }

    fn discarding(mut self, reason: &str) -> Self {
        self.discard_reason = Some(reason.to_string());
        self
    }

    fn resume(&self) {
        *self.stalled.lock().unwrap() = false;
    }

    fn add_account(&self, address: AccountAddress, sequence_number: u64, balance: Option<u64>) {
        self.state.lock().unwrap().accounts.insert(
            address,
            MockAccount {
                sequence_number,
                balance,
            },
        );
    }

    fn balance(&self, address: AccountAddress) -> Option<u64> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(&address)
            .and_then(|account| account.balance)
    }

    fn sequence_number(&self, address: AccountAddress) -> u64 {
        self.state.lock().unwrap().accounts[&address].sequence_number
    }

    /// Queues a faucet mint. Like any other transaction it commits only
    /// after `pending_reads` status reads.
    fn mint(&self, address: AccountAddress, amount: u64) -> HashValue {
        let mut state = self.state.lock().unwrap();
        let nonce = state.transactions.len();
        let hash = HashValue::sha3_256(format!("mint:{address}:{amount}:{nonce}"));
        state.transactions.insert(
            hash,
            MockTransaction {
                payload: MockPayload::Mint { address, amount },
                reads: 0,
                status: TransactionStatus::Pending,
            },
        );
        hash
    }

    fn submissions(&self) -> u32 {
        self.state.lock().unwrap().submissions
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn validate(state: &LedgerState, signed_txn: &SignedTransaction) -> Result<(), String> {
        let raw = &signed_txn.raw_txn;
        if signed_txn.verify().is_err() {
            return Err("INVALID_SIGNATURE".to_string());
        }
        if raw.chain_id != ChainId::new(CHAIN_ID) {
            return Err("BAD_CHAIN_ID".to_string());
        }
        if raw.expiration_timestamp_secs <= now_secs() {
            return Err("TRANSACTION_EXPIRED".to_string());
        }
        let Some(sender) = state.accounts.get(&raw.sender) else {
            return Err("SENDER_ACCOUNT_DOES_NOT_EXIST".to_string());
        };
        if raw.sequence_number < sender.sequence_number {
            return Err("SEQUENCE_NUMBER_TOO_OLD".to_string());
        }
        let max_fee = raw.max_gas_amount * raw.gas_unit_price;
        if sender.balance.unwrap_or(0) < max_fee {
            return Err("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE".to_string());
        }
        Ok(())
    }

    fn apply_mint(state: &mut LedgerState, address: AccountAddress, amount: u64) -> TransactionStatus {
        state.version += 1;
        let account = state.accounts.entry(address).or_insert(MockAccount {
            sequence_number: 0,
            balance: None,
        });
        account.balance = Some(account.balance.unwrap_or(0) + amount);
        TransactionStatus::Committed {
            version: state.version,
            success: true,
            vm_status: "Executed successfully".to_string(),
            gas_used: 0,
        }
    }

    /// Executes a `0x1::coin::transfer<AptosCoin>` and returns its status.
    fn execute(state: &mut LedgerState, signed_txn: &SignedTransaction) -> TransactionStatus {
        let raw = &signed_txn.raw_txn;
        let entry_function = raw.payload.entry_function();
        let recipient: AccountAddress = decode_value(&entry_function.args[0]).unwrap();
        let amount: u64 = decode_value(&entry_function.args[1]).unwrap();
        let fee = GAS_USED * raw.gas_unit_price;

        state.version += 1;
        let sender = state.accounts.get_mut(&raw.sender).unwrap();
        sender.sequence_number += 1;
        let available = sender.balance.unwrap_or(0);
        if available < amount + fee {
            sender.balance = Some(available.saturating_sub(fee));
            return TransactionStatus::Committed {
                version: state.version,
                success: false,
                vm_status: "Move abort in 0x1::coin: EINSUFFICIENT_BALANCE(0x10006)".to_string(),
                gas_used: GAS_USED,
            };
        }
        sender.balance = Some(available - amount - fee);

        let receiver = state.accounts.entry(recipient).or_insert(MockAccount {
            sequence_number: 0,
            balance: None,
        });
        receiver.balance = Some(receiver.balance.unwrap_or(0) + amount);

        TransactionStatus::Committed {
            version: state.version,
            success: true,
            vm_status: "Executed successfully".to_string(),
            gas_used: GAS_USED,
        }
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn get_sequence_number(&self, address: AccountAddress) -> TransferResult<u64> {
        self.simulate_latency().await;
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(&address)
            .map(|account| account.sequence_number)
            .ok_or_else(|| TransferError::AccountNotFound(address.to_string()))
    }

    async fn get_chain_id(&self) -> TransferResult<ChainId> {
        self.simulate_latency().await;
        Ok(ChainId::new(CHAIN_ID))
    }

    async fn get_resource(
        &self,
        address: AccountAddress,
        resource_type: &StructTag,
    ) -> TransferResult<Option<Vec<u8>>> {
        self.simulate_latency().await;
        if *resource_type != StructTag::coin_store(TypeTag::aptos_coin()) {
            return Ok(None);
        }
        let Some(value) = self.balance(address) else {
            return Ok(None);
        };
        let handle = EventHandle {
            counter: 0,
            guid: Guid {
                creation_num: 0,
                addr: address,
            },
        };
        let store = CoinStoreResource {
            coin: Coin { value },
            frozen: false,
            deposit_events: handle,
            withdraw_events: handle,
        };
        encode_value(&store).map(Some)
    }

    async fn submit(&self, signed_txn: &SignedTransaction) -> TransferResult<HashValue> {
        self.simulate_latency().await;
        let mut state = self.state.lock().unwrap();
        state.submissions += 1;
        Self::validate(&state, signed_txn).map_err(|reason| TransferError::SubmissionRejected {
            reason,
            vm_error_code: None,
        })?;

        let hash = signed_txn.hash()?;
        state.transactions.insert(
            hash,
            MockTransaction {
                payload: MockPayload::Signed(signed_txn.clone()),
                reads: 0,
                status: TransactionStatus::Pending,
            },
        );
        Ok(hash)
    }

    async fn get_status(&self, hash: &HashValue) -> TransferResult<TransactionStatus> {
        self.simulate_latency().await;
        let stalled = *self.stalled.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        let Some(txn) = state.transactions.get_mut(hash) else {
            return Ok(TransactionStatus::Submitted);
        };
        if txn.status.is_terminal() || stalled {
            return Ok(txn.status.clone());
        }
        if txn.reads < self.pending_reads {
            txn.reads += 1;
            return Ok(TransactionStatus::Pending);
        }

        let payload = txn.payload.clone();
        let status = match (payload, &self.discard_reason) {
            (MockPayload::Mint { address, amount }, _) => {
                MockLedger::apply_mint(&mut state, address, amount)
            }
            (MockPayload::Signed(_), Some(reason)) => TransactionStatus::Rejected {
                reason: reason.clone(),
            },
            (MockPayload::Signed(signed_txn), None) => MockLedger::execute(&mut state, &signed_txn),
        };
        if let Some(txn) = state.transactions.get_mut(hash) {
            txn.status = status.clone();
        }
        Ok(status)
    }
}

fn fast_poll() -> PollConfig {
    PollConfig::builder()
        .initial_interval_ms(5)
        .max_interval_ms(20)
        .timeout(Duration::from_secs(10))
        .expiration_grace_secs(0)
        .build()
}

fn orchestrator_for(ledger: &Arc<MockLedger>) -> TransferOrchestrator {
    TransferOrchestrator::new(ledger.clone(), TransactionOptions::default(), fast_poll())
}

mod transfer_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_transfer_moves_funds() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        let bob = Ed25519Account::generate();
        ledger.add_account(alice.address(), 5, Some(20_000));
        ledger.add_account(bob.address(), 0, Some(0));
        let orchestrator = orchestrator_for(&ledger);

        let bob_before = orchestrator.account_balance(bob.address()).await.unwrap();
        let outcome = orchestrator
            .execute_transfer(&alice, bob.address(), 1_000)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.sender, alice.address());
        assert_eq!(outcome.sequence_number, 5);
        assert_eq!(outcome.gas_used, GAS_USED);
        assert_eq!(
            orchestrator.account_balance(bob.address()).await.unwrap(),
            bob_before.map(|b| b + 1_000)
        );
        assert_eq!(
            orchestrator.account_balance(alice.address()).await.unwrap(),
            Some(20_000 - 1_000 - outcome.gas_used)
        );
        assert_eq!(ledger.sequence_number(alice.address()), 6);
    }

    #[tokio::test]
    async fn test_transfer_creates_recipient_balance() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        let bob = AccountAddress::from_hex("0xb0b").unwrap();
        ledger.add_account(alice.address(), 0, Some(5_000));
        let orchestrator = orchestrator_for(&ledger);

        assert_eq!(orchestrator.account_balance(bob).await.unwrap(), None);
        orchestrator.execute_transfer(&alice, bob, 250).await.unwrap();
        assert_eq!(orchestrator.account_balance(bob).await.unwrap(), Some(250));
    }

    #[tokio::test]
    async fn test_consecutive_transfers_use_next_sequence_number() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        let bob = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(20_000));
        let orchestrator = orchestrator_for(&ledger);

        let first = orchestrator
            .execute_transfer(&alice, bob.address(), 100)
            .await
            .unwrap();
        let second = orchestrator
            .execute_transfer(&alice, bob.address(), 100)
            .await
            .unwrap();

        assert_eq!(first.sequence_number, 0);
        assert_eq!(second.sequence_number, 1);
        assert!(second.version > first.version);
        assert_ne!(first.hash, second.hash);
    }

    #[tokio::test]
    async fn test_aborted_execution_is_committed_with_failure() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(1_500));
        let orchestrator = orchestrator_for(&ledger);

        let outcome = orchestrator
            .execute_transfer(&alice, AccountAddress::ONE, 1_000_000)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.vm_status.contains("EINSUFFICIENT_BALANCE"));
        assert_eq!(ledger.sequence_number(alice.address()), 1);
    }

    #[tokio::test]
    async fn test_unknown_sender_is_account_not_found() {
        let ledger = Arc::new(MockLedger::new());
        let orchestrator = orchestrator_for(&ledger);

        let err = orchestrator
            .execute_transfer(&Ed25519Account::generate(), AccountAddress::ONE, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::AccountNotFound(_)));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_transfer_survives_latency() {
        let ledger = Arc::new(MockLedger::new().with_latency(Duration::from_millis(15)));
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 3, Some(10_000));
        let orchestrator = orchestrator_for(&ledger);

        let outcome = orchestrator
            .execute_transfer(&alice, AccountAddress::ONE, 10)
            .await
            .unwrap();
        assert_eq!(outcome.sequence_number, 3);
    }
}

mod rejection_tests {
    use super::*;

    #[tokio::test]
    async fn test_stale_sequence_number_is_rejected_synchronously() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 5, Some(20_000));
        let orchestrator = orchestrator_for(&ledger);

        let raw_txn = TransactionBuilder::new()
            .sender(alice.address())
            .sequence_number(4)
            .payload(EntryFunction::apt_transfer(AccountAddress::ONE, 1_000).unwrap().into())
            .expiration_from_now(10)
            .chain_id(ChainId::new(CHAIN_ID))
            .build()
            .unwrap();
        let signed_txn = orchestrator.sign(raw_txn, &alice).unwrap();

        match orchestrator.submit(&signed_txn).await.unwrap_err() {
            TransferError::SubmissionRejected { reason, .. } => {
                assert!(reason.contains("SEQUENCE_NUMBER_TOO_OLD"));
            }
            other => panic!("expected SubmissionRejected, got {other:?}"),
        }
        assert_eq!(ledger.sequence_number(alice.address()), 5);
        assert_eq!(
            ledger.get_status(&signed_txn.hash().unwrap()).await.unwrap(),
            TransactionStatus::Submitted
        );
    }

    #[tokio::test]
    async fn test_insufficient_gas_balance_is_rejected() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(10));
        let orchestrator = orchestrator_for(&ledger);

        let err = orchestrator
            .execute_transfer(&alice, AccountAddress::ONE, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::SubmissionRejected { .. }));
        assert!(err.is_terminal_failure());
    }

    #[tokio::test]
    async fn test_discarded_after_acceptance_is_rejected() {
        let ledger = Arc::new(MockLedger::new().discarding("Transaction discarded"));
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(20_000));
        let orchestrator = orchestrator_for(&ledger);

        let err = orchestrator
            .execute_transfer(&alice, AccountAddress::ONE, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Rejected { .. }));
    }
}

mod expiration_tests {
    use super::*;

    #[tokio::test]
    async fn test_expiration_in_the_past_is_never_submitted() {
        let ledger = Arc::new(MockLedger::new());
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(20_000));
        let orchestrator = orchestrator_for(&ledger);

        let raw_txn = TransactionBuilder::new()
            .sender(alice.address())
            .sequence_number(0)
            .payload(EntryFunction::apt_transfer(AccountAddress::ONE, 1).unwrap().into())
            .expiration_timestamp_secs(now_secs() - 60)
            .chain_id(ChainId::new(CHAIN_ID))
            .build()
            .unwrap();

        let err = orchestrator.sign(raw_txn, &alice).unwrap_err();
        assert!(matches!(err, TransferError::Expired { hash: None, .. }));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_stalled_transaction_expires() {
        let ledger = Arc::new(MockLedger::new().stalled());
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(20_000));
        let orchestrator = TransferOrchestrator::new(
            ledger.clone(),
            TransactionOptions::default().with_expiration_window_secs(2),
            fast_poll(),
        );

        let err = orchestrator
            .execute_transfer(&alice, AccountAddress::ONE, 1)
            .await
            .unwrap_err();

        match err {
            TransferError::Expired {
                hash: Some(_),
                expiration_timestamp_secs,
            } => assert!(expiration_timestamp_secs < now_secs()),
            other => panic!("expected Expired, got {other:?}"),
        }
        assert_eq!(ledger.submissions(), 1);
    }
}

mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_while_pending_is_timed_out() {
        let ledger = Arc::new(MockLedger::new().stalled());
        let alice = Ed25519Account::generate();
        ledger.add_account(alice.address(), 0, Some(20_000));
        let orchestrator = orchestrator_for(&ledger);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = orchestrator
            .execute_transfer_with_cancel(&alice, AccountAddress::ONE, 1, cancel)
            .await
            .unwrap_err();

        let TransferError::TimedOut { hash, waited_ms } = err else {
            panic!("expected TimedOut, got {err:?}");
        };
        assert!(waited_ms < 10_000);
        assert!(!TransferError::TimedOut { hash, waited_ms }.is_terminal_failure());

        // The ledger decides the transaction's fate on its own.
        ledger.resume();
        let commit = orchestrator
            .await_finality(hash, now_secs() + 60, &CancellationToken::new())
            .await
            .unwrap();
        assert!(commit.success);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_slow_status_read() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_latency(Duration::from_millis(500))
                .stalled(),
        );
        let orchestrator = orchestrator_for(&ledger);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = orchestrator
            .await_finality(HashValue::new([7; 32]), now_secs() + 60, &cancel)
            .await
            .unwrap_err();
        match err {
            TransferError::TimedOut { waited_ms, .. } => assert!(waited_ms < 500),
            other => panic!("expected TimedOut, got {other:?}"),
        }
    }
}

mod balance_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_coin_store_is_no_balance() {
        let ledger = Arc::new(MockLedger::new());
        let address = AccountAddress::from_hex("0xcafe").unwrap();
        ledger.add_account(address, 0, None);
        let orchestrator = orchestrator_for(&ledger);

        assert_eq!(orchestrator.account_balance(address).await.unwrap(), None);
        let other_coin = TypeTag::from_str_strict("0x1::fake::Coin").unwrap();
        assert_eq!(
            orchestrator.coin_balance(address, other_coin).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_typed_resource_decodes_coin_store() {
        let ledger = Arc::new(MockLedger::new());
        let address = AccountAddress::from_hex("0xcafe").unwrap();
        ledger.add_account(address, 0, Some(77));
        let orchestrator = orchestrator_for(&ledger);

        let tag = StructTag::coin_store(TypeTag::aptos_coin());
        let resource = orchestrator
            .get_typed_resource(address, &tag)
            .await
            .unwrap()
            .unwrap();
        let store = resource.as_coin_store().unwrap();
        assert_eq!(store.balance(), 77);
        assert!(!store.frozen);
    }
}

mod funding_tests {
    use super::*;
    use aptos_transfer::api::FaucetClient;
    use aptos_transfer::AptosConfig;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, Request, ResponseTemplate,
    };

    /// Starts a faucet that queues mints on `ledger` and answers with their
    /// hashes before they commit.
    async fn faucet_for(ledger: &Arc<MockLedger>) -> (MockServer, FaucetClient) {
        let server = MockServer::start().await;
        let minter = ledger.clone();
        Mock::given(method("POST"))
            .and(path("/mint"))
            .respond_with(move |request: &Request| {
                let mut address = None;
                let mut amount = None;
                for (key, value) in request.url.query_pairs() {
                    match &*key {
                        "address" => address = AccountAddress::from_hex(&*value).ok(),
                        "amount" => amount = value.parse::<u64>().ok(),
                        _ => {}
                    }
                }
                match (address, amount) {
                    (Some(address), Some(amount)) => {
                        let hash = minter.mint(address, amount);
                        ResponseTemplate::new(200).set_body_json(vec![hash.to_hex()])
                    }
                    _ => ResponseTemplate::new(400),
                }
            })
            .mount(&server)
            .await;

        let config = AptosConfig::custom("http://127.0.0.1:1/v1")
            .unwrap()
            .with_faucet_url(&server.uri())
            .unwrap();
        let faucet = FaucetClient::new(&config).unwrap();
        (server, faucet)
    }

    #[tokio::test]
    async fn test_faucet_mint_is_pending_until_committed() {
        let ledger = Arc::new(MockLedger::new());
        let (_server, faucet) = faucet_for(&ledger).await;
        let alice = Ed25519Account::generate();

        let hashes = faucet.fund_account(alice.address(), 20_000).await.unwrap();

        assert_eq!(hashes.len(), 1);
        assert_eq!(ledger.balance(alice.address()), None);
    }

    #[tokio::test]
    async fn test_funding_is_confirmed_before_transfer() {
        let ledger = Arc::new(MockLedger::new());
        let (_server, faucet) = faucet_for(&ledger).await;
        let orchestrator = orchestrator_for(&ledger);
        let alice = Ed25519Account::generate();
        let bob = Ed25519Account::generate();

        let hashes = orchestrator
            .fund_account(&faucet, alice.address(), 20_000)
            .await
            .unwrap();
        orchestrator
            .fund_account(&faucet, bob.address(), 0)
            .await
            .unwrap();

        assert_eq!(hashes.len(), 1);
        assert!(matches!(
            ledger.get_status(&hashes[0]).await.unwrap(),
            TransactionStatus::Committed { success: true, .. }
        ));
        assert_eq!(
            orchestrator.account_balance(alice.address()).await.unwrap(),
            Some(20_000)
        );
        assert_eq!(
            orchestrator.account_balance(bob.address()).await.unwrap(),
            Some(0)
        );

        let outcome = orchestrator
            .execute_transfer(&alice, bob.address(), 1_000)
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(ledger.balance(bob.address()), Some(1_000));
    }
}
