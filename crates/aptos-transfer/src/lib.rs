//! # Aptos Transfer
//!
//! Build, sign, submit and confirm coin transfers on the Aptos blockchain.
//!
//! A transfer is a `0x1::coin::transfer` entry-function call wrapped in a raw
//! transaction, encoded with Binary Canonical Serialization, signed with
//! Ed25519, posted to a fullnode, and then polled until the ledger commits or
//! rejects it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aptos_transfer::account::Ed25519Account;
//! use aptos_transfer::api::{FaucetClient, FullnodeClient};
//! use aptos_transfer::config::{AptosConfig, TransactionOptions};
//! use aptos_transfer::poll::PollConfig;
//! use aptos_transfer::TransferOrchestrator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AptosConfig::devnet();
//!     let alice = Ed25519Account::generate();
//!     let bob = Ed25519Account::generate();
//!     FaucetClient::new(&config)?.fund_account(alice.address(), 20_000).await?;
//!
//!     let orchestrator = TransferOrchestrator::new(
//!         Arc::new(FullnodeClient::new(config)?),
//!         TransactionOptions::default(),
//!         PollConfig::default(),
//!     );
//!     let outcome = orchestrator.execute_transfer(&alice, bob.address(), 1_000).await?;
//!     println!("Committed at version {}", outcome.version);
//!
//!     let balance = orchestrator.account_balance(bob.address()).await?;
//!     println!("Bob: {balance:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`bcs`] - Canonical encoding
//! - [`types`] - Addresses, hashes, type tags and typed resources
//! - [`crypto`] - Ed25519 keys, SHA3-256 and address derivation
//! - [`account`] - Sender identities
//! - [`transaction`] - Payloads, raw and signed transactions, signing
//! - [`api`] - The ledger gateway and its REST implementation
//! - [`orchestrator`] - The prepare, sign, submit and confirm state machine
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod account;
pub mod api;
pub mod bcs;
pub mod config;
pub mod crypto;
pub mod error;
pub mod orchestrator;
pub mod poll;
pub mod transaction;
pub mod types;

// Re-export main entry points
pub use api::{FullnodeClient, LedgerGateway, TransactionStatus};
pub use config::{AptosConfig, TransactionOptions};
pub use error::{TransferError, TransferResult};
pub use orchestrator::{TransactionOutcome, TransferOrchestrator, TransferState};

// Re-export commonly used types
pub use types::{AccountAddress, ChainId, HashValue};
