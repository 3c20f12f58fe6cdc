//! Transaction building and signing.
//!
//! A coin transfer goes through three shapes here: an [`EntryFunction`]
//! payload, a [`RawTransaction`] that wraps it with the sender's sequence
//! number, gas terms and expiration, and finally a [`SignedTransaction`]
//! carrying the sender's Ed25519 signature.
//!
//! # Example
//!
//! ```rust
//! use aptos_transfer::account::Ed25519Account;
//! use aptos_transfer::transaction::{sign_transaction, EntryFunction, TransactionBuilder};
//! use aptos_transfer::types::{AccountAddress, ChainId};
//!
//! let sender = Ed25519Account::generate();
//! let payload = EntryFunction::apt_transfer(AccountAddress::from_hex("0xb0b").unwrap(), 1000).unwrap();
//!
//! let raw_txn = TransactionBuilder::new()
//!     .sender(sender.address())
//!     .sequence_number(0)
//!     .payload(payload.into())
//!     .chain_id(ChainId::testnet())
//!     .expiration_from_now(10)
//!     .build()
//!     .unwrap();
//! let signed = sign_transaction(raw_txn, &sender).unwrap();
//! assert!(signed.verify().is_ok());
//! ```

mod builder;
mod payload;
mod signer;
mod types;

pub use builder::{
    now_secs, TransactionBuilder, DEFAULT_EXPIRATION_SECONDS, DEFAULT_GAS_UNIT_PRICE,
    DEFAULT_MAX_GAS_AMOUNT,
};
pub use payload::{EntryFunction, TransactionPayload, UnsupportedPayload, ENTRY_FUNCTION_VARIANT};
pub use signer::sign_transaction;
pub use types::{
    RawTransaction, SignedTransaction, ED25519_AUTHENTICATOR_LENGTH,
    ED25519_AUTHENTICATOR_VARIANT,
};
