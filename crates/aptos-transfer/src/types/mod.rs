//! Core ledger types.
//!
//! Addresses, chain ids, hashes, Move type tags and the on-ledger resources
//! the transfer pipeline reads.

mod address;
mod chain_id;
mod hash;
mod move_types;
mod resources;

pub use address::{AccountAddress, ADDRESS_LENGTH};
pub use chain_id::ChainId;
pub use hash::{HashValue, HASH_LENGTH};
pub use move_types::{Identifier, MoveModuleId, StructTag, TypeTag};
pub use resources::{
    AccountResource, Coin, CoinStoreResource, EventHandle, Guid, LedgerResource, UnknownResource,
};
