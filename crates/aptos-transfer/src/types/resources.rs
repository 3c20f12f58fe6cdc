//! Typed on-ledger resources.
//!
//! The fullnode serves resources as canonical bytes when asked for
//! `application/x-bcs`. [`LedgerResource::decode`] picks a schema from the
//! resource's struct tag, so callers get fields by name rather than poking at
//! a JSON map. Resource types this crate has no schema for are kept as
//! [`UnknownResource`], bytes and all.

use crate::bcs::decode_value;
use crate::error::TransferResult;
use crate::types::{AccountAddress, StructTag, TypeTag};
use serde::{Deserialize, Serialize};

/// `0x1::coin::Coin<T>`: an amount of one coin type, in its smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coin {
    /// Amount held.
    pub value: u64,
}

/// `0x1::guid::GUID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guid {
    /// Per-account creation counter at the time the GUID was made.
    pub creation_num: u64,
    /// The account that created the GUID.
    pub addr: AccountAddress,
}

/// `0x1::event::EventHandle<T>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandle {
    /// Number of events emitted through this handle.
    pub counter: u64,
    /// Globally unique id of the event stream.
    pub guid: Guid,
}

/// `0x1::coin::CoinStore<T>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinStoreResource {
    /// The balance.
    pub coin: Coin,
    /// Whether deposits and withdrawals are blocked.
    pub frozen: bool,
    /// Deposit events.
    pub deposit_events: EventHandle,
    /// Withdraw events.
    pub withdraw_events: EventHandle,
}

impl CoinStoreResource {
    /// Returns the balance held in this store.
    pub fn balance(&self) -> u64 {
        self.coin.value
    }
}

/// `0x1::account::Account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResource {
    /// Current authentication key.
    pub authentication_key: Vec<u8>,
    /// Next sequence number the account will use.
    pub sequence_number: u64,
    /// Next GUID creation number.
    pub guid_creation_num: u64,
    /// Coin registration events.
    pub coin_register_events: EventHandle,
    /// Key rotation events.
    pub key_rotation_events: EventHandle,
    /// Account the rotation capability is offered to, if any.
    pub rotation_capability_offer: Option<AccountAddress>,
    /// Account the signer capability is offered to, if any.
    pub signer_capability_offer: Option<AccountAddress>,
}

/// A resource with no local schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResource {
    /// The resource type.
    pub type_tag: StructTag,
    /// The raw canonical bytes as served by the ledger.
    pub bytes: Vec<u8>,
}

/// A decoded on-ledger resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerResource {
    /// A coin store, tagged with its coin type.
    CoinStore(TypeTag, CoinStoreResource),
    /// The account resource.
    Account(AccountResource),
    /// Anything else.
    Unknown(UnknownResource),
}

impl LedgerResource {
    /// Decodes `bytes` according to the schema `type_tag` names.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransferError::Serialization`] if the type is known but
    /// the bytes do not match its layout.
    pub fn decode(type_tag: &StructTag, bytes: &[u8]) -> TransferResult<Self> {
        if type_tag.is_framework_struct("coin", "CoinStore") && type_tag.type_args.len() == 1 {
            let store = decode_value::<CoinStoreResource>(bytes)?;
            return Ok(Self::CoinStore(type_tag.type_args[0].clone(), store));
        }
        if type_tag.is_framework_struct("account", "Account") && type_tag.type_args.is_empty() {
            return Ok(Self::Account(decode_value(bytes)?));
        }
        Ok(Self::Unknown(UnknownResource {
            type_tag: type_tag.clone(),
            bytes: bytes.to_vec(),
        }))
    }

    /// Returns the coin store if this is one.
    pub fn as_coin_store(&self) -> Option<&CoinStoreResource> {
        match self {
            Self::CoinStore(_, store) => Some(store),
            _ => None,
        }
    }

    /// Returns the account resource if this is one.
    pub fn as_account(&self) -> Option<&AccountResource> {
        match self {
            Self::Account(account) => Some(account),
            _ => None,
        }
    }
}
