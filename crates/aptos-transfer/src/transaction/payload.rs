//! Transaction payloads.

use crate::bcs::encode_value;
use crate::error::TransferResult;
use crate::types::{AccountAddress, Identifier, MoveModuleId, TypeTag};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire index of [`TransactionPayload::EntryFunction`].
pub const ENTRY_FUNCTION_VARIANT: u32 = 2;

/// The payload of a transaction, specifying what action to take.
///
/// Variant indices must match Aptos core:
/// - 0: Script
/// - 1: ModuleBundle (retired)
/// - 2: EntryFunction
///
/// Only entry functions can be built or decoded. The first two variants
/// hold the wire positions and cannot be constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    /// Script payload (variant 0).
    #[doc(hidden)]
    Script(UnsupportedPayload),
    /// Module bundle payload (variant 1).
    #[doc(hidden)]
    ModuleBundle(UnsupportedPayload),
    /// Call an entry function on a module (variant 2).
    EntryFunction(EntryFunction),
}

impl TransactionPayload {
    /// Returns the entry function this payload calls.
    pub fn entry_function(&self) -> &EntryFunction {
        match self {
            Self::EntryFunction(entry_function) => entry_function,
            Self::Script(unsupported) | Self::ModuleBundle(unsupported) => unsupported.absurd(),
        }
    }
}

/// A payload kind this crate neither builds nor decodes. It has no values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedPayload(Never);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Never {}

impl UnsupportedPayload {
    fn absurd(&self) -> ! {
        match self.0 {}
    }
}

impl Serialize for UnsupportedPayload {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.absurd()
    }
}

impl<'de> Deserialize<'de> for UnsupportedPayload {
    fn deserialize<D>(_deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(serde::de::Error::custom(
            "unsupported transaction payload: only entry functions are accepted",
        ))
    }
}

/// An entry function call payload.
///
/// Arguments are stored already encoded, one byte string per argument.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::transaction::EntryFunction;
/// use aptos_transfer::types::{AccountAddress, TypeTag};
///
/// let recipient = AccountAddress::from_hex("0x123").unwrap();
/// let transfer = EntryFunction::coin_transfer(TypeTag::aptos_coin(), recipient, 1000).unwrap();
/// assert_eq!(transfer.to_string(), "0x1::coin::transfer<0x1::aptos_coin::AptosCoin>");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunction {
    /// The module containing the function.
    pub module: MoveModuleId,
    /// The function name.
    pub function: Identifier,
    /// Type arguments for generic functions.
    pub type_args: Vec<TypeTag>,
    /// Canonically encoded arguments.
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// Creates a new entry function payload.
    pub fn new(
        module: MoveModuleId,
        function: Identifier,
        type_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            module,
            function,
            type_args,
            args,
        }
    }

    /// Creates a `0x1::coin::transfer<coin_type>(recipient, amount)` call.
    ///
    /// # Arguments
    ///
    /// * `coin_type` - The coin type tag
    /// * `recipient` - The recipient's address
    /// * `amount` - Amount in the coin's smallest unit
    pub fn coin_transfer(
        coin_type: TypeTag,
        recipient: AccountAddress,
        amount: u64,
    ) -> TransferResult<Self> {
        let module = MoveModuleId::new(AccountAddress::ONE, Identifier::new("coin")?);
        Ok(Self {
            module,
            function: Identifier::new("transfer")?,
            type_args: vec![coin_type],
            args: vec![encode_value(&recipient)?, encode_value(&amount)?],
        })
    }

    /// Creates an APT transfer, with `amount` in octas (1 APT = 10^8 octas).
    pub fn apt_transfer(recipient: AccountAddress, amount: u64) -> TransferResult<Self> {
        Self::coin_transfer(TypeTag::aptos_coin(), recipient, amount)
    }
}

impl std::fmt::Display for EntryFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.module, self.function)?;
        if !self.type_args.is_empty() {
            let type_args: Vec<String> = self.type_args.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", type_args.join(", "))?;
        }
        Ok(())
    }
}

impl From<EntryFunction> for TransactionPayload {
    fn from(entry_function: EntryFunction) -> Self {
        TransactionPayload::EntryFunction(entry_function)
    }
}
