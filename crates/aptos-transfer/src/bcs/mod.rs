//! Binary Canonical Serialization.
//!
//! Every ledger entity has exactly one valid byte representation, and
//! signatures are computed over those bytes. The rules:
//!
//! - fixed-width integers are little-endian;
//! - lengths and enum variant indices are ULEB128;
//! - byte strings, strings and sequences are length-prefixed;
//! - `Option<T>` is a `0`/`1` tag followed by the value;
//! - struct fields are written in declared order.
//!
//! The entity types derive `serde` traits and the `bcs` crate does the
//! encoding. This module adds the error mapping and the decode limits.
//!
//! Entry-function arguments are encoded twice: each argument with
//! [`encode_value`], then the list of encoded arguments with
//! [`encode_argument_list`].

use crate::error::{TransferError, TransferResult};
use serde::{de::DeserializeOwned, Serialize};

/// The longest sequence the canonical encoding accepts.
pub const MAX_SEQUENCE_LENGTH: usize = (1 << 31) - 1;

/// How deeply structs and enums may nest in decoded input.
///
/// A transfer nests a handful of levels, plus two per level of generic
/// type arguments.
pub const MAX_DECODE_DEPTH: usize = 64;

/// Encodes a single value, such as one entry-function argument.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::bcs::encode_value;
///
/// assert_eq!(encode_value(&1000u64).unwrap(), vec![0xe8, 0x03, 0, 0, 0, 0, 0, 0]);
/// ```
///
/// # Errors
///
/// Returns [`TransferError::Serialization`] if a sequence is longer than
/// [`MAX_SEQUENCE_LENGTH`] or the value cannot be represented.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> TransferResult<Vec<u8>> {
    aptos_bcs::to_bytes(value).map_err(TransferError::serialization)
}

/// Encodes a list of already-encoded arguments as a sequence of byte strings.
///
/// This is the outer half of the entry-function argument encoding: every
/// element of `args` must already be the output of [`encode_value`], and it
/// gets its own length prefix here.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::bcs::{encode_argument_list, encode_value};
///
/// let args = vec![encode_value(&7u8).unwrap()];
/// assert_eq!(encode_argument_list(&args).unwrap(), vec![1, 1, 7]);
/// ```
pub fn encode_argument_list(args: &[Vec<u8>]) -> TransferResult<Vec<u8>> {
    encode_value(args)
}

/// Decodes a single value and requires that the whole input was consumed.
///
/// Decoding is strict: non-minimal ULEB128, booleans other than `0`/`1`,
/// trailing input and nesting deeper than [`MAX_DECODE_DEPTH`] are errors.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> TransferResult<T> {
    aptos_bcs::from_bytes_with_limit(bytes, MAX_DECODE_DEPTH)
        .map_err(TransferError::serialization)
}
