//! Account address type.
//!
//! Aptos account addresses are 32-byte values, displayed as 64 lower-case
//! hexadecimal characters with a `0x` prefix.

use crate::error::{TransferError, TransferResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// A 32-byte Aptos account address.
///
/// Parsing accepts a `0x`/`0X` prefix (or none), either letter case, and
/// short forms such as `0x1`, which are zero-padded on the left.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::AccountAddress;
///
/// let addr = AccountAddress::from_hex("0x1").unwrap();
/// assert_eq!(addr.to_string(), "0x0000000000000000000000000000000000000000000000000000000000000001");
/// assert_eq!(addr.to_short_string(), "0x1");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    /// The "zero" address (all zeros).
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// The core framework address (0x1).
    pub const ONE: Self = Self::from_u8(1);

    /// Creates an address from a byte array.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    const fn from_u8(value: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = value;
        Self(bytes)
    }

    /// Creates an address from a hex string (with or without `0x` prefix).
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidAddress`] if the string is empty, has
    /// more than 64 hex digits, or contains non-hex characters.
    pub fn from_hex<T: AsRef<[u8]>>(hex_str: T) -> TransferResult<Self> {
        let hex_str = hex_str.as_ref();

        if hex_str.is_empty() {
            return Err(TransferError::InvalidAddress(
                "address cannot be empty".to_string(),
            ));
        }

        let digits = if hex_str.starts_with(b"0x") || hex_str.starts_with(b"0X") {
            &hex_str[2..]
        } else {
            hex_str
        };

        let digits = std::str::from_utf8(digits)
            .map_err(|e| TransferError::InvalidAddress(e.to_string()))?;

        // e.g. a bare "0x"
        if digits.is_empty() {
            return Err(TransferError::InvalidAddress(
                "address must contain at least one hex digit".to_string(),
            ));
        }

        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(TransferError::InvalidAddress(format!(
                "address too long: {} characters (max {})",
                digits.len(),
                ADDRESS_LENGTH * 2
            )));
        }

        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(&padded)
            .map_err(|e| TransferError::InvalidAddress(format!("{digits}: {e}")))?;

        let mut address = [0u8; ADDRESS_LENGTH];
        address.copy_from_slice(&bytes);
        Ok(Self(address))
    }

    /// Creates an address from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidAddress`] unless `bytes` is exactly 32 bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> TransferResult<Self> {
        let bytes = bytes.as_ref();
        if bytes.len() != ADDRESS_LENGTH {
            return Err(TransferError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            )));
        }
        let mut address = [0u8; ADDRESS_LENGTH];
        address.copy_from_slice(bytes);
        Ok(Self(address))
    }

    /// Returns the address as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the address as a byte array.
    pub fn to_bytes(&self) -> [u8; ADDRESS_LENGTH] {
        self.0
    }

    /// Returns the address as a hex string with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns a short hex string, trimming leading zeros.
    ///
    /// For example, `0x0000...0001` becomes `0x1`. This is the form the
    /// ledger uses inside type names.
    pub fn to_short_string(&self) -> String {
        let hex = hex::encode(self.0);
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{trimmed}")
        }
    }
}

impl Default for AccountAddress {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_short_string())
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            use serde::ser::SerializeTuple;
            let mut tuple = serializer.serialize_tuple(ADDRESS_LENGTH)?;
            for byte in &self.0 {
                tuple.serialize_element(byte)?;
            }
            tuple.end()
        }
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; ADDRESS_LENGTH]>::deserialize(deserializer)?;
            Ok(Self(bytes))
        }
    }
}

impl From<[u8; ADDRESS_LENGTH]> for AccountAddress {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for AccountAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
