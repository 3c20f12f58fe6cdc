//! Sender identities.

use crate::crypto::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use crate::error::TransferResult;
use crate::types::AccountAddress;
use std::fmt;

/// An Ed25519 keypair together with the address it controls.
///
/// The address is derived from the public key, so an account created here
/// always signs for its own address.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::account::Ed25519Account;
///
/// let account = Ed25519Account::generate();
/// assert_eq!(account.address(), account.public_key().to_address());
/// ```
#[derive(Clone)]
pub struct Ed25519Account {
    private_key: Ed25519PrivateKey,
    public_key: Ed25519PublicKey,
    address: AccountAddress,
}

impl Ed25519Account {
    /// Generates a new random account.
    pub fn generate() -> Self {
        Self::from_private_key(Ed25519PrivateKey::generate())
    }

    /// Creates an account from a private key.
    pub fn from_private_key(private_key: Ed25519PrivateKey) -> Self {
        let public_key = private_key.public_key();
        let address = public_key.to_address();
        Self {
            private_key,
            public_key,
            address,
        }
    }

    /// Creates an account from a private key hex string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransferError::Signing`] if the key is malformed.
    pub fn from_private_key_hex(hex_str: &str) -> TransferResult<Self> {
        Ok(Self::from_private_key(Ed25519PrivateKey::from_hex(hex_str)?))
    }

    /// Returns the account address.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    /// Signs an arbitrary message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.private_key.sign(message)
    }
}

impl fmt::Debug for Ed25519Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
