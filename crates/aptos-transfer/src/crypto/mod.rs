//! Cryptographic primitives.
//!
//! SHA3-256 hashing and Ed25519 signatures, the only scheme this crate signs
//! with.
//!
//! # Example
//!
//! ```rust
//! use aptos_transfer::crypto::Ed25519PrivateKey;
//!
//! let private_key = Ed25519PrivateKey::generate();
//! let signature = private_key.sign(b"hello world");
//! assert!(private_key.public_key().verify(b"hello world", &signature).is_ok());
//! ```

mod ed25519;
mod hash;

pub use ed25519::{
    Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, ED25519_PRIVATE_KEY_LENGTH,
    ED25519_PUBLIC_KEY_LENGTH, ED25519_SIGNATURE_LENGTH,
};
pub use hash::{domain_prefix, sha3_256, sha3_256_of};

use crate::types::AccountAddress;

/// The authentication key scheme byte for Ed25519 single-key accounts.
pub const ED25519_SCHEME: u8 = 0;

/// Derives the account address of an Ed25519 public key.
///
/// The address is `SHA3-256(public_key || 0x00)`, which is also the
/// account's initial authentication key.
pub fn derive_address(public_key: &[u8]) -> AccountAddress {
    AccountAddress::new(sha3_256_of([public_key, [ED25519_SCHEME].as_slice()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_address_appends_scheme_byte() {
        let public_key = [7u8; ED25519_PUBLIC_KEY_LENGTH];
        let mut preimage = public_key.to_vec();
        preimage.push(0);
        assert_eq!(
            derive_address(&public_key).to_bytes(),
            sha3_256(&preimage)
        );
    }
}
