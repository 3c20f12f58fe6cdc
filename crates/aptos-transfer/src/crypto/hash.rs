//! SHA3-256 helpers.

use sha3::{Digest, Sha3_256};

/// Computes the SHA3-256 hash of the input.
///
/// # Example
///
/// ```rust
/// use aptos_transfer::crypto::sha3_256;
///
/// let hash = sha3_256(b"hello world");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    sha3_256_of([data])
}

/// Computes the SHA3-256 hash of the concatenation of several byte slices.
pub fn sha3_256_of<I, T>(items: I) -> [u8; 32]
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha3_256::new();
    for item in items {
        hasher.update(item.as_ref());
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Returns the domain separator for a signed or hashed structure:
/// `SHA3-256("APTOS::" || name)`.
///
/// `domain_prefix("RawTransaction")` prefixes signing messages and
/// `domain_prefix("Transaction")` prefixes transaction hashes.
pub fn domain_prefix(name: &str) -> [u8; 32] {
    sha3_256_of([b"APTOS::".as_slice(), name.as_bytes()])
}
