//! Transaction types.

use crate::bcs::encode_value;
use crate::crypto::{domain_prefix, sha3_256_of, Ed25519PublicKey, Ed25519Signature};
use crate::error::TransferResult;
use crate::transaction::payload::TransactionPayload;
use crate::types::{AccountAddress, ChainId, HashValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Authenticator variant index for a single Ed25519 signature.
pub const ED25519_AUTHENTICATOR_VARIANT: u32 = 0;

/// Encoded length of an Ed25519 authenticator: variant, then a
/// length-prefixed public key, then a length-prefixed signature.
pub const ED25519_AUTHENTICATOR_LENGTH: usize = 1 + 1 + 32 + 1 + 64;

/// Prefix byte for user transactions inside the transaction hash preimage.
const USER_TRANSACTION_HASH_VARIANT: u8 = 0;

/// The raw transaction that a client signs.
///
/// Fields are encoded in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Sender's address.
    pub sender: AccountAddress,
    /// Sequence number of this transaction.
    pub sequence_number: u64,
    /// The transaction payload.
    pub payload: TransactionPayload,
    /// Maximum gas units the sender is willing to pay.
    pub max_gas_amount: u64,
    /// Price per gas unit in octas.
    pub gas_unit_price: u64,
    /// Expiration time in seconds since Unix epoch.
    pub expiration_timestamp_secs: u64,
    /// Chain ID to prevent cross-chain replay.
    pub chain_id: ChainId,
}

impl RawTransaction {
    /// Creates a new raw transaction.
    pub fn new(
        sender: AccountAddress,
        sequence_number: u64,
        payload: TransactionPayload,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self {
            sender,
            sequence_number,
            payload,
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        }
    }

    /// Generates the signing message for this transaction:
    /// `SHA3-256("APTOS::RawTransaction") || encode(self)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn signing_message(&self) -> TransferResult<Vec<u8>> {
        let prefix = domain_prefix("RawTransaction");
        let bytes = self.to_bcs()?;

        let mut message = Vec::with_capacity(prefix.len() + bytes.len());
        message.extend_from_slice(&prefix);
        message.extend_from_slice(&bytes);
        Ok(message)
    }

    /// Serializes this transaction to its canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a sequence exceeds the maximum length.
    pub fn to_bcs(&self) -> TransferResult<Vec<u8>> {
        encode_value(self)
    }
}

/// A signed transaction ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The raw transaction.
    pub raw_txn: RawTransaction,
    /// The signer's public key.
    pub public_key: Ed25519PublicKey,
    /// Signature over [`RawTransaction::signing_message`].
    pub signature: Ed25519Signature,
}

impl SignedTransaction {
    /// Creates a new signed transaction.
    pub fn new(
        raw_txn: RawTransaction,
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    ) -> Self {
        Self {
            raw_txn,
            public_key,
            signature,
        }
    }

    /// Serializes this signed transaction to its canonical bytes, the
    /// submission body.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn to_bcs(&self) -> TransferResult<Vec<u8>> {
        encode_value(self)
    }

    /// Returns the sender address.
    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    /// Returns the sequence number.
    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    /// Computes the transaction hash, the identifier the ledger assigns on
    /// submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn hash(&self) -> TransferResult<HashValue> {
        let bytes = self.to_bcs()?;
        let prefix = domain_prefix("Transaction");
        Ok(HashValue::new(sha3_256_of([
            prefix.as_slice(),
            [USER_TRANSACTION_HASH_VARIANT].as_slice(),
            bytes.as_slice(),
        ])))
    }

    /// Checks the signature against the embedded public key.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Signing`] if the signature does not verify.
    pub fn verify(&self) -> TransferResult<()> {
        let message = self.raw_txn.signing_message()?;
        self.public_key.verify(&message, &self.signature)
    }
}

impl Serialize for SignedTransaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SignedTransactionWire {
            raw_txn: &self.raw_txn,
            authenticator: TransactionAuthenticator::Ed25519 {
                public_key: &self.public_key,
                signature: &self.signature,
            },
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SignedTransaction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = SignedTransactionWire::<RawTransaction, _, _>::deserialize(deserializer)?;
        let TransactionAuthenticator::Ed25519 {
            public_key,
            signature,
        } = wire.authenticator;
        Ok(Self {
            raw_txn: wire.raw_txn,
            public_key,
            signature,
        })
    }
}

/// On-ledger layout of a signed transaction: the raw transaction followed
/// by the authenticator enum. Borrowed to encode, owned to decode.
#[derive(Serialize, Deserialize)]
#[serde(rename = "SignedTransaction")]
struct SignedTransactionWire<R, K, S> {
    raw_txn: R,
    authenticator: TransactionAuthenticator<K, S>,
}

/// Variant 0 is a single Ed25519 signature. Other authenticators do not
/// decode.
#[derive(Serialize, Deserialize)]
enum TransactionAuthenticator<K, S> {
    Ed25519 { public_key: K, signature: S },
}
