//! Transaction signing.

use crate::account::Ed25519Account;
use crate::error::{TransferError, TransferResult};
use crate::transaction::types::{RawTransaction, SignedTransaction};

/// Signs a raw transaction with the given account.
///
/// The account's public key must derive the transaction's sender address;
/// anything else would produce a transaction the ledger rejects.
///
/// # Errors
///
/// Returns [`TransferError::Signing`] on a sender/key mismatch, or an encoding
/// error if the signing message cannot be built.
pub fn sign_transaction(
    raw_txn: RawTransaction,
    account: &Ed25519Account,
) -> TransferResult<SignedTransaction> {
    let derived = account.public_key().to_address();
    if derived != raw_txn.sender {
        return Err(TransferError::Signing(format!(
            "public key derives {derived}, but the transaction sender is {}",
            raw_txn.sender
        )));
    }

    let signing_message = raw_txn.signing_message()?;
    let signature = account.sign(&signing_message);
    Ok(SignedTransaction::new(
        raw_txn,
        *account.public_key(),
        signature,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs::decode_value;
    use crate::transaction::payload::EntryFunction;
    use crate::types::{AccountAddress, ChainId};
    use proptest::prelude::*;

    fn raw_transaction(
        sender: AccountAddress,
        sequence_number: u64,
        recipient: [u8; 32],
        amount: u64,
        expiration: u64,
    ) -> RawTransaction {
        let payload = EntryFunction::apt_transfer(AccountAddress::new(recipient), amount).unwrap();
        RawTransaction::new(
            sender,
            sequence_number,
            payload.into(),
            1000,
            1,
            expiration,
            ChainId::testnet(),
        )
    }

    #[test]
    fn test_sign_transaction() {
        let account = Ed25519Account::generate();
        let raw_txn = raw_transaction(account.address(), 0, [2u8; 32], 1000, 1_700_000_000);
        let signed = sign_transaction(raw_txn.clone(), &account).unwrap();

        assert_eq!(signed.raw_txn, raw_txn);
        assert_eq!(signed.public_key, *account.public_key());
        assert!(signed.verify().is_ok());
    }

    #[test]
    fn test_sender_key_mismatch() {
        let account = Ed25519Account::generate();
        let other = Ed25519Account::generate();
        let raw_txn = raw_transaction(other.address(), 0, [2u8; 32], 1000, 1_700_000_000);
        assert!(matches!(
            sign_transaction(raw_txn, &account),
            Err(TransferError::Signing(_))
        ));
    }

    #[test]
    fn test_any_flipped_byte_breaks_verification() {
        let account = Ed25519Account::generate();
        let raw_txn = raw_transaction(account.address(), 3, [9u8; 32], 1000, 1_700_000_000);
        let signed = sign_transaction(raw_txn, &account).unwrap();
        let raw_len = signed.raw_txn.to_bcs().unwrap().len();
        let bytes = signed.to_bcs().unwrap();

        // Raw transaction bytes and signature bytes; the public key is checked
        // separately because a flipped key may not be a valid point.
        let positions = (0..raw_len).chain(raw_len + 35..bytes.len());
        for position in positions {
            let mut tampered = bytes.clone();
            tampered[position] ^= 0x01;
            if let Ok(decoded) = decode_value::<SignedTransaction>(&tampered) {
                assert!(decoded.verify().is_err(), "flip at {position} still verified");
            }
        }
    }

    proptest! {
        #[test]
        fn prop_signing_is_deterministic(
            sequence_number in any::<u64>(),
            recipient in any::<[u8; 32]>(),
            amount in any::<u64>(),
            expiration in any::<u64>(),
        ) {
            let account = Ed25519Account::from_private_key_hex(
                "0x9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            ).unwrap();
            let raw_txn = raw_transaction(account.address(), sequence_number, recipient, amount, expiration);

            let first = sign_transaction(raw_txn.clone(), &account).unwrap();
            let second = sign_transaction(raw_txn, &account).unwrap();
            prop_assert_eq!(first.to_bcs().unwrap(), second.to_bcs().unwrap());
            prop_assert_eq!(first.hash().unwrap(), second.hash().unwrap());
        }

        #[test]
        fn prop_signed_transaction_round_trips(
            sequence_number in any::<u64>(),
            recipient in any::<[u8; 32]>(),
            amount in any::<u64>(),
        ) {
            let account = Ed25519Account::generate();
            let raw_txn = raw_transaction(account.address(), sequence_number, recipient, amount, 1_700_000_000);
            let signed = sign_transaction(raw_txn, &account).unwrap();
            let decoded = decode_value::<SignedTransaction>(&signed.to_bcs().unwrap()).unwrap();
            prop_assert!(decoded.verify().is_ok());
            prop_assert_eq!(decoded, signed);
        }

        #[test]
        fn prop_sequence_number_changes_bytes_and_signature(
            sequence_number in 0u64..u64::MAX,
            amount in any::<u64>(),
        ) {
            let account = Ed25519Account::generate();
            let a = raw_transaction(account.address(), sequence_number, [1u8; 32], amount, 1_700_000_000);
            let b = raw_transaction(account.address(), sequence_number + 1, [1u8; 32], amount, 1_700_000_000);
            prop_assert_ne!(a.to_bcs().unwrap(), b.to_bcs().unwrap());

            let a = sign_transaction(a, &account).unwrap();
            let b = sign_transaction(b, &account).unwrap();
            prop_assert_ne!(a.signature, b.signature);
            prop_assert_ne!(a.hash().unwrap(), b.hash().unwrap());
        }
    }
}
