//! ECDSA recovery over secp256k1.
//!
//! Signatures are 65 bytes (`r ‖ s ‖ v`). We accept v in {0, 1, 27, 28};
//! anything else is rejected rather than guessed, since recovering under a
//! wrong parity yields a different, equally well-formed address.

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed or unrecoverable signature")]
pub struct RecoveryError;

/// Recover the signing account from a 32-byte digest and an `r ‖ s ‖ v`
/// signature.
pub fn ecrecover_address(digest: B256, signature: &[u8]) -> Result<Address, RecoveryError> {
    if signature.len() != 65 {
        return Err(RecoveryError);
    }

    let parity = match signature[64] {
        27 | 28 => signature[64] - 27,
        v @ (0 | 1) => v,
        _ => return Err(RecoveryError),
    };
    let recovery_id = RecoveryId::from_byte(parity).ok_or(RecoveryError)?;
    let signature = Signature::from_slice(&signature[..64]).map_err(|_| RecoveryError)?;

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
        .map_err(|_| RecoveryError)?;
    Ok(address_of_key(&key))
}

/// Account address of a secp256k1 public key (keccak of the uncompressed
/// point, low 20 bytes).
pub fn address_of_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
