//! Permit signing.
//!
//! Signatures are 65-byte `r ‖ s ‖ v` over the EIP-712 digest, with v in
//! the {27, 28} convention the router's recovery accepts.

use alloy_primitives::{keccak256, Address, B256, Bytes};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use junction_types::abi::{
    permit_batch_digest, permit_single_digest, PermitBatch, PermitSingle,
};

/// Sign a 32-byte digest, returning `r ‖ s ‖ v`.
pub fn sign_digest(digest: B256, key: &SigningKey) -> Result<Bytes, k256::ecdsa::Error> {
    let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice())?;

    let mut raw = Vec::with_capacity(65);
    raw.extend_from_slice(&signature.to_bytes());
    raw.push(27 + recovery_id.to_byte());
    Ok(Bytes::from(raw))
}

/// Sign a single permit for the given allowance-ledger domain.
pub fn sign_permit_single(
    permit: &PermitSingle,
    key: &SigningKey,
    chain_id: u64,
    verifying_contract: Address,
) -> Result<Bytes, k256::ecdsa::Error> {
    sign_digest(permit_single_digest(permit, chain_id, verifying_contract), key)
}

/// Sign a batch permit for the given allowance-ledger domain.
pub fn sign_permit_batch(
    permit: &PermitBatch,
    key: &SigningKey,
    chain_id: u64,
    verifying_contract: Address,
) -> Result<Bytes, k256::ecdsa::Error> {
    sign_digest(permit_batch_digest(permit, chain_id, verifying_contract), key)
}

/// Account address of a signing key (keccak of the uncompressed public
/// point, low 20 bytes).
pub fn signer_address(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
