//! Permit message structures and their EIP-712 digests.
//!
//! The digest computed here must match on both sides of the wire: the
//! planner signs it, the router's allowance ledger recovers the signer from
//! it. Both go through the same `sol!` definitions so the typed encoding
//! can never drift.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};

sol! {
    /// One (token, amount, expiration, nonce) authorization line.
    ///
    /// Amounts are deliberately narrower than the native 256-bit token
    /// amount width; wider values must be rejected before they reach this
    /// struct. An expiration of zero means "valid only at the timestamp the
    /// permit is consumed".
    #[derive(Debug, Default, PartialEq, Eq)]
    struct PermitDetails {
        address token;
        uint160 amount;
        uint48 expiration;
        uint48 nonce;
    }

    /// A single-token permit, bound to one spender and a signing deadline.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct PermitSingle {
        PermitDetails details;
        address spender;
        uint256 sigDeadline;
    }

    /// An ordered batch of authorization lines under one signature.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct PermitBatch {
        PermitDetails[] details;
        address spender;
        uint256 sigDeadline;
    }

    /// One delegated-transfer instruction for the batch transfer command.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct AllowanceTransferDetails {
        address from;
        address to;
        uint160 amount;
        address token;
    }
}

/// EIP-712 domain for the allowance ledger.
pub fn allowance_domain(chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain {
        name: Some("Junction Allowance".into()),
        version: Some("1".into()),
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(verifying_contract),
        salt: None,
    }
}

/// Digest a single permit for signing or recovery.
pub fn permit_single_digest(
    permit: &PermitSingle,
    chain_id: u64,
    verifying_contract: Address,
) -> B256 {
    permit.eip712_signing_hash(&allowance_domain(chain_id, verifying_contract))
}

/// Digest a batch permit for signing or recovery.
pub fn permit_batch_digest(
    permit: &PermitBatch,
    chain_id: u64,
    verifying_contract: Address,
) -> B256 {
    permit.eip712_signing_hash(&allowance_domain(chain_id, verifying_contract))
}
