//! Delegated-transfer authorization ledger.
//!
//! A token owner authorizes a spender off-band by signing a permit over
//! (token, amount, expiration, nonce, spender, signing deadline). The
//! ledger verifies the signature against the owner's account, enforces a
//! strictly incrementing nonce per (owner, token, spender) key, and stores
//! the resulting allowance record. Delegated transfers later decrement the
//! record and move the funds.
//!
//! Records never auto-expire from storage; only the expiration check gates
//! their use. An allowance amount at the full permit width is unlimited and
//! is not decremented.

use std::collections::BTreeMap;

use alloy_primitives::{aliases::U160, Address, U256};

use junction_types::abi::{
    permit_batch_digest, permit_single_digest, AllowanceTransferDetails, PermitBatch,
    PermitDetails, PermitSingle,
};

use crate::errors::AllowanceError;
use crate::state::Ledger;
use crate::utils::crypto;

type Key = (Address, Address, Address); // (owner, token, spender)

/// One allowance record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Allowance {
    pub amount: U160,
    pub expiration: u64,
    pub nonce: u64,
}

/// Per-(owner, token, spender) allowance records.
#[derive(Clone, Debug, Default)]
pub struct AllowanceLedger {
    records: BTreeMap<Key, Allowance>,
}

impl AllowanceLedger {
    /// Current record for the key, zero if none was ever written.
    pub fn allowance(&self, owner: Address, token: Address, spender: Address) -> Allowance {
        self.records
            .get(&(owner, token, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Direct approval path: write a record without a signature, keeping the
    /// stored nonce. The host must only call this on behalf of `owner`.
    pub fn approve(
        &mut self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U160,
        expiration: u64,
    ) {
        let nonce = self.allowance(owner, token, spender).nonce;
        self.records.insert(
            (owner, token, spender),
            Allowance {
                amount,
                expiration,
                nonce,
            },
        );
    }

    /// Verify a signed single permit and store its allowance record.
    pub fn permit(
        &mut self,
        owner: Address,
        permit: &PermitSingle,
        signature: &[u8],
        chain_id: u64,
        verifying_contract: Address,
        now: u64,
    ) -> Result<(), AllowanceError> {
        if U256::from(now) > permit.sigDeadline {
            return Err(AllowanceError::SignatureExpired);
        }
        let digest = permit_single_digest(permit, chain_id, verifying_contract);
        let signer = crypto::ecrecover_address(digest, signature)
            .map_err(|_| AllowanceError::InvalidSignature)?;
        if signer != owner {
            return Err(AllowanceError::InvalidSignature);
        }

        let (key, record) = self.staged_update(owner, &permit.details, permit.spender, None, now)?;
        self.records.insert(key, record);
        Ok(())
    }

    /// Verify a signed batch permit and store every allowance record it
    /// carries. The batch verifies as one unit: any stale nonce rejects the
    /// whole batch and nothing is stored.
    pub fn permit_batch(
        &mut self,
        owner: Address,
        permit: &PermitBatch,
        signature: &[u8],
        chain_id: u64,
        verifying_contract: Address,
        now: u64,
    ) -> Result<(), AllowanceError> {
        if U256::from(now) > permit.sigDeadline {
            return Err(AllowanceError::SignatureExpired);
        }
        let digest = permit_batch_digest(permit, chain_id, verifying_contract);
        let signer = crypto::ecrecover_address(digest, signature)
            .map_err(|_| AllowanceError::InvalidSignature)?;
        if signer != owner {
            return Err(AllowanceError::InvalidSignature);
        }

        // Stage all updates before touching storage. A batch may carry
        // several lines for the same key; nonces then chain within the batch.
        let mut staged: Vec<(Key, Allowance)> = Vec::new();
        let mut next_nonce: BTreeMap<Key, u64> = BTreeMap::new();
        for details in &permit.details {
            let key = (owner, details.token, permit.spender);
            let expected = next_nonce.get(&key).copied();
            let (key, record) =
                self.staged_update(owner, details, permit.spender, expected, now)?;
            next_nonce.insert(key, record.nonce);
            staged.push((key, record));
        }
        for (key, record) in staged {
            self.records.insert(key, record);
        }
        Ok(())
    }

    /// Move `amount` of `token` from `owner` to `to`, consuming the
    /// allowance `spender` holds over the owner's funds.
    pub fn transfer_from(
        &mut self,
        ledger: &mut Ledger,
        owner: Address,
        token: Address,
        spender: Address,
        to: Address,
        amount: U160,
        now: u64,
    ) -> Result<(), AllowanceError> {
        let key = (owner, token, spender);
        let record = self
            .records
            .get(&key)
            .copied()
            .ok_or(AllowanceError::InsufficientAllowance)?;

        if now > record.expiration {
            return Err(AllowanceError::AllowanceExpired);
        }
        if record.amount != U160::MAX && record.amount < amount {
            return Err(AllowanceError::InsufficientAllowance);
        }

        ledger.transfer(token, owner, to, U256::from(amount))?;

        if record.amount != U160::MAX {
            self.records
                .entry(key)
                .and_modify(|r| r.amount -= amount);
        }
        Ok(())
    }

    /// Apply an ordered list of delegated transfers.
    ///
    /// Each entry is checked and applied in order; the caller's snapshot
    /// boundary (call or sub-plan) is what makes a failing batch atomic.
    pub fn transfer_from_batch(
        &mut self,
        ledger: &mut Ledger,
        batch: &[AllowanceTransferDetails],
        spender: Address,
        now: u64,
    ) -> Result<(), AllowanceError> {
        for entry in batch {
            self.transfer_from(
                ledger,
                entry.from,
                entry.token,
                spender,
                entry.to,
                entry.amount,
                now,
            )?;
        }
        Ok(())
    }

    /// Validate one permit line against the expected nonce and produce the
    /// record to store. `nonce_override` carries intra-batch nonce chaining.
    fn staged_update(
        &self,
        owner: Address,
        details: &PermitDetails,
        spender: Address,
        nonce_override: Option<u64>,
        now: u64,
    ) -> Result<(Key, Allowance), AllowanceError> {
        let key = (owner, details.token, spender);
        let expected =
            nonce_override.unwrap_or_else(|| self.allowance(owner, details.token, spender).nonce);
        if details.nonce.to::<u64>() != expected {
            return Err(AllowanceError::InvalidNonce);
        }

        // Expiration zero means "usable only at the consuming timestamp".
        let expiration = match details.expiration.to::<u64>() {
            0 => now,
            expiration => expiration,
        };

        Ok((
            key,
            Allowance {
                amount: details.amount,
                expiration,
                nonce: expected + 1,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, aliases::U48};
    use junction_planner::{sign_permit_batch, sign_permit_single, signer_address};
    use k256::ecdsa::SigningKey;

    const TOKEN: Address = address!("00000000000000000000000000000000000000aa");
    const ROUTER: Address = address!("00000000000000000000000000000000000000f1");
    const CHAIN_ID: u64 = 1;
    const NOW: u64 = 1_700_000_000;

    fn owner_key() -> SigningKey {
        let bytes =
            hex::decode("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d")
                .unwrap();
        SigningKey::from_slice(&bytes).unwrap()
    }

    fn permit_for(amount: u64, expiration: u64, nonce: u64) -> PermitSingle {
        PermitSingle {
            details: PermitDetails {
                token: TOKEN,
                amount: U160::from(amount),
                expiration: U48::from(expiration),
                nonce: U48::from(nonce),
            },
            spender: ROUTER,
            sigDeadline: U256::from(NOW + 100),
        }
    }

    fn signed(permit: &PermitSingle) -> Vec<u8> {
        sign_permit_single(permit, &owner_key(), CHAIN_ID, ROUTER)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn permit_stores_record_and_bumps_nonce() {
        let owner = signer_address(&owner_key());
        let mut allowances = AllowanceLedger::default();

        let permit = permit_for(100, NOW + 50, 0);
        allowances
            .permit(owner, &permit, &signed(&permit), CHAIN_ID, ROUTER, NOW)
            .unwrap();

        let record = allowances.allowance(owner, TOKEN, ROUTER);
        assert_eq!(record.amount, U160::from(100u64));
        assert_eq!(record.expiration, NOW + 50);
        assert_eq!(record.nonce, 1);
    }

    #[test]
    fn expiration_zero_pins_to_the_current_moment() {
        let owner = signer_address(&owner_key());
        let mut allowances = AllowanceLedger::default();

        let permit = permit_for(100, 0, 0);
        allowances
            .permit(owner, &permit, &signed(&permit), CHAIN_ID, ROUTER, NOW)
            .unwrap();
        assert_eq!(allowances.allowance(owner, TOKEN, ROUTER).expiration, NOW);
    }

    #[test]
    fn nonce_replay_and_out_of_order_nonces_are_rejected() {
        let owner = signer_address(&owner_key());
        let mut allowances = AllowanceLedger::default();

        let first = permit_for(100, NOW + 50, 0);
        let second = permit_for(100, NOW + 50, 1);

        allowances
            .permit(owner, &first, &signed(&first), CHAIN_ID, ROUTER, NOW)
            .unwrap();
        assert_eq!(
            allowances
                .permit(owner, &first, &signed(&first), CHAIN_ID, ROUTER, NOW)
                .unwrap_err(),
            AllowanceError::InvalidNonce
        );

        allowances
            .permit(owner, &second, &signed(&second), CHAIN_ID, ROUTER, NOW)
            .unwrap();
        // Replaying nonce 0 after nonce 1 was consumed must also fail.
        assert_eq!(
            allowances
                .permit(owner, &first, &signed(&first), CHAIN_ID, ROUTER, NOW)
                .unwrap_err(),
            AllowanceError::InvalidNonce
        );

        // A future nonce is just as stale.
        let future = permit_for(100, NOW + 50, 7);
        assert_eq!(
            allowances
                .permit(owner, &future, &signed(&future), CHAIN_ID, ROUTER, NOW)
                .unwrap_err(),
            AllowanceError::InvalidNonce
        );
    }

    #[test]
    fn stale_signing_deadline_is_rejected() {
        let owner = signer_address(&owner_key());
        let mut allowances = AllowanceLedger::default();

        let mut permit = permit_for(100, NOW + 50, 0);
        permit.sigDeadline = U256::from(NOW - 1);
        assert_eq!(
            allowances
                .permit(owner, &permit, &signed(&permit), CHAIN_ID, ROUTER, NOW)
                .unwrap_err(),
            AllowanceError::SignatureExpired
        );
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let owner = signer_address(&owner_key());
        let intruder =
            SigningKey::from_slice(&hex::decode(
                "8b3a350cf5c34c9194ca85829a2df0ec3153be0318b5e2d3348e872092edffba",
            )
            .unwrap())
            .unwrap();
        let mut allowances = AllowanceLedger::default();

        let permit = permit_for(100, NOW + 50, 0);
        let signature = sign_permit_single(&permit, &intruder, CHAIN_ID, ROUTER).unwrap();
        assert_eq!(
            allowances
                .permit(owner, &permit, &signature, CHAIN_ID, ROUTER, NOW)
                .unwrap_err(),
            AllowanceError::InvalidSignature
        );
    }

    #[test]
    fn transfer_decrements_exactly_and_rejects_overdraw() {
        let owner = signer_address(&owner_key());
        let recipient = address!("00000000000000000000000000000000000000d4");
        let mut allowances = AllowanceLedger::default();
        let mut ledger = Ledger::default();
        ledger.credit(TOKEN, owner, U256::from(1_000u64)).unwrap();

        allowances.approve(owner, TOKEN, ROUTER, U160::from(100u64), NOW + 50);

        allowances
            .transfer_from(
                &mut ledger,
                owner,
                TOKEN,
                ROUTER,
                recipient,
                U160::from(40u64),
                NOW,
            )
            .unwrap();
        assert_eq!(
            allowances.allowance(owner, TOKEN, ROUTER).amount,
            U160::from(60u64)
        );
        assert_eq!(ledger.balance_of(TOKEN, recipient), U256::from(40u64));

        assert_eq!(
            allowances
                .transfer_from(
                    &mut ledger,
                    owner,
                    TOKEN,
                    ROUTER,
                    recipient,
                    U160::from(61u64),
                    NOW,
                )
                .unwrap_err(),
            AllowanceError::InsufficientAllowance
        );
        // The failed attempt must leave the record untouched.
        assert_eq!(
            allowances.allowance(owner, TOKEN, ROUTER).amount,
            U160::from(60u64)
        );
    }

    #[test]
    fn expired_allowance_rejects_transfers() {
        let owner = signer_address(&owner_key());
        let mut allowances = AllowanceLedger::default();
        let mut ledger = Ledger::default();
        ledger.credit(TOKEN, owner, U256::from(10u64)).unwrap();

        allowances.approve(owner, TOKEN, ROUTER, U160::from(10u64), NOW - 1);
        assert_eq!(
            allowances
                .transfer_from(
                    &mut ledger,
                    owner,
                    TOKEN,
                    ROUTER,
                    owner,
                    U160::from(1u64),
                    NOW,
                )
                .unwrap_err(),
            AllowanceError::AllowanceExpired
        );
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let owner = signer_address(&owner_key());
        let mut allowances = AllowanceLedger::default();
        let mut ledger = Ledger::default();
        ledger.credit(TOKEN, owner, U256::from(10u64)).unwrap();

        allowances.approve(owner, TOKEN, ROUTER, U160::MAX, NOW + 50);
        allowances
            .transfer_from(
                &mut ledger,
                owner,
                TOKEN,
                ROUTER,
                owner,
                U160::from(10u64),
                NOW,
            )
            .unwrap();
        assert_eq!(allowances.allowance(owner, TOKEN, ROUTER).amount, U160::MAX);
    }

    #[test]
    fn batch_permit_verifies_as_one_unit() {
        let owner = signer_address(&owner_key());
        let other_token = address!("00000000000000000000000000000000000000ab");
        let mut allowances = AllowanceLedger::default();

        let good = PermitDetails {
            token: TOKEN,
            amount: U160::from(5u64),
            expiration: U48::from(NOW + 50),
            nonce: U48::from(0u64),
        };
        let stale = PermitDetails {
            token: other_token,
            amount: U160::from(5u64),
            expiration: U48::from(NOW + 50),
            nonce: U48::from(3u64),
        };
        let batch = PermitBatch {
            details: vec![good.clone(), stale],
            spender: ROUTER,
            sigDeadline: U256::from(NOW + 100),
        };
        let signature = sign_permit_batch(&batch, &owner_key(), CHAIN_ID, ROUTER).unwrap();

        assert_eq!(
            allowances
                .permit_batch(owner, &batch, &signature, CHAIN_ID, ROUTER, NOW)
                .unwrap_err(),
            AllowanceError::InvalidNonce
        );
        // Nothing from the failed batch may be stored.
        assert_eq!(
            allowances.allowance(owner, TOKEN, ROUTER),
            Allowance::default()
        );

        let batch = PermitBatch {
            details: vec![good],
            spender: ROUTER,
            sigDeadline: U256::from(NOW + 100),
        };
        let signature = sign_permit_batch(&batch, &owner_key(), CHAIN_ID, ROUTER).unwrap();
        allowances
            .permit_batch(owner, &batch, &signature, CHAIN_ID, ROUTER, NOW)
            .unwrap();
        assert_eq!(
            allowances.allowance(owner, TOKEN, ROUTER).amount,
            U160::from(5u64)
        );
    }
}
