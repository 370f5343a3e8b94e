//! In-memory token ledger and the snapshottable execution state.
//!
//! All balances live in one flat map keyed by (token, holder), with the
//! native asset stored under the zero token address. The dispatcher clones
//! the whole [`State`] at call entry and at each sub-plan boundary and
//! restores the clone on failure; that snapshot is the only rollback
//! mechanism in the system, so everything a command can mutate must live
//! here.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::allowance::AllowanceLedger;
use crate::errors::LedgerError;

/// Token identifier of the native asset.
pub const NATIVE: Address = Address::ZERO;

/// Flat balance ledger plus conventional (non-delegated) allowances.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    balances: BTreeMap<(Address, Address), U256>,
    approvals: BTreeMap<(Address, Address, Address), U256>,
}

impl Ledger {
    /// Balance of `token` held by `account`. `NATIVE` reads the native row.
    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Create balance out of nothing. Used by hosts seeding fixtures and by
    /// the wrap operation when minting the wrapped representation.
    pub fn credit(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let slot = self.balances.entry((token, account)).or_default();
        *slot = slot
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { token, account })?;
        Ok(())
    }

    /// Destroy balance. Used by the unwrap operation when burning the
    /// wrapped representation.
    pub fn debit(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let held = self.balance_of(token, account);
        if held < amount {
            return Err(LedgerError::InsufficientBalance { token, account });
        }
        self.balances.insert((token, account), held - amount);
        Ok(())
    }

    /// Move `amount` of `token` between accounts.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }

    /// Remaining conventional allowance of (owner, token) towards `spender`.
    pub fn approval(&self, owner: Address, token: Address, spender: Address) -> U256 {
        self.approvals
            .get(&(owner, token, spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Set a conventional allowance. Overwrites any previous value.
    pub fn approve(&mut self, owner: Address, token: Address, spender: Address, amount: U256) {
        self.approvals.insert((owner, token, spender), amount);
    }

    /// Spend a conventional allowance and move the funds. An allowance of
    /// `U256::MAX` is unlimited and is not decremented.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        owner: Address,
        to: Address,
        token: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let allowed = self.approval(owner, token, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientApproval);
        }
        if allowed != U256::MAX {
            self.approvals
                .insert((owner, token, spender), allowed - amount);
        }
        self.transfer(token, owner, to, amount)
    }
}

/// Everything a command can mutate: the token ledger and the delegated
/// allowance ledger. Cloned wholesale for snapshots.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub ledger: Ledger,
    pub allowances: AllowanceLedger,
}
