//! Symbolic account and amount references.
//!
//! Three sentinel values are reserved on the wire: two pseudo-accounts
//! (the invoking account and the router itself) and one amount placeholder
//! (the router's full holding of the relevant token, read at use-time).
//! They are decoded into explicit enum variants so a sentinel can never be
//! confused with a genuine account or amount, and resolved exactly once at
//! the point the value is consumed.

use alloy_primitives::{Address, U256};

/// Pseudo-account resolved to the invoking account.
pub const CALLER_ACCOUNT: Address = Address::with_last_byte(0x01);

/// Pseudo-account resolved to the router's own address.
pub const ROUTER_ACCOUNT: Address = Address::with_last_byte(0x02);

/// Amount placeholder resolved to the router's full balance of the relevant
/// token at execution time (the high bit of a 256-bit word).
pub const FULL_BALANCE: U256 = U256::from_limbs([0, 0, 0, 1 << 63]);

/// An account operand that may be one of the reserved pseudo-accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountRef {
    Caller,
    Router,
    Account(Address),
}

impl AccountRef {
    /// Map a wire-encoded address onto its reference form.
    pub fn from_encoded(address: Address) -> Self {
        if address == CALLER_ACCOUNT {
            AccountRef::Caller
        } else if address == ROUTER_ACCOUNT {
            AccountRef::Router
        } else {
            AccountRef::Account(address)
        }
    }

    /// Resolve to a concrete account.
    pub fn resolve(&self, caller: Address, router: Address) -> Address {
        match self {
            AccountRef::Caller => caller,
            AccountRef::Router => router,
            AccountRef::Account(address) => *address,
        }
    }
}

/// An amount operand that may be the full-balance placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountRef {
    Exact(U256),
    FullBalance,
}

impl AmountRef {
    /// Map a wire-encoded amount onto its reference form.
    pub fn from_encoded(amount: U256) -> Self {
        if amount == FULL_BALANCE {
            AmountRef::FullBalance
        } else {
            AmountRef::Exact(amount)
        }
    }

    /// Resolve to a concrete amount, reading the full balance lazily so the
    /// lookup happens at the instant the owning command executes.
    pub fn resolve_with(&self, full_balance: impl FnOnce() -> U256) -> U256 {
        match self {
            AmountRef::Exact(amount) => *amount,
            AmountRef::FullBalance => full_balance(),
        }
    }
}
