//! Payment and asset utilities: native wrap/unwrap, proportional fees,
//! balance sweeps, standalone balance assertions, and direct transfers of
//! funds held by the router.

use alloy_primitives::{Address, U256};

use junction_types::refs::{AccountRef, AmountRef};

use crate::dispatcher::RouterConfig;
use crate::errors::{CommandError, PaymentError};
use crate::state::{State, NATIVE};

/// Basis-point denominator: 10_000 bips = 100 %.
pub const FEE_BIPS_BASE: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Convert native value held by the router into its wrapped representation.
/// The wrapper account keeps the native backing; the wrapped token is
/// minted to the recipient.
pub fn wrap_native(
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    recipient: &AccountRef,
    amount: &AmountRef,
) -> Result<(), CommandError> {
    let amount = amount.resolve_with(|| state.ledger.balance_of(NATIVE, cfg.router));
    let recipient = recipient.resolve(caller, cfg.router);

    state
        .ledger
        .transfer(NATIVE, cfg.router, cfg.wrapped_native, amount)
        .map_err(PaymentError::from)?;
    state
        .ledger
        .credit(cfg.wrapped_native, recipient, amount)
        .map_err(PaymentError::from)?;
    Ok(())
}

/// Burn the router's whole wrapped holding and release the native backing
/// to the recipient, subject to a minimum-amount floor.
pub fn unwrap_native(
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    recipient: &AccountRef,
    amount_min: U256,
) -> Result<(), CommandError> {
    let amount = state.ledger.balance_of(cfg.wrapped_native, cfg.router);
    if amount < amount_min {
        return Err(PaymentError::InsufficientToken.into());
    }
    let recipient = recipient.resolve(caller, cfg.router);

    state
        .ledger
        .debit(cfg.wrapped_native, cfg.router, amount)
        .map_err(PaymentError::from)?;
    state
        .ledger
        .transfer(NATIVE, cfg.wrapped_native, recipient, amount)
        .map_err(PaymentError::from)?;
    Ok(())
}

/// Send a basis-point fraction of the router's current holding to the
/// recipient.
pub fn pay_portion(
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    token: Address,
    recipient: &AccountRef,
    bips: U256,
) -> Result<(), CommandError> {
    if bips == U256::ZERO || bips > FEE_BIPS_BASE {
        return Err(PaymentError::InvalidBips.into());
    }
    let balance = state.ledger.balance_of(token, cfg.router);
    let amount = balance * bips / FEE_BIPS_BASE;
    let recipient = recipient.resolve(caller, cfg.router);

    state
        .ledger
        .transfer(token, cfg.router, recipient, amount)
        .map_err(PaymentError::from)?;
    Ok(())
}

/// Send the router's entire remaining holding of `token` to the recipient.
/// The floor is an aggregate slippage guard across the preceding commands.
pub fn sweep(
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    token: Address,
    recipient: &AccountRef,
    amount_min: U256,
) -> Result<(), CommandError> {
    let balance = state.ledger.balance_of(token, cfg.router);
    if balance < amount_min {
        return Err(PaymentError::InsufficientToken.into());
    }
    if balance > U256::ZERO {
        let recipient = recipient.resolve(caller, cfg.router);
        state
            .ledger
            .transfer(token, cfg.router, recipient, balance)
            .map_err(PaymentError::from)?;
    }
    Ok(())
}

/// Assert that an account's balance meets a threshold. A standalone guard,
/// tied to no transfer.
pub fn balance_check(
    state: &State,
    cfg: &RouterConfig,
    caller: Address,
    owner: &AccountRef,
    token: Address,
    min_balance: U256,
) -> Result<(), CommandError> {
    let owner = owner.resolve(caller, cfg.router);
    if state.ledger.balance_of(token, owner) < min_balance {
        return Err(PaymentError::BalanceTooLow.into());
    }
    Ok(())
}

/// Unconditionally move funds held by the router.
pub fn transfer(
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    token: Address,
    recipient: &AccountRef,
    value: &AmountRef,
) -> Result<(), CommandError> {
    let value = value.resolve_with(|| state.ledger.balance_of(token, cfg.router));
    let recipient = recipient.resolve(caller, cfg.router);

    state
        .ledger
        .transfer(token, cfg.router, recipient, value)
        .map_err(PaymentError::from)?;
    Ok(())
}
