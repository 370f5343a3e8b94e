//! Adapter for the constant-product venue.
//!
//! Routes are ordered token lists; each consecutive pair is one hop through
//! the pool keyed by the unordered pair. Hop outputs are forwarded straight
//! to the next pool so intermediate amounts never touch the router.

use alloy_primitives::{Address, U256};

use junction_types::refs::{AccountRef, AmountRef};

use crate::dispatcher::RouterConfig;
use crate::errors::{CommandError, SwapError};
use crate::state::State;
use crate::swap::{fund_first_pool, AmmVenue};

#[allow(clippy::too_many_arguments)]
pub fn exact_in<A: AmmVenue>(
    venue: &A,
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    now: u64,
    recipient: &AccountRef,
    amount_in: &AmountRef,
    amount_out_min: U256,
    path: &[Address],
    payer_is_caller: bool,
) -> Result<(), CommandError> {
    if path.len() < 2 {
        return Err(SwapError::InvalidPath.into());
    }

    let token_in = path[0];
    let amount_in = amount_in.resolve_with(|| state.ledger.balance_of(token_in, cfg.router));

    let first_pool = venue.pair(path[0], path[1]).map_err(SwapError::Venue)?;
    fund_first_pool(
        state,
        cfg,
        caller,
        payer_is_caller,
        token_in,
        first_pool,
        amount_in,
        now,
    )?;

    let mut amount = amount_in;
    for hop in 0..path.len() - 1 {
        let to = if hop + 2 < path.len() {
            venue
                .pair(path[hop + 1], path[hop + 2])
                .map_err(SwapError::Venue)?
        } else {
            recipient.resolve(caller, cfg.router)
        };
        amount = venue
            .swap(&mut state.ledger, path[hop], path[hop + 1], amount, to)
            .map_err(SwapError::Venue)?;
    }

    if amount < amount_out_min {
        return Err(SwapError::InsufficientOutputAmount.into());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn exact_out<A: AmmVenue>(
    venue: &A,
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    now: u64,
    recipient: &AccountRef,
    amount_out: U256,
    amount_in_max: U256,
    path: &[Address],
    payer_is_caller: bool,
) -> Result<(), CommandError> {
    if path.len() < 2 {
        return Err(SwapError::InvalidPath.into());
    }
    let hops = path.len() - 1;

    // Resolve required inputs tail-first: the last hop's input is priced
    // from the requested output, and so on back to the route's entry.
    let mut required = vec![U256::ZERO; path.len()];
    required[hops] = amount_out;
    for hop in (0..hops).rev() {
        required[hop] = venue
            .quote_in(&state.ledger, path[hop], path[hop + 1], required[hop + 1])
            .map_err(SwapError::Venue)?;
    }
    if required[0] > amount_in_max {
        return Err(SwapError::ExcessiveInputAmount.into());
    }

    let first_pool = venue.pair(path[0], path[1]).map_err(SwapError::Venue)?;
    fund_first_pool(
        state,
        cfg,
        caller,
        payer_is_caller,
        path[0],
        first_pool,
        required[0],
        now,
    )?;

    for hop in 0..hops {
        let to = if hop + 1 < hops {
            venue
                .pair(path[hop + 1], path[hop + 2])
                .map_err(SwapError::Venue)?
        } else {
            recipient.resolve(caller, cfg.router)
        };
        venue
            .swap(
                &mut state.ledger,
                path[hop],
                path[hop + 1],
                required[hop],
                to,
            )
            .map_err(SwapError::Venue)?;
    }
    Ok(())
}
