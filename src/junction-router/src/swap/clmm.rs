//! Adapter for the concentrated-liquidity venue.
//!
//! Routes arrive as packed `token ‖ fee ‖ token …` bytes. Exact-input
//! routes read input-first; exact-output routes are encoded output-first
//! and their required inputs are resolved tail-first before any hop runs.

use alloy_primitives::{Address, U256};

use junction_types::refs::{AccountRef, AmountRef};

use crate::dispatcher::RouterConfig;
use crate::errors::{CommandError, SwapError};
use crate::state::State;
use crate::swap::path::TradePath;
use crate::swap::{fund_first_pool, ClmmVenue};

#[allow(clippy::too_many_arguments)]
pub fn exact_in<C: ClmmVenue>(
    venue: &C,
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    now: u64,
    recipient: &AccountRef,
    amount_in: &AmountRef,
    amount_out_min: U256,
    path: &[u8],
    payer_is_caller: bool,
) -> Result<(), CommandError> {
    let route = TradePath::parse(path)?;
    let tokens = &route.tokens;
    let fees = &route.fees;

    let token_in = tokens[0];
    let amount_in = amount_in.resolve_with(|| state.ledger.balance_of(token_in, cfg.router));

    let first_pool = venue
        .pool(tokens[0], tokens[1], fees[0])
        .map_err(SwapError::Venue)?;
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
    for hop in 0..route.hops() {
        let to = if hop + 1 < route.hops() {
            venue
                .pool(tokens[hop + 1], tokens[hop + 2], fees[hop + 1])
                .map_err(SwapError::Venue)?
        } else {
            recipient.resolve(caller, cfg.router)
        };
        amount = venue
            .swap(
                &mut state.ledger,
                tokens[hop],
                tokens[hop + 1],
                fees[hop],
                amount,
                to,
            )
            .map_err(SwapError::Venue)?;
    }

    if amount < amount_out_min {
        return Err(SwapError::InsufficientOutputAmount.into());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn exact_out<C: ClmmVenue>(
    venue: &C,
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    now: u64,
    recipient: &AccountRef,
    amount_out: U256,
    amount_in_max: U256,
    path: &[u8],
    payer_is_caller: bool,
) -> Result<(), CommandError> {
    // Output-first encoding: tokens[0] is the final output token and the
    // last token is the input.
    let route = TradePath::parse(path)?;
    let tokens = &route.tokens;
    let fees = &route.fees;
    let hops = route.hops();

    let mut required = vec![U256::ZERO; tokens.len()];
    required[0] = amount_out;
    for hop in 0..hops {
        required[hop + 1] = venue
            .quote_in(
                &state.ledger,
                tokens[hop + 1],
                tokens[hop],
                fees[hop],
                required[hop],
            )
            .map_err(SwapError::Venue)?;
    }
    if required[hops] > amount_in_max {
        return Err(SwapError::ExcessiveInputAmount.into());
    }

    let token_in = tokens[hops];
    let first_pool = venue
        .pool(tokens[hops], tokens[hops - 1], fees[hops - 1])
        .map_err(SwapError::Venue)?;
    fund_first_pool(
        state,
        cfg,
        caller,
        payer_is_caller,
        token_in,
        first_pool,
        required[hops],
        now,
    )?;

    // Execute from the input end of the route down to the output end.
    for hop in (0..hops).rev() {
        let to = if hop > 0 {
            venue
                .pool(tokens[hop - 1], tokens[hop], fees[hop - 1])
                .map_err(SwapError::Venue)?
        } else {
            recipient.resolve(caller, cfg.router)
        };
        venue
            .swap(
                &mut state.ledger,
                tokens[hop + 1],
                tokens[hop],
                fees[hop],
                required[hop + 1],
                to,
            )
            .map_err(SwapError::Venue)?;
    }
    Ok(())
}
