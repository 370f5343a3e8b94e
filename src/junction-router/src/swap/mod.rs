//! Uniform swap adapter over two exchange designs.
//!
//! Both venues are external collaborators: the adapter resolves multihop
//! routes, moves the input to the first pool, and forwards each hop's
//! output to the next pool (or the final recipient). Pricing is entirely
//! the venue's business — the adapter only asks "given this input, what
//! comes out" (or the reverse) and enforces the caller's limit amount.
//!
//! Pools are ordinary ledger accounts: a venue executes a hop by paying the
//! quoted output out of the pool's own holdings, with the input having been
//! transferred to the pool beforehand. That keeps every token movement
//! inside the snapshottable state.

pub mod amm;
pub mod clmm;
pub mod path;

use alloy_primitives::{Address, U256};

use crate::dispatcher::RouterConfig;
use crate::errors::{CommandError, VenueError};
use crate::state::{Ledger, State};
use crate::utils::cast;

/// Constant-product venue: pools are keyed by the unordered token pair.
pub trait AmmVenue {
    /// Account holding the pool's reserves.
    fn pair(&self, a: Address, b: Address) -> Result<Address, VenueError>;

    /// Output produced for a given input.
    fn quote_out(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VenueError>;

    /// Input required for a given output.
    fn quote_in(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256, VenueError>;

    /// Execute one hop: the input has already been paid to the pool; the
    /// venue pays the realized output from the pool to `to` and returns it.
    fn swap(
        &self,
        ledger: &mut Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        to: Address,
    ) -> Result<U256, VenueError>;
}

/// Concentrated-liquidity venue: pools are keyed by the unordered token
/// pair plus a fee tier.
pub trait ClmmVenue {
    fn pool(&self, a: Address, b: Address, fee: u32) -> Result<Address, VenueError>;

    fn quote_out(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, VenueError>;

    fn quote_in(
        &self,
        ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_out: U256,
    ) -> Result<U256, VenueError>;

    fn swap(
        &self,
        ledger: &mut Ledger,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        to: Address,
    ) -> Result<U256, VenueError>;
}

/// Move the swap input to the first pool.
///
/// Caller-funded swaps pull through the allowance ledger (the router is the
/// spender), which caps them at the permit amount width; router-funded
/// swaps spend the router's own holdings, composing with earlier commands
/// in the same call without re-authorization.
pub(crate) fn fund_first_pool(
    state: &mut State,
    cfg: &RouterConfig,
    caller: Address,
    payer_is_caller: bool,
    token: Address,
    pool: Address,
    amount: U256,
    now: u64,
) -> Result<(), CommandError> {
    if payer_is_caller {
        let amount = cast::to_uint160(amount)?;
        state
            .allowances
            .transfer_from(&mut state.ledger, caller, token, cfg.router, pool, amount, now)?;
    } else {
        state.ledger.transfer(token, cfg.router, pool, amount)?;
    }
    Ok(())
}
