//! Test doubles: fixed-rate venues, pass-through targets, and a router
//! fixture with funded accounts.
//!
//! Venue pricing here is a flat ratio per pool — the router only cares
//! that quoting and execution agree, not what the curve looks like.

use std::collections::BTreeMap;
use std::rc::Rc;

use alloy_primitives::{address, aliases::U160, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use k256::ecdsa::SigningKey;

use junction_planner::signer_address;

use crate::dispatcher::{Call, Router, RouterConfig};
use crate::errors::{ExternalCallError, VenueError};
use crate::externals::ExternalProtocol;
use crate::state::Ledger;
use crate::swap::{AmmVenue, ClmmVenue};

pub const ROUTER_ADDR: Address = address!("00000000000000000000000000000000000000f1");
pub const WNATIVE: Address = address!("00000000000000000000000000000000000000e0");
pub const TOKEN_A: Address = address!("00000000000000000000000000000000000000a1");
pub const TOKEN_B: Address = address!("00000000000000000000000000000000000000a2");
pub const TOKEN_C: Address = address!("00000000000000000000000000000000000000a3");
pub const ALICE: Address = address!("1000000000000000000000000000000000000001");
pub const FEE_COLLECTOR: Address = address!("1000000000000000000000000000000000000fee");

pub const CHAIN_ID: u64 = 1;
pub const NOW: u64 = 1_700_000_000;
pub const FEE_MEDIUM: u32 = 3000;

/// Signing key for the permit-owner account ("bob").
pub fn bob_key() -> SigningKey {
    let bytes = hex::decode("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d")
        .unwrap();
    SigningKey::from_slice(&bytes).unwrap()
}

pub fn bob() -> Address {
    signer_address(&bob_key())
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Copy)]
struct FlatRate {
    account: Address,
    /// Price of the canonical direction (lower token in, higher token out)
    /// as out = in * num / den.
    num: u64,
    den: u64,
}

impl FlatRate {
    fn quote_out(&self, canonical_in: bool, amount_in: U256) -> U256 {
        let (num, den) = self.oriented(canonical_in);
        amount_in * U256::from(num) / U256::from(den)
    }

    fn quote_in(&self, canonical_in: bool, amount_out: U256) -> U256 {
        let (num, den) = self.oriented(canonical_in);
        // Ceiling division: the venue never under-charges.
        (amount_out * U256::from(den) + U256::from(num - 1)) / U256::from(num)
    }

    fn oriented(&self, canonical_in: bool) -> (u64, u64) {
        if canonical_in {
            (self.num, self.den)
        } else {
            (self.den, self.num)
        }
    }
}

fn execute_hop(
    ledger: &mut Ledger,
    pool: &FlatRate,
    canonical_in: bool,
    token_out: Address,
    amount_in: U256,
    to: Address,
) -> Result<U256, VenueError> {
    let amount_out = pool.quote_out(canonical_in, amount_in);
    if ledger.balance_of(token_out, pool.account) < amount_out {
        return Err(VenueError::InsufficientLiquidity);
    }
    ledger.transfer(token_out, pool.account, to, amount_out)?;
    Ok(amount_out)
}

/// Constant-product venue double with one flat rate per pair.
#[derive(Default)]
pub struct MockAmm {
    pools: BTreeMap<(Address, Address), FlatRate>,
}

impl MockAmm {
    pub fn add_pool(&mut self, a: Address, b: Address, account: Address, num: u64, den: u64) {
        self.pools
            .insert(sorted(a, b), FlatRate { account, num, den });
    }

    fn pool(&self, a: Address, b: Address) -> Result<&FlatRate, VenueError> {
        self.pools.get(&sorted(a, b)).ok_or(VenueError::UnknownPool)
    }
}

impl AmmVenue for MockAmm {
    fn pair(&self, a: Address, b: Address) -> Result<Address, VenueError> {
        Ok(self.pool(a, b)?.account)
    }

    fn quote_out(
        &self,
        _ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VenueError> {
        let pool = self.pool(token_in, token_out)?;
        Ok(pool.quote_out(token_in < token_out, amount_in))
    }

    fn quote_in(
        &self,
        _ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256, VenueError> {
        let pool = self.pool(token_in, token_out)?;
        Ok(pool.quote_in(token_in < token_out, amount_out))
    }

    fn swap(
        &self,
        ledger: &mut Ledger,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        to: Address,
    ) -> Result<U256, VenueError> {
        let pool = self.pool(token_in, token_out)?;
        execute_hop(ledger, pool, token_in < token_out, token_out, amount_in, to)
    }
}

/// Concentrated venue double: one flat rate per (pair, fee tier).
#[derive(Default)]
pub struct MockClmm {
    pools: BTreeMap<(Address, Address, u32), FlatRate>,
}

impl MockClmm {
    pub fn add_pool(
        &mut self,
        a: Address,
        b: Address,
        fee: u32,
        account: Address,
        num: u64,
        den: u64,
    ) {
        let (lo, hi) = sorted(a, b);
        self.pools
            .insert((lo, hi, fee), FlatRate { account, num, den });
    }

    fn pool_cfg(&self, a: Address, b: Address, fee: u32) -> Result<&FlatRate, VenueError> {
        let (lo, hi) = sorted(a, b);
        self.pools.get(&(lo, hi, fee)).ok_or(VenueError::UnknownPool)
    }
}

impl ClmmVenue for MockClmm {
    fn pool(&self, a: Address, b: Address, fee: u32) -> Result<Address, VenueError> {
        Ok(self.pool_cfg(a, b, fee)?.account)
    }

    fn quote_out(
        &self,
        _ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, VenueError> {
        let pool = self.pool_cfg(token_in, token_out, fee)?;
        Ok(pool.quote_out(token_in < token_out, amount_in))
    }

    fn quote_in(
        &self,
        _ledger: &Ledger,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_out: U256,
    ) -> Result<U256, VenueError> {
        let pool = self.pool_cfg(token_in, token_out, fee)?;
        Ok(pool.quote_in(token_in < token_out, amount_out))
    }

    fn swap(
        &self,
        ledger: &mut Ledger,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        to: Address,
    ) -> Result<U256, VenueError> {
        let pool = self.pool_cfg(token_in, token_out, fee)?;
        execute_hop(ledger, pool, token_in < token_out, token_out, amount_in, to)
    }
}

/// Pass-through target that re-enters the router with the plan carried in
/// its payload (`abi.encode(bytes commands, bytes[] inputs)`).
pub struct ReenteringProtocol;

impl ExternalProtocol<MockAmm, MockClmm> for ReenteringProtocol {
    fn call(
        &self,
        router: &mut Router<MockAmm, MockClmm>,
        caller: Address,
        _value: U256,
        payload: &[u8],
    ) -> Result<(), ExternalCallError> {
        let (commands, inputs) = <(Bytes, Vec<Bytes>)>::abi_decode_params(payload, true)
            .map_err(|_| ExternalCallError::Reverted("bad payload".into()))?;
        router
            .execute(&Call::new(caller, commands, inputs))
            .map_err(|error| ExternalCallError::Reverted(error.to_string()))
    }
}

/// Pass-through target that accepts anything and does nothing.
pub struct SinkProtocol;

impl ExternalProtocol<MockAmm, MockClmm> for SinkProtocol {
    fn call(
        &self,
        _router: &mut Router<MockAmm, MockClmm>,
        _caller: Address,
        _value: U256,
        _payload: &[u8],
    ) -> Result<(), ExternalCallError> {
        Ok(())
    }
}

pub const AMM_POOL_AB: Address = address!("2000000000000000000000000000000000000001");
pub const AMM_POOL_BC: Address = address!("2000000000000000000000000000000000000002");
pub const CLMM_POOL_AB: Address = address!("2000000000000000000000000000000000000011");
pub const CLMM_POOL_BC: Address = address!("2000000000000000000000000000000000000012");
pub const CLMM_POOL_WB: Address = address!("2000000000000000000000000000000000000013");
pub const SINK: Address = address!("3000000000000000000000000000000000000001");
pub const REENTERER: Address = address!("3000000000000000000000000000000000000002");

/// A funded router over both mock venues.
///
/// Rates: every pool trades 1:1 except the A→B constant-product pair,
/// which pays out 2 B per A. Pools and user accounts hold generous
/// balances; the clock starts at [`NOW`].
pub fn test_router() -> Router<MockAmm, MockClmm> {
    let cfg = RouterConfig {
        router: ROUTER_ADDR,
        wrapped_native: WNATIVE,
        chain_id: CHAIN_ID,
    };

    let mut amm = MockAmm::default();
    amm.add_pool(TOKEN_A, TOKEN_B, AMM_POOL_AB, 2, 1);
    amm.add_pool(TOKEN_B, TOKEN_C, AMM_POOL_BC, 1, 1);

    let mut clmm = MockClmm::default();
    clmm.add_pool(TOKEN_A, TOKEN_B, FEE_MEDIUM, CLMM_POOL_AB, 1, 1);
    clmm.add_pool(TOKEN_B, TOKEN_C, FEE_MEDIUM, CLMM_POOL_BC, 1, 1);
    clmm.add_pool(WNATIVE, TOKEN_B, FEE_MEDIUM, CLMM_POOL_WB, 1, 1);

    let mut router = Router::new(cfg, amm, clmm);
    router.set_timestamp(NOW);
    router.register_external(SINK, Rc::new(SinkProtocol));
    router.register_external(REENTERER, Rc::new(ReenteringProtocol));

    let million = U256::from(1_000_000u64);
    let ledger = router.ledger_mut();
    for pool in [AMM_POOL_AB, AMM_POOL_BC, CLMM_POOL_AB, CLMM_POOL_BC, CLMM_POOL_WB] {
        for token in [TOKEN_A, TOKEN_B, TOKEN_C, WNATIVE] {
            ledger.credit(token, pool, million).unwrap();
        }
    }
    for account in [ALICE, bob()] {
        for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
            ledger.credit(token, account, U256::from(10_000u64)).unwrap();
        }
        ledger
            .credit(crate::state::NATIVE, account, U256::from(10_000u64))
            .unwrap();
    }

    router
}

/// Grant `owner` an unlimited, long-lived allowance towards the router,
/// the same way a host would via the direct approval path.
pub fn approve_unlimited(router: &mut Router<MockAmm, MockClmm>, owner: Address, token: Address) {
    router
        .allowances_mut()
        .approve(owner, token, ROUTER_ADDR, U160::MAX, NOW + 1_000_000);
}
