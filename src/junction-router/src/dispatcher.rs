//! Command dispatcher.
//!
//! A call carries an opaque command stream plus an optional deadline. The
//! dispatcher validates the deadline, takes the execution lock, decodes the
//! whole stream (including nested sub-plans), and then runs each command in
//! order against the snapshottable state.
//!
//! Failure model, the central correctness property:
//! - a failing top-level command aborts the whole call, and the state
//!   snapshot taken at entry is restored — the call is atomic;
//! - a failure strictly inside a sub-plan is caught at the sub-plan
//!   boundary: only that sub-plan's effects are rolled back, execution
//!   resumes with the next top-level command, and nothing surfaces to the
//!   caller. Decode-class corruption is never swallowed; it aborts before
//!   any command runs because decoding is eager and recursive.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use alloy_primitives::{Address, Bytes, U256};
use tracing::{debug, warn};

use junction_types::commands::Command;

use crate::allowance::AllowanceLedger;
use crate::decoder;
use crate::errors::{CommandError, RouterError};
use crate::externals::ExternalProtocol;
use crate::payments;
use crate::state::{Ledger, State, NATIVE};
use crate::swap::{amm, clmm, AmmVenue, ClmmVenue};

/// Fixed identity and environment of one router deployment.
#[derive(Clone, Copy, Debug)]
pub struct RouterConfig {
    /// The router's own account.
    pub router: Address,
    /// Token address of the wrapped native asset.
    pub wrapped_native: Address,
    /// Domain-separation chain id for permit signatures.
    pub chain_id: u64,
}

/// One top-level invocation.
#[derive(Clone, Debug)]
pub struct Call {
    pub caller: Address,
    /// Native value attached to the call, moved to the router at entry.
    pub value: U256,
    pub commands: Bytes,
    pub inputs: Vec<Bytes>,
}

impl Call {
    pub fn new(caller: Address, commands: Bytes, inputs: Vec<Bytes>) -> Self {
        Self {
            caller,
            value: U256::ZERO,
            commands,
            inputs,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// RAII execution lock. Dropping the guard releases the lock on every exit
/// path, including early failure.
struct LockGuard(Rc<Cell<bool>>);

impl LockGuard {
    fn acquire(lock: &Rc<Cell<bool>>) -> Result<Self, RouterError> {
        if lock.get() {
            return Err(RouterError::ReentrantCall);
        }
        lock.set(true);
        Ok(Self(Rc::clone(lock)))
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The settlement router.
pub struct Router<A: AmmVenue, C: ClmmVenue> {
    cfg: RouterConfig,
    state: State,
    amm: A,
    clmm: C,
    externals: BTreeMap<Address, Rc<dyn ExternalProtocol<A, C>>>,
    lock: Rc<Cell<bool>>,
    now: u64,
}

impl<A: AmmVenue, C: ClmmVenue> Router<A, C> {
    pub fn new(cfg: RouterConfig, amm: A, clmm: C) -> Self {
        Self {
            cfg,
            state: State::default(),
            amm,
            clmm,
            externals: BTreeMap::new(),
            lock: Rc::new(Cell::new(false)),
            now: 0,
        }
    }

    /// Register a pass-through target reachable via `CallExternal` and
    /// approvable via `Approve`.
    pub fn register_external(
        &mut self,
        address: Address,
        protocol: Rc<dyn ExternalProtocol<A, C>>,
    ) {
        self.externals.insert(address, protocol);
    }

    pub fn config(&self) -> &RouterConfig {
        &self.cfg
    }

    pub fn timestamp(&self) -> u64 {
        self.now
    }

    /// Advance the host clock.
    pub fn set_timestamp(&mut self, now: u64) {
        self.now = now;
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    /// Host-side state seeding (balances, fixtures).
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.state.ledger
    }

    pub fn allowances(&self) -> &AllowanceLedger {
        &self.state.allowances
    }

    /// Host-side direct approval path, acting on behalf of `owner`.
    pub fn allowances_mut(&mut self) -> &mut AllowanceLedger {
        &mut self.state.allowances
    }

    /// Execute a stream under a deadline. Rejects before decoding anything
    /// if the host clock has passed the deadline.
    pub fn execute_with_deadline(
        &mut self,
        call: &Call,
        deadline: u64,
    ) -> Result<(), RouterError> {
        if self.now > deadline {
            return Err(RouterError::DeadlineExpired);
        }
        self.execute(call)
    }

    /// Execute a stream with no time check.
    pub fn execute(&mut self, call: &Call) -> Result<(), RouterError> {
        let _guard = LockGuard::acquire(&self.lock)?;
        let plan = decoder::decode_plan(&call.commands, &call.inputs)?;

        let snapshot = self.state.clone();
        let result = self.run_call(call, &plan);
        if result.is_err() {
            self.state = snapshot;
        }
        result
    }

    fn run_call(&mut self, call: &Call, plan: &[Command]) -> Result<(), RouterError> {
        if call.value > U256::ZERO {
            self.state
                .ledger
                .transfer(NATIVE, call.caller, self.cfg.router, call.value)
                .map_err(|_| RouterError::InsufficientValue)?;
        }
        self.run_plan(call.caller, plan)
    }

    fn run_plan(&mut self, caller: Address, plan: &[Command]) -> Result<(), RouterError> {
        for (index, command) in plan.iter().enumerate() {
            if let Command::SubPlan(nested) = command {
                debug!(index, commands = nested.len(), "entering sub-plan");
                let snapshot = self.state.clone();
                if let Err(error) = self.run_plan(caller, nested) {
                    match error {
                        RouterError::ExecutionFailed {
                            index: failed,
                            reason,
                        } => {
                            self.state = snapshot;
                            warn!(index, failed, %reason, "sub-plan reverted; continuing");
                        }
                        fatal => return Err(fatal),
                    }
                }
                continue;
            }

            debug!(index, "executing command");
            self.dispatch(caller, command)
                .map_err(|reason| RouterError::ExecutionFailed { index, reason })?;
        }
        Ok(())
    }

    fn dispatch(&mut self, caller: Address, command: &Command) -> Result<(), CommandError> {
        match command {
            Command::AmmSwapExactIn {
                recipient,
                amount_in,
                amount_out_min,
                path,
                payer_is_caller,
            } => amm::exact_in(
                &self.amm,
                &mut self.state,
                &self.cfg,
                caller,
                self.now,
                recipient,
                amount_in,
                *amount_out_min,
                path,
                *payer_is_caller,
            )?,
            Command::AmmSwapExactOut {
                recipient,
                amount_out,
                amount_in_max,
                path,
                payer_is_caller,
            } => amm::exact_out(
                &self.amm,
                &mut self.state,
                &self.cfg,
                caller,
                self.now,
                recipient,
                *amount_out,
                *amount_in_max,
                path,
                *payer_is_caller,
            )?,
            Command::ClmmSwapExactIn {
                recipient,
                amount_in,
                amount_out_min,
                path,
                payer_is_caller,
            } => clmm::exact_in(
                &self.clmm,
                &mut self.state,
                &self.cfg,
                caller,
                self.now,
                recipient,
                amount_in,
                *amount_out_min,
                path,
                *payer_is_caller,
            )?,
            Command::ClmmSwapExactOut {
                recipient,
                amount_out,
                amount_in_max,
                path,
                payer_is_caller,
            } => clmm::exact_out(
                &self.clmm,
                &mut self.state,
                &self.cfg,
                caller,
                self.now,
                recipient,
                *amount_out,
                *amount_in_max,
                path,
                *payer_is_caller,
            )?,

            Command::Permit { permit, signature } => self.state.allowances.permit(
                caller,
                permit,
                signature,
                self.cfg.chain_id,
                self.cfg.router,
                self.now,
            )?,
            Command::PermitBatch { permit, signature } => self.state.allowances.permit_batch(
                caller,
                permit,
                signature,
                self.cfg.chain_id,
                self.cfg.router,
                self.now,
            )?,
            Command::PermitTransferFrom {
                token,
                recipient,
                amount,
            } => self.state.allowances.transfer_from(
                &mut self.state.ledger,
                caller,
                *token,
                self.cfg.router,
                recipient.resolve(caller, self.cfg.router),
                *amount,
                self.now,
            )?,
            Command::PermitTransferFromBatch { batch } => {
                self.state.allowances.transfer_from_batch(
                    &mut self.state.ledger,
                    batch,
                    self.cfg.router,
                    self.now,
                )?
            }

            Command::Transfer {
                token,
                recipient,
                value,
            } => payments::transfer(&mut self.state, &self.cfg, caller, *token, recipient, value)?,
            Command::Sweep {
                token,
                recipient,
                amount_min,
            } => payments::sweep(
                &mut self.state,
                &self.cfg,
                caller,
                *token,
                recipient,
                *amount_min,
            )?,
            Command::PayPortion {
                token,
                recipient,
                bips,
            } => payments::pay_portion(
                &mut self.state,
                &self.cfg,
                caller,
                *token,
                recipient,
                *bips,
            )?,
            Command::WrapNative { recipient, amount } => {
                payments::wrap_native(&mut self.state, &self.cfg, caller, recipient, amount)?
            }
            Command::UnwrapNative {
                recipient,
                amount_min,
            } => payments::unwrap_native(
                &mut self.state,
                &self.cfg,
                caller,
                recipient,
                *amount_min,
            )?,
            Command::BalanceCheck {
                owner,
                token,
                min_balance,
            } => payments::balance_check(
                &self.state,
                &self.cfg,
                caller,
                owner,
                *token,
                *min_balance,
            )?,
            Command::Approve { token, spender } => {
                if !self.externals.contains_key(spender) {
                    return Err(CommandError::UnknownProtocol(*spender));
                }
                self.state
                    .ledger
                    .approve(self.cfg.router, *token, *spender, U256::MAX);
            }

            Command::CallExternal {
                protocol,
                value,
                payload,
            } => {
                let target = self
                    .externals
                    .get(protocol)
                    .cloned()
                    .ok_or(CommandError::UnknownProtocol(*protocol))?;
                if *value > U256::ZERO {
                    self.state
                        .ledger
                        .transfer(NATIVE, self.cfg.router, *protocol, *value)?;
                }
                target.call(self, caller, *value, payload)?;
            }

            // Sub-plans are interpreted by the plan runner, which owns the
            // snapshot boundary.
            Command::SubPlan(_) => unreachable!("sub-plans are handled by the plan runner"),
        }
        Ok(())
    }
}
