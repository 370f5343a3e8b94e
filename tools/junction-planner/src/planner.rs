//! Typed builder for the command stream.
//!
//! Each method appends one opcode byte and its ABI-encoded parameter block.
//! Sentinel accounts/amounts (`CALLER_ACCOUNT`, `ROUTER_ACCOUNT`,
//! `FULL_BALANCE`) are passed through verbatim; the router resolves them at
//! execution time.

use alloy_primitives::{aliases::U160, Address, Bytes, U256};
use alloy_sol_types::SolValue;

use junction_types::abi::{AllowanceTransferDetails, PermitBatch, PermitSingle};
use junction_types::commands::CommandType;

/// Ordered command stream under construction.
#[derive(Clone, Debug, Default)]
pub struct RoutePlanner {
    commands: Vec<u8>,
    inputs: Vec<Bytes>,
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the plan: the opcode stream and its parallel parameter array.
    pub fn into_parts(self) -> (Bytes, Vec<Bytes>) {
        (Bytes::from(self.commands), self.inputs)
    }

    fn push(&mut self, kind: CommandType, input: Vec<u8>) -> &mut Self {
        self.commands.push(kind as u8);
        self.inputs.push(Bytes::from(input));
        self
    }

    pub fn amm_swap_exact_in(
        &mut self,
        recipient: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        payer_is_caller: bool,
    ) -> &mut Self {
        let input = (
            recipient,
            amount_in,
            amount_out_min,
            path.to_vec(),
            payer_is_caller,
        )
            .abi_encode_params();
        self.push(CommandType::AmmSwapExactIn, input)
    }

    pub fn amm_swap_exact_out(
        &mut self,
        recipient: Address,
        amount_out: U256,
        amount_in_max: U256,
        path: &[Address],
        payer_is_caller: bool,
    ) -> &mut Self {
        let input = (
            recipient,
            amount_out,
            amount_in_max,
            path.to_vec(),
            payer_is_caller,
        )
            .abi_encode_params();
        self.push(CommandType::AmmSwapExactOut, input)
    }

    pub fn clmm_swap_exact_in(
        &mut self,
        recipient: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Bytes,
        payer_is_caller: bool,
    ) -> &mut Self {
        let input =
            (recipient, amount_in, amount_out_min, path, payer_is_caller).abi_encode_params();
        self.push(CommandType::ClmmSwapExactIn, input)
    }

    pub fn clmm_swap_exact_out(
        &mut self,
        recipient: Address,
        amount_out: U256,
        amount_in_max: U256,
        path: Bytes,
        payer_is_caller: bool,
    ) -> &mut Self {
        let input =
            (recipient, amount_out, amount_in_max, path, payer_is_caller).abi_encode_params();
        self.push(CommandType::ClmmSwapExactOut, input)
    }

    pub fn permit(&mut self, permit: &PermitSingle, signature: &[u8]) -> &mut Self {
        let input = (permit.clone(), Bytes::from(signature.to_vec())).abi_encode_params();
        self.push(CommandType::Permit, input)
    }

    pub fn permit_batch(&mut self, permit: &PermitBatch, signature: &[u8]) -> &mut Self {
        let input = (permit.clone(), Bytes::from(signature.to_vec())).abi_encode_params();
        self.push(CommandType::PermitBatch, input)
    }

    pub fn permit_transfer_from(
        &mut self,
        token: Address,
        recipient: Address,
        amount: U160,
    ) -> &mut Self {
        let input = (token, recipient, amount).abi_encode_params();
        self.push(CommandType::PermitTransferFrom, input)
    }

    pub fn permit_transfer_from_batch(
        &mut self,
        batch: &[AllowanceTransferDetails],
    ) -> &mut Self {
        let input = (batch.to_vec(),).abi_encode_params();
        self.push(CommandType::PermitTransferFromBatch, input)
    }

    pub fn transfer(&mut self, token: Address, recipient: Address, value: U256) -> &mut Self {
        let input = (token, recipient, value).abi_encode_params();
        self.push(CommandType::Transfer, input)
    }

    pub fn sweep(&mut self, token: Address, recipient: Address, amount_min: U256) -> &mut Self {
        let input = (token, recipient, amount_min).abi_encode_params();
        self.push(CommandType::Sweep, input)
    }

    pub fn pay_portion(&mut self, token: Address, recipient: Address, bips: U256) -> &mut Self {
        let input = (token, recipient, bips).abi_encode_params();
        self.push(CommandType::PayPortion, input)
    }

    pub fn wrap_native(&mut self, recipient: Address, amount: U256) -> &mut Self {
        let input = (recipient, amount).abi_encode_params();
        self.push(CommandType::WrapNative, input)
    }

    pub fn unwrap_native(&mut self, recipient: Address, amount_min: U256) -> &mut Self {
        let input = (recipient, amount_min).abi_encode_params();
        self.push(CommandType::UnwrapNative, input)
    }

    pub fn balance_check(
        &mut self,
        owner: Address,
        token: Address,
        min_balance: U256,
    ) -> &mut Self {
        let input = (owner, token, min_balance).abi_encode_params();
        self.push(CommandType::BalanceCheck, input)
    }

    pub fn approve(&mut self, token: Address, spender: Address) -> &mut Self {
        let input = (token, spender).abi_encode_params();
        self.push(CommandType::Approve, input)
    }

    pub fn call_external(
        &mut self,
        protocol: Address,
        value: U256,
        payload: Bytes,
    ) -> &mut Self {
        let input = (protocol, value, payload).abi_encode_params();
        self.push(CommandType::CallExternal, input)
    }

    /// Nest another plan as a single failure-isolated command.
    pub fn sub_plan(&mut self, plan: &RoutePlanner) -> &mut Self {
        let (commands, inputs) = plan.clone().into_parts();
        let input = (commands, inputs).abi_encode_params();
        self.push(CommandType::ExecuteSubPlan, input)
    }
}

/// Pack a concentrated-liquidity route: `token ‖ fee ‖ token …`, fees as
/// 3-byte big-endian values.
pub fn encode_cl_path(tokens: &[Address], fees: &[u32]) -> Bytes {
    assert_eq!(
        tokens.len(),
        fees.len() + 1,
        "a route needs one more token than fees"
    );
    let mut buf = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    buf.extend_from_slice(tokens[0].as_slice());
    for (fee, token) in fees.iter().zip(&tokens[1..]) {
        buf.extend_from_slice(&fee.to_be_bytes()[1..]);
        buf.extend_from_slice(token.as_slice());
    }
    Bytes::from(buf)
}

/// Pack an exact-output route: conceptual token order reversed so the
/// output token comes first.
pub fn exact_output_cl_path(tokens: &[Address], fees: &[u32]) -> Bytes {
    let mut tokens: Vec<Address> = tokens.to_vec();
    tokens.reverse();
    let mut fees: Vec<u32> = fees.to_vec();
    fees.reverse();
    encode_cl_path(&tokens, &fees)
}
