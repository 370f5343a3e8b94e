//! Command-stream decoding.
//!
//! A stream is one opcode byte per command plus a parallel array of
//! ABI-encoded parameter blocks aligned by index. The whole stream —
//! including, recursively, every nested sub-plan — is decoded before any
//! command executes, so a corrupt stream aborts with zero effects no matter
//! how deeply the corruption is nested.

use alloy_primitives::{aliases::U160, Address, Bytes, U256};
use alloy_sol_types::SolValue;

use junction_types::abi::{AllowanceTransferDetails, PermitBatch, PermitSingle};
use junction_types::commands::{Command, CommandType, COMMAND_TYPE_MASK};
use junction_types::refs::{AccountRef, AmountRef};

use crate::errors::RouterError;

/// Decode a full plan. Stream and parameter-block counts must match.
pub fn decode_plan(commands: &[u8], inputs: &[Bytes]) -> Result<Vec<Command>, RouterError> {
    if commands.len() != inputs.len() {
        return Err(RouterError::LengthMismatch {
            commands: commands.len(),
            inputs: inputs.len(),
        });
    }
    commands
        .iter()
        .zip(inputs)
        .enumerate()
        .map(|(index, (&byte, input))| decode_command(byte, input, index))
        .collect()
}

fn decode_command(byte: u8, input: &Bytes, index: usize) -> Result<Command, RouterError> {
    let operation = byte & COMMAND_TYPE_MASK;
    let kind = CommandType::try_from(operation)
        .map_err(|_| RouterError::InvalidCommandType(operation))?;

    let malformed = |_| RouterError::InvalidInput { index };

    let command = match kind {
        CommandType::AmmSwapExactIn => {
            let (recipient, amount_in, amount_out_min, path, payer_is_caller) =
                <(Address, U256, U256, Vec<Address>, bool)>::abi_decode_params(input, true)
                    .map_err(malformed)?;
            Command::AmmSwapExactIn {
                recipient: AccountRef::from_encoded(recipient),
                amount_in: AmountRef::from_encoded(amount_in),
                amount_out_min,
                path,
                payer_is_caller,
            }
        }
        CommandType::AmmSwapExactOut => {
            let (recipient, amount_out, amount_in_max, path, payer_is_caller) =
                <(Address, U256, U256, Vec<Address>, bool)>::abi_decode_params(input, true)
                    .map_err(malformed)?;
            Command::AmmSwapExactOut {
                recipient: AccountRef::from_encoded(recipient),
                amount_out,
                amount_in_max,
                path,
                payer_is_caller,
            }
        }
        CommandType::ClmmSwapExactIn => {
            let (recipient, amount_in, amount_out_min, path, payer_is_caller) =
                <(Address, U256, U256, Bytes, bool)>::abi_decode_params(input, true)
                    .map_err(malformed)?;
            Command::ClmmSwapExactIn {
                recipient: AccountRef::from_encoded(recipient),
                amount_in: AmountRef::from_encoded(amount_in),
                amount_out_min,
                path,
                payer_is_caller,
            }
        }
        CommandType::ClmmSwapExactOut => {
            let (recipient, amount_out, amount_in_max, path, payer_is_caller) =
                <(Address, U256, U256, Bytes, bool)>::abi_decode_params(input, true)
                    .map_err(malformed)?;
            Command::ClmmSwapExactOut {
                recipient: AccountRef::from_encoded(recipient),
                amount_out,
                amount_in_max,
                path,
                payer_is_caller,
            }
        }
        CommandType::Permit => {
            let (permit, signature) =
                <(PermitSingle, Bytes)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::Permit { permit, signature }
        }
        CommandType::PermitBatch => {
            let (permit, signature) =
                <(PermitBatch, Bytes)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::PermitBatch { permit, signature }
        }
        CommandType::PermitTransferFrom => {
            let (token, recipient, amount) =
                <(Address, Address, U160)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::PermitTransferFrom {
                token,
                recipient: AccountRef::from_encoded(recipient),
                amount,
            }
        }
        CommandType::PermitTransferFromBatch => {
            let (batch,) = <(Vec<AllowanceTransferDetails>,)>::abi_decode_params(input, true)
                .map_err(malformed)?;
            Command::PermitTransferFromBatch { batch }
        }
        CommandType::Transfer => {
            let (token, recipient, value) =
                <(Address, Address, U256)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::Transfer {
                token,
                recipient: AccountRef::from_encoded(recipient),
                value: AmountRef::from_encoded(value),
            }
        }
        CommandType::Sweep => {
            let (token, recipient, amount_min) =
                <(Address, Address, U256)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::Sweep {
                token,
                recipient: AccountRef::from_encoded(recipient),
                amount_min,
            }
        }
        CommandType::PayPortion => {
            let (token, recipient, bips) =
                <(Address, Address, U256)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::PayPortion {
                token,
                recipient: AccountRef::from_encoded(recipient),
                bips,
            }
        }
        CommandType::WrapNative => {
            let (recipient, amount) =
                <(Address, U256)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::WrapNative {
                recipient: AccountRef::from_encoded(recipient),
                amount: AmountRef::from_encoded(amount),
            }
        }
        CommandType::UnwrapNative => {
            let (recipient, amount_min) =
                <(Address, U256)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::UnwrapNative {
                recipient: AccountRef::from_encoded(recipient),
                amount_min,
            }
        }
        CommandType::BalanceCheck => {
            let (owner, token, min_balance) =
                <(Address, Address, U256)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::BalanceCheck {
                owner: AccountRef::from_encoded(owner),
                token,
                min_balance,
            }
        }
        CommandType::Approve => {
            let (token, spender) =
                <(Address, Address)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::Approve { token, spender }
        }
        CommandType::CallExternal => {
            let (protocol, value, payload) =
                <(Address, U256, Bytes)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::CallExternal {
                protocol,
                value,
                payload,
            }
        }
        CommandType::ExecuteSubPlan => {
            let (sub_commands, sub_inputs) =
                <(Bytes, Vec<Bytes>)>::abi_decode_params(input, true).map_err(malformed)?;
            Command::SubPlan(decode_plan(&sub_commands, &sub_inputs)?)
        }
    };
    Ok(command)
}
