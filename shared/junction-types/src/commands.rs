use alloy_primitives::{aliases::U160, Address, Bytes, U256};

use crate::abi::{AllowanceTransferDetails, PermitBatch, PermitSingle};
use crate::refs::{AccountRef, AmountRef};

/// Low 5 bits of a command byte select the operation. The upper 3 bits are
/// reserved flag bits and are ignored by this revision of the decoder.
pub const COMMAND_TYPE_MASK: u8 = 0x1f;

/// Operations supported by the v1 command stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    AmmSwapExactIn = 0x00,
    AmmSwapExactOut = 0x01,
    ClmmSwapExactIn = 0x02,
    ClmmSwapExactOut = 0x03,

    Permit = 0x04,
    PermitBatch = 0x05,
    PermitTransferFrom = 0x06,
    PermitTransferFromBatch = 0x07,

    Transfer = 0x08,
    Sweep = 0x09,
    PayPortion = 0x0a,
    WrapNative = 0x0b,
    UnwrapNative = 0x0c,
    BalanceCheck = 0x0d,
    Approve = 0x0e,

    CallExternal = 0x0f,
    ExecuteSubPlan = 0x10,
}

impl TryFrom<u8> for CommandType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use CommandType::*;
        let op = match value {
            0x00 => AmmSwapExactIn,
            0x01 => AmmSwapExactOut,
            0x02 => ClmmSwapExactIn,
            0x03 => ClmmSwapExactOut,
            0x04 => Permit,
            0x05 => PermitBatch,
            0x06 => PermitTransferFrom,
            0x07 => PermitTransferFromBatch,
            0x08 => Transfer,
            0x09 => Sweep,
            0x0a => PayPortion,
            0x0b => WrapNative,
            0x0c => UnwrapNative,
            0x0d => BalanceCheck,
            0x0e => Approve,
            0x0f => CallExternal,
            0x10 => ExecuteSubPlan,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// Decoded representation of a single command.
///
/// Swap routes keep the wire form (`Vec<Address>` token list for the
/// constant-product venue, packed `token ‖ fee ‖ token …` bytes for the
/// concentrated venue); the adapter layer interprets them at execution time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AmmSwapExactIn {
        recipient: AccountRef,
        amount_in: AmountRef,
        amount_out_min: U256,
        path: Vec<Address>,
        payer_is_caller: bool,
    },
    AmmSwapExactOut {
        recipient: AccountRef,
        amount_out: U256,
        amount_in_max: U256,
        path: Vec<Address>,
        payer_is_caller: bool,
    },
    ClmmSwapExactIn {
        recipient: AccountRef,
        amount_in: AmountRef,
        amount_out_min: U256,
        path: Bytes,
        payer_is_caller: bool,
    },
    ClmmSwapExactOut {
        recipient: AccountRef,
        amount_out: U256,
        amount_in_max: U256,
        path: Bytes,
        payer_is_caller: bool,
    },

    Permit {
        permit: PermitSingle,
        signature: Bytes,
    },
    PermitBatch {
        permit: PermitBatch,
        signature: Bytes,
    },
    PermitTransferFrom {
        token: Address,
        recipient: AccountRef,
        amount: U160,
    },
    PermitTransferFromBatch {
        batch: Vec<AllowanceTransferDetails>,
    },

    Transfer {
        token: Address,
        recipient: AccountRef,
        value: AmountRef,
    },
    Sweep {
        token: Address,
        recipient: AccountRef,
        amount_min: U256,
    },
    PayPortion {
        token: Address,
        recipient: AccountRef,
        bips: U256,
    },
    WrapNative {
        recipient: AccountRef,
        amount: AmountRef,
    },
    UnwrapNative {
        recipient: AccountRef,
        amount_min: U256,
    },
    BalanceCheck {
        owner: AccountRef,
        token: Address,
        min_balance: U256,
    },
    Approve {
        token: Address,
        spender: Address,
    },

    CallExternal {
        protocol: Address,
        value: U256,
        payload: Bytes,
    },
    /// A nested plan whose semantic failures are isolated from the
    /// enclosing call.
    SubPlan(Vec<Command>),
}
