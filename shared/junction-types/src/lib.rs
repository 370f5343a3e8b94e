//! Shared types for the Junction command stream: opcodes, the decoded
//! command sum type, symbolic account/amount references, and the permit
//! messages with their EIP-712 digests.
//!
//! These are shared between the router (decoder + dispatcher) and the
//! client-side planner so that both sides agree on the wire layout.

pub mod abi;
pub mod commands;
pub mod refs;

pub use abi::{
    allowance_domain, permit_batch_digest, permit_single_digest, AllowanceTransferDetails,
    PermitBatch, PermitDetails, PermitSingle,
};
pub use commands::{Command, CommandType, COMMAND_TYPE_MASK};
pub use refs::{AccountRef, AmountRef, CALLER_ACCOUNT, FULL_BALANCE, ROUTER_ACCOUNT};
