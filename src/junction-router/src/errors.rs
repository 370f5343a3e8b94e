use alloy_primitives::Address;
use thiserror::Error;

/// Failures signaled by the router entry points.
///
/// `DeadlineExpired`, `ReentrantCall`, and the decode-class variants reject
/// the call before any command has run. `ExecutionFailed` wraps a failing
/// top-level command together with its index in the stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("transaction deadline passed")]
    DeadlineExpired,

    #[error("reentrant call")]
    ReentrantCall,

    #[error("stream carries {commands} commands but {inputs} parameter blocks")]
    LengthMismatch { commands: usize, inputs: usize },

    #[error("invalid command type {0:#04x}")]
    InvalidCommandType(u8),

    #[error("malformed parameter block at command {index}")]
    InvalidInput { index: usize },

    #[error("caller cannot fund the attached native value")]
    InsufficientValue,

    #[error("command {index} failed: {reason}")]
    ExecutionFailed { index: usize, reason: CommandError },
}

/// Semantic failures raised by command handlers.
///
/// At the top level these propagate (wrapped in
/// [`RouterError::ExecutionFailed`]) and abort the call; inside a sub-plan
/// they are caught at the sub-plan boundary and the sub-plan's effects are
/// rolled back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Allowance(#[from] AllowanceError),

    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("no protocol registered at {0}")]
    UnknownProtocol(Address),

    #[error("external call failed: {0}")]
    External(#[from] ExternalCallError),
}

/// Allowance-ledger failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllowanceError {
    #[error("permit signing deadline passed")]
    SignatureExpired,

    #[error("permit nonce does not match the expected next value")]
    InvalidNonce,

    #[error("permit signature does not recover to the owner")]
    InvalidSignature,

    #[error("allowance expired")]
    AllowanceExpired,

    #[error("insufficient allowance")]
    InsufficientAllowance,

    #[error("amount exceeds the permit amount width")]
    UnsafeCast,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Swap-adapter failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapError {
    #[error("swap produced less than the required minimum output")]
    InsufficientOutputAmount,

    #[error("swap would consume more than the permitted maximum input")]
    ExcessiveInputAmount,

    #[error("malformed swap route")]
    InvalidPath,

    #[error(transparent)]
    Venue(#[from] VenueError),
}

/// Failures reported by an exchange venue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VenueError {
    #[error("no pool for the requested token pair")]
    UnknownPool,

    #[error("pool cannot cover the requested output")]
    InsufficientLiquidity,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Payment-utility failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("portion is zero or exceeds 10_000 basis points")]
    InvalidBips,

    #[error("token balance below the required floor")]
    InsufficientToken,

    #[error("account balance below the asserted minimum")]
    BalanceTooLow,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Token-ledger failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance of {token} held by {account}")]
    InsufficientBalance { token: Address, account: Address },

    #[error("balance overflow for {token} held by {account}")]
    BalanceOverflow { token: Address, account: Address },

    #[error("insufficient conventional allowance")]
    InsufficientApproval,
}

/// Failure surfaced by an external pass-through target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExternalCallError {
    #[error("reverted: {0}")]
    Reverted(String),
}
