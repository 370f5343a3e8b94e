//! Junction — an atomic settlement router.
//!
//! One call carries an opaque command stream: swaps across two exchange
//! designs, native wrap/unwrap, fee splitting, balance assertions, and
//! signature-authorized delegated transfers, executed in order under a
//! deadline, a re-entrancy lock, and a two-tier failure model (top-level
//! failures abort the call atomically; failures inside a nested sub-plan
//! are isolated to that sub-plan).
//!
//! The two exchange engines, and any third-party protocols reached through
//! pass-through calls, are external collaborators behind traits; this crate
//! owns the instruction decoding, dispatch, the allowance ledger, and the
//! payment utilities.

pub mod allowance;
pub mod decoder;
pub mod dispatcher;
pub mod errors;
pub mod externals;
pub mod payments;
pub mod state;
pub mod swap;
pub mod utils;

#[cfg(test)]
mod mock;

pub use allowance::{Allowance, AllowanceLedger};
pub use dispatcher::{Call, Router, RouterConfig};
pub use errors::{
    AllowanceError, CommandError, ExternalCallError, LedgerError, PaymentError, RouterError,
    SwapError, VenueError,
};
pub use externals::ExternalProtocol;
pub use state::{Ledger, State, NATIVE};
pub use swap::{path::TradePath, AmmVenue, ClmmVenue};
