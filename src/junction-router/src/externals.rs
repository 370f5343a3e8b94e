//! Pass-through calls to third-party protocols.
//!
//! The router only forwards a payload and optional native value to a
//! registered target; whatever the target does is its own business. A
//! target receives the router itself, which is exactly the surface a
//! malicious implementation would use to attempt re-entry — the execution
//! lock is what stops it.

use alloy_primitives::{Address, U256};

use crate::dispatcher::Router;
use crate::errors::ExternalCallError;
use crate::swap::{AmmVenue, ClmmVenue};

/// A third-party protocol reachable through the `CallExternal` command.
pub trait ExternalProtocol<A: AmmVenue, C: ClmmVenue> {
    /// Handle a pass-through call. Any attached native value has already
    /// been credited to the protocol's account.
    fn call(
        &self,
        router: &mut Router<A, C>,
        caller: Address,
        value: U256,
        payload: &[u8],
    ) -> Result<(), ExternalCallError>;
}
