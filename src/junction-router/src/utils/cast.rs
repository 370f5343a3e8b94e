use alloy_primitives::{aliases::U160, U256};

use crate::errors::AllowanceError;

/// Narrow a 256-bit amount to the permit amount width.
///
/// Overflow is an error, never a truncation: swap amounts routed through
/// the allowance ledger must fit the ledger's reduced width.
pub fn to_uint160(value: U256) -> Result<U160, AllowanceError> {
    if value > U256::from(U160::MAX) {
        return Err(AllowanceError::UnsafeCast);
    }
    Ok(U160::from(value))
}
