//! Packed concentrated-liquidity routes.
//!
//! Layout: `token(20) ‖ fee(3) ‖ token(20) [‖ fee(3) ‖ token(20) …]`, fees
//! big-endian. Exact-output routes are encoded output token first because
//! required inputs are resolved tail-first.

use alloy_primitives::Address;

use crate::errors::SwapError;

const ADDR_BYTES: usize = 20;
const FEE_BYTES: usize = 3;
const HOP_BYTES: usize = ADDR_BYTES + FEE_BYTES;

/// A parsed route: `tokens.len() == fees.len() + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradePath {
    pub tokens: Vec<Address>,
    pub fees: Vec<u32>,
}

impl TradePath {
    pub fn parse(bytes: &[u8]) -> Result<Self, SwapError> {
        if bytes.len() < ADDR_BYTES + HOP_BYTES || (bytes.len() - ADDR_BYTES) % HOP_BYTES != 0 {
            return Err(SwapError::InvalidPath);
        }

        let mut tokens = vec![Address::from_slice(&bytes[..ADDR_BYTES])];
        let mut fees = Vec::new();
        let mut i = ADDR_BYTES;
        while i < bytes.len() {
            fees.push(u32::from_be_bytes([
                0,
                bytes[i],
                bytes[i + 1],
                bytes[i + 2],
            ]));
            i += FEE_BYTES;
            tokens.push(Address::from_slice(&bytes[i..i + ADDR_BYTES]));
            i += ADDR_BYTES;
        }
        Ok(Self { tokens, fees })
    }

    pub fn hops(&self) -> usize {
        self.fees.len()
    }
}
