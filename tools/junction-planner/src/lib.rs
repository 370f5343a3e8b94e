//! Client-side tooling for the Junction router: a typed builder for the
//! command stream and signing helpers for permit messages.
//!
//! The wire layout produced here is the layout the router's decoder
//! expects; both sides share `junction-types` so they cannot drift.

pub mod planner;
pub mod signing;


pub use planner::{encode_cl_path, exact_output_cl_path, RoutePlanner};
pub use signing::{sign_digest, sign_permit_batch, sign_permit_single, signer_address};
