//! Repository Ports
//!
//! Abstract interfaces for the two storage tiers.

mod durable_store;
mod fast_store;

pub use durable_store::*;
pub use fast_store::*;
