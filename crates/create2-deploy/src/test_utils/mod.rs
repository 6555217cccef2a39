//! Test utilities: an in-memory chain with an emulated CREATE2 factory and a few mock contracts.

mod chain;
mod contracts;

pub use chain::*;
pub use contracts::*;
