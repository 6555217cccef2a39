//! Deterministic contract deployment through an immutable CREATE2 factory.
//!
//! The address of a deployment is known before it happens:
//!
//! ```text
//! address = keccak256(0xff ++ factory ++ salt ++ keccak256(bytecode ++ abi.encode(args)))[12..]
//! ```
//!
//! [`Deployer`] derives that address, skips the deployment if code is already there, submits it
//! through the factory otherwise, and optionally runs a [`PostDeployAction`] against the new
//! contract. The chain is reached only through the [`ChainClient`] trait.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod action;
pub use action::*;

mod address;
pub use address::*;

mod chain;
pub use chain::*;

mod deploy;
pub use deploy::*;

mod error;
pub use error::*;

pub mod factory;

mod initcode;
pub use initcode::*;

mod salt;
pub use salt::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
