//! `create2`: derive, search, probe and perform deterministic CREATE2 deployments from the
//! command line.
//!
//! Every command prints JSON to stdout. Logs go to stderr.

use clap::Parser;

mod cmd;
pub use cmd::*;

mod common;
mod deploy;
mod predict;
mod probe;
mod salt;
mod search;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    Cli::parse().run().await.inspect_err(|e| eprintln!("{e}"))
}
