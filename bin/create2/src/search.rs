use clap::Parser;
use create2_deploy::{
    checksum, leading_zero_bytes, parse_address, search_leading_zeros, search_min_address, Salt,
};
use serde::Serialize;
use tracing::info;

use crate::common::{print_json, CliError, FactoryArgs, InitCodeArgs, Result};

/// Search integer seeds for a vanity deployment address
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Factory configuration
    #[command(flatten)]
    pub factory_args: FactoryArgs,

    /// Deployer the salts are built for
    #[arg(long = "deployer", env = "DEPLOYER_ADDRESS")]
    pub deployer: String,

    /// Init code configuration
    #[command(flatten)]
    pub init_code_args: InitCodeArgs,

    /// First seed to try
    #[arg(long = "start", default_value = "0")]
    pub start: u64,

    /// Number of seeds to try
    #[arg(long = "count", default_value = "300")]
    pub count: u64,

    /// Stop at the first address with at least this many leading zero bytes. Without it, the
    /// smallest address in the range is returned
    #[arg(long = "zero-bytes")]
    pub zero_bytes: Option<usize>,
}

/// The winning seed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutput {
    /// Integer seed
    pub seed: u64,
    /// Salt built from the seed
    pub salt: Salt,
    /// Checksummed deployment address
    pub address: String,
    /// Leading zero bytes of the address
    pub leading_zero_bytes: usize,
}

impl Cmd {
    /// Execute the search command
    pub fn run(&self) -> Result<()> {
        print_json(&self.execute()?)
    }

    /// Runs the search.
    pub fn execute(&self) -> Result<SearchOutput> {
        let factory = self.factory_args.address()?;
        let deployer = parse_address(&self.deployer)?;
        let init_code = self.init_code_args.init_code()?;
        let end = self
            .start
            .checked_add(self.count)
            .ok_or_else(|| CliError::InvalidInput("--start + --count overflows".into()))?;
        let seeds = self.start..end;

        info!(%factory, %deployer, start = self.start, end, "Searching seeds");
        let found = match self.zero_bytes {
            Some(zero_bytes) => {
                search_leading_zeros(factory, deployer, &init_code, zero_bytes, seeds)?
            }
            None => search_min_address(factory, deployer, &init_code, seeds)?,
        };
        let found = found.ok_or_else(|| {
            CliError::NoMatch(format!("no matching seed in {}..{end}", self.start))
        })?;

        Ok(SearchOutput {
            seed: found.seed,
            salt: found.salt,
            address: checksum(&found.address),
            leading_zero_bytes: leading_zero_bytes(&found.address),
        })
    }
}
