use clap::Parser;
use create2_deploy::{
    checksum, factory::has_been_deployed_on_chain, is_deployed, parse_address, ChainClient,
};
use serde::Serialize;

use crate::common::{print_json, Result, RpcArgs};

/// Check whether a contract exists at an address
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Address to probe
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Also ask this factory whether it deployed to the address
    #[arg(long = "factory", env = "CREATE2_FACTORY_ADDRESS")]
    pub factory: Option<String>,

    /// Node connection
    #[command(flatten)]
    pub rpc_args: RpcArgs,
}

/// Probe result
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutput {
    /// Checksummed address
    pub address: String,
    /// Code exists at the address
    pub deployed: bool,
    /// The factory's own record, when a factory was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_record: Option<bool>,
}

impl Cmd {
    /// Execute the probe command
    pub async fn run(&self) -> Result<()> {
        let client = self.rpc_args.read_only()?;
        print_json(&self.execute(&client).await?)
    }

    /// Probes through `client`.
    pub async fn execute<C: ChainClient>(&self, client: &C) -> Result<ProbeOutput> {
        let address = parse_address(&self.address)?;
        let deployed = is_deployed(client, address).await?;
        let factory_record = match &self.factory {
            Some(factory) => {
                Some(has_been_deployed_on_chain(client, parse_address(factory)?, address).await?)
            }
            None => None,
        };
        Ok(ProbeOutput { address: checksum(&address), deployed, factory_record })
    }
}
