use alloy_primitives::{Address, B256};
use clap::Parser;
use create2_deploy::{
    checksum, derive_address, factory::find_address_on_chain, parse_address, ChainClient, Salt,
};
use serde::Serialize;
use tracing::warn;

use crate::common::{print_json, CliError, FactoryArgs, InitCodeArgs, Result, RpcArgs, SaltArgs};

/// Compute the address a deployment would land at
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Factory configuration
    #[command(flatten)]
    pub factory_args: FactoryArgs,

    /// Salt configuration
    #[command(flatten)]
    pub salt_args: SaltArgs,

    /// Deployer the salt is built for (needed with --seed)
    #[arg(long = "deployer", env = "DEPLOYER_ADDRESS")]
    pub deployer: Option<String>,

    /// Init code configuration
    #[command(flatten)]
    pub init_code_args: InitCodeArgs,

    /// Also ask the factory on chain and compare
    #[arg(long = "on-chain")]
    pub on_chain: bool,

    /// Node connection, used with --on-chain
    #[command(flatten)]
    pub rpc_args: RpcArgs,
}

/// A predicted deployment address
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictOutput {
    /// Checksummed deployment address
    pub address: String,
    /// Factory address
    pub factory: String,
    /// Salt used
    pub salt: Salt,
    /// `keccak256` of the init code
    pub init_code_hash: B256,
    /// The address reported by the factory, when asked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_chain_address: Option<String>,
}

impl Cmd {
    /// Execute the predict command
    pub async fn run(&self) -> Result<()> {
        let mut output = self.execute()?;
        if self.on_chain {
            let client = self.rpc_args.read_only()?;
            self.compare_on_chain(&client, &mut output).await?;
        }
        print_json(&output)
    }

    /// Derives the address offline.
    pub fn execute(&self) -> Result<PredictOutput> {
        let factory = self.factory_args.address()?;
        let salt = self.salt_args.resolve(self.deployer()?)?;
        let init_code = self.init_code_args.init_code()?;
        let address = derive_address(factory, &salt, &init_code);

        Ok(PredictOutput {
            address: checksum(&address),
            factory: checksum(&factory),
            salt,
            init_code_hash: init_code.hash(),
            on_chain_address: None,
        })
    }

    /// Asks the factory for the same address and records its answer.
    pub async fn compare_on_chain<C: ChainClient>(
        &self,
        client: &C,
        output: &mut PredictOutput,
    ) -> Result<()> {
        let factory = self.factory_args.address()?;
        let init_code = self.init_code_args.init_code()?;
        let on_chain = find_address_on_chain(client, factory, &output.salt, &init_code).await?;
        let on_chain = checksum(&on_chain);
        // The factory answers with the zero address once the target is taken.
        if on_chain != output.address {
            warn!(predicted = %output.address, %on_chain, "Factory reports a different address");
        }
        output.on_chain_address = Some(on_chain);
        Ok(())
    }

    fn deployer(&self) -> Result<Address> {
        match (&self.deployer, &self.salt_args.seed) {
            (Some(deployer), _) => Ok(parse_address(deployer)?),
            (None, Some(_)) => {
                Err(CliError::InvalidInput("--deployer is required with --seed".into()))
            }
            // A full salt carries its deployer.
            (None, None) => Ok(Address::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use create2_deploy::test_utils::{
        MockChain, MOCK_FACTORY_ADDRESS, MOCK_SENDER, MOCK_TOKEN_BYTECODE,
    };

    fn cmd(seed: &str) -> Cmd {
        Cmd {
            factory_args: FactoryArgs { factory: MOCK_FACTORY_ADDRESS.to_string() },
            salt_args: SaltArgs { seed: Some(seed.into()), salt: None },
            deployer: Some(MOCK_SENDER.to_string()),
            init_code_args: InitCodeArgs {
                bytecode: Some(MOCK_TOKEN_BYTECODE.to_string()),
                bytecode_file: None,
                types: vec!["uint256".into()],
                args: vec!["100".into()],
            },
            on_chain: true,
            rpc_args: RpcArgs { rpc: "http://localhost:8545".into() },
        }
    }

    #[tokio::test]
    async fn test_prediction_matches_factory() {
        let cmd = cmd("hola");
        let mut output = cmd.execute().unwrap();
        cmd.compare_on_chain(&MockChain::default(), &mut output).await.unwrap();
        assert_eq!(output.on_chain_address.as_deref(), Some(output.address.as_str()));
    }

    #[test]
    fn test_full_salt_needs_no_deployer() {
        let seeded = cmd("7").execute().unwrap();

        let mut by_salt = cmd("7");
        by_salt.deployer = None;
        by_salt.salt_args = SaltArgs { seed: None, salt: Some(seeded.salt.to_string()) };
        assert_eq!(by_salt.execute().unwrap().address, seeded.address);

        let mut missing = cmd("7");
        missing.deployer = None;
        assert!(matches!(missing.execute(), Err(CliError::InvalidInput(_))));
    }
}
