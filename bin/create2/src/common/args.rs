use std::str::FromStr;

use alloy_primitives::{Address, Bytes};
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use create2_deploy::{
    assemble_from_strs, encode_salt, parse_address, ConstructorArgs, InitCode, Salt, Seed,
};

use super::{load_hex, CliError, Result, RpcChainClient};

/// Creation bytecode and constructor arguments
#[derive(Parser, Debug, Clone, Default)]
pub struct InitCodeArgs {
    /// Compiled creation bytecode as hex string (positional argument)
    #[arg(value_name = "BYTECODE")]
    pub bytecode: Option<String>,

    /// File containing the creation bytecode. If '-' is specified, it is read from stdin
    #[arg(long = "bytecode-file")]
    pub bytecode_file: Option<String>,

    /// Constructor parameter types, comma separated (e.g. `uint256,address`)
    #[arg(long = "types", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Constructor argument, one per type, in order
    #[arg(long = "arg", value_name = "VALUE")]
    pub args: Vec<String>,
}

impl InitCodeArgs {
    /// The creation bytecode without constructor arguments.
    pub fn bytecode(&self) -> Result<Bytes> {
        load_hex(self.bytecode.as_deref(), self.bytecode_file.as_deref())?.ok_or_else(|| {
            CliError::InvalidInput("bytecode is required (BYTECODE or --bytecode-file)".into())
        })
    }

    /// Constructor arguments as given on the command line.
    pub fn constructor(&self) -> ConstructorArgs {
        ConstructorArgs::Text { types: self.types.clone(), values: self.args.clone() }
    }

    /// Bytecode followed by the encoded constructor arguments.
    pub fn init_code(&self) -> Result<InitCode> {
        Ok(assemble_from_strs(&self.bytecode()?, &self.types, &self.args)?)
    }
}

/// How the deployment salt is chosen
#[derive(Parser, Debug, Clone, Default)]
pub struct SaltArgs {
    /// Salt seed: a decimal or 0x-hex integer below 2^96, or any other text, which is hashed
    #[arg(long = "seed", conflicts_with = "salt")]
    pub seed: Option<String>,

    /// Full 32-byte salt, used as is
    #[arg(long = "salt")]
    pub salt: Option<String>,
}

impl SaltArgs {
    /// Builds the salt for `deployer`.
    pub fn resolve(&self, deployer: Address) -> Result<Salt> {
        match (&self.salt, &self.seed) {
            (Some(salt), _) => Salt::from_str(salt.trim())
                .map_err(|e| CliError::InvalidInput(format!("invalid salt '{salt}': {e}"))),
            (None, Some(seed)) => Ok(encode_salt(&seed.parse::<Seed>()?, deployer)?),
            (None, None) => Err(CliError::InvalidInput("either --seed or --salt is required".into())),
        }
    }
}

/// The factory contract to deploy through
#[derive(Parser, Debug, Clone)]
pub struct FactoryArgs {
    /// Address of the immutable CREATE2 factory
    #[arg(long = "factory", env = "CREATE2_FACTORY_ADDRESS")]
    pub factory: String,
}

impl FactoryArgs {
    /// The parsed factory address.
    pub fn address(&self) -> Result<Address> {
        Ok(parse_address(&self.factory)?)
    }
}

/// Node connection
#[derive(Parser, Debug, Clone)]
pub struct RpcArgs {
    /// RPC URL of the node
    #[arg(long = "rpc", env = "RPC_URL", default_value = "http://localhost:8545")]
    pub rpc: String,
}

impl RpcArgs {
    /// A read-only client.
    pub fn read_only(&self) -> Result<RpcChainClient> {
        RpcChainClient::read_only(&self.rpc)
    }
}

/// The signing account
#[derive(Parser, Debug, Clone)]
pub struct SignerArgs {
    /// Hex private key of the deploying account
    #[arg(long = "private-key", env = "DEPLOYER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

impl SignerArgs {
    /// The parsed signer.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        self.private_key
            .trim()
            .parse()
            .map_err(|e| CliError::InvalidInput(format!("invalid private key: {e}")))
    }
}
