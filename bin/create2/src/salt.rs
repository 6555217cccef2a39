use std::str::FromStr;

use clap::Parser;
use create2_deploy::{checksum, decode_salt, encode_salt, parse_address, Salt, Seed};
use serde::Serialize;

use crate::common::{print_json, CliError, Result};

/// Encode a seed into a salt reserved for a deployer, or decode a salt
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Seed: a decimal or 0x-hex integer below 2^96, or any other text, which is hashed
    #[arg(value_name = "SEED", required_unless_present = "decode")]
    pub seed: Option<String>,

    /// Deployer the salt is reserved for. The zero address leaves the salt usable by anyone
    #[arg(long = "deployer", env = "DEPLOYER_ADDRESS")]
    pub deployer: Option<String>,

    /// Decode this salt instead of encoding one
    #[arg(long = "decode", value_name = "SALT", conflicts_with = "seed")]
    pub decode: Option<String>,
}

/// A salt and its two halves
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaltOutput {
    /// The full salt
    pub salt: Salt,
    /// Checksummed deployer embedded in the salt
    pub authorized_deployer: String,
    /// The 12 bytes after the deployer
    pub seed_tail: String,
    /// Whether any sender may use the salt
    pub unlocked: bool,
}

impl Cmd {
    /// Execute the salt command
    pub fn run(&self) -> Result<()> {
        print_json(&self.execute()?)
    }

    /// Encodes or decodes the salt.
    pub fn execute(&self) -> Result<SaltOutput> {
        let salt = match (&self.decode, &self.seed) {
            (Some(salt), _) => Salt::from_str(salt.trim())
                .map_err(|e| CliError::InvalidInput(format!("invalid salt '{salt}': {e}")))?,
            (None, Some(seed)) => {
                let deployer = self.deployer.as_deref().ok_or_else(|| {
                    CliError::InvalidInput("--deployer is required to encode a salt".into())
                })?;
                encode_salt(&seed.parse::<Seed>()?, parse_address(deployer)?)?
            }
            (None, None) => return Err(CliError::InvalidInput("a seed or --decode is required".into())),
        };

        let decoded = decode_salt(&salt);
        Ok(SaltOutput {
            salt,
            authorized_deployer: checksum(&decoded.authorized_deployer),
            seed_tail: decoded.seed_tail.to_string(),
            unlocked: salt.is_unlocked(),
        })
    }
}
