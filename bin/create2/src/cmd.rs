use clap::{Parser, Subcommand};

use crate::common::{CliError, LogArgs};

/// Deterministic contract deployment through an immutable CREATE2 factory
#[derive(Parser, Debug)]
#[command(name = "create2", version, infer_subcommands = true)]
pub struct Cli {
    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,

    /// Command to run
    #[command(subcommand)]
    pub cmd: MainCmd,
}

/// Main command enumeration for the create2 CLI tool
#[derive(Subcommand, Debug)]
pub enum MainCmd {
    /// Encode or decode a salt
    Salt(crate::salt::Cmd),
    /// Compute a deployment address
    Predict(crate::predict::Cmd),
    /// Search seeds for a vanity address
    Search(crate::search::Cmd),
    /// Check whether code exists at an address
    Probe(crate::probe::Cmd),
    /// Deploy a contract through the factory
    Deploy(crate::deploy::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command error
    #[error("{0}")]
    Cli(#[from] CliError),
}

impl Cli {
    /// Execute the main command
    pub async fn run(&self) -> Result<(), Error> {
        self.log_args.init()?;
        match &self.cmd {
            MainCmd::Salt(cmd) => cmd.run()?,
            MainCmd::Predict(cmd) => cmd.run().await?,
            MainCmd::Search(cmd) => cmd.run()?,
            MainCmd::Probe(cmd) => cmd.run().await?,
            MainCmd::Deploy(cmd) => cmd.run().await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "create2",
            "-vvv",
            "deploy",
            "--rpc",
            "http://127.0.0.1:8545",
            "--private-key",
            "0x01",
            "--factory",
            "0x0000000000FFe8B47B3e2130213B802212439497",
            "--seed",
            "hola",
            "--types",
            "uint256,address",
            "--arg",
            "100",
            "--arg",
            "0x00000000000000000000000000000000000c0ffe",
            "--transfer-ownership",
            "0x6080",
        ])
        .unwrap();

        assert_eq!(cli.log_args.verbose, 3);
        let MainCmd::Deploy(cmd) = cli.cmd else { panic!("expected deploy") };
        assert_eq!(cmd.init_code_args.types, ["uint256", "address"]);
        assert_eq!(cmd.init_code_args.args.len(), 2);
        assert_eq!(cmd.init_code_args.bytecode.as_deref(), Some("0x6080"));
        assert!(cmd.transfer_ownership);
        assert!(!cmd.no_probe);
    }

    #[test]
    fn test_seed_and_salt_conflict() {
        let res = Cli::try_parse_from([
            "create2",
            "predict",
            "--factory",
            "0x0000000000FFe8B47B3e2130213B802212439497",
            "--seed",
            "1",
            "--salt",
            "0x00",
            "0x6080",
        ]);
        assert!(res.is_err());
    }
}
