use alloy_primitives::B256;
use clap::Parser;
use create2_deploy::{
    checksum, AcceptOwnership, ChainClient, DeployOptions, Deployer, DeploymentRequest,
    DeploymentResult, Salt,
};
use serde::Serialize;
use tracing::info;

use crate::common::{
    print_json, FactoryArgs, InitCodeArgs, Result, RpcArgs, RpcChainClient, SaltArgs, SignerArgs,
};

/// Deploy a contract through the CREATE2 factory
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Node connection
    #[command(flatten)]
    pub rpc_args: RpcArgs,

    /// Signing account
    #[command(flatten)]
    pub signer_args: SignerArgs,

    /// Factory configuration
    #[command(flatten)]
    pub factory_args: FactoryArgs,

    /// Salt configuration. A seed is combined with the signer's address
    #[command(flatten)]
    pub salt_args: SaltArgs,

    /// Init code configuration
    #[command(flatten)]
    pub init_code_args: InitCodeArgs,

    /// Deploy with `safeCreate2AndTransfer` and accept ownership afterwards
    #[arg(long = "transfer-ownership")]
    pub transfer_ownership: bool,

    /// Submit without checking for existing code first
    #[arg(long = "no-probe")]
    pub no_probe: bool,

    /// Skip the code check after the deployment is confirmed
    #[arg(long = "no-verify")]
    pub no_verify: bool,

    /// Gas limit for the deployment transaction
    #[arg(long = "gas-limit")]
    pub gas_limit: Option<u64>,
}

/// Deployment summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutput {
    /// Checksummed contract address
    pub address: String,
    /// Salt used
    pub salt: Salt,
    /// `keccak256` of the init code
    pub init_code_hash: B256,
    /// The contract was already there
    pub already_deployed: bool,
    /// Deployment transaction hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    /// Block of the deployment transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Ownership acceptance transaction hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_transaction_hash: Option<B256>,
}

impl From<DeploymentResult> for DeployOutput {
    fn from(result: DeploymentResult) -> Self {
        Self {
            address: checksum(&result.address),
            salt: result.salt,
            init_code_hash: result.init_code_hash,
            already_deployed: result.already_deployed,
            transaction_hash: result.receipt.as_ref().map(|r| r.transaction_hash),
            block_number: result.receipt.as_ref().and_then(|r| r.block_number),
            ownership_transaction_hash: result.post_deploy_receipt.map(|r| r.transaction_hash),
        }
    }
}

impl Cmd {
    /// Execute the deploy command
    pub async fn run(&self) -> Result<()> {
        let client = RpcChainClient::with_signer(&self.rpc_args.rpc, self.signer_args.signer()?)?;
        print_json(&self.execute(client).await?)
    }

    /// Deploys through `client`, whose sender is the deployer.
    pub async fn execute<C: ChainClient + Sync>(&self, client: C) -> Result<DeployOutput> {
        let factory = self.factory_args.address()?;
        let sender = client.sender();
        let salt = self.salt_args.resolve(sender)?;

        let mut request =
            DeploymentRequest::new(factory, salt, self.init_code_args.bytecode()?)
                .with_transfer_ownership(self.transfer_ownership)
                .with_options(DeployOptions {
                    probe_before_submit: !self.no_probe,
                    verify_after_deploy: !self.no_verify,
                    gas_limit: self.gas_limit,
                });
        request.constructor = self.init_code_args.constructor();

        info!(%factory, %sender, %salt, "Deploying");
        let deployer = Deployer::new(client);
        let result = if self.transfer_ownership {
            deployer.deploy_with(&request, &AcceptOwnership).await?
        } else {
            deployer.deploy(&request).await?
        };
        Ok(result.into())
    }
}
