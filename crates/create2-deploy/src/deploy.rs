//! The deployment workflow: assemble, derive, probe, submit, run the post-deploy action.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    assemble, assemble_from_strs, derive_address,
    factory::{deploy_calldata, is_already_deployed_reason, revert_reason},
    is_deployed, ChainClient, ChainError, DeployError, InitCode, NoAction, PostDeployAction,
    Result, Salt, TxReceipt, TxRequest,
};

/// Knobs for a single deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOptions {
    /// Check for existing code before submitting. Without it, a repeated deployment is
    /// detected from the factory's revert instead.
    pub probe_before_submit: bool,
    /// Check that code exists at the predicted address once the deployment is confirmed.
    pub verify_after_deploy: bool,
    /// Gas limit for the deployment transaction. `None` lets the client estimate.
    pub gas_limit: Option<u64>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self { probe_before_submit: true, verify_after_deploy: true, gas_limit: None }
    }
}

/// Constructor arguments of a deployment request.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructorArgs {
    /// Already typed values.
    Typed {
        /// Declared parameter types
        types: Vec<DynSolType>,
        /// Values, one per type
        values: Vec<DynSolValue>,
    },
    /// Type tags and values as strings.
    Text {
        /// Type tags such as `uint256` or `address`
        types: Vec<String>,
        /// Values, one per type tag
        values: Vec<String>,
    },
}

impl Default for ConstructorArgs {
    fn default() -> Self {
        Self::Typed { types: Vec::new(), values: Vec::new() }
    }
}

/// Everything needed to deploy one contract through the factory.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRequest {
    /// Factory address
    pub factory: Address,
    /// Deployment salt
    pub salt: Salt,
    /// Compiled creation bytecode, without constructor arguments
    pub bytecode: Bytes,
    /// Constructor arguments appended to `bytecode`
    pub constructor: ConstructorArgs,
    /// Deploy through `safeCreate2AndTransfer`, handing ownership to the sender
    pub transfer_ownership: bool,
    /// Options
    pub options: DeployOptions,
}

impl DeploymentRequest {
    /// A request for `bytecode` without constructor arguments.
    pub fn new(factory: Address, salt: Salt, bytecode: impl Into<Bytes>) -> Self {
        Self {
            factory,
            salt,
            bytecode: bytecode.into(),
            constructor: ConstructorArgs::default(),
            transfer_ownership: false,
            options: DeployOptions::default(),
        }
    }

    /// Sets typed constructor arguments.
    pub fn with_constructor(mut self, types: Vec<DynSolType>, values: Vec<DynSolValue>) -> Self {
        self.constructor = ConstructorArgs::Typed { types, values };
        self
    }

    /// Sets constructor arguments given as strings.
    pub fn with_constructor_strs<T, V>(mut self, types: &[T], values: &[V]) -> Self
    where
        T: AsRef<str>,
        V: AsRef<str>,
    {
        self.constructor = ConstructorArgs::Text {
            types: types.iter().map(|t| t.as_ref().to_string()).collect(),
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        };
        self
    }

    /// Requests that the factory transfer ownership of the new contract to the sender.
    pub fn with_transfer_ownership(mut self, transfer_ownership: bool) -> Self {
        self.transfer_ownership = transfer_ownership;
        self
    }

    /// Sets the options.
    pub fn with_options(mut self, options: DeployOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the init code: bytecode followed by the encoded constructor arguments.
    pub fn init_code(&self) -> Result<InitCode> {
        match &self.constructor {
            ConstructorArgs::Typed { types, values } => assemble(&self.bytecode, types, values),
            ConstructorArgs::Text { types, values } => {
                assemble_from_strs(&self.bytecode, types, values)
            }
        }
    }

    /// The address this request deploys to.
    pub fn predicted_address(&self) -> Result<Address> {
        Ok(derive_address(self.factory, &self.salt, &self.init_code()?))
    }
}

/// The outcome of a deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    /// Address of the contract
    pub address: Address,
    /// Salt used
    pub salt: Salt,
    /// `keccak256` of the init code
    pub init_code_hash: B256,
    /// The contract was already there; nothing was deployed by this request
    pub already_deployed: bool,
    /// Receipt of the deployment transaction, if one was confirmed
    pub receipt: Option<TxReceipt>,
    /// Receipt of the post-deploy action's transaction, if it sent one
    pub post_deploy_receipt: Option<TxReceipt>,
}

/// Deploys contracts through a CREATE2 factory with a chain client.
#[derive(Debug, Clone)]
pub struct Deployer<C> {
    client: C,
}

impl<C: ChainClient + Sync> Deployer<C> {
    /// Creates a deployer over `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The chain client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Consumes the deployer and returns the client.
    pub fn into_client(self) -> C {
        self.client
    }

    /// Deploys `request` unless its predicted address already holds code.
    pub async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentResult> {
        self.deploy_with(request, &NoAction).await
    }

    /// Deploys `request`, then runs `action` against the new contract.
    ///
    /// The action is skipped when the contract already existed.
    pub async fn deploy_with<A: PostDeployAction>(
        &self,
        request: &DeploymentRequest,
        action: &A,
    ) -> Result<DeploymentResult> {
        // Step 1: assemble the init code
        let init_code = request.init_code()?;

        // Step 2: derive the deployment address
        let address = derive_address(request.factory, &request.salt, &init_code);
        let mut result = DeploymentResult {
            address,
            salt: request.salt,
            init_code_hash: init_code.hash(),
            already_deployed: false,
            receipt: None,
            post_deploy_receipt: None,
        };
        debug!(
            factory = %request.factory,
            salt = %request.salt,
            init_code_hash = %result.init_code_hash,
            %address,
            "Derived deployment address"
        );

        // Step 3: probe
        if request.options.probe_before_submit && is_deployed(&self.client, address).await? {
            info!(%address, "Contract already deployed, skipping");
            result.already_deployed = true;
            return Ok(result);
        }

        // Step 4: the factory would reject a salt reserved for someone else
        request.salt.check_sender(self.client.sender())?;

        // Step 5: submit
        let tx = TxRequest::new(
            request.factory,
            deploy_calldata(&request.salt, &init_code, request.transfer_ownership),
        )
        .with_gas_limit(request.options.gas_limit);

        match self.client.send_transaction(tx).await {
            Ok(receipt) => {
                info!(%address, tx_hash = %receipt.transaction_hash, "Deployed contract");
                result.receipt = Some(receipt);
            }
            Err(ChainError::Reverted { data }) => {
                let reason = revert_reason(data.as_ref());
                // Someone (possibly an earlier attempt of ours) got there first.
                if is_deployed(&self.client, address).await? {
                    if !is_already_deployed_reason(&reason) {
                        warn!(%address, %reason, "Deployment reverted but code is present");
                    }
                    info!(%address, "Contract already deployed by another transaction");
                    result.already_deployed = true;
                    return Ok(result);
                }
                return Err(DeployError::DeploymentReverted { address, reason });
            }
            Err(err @ ChainError::Transport(_)) => {
                return Err(DeployError::SubmissionFailed { address, source: err });
            }
        }

        if request.options.verify_after_deploy && !is_deployed(&self.client, address).await? {
            return Err(DeployError::DeploymentReverted {
                address,
                reason: "deployment confirmed but no code at the predicted address".to_string(),
            });
        }

        // Step 6: post-deploy action
        debug!(%address, action = action.name(), "Running post-deploy action");
        result.post_deploy_receipt = action
            .run(&self.client, address)
            .await
            .map_err(|source| DeployError::PostDeployActionFailed { address, source })?;

        Ok(result)
    }
}
