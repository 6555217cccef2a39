//! Error types for deterministic deployments.

use alloy_primitives::{Address, Bytes};

/// Failure reported by a [`ChainClient`](crate::ChainClient) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The request never reached the chain or its response could not be read (network,
    /// timeout, malformed response).
    #[error("transport error: {0}")]
    Transport(String),

    /// The chain executed the transaction (or its gas estimation) and it reverted.
    #[error("execution reverted")]
    Reverted {
        /// Raw revert data, if the client was able to recover it.
        data: Option<Bytes>,
    },
}

/// Error types for the deployment pipeline.
///
/// Every variant is reported before the next stage of the pipeline starts, so the variant tells
/// the caller how far a request got: salt and assembly errors never touch the chain, while
/// [`DeployError::PostDeployActionFailed`] means the contract exists at `address`.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The salt seed is not a non-negative integer fitting the salt tail, or an unusable label.
    #[error("invalid seed '{seed}': {reason}")]
    InvalidSeed {
        /// The seed as supplied by the caller
        seed: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A textual address is not a well-formed 20-byte hex address.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// The number of constructor types and constructor arguments differ.
    #[error("constructor arity mismatch: {expected} types but {got} arguments")]
    ArityMismatch {
        /// Number of declared constructor types
        expected: usize,
        /// Number of supplied constructor arguments
        got: usize,
    },

    /// A constructor argument does not match its declared type.
    #[error("constructor argument encoding error: {0}")]
    Encoding(String),

    /// The salt embeds a deployer that is neither the sender nor the unlocked sentinel, so the
    /// factory would reject it.
    #[error("salt is reserved for {salt_deployer}, but the sender is {sender}")]
    SaltSenderMismatch {
        /// The deployer embedded in the salt
        salt_deployer: Address,
        /// The account that would submit the deployment
        sender: Address,
    },

    /// A read-only chain query failed. Retrying the whole request is safe.
    #[error("chain query failed: {0}")]
    ChainQuery(#[source] ChainError),

    /// The factory rejected the deployment and no code exists at the predicted address.
    #[error("deployment to {address} reverted: {reason}")]
    DeploymentReverted {
        /// The predicted deployment address
        address: Address,
        /// Decoded revert reason
        reason: String,
    },

    /// The deployment transaction could not be submitted or its receipt could not be read. The
    /// transaction may still be pending or mined; probe `address` before retrying.
    #[error("deployment to {address} could not be submitted: {source}")]
    SubmissionFailed {
        /// The predicted deployment address
        address: Address,
        /// The client failure
        #[source]
        source: ChainError,
    },

    /// The deployment succeeded but the post-deploy action did not complete.
    #[error("contract deployed at {address} but the post-deploy action failed: {source}")]
    PostDeployActionFailed {
        /// Address of the deployed contract
        address: Address,
        /// The underlying failure
        #[source]
        source: ActionError,
    },
}

/// Failure of a [`PostDeployAction`](crate::PostDeployAction).
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The action's transaction or read-back query failed.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The action completed but the contract's state is not what the action expected.
    #[error("unexpected contract state: {0}")]
    UnexpectedState(String),

    /// The contract returned data the action could not decode.
    #[error("failed to decode contract output: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

/// Result type for deployment operations.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;
