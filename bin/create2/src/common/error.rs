use alloy_primitives::hex::FromHexError;
use create2_deploy::DeployError;

/// Error types for the create2 commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Salt, encoding, chain or deployment failure
    #[error("{0}")]
    Deploy(#[from] DeployError),

    /// Failed to read file
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A search found nothing
    #[error("No match: {0}")]
    NoMatch(String),

    /// RPC setup error
    #[error("RPC error: {0}")]
    RpcError(String),

    /// Failed to render output
    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for the create2 commands
pub type Result<T> = std::result::Result<T, CliError>;
