//! The chain capability the deployer consumes, and the deployed-state probe built on it.

use core::future::Future;

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{ChainError, DeployError, Result};

/// A transaction to submit from the client's sender account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Recipient
    pub to: Address,
    /// Calldata
    pub input: Bytes,
    /// Gas limit override. `None` lets the client estimate.
    pub gas_limit: Option<u64>,
}

impl TxRequest {
    /// A call to `to` with `input`, with the gas limit left to the client.
    pub fn new(to: Address, input: impl Into<Bytes>) -> Self {
        Self { to, input: input.into(), gas_limit: None }
    }

    /// Sets the gas limit override.
    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}

/// The confirmed, successful outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Transaction hash
    pub transaction_hash: B256,
    /// Block the transaction was included in, when known
    pub block_number: Option<u64>,
    /// Gas used by the transaction
    pub gas_used: u64,
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
}

/// A connected chain client with a signing account.
///
/// Implementations serialize nonce assignment for their sender; the deployer never manages
/// nonces. A reverted transaction is reported as [`ChainError::Reverted`], never as a receipt.
pub trait ChainClient {
    /// The account transactions are sent from.
    fn sender(&self) -> Address;

    /// Returns the runtime code stored at `address` (empty when there is none).
    fn get_code(&self, address: Address) -> impl Future<Output = Result<Bytes, ChainError>> + Send;

    /// Executes a read-only call against the latest state.
    fn call(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, ChainError>> + Send;

    /// Signs, submits and waits for a transaction to be confirmed.
    fn send_transaction(
        &self,
        tx: TxRequest,
    ) -> impl Future<Output = Result<TxReceipt, ChainError>> + Send;
}

/// Returns whether code exists at `address`.
///
/// A failed query is an error, never "not deployed".
pub async fn is_deployed<C: ChainClient>(client: &C, address: Address) -> Result<bool> {
    let code = client.get_code(address).await.map_err(DeployError::ChainQuery)?;
    trace!(%address, code_len = code.len(), "Probed deployment address");
    Ok(!code.is_empty())
}
