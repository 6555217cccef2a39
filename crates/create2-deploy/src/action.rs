//! Actions run against a freshly deployed contract.
//!
//! An action runs once, after the deployment transaction is confirmed, with the same client (and
//! therefore the same sender). It is not atomic with the deployment: when it fails the contract
//! stays deployed and the caller gets [`DeployError::PostDeployActionFailed`].
//!
//! [`DeployError::PostDeployActionFailed`]: crate::DeployError::PostDeployActionFailed

use core::future::Future;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::{factory::IOwnable2Step, ActionError, ChainClient, TxReceipt, TxRequest};

/// A follow-up step executed against the deployed contract.
pub trait PostDeployAction {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the action against the contract at `address`. Returns the receipt of the
    /// transaction it sent, if any.
    fn run<C: ChainClient + Sync>(
        &self,
        client: &C,
        address: Address,
    ) -> impl Future<Output = Result<Option<TxReceipt>, ActionError>> + Send;
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAction;

impl PostDeployAction for NoAction {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn run<C: ChainClient + Sync>(
        &self,
        _client: &C,
        _address: Address,
    ) -> Result<Option<TxReceipt>, ActionError> {
        Ok(None)
    }
}

/// Completes a two-step ownership handover by calling `acceptOwnership()`, then reads `owner()`
/// back and requires it to be the sender.
///
/// Pairs with deploying through `safeCreate2AndTransfer`, which leaves the sender as the pending
/// owner. If the sender already owns the contract nothing is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptOwnership;

impl PostDeployAction for AcceptOwnership {
    fn name(&self) -> &'static str {
        "accept-ownership"
    }

    async fn run<C: ChainClient + Sync>(
        &self,
        client: &C,
        address: Address,
    ) -> Result<Option<TxReceipt>, ActionError> {
        let sender = client.sender();
        if read_owner(client, address).await? == sender {
            debug!(%address, %sender, "Sender already owns the contract");
            return Ok(None);
        }

        let input = IOwnable2Step::acceptOwnershipCall {}.abi_encode();
        let receipt = client.send_transaction(TxRequest::new(address, input)).await?;

        let owner = read_owner(client, address).await?;
        if owner != sender {
            return Err(ActionError::UnexpectedState(format!(
                "owner of {address} is {owner} after acceptOwnership, expected {sender}"
            )));
        }
        Ok(Some(receipt))
    }
}

/// Calls `transferOwnership(new_owner)`.
#[derive(Debug, Clone, Copy)]
pub struct TransferOwnership {
    /// The account ownership is handed to
    pub new_owner: Address,
}

impl PostDeployAction for TransferOwnership {
    fn name(&self) -> &'static str {
        "transfer-ownership"
    }

    async fn run<C: ChainClient + Sync>(
        &self,
        client: &C,
        address: Address,
    ) -> Result<Option<TxReceipt>, ActionError> {
        let input = IOwnable2Step::transferOwnershipCall { newOwner: self.new_owner }.abi_encode();
        let receipt = client.send_transaction(TxRequest::new(address, input)).await?;
        Ok(Some(receipt))
    }
}

/// Sends arbitrary calldata to the deployed contract.
#[derive(Debug, Clone)]
pub struct RawCall {
    /// Calldata
    pub input: Bytes,
}

impl PostDeployAction for RawCall {
    fn name(&self) -> &'static str {
        "raw-call"
    }

    async fn run<C: ChainClient + Sync>(
        &self,
        client: &C,
        address: Address,
    ) -> Result<Option<TxReceipt>, ActionError> {
        let receipt = client.send_transaction(TxRequest::new(address, self.input.clone())).await?;
        Ok(Some(receipt))
    }
}

/// Reads `owner()` from an `Ownable` contract.
pub async fn read_owner<C: ChainClient>(client: &C, contract: Address) -> Result<Address, ActionError> {
    let output = client.call(contract, IOwnable2Step::ownerCall {}.abi_encode().into()).await?;
    Ok(IOwnable2Step::ownerCall::abi_decode_returns(&output)?)
}
