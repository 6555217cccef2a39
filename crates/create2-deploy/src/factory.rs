//! Bindings for the immutable CREATE2 factory and the ownership surface of deployed contracts.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};

use crate::{ChainClient, ChainError, DeployError, InitCode, Result, Salt};

sol! {
    /// The immutable CREATE2 factory.
    ///
    /// `safeCreate2*` revert when the salt's first 20 bytes are neither the caller nor zero, and
    /// when the target address already holds a deployment.
    #[allow(missing_docs)]
    interface IImmutableCreate2Factory {
        function safeCreate2(bytes32 salt, bytes calldata initializationCode)
            external
            payable
            returns (address deploymentAddress);

        /// Deploys, then calls `transferOwnership(msg.sender)` on the new contract.
        function safeCreate2AndTransfer(bytes32 salt, bytes calldata initializationCode)
            external
            payable
            returns (address deploymentAddress);

        function findCreate2Address(bytes32 salt, bytes calldata initCode)
            external
            view
            returns (address deploymentAddress);

        function hasBeenDeployed(address deploymentAddress) external view returns (bool);
    }

    /// Two-step ownership as implemented by `Ownable2Step`.
    #[allow(missing_docs)]
    interface IOwnable2Step {
        function owner() external view returns (address);
        function pendingOwner() external view returns (address);
        function transferOwnership(address newOwner) external;
        function acceptOwnership() external;
    }
}

/// Revert reason of `safeCreate2*` when the salt is reserved for another caller.
pub const INVALID_SALT_REASON: &str =
    "Invalid salt - first 20 bytes of the salt must match calling address.";

/// Revert reason of `safeCreate2*` when the target address is already taken.
pub const ALREADY_DEPLOYED_REASON: &str =
    "Invalid contract creation - contract has already been deployed.";

/// Revert reason of `safeCreate2*` when contract creation itself failed.
pub const CREATION_FAILED_REASON: &str =
    "Failed to deploy contract using provided salt and initialization code.";

/// Calldata for the factory's deployment entry point. With `transfer_ownership` the factory
/// hands ownership of the new contract to the caller in the same transaction.
pub fn deploy_calldata(salt: &Salt, init_code: &InitCode, transfer_ownership: bool) -> Bytes {
    let initialization_code = init_code.bytes().clone();
    let encoded = if transfer_ownership {
        IImmutableCreate2Factory::safeCreate2AndTransferCall {
            salt: salt.as_b256(),
            initializationCode: initialization_code,
        }
        .abi_encode()
    } else {
        IImmutableCreate2Factory::safeCreate2Call {
            salt: salt.as_b256(),
            initializationCode: initialization_code,
        }
        .abi_encode()
    };
    encoded.into()
}

/// Asks the factory itself where it would deploy `init_code` for `salt`.
pub async fn find_address_on_chain<C: ChainClient>(
    client: &C,
    factory: Address,
    salt: &Salt,
    init_code: &InitCode,
) -> Result<Address> {
    let input = IImmutableCreate2Factory::findCreate2AddressCall {
        salt: salt.as_b256(),
        initCode: init_code.bytes().clone(),
    }
    .abi_encode();
    let output = client.call(factory, input.into()).await.map_err(DeployError::ChainQuery)?;
    IImmutableCreate2Factory::findCreate2AddressCall::abi_decode_returns(&output)
        .map_err(|e| malformed_output("findCreate2Address", e))
}

/// Asks the factory whether it has deployed to `address`.
pub async fn has_been_deployed_on_chain<C: ChainClient>(
    client: &C,
    factory: Address,
    address: Address,
) -> Result<bool> {
    let input =
        IImmutableCreate2Factory::hasBeenDeployedCall { deploymentAddress: address }.abi_encode();
    let output = client.call(factory, input.into()).await.map_err(DeployError::ChainQuery)?;
    IImmutableCreate2Factory::hasBeenDeployedCall::abi_decode_returns(&output)
        .map_err(|e| malformed_output("hasBeenDeployed", e))
}

/// Renders revert data as text: the `Error(string)`/`Panic(uint256)` message when the data
/// decodes as one, the hex payload otherwise.
pub fn revert_reason(data: Option<&Bytes>) -> String {
    match data {
        None => "execution reverted without data".to_string(),
        Some(data) if data.is_empty() => "execution reverted without data".to_string(),
        Some(data) => alloy_sol_types::decode_revert_reason(data)
            .unwrap_or_else(|| format!("execution reverted with data {data}")),
    }
}

/// Whether a revert reason is the factory's "already deployed" rejection.
pub fn is_already_deployed_reason(reason: &str) -> bool {
    reason.contains(ALREADY_DEPLOYED_REASON)
}

fn malformed_output(function: &str, err: alloy_sol_types::Error) -> DeployError {
    DeployError::ChainQuery(ChainError::Transport(format!("malformed {function} output: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{bytes, B256};
    use alloy_sol_types::{Revert, SolError};

    #[test]
    fn test_deploy_calldata_selects_entry_point() {
        let salt = Salt::from(B256::repeat_byte(1));
        let code = InitCode::from(bytes!("6080"));

        let plain = deploy_calldata(&salt, &code, false);
        assert_eq!(plain[..4], IImmutableCreate2Factory::safeCreate2Call::SELECTOR);
        let decoded = IImmutableCreate2Factory::safeCreate2Call::abi_decode(&plain).unwrap();
        assert_eq!(decoded.salt, salt.as_b256());
        assert_eq!(decoded.initializationCode, bytes!("6080"));

        let transfer = deploy_calldata(&salt, &code, true);
        assert_eq!(transfer[..4], IImmutableCreate2Factory::safeCreate2AndTransferCall::SELECTOR);
    }

    #[test]
    fn test_revert_reason_decoding() {
        let data: Bytes = Revert { reason: ALREADY_DEPLOYED_REASON.to_string() }.abi_encode().into();
        let reason = revert_reason(Some(&data));
        assert!(is_already_deployed_reason(&reason), "{reason}");

        assert_eq!(revert_reason(None), "execution reverted without data");
        assert!(revert_reason(Some(&bytes!("deadbeef"))).contains("0xdeadbeef"));
    }
}
