//! Ownership handover of contracts deployed through the factory.

use alloy_primitives::{address, Address};
use create2_deploy::{
    encode_salt, read_owner, AcceptOwnership, ActionError, DeployError, Deployer,
    DeploymentRequest, PostDeployAction, Seed, TransferOwnership,
    test_utils::{MockChain, MOCK_FACTORY_ADDRESS, MOCK_OWNABLE_BYTECODE, MOCK_SENDER},
};

const NEW_OWNER: Address = address!("0x3000000000000000000000000000000000000003");

/// The deployer passes its own address as the constructor argument.
fn ownable_request(seed: u64) -> DeploymentRequest {
    let salt = encode_salt(&Seed::from(seed), MOCK_SENDER).unwrap();
    DeploymentRequest::new(MOCK_FACTORY_ADDRESS, salt, MOCK_OWNABLE_BYTECODE)
        .with_constructor_strs(&["address"], &[MOCK_SENDER.to_string()])
}

#[tokio::test]
async fn test_plain_deploy_leaves_factory_as_owner() {
    let chain = MockChain::default();
    let result = Deployer::new(chain.clone()).deploy(&ownable_request(1)).await.unwrap();

    assert_eq!(read_owner(&chain, result.address).await.unwrap(), MOCK_FACTORY_ADDRESS);
}

#[tokio::test]
async fn test_transfer_and_accept_ownership() {
    let chain = MockChain::default();
    let request = ownable_request(2).with_transfer_ownership(true);

    let result =
        Deployer::new(chain.clone()).deploy_with(&request, &AcceptOwnership).await.unwrap();
    assert!(!result.already_deployed);
    assert!(result.post_deploy_receipt.is_some());
    assert_eq!(read_owner(&chain, result.address).await.unwrap(), MOCK_SENDER);
    // Deployment and acceptance.
    assert_eq!(chain.transaction_count(), 2);
}

#[tokio::test]
async fn test_accept_without_pending_transfer_fails() {
    let chain = MockChain::default();
    let request = ownable_request(3);

    let err = Deployer::new(chain.clone()).deploy_with(&request, &AcceptOwnership).await.unwrap_err();
    let DeployError::PostDeployActionFailed { address, source } = err else {
        panic!("expected PostDeployActionFailed")
    };
    assert!(matches!(source, ActionError::Chain(_)), "{source}");

    // The contract stays deployed.
    assert_eq!(address, request.predicted_address().unwrap());
    assert!(!chain.code_at(address).is_empty());
    assert_eq!(read_owner(&chain, address).await.unwrap(), MOCK_FACTORY_ADDRESS);
}

#[tokio::test]
async fn test_transfer_ownership_sets_pending_owner() {
    let chain = MockChain::default();
    let request = ownable_request(4).with_transfer_ownership(true);
    let deployer = Deployer::new(chain.clone());

    let result = deployer.deploy_with(&request, &AcceptOwnership).await.unwrap();
    let transfer = TransferOwnership { new_owner: NEW_OWNER };
    let receipt = transfer.run(&chain, result.address).await.unwrap().unwrap();
    assert_eq!(receipt.to, result.address);
    assert_eq!(read_owner(&chain, result.address).await.unwrap(), MOCK_SENDER);

    // The new owner completes the handover from its own account.
    let new_owner = chain.with_sender(NEW_OWNER);
    AcceptOwnership.run(&new_owner, result.address).await.unwrap();
    assert_eq!(read_owner(&chain, result.address).await.unwrap(), NEW_OWNER);

    // Accepting again is a no-op.
    assert!(AcceptOwnership.run(&new_owner, result.address).await.unwrap().is_none());
}
