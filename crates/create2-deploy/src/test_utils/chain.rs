use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use alloy_primitives::{address, keccak256, Address, Bytes};
use alloy_sol_types::{SolCall, SolValue};

use super::{revert, MockContract, MockOwnable, MockToken, OpaqueContract};
use super::{MOCK_OWNABLE_BYTECODE, MOCK_TOKEN_BYTECODE};
use crate::{
    factory::{
        IImmutableCreate2Factory, IOwnable2Step, ALREADY_DEPLOYED_REASON, CREATION_FAILED_REASON,
        INVALID_SALT_REASON,
    },
    ChainClient, ChainError, Salt, TxReceipt, TxRequest,
};

/// Address the mock factory is installed at by [`MockChain::new`].
pub const MOCK_FACTORY_ADDRESS: Address = address!("0x0000000000FFe8B47B3e2130213B802212439497");

/// Default sender of a [`MockChain`].
pub const MOCK_SENDER: Address = address!("0x1000000000000000000000000000000000000001");

/// Gas below which a mock transaction runs out of gas.
pub const MOCK_INTRINSIC_GAS: u64 = 21_000;

type Constructor = Box<dyn Fn(&[u8], Address) -> Result<Box<dyn MockContract>, Bytes> + Send>;

struct Artifact {
    bytecode: Bytes,
    constructor: Constructor,
}

#[derive(Default)]
struct State {
    code: HashMap<Address, Bytes>,
    contracts: HashMap<Address, Box<dyn MockContract>>,
    factories: HashSet<Address>,
    artifacts: Vec<Artifact>,
    transactions: Vec<(Address, TxRequest)>,
    block_number: u64,
    fail_queries: bool,
    fail_sends: bool,
}

/// An in-memory chain implementing [`ChainClient`].
///
/// Holds runtime code per address, emulates the immutable CREATE2 factory at
/// [`MOCK_FACTORY_ADDRESS`], and instantiates registered contract artifacts when the factory
/// deploys init code that starts with their bytecode. Clones share the same chain; use
/// [`MockChain::with_sender`] to act as another account.
#[derive(Clone)]
pub struct MockChain {
    sender: Address,
    state: Arc<Mutex<State>>,
}

impl core::fmt::Debug for MockChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockChain").field("sender", &self.sender).finish_non_exhaustive()
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(MOCK_SENDER)
    }
}

impl MockChain {
    /// Creates a chain with the factory installed and the [`MockToken`] and [`MockOwnable`]
    /// artifacts registered.
    pub fn new(sender: Address) -> Self {
        Self::empty(sender)
            .factory(MOCK_FACTORY_ADDRESS)
            .artifact(MOCK_TOKEN_BYTECODE, |args, _deployer| {
                Ok(Box::new(MockToken::from_args(args)?) as Box<dyn MockContract>)
            })
            .artifact(MOCK_OWNABLE_BYTECODE, |args, deployer| {
                Ok(Box::new(MockOwnable::from_args(args, deployer)?) as Box<dyn MockContract>)
            })
    }

    /// Creates a chain without any code.
    pub fn empty(sender: Address) -> Self {
        Self { sender, state: Arc::default() }
    }

    /// A handle to the same chain sending from `sender`.
    pub fn with_sender(&self, sender: Address) -> Self {
        Self { sender, state: self.state.clone() }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Installs the factory at `address`.
    pub fn set_factory(&self, address: Address) {
        let mut state = self.state();
        state.factories.insert(address);
        state.code.insert(address, keccak256("ImmutableCreate2Factory").to_vec().into());
    }

    /// Installs the factory at `address`.
    pub fn factory(self, address: Address) -> Self {
        self.set_factory(address);
        self
    }

    /// Registers a contract the factory instantiates for init code starting with `bytecode`.
    /// The constructor receives the encoded arguments and the deploying address.
    pub fn set_artifact<F>(&self, bytecode: Bytes, constructor: F)
    where
        F: Fn(&[u8], Address) -> Result<Box<dyn MockContract>, Bytes> + Send + 'static,
    {
        self.state().artifacts.push(Artifact { bytecode, constructor: Box::new(constructor) });
    }

    /// Registers a contract the factory instantiates for init code starting with `bytecode`.
    pub fn artifact<F>(self, bytecode: Bytes, constructor: F) -> Self
    where
        F: Fn(&[u8], Address) -> Result<Box<dyn MockContract>, Bytes> + Send + 'static,
    {
        self.set_artifact(bytecode, constructor);
        self
    }

    /// Sets the code at `address`. The account behaves as a contract without functions.
    pub fn set_account_code(&self, address: Address, code: Bytes) {
        let mut state = self.state();
        state.code.insert(address, code);
        state.contracts.insert(address, Box::new(OpaqueContract));
    }

    /// Sets the code at `address`.
    pub fn account_code(self, address: Address, code: Bytes) -> Self {
        self.set_account_code(address, code);
        self
    }

    /// Makes `get_code` and `call` fail with a transport error.
    pub fn set_fail_queries(&self, fail: bool) {
        self.state().fail_queries = fail;
    }

    /// Makes `send_transaction` fail with a transport error.
    pub fn set_fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    /// Transactions confirmed so far, with their senders, in order.
    pub fn transactions(&self) -> Vec<(Address, TxRequest)> {
        self.state().transactions.clone()
    }

    /// Number of confirmed transactions.
    pub fn transaction_count(&self) -> usize {
        self.state().transactions.len()
    }

    /// Current block number.
    pub fn block_number(&self) -> u64 {
        self.state().block_number
    }

    /// Runtime code at `address`.
    pub fn code_at(&self, address: Address) -> Bytes {
        self.state().code.get(&address).cloned().unwrap_or_default()
    }
}

impl State {
    fn execute(
        &mut self,
        sender: Address,
        to: Address,
        input: &[u8],
        is_static: bool,
    ) -> Result<Bytes, Bytes> {
        if self.factories.contains(&to) {
            return self.execute_factory(to, sender, input, is_static);
        }
        match self.contracts.get_mut(&to) {
            Some(contract) => contract.execute(sender, input, is_static),
            // Calls to accounts without code succeed with empty output.
            None => Ok(Bytes::new()),
        }
    }

    fn execute_factory(
        &mut self,
        factory: Address,
        sender: Address,
        input: &[u8],
        is_static: bool,
    ) -> Result<Bytes, Bytes> {
        if input.starts_with(&IImmutableCreate2Factory::findCreate2AddressCall::SELECTOR) {
            let call = IImmutableCreate2Factory::findCreate2AddressCall::abi_decode(input)
                .map_err(|_| revert("factory: bad calldata"))?;
            let target = factory.create2_from_code(call.salt, &call.initCode);
            let found = if self.code.contains_key(&target) { Address::ZERO } else { target };
            return Ok(found.abi_encode().into());
        }
        if input.starts_with(&IImmutableCreate2Factory::hasBeenDeployedCall::SELECTOR) {
            let call = IImmutableCreate2Factory::hasBeenDeployedCall::abi_decode(input)
                .map_err(|_| revert("factory: bad calldata"))?;
            return Ok(self.code.contains_key(&call.deploymentAddress).abi_encode().into());
        }
        if is_static {
            return Err(revert("factory: state change in static call"));
        }

        let (salt, init_code, transfer) =
            if input.starts_with(&IImmutableCreate2Factory::safeCreate2Call::SELECTOR) {
                let call = IImmutableCreate2Factory::safeCreate2Call::abi_decode(input)
                    .map_err(|_| revert("factory: bad calldata"))?;
                (call.salt, call.initializationCode, false)
            } else if input.starts_with(&IImmutableCreate2Factory::safeCreate2AndTransferCall::SELECTOR)
            {
                let call = IImmutableCreate2Factory::safeCreate2AndTransferCall::abi_decode(input)
                    .map_err(|_| revert("factory: bad calldata"))?;
                (call.salt, call.initializationCode, true)
            } else {
                return Err(revert("factory: unknown selector"));
            };

        let salt = Salt::from(salt);
        if !salt.is_unlocked() && salt.deployer() != sender {
            return Err(revert(INVALID_SALT_REASON));
        }
        let target = factory.create2_from_code(salt.as_b256(), &init_code);
        if self.code.contains_key(&target) {
            return Err(revert(ALREADY_DEPLOYED_REASON));
        }

        let mut contract = self.instantiate(&init_code, factory)?;
        if transfer {
            let input = IOwnable2Step::transferOwnershipCall { newOwner: sender }.abi_encode();
            contract.execute(factory, &input, false)?;
        }

        self.code.insert(target, keccak256(&init_code).to_vec().into());
        self.contracts.insert(target, contract);
        Ok(target.abi_encode().into())
    }

    /// Runs the constructor of the artifact with the longest bytecode prefixing `init_code`.
    fn instantiate(
        &self,
        init_code: &[u8],
        deployer: Address,
    ) -> Result<Box<dyn MockContract>, Bytes> {
        if init_code.is_empty() {
            return Err(revert(CREATION_FAILED_REASON));
        }
        let artifact = self
            .artifacts
            .iter()
            .filter(|artifact| init_code.starts_with(&artifact.bytecode))
            .max_by_key(|artifact| artifact.bytecode.len());
        match artifact {
            Some(artifact) => (artifact.constructor)(&init_code[artifact.bytecode.len()..], deployer)
                .map_err(|_| revert(CREATION_FAILED_REASON)),
            None => Ok(Box::new(OpaqueContract)),
        }
    }
}

impl ChainClient for MockChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ChainError> {
        let state = self.state();
        if state.fail_queries {
            return Err(ChainError::Transport("connection refused".to_string()));
        }
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ChainError> {
        let mut state = self.state();
        if state.fail_queries {
            return Err(ChainError::Transport("connection refused".to_string()));
        }
        state
            .execute(self.sender, to, &input, true)
            .map_err(|data| ChainError::Reverted { data: Some(data) })
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxReceipt, ChainError> {
        let mut state = self.state();
        if state.fail_sends {
            return Err(ChainError::Transport("connection refused".to_string()));
        }
        if tx.gas_limit.is_some_and(|limit| limit < MOCK_INTRINSIC_GAS) {
            return Err(ChainError::Reverted { data: None });
        }
        state
            .execute(self.sender, tx.to, &tx.input, false)
            .map_err(|data| ChainError::Reverted { data: Some(data) })?;

        state.block_number += 1;
        let nonce = state.transactions.len() as u64;
        let transaction_hash =
            keccak256([self.sender.as_slice(), nonce.to_be_bytes().as_slice(), &tx.input[..]].concat());
        let receipt = TxReceipt {
            transaction_hash,
            block_number: Some(state.block_number),
            gas_used: MOCK_INTRINSIC_GAS + 16 * tx.input.len() as u64,
            from: self.sender,
            to: tx.to,
        };
        state.transactions.push((self.sender, tx));
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{bytes, B256, U256};

    #[tokio::test]
    async fn test_factory_rejects_foreign_salt() {
        let chain = MockChain::default();
        let other = address!("0x2000000000000000000000000000000000000002");
        let salt = Salt::from_parts(other, Default::default());
        let input = IImmutableCreate2Factory::safeCreate2Call {
            salt: salt.as_b256(),
            initializationCode: bytes!("6001"),
        }
        .abi_encode();

        let data = match chain.send_transaction(TxRequest::new(MOCK_FACTORY_ADDRESS, input)).await {
            Err(ChainError::Reverted { data }) => data,
            other => panic!("expected revert, got {other:?}"),
        };
        assert_eq!(crate::factory::revert_reason(data.as_ref()), INVALID_SALT_REASON);
        assert_eq!(chain.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_factory_deploys_registered_artifact() {
        let chain = MockChain::default();
        let salt = Salt::from(B256::ZERO);
        let init_code = [MOCK_TOKEN_BYTECODE.to_vec(), U256::from(7).abi_encode()].concat();
        let input = IImmutableCreate2Factory::safeCreate2Call {
            salt: salt.as_b256(),
            initializationCode: init_code.clone().into(),
        }
        .abi_encode();

        let receipt = chain.send_transaction(TxRequest::new(MOCK_FACTORY_ADDRESS, input)).await.unwrap();
        assert_eq!(receipt.block_number, Some(1));

        let target = MOCK_FACTORY_ADDRESS.create2_from_code(salt.as_b256(), &init_code);
        assert!(!chain.code_at(target).is_empty());
    }
}
