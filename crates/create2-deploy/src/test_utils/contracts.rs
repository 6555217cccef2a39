use alloy_primitives::{bytes, Address, Bytes, U256};
use alloy_sol_types::{sol, Revert, SolCall, SolError, SolValue};

use crate::factory::IOwnable2Step;

sol! {
    #[allow(missing_docs)]
    interface IMockToken {
        function totalSupply() external view returns (uint256);
    }
}

/// Creation bytecode of [`MockToken`]. Its constructor takes `uint256 supply`.
pub const MOCK_TOKEN_BYTECODE: Bytes = bytes!("60806040523480156100105760006000fd5b50600a");

/// Creation bytecode of [`MockOwnable`]. Its constructor takes `address connector`.
pub const MOCK_OWNABLE_BYTECODE: Bytes = bytes!("60806040523480156100105760006000fd5b50600b");

/// Behavior of a contract living on a [`MockChain`](super::MockChain).
pub trait MockContract: Send {
    /// Executes `input` sent by `sender`. `Err` carries revert data. A static call must not
    /// change state.
    fn execute(&mut self, sender: Address, input: &[u8], is_static: bool) -> Result<Bytes, Bytes>;
}

/// A contract without any behavior: every call returns empty data.
#[derive(Debug, Default)]
pub struct OpaqueContract;

impl MockContract for OpaqueContract {
    fn execute(&mut self, _sender: Address, _input: &[u8], _is_static: bool) -> Result<Bytes, Bytes> {
        Ok(Bytes::new())
    }
}

/// A token whose constructor mints `supply` whole tokens (18 decimals).
#[derive(Debug)]
pub struct MockToken {
    total_supply: U256,
}

impl MockToken {
    /// Decodes the constructor arguments.
    pub fn from_args(args: &[u8]) -> Result<Self, Bytes> {
        let supply = U256::abi_decode(args).map_err(|_| revert("MockToken: bad constructor args"))?;
        Ok(Self { total_supply: supply * U256::from(10).pow(U256::from(18)) })
    }
}

impl MockContract for MockToken {
    fn execute(&mut self, _sender: Address, input: &[u8], _is_static: bool) -> Result<Bytes, Bytes> {
        if input.starts_with(&IMockToken::totalSupplyCall::SELECTOR) {
            return Ok(self.total_supply.abi_encode().into());
        }
        Err(revert("MockToken: unknown selector"))
    }
}

/// A two-step `Ownable` contract. The deployer (`msg.sender` of the creation, i.e. the factory)
/// becomes the initial owner.
#[derive(Debug)]
pub struct MockOwnable {
    owner: Address,
    pending_owner: Address,
    connector: Address,
}

impl MockOwnable {
    /// Decodes the constructor arguments.
    pub fn from_args(args: &[u8], deployer: Address) -> Result<Self, Bytes> {
        let connector =
            Address::abi_decode(args).map_err(|_| revert("MockOwnable: bad constructor args"))?;
        if connector == Address::ZERO {
            return Err(revert("MockOwnable: zero connector"));
        }
        Ok(Self { owner: deployer, pending_owner: Address::ZERO, connector })
    }

    /// The address passed to the constructor.
    pub fn connector(&self) -> Address {
        self.connector
    }
}

impl MockContract for MockOwnable {
    fn execute(&mut self, sender: Address, input: &[u8], is_static: bool) -> Result<Bytes, Bytes> {
        if input.starts_with(&IOwnable2Step::ownerCall::SELECTOR) {
            return Ok(self.owner.abi_encode().into());
        }
        if input.starts_with(&IOwnable2Step::pendingOwnerCall::SELECTOR) {
            return Ok(self.pending_owner.abi_encode().into());
        }
        if is_static {
            return Err(revert("MockOwnable: state change in static call"));
        }
        if input.starts_with(&IOwnable2Step::transferOwnershipCall::SELECTOR) {
            let call = IOwnable2Step::transferOwnershipCall::abi_decode(input)
                .map_err(|_| revert("MockOwnable: bad calldata"))?;
            if sender != self.owner {
                return Err(revert("Ownable: caller is not the owner"));
            }
            self.pending_owner = call.newOwner;
            return Ok(Bytes::new());
        }
        if input.starts_with(&IOwnable2Step::acceptOwnershipCall::SELECTOR) {
            if sender != self.pending_owner {
                return Err(revert("Ownable2Step: caller is not the new owner"));
            }
            self.owner = sender;
            self.pending_owner = Address::ZERO;
            return Ok(Bytes::new());
        }
        Err(revert("MockOwnable: unknown selector"))
    }
}

/// ABI-encoded `Error(string)` revert data.
pub fn revert(reason: &str) -> Bytes {
    Revert { reason: reason.to_string() }.abi_encode().into()
}
