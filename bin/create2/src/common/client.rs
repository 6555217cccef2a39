//! [`ChainClient`] over a JSON-RPC endpoint.

use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use create2_deploy::{ChainClient, ChainError, TxReceipt, TxRequest};
use tracing::debug;

use super::{CliError, Result};

/// A chain client talking to an HTTP JSON-RPC node. Transactions are signed locally.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    sender: Address,
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient").field("sender", &self.sender).finish_non_exhaustive()
    }
}

impl RpcChainClient {
    /// A client that can only read. Its sender is the zero address.
    pub fn read_only(rpc: &str) -> Result<Self> {
        let url = rpc.parse().map_err(|e| invalid_url(rpc, e))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider, sender: Address::ZERO })
    }

    /// A client sending transactions signed by `signer`.
    pub fn with_signer(rpc: &str, signer: PrivateKeySigner) -> Result<Self> {
        let url = rpc.parse().map_err(|e| invalid_url(rpc, e))?;
        let sender = signer.address();
        let provider =
            ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased();
        Ok(Self { provider, sender })
    }
}

fn invalid_url(rpc: &str, err: impl std::fmt::Display) -> CliError {
    CliError::RpcError(format!("Invalid RPC URL '{rpc}': {err}"))
}

/// Maps an RPC failure to a revert when the node reports one, to a transport error otherwise.
fn classify(err: TransportError) -> ChainError {
    let Some(payload) = err.as_error_resp() else {
        return ChainError::Transport(err.to_string());
    };
    match payload.as_revert_data() {
        Some(data) => ChainError::Reverted { data: Some(data) },
        None if payload.message.contains("revert") => ChainError::Reverted { data: None },
        None => ChainError::Transport(err.to_string()),
    }
}

impl ChainClient for RpcChainClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn get_code(&self, address: Address) -> std::result::Result<Bytes, ChainError> {
        self.provider.get_code_at(address).await.map_err(|e| ChainError::Transport(e.to_string()))
    }

    async fn call(&self, to: Address, input: Bytes) -> std::result::Result<Bytes, ChainError> {
        let request = TransactionRequest::default().with_to(to).with_input(input);
        self.provider.call(request).await.map_err(classify)
    }

    async fn send_transaction(&self, tx: TxRequest) -> std::result::Result<TxReceipt, ChainError> {
        let mut request =
            TransactionRequest::default().with_from(self.sender).with_to(tx.to).with_input(tx.input);
        if let Some(gas_limit) = tx.gas_limit {
            request = request.with_gas_limit(gas_limit);
        }

        let pending = self.provider.send_transaction(request).await.map_err(classify)?;
        debug!(tx_hash = %pending.tx_hash(), "Submitted transaction");
        let receipt =
            pending.get_receipt().await.map_err(|e| ChainError::Transport(e.to_string()))?;

        if !ReceiptResponse::status(&receipt) {
            return Err(ChainError::Reverted { data: None });
        }
        Ok(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            from: receipt.from,
            to: receipt.to.unwrap_or(tx.to),
        })
    }
}
