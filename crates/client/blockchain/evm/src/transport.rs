//! JSON-RPC transport backed by an alloy provider with a local signer.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError, TransportErrorKind};
use alloy_primitives::{Address, Bytes, Log, U256};
use async_trait::async_trait;
use client_blockchain_core::{
    BlockchainTransport, CallRequest, LogQuery, TransactionStatus, TransportError, TxHash,
    TxReceipt,
};
use tokio::sync::Mutex;
use url::Url;

use crate::config::{ConfigError, EvmConfig};

/// Signer-bound EVM transport.
///
/// Owns one account. Submissions are serialised through `submit_lock` so the
/// nonce filler never hands the same nonce to two concurrent sessions.
pub struct EvmTransport {
    provider: DynProvider,
    sender: Address,
    submit_lock: Mutex<()>,
}

impl EvmTransport {
    /// Connect to `rpc_url`, signing with `private_key` (hex, `0x` optional).
    pub fn connect(rpc_url: Url, private_key: &str) -> Result<Self, TransportError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| TransportError::SignerError(format!("invalid private key: {e}")))?;
        let sender = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        tracing::debug!(%sender, "EVM transport ready");

        Ok(Self {
            provider,
            sender,
            submit_lock: Mutex::new(()),
        })
    }

    /// Primary signer transport from configuration.
    pub fn from_config(config: &EvmConfig) -> Result<Self, ConnectError> {
        let url = config.require_rpc_url()?;
        let key = config.require_private_key()?;
        Ok(Self::connect(url, key)?)
    }

    /// Second player's transport from configuration.
    pub fn player2_from_config(config: &EvmConfig) -> Result<Self, ConnectError> {
        let url = config.require_rpc_url()?;
        let key = config.require_player2_private_key()?;
        Ok(Self::connect(url, key)?)
    }

    fn transaction_request(&self, call: &CallRequest) -> TransactionRequest {
        let request = TransactionRequest::default()
            .with_from(self.sender)
            .with_value(call.value);

        match call.to {
            Some(to) => request.with_to(to).with_input(call.input.clone()),
            None => request.with_deploy_code(call.input.clone()),
        }
    }
}

/// Errors while building a transport from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[async_trait]
impl BlockchainTransport for EvmTransport {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn send_transaction(&self, call: CallRequest) -> Result<TxHash, TransportError> {
        let request = self.transaction_request(&call);

        // Held across nonce fill + broadcast
        let _guard = self.submit_lock.lock().await;
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(map_rpc_error)?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, TransportError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(map_rpc_error)?;

        Ok(receipt.and_then(convert_receipt))
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        self.provider.get_block_number().await.map_err(map_rpc_error)
    }

    async fn call(&self, call: &CallRequest) -> Result<Bytes, TransportError> {
        let request = self.transaction_request(call);
        self.provider.call(request).await.map_err(map_rpc_error)
    }

    async fn balance(&self, account: Address) -> Result<U256, TransportError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(map_rpc_error)
    }

    async fn logs(&self, query: &LogQuery) -> Result<Vec<Log>, TransportError> {
        let mut filter = Filter::new()
            .address(query.address)
            .event_signature(query.event_signature)
            .from_block(query.from_block);
        if let Some(topic) = query.topic1 {
            filter = filter.topic1(topic);
        }

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(map_rpc_error)?;

        Ok(logs.into_iter().map(|log| log.inner).collect())
    }
}

/// Receipts without a block number are still pending.
fn convert_receipt(receipt: TransactionReceipt) -> Option<TxReceipt> {
    let block_number = receipt.block_number?;
    let status = if receipt.status() {
        TransactionStatus::Success
    } else {
        TransactionStatus::Reverted
    };

    Some(TxReceipt {
        tx_hash: receipt.transaction_hash,
        block_number,
        status,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    })
}

/// Map an RPC failure, extracting revert data when the node returned any.
fn map_rpc_error(err: RpcError<TransportErrorKind>) -> TransportError {
    if let Some(data) = err
        .as_error_resp()
        .and_then(|payload| payload.as_revert_data())
    {
        return TransportError::reverted(data);
    }

    match err {
        RpcError::ErrorResp(payload) if is_execution_reverted(&payload.message) => {
            TransportError::CallReverted {
                reason: Some(payload.message.to_string()),
                data: Bytes::new(),
            }
        }
        RpcError::Transport(kind) => TransportError::NetworkError(kind.to_string()),
        RpcError::SerError(e) => TransportError::SerializationError(e.to_string()),
        RpcError::DeserError { err, .. } => TransportError::SerializationError(err.to_string()),
        RpcError::LocalUsageError(e) => TransportError::SignerError(e.to_string()),
        other => TransportError::BackendError(other.to_string()),
    }
}

fn is_execution_reverted(message: &str) -> bool {
    message.to_ascii_lowercase().contains("revert")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil / Hardhat account #0
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn transport() -> EvmTransport {
        EvmTransport::connect(Url::parse("http://127.0.0.1:8545").unwrap(), DEV_KEY).unwrap()
    }

    #[test]
    fn connect_derives_sender_from_key() {
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(transport().sender(), expected);
    }

    #[test]
    fn connect_rejects_malformed_key() {
        let result = EvmTransport::connect(Url::parse("http://127.0.0.1:8545").unwrap(), "0x1234");
        assert!(matches!(result, Err(TransportError::SignerError(_))));
    }

    #[test]
    fn deploy_requests_carry_no_target() {
        let transport = transport();
        let request = transport.transaction_request(&CallRequest::deploy(vec![0x60, 0x80]));

        assert!(request.to.is_some_and(|kind| kind.is_create()));
        assert_eq!(request.from, Some(transport.sender()));
    }

    #[test]
    fn missing_configuration_fails_before_connecting() {
        let config = EvmConfig::from_lookup(|_| None).unwrap();
        assert!(matches!(
            EvmTransport::from_config(&config),
            Err(ConnectError::Config(ConfigError::ConfigurationMissing("RPC_URL")))
        ));
    }
}
