//! Blockchain abstraction traits.
//!
//! This module defines the infrastructure layer every higher layer builds on:
//! - Layer 0: BlockchainTransport (signer + provider, no contract knowledge)
//! - Layer 1: ContractHandle / TxSubmitter / LogDecoder (ABI-aware, game-agnostic)

use alloy_primitives::{Address, Bytes, Log, U256};
use async_trait::async_trait;

use crate::types::{CallRequest, LogQuery, TxHash, TxReceipt};

// ============================================================================
// Error Types
// ============================================================================

/// Transport layer errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The node rejected the call because remote execution reverted.
    #[error("Call reverted: {}", revert_message(.reason, .data))]
    CallReverted {
        reason: Option<String>,
        data: Bytes,
    },

    #[error("Signer error: {0}")]
    SignerError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Backend-specific error: {0}")]
    BackendError(String),
}

impl TransportError {
    /// Build a `CallReverted` from raw revert data, decoding the reason when possible.
    pub fn reverted(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::CallReverted {
            reason: alloy_sol_types::decode_revert_reason(&data),
            data,
        }
    }
}

pub(crate) fn revert_message(reason: &Option<String>, data: &Bytes) -> String {
    match reason {
        Some(reason) => reason.clone(),
        None if data.is_empty() => "no revert data".to_string(),
        None => format!("opaque error {data}"),
    }
}

/// Errors raised while waiting for a submitted transaction.
///
/// None of these are retried: a state-mutating call is not idempotent on a
/// public ledger, so callers must re-query remote state before acting again.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Transaction {tx_hash} was included but reverted")]
    TransactionReverted { tx_hash: TxHash, receipt: Box<TxReceipt> },

    #[error("Transaction {tx_hash} not confirmed within {waited:?}; outcome unknown")]
    Timeout {
        tx_hash: TxHash,
        waited: std::time::Duration,
    },

    #[error("No matching event observed within {waited:?}")]
    EventTimeout { waited: std::time::Duration },

    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),
}

impl SubmitError {
    /// Whether the remote outcome is unknown and must be re-queried.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, SubmitError::Timeout { .. })
    }
}

// ============================================================================
// Layer 0: Signer + Provider
// ============================================================================

/// Signer-bound connection to a chain.
///
/// One transport represents one account. Implementations must serialize their
/// own submissions so concurrent callers sharing the account never race on
/// the nonce.
#[async_trait]
pub trait BlockchainTransport: Send + Sync {
    /// Account that signs every transaction sent through this transport.
    fn sender(&self) -> Address;

    /// Sign and broadcast a transaction; returns once the node accepted it.
    async fn send_transaction(&self, call: CallRequest) -> Result<TxHash, TransportError>;

    /// Receipt of an included transaction, `None` while still pending.
    async fn transaction_receipt(&self, tx_hash: TxHash)
    -> Result<Option<TxReceipt>, TransportError>;

    /// Current chain head.
    async fn block_number(&self) -> Result<u64, TransportError>;

    /// Execute a read-only call against the latest state.
    async fn call(&self, call: &CallRequest) -> Result<Bytes, TransportError>;

    /// Native balance of an account.
    async fn balance(&self, account: Address) -> Result<U256, TransportError>;

    /// Logs matching a query, in chain order.
    async fn logs(&self, query: &LogQuery) -> Result<Vec<Log>, TransportError>;

    /// Health check: verify connection to the node.
    async fn health_check(&self) -> Result<(), TransportError> {
        self.block_number().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{Revert, SolError};

    #[test]
    fn reverted_decodes_error_string() {
        let data = Revert::from("Insufficient bet").abi_encode();
        let err = TransportError::reverted(data);

        match &err {
            TransportError::CallReverted { reason, .. } => {
                assert!(reason.as_deref().unwrap().contains("Insufficient bet"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reverted_keeps_opaque_code() {
        let err = TransportError::reverted(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]));
        assert!(err.to_string().contains("0xdeadbeef"));
    }
}
