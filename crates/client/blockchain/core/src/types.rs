//! Common types for blockchain interactions.

use alloy_primitives::{Address, B256, Bytes, Log, U256};
use serde::{Deserialize, Serialize};

/// Transaction hash.
pub type TxHash = B256;

/// A call against the chain, either a contract invocation or a deployment.
///
/// The sender is implied by the transport that submits it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallRequest {
    /// Target contract; `None` creates a new contract from `input`.
    pub to: Option<Address>,

    /// ABI-encoded calldata (or init code for deployments)
    pub input: Bytes,

    /// Native currency attached to the call
    pub value: U256,
}

impl CallRequest {
    pub fn new(to: Address, input: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            input: input.into(),
            value: U256::ZERO,
        }
    }

    pub fn deploy(init_code: impl Into<Bytes>) -> Self {
        Self {
            to: None,
            input: init_code.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Function selector, if the call carries one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Handle to a broadcast transaction that has not been awaited yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    pub tx_hash: TxHash,
}

/// Transaction status on the blockchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction was included and executed successfully
    Success,

    /// Transaction was included but execution reverted
    Reverted,
}

/// Receipt of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,

    /// Block the transaction was included in
    pub block_number: u64,

    pub status: TransactionStatus,

    /// Address of the created contract for deployments
    pub contract_address: Option<Address>,

    pub gas_used: u64,

    /// Every log emitted by the transaction, in emission order
    pub logs: Vec<Log>,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        self.status == TransactionStatus::Success
    }

    /// Number of confirmations given the current chain head.
    ///
    /// The inclusion block itself counts as the first confirmation.
    pub fn confirmations_at(&self, head: u64) -> u64 {
        head.saturating_add(1).saturating_sub(self.block_number)
    }
}

/// Log filter for events emitted after a transaction was confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Emitting contract
    pub address: Address,

    /// First topic (event signature hash)
    pub event_signature: B256,

    /// Optional constraint on the first indexed argument
    pub topic1: Option<B256>,

    /// Inclusive lower block bound
    pub from_block: u64,
}

impl LogQuery {
    pub fn new(address: Address, event_signature: B256, from_block: u64) -> Self {
        Self {
            address,
            event_signature,
            topic1: None,
            from_block,
        }
    }

    pub fn with_topic1(mut self, topic: B256) -> Self {
        self.topic1 = Some(topic);
        self
    }

    /// Whether a log satisfies this query (block bound excluded).
    pub fn matches(&self, log: &Log) -> bool {
        let topics = log.topics();
        log.address == self.address
            && topics.first() == Some(&self.event_signature)
            && self
                .topic1
                .is_none_or(|expected| topics.get(1) == Some(&expected))
    }
}

/// Chain-specific connection settings.
///
/// This is a trait to allow different networks to provide their own config types.
pub trait BlockchainConfig: Send + Sync {
    /// Human-readable network name (e.g., "sepolia", "local")
    fn network_name(&self) -> &str;

    /// RPC endpoint URL
    fn rpc_url(&self) -> &str;

    /// Validate configuration before any network I/O
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{LogData, address, b256};

    #[test]
    fn confirmations_count_inclusion_block() {
        let receipt = TxReceipt {
            tx_hash: B256::ZERO,
            block_number: 10,
            status: TransactionStatus::Success,
            contract_address: None,
            gas_used: 21_000,
            logs: vec![],
        };

        assert_eq!(receipt.confirmations_at(9), 0);
        assert_eq!(receipt.confirmations_at(10), 1);
        assert_eq!(receipt.confirmations_at(12), 3);
    }

    #[test]
    fn log_query_filters_on_topic1() {
        let emitter = address!("00000000000000000000000000000000000000aa");
        let sig = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let id = B256::with_last_byte(7);

        let log = Log {
            address: emitter,
            data: LogData::new_unchecked(vec![sig, id], Bytes::new()),
        };

        assert!(LogQuery::new(emitter, sig, 0).matches(&log));
        assert!(LogQuery::new(emitter, sig, 0).with_topic1(id).matches(&log));
        assert!(
            !LogQuery::new(emitter, sig, 0)
                .with_topic1(B256::with_last_byte(8))
                .matches(&log)
        );
        assert!(!LogQuery::new(Address::ZERO, sig, 0).matches(&log));
    }
}
