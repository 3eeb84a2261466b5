//! Chain abstraction layer for the RockPaperScissors client.
//!
//! This crate provides a layered, game-agnostic EVM client core.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: ABI-aware building blocks
//!          ├── ContractHandle  (method lookup, arity checks, eth_call / send)
//!          ├── TxSubmitter     (broadcast, confirmations, deadlines)
//!          └── LogDecoder      (priority-ordered event shapes)
//!
//! Layer 0: BlockchainTransport (signer + provider, pure infrastructure)
//! ```
//!
//! # Design Philosophy
//!
//! - **Layer 0 (Transport)**: One account, one connection. No contract knowledge.
//! - **Layer 1**: Everything needed to talk to *a* contract, but not *which* contract.
//! - Game-specific bindings and orchestration live in downstream crates.
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{ContractHandle, SubmitterConfig, TxSubmitter};
//!
//! let submitter = TxSubmitter::new(transport, SubmitterConfig::default());
//! let receipt = handle.send(&submitter, "depositFunds", &[], Some(amount)).await?;
//! let events = decoder.decode(&receipt.logs);
//! ```

pub mod binding;
pub mod decoder;
pub mod submitter;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export all traits and errors
pub use traits::{BlockchainTransport, SubmitError, TransportError};

// Re-export building blocks
pub use binding::{BindingError, ContractHandle, deploy_request, parse_abi};
pub use decoder::{DecodeMismatch, EventShape, LogDecoder};
pub use submitter::{SubmitterConfig, TxSubmitter};

// Re-export all types
pub use types::{
    BlockchainConfig, CallRequest, LogQuery, PendingTx, TransactionStatus, TxHash, TxReceipt,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockChain, MockContract, MockTransport};
