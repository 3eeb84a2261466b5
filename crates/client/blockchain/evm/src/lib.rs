//! EVM integration for the RockPaperScissors client.
//!
//! This crate binds the chain-agnostic core to an EVM chain:
//! - JSON-RPC transport with a local signer (alloy)
//! - Typed bindings for RockPaperScissors and ERC-20
//! - Event shape table for RockPaperScissors logs
//! - Environment configuration and deployment bookkeeping
//!
//! # Architecture
//!
//! ```text
//! rps-client (sessions) → contracts::RockPaperScissors → ContractHandle ─┐
//!                                                                        ├→ EvmTransport → RPC node
//!                         events::game_decoder ← TxReceipt ← TxSubmitter ┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_evm::{EvmConfig, EvmTransport, RockPaperScissors};
//!
//! let config = EvmConfig::from_env()?;
//! let transport = Arc::new(EvmTransport::from_config(&config)?);
//! let submitter = TxSubmitter::new(transport, config.submitter_config());
//!
//! let game = RockPaperScissors::new(config.require_contract_address()?)?;
//! let receipt = game.play_against_house(&submitter, Choice::Rock, config.bet_amount).await?;
//! let events = game.decoder().decode(&receipt.logs);
//! ```

pub mod config;
pub mod contracts;
pub mod events;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ConfigError, ContractArtifacts, DeploymentInfo, EvmConfig};
pub use contracts::{Erc20, PlayerRecord, RockPaperScissors, TokenMetadata};
pub use events::{GameEvent, game_decoder};
pub use transport::{ConnectError, EvmTransport};
pub use types::{Choice, SingleOutcome, Stake};
