//! Errors surfaced by game sessions.

use alloy_primitives::{Address, U256};
use client_blockchain_core::{BindingError, SubmitError, TransportError, TxHash};
use client_blockchain_evm::{Choice, Stake};
use thiserror::Error;

use crate::session::SessionStatus;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    /// Checked before any transaction is issued.
    #[error("Insufficient {} balance for {account}: need {needed}, have {available}", asset(.token))]
    InsufficientBalance {
        account: Address,
        token: Option<Address>,
        needed: U256,
        available: U256,
    },

    #[error("{0} is not a playable move")]
    InvalidChoice(Choice),

    #[error("Game {game_id} does not accept this action while {status:?}")]
    InvalidState {
        game_id: U256,
        status: SessionStatus,
    },

    #[error("Stake mismatch: game requires {expected:?}, offered {offered:?}")]
    StakeMismatch { expected: Stake, offered: Stake },

    #[error("{account} is not a player of game {game_id}")]
    NotAPlayer { game_id: U256, account: Address },

    /// The confirmed receipt lacks an event the contract always emits.
    #[error("Transaction {tx_hash} confirmed without a {event} event")]
    MissingEvent { event: &'static str, tx_hash: TxHash },

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GameError {
    /// Whether a submitted transaction may or may not have taken effect.
    ///
    /// The caller must re-query contract state before acting again.
    pub fn is_outcome_unknown(&self) -> bool {
        match self {
            GameError::Submit(err) | GameError::Binding(BindingError::SubmitError(err)) => {
                err.is_outcome_unknown()
            }
            _ => false,
        }
    }

    /// Decoded revert reason of a rejected call, if any.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            GameError::Binding(err) => err.revert_reason(),
            GameError::Transport(TransportError::CallReverted { reason, .. }) => reason.as_deref(),
            _ => None,
        }
    }
}

fn asset(token: &Option<Address>) -> String {
    match token {
        Some(token) => format!("token {token}"),
        None => "native".to_string(),
    }
}
