//! Single-player games against the house.
//!
//! The play transaction only records the request (`SingleGameStarted`); the
//! outcome arrives with a later randomness callback. A receipt that already
//! carries `SingleGameResult` (synchronous randomness) is used as is.

use alloy_primitives::{Address, U256};
use client_blockchain_core::{BlockchainTransport, TxHash};
use client_blockchain_evm::events::single_game_result_query;
use client_blockchain_evm::{Choice, GameEvent, SingleOutcome, Stake};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::Player;

/// A started single-player game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleGame {
    pub request_id: U256,
    pub player: Address,
    pub choice: Choice,
    pub stake: Stake,
    pub tx_hash: TxHash,

    /// Inclusion block of the play transaction
    pub block_number: u64,

    /// Set when the play receipt already carried the result
    pub result: Option<SingleResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleResult {
    pub request_id: U256,
    pub player_choice: Choice,
    pub house_choice: Choice,
    pub outcome: SingleOutcome,
    pub payout: U256,
}

impl SingleResult {
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::SingleGameResult {
                request_id,
                player_choice,
                house_choice,
                outcome,
                payout,
                ..
            } => Some(Self {
                request_id: *request_id,
                player_choice: *player_choice,
                house_choice: *house_choice,
                outcome: *outcome,
                payout: *payout,
            }),
            _ => None,
        }
    }
}

impl<T> Player<T>
where
    T: BlockchainTransport + ?Sized,
{
    /// Submit a play against the house and decode its request.
    pub async fn start_single_game(&self, choice: Choice, stake: Stake) -> Result<SingleGame> {
        if !choice.is_playable() {
            return Err(GameError::InvalidChoice(choice));
        }
        self.fund_stake(&stake).await?;

        let receipt = match stake.token {
            None => {
                self.contract()
                    .play_against_house(self.submitter(), choice, stake.amount)
                    .await?
            }
            Some(token) => {
                self.contract()
                    .play_against_house_with_token(self.submitter(), choice, token)
                    .await?
            }
        };

        let me = self.address();
        let events = self.events(&receipt);
        let (request_id, stake) = events
            .iter()
            .find_map(|e| match e {
                GameEvent::SingleGameStarted {
                    request_id,
                    player,
                    stake,
                    token,
                    ..
                } if *player == me => Some((
                    *request_id,
                    Stake {
                        amount: *stake,
                        token: *token,
                    },
                )),
                _ => None,
            })
            .ok_or(GameError::MissingEvent {
                event: "SingleGameStarted",
                tx_hash: receipt.tx_hash,
            })?;

        let result = events
            .iter()
            .filter_map(SingleResult::from_event)
            .find(|r| r.request_id == request_id);

        tracing::info!(%request_id, player = %me, %choice, token_game = stake.token.is_some(), "Single-player game started");
        Ok(SingleGame {
            request_id,
            player: me,
            choice,
            stake,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            result,
        })
    }

    /// Result of a started game, waiting up to the result timeout for the
    /// randomness callback. Never resubmits the play.
    pub async fn await_single_result(&self, game: &SingleGame) -> Result<SingleResult> {
        if let Some(result) = game.result {
            return Ok(result);
        }

        tracing::info!(request_id = %game.request_id, timeout = ?self.result_timeout(), "Waiting for randomness callback");
        let query = single_game_result_query(
            self.contract().address(),
            game.request_id,
            game.block_number,
        );
        let event = self
            .submitter()
            .await_event(
                &query,
                &self.contract().decoder(),
                self.result_timeout(),
                |e| e.request_id() == Some(game.request_id) && SingleResult::from_event(e).is_some(),
            )
            .await?;

        let result = SingleResult::from_event(&event).ok_or(GameError::MissingEvent {
            event: "SingleGameResult",
            tx_hash: game.tx_hash,
        })?;
        tracing::info!(request_id = %game.request_id, outcome = %result.outcome, payout = %result.payout, "Single-player game resolved");
        Ok(result)
    }

    /// Play against the house and wait for the outcome.
    pub async fn play_against_house(&self, choice: Choice, stake: Stake) -> Result<SingleResult> {
        let game = self.start_single_game(choice, stake).await?;
        self.await_single_result(&game).await
    }
}
