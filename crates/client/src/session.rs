//! Multiplayer game sessions.
//!
//! A [`GameSession`] is a local cache of one remote game. Its status only
//! changes by observing decoded contract events:
//!
//! ```text
//! Created ─GameCreated→ AwaitingOpponent ─GameJoined→ MovesPending ─GameResult→ Resolved(Winner)
//!                                                          └─ final move, no result → Resolved(Draw)
//! ```
//!
//! The contract emits no result event for a draw (both stakes are refunded),
//! so a draw is inferred once the contract's logs show a move from every
//! seat and no result. Each player may hold its own copy of a session; a copy
//! catches up with moves made through other copies by re-reading the game's
//! logs ([`Player::refresh_session`]).

use std::collections::BTreeSet;

use alloy_primitives::{Address, U256};
use client_blockchain_core::{BlockchainTransport, TxReceipt};
use client_blockchain_evm::events::game_lifecycle_queries;
use client_blockchain_evm::{Choice, GameEvent, Stake};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::Player;

/// Seats in a multiplayer game; also the number of moves to resolve it.
pub const PLAYERS_PER_GAME: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Winner { winner: Address, payout: U256 },
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Known locally, creation not yet observed
    Created,
    AwaitingOpponent,
    MovesPending,
    Resolved(Resolution),
}

impl SessionStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SessionStatus::Resolved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub game_id: U256,

    /// Creator first, then the opponent once joined
    pub players: Vec<Address>,

    pub stake: Stake,
    pub status: SessionStatus,

    /// Players whose move has been observed
    pub moved: BTreeSet<Address>,

    /// Block to scan the game's logs from
    pub created_block: u64,
}

impl GameSession {
    pub fn new(game_id: U256, creator: Address, stake: Stake) -> Self {
        Self {
            game_id,
            players: vec![creator],
            stake,
            status: SessionStatus::Created,
            moved: BTreeSet::new(),
            created_block: 0,
        }
    }

    /// Session for a `GameCreated` event, already observed.
    pub fn from_created(event: &GameEvent) -> Option<Self> {
        let GameEvent::GameCreated {
            game_id,
            creator,
            stake,
            token,
        } = event
        else {
            return None;
        };

        let mut session = Self::new(
            *game_id,
            *creator,
            Stake {
                amount: *stake,
                token: *token,
            },
        );
        session.observe(event);
        Some(session)
    }

    pub fn creator(&self) -> Option<Address> {
        self.players.first().copied()
    }

    pub fn opponent(&self) -> Option<Address> {
        self.players.get(1).copied()
    }

    pub fn is_player(&self, account: Address) -> bool {
        self.players.contains(&account)
    }

    pub fn has_moved(&self, account: Address) -> bool {
        self.moved.contains(&account)
    }

    /// Whether every seat is taken and every seated player has moved.
    pub fn all_moved(&self) -> bool {
        self.players.len() == PLAYERS_PER_GAME
            && self.players.iter().all(|player| self.moved.contains(player))
    }

    /// Apply one event. Returns whether it changed the session.
    ///
    /// Events of other games are ignored, as is everything after resolution.
    pub fn observe(&mut self, event: &GameEvent) -> bool {
        if event.game_id() != Some(self.game_id) || self.status.is_resolved() {
            return false;
        }

        match (event, self.status) {
            (GameEvent::GameCreated { .. }, SessionStatus::Created) => {
                self.status = SessionStatus::AwaitingOpponent;
            }
            (GameEvent::GameJoined { player, .. }, SessionStatus::AwaitingOpponent) => {
                if !self.is_player(*player) {
                    self.players.push(*player);
                }
                self.status = SessionStatus::MovesPending;
            }
            (GameEvent::MoveSubmitted { player, .. }, SessionStatus::MovesPending)
                if self.is_player(*player) =>
            {
                if !self.moved.insert(*player) {
                    return false;
                }
            }
            (GameEvent::GameResult { winner, payout, .. }, _) => {
                self.status = SessionStatus::Resolved(Resolution::Winner {
                    winner: *winner,
                    payout: *payout,
                });
            }
            _ => return false,
        }

        tracing::debug!(game_id = %self.game_id, event = event.name(), status = ?self.status, "Session updated");
        true
    }

    pub fn observe_all<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.observe(event);
        }
    }

    /// Resolve as a draw once every seat has moved without a result event.
    ///
    /// Only sound after the game's result log has been looked up, which
    /// [`Player::refresh_session`] does. Returns whether the session was
    /// resolved by this call.
    pub fn resolve_without_result(&mut self) -> bool {
        if self.status == SessionStatus::MovesPending && self.all_moved() {
            self.status = SessionStatus::Resolved(Resolution::Draw);
            tracing::info!(game_id = %self.game_id, "All moves confirmed without a result; draw");
            true
        } else {
            false
        }
    }

    fn expect_status(&self, expected: SessionStatus) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                game_id: self.game_id,
                status: self.status,
            })
        }
    }
}

impl<T> Player<T>
where
    T: BlockchainTransport + ?Sized,
{
    /// Open a multiplayer game and escrow the creator's stake.
    pub async fn create_game(&self, stake: Stake) -> Result<GameSession> {
        self.fund_stake(&stake).await?;

        let receipt = match stake.token {
            None => {
                self.contract()
                    .create_multiplayer_game(self.submitter(), stake.amount)
                    .await?
            }
            Some(token) => {
                self.contract()
                    .create_multiplayer_game_with_token(self.submitter(), token)
                    .await?
            }
        };

        let me = self.address();
        let events = self.events(&receipt);
        let mut session = events
            .iter()
            .find(|e| matches!(e, GameEvent::GameCreated { creator, .. } if *creator == me))
            .and_then(GameSession::from_created)
            .ok_or(GameError::MissingEvent {
                event: "GameCreated",
                tx_hash: receipt.tx_hash,
            })?;
        session.observe_all(&events);
        session.created_block = receipt.block_number;

        tracing::info!(game_id = %session.game_id, creator = %me, stake = %session.stake.amount, "Multiplayer game created");
        Ok(session)
    }

    /// Join an open game; `stake` must match the game's stake.
    pub async fn join_game(&self, session: &mut GameSession, stake: Stake) -> Result<TxReceipt> {
        session.expect_status(SessionStatus::AwaitingOpponent)?;
        if stake != session.stake {
            return Err(GameError::StakeMismatch {
                expected: session.stake,
                offered: stake,
            });
        }
        self.fund_stake(&stake).await?;

        let receipt = match stake.token {
            None => {
                self.contract()
                    .join_multiplayer_game(self.submitter(), session.game_id, stake.amount)
                    .await?
            }
            Some(_) => {
                self.contract()
                    .join_multiplayer_game_with_token(self.submitter(), session.game_id)
                    .await?
            }
        };

        let events = self.events(&receipt);
        if !events
            .iter()
            .any(|e| matches!(e, GameEvent::GameJoined { game_id, .. } if *game_id == session.game_id))
        {
            return Err(GameError::MissingEvent {
                event: "GameJoined",
                tx_hash: receipt.tx_hash,
            });
        }
        session.observe_all(&events);

        tracing::info!(game_id = %session.game_id, player = %self.address(), "Joined multiplayer game");
        Ok(receipt)
    }

    /// Submit this player's move as its own transaction.
    ///
    /// The session is then brought up to date with the game's logs, so moves
    /// submitted through other session copies count. After the final move
    /// the session is resolved: by the result event, or as a draw when the
    /// contract emitted none.
    pub async fn submit_move(
        &self,
        session: &mut GameSession,
        choice: Choice,
    ) -> Result<SessionStatus> {
        if !choice.is_playable() {
            return Err(GameError::InvalidChoice(choice));
        }
        session.expect_status(SessionStatus::MovesPending)?;
        let me = self.address();
        if !session.is_player(me) {
            return Err(GameError::NotAPlayer {
                game_id: session.game_id,
                account: me,
            });
        }

        let receipt = self
            .contract()
            .make_move(self.submitter(), session.game_id, choice)
            .await?;

        let events = self.events(&receipt);
        if !events.iter().any(|e| {
            matches!(e, GameEvent::MoveSubmitted { game_id, player } if *game_id == session.game_id && *player == me)
        }) {
            return Err(GameError::MissingEvent {
                event: "MoveSubmitted",
                tx_hash: receipt.tx_hash,
            });
        }
        session.observe_all(&events);
        self.refresh_session(session).await?;

        tracing::info!(game_id = %session.game_id, player = %me, %choice, status = ?session.status, "Move confirmed");
        Ok(session.status)
    }

    /// Re-read the game's events from the contract and apply them.
    ///
    /// Queries run in lifecycle order, so a result log that exists is always
    /// seen by the time every move is; a draw is inferred only then.
    pub async fn refresh_session(&self, session: &mut GameSession) -> Result<SessionStatus> {
        if session.status.is_resolved() {
            return Ok(session.status);
        }

        let decoder = self.contract().decoder();
        for query in game_lifecycle_queries(
            self.contract().address(),
            session.game_id,
            session.created_block,
        ) {
            let logs = self.transport().logs(&query).await?;
            session.observe_all(&decoder.decode(&logs));
        }
        session.resolve_without_result();

        tracing::debug!(game_id = %session.game_id, moved = session.moved.len(), status = ?session.status, "Session refreshed");
        Ok(session.status)
    }
}

/// Submit each player's move in order until the session resolves.
pub async fn play_round<T>(
    session: &mut GameSession,
    moves: &[(&Player<T>, Choice)],
) -> Result<SessionStatus>
where
    T: BlockchainTransport + ?Sized,
{
    for (player, choice) in moves {
        if session.status.is_resolved() {
            break;
        }
        player.submit_move(session, *choice).await?;
    }
    Ok(session.status)
}
