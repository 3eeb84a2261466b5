//! RockPaperScissors event shapes.
//!
//! Every game event is registered with an emitter filter on the game
//! contract, so a lookalike log from another contract in the same receipt
//! never decodes as a game event. ERC-20 `Transfer`/`Approval` logs that token
//! games produce are not part of the table and are dropped as unrelated.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolEvent, sol};
use client_blockchain_core::{EventShape, LogDecoder, LogQuery};
use serde::{Deserialize, Serialize};

use crate::types::{Choice, SingleOutcome};

/// Raw `sol!` event layouts.
pub mod abi {
    alloy_sol_types::sol! {
        event MultiplayerGameCreated(uint256 indexed gameId, address indexed creator, uint256 betAmount, address token);
        event MultiplayerGameJoined(uint256 indexed gameId, address indexed player);
        event MoveMade(uint256 indexed gameId, address indexed player);
        event MultiplayerGameResult(uint256 indexed gameId, address indexed winner, uint256 payout);
        event SingleGameStarted(uint256 indexed requestId, address indexed player, uint8 choice, uint256 betAmount, bool isTokenGame, address token);
        event SingleGameResult(uint256 indexed requestId, address indexed player, uint8 playerChoice, uint8 houseChoice, uint8 outcome, uint256 payout);
        event FundsDeposited(address indexed depositor, uint256 amount);
        event TokensDeposited(address indexed depositor, address indexed token, uint256 amount);
        event TokenAdded(address indexed token, uint256 betAmount);
    }
}

sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);
}

/// Decoded RockPaperScissors event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameCreated {
        game_id: U256,
        creator: Address,
        stake: U256,
        token: Option<Address>,
    },
    GameJoined {
        game_id: U256,
        player: Address,
    },
    MoveSubmitted {
        game_id: U256,
        player: Address,
    },
    GameResult {
        game_id: U256,
        winner: Address,
        payout: U256,
    },
    SingleGameStarted {
        request_id: U256,
        player: Address,
        choice: Choice,
        stake: U256,
        token: Option<Address>,
    },
    SingleGameResult {
        request_id: U256,
        player: Address,
        player_choice: Choice,
        house_choice: Choice,
        outcome: SingleOutcome,
        payout: U256,
    },
    FundsDeposited {
        depositor: Address,
        amount: U256,
    },
    TokensDeposited {
        depositor: Address,
        token: Address,
        amount: U256,
    },
    TokenAdded {
        token: Address,
        bet_amount: U256,
    },
}

impl GameEvent {
    /// Multiplayer game the event belongs to, if any.
    pub fn game_id(&self) -> Option<U256> {
        match self {
            GameEvent::GameCreated { game_id, .. }
            | GameEvent::GameJoined { game_id, .. }
            | GameEvent::MoveSubmitted { game_id, .. }
            | GameEvent::GameResult { game_id, .. } => Some(*game_id),
            _ => None,
        }
    }

    /// Single-player request the event belongs to, if any.
    pub fn request_id(&self) -> Option<U256> {
        match self {
            GameEvent::SingleGameStarted { request_id, .. }
            | GameEvent::SingleGameResult { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "GameCreated",
            GameEvent::GameJoined { .. } => "GameJoined",
            GameEvent::MoveSubmitted { .. } => "MoveSubmitted",
            GameEvent::GameResult { .. } => "GameResult",
            GameEvent::SingleGameStarted { .. } => "SingleGameStarted",
            GameEvent::SingleGameResult { .. } => "SingleGameResult",
            GameEvent::FundsDeposited { .. } => "FundsDeposited",
            GameEvent::TokensDeposited { .. } => "TokensDeposited",
            GameEvent::TokenAdded { .. } => "TokenAdded",
        }
    }
}

/// The zero address marks native-currency games.
fn token_field(token: Address) -> Option<Address> {
    (!token.is_zero()).then_some(token)
}

/// Moves recorded in a single-player event are always playable.
fn choice_field(raw: u8) -> Option<Choice> {
    Choice::from_repr(raw).filter(|choice| choice.is_playable())
}

/// Shape table for one deployed RockPaperScissors contract.
pub fn game_shapes(contract: Address) -> Vec<EventShape<GameEvent>> {
    vec![
        EventShape::sol(|e: abi::MultiplayerGameCreated| GameEvent::GameCreated {
            game_id: e.gameId,
            creator: e.creator,
            stake: e.betAmount,
            token: token_field(e.token),
        }),
        EventShape::sol(|e: abi::MultiplayerGameJoined| GameEvent::GameJoined {
            game_id: e.gameId,
            player: e.player,
        }),
        EventShape::sol(|e: abi::MoveMade| GameEvent::MoveSubmitted {
            game_id: e.gameId,
            player: e.player,
        }),
        EventShape::sol(|e: abi::MultiplayerGameResult| GameEvent::GameResult {
            game_id: e.gameId,
            winner: e.winner,
            payout: e.payout,
        }),
        EventShape::try_sol(|e: abi::SingleGameStarted| {
            Some(GameEvent::SingleGameStarted {
                request_id: e.requestId,
                player: e.player,
                choice: choice_field(e.choice)?,
                stake: e.betAmount,
                token: if e.isTokenGame { Some(e.token) } else { None },
            })
        }),
        EventShape::try_sol(|e: abi::SingleGameResult| {
            Some(GameEvent::SingleGameResult {
                request_id: e.requestId,
                player: e.player,
                player_choice: choice_field(e.playerChoice)?,
                house_choice: choice_field(e.houseChoice)?,
                outcome: SingleOutcome::from_repr(e.outcome)?,
                payout: e.payout,
            })
        }),
        EventShape::sol(|e: abi::FundsDeposited| GameEvent::FundsDeposited {
            depositor: e.depositor,
            amount: e.amount,
        }),
        EventShape::sol(|e: abi::TokensDeposited| GameEvent::TokensDeposited {
            depositor: e.depositor,
            token: e.token,
            amount: e.amount,
        }),
        EventShape::sol(|e: abi::TokenAdded| GameEvent::TokenAdded {
            token: e.token,
            bet_amount: e.betAmount,
        }),
    ]
    .into_iter()
    .map(|shape| shape.from_emitter(contract))
    .collect()
}

/// Decoder for one deployed RockPaperScissors contract.
pub fn game_decoder(contract: Address) -> LogDecoder<GameEvent> {
    LogDecoder::new(game_shapes(contract))
}

/// Query for the oracle-delivered result of a single-player request.
pub fn single_game_result_query(contract: Address, request_id: U256, from_block: u64) -> LogQuery {
    LogQuery::new(contract, abi::SingleGameResult::SIGNATURE_HASH, from_block)
        .with_topic1(B256::from(request_id))
}

/// Query for the result of a multiplayer game.
pub fn game_result_query(contract: Address, game_id: U256, from_block: u64) -> LogQuery {
    LogQuery::new(contract, abi::MultiplayerGameResult::SIGNATURE_HASH, from_block)
        .with_topic1(B256::from(game_id))
}

/// Queries for every event of one multiplayer game, in lifecycle order:
/// creation, join, moves, result.
pub fn game_lifecycle_queries(contract: Address, game_id: U256, from_block: u64) -> [LogQuery; 4] {
    [
        abi::MultiplayerGameCreated::SIGNATURE_HASH,
        abi::MultiplayerGameJoined::SIGNATURE_HASH,
        abi::MoveMade::SIGNATURE_HASH,
        abi::MultiplayerGameResult::SIGNATURE_HASH,
    ]
    .map(|signature| LogQuery::new(contract, signature, from_block).with_topic1(B256::from(game_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::abi::ROCK_PAPER_SCISSORS;
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::{Log, address};

    const GAME: Address = address!("00000000000000000000000000000000000000aa");
    const TOKEN: Address = address!("00000000000000000000000000000000000000bb");
    const ALICE: Address = address!("000000000000000000000000000000000000a11c");

    fn log(address: Address, data: impl SolEvent) -> Log {
        Log {
            address,
            data: data.encode_log_data(),
        }
    }

    #[test]
    fn sol_layouts_match_embedded_abi() {
        let json = JsonAbi::parse(ROCK_PAPER_SCISSORS.iter().copied()).unwrap();
        let selectors = [
            ("MultiplayerGameCreated", abi::MultiplayerGameCreated::SIGNATURE_HASH),
            ("MultiplayerGameJoined", abi::MultiplayerGameJoined::SIGNATURE_HASH),
            ("MoveMade", abi::MoveMade::SIGNATURE_HASH),
            ("MultiplayerGameResult", abi::MultiplayerGameResult::SIGNATURE_HASH),
            ("SingleGameStarted", abi::SingleGameStarted::SIGNATURE_HASH),
            ("SingleGameResult", abi::SingleGameResult::SIGNATURE_HASH),
            ("FundsDeposited", abi::FundsDeposited::SIGNATURE_HASH),
            ("TokensDeposited", abi::TokensDeposited::SIGNATURE_HASH),
            ("TokenAdded", abi::TokenAdded::SIGNATURE_HASH),
        ];

        for (name, selector) in selectors {
            let event = &json.event(name).unwrap()[0];
            assert_eq!(event.selector(), selector, "{name}");
        }
    }

    #[test]
    fn receipt_logs_decode_in_order_and_drop_token_noise() {
        let logs = vec![
            log(
                TOKEN,
                Transfer {
                    from: ALICE,
                    to: GAME,
                    value: U256::from(10),
                },
            ),
            log(
                GAME,
                abi::MultiplayerGameCreated {
                    gameId: U256::from(7),
                    creator: ALICE,
                    betAmount: U256::from(10),
                    token: TOKEN,
                },
            ),
            log(
                TOKEN,
                Approval {
                    owner: ALICE,
                    spender: GAME,
                    value: U256::ZERO,
                },
            ),
        ];

        let events = game_decoder(GAME).decode(&logs);
        assert_eq!(
            events,
            vec![GameEvent::GameCreated {
                game_id: U256::from(7),
                creator: ALICE,
                stake: U256::from(10),
                token: Some(TOKEN),
            }]
        );
    }

    #[test]
    fn events_from_another_contract_are_ignored() {
        let impostor = address!("00000000000000000000000000000000000000cc");
        let logs = vec![log(
            impostor,
            abi::MultiplayerGameResult {
                gameId: U256::from(1),
                winner: ALICE,
                payout: U256::from(100),
            },
        )];

        assert!(game_decoder(GAME).decode(&logs).is_empty());
    }

    #[test]
    fn single_game_started_maps_token_flag() {
        let native = log(
            GAME,
            abi::SingleGameStarted {
                requestId: U256::from(3),
                player: ALICE,
                choice: 2,
                betAmount: U256::from(5),
                isTokenGame: false,
                token: Address::ZERO,
            },
        );

        match game_decoder(GAME).try_decode(&native).unwrap() {
            GameEvent::SingleGameStarted { choice, token, .. } => {
                assert_eq!(choice, Choice::Paper);
                assert_eq!(token, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn result_query_targets_request() {
        let query = single_game_result_query(GAME, U256::from(9), 12);
        let result = log(
            GAME,
            abi::SingleGameResult {
                requestId: U256::from(9),
                player: ALICE,
                playerChoice: 1,
                houseChoice: 3,
                outcome: 1,
                payout: U256::from(19),
            },
        );
        let other = log(
            GAME,
            abi::SingleGameResult {
                requestId: U256::from(10),
                player: ALICE,
                playerChoice: 1,
                houseChoice: 1,
                outcome: 0,
                payout: U256::ZERO,
            },
        );

        assert!(query.matches(&result));
        assert!(!query.matches(&other));
        assert_eq!(query.from_block, 12);
    }

    #[test]
    fn lifecycle_queries_select_one_game_in_order() {
        let queries = game_lifecycle_queries(GAME, U256::from(7), 3);
        let moved = |game_id: u64| {
            log(
                GAME,
                abi::MoveMade {
                    gameId: U256::from(game_id),
                    player: ALICE,
                },
            )
        };

        assert_eq!(queries[0].event_signature, abi::MultiplayerGameCreated::SIGNATURE_HASH);
        assert_eq!(queries[3], game_result_query(GAME, U256::from(7), 3));
        assert!(queries[2].matches(&moved(7)));
        assert!(!queries[2].matches(&moved(8)));
        assert!(!queries[1].matches(&moved(7)));
        assert!(queries.iter().all(|query| query.from_block == 3));
    }

    #[test]
    fn out_of_range_result_fields_are_mismatches() {
        let result = |outcome: u8, house_choice: u8| {
            log(
                GAME,
                abi::SingleGameResult {
                    requestId: U256::from(4),
                    player: ALICE,
                    playerChoice: 1,
                    houseChoice: house_choice,
                    outcome,
                    payout: U256::ZERO,
                },
            )
        };
        let decoder = game_decoder(GAME);

        assert!(decoder.try_decode(&result(7, 2)).is_err());
        assert!(decoder.try_decode(&result(0, 9)).is_err());
        assert!(decoder.try_decode(&result(0, 0)).is_err());
        assert!(decoder.decode(&[result(7, 2)]).is_empty());
        assert!(matches!(
            decoder.try_decode(&result(2, 2)).unwrap(),
            GameEvent::SingleGameResult {
                outcome: SingleOutcome::HouseWon,
                house_choice: Choice::Paper,
                ..
            }
        ));
    }
}
