//! Multiplayer sessions against the simulated contract.

mod common;

use alloy_primitives::U256;
use client_blockchain_core::mock::MockTransport;
use client_blockchain_core::{BindingError, BlockchainTransport, SubmitError};
use client_blockchain_evm::events::game_result_query;
use client_blockchain_evm::{Choice, Stake};
use common::*;
use rps_client::{GameError, Player, Resolution, SessionStatus, play_round};

/// Pot of two native stakes minus the 500 bps edge.
fn native_payout() -> U256 {
    U256::from(19_000_000_000_000_000u64)
}

async fn full_game(
    creator: &Player<MockTransport>,
    opponent: &Player<MockTransport>,
    moves: (Choice, Choice),
) -> (U256, SessionStatus) {
    let stake = creator.native_stake().await.unwrap();
    let mut session = creator.create_game(stake).await.unwrap();
    opponent.join_game(&mut session, stake).await.unwrap();
    let status = play_round(&mut session, &[(creator, moves.0), (opponent, moves.1)])
        .await
        .unwrap();
    (session.game_id, status)
}

#[tokio::test]
async fn rock_beats_scissors_and_winner_takes_pot_minus_edge() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let stake = bob.native_stake().await.unwrap();
    assert_eq!(stake, Stake::native(bet()));

    let mut session = bob.create_game(stake).await.unwrap();
    assert_eq!(session.status, SessionStatus::AwaitingOpponent);
    assert_eq!(session.stake, stake);

    carol.join_game(&mut session, stake).await.unwrap();
    assert_eq!(session.status, SessionStatus::MovesPending);
    assert_eq!(session.players, vec![BOB, CAROL]);

    bob.submit_move(&mut session, Choice::Rock).await.unwrap();
    assert_eq!(session.status, SessionStatus::MovesPending);
    assert!(session.has_moved(BOB));
    assert!(!session.has_moved(CAROL));

    let status = carol
        .submit_move(&mut session, Choice::Scissors)
        .await
        .unwrap();

    assert_eq!(
        status,
        SessionStatus::Resolved(Resolution::Winner {
            winner: BOB,
            payout: native_payout(),
        })
    );
    assert_eq!(fx.chain.balance_of(BOB), ether(1) - bet() + native_payout());
    assert_eq!(fx.chain.balance_of(CAROL), ether(1) - bet());
}

#[tokio::test]
async fn paper_against_paper_is_a_draw_and_refunds_both() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));

    let (game_id, status) = full_game(&bob, &carol, (Choice::Paper, Choice::Paper)).await;

    assert_eq!(status, SessionStatus::Resolved(Resolution::Draw));
    assert_eq!(fx.chain.balance_of(BOB), ether(1));
    assert_eq!(fx.chain.balance_of(CAROL), ether(1));

    // The contract emitted no result event for this game
    let logs = bob
        .transport()
        .logs(&game_result_query(fx.game.address(), game_id, 0))
        .await
        .unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn draw_resolves_when_each_player_holds_their_own_session() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let stake = bob.native_stake().await.unwrap();
    let mut bob_session = bob.create_game(stake).await.unwrap();
    carol.join_game(&mut bob_session, stake).await.unwrap();
    let mut carol_session = bob_session.clone();

    let status = bob
        .submit_move(&mut bob_session, Choice::Paper)
        .await
        .unwrap();
    assert_eq!(status, SessionStatus::MovesPending);

    // Carol's copy never saw Bob's receipt; the final move still settles it
    let status = carol
        .submit_move(&mut carol_session, Choice::Paper)
        .await
        .unwrap();
    assert_eq!(status, SessionStatus::Resolved(Resolution::Draw));
    assert!(carol_session.has_moved(BOB));

    let status = bob.refresh_session(&mut bob_session).await.unwrap();
    assert_eq!(status, SessionStatus::Resolved(Resolution::Draw));
    assert_eq!(fx.chain.balance_of(BOB), ether(1));
    assert_eq!(fx.chain.balance_of(CAROL), ether(1));
}

#[tokio::test]
async fn concurrent_moves_from_separate_sessions_agree_on_the_winner() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let stake = bob.native_stake().await.unwrap();
    let mut bob_session = bob.create_game(stake).await.unwrap();
    carol.join_game(&mut bob_session, stake).await.unwrap();
    let mut carol_session = bob_session.clone();

    let (first, second) = tokio::join!(
        bob.submit_move(&mut bob_session, Choice::Scissors),
        carol.submit_move(&mut carol_session, Choice::Rock),
    );
    first.unwrap();
    second.unwrap();

    let expected = SessionStatus::Resolved(Resolution::Winner {
        winner: CAROL,
        payout: native_payout(),
    });
    assert_eq!(bob.refresh_session(&mut bob_session).await.unwrap(), expected);
    assert_eq!(
        carol.refresh_session(&mut carol_session).await.unwrap(),
        expected
    );
}

#[tokio::test]
async fn one_move_alone_is_never_a_draw() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let stake = bob.native_stake().await.unwrap();
    let mut session = bob.create_game(stake).await.unwrap();
    carol.join_game(&mut session, stake).await.unwrap();

    bob.submit_move(&mut session, Choice::Rock).await.unwrap();
    let status = bob.refresh_session(&mut session).await.unwrap();

    assert_eq!(status, SessionStatus::MovesPending);
    assert_eq!(session.moved.len(), 1);
}

#[tokio::test]
async fn token_game_pays_winner_in_tokens_with_exact_approvals() {
    let fx = Fixture::deploy().await;
    fx.mint_tokens(BOB, 50);
    fx.mint_tokens(CAROL, 50);
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let stake = bob.token_stake(TOKEN).await.unwrap();
    assert_eq!(stake, Stake::token(TOKEN, token_bet()));

    let mut session = bob.create_game(stake).await.unwrap();
    assert_eq!(session.stake.token, Some(TOKEN));
    carol.join_game(&mut session, stake).await.unwrap();

    let status = play_round(
        &mut session,
        &[(&bob, Choice::Scissors), (&carol, Choice::Paper)],
    )
    .await
    .unwrap();

    let payout = U256::from(19_000_000);
    assert_eq!(
        status,
        SessionStatus::Resolved(Resolution::Winner {
            winner: BOB,
            payout,
        })
    );
    assert_eq!(fx.token_balance(BOB), U256::from(40_000_000) + payout);
    assert_eq!(fx.token_balance(CAROL), U256::from(40_000_000));

    // Each approval covered exactly one stake and was fully consumed
    for account in [BOB, CAROL] {
        assert_eq!(
            fx.ledger.allowance(TOKEN, account, fx.game.address()),
            U256::ZERO
        );
    }
}

#[tokio::test]
async fn insufficient_token_balance_issues_no_transaction() {
    let fx = Fixture::deploy().await;
    fx.mint_tokens(CAROL, 5);
    let carol = fx.player(CAROL);
    let stake = carol.token_stake(TOKEN).await.unwrap();
    let sent_before = fx.sent_count();

    let err = carol.create_game(stake).await.unwrap_err();

    match err {
        GameError::InsufficientBalance {
            account,
            token,
            needed,
            available,
        } => {
            assert_eq!(account, CAROL);
            assert_eq!(token, Some(TOKEN));
            assert_eq!(needed, token_bet());
            assert_eq!(available, U256::from(5_000_000));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.sent_count(), sent_before);
}

#[tokio::test]
async fn insufficient_native_balance_issues_no_transaction() {
    let fx = Fixture::deploy().await;
    fx.chain.set_balance(DAVE, U256::from(1));
    let dave = fx.player(DAVE);
    let stake = dave.native_stake().await.unwrap();
    let sent_before = fx.sent_count();

    let err = dave.create_game(stake).await.unwrap_err();

    assert!(matches!(
        err,
        GameError::InsufficientBalance { token: None, .. }
    ));
    assert_eq!(fx.sent_count(), sent_before);
}

#[tokio::test]
async fn local_checks_reject_before_sending() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let stake = bob.native_stake().await.unwrap();
    let mut session = bob.create_game(stake).await.unwrap();
    let sent_before = fx.sent_count();

    let err = carol
        .join_game(&mut session, Stake::native(bet() * U256::from(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::StakeMismatch { .. }));

    let err = bob
        .submit_move(&mut session, Choice::Rock)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidState {
            status: SessionStatus::AwaitingOpponent,
            ..
        }
    ));

    carol.join_game(&mut session, stake).await.unwrap();
    let sent_before_move = fx.sent_count();
    assert_eq!(sent_before_move, sent_before + 1);

    let err = bob
        .submit_move(&mut session, Choice::None)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidChoice(Choice::None)));

    let err = fx
        .player(DAVE)
        .submit_move(&mut session, Choice::Rock)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NotAPlayer { account, .. } if account == DAVE));
    assert_eq!(fx.sent_count(), sent_before_move);
}

#[tokio::test]
async fn remote_rejection_surfaces_revert_reason() {
    let fx = Fixture::deploy().await;
    let bob = fx.player(BOB);
    let stake = bob.native_stake().await.unwrap();
    let mut session = bob.create_game(stake).await.unwrap();
    let sent_before = fx.sent_count();

    let err = bob.join_game(&mut session, stake).await.unwrap_err();

    assert!(err.revert_reason().unwrap().contains("Cannot join own game"));
    assert_eq!(fx.sent_count(), sent_before);
    assert_eq!(session.status, SessionStatus::AwaitingOpponent);
}

#[tokio::test]
async fn reverted_transaction_is_reported_not_retried() {
    let fx = Fixture::deploy().await;
    let bob = fx.player(BOB);
    let stake = bob.native_stake().await.unwrap();
    let mut session = bob.create_game(stake).await.unwrap();
    fx.chain.include_reverts(true);
    let sent_before = fx.sent_count();

    let err = bob.join_game(&mut session, stake).await.unwrap_err();

    assert!(matches!(
        err,
        GameError::Binding(BindingError::SubmitError(
            SubmitError::TransactionReverted { .. }
        ))
    ));
    assert_eq!(fx.sent_count(), sent_before + 1);
}

#[tokio::test]
async fn independent_sessions_run_concurrently() {
    let fx = Fixture::deploy().await;
    let (bob, carol) = (fx.player(BOB), fx.player(CAROL));
    let (dave, erin) = (fx.player(DAVE), fx.player(ERIN));

    let (first, second) = tokio::join!(
        full_game(&bob, &carol, (Choice::Rock, Choice::Paper)),
        full_game(&dave, &erin, (Choice::Scissors, Choice::Paper)),
    );

    assert_ne!(first.0, second.0);
    assert_eq!(
        first.1,
        SessionStatus::Resolved(Resolution::Winner {
            winner: CAROL,
            payout: native_payout(),
        })
    );
    assert_eq!(
        second.1,
        SessionStatus::Resolved(Resolution::Winner {
            winner: DAVE,
            payout: native_payout(),
        })
    );
}

#[tokio::test]
async fn sessions_sharing_a_signer_queue_their_submissions() {
    let fx = Fixture::deploy().await;
    let bob = fx.player(BOB);
    let stake = bob.native_stake().await.unwrap();

    let (first, second) = tokio::join!(bob.create_game(stake), bob.create_game(stake));
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.game_id, second.game_id);

    let mut nonces: Vec<u64> = fx
        .chain
        .sent_transactions()
        .into_iter()
        .filter(|tx| tx.from == BOB)
        .map(|tx| tx.nonce)
        .collect();
    nonces.sort_unstable();
    assert_eq!(nonces, vec![0, 1]);
}
