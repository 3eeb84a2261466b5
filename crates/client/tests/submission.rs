//! Submission outcomes that leave the remote state unknown.

mod common;

use std::time::Duration;

use client_blockchain_core::{BindingError, BlockchainTransport, SubmitError};
use client_blockchain_evm::GameEvent;
use common::*;
use rps_client::{GameError, GameSession, SessionStatus};

#[tokio::test(start_paused = true)]
async fn unconfirmed_transaction_times_out_and_is_not_resubmitted() {
    let fx = Fixture::deploy().await;
    let bob = fx.player(BOB);
    let stake = bob.native_stake().await.unwrap();
    fx.chain.withhold_receipts(true);
    let sent_before = fx.sent_count();

    let err = bob.create_game(stake).await.unwrap_err();

    assert!(err.is_outcome_unknown());
    let tx_hash = match err {
        GameError::Binding(BindingError::SubmitError(SubmitError::Timeout { tx_hash, waited })) => {
            assert_eq!(waited, Duration::from_secs(5));
            tx_hash
        }
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(fx.sent_count(), sent_before + 1);

    // Re-querying remote state later finds the game that was created
    fx.chain.release_withheld();
    let receipt = bob
        .transport()
        .transaction_receipt(tx_hash)
        .await
        .unwrap()
        .unwrap();
    let session = fx
        .game
        .decoder()
        .decode(&receipt.logs)
        .iter()
        .find_map(GameSession::from_created)
        .unwrap();
    assert_eq!(session.status, SessionStatus::AwaitingOpponent);
    assert_eq!(session.players, vec![BOB]);
    assert_eq!(fx.sent_count(), sent_before + 1);
}

#[tokio::test]
async fn receipt_logs_drive_the_session_not_return_values() {
    let fx = Fixture::deploy().await;
    let bob = fx.player(BOB);
    let stake = bob.native_stake().await.unwrap();

    let session = bob.create_game(stake).await.unwrap();
    let sent = fx.chain.sent_transactions();
    let create_tx = sent.last().unwrap().tx_hash;
    let receipt = bob
        .transport()
        .transaction_receipt(create_tx)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        fx.game.decoder().decode(&receipt.logs),
        vec![GameEvent::GameCreated {
            game_id: session.game_id,
            creator: BOB,
            stake: bet(),
            token: None,
        }]
    );
}
