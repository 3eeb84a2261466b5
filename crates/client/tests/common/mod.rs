//! Shared fixture: a deployed RockPaperScissors on the in-memory chain.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, U256, address};
use client_blockchain_core::mock::{MockChain, MockTransport};
use client_blockchain_core::{SubmitterConfig, TxSubmitter};
use client_blockchain_evm::contracts::abi::ROCK_PAPER_SCISSORS;
use client_blockchain_evm::mock::{SimulatedRps, SimulatedToken, TokenLedger};
use client_blockchain_evm::{ContractArtifacts, RockPaperScissors};
use rps_client::Player;

pub const OWNER: Address = address!("000000000000000000000000000000000000a11c");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
pub const CAROL: Address = address!("00000000000000000000000000000000000ca401");
pub const DAVE: Address = address!("000000000000000000000000000000000000da7e");
pub const ERIN: Address = address!("000000000000000000000000000000000000e414");
pub const COORDINATOR: Address = address!("00000000000000000000000000000000000c0de0");
pub const TOKEN: Address = address!("64544969ed7ebf5f083679233325356ebe738930");

/// 500 bps house edge.
pub const HOUSE_EDGE_BPS: u64 = 500;

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18))
}

/// 0.01 ether.
pub fn bet() -> U256 {
    U256::from(10_000_000_000_000_000u64)
}

/// 10 tokens at 6 decimals.
pub fn token_bet() -> U256 {
    U256::from(10_000_000)
}

pub struct Fixture {
    pub chain: MockChain,
    pub ledger: TokenLedger,
    pub game: RockPaperScissors,
}

impl Fixture {
    /// Deploy the game, register the token and fund the house.
    pub async fn deploy() -> Self {
        let chain = MockChain::new();
        let ledger = TokenLedger::new();
        chain.register_contract(TOKEN, SimulatedToken::new(ledger.clone(), "USDT", 6));
        SimulatedRps::deploy_factory(&chain, ledger.clone(), COORDINATOR);

        for account in [OWNER, BOB, CAROL, DAVE, ERIN] {
            chain.set_balance(account, ether(1));
        }

        let artifacts = ContractArtifacts {
            abi: JsonAbi::parse(ROCK_PAPER_SCISSORS.iter().copied()).unwrap(),
            bytecode: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
        };
        let (game, _) = RockPaperScissors::deploy(
            &submitter(&chain, OWNER),
            artifacts,
            bet(),
            U256::from(HOUSE_EDGE_BPS),
            U256::from(1),
        )
        .await
        .unwrap();

        let fixture = Self {
            chain,
            ledger,
            game,
        };
        let owner = fixture.player(OWNER);
        owner.add_token(TOKEN, token_bet()).await.unwrap();
        owner.deposit_funds(bet() * U256::from(10)).await.unwrap();
        fixture
    }

    pub fn player(&self, account: Address) -> Player<MockTransport> {
        Player::new(self.game.clone(), submitter(&self.chain, account))
            .with_result_timeout(Duration::from_secs(5))
    }

    pub fn coordinator(&self) -> TxSubmitter<MockTransport> {
        submitter(&self.chain, COORDINATOR)
    }

    /// Give `account` whole tokens (6 decimals).
    pub fn mint_tokens(&self, account: Address, whole: u64) {
        self.ledger
            .mint(TOKEN, account, U256::from(whole) * U256::from(1_000_000));
    }

    pub fn token_balance(&self, account: Address) -> U256 {
        self.ledger.balance(TOKEN, account)
    }

    pub fn sent_count(&self) -> usize {
        self.chain.sent_transactions().len()
    }
}

pub fn submitter(chain: &MockChain, account: Address) -> TxSubmitter<MockTransport> {
    TxSubmitter::new(
        Arc::new(chain.transport(account)),
        SubmitterConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(5)),
    )
}
