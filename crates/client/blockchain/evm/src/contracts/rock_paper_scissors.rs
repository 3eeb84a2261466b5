//! RockPaperScissors contract integration.
//!
//! ## Contract Reference
//!
//! ```solidity
//! contract RockPaperScissors {
//!     constructor(uint256 betAmount, uint256 houseEdgeBps, uint256 subscriptionId);
//!
//!     function createMultiplayerGame() payable returns (uint256);
//!     function joinMultiplayerGame(uint256 gameId) payable;
//!     function makeMove(uint256 gameId, uint8 choice);
//!     function playAgainstHouse(uint8 choice) payable returns (uint256);
//!     // ... token variants, bankroll, views
//! }
//! ```
//!
//! Outcomes are never read from return values: mutating calls return the
//! confirmed receipt and callers decode its logs with [`game_decoder`].

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, I256, U256};
use client_blockchain_core::{
    BindingError, BlockchainTransport, ContractHandle, LogDecoder, TxReceipt, TxSubmitter,
    deploy_request,
};

use super::{abi, addresses_at, bind, bool_at, int_at, uint, uint_at};
use crate::config::ContractArtifacts;
use crate::events::{GameEvent, game_decoder};
use crate::types::Choice;

/// Per-player record as stored by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRecord {
    pub wins: U256,
    pub losses: U256,

    /// Net native-currency profit (negative when losing overall)
    pub profit: I256,
}

/// Deployed RockPaperScissors contract.
///
/// Cheap to clone; sessions share one binding read-only.
#[derive(Debug, Clone)]
pub struct RockPaperScissors {
    handle: ContractHandle,
}

impl RockPaperScissors {
    /// Bind to a deployment using the embedded interface.
    pub fn new(address: Address) -> Result<Self, BindingError> {
        Ok(Self {
            handle: bind(address, abi::ROCK_PAPER_SCISSORS)?,
        })
    }

    pub fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub fn handle(&self) -> &ContractHandle {
        &self.handle
    }

    /// Event decoder bound to this deployment.
    pub fn decoder(&self) -> LogDecoder<GameEvent> {
        game_decoder(self.address())
    }

    /// Deploy from compiled artifacts and wait for the creation receipt.
    pub async fn deploy<T>(
        submitter: &TxSubmitter<T>,
        artifacts: ContractArtifacts,
        bet_amount: U256,
        house_edge_bps: U256,
        subscription_id: U256,
    ) -> Result<(Self, TxReceipt), BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        let request = deploy_request(
            &artifacts.abi,
            &artifacts.bytecode,
            &[
                uint(bet_amount, 256),
                uint(house_edge_bps, 256),
                uint(subscription_id, 256),
            ],
        )?;

        tracing::info!(%bet_amount, %house_edge_bps, %subscription_id, "Deploying RockPaperScissors...");
        let receipt = submitter.send(request).await?;

        let address = receipt
            .contract_address
            .ok_or_else(|| BindingError::Decoding {
                method: "constructor".to_string(),
                reason: "creation receipt carries no contract address".to_string(),
            })?;

        tracing::info!(%address, block = receipt.block_number, "RockPaperScissors deployed");
        let handle = ContractHandle::new(address, Arc::new(artifacts.abi));
        Ok((Self { handle }, receipt))
    }

    // ------------------------------------------------------------------------
    // Multiplayer
    // ------------------------------------------------------------------------

    pub async fn create_multiplayer_game<T>(
        &self,
        submitter: &TxSubmitter<T>,
        stake: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(submitter, "createMultiplayerGame", &[], Some(stake))
            .await
    }

    pub async fn create_multiplayer_game_with_token<T>(
        &self,
        submitter: &TxSubmitter<T>,
        token: Address,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "createMultiplayerGameWithToken",
                &[DynSolValue::Address(token)],
                None,
            )
            .await
    }

    pub async fn join_multiplayer_game<T>(
        &self,
        submitter: &TxSubmitter<T>,
        game_id: U256,
        stake: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "joinMultiplayerGame",
                &[uint(game_id, 256)],
                Some(stake),
            )
            .await
    }

    pub async fn join_multiplayer_game_with_token<T>(
        &self,
        submitter: &TxSubmitter<T>,
        game_id: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "joinMultiplayerGameWithToken",
                &[uint(game_id, 256)],
                None,
            )
            .await
    }

    pub async fn make_move<T>(
        &self,
        submitter: &TxSubmitter<T>,
        game_id: U256,
        choice: Choice,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "makeMove",
                &[uint(game_id, 256), uint(U256::from(choice.as_u8()), 8)],
                None,
            )
            .await
    }

    // ------------------------------------------------------------------------
    // Single player
    // ------------------------------------------------------------------------

    pub async fn play_against_house<T>(
        &self,
        submitter: &TxSubmitter<T>,
        choice: Choice,
        stake: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "playAgainstHouse",
                &[uint(U256::from(choice.as_u8()), 8)],
                Some(stake),
            )
            .await
    }

    pub async fn play_against_house_with_token<T>(
        &self,
        submitter: &TxSubmitter<T>,
        choice: Choice,
        token: Address,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "playAgainstHouseWithToken",
                &[uint(U256::from(choice.as_u8()), 8), DynSolValue::Address(token)],
                None,
            )
            .await
    }

    // ------------------------------------------------------------------------
    // Bankroll and token administration
    // ------------------------------------------------------------------------

    pub async fn deposit_funds<T>(
        &self,
        submitter: &TxSubmitter<T>,
        amount: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(submitter, "depositFunds", &[], Some(amount))
            .await
    }

    /// Requires a prior ERC-20 approval of at least `amount`.
    pub async fn deposit_tokens<T>(
        &self,
        submitter: &TxSubmitter<T>,
        token: Address,
        amount: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "depositTokens",
                &[DynSolValue::Address(token), uint(amount, 256)],
                None,
            )
            .await
    }

    /// Owner only.
    pub async fn add_token<T>(
        &self,
        submitter: &TxSubmitter<T>,
        token: Address,
        bet_amount: U256,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.handle
            .send(
                submitter,
                "addToken",
                &[DynSolValue::Address(token), uint(bet_amount, 256)],
                None,
            )
            .await
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub async fn get_player_stats<T>(
        &self,
        transport: &T,
        player: Address,
    ) -> Result<PlayerRecord, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "getPlayerStats";
        let values = self
            .handle
            .read(transport, METHOD, &[DynSolValue::Address(player)])
            .await?;

        Ok(PlayerRecord {
            wins: uint_at(METHOD, &values, 0)?,
            losses: uint_at(METHOD, &values, 1)?,
            profit: int_at(METHOD, &values, 2)?,
        })
    }

    pub async fn get_player_token_profits<T>(
        &self,
        transport: &T,
        player: Address,
        token: Address,
    ) -> Result<I256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "getPlayerTokenProfits";
        let values = self
            .handle
            .read(
                transport,
                METHOD,
                &[DynSolValue::Address(player), DynSolValue::Address(token)],
            )
            .await?;
        int_at(METHOD, &values, 0)
    }

    pub async fn get_supported_tokens<T>(&self, transport: &T) -> Result<Vec<Address>, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "getSupportedTokens";
        let values = self.handle.read(transport, METHOD, &[]).await?;
        addresses_at(METHOD, &values, 0)
    }

    pub async fn is_token_supported<T>(
        &self,
        transport: &T,
        token: Address,
    ) -> Result<bool, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        const METHOD: &str = "isTokenSupported";
        let values = self
            .handle
            .read(transport, METHOD, &[DynSolValue::Address(token)])
            .await?;
        bool_at(METHOD, &values, 0)
    }

    pub async fn get_token_bet_amount<T>(
        &self,
        transport: &T,
        token: Address,
    ) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.read_uint(transport, "getTokenBetAmount", &[DynSolValue::Address(token)])
            .await
    }

    pub async fn get_contract_token_balance<T>(
        &self,
        transport: &T,
        token: Address,
    ) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.read_uint(
            transport,
            "getContractTokenBalance",
            &[DynSolValue::Address(token)],
        )
        .await
    }

    pub async fn bet_amount<T>(&self, transport: &T) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.read_uint(transport, "betAmount", &[]).await
    }

    /// House edge in basis points.
    pub async fn house_edge<T>(&self, transport: &T) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        self.read_uint(transport, "houseEdge", &[]).await
    }

    async fn read_uint<T>(
        &self,
        transport: &T,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<U256, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        let values = self.handle.read(transport, method, args).await?;
        uint_at(method, &values, 0)
    }
}
