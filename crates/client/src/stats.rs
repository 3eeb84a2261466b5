//! Player statistics and token information.
//!
//! Always read fresh from the contract; nothing here is cached.

use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};
use client_blockchain_core::BlockchainTransport;
use client_blockchain_evm::{Erc20, RockPaperScissors, TokenMetadata};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStats {
    pub player: Address,
    pub wins: U256,
    pub losses: U256,
    pub native_profit: I256,

    /// Profit per supported token
    pub token_profit: BTreeMap<Address, I256>,
}

impl PlayerStats {
    pub async fn fetch<T>(
        contract: &RockPaperScissors,
        transport: &T,
        player: Address,
    ) -> Result<Self>
    where
        T: BlockchainTransport + ?Sized,
    {
        let record = contract.get_player_stats(transport, player).await?;

        let mut token_profit = BTreeMap::new();
        for token in contract.get_supported_tokens(transport).await? {
            let profit = contract
                .get_player_token_profits(transport, player, token)
                .await?;
            token_profit.insert(token, profit);
        }

        Ok(Self {
            player,
            wins: record.wins,
            losses: record.losses,
            native_profit: record.profit,
            token_profit,
        })
    }

    pub fn games_decided(&self) -> U256 {
        self.wins + self.losses
    }
}

/// Token game configuration and house balance for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub metadata: TokenMetadata,
    pub supported: bool,
    pub bet_amount: U256,
    pub contract_balance: U256,
}

impl TokenInfo {
    pub async fn fetch<T>(contract: &RockPaperScissors, transport: &T, token: Address) -> Result<Self>
    where
        T: BlockchainTransport + ?Sized,
    {
        let metadata = Erc20::new(token)?.metadata(transport).await?;
        Ok(Self {
            metadata,
            supported: contract.is_token_supported(transport, token).await?,
            bet_amount: contract.get_token_bet_amount(transport, token).await?,
            contract_balance: contract.get_contract_token_balance(transport, token).await?,
        })
    }
}
