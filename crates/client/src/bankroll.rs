//! House bankroll and token administration.

use alloy_primitives::{Address, U256};
use client_blockchain_core::{BlockchainTransport, TxReceipt};
use client_blockchain_evm::GameEvent;

use crate::error::{GameError, Result};
use crate::player::Player;

impl<T> Player<T>
where
    T: BlockchainTransport + ?Sized,
{
    /// Deposit native currency into the house bankroll.
    pub async fn deposit_funds(&self, amount: U256) -> Result<U256> {
        self.ensure_native_balance(amount).await?;
        let receipt = self
            .contract()
            .deposit_funds(self.submitter(), amount)
            .await?;

        let deposited = self.expect_event(&receipt, "FundsDeposited", |e| match e {
            GameEvent::FundsDeposited { amount, .. } => Some(*amount),
            _ => None,
        })?;
        tracing::info!(amount = %deposited, "House funded");
        Ok(deposited)
    }

    /// Approve and deposit `amount` of `token` into the house bankroll.
    pub async fn deposit_tokens(&self, token: Address, amount: U256) -> Result<U256> {
        self.token_gate(token)?.prepare(amount).await?;
        let receipt = self
            .contract()
            .deposit_tokens(self.submitter(), token, amount)
            .await?;

        let deposited = self.expect_event(&receipt, "TokensDeposited", |e| match e {
            GameEvent::TokensDeposited {
                token: deposited_token,
                amount,
                ..
            } if *deposited_token == token => Some(*amount),
            _ => None,
        })?;
        tracing::info!(%token, amount = %deposited, "House funded with tokens");
        Ok(deposited)
    }

    /// Register `token` for token games with a fixed stake. Owner only.
    pub async fn add_token(&self, token: Address, bet_amount: U256) -> Result<U256> {
        let receipt = self
            .contract()
            .add_token(self.submitter(), token, bet_amount)
            .await?;

        let registered = self.expect_event(&receipt, "TokenAdded", |e| match e {
            GameEvent::TokenAdded {
                token: added,
                bet_amount,
            } if *added == token => Some(*bet_amount),
            _ => None,
        })?;
        tracing::info!(%token, bet_amount = %registered, "Token registered");
        Ok(registered)
    }

    fn expect_event<R>(
        &self,
        receipt: &TxReceipt,
        event: &'static str,
        select: impl FnMut(&GameEvent) -> Option<R>,
    ) -> Result<R> {
        self.events(receipt)
            .iter()
            .find_map(select)
            .ok_or(GameError::MissingEvent {
                event,
                tx_hash: receipt.tx_hash,
            })
    }
}
