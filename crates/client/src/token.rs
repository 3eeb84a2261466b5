//! ERC-20 stake preparation.
//!
//! Token games pull the stake with `transferFrom`, so the player's balance is
//! checked first (no transaction is issued on a shortfall) and the game
//! contract is then approved for exactly the stake amount.

use alloy_primitives::{Address, U256};
use client_blockchain_core::{BlockchainTransport, TxReceipt, TxSubmitter};
use client_blockchain_evm::Erc20;

use crate::error::{GameError, Result};

pub struct TokenGate<'a, T: ?Sized> {
    token: Erc20,
    spender: Address,
    submitter: &'a TxSubmitter<T>,
}

impl<'a, T> TokenGate<'a, T>
where
    T: BlockchainTransport + ?Sized,
{
    pub fn new(token: Address, spender: Address, submitter: &'a TxSubmitter<T>) -> Result<Self> {
        Ok(Self {
            token: Erc20::new(token)?,
            spender,
            submitter,
        })
    }

    pub fn token(&self) -> &Erc20 {
        &self.token
    }

    /// Token balance of the signer, failing when it is below `amount`.
    pub async fn ensure_balance(&self, amount: U256) -> Result<U256> {
        let account = self.submitter.transport().sender();
        let available = self
            .token
            .balance_of(self.submitter.transport().as_ref(), account)
            .await?;

        if available < amount {
            tracing::warn!(
                token = %self.token.address(),
                %account,
                %available,
                needed = %amount,
                "Token balance too low"
            );
            return Err(GameError::InsufficientBalance {
                account,
                token: Some(self.token.address()),
                needed: amount,
                available,
            });
        }
        Ok(available)
    }

    /// Check the balance, then approve the spender for exactly `amount`.
    pub async fn prepare(&self, amount: U256) -> Result<TxReceipt> {
        self.ensure_balance(amount).await?;

        tracing::info!(
            token = %self.token.address(),
            spender = %self.spender,
            %amount,
            "Approving token stake"
        );
        Ok(self
            .token
            .approve(self.submitter, self.spender, amount)
            .await?)
    }
}
