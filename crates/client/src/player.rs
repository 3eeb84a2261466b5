//! One signer's view of a deployed RockPaperScissors contract.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use client_blockchain_core::{BlockchainTransport, TxReceipt, TxSubmitter};
use client_blockchain_evm::{GameEvent, RockPaperScissors, Stake};

use crate::error::{GameError, Result};
use crate::token::TokenGate;

/// Default deadline for a randomness callback to deliver a single-player result.
pub const DEFAULT_RESULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A signer bound to a game contract.
///
/// Every mutating call goes through the player's own [`TxSubmitter`]; the
/// contract binding is shared read-only between players.
pub struct Player<T: ?Sized> {
    contract: RockPaperScissors,
    submitter: TxSubmitter<T>,
    result_timeout: Duration,
}

impl<T: ?Sized> Clone for Player<T> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            submitter: self.submitter.clone(),
            result_timeout: self.result_timeout,
        }
    }
}

impl<T> Player<T>
where
    T: BlockchainTransport + ?Sized,
{
    pub fn new(contract: RockPaperScissors, submitter: TxSubmitter<T>) -> Self {
        Self {
            contract,
            submitter,
            result_timeout: DEFAULT_RESULT_TIMEOUT,
        }
    }

    pub fn with_result_timeout(mut self, timeout: Duration) -> Self {
        self.result_timeout = timeout;
        self
    }

    /// Signing account.
    pub fn address(&self) -> Address {
        self.submitter.transport().sender()
    }

    pub fn contract(&self) -> &RockPaperScissors {
        &self.contract
    }

    pub fn submitter(&self) -> &TxSubmitter<T> {
        &self.submitter
    }

    pub fn transport(&self) -> &T {
        self.submitter.transport().as_ref()
    }

    pub fn result_timeout(&self) -> Duration {
        self.result_timeout
    }

    /// Native stake currently required by the contract.
    pub async fn native_stake(&self) -> Result<Stake> {
        let amount = self.contract.bet_amount(self.transport()).await?;
        Ok(Stake::native(amount))
    }

    /// Token stake currently required by the contract.
    pub async fn token_stake(&self, token: Address) -> Result<Stake> {
        let amount = self
            .contract
            .get_token_bet_amount(self.transport(), token)
            .await?;
        Ok(Stake::token(token, amount))
    }

    /// Fails with `InsufficientBalance` when the account holds less than `amount`.
    pub async fn ensure_native_balance(&self, amount: U256) -> Result<U256> {
        let account = self.address();
        let available = self.transport().balance(account).await?;
        if available < amount {
            tracing::warn!(%account, %available, needed = %amount, "Native balance too low");
            return Err(GameError::InsufficientBalance {
                account,
                token: None,
                needed: amount,
                available,
            });
        }
        Ok(available)
    }

    /// Token gate approving the game contract as spender.
    pub fn token_gate(&self, token: Address) -> Result<TokenGate<'_, T>> {
        TokenGate::new(token, self.contract.address(), &self.submitter)
    }

    /// Make `stake` available to the contract: a balance check for native
    /// stakes, balance check plus exact approval for token stakes.
    pub(crate) async fn fund_stake(&self, stake: &Stake) -> Result<()> {
        match stake.token {
            None => self.ensure_native_balance(stake.amount).await.map(|_| ()),
            Some(token) => self
                .token_gate(token)?
                .prepare(stake.amount)
                .await
                .map(|_| ()),
        }
    }

    /// Game events of a receipt, in emission order.
    pub(crate) fn events(&self, receipt: &TxReceipt) -> Vec<GameEvent> {
        self.contract.decoder().decode(&receipt.logs)
    }
}
