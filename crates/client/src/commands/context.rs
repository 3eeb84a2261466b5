//! Shared command setup: configuration, signers and formatting.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use anyhow::{Context as _, Result};
use client_blockchain_core::{BlockchainConfig, TxSubmitter};
use client_blockchain_evm::{Choice, Erc20, EvmConfig, EvmTransport, RockPaperScissors, Stake, TokenMetadata};
use console::style;
use rand::Rng;
use rps_client::Player;

/// Symbol used when formatting native amounts.
pub const NATIVE_SYMBOL: &str = "ETH";

pub struct Context {
    pub config: EvmConfig,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = EvmConfig::from_env().context("Invalid configuration")?;
        config.validate().map_err(anyhow::Error::msg)?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(Self { config })
    }

    /// Submitter for the primary signer.
    pub fn submitter(&self) -> Result<TxSubmitter<EvmTransport>> {
        let transport = EvmTransport::from_config(&self.config)
            .context("Failed to set up the primary signer")?;
        Ok(TxSubmitter::new(
            Arc::new(transport),
            self.config.submitter_config(),
        ))
    }

    pub fn contract(&self) -> Result<RockPaperScissors> {
        let address = self.config.require_contract_address()?;
        Ok(RockPaperScissors::new(address)?)
    }

    /// Primary signer bound to the configured contract.
    pub fn player(&self) -> Result<Player<EvmTransport>> {
        let contract = self.contract()?;
        Ok(Player::new(contract, self.submitter()?).with_result_timeout(self.config.result_timeout))
    }

    /// Second signer, sharing the primary's contract binding.
    pub fn player2(&self, contract: &RockPaperScissors) -> Result<Player<EvmTransport>> {
        let transport = EvmTransport::player2_from_config(&self.config)
            .context("Failed to set up the second signer")?;
        let submitter = TxSubmitter::new(Arc::new(transport), self.config.submitter_config());
        Ok(Player::new(contract.clone(), submitter).with_result_timeout(self.config.result_timeout))
    }

    pub fn token_address(&self, explicit: Option<Address>) -> Result<Address> {
        match explicit {
            Some(token) => Ok(token),
            None => Ok(self.config.require_token_address()?),
        }
    }
}

/// Stake currency of a game command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Native,
    Token,
}

impl Currency {
    /// Stake required by the contract, with display metadata.
    pub async fn stake(
        self,
        ctx: &Context,
        player: &Player<EvmTransport>,
    ) -> Result<(Stake, TokenMetadata)> {
        match self {
            Currency::Native => Ok((
                player.native_stake().await?,
                TokenMetadata::native(NATIVE_SYMBOL),
            )),
            Currency::Token => {
                let token = ctx.config.require_token_address()?;
                let supported = player
                    .contract()
                    .is_token_supported(player.transport(), token)
                    .await?;
                if !supported {
                    anyhow::bail!("Token {token} is not supported by the game; run `rps setup-token` first");
                }
                let metadata = Erc20::new(token)?.metadata(player.transport()).await?;
                Ok((player.token_stake(token).await?, metadata))
            }
        }
    }
}

/// Caller-supplied move, or a random one.
pub fn pick_move(choice: Option<Choice>) -> Choice {
    choice.unwrap_or_else(|| Choice::PLAYABLE[rand::thread_rng().gen_range(0..Choice::PLAYABLE.len())])
}

pub fn format_amount(metadata: &TokenMetadata, amount: U256) -> String {
    format!("{} {}", metadata.format(amount), metadata.symbol)
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<16} {}", style(label).dim(), value);
}
