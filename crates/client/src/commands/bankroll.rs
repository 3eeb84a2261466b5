//! House funding and token setup commands.

use alloy_primitives::Address;
use anyhow::{Context as _, Result};
use clap::Parser;
use client_blockchain_evm::{Erc20, TokenMetadata};
use console::style;

use super::context::{Context, NATIVE_SYMBOL, field, format_amount, success};

/// Deposit native currency into the house bankroll
#[derive(Debug, Parser)]
pub struct Fund {
    /// Amount in whole units (e.g. 0.5)
    #[arg(long, default_value = "0.1")]
    pub amount: String,
}

impl Fund {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let native = TokenMetadata::native(NATIVE_SYMBOL);
        let amount = native
            .parse(&self.amount)
            .with_context(|| format!("Invalid amount: {}", self.amount))?;
        let player = ctx.player()?;

        println!("💰 Funding house with {}", format_amount(&native, amount));
        let deposited = player.deposit_funds(amount).await?;
        success(format!("Deposited {}", format_amount(&native, deposited)));
        Ok(())
    }
}

/// Register an ERC-20 token for token games (owner only)
#[derive(Debug, Parser)]
pub struct SetupToken {
    /// Token address (defaults to TOKEN_ADDRESS)
    #[arg(long)]
    pub token: Option<Address>,

    /// Stake per token game, in whole token units
    #[arg(long, default_value = "10")]
    pub bet_amount: String,
}

impl SetupToken {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let token = ctx.token_address(self.token)?;
        let player = ctx.player()?;
        let transport = player.transport();

        let metadata = Erc20::new(token)?.metadata(transport).await?;
        let bet_amount = metadata
            .parse(&self.bet_amount)
            .with_context(|| format!("Invalid bet amount: {}", self.bet_amount))?;

        println!(
            "🪙 Registering {} ({}) with stake {}",
            style(&metadata.symbol).cyan(),
            token,
            format_amount(&metadata, bet_amount)
        );
        player.add_token(token, bet_amount).await?;

        let contract = player.contract();
        success("Token registered");
        field(
            "Supported",
            contract.is_token_supported(transport, token).await?,
        );
        field(
            "Bet amount",
            format_amount(
                &metadata,
                contract.get_token_bet_amount(transport, token).await?,
            ),
        );
        Ok(())
    }
}

/// Approve and deposit tokens into the house bankroll
#[derive(Debug, Parser)]
pub struct FundToken {
    /// Token address (defaults to TOKEN_ADDRESS)
    #[arg(long)]
    pub token: Option<Address>,

    /// Amount in whole token units
    #[arg(long, default_value = "100")]
    pub amount: String,
}

impl FundToken {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let token = ctx.token_address(self.token)?;
        let player = ctx.player()?;
        let transport = player.transport();

        let metadata = Erc20::new(token)?.metadata(transport).await?;
        let amount = metadata
            .parse(&self.amount)
            .with_context(|| format!("Invalid amount: {}", self.amount))?;

        println!("💰 Funding house with {}", format_amount(&metadata, amount));
        let deposited = player.deposit_tokens(token, amount).await?;

        success(format!("Deposited {}", format_amount(&metadata, deposited)));
        field(
            "House balance",
            format_amount(
                &metadata,
                player
                    .contract()
                    .get_contract_token_balance(transport, token)
                    .await?,
            ),
        );
        Ok(())
    }
}
