//! Player statistics and token information.

use alloy_primitives::Address;
use anyhow::Result;
use clap::Parser;
use client_blockchain_evm::{Erc20, TokenMetadata};
use console::style;
use rps_client::{PlayerStats, TokenInfo};
use serde_json::json;

use super::context::{Context, NATIVE_SYMBOL, field, format_amount};

/// Show win/loss record and profits
#[derive(Debug, Parser)]
pub struct Stats {
    /// Players to query (defaults to the configured signers)
    pub players: Vec<Address>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Stats {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let player = ctx.player()?;
        let transport = player.transport();
        let contract = player.contract();

        let players = if self.players.is_empty() {
            let mut players = vec![player.address()];
            if ctx.config.player2_private_key.is_some() {
                players.push(ctx.player2(contract)?.address());
            }
            players
        } else {
            self.players
        };

        let native = TokenMetadata::native(NATIVE_SYMBOL);
        let mut reports = Vec::with_capacity(players.len());
        for address in players {
            let stats = PlayerStats::fetch(contract, transport, address).await?;

            let mut tokens = Vec::with_capacity(stats.token_profit.len());
            for (token, profit) in &stats.token_profit {
                tokens.push((Erc20::new(*token)?.metadata(transport).await?, *profit));
            }
            reports.push((stats, tokens));
        }

        if self.json {
            let value: Vec<_> = reports
                .iter()
                .map(|(stats, tokens)| {
                    json!({
                        "player": stats.player,
                        "wins": stats.wins.to_string(),
                        "losses": stats.losses.to_string(),
                        "profit": native.format_signed(stats.native_profit),
                        "token_profits": tokens
                            .iter()
                            .map(|(metadata, profit)| json!({
                                "token": metadata.address,
                                "symbol": metadata.symbol,
                                "profit": metadata.format_signed(*profit),
                            }))
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        for (stats, tokens) in reports {
            println!("📊 {}", style(stats.player).cyan());
            field("Wins", stats.wins);
            field("Losses", stats.losses);
            field(
                "Profit",
                format!("{} {}", native.format_signed(stats.native_profit), native.symbol),
            );
            for (metadata, profit) in tokens {
                field(
                    &format!("{} profit", metadata.symbol),
                    format!("{} {}", metadata.format_signed(profit), metadata.symbol),
                );
            }
        }
        Ok(())
    }
}

/// Show token game configuration and house balances
#[derive(Debug, Parser)]
pub struct TokenInfoCmd {
    /// Token address (defaults to TOKEN_ADDRESS)
    #[arg(long)]
    pub token: Option<Address>,
}

impl TokenInfoCmd {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let token = ctx.token_address(self.token)?;
        let player = ctx.player()?;
        let transport = player.transport();
        let contract = player.contract();

        let info = TokenInfo::fetch(contract, transport, token).await?;
        println!(
            "🪙 {} ({} decimals) at {}",
            style(&info.metadata.symbol).cyan(),
            info.metadata.decimals,
            token
        );
        field("Supported", info.supported);
        field("Bet amount", format_amount(&info.metadata, info.bet_amount));
        field(
            "House balance",
            format_amount(&info.metadata, info.contract_balance),
        );

        let supported = contract.get_supported_tokens(transport).await?;
        println!("{} ({})", style("Supported tokens").bold(), supported.len());
        for address in supported {
            println!("  • {address}");
        }
        Ok(())
    }
}
