//! Deploy the RockPaperScissors contract.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use client_blockchain_core::BlockchainTransport;
use client_blockchain_evm::{ContractArtifacts, DeploymentInfo, RockPaperScissors, TokenMetadata};
use console::style;

use super::context::{Context, NATIVE_SYMBOL, field, format_amount, success};

/// Deploy RockPaperScissors from compiled artifacts
#[derive(Debug, Parser)]
pub struct Deploy {
    /// ABI artifact (defaults to RPS_ABI_PATH)
    #[arg(long)]
    pub abi: Option<PathBuf>,

    /// Bytecode artifact (defaults to RPS_BIN_PATH)
    #[arg(long)]
    pub bin: Option<PathBuf>,

    /// Do not write CONTRACT_ADDRESS to .env
    #[arg(long)]
    pub no_save: bool,
}

impl Deploy {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let config = &ctx.config;

        // 1. Validate everything the deployment needs before touching the network
        let house_edge = config.require_house_edge_bps()?;
        let subscription_id = config.require_vrf_subscription_id()?;
        let abi_path = self.abi.unwrap_or_else(|| config.abi_path.clone());
        let bin_path = self.bin.unwrap_or_else(|| config.bin_path.clone());
        let artifacts = ContractArtifacts::load(&abi_path, &bin_path)?;
        let submitter = ctx.submitter()?;

        println!(
            "🚀 Deploying RockPaperScissors to {} from {}",
            style(&config.network).cyan(),
            style(submitter.transport().sender()).cyan()
        );
        field(
            "Bet amount",
            format_amount(&TokenMetadata::native(NATIVE_SYMBOL), config.bet_amount),
        );
        field("House edge", format!("{house_edge} bps"));
        field("Subscription", subscription_id);

        // 2. Submit the creation transaction and wait for confirmations
        let (game, receipt) = RockPaperScissors::deploy(
            &submitter,
            artifacts,
            config.bet_amount,
            house_edge,
            subscription_id,
        )
        .await
        .context("Deployment failed")?;

        success(format!(
            "RockPaperScissors deployed at {}",
            style(game.address()).green()
        ));
        field("Transaction", receipt.tx_hash);
        field("Block", receipt.block_number);

        // 3. Record the deployment for later commands
        if !self.no_save {
            DeploymentInfo::new(config.network.clone(), game.address())
                .with_transaction(receipt.tx_hash, receipt.block_number)
                .save_to_env()?;
            success("CONTRACT_ADDRESS saved to .env");
        }

        Ok(())
    }
}
