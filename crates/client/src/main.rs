//! `rps`: deploy, fund and play an on-chain RockPaperScissors contract.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use commands::{
    Context, Currency, Deploy, Fund, FundToken, Multiplayer, Play, SetupToken, Stats, TokenInfoCmd,
};
use rps_client::logging::setup_logging;

/// RockPaperScissors contract client
#[derive(Parser)]
#[command(name = "rps")]
#[command(about = "Deploy, fund and play an on-chain RockPaperScissors contract", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Deploy the contract and save its address to .env
    Deploy(Deploy),

    /// Deposit native currency into the house bankroll
    Fund(Fund),

    /// Register TOKEN_ADDRESS for token games (owner only)
    SetupToken(SetupToken),

    /// Deposit tokens into the house bankroll
    FundToken(FundToken),

    /// Play against the house with native currency.
    /// Exits with status 2 if the result is still pending
    Play(Play),

    /// Play against the house with TOKEN_ADDRESS.
    /// Exits with status 2 if the result is still pending
    PlayToken(Play),

    /// Two-player game with native currency
    Multiplayer(Multiplayer),

    /// Two-player game with TOKEN_ADDRESS
    MultiplayerToken(Multiplayer),

    /// Show player statistics
    Stats(Stats),

    /// Show token game configuration
    TokenInfo(TokenInfoCmd),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let (_guard, log_file) = setup_logging()?;
    tracing::info!(log_file = %log_file.display(), "rps starting");

    // Configuration errors surface here, before any network I/O
    let ctx = Context::load()?;

    match cli.command {
        Command::Deploy(cmd) => cmd.execute(&ctx).await?,
        Command::Fund(cmd) => cmd.execute(&ctx).await?,
        Command::SetupToken(cmd) => cmd.execute(&ctx).await?,
        Command::FundToken(cmd) => cmd.execute(&ctx).await?,
        Command::Play(cmd) => return cmd.execute(&ctx, Currency::Native).await,
        Command::PlayToken(cmd) => return cmd.execute(&ctx, Currency::Token).await,
        Command::Multiplayer(cmd) => cmd.execute(&ctx, Currency::Native).await?,
        Command::MultiplayerToken(cmd) => cmd.execute(&ctx, Currency::Token).await?,
        Command::Stats(cmd) => cmd.execute(&ctx).await?,
        Command::TokenInfo(cmd) => cmd.execute(&ctx).await?,
    }
    Ok(ExitCode::SUCCESS)
}
