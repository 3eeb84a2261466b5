//! Two-signer multiplayer game.

use anyhow::{Context as _, Result};
use clap::Parser;
use client_blockchain_evm::Choice;
use console::style;
use rps_client::{Resolution, SessionStatus};

use super::context::{Context, Currency, field, format_amount, pick_move, success};

/// Play a full multiplayer game between PRIVATE_KEY and PLAYER2_PRIVATE_KEY
#[derive(Debug, Parser)]
pub struct Multiplayer {
    /// First player's move
    #[arg(long, value_name = "MOVE", required_unless_present = "random")]
    pub p1: Option<Choice>,

    /// Second player's move
    #[arg(long, value_name = "MOVE", required_unless_present = "random")]
    pub p2: Option<Choice>,

    /// Pick random moves for both players
    #[arg(long, conflicts_with_all = ["p1", "p2"])]
    pub random: bool,
}

impl Multiplayer {
    pub async fn execute(self, ctx: &Context, currency: Currency) -> Result<()> {
        let player1 = ctx.player()?;
        let player2 = ctx.player2(player1.contract())?;
        let (stake, metadata) = currency.stake(ctx, &player1).await?;

        println!(
            "⚔️  {} vs {} for {}",
            style(player1.address()).cyan(),
            style(player2.address()).cyan(),
            format_amount(&metadata, stake.amount)
        );

        // 1. Player one opens the game; its id comes from the creation event
        let mut session = player1
            .create_game(stake)
            .await
            .context("Failed to create game")?;
        success(format!("Game {} created", session.game_id));

        // 2. Player two joins with the same stake
        player2
            .join_game(&mut session, stake)
            .await
            .context("Failed to join game")?;
        success(format!("Player two joined game {}", session.game_id));

        // 3. Each player moves through their own copy of the session
        let (move1, move2) = (pick_move(self.p1), pick_move(self.p2));
        field("Player one", move1);
        field("Player two", move2);
        let mut session2 = session.clone();
        let (first, second) = tokio::join!(
            player1.submit_move(&mut session, move1),
            player2.submit_move(&mut session2, move2),
        );
        first.context("Player one's move failed")?;
        second.context("Player two's move failed")?;

        // The first move to land was confirmed before the game settled
        let status = player1.refresh_session(&mut session).await?;

        match status {
            SessionStatus::Resolved(Resolution::Winner { winner, payout }) => {
                let label = if winner == player1.address() {
                    "Player one"
                } else {
                    "Player two"
                };
                println!("🏆 {} wins", style(label).green().bold());
                field("Winner", winner);
                field("Payout", format_amount(&metadata, payout));
            }
            SessionStatus::Resolved(Resolution::Draw) => {
                println!("🤝 {} - both stakes refunded", style("Draw").yellow().bold());
            }
            other => {
                println!("{} Game not resolved yet: {other:?}", style("…").yellow());
            }
        }
        Ok(())
    }
}
