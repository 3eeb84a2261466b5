//! Single-player game against the house.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use client_blockchain_core::SubmitError;
use client_blockchain_evm::{Choice, SingleOutcome};
use console::style;
use rps_client::GameError;

use super::context::{Context, Currency, field, format_amount, pick_move, success};

/// Exit status when the play is confirmed but its result has not arrived.
pub const PENDING_EXIT_CODE: u8 = 2;

/// Play one game against the house
#[derive(Debug, Parser)]
pub struct Play {
    /// Your move: rock, paper or scissors
    #[arg(long, value_name = "MOVE", required_unless_present = "random")]
    pub choice: Option<Choice>,

    /// Pick a random move
    #[arg(long, conflicts_with = "choice")]
    pub random: bool,
}

impl Play {
    pub async fn execute(self, ctx: &Context, currency: Currency) -> Result<ExitCode> {
        let player = ctx.player()?;
        let (stake, metadata) = currency.stake(ctx, &player).await?;
        let choice = pick_move(self.choice);

        println!(
            "🎲 Playing {} against the house for {}",
            style(choice).cyan(),
            format_amount(&metadata, stake.amount)
        );

        let game = player.start_single_game(choice, stake).await?;
        success("Game started");
        field("Request", game.request_id);
        field("Token game", game.stake.token.is_some());
        field("Transaction", game.tx_hash);

        let result = match player.await_single_result(&game).await {
            Ok(result) => result,
            Err(err) => match pending_after(&err) {
                Some(waited) => {
                    println!(
                        "{} No result after {:?}; the randomness callback is still pending. Check `rps stats` later.",
                        style("…").yellow(),
                        waited
                    );
                    return Ok(ExitCode::from(PENDING_EXIT_CODE));
                }
                None => return Err(err.into()),
            },
        };

        let verdict = match result.outcome {
            SingleOutcome::PlayerWon => style("You won").green().bold(),
            SingleOutcome::HouseWon => style("House won").red().bold(),
            SingleOutcome::Draw => style("Draw").yellow().bold(),
        };
        println!(
            "{verdict}: {} vs {}",
            result.player_choice, result.house_choice
        );
        field("Payout", format_amount(&metadata, result.payout));
        Ok(ExitCode::SUCCESS)
    }
}

/// How long the result was awaited, when `err` only means "not yet".
///
/// A play whose own transaction timed out is not pending: its outcome is
/// unknown and it stays an error.
fn pending_after(err: &GameError) -> Option<Duration> {
    match err {
        GameError::Submit(SubmitError::EventTimeout { waited }) => Some(*waited),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    #[test]
    fn only_a_missing_callback_counts_as_pending() {
        let waited = Duration::from_secs(300);
        let callback = GameError::Submit(SubmitError::EventTimeout { waited });
        let unconfirmed = GameError::Submit(SubmitError::Timeout {
            tx_hash: B256::ZERO,
            waited,
        });

        assert_eq!(pending_after(&callback), Some(waited));
        assert_eq!(pending_after(&unconfirmed), None);
        assert_eq!(pending_after(&GameError::InvalidChoice(Choice::None)), None);
    }
}
