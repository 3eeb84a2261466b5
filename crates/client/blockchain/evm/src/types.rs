//! Game values shared by the contract binding and its events.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A move as encoded by the contract (`uint8`).
///
/// `None` is the contract's "no move yet" value and is never submitted.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::FromRepr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum Choice {
    #[default]
    None = 0,
    Rock = 1,
    Paper = 2,
    Scissors = 3,
}

impl Choice {
    /// The three playable moves.
    pub const PLAYABLE: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_playable(self) -> bool {
        self != Choice::None
    }

    /// Whether `self` wins against `other`.
    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Paper, Choice::Rock)
                | (Choice::Scissors, Choice::Paper)
        )
    }
}

/// Outcome of a single-player game, from the player's point of view.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::FromRepr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum SingleOutcome {
    Draw = 0,
    PlayerWon = 1,
    HouseWon = 2,
}

/// Stake of one game: an amount of native currency or of an ERC-20 token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub amount: U256,

    /// `None` for native currency
    pub token: Option<Address>,
}

impl Stake {
    pub fn native(amount: U256) -> Self {
        Self {
            amount,
            token: None,
        }
    }

    pub fn token(token: Address, amount: U256) -> Self {
        Self {
            amount,
            token: Some(token),
        }
    }

    pub fn is_native(&self) -> bool {
        self.token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parses_case_insensitively() {
        assert_eq!("Rock".parse::<Choice>().unwrap(), Choice::Rock);
        assert_eq!("SCISSORS".parse::<Choice>().unwrap(), Choice::Scissors);
        assert!("lizard".parse::<Choice>().is_err());
    }

    #[test]
    fn choice_matches_contract_encoding() {
        assert_eq!(Choice::from_repr(1), Some(Choice::Rock));
        assert_eq!(Choice::Scissors.as_u8(), 3);
        assert_eq!(Choice::from_repr(4), None);
    }

    #[test]
    fn each_move_beats_exactly_one_other() {
        for choice in Choice::PLAYABLE {
            let wins = Choice::PLAYABLE.iter().filter(|&&o| choice.beats(o)).count();
            assert_eq!(wins, 1, "{choice}");
            assert!(!choice.beats(choice));
        }
    }
}
