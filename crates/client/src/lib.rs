//! RockPaperScissors game orchestration.
//!
//! # Architecture
//!
//! ```text
//! rps (CLI commands)
//!   └─→ Player (one signer + shared contract binding)
//!         ├─→ session: multiplayer GameSession, driven by decoded events
//!         ├─→ single:  play against the house, await the randomness callback
//!         ├─→ token:   balance check + exact approval before token stakes
//!         └─→ bankroll: house deposits and token registration
//! ```
//!
//! A failed or timed-out transaction is never resubmitted here. Errors carry
//! the transaction hash; callers re-read contract state before acting again.

mod bankroll;
pub mod error;
pub mod logging;
pub mod player;
pub mod session;
pub mod single;
pub mod stats;
pub mod token;

pub use error::{GameError, Result};
pub use player::{DEFAULT_RESULT_TIMEOUT, Player};
pub use session::{GameSession, PLAYERS_PER_GAME, Resolution, SessionStatus, play_round};
pub use single::{SingleGame, SingleResult};
pub use stats::{PlayerStats, TokenInfo};
pub use token::TokenGate;
