//! Command implementations for the `rps` binary.
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod bankroll;
mod context;
mod deploy;
mod multiplayer;
mod play;
mod stats;

pub use bankroll::{Fund, FundToken, SetupToken};
pub use context::{Context, Currency};
pub use deploy::Deploy;
pub use multiplayer::Multiplayer;
pub use play::Play;
pub use stats::{Stats, TokenInfoCmd};
