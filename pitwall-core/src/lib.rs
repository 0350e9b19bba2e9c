//! # pitwall-core
//!
//! The pure model layer of the pitwall toolkit: a single elimination
//! bracket engine, the gear ratio math behind the ratio calculator, and
//! the vehicle setup sheet model. Nothing in this crate performs I/O;
//! persistence lives in `pitwall-api`.
//!
//! Important types:
//! - [`BracketEngine`]: the per-session aggregate holding the roster, the
//! generated bracket and the tournament metadata.
//! - [`Roster`]: the ordered list of [`Player`]s with their seeds.
//! - [`Bracket`]: the generated match tree, addressed by `(round, position)`.
//! - [`Drivetrain`]: gearing inputs and the derived drag performance figures.
//! - [`CarSetup`]: a named collection of part grades, gear ratios, shift
//! points and nitrous points.
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to the model types.

pub mod bracket;
pub mod gearing;
pub mod roster;
pub mod setup;

pub use bracket::{Bracket, BracketEngine, BracketMatch, BracketSize, MatchSlot};
pub use gearing::{Drivetrain, Gearbox};
pub use roster::{Player, PlayerId, Roster};
pub use setup::CarSetup;

use thiserror::Error;

use std::result;

/// A `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid bracket size: {0} is not within 2..=32")]
    InvalidSize(u16),
    #[error("not enough players: {0} on the roster, at least 2 required")]
    NotEnoughPlayers(usize),
    #[error("no such match: round {round}, position {position}")]
    UnknownMatch { round: u16, position: u16 },
    #[error("invalid winner: player {player} is not in the match at round {round}, position {position}")]
    InvalidWinner {
        player: PlayerId,
        round: u16,
        position: u16,
    },
    #[error("no bracket generated")]
    NoBracket,
    #[error("invalid number of matches: expected {expected}, found {found}")]
    InvalidNumberOfMatches { expected: usize, found: usize },
}
