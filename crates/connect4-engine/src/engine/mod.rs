//! Turn orchestration on top of the [`Board`](crate::Board).
//!
//! - [`Player`] - anything that can pick a column for the current board
//! - [`play_match`] - runs one complete game between two players
//! - [`MatchOutcome`] - which seat won, if anyone
//!
//! The board is shared by both players; automated players search on it in place and
//! must leave it exactly as they found it before returning their choice.

pub use self::{game_rules::*, player::*};

mod game_rules;
mod player;
