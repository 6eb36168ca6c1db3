//! Genome-weighted board evaluation and minimax search.
//!
//! This crate turns a [`Genome`](genome::Genome) into a playing strength:
//!
//! 1. **Genome** ([`genome`]) - a fixed 51-byte vector holding eight term weights, a
//!    positional score table and a win bonus. The byte layout is also the persisted
//!    format, so it must never be reordered.
//! 2. **Evaluation** ([`evaluation`]) - scores a board for one side as a linear
//!    combination of heuristic terms, weighted by the genome.
//! 3. **Search** ([`search`]) - [`AiPlayer`](search::AiPlayer) runs a depth-limited
//!    minimax with alpha-beta pruning over a single shared
//!    [`Board`](connect4_engine::Board), using place/undo instead of copying.
//! 4. **Session** ([`session`]) - plays a complete match between two genomes, the
//!    unit of work for fitness evaluation and benchmarking.
//!
//! # Architecture
//!
//! ```text
//! Session (one match between two genomes)
//!     ↓ uses
//! AiPlayer (choose a column by minimax)
//!     ↓ uses
//! Evaluation (score a leaf position)
//!     ↓ weighted by
//! Genome
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use connect4_engine::{Board, Player, PlayerId};
//! use connect4_evaluator::{genome::Genome, search::AiPlayer};
//!
//! let mut board = Board::new();
//! let mut ai = AiPlayer::new(PlayerId::One, Arc::new(Genome::reference())).with_depth(2);
//! let column = ai.choose_move(&mut board).unwrap();
//! assert!(board.place(column, PlayerId::One).is_ok());
//! ```
//!
//! # Known Quirks
//!
//! - Both sides of a position are scored with the acting player's genome. The
//!   opponent's own weights never enter the evaluation.
//! - Leaf scores are multiplied by `depth + 1`, which makes near wins and losses
//!   weigh more than distant ones of the same sign.

pub mod evaluation;
pub mod genome;
pub mod search;
pub mod session;
