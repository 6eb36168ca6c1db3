//! Board model and match runner for six-by-seven four-in-a-row.
//!
//! The crate is split the same way the rest of the workspace is consumed:
//!
//! - [`core`] - grid state: [`Board`], [`Column`], [`PlayerId`], win detection and
//!   threat counting used by the evaluator
//! - [`engine`] - turn orchestration: the [`Player`] capability and
//!   [`play_match`] which runs one game between two players on a shared board
//!
//! # Undo Contract
//!
//! Search code mutates a single [`Board`] in place instead of copying it. Every
//! successful [`Board::place`] returns a [`Placement`] token which must be handed back
//! to [`Board::undo`] in strict last-in-first-out order. Debug builds assert the
//! order; release builds trust the caller.
//!
//! ```
//! use connect4_engine::{Board, Column, PlayerId};
//!
//! let mut board = Board::new();
//! let column = Column::new(4).unwrap();
//! let placement = board.place(column, PlayerId::One).unwrap();
//! assert_eq!(board.height(column), 1);
//! board.undo(placement);
//! assert_eq!(board.height(column), 0);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A move the board refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidMoveError {
    #[display("column {column} is full")]
    ColumnFull { column: Column },
}
