pub use self::{board::*, column::*, player_id::*};

pub(crate) mod board;
pub(crate) mod column;
pub(crate) mod player_id;

/// Number of rows on the board. Row 0 is the bottom row.
pub const ROWS: usize = 6;
/// Number of columns on the board.
pub const COLS: usize = 7;
/// Tokens in a line needed to win.
pub const WIN_LENGTH: usize = 4;
/// Total number of cells.
pub const CELL_COUNT: usize = ROWS * COLS;
