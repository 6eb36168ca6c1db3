use std::ops::RangeInclusive;

use arrayvec::ArrayVec;

use crate::InvalidMoveError;

use super::{CELL_COUNT, COLS, Column, PlayerId, ROWS, Token, WIN_LENGTH};

/// Line directions as `(delta_row, delta_col)`: horizontal, vertical and both diagonals.
const LINE_DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Window directions for threat counting: every line direction in both signs.
const WINDOW_DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Rows of the win sector.
const WIN_SECTOR_ROWS: RangeInclusive<usize> = win_sector_span(ROWS);
/// Columns of the win sector.
const WIN_SECTOR_COLS: RangeInclusive<usize> = win_sector_span(COLS);

/// Span of one board dimension that every winning line along it must cross.
///
/// Any run of [`WIN_LENGTH`] cells along a dimension of length 6 covers index 2, and
/// along a dimension of length 7 covers index 3. A token whose row and column are
/// both outside the sector can never be part of a line that does not also contain
/// an in-sector token, so only in-sector tokens are scanned for wins.
const fn win_sector_span(len: usize) -> RangeInclusive<usize> {
    if len > 6 { 3..=len - 4 } else { 2..=2 }
}

fn in_win_sector(row: usize, col: usize) -> bool {
    WIN_SECTOR_ROWS.contains(&row) || WIN_SECTOR_COLS.contains(&col)
}

#[expect(clippy::cast_possible_truncation)]
fn cell_key(row: usize, col: usize) -> (u8, u8) {
    (row as u8, col as u8)
}

/// Whether the game is still running and, if not, how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum GameStatus {
    InProgress,
    Won(PlayerId),
    Draw,
}

impl GameStatus {
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    #[must_use]
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            GameStatus::Won(player) => Some(player),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }
}

/// Undo token for a successful [`Board::place`].
///
/// Must be passed back to [`Board::undo`] before any later placement is undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a placement must be undone with `Board::undo` or explicitly dropped"]
pub struct Placement {
    column: Column,
    row: u8,
    previous_status: GameStatus,
}

impl Placement {
    #[must_use]
    pub fn column(&self) -> Column {
        self.column
    }

    /// Row the token landed in, 0 is the bottom row.
    #[must_use]
    pub fn row(&self) -> usize {
        usize::from(self.row)
    }
}

/// Threat windows owned by one player. See [`Board::threats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreatCounts {
    /// Windows with three own tokens and one empty cell.
    pub major: usize,
    /// Windows with two own tokens and two empty cells.
    pub minor: usize,
}

/// The 6×7 grid with column heights, win-sector tracking and game status.
///
/// Win checks only visit tokens in the win sector (see [`win_sector_span`]); those
/// tokens are kept on a stack in placement order so that undoing a placement pops
/// exactly the entry it pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Token>; COLS]; ROWS],
    heights: [u8; COLS],
    height_sum: usize,
    win_sector: ArrayVec<(u8, u8), CELL_COUNT>,
    moves: ArrayVec<Column, CELL_COUNT>,
    status: GameStatus,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
            heights: [0; COLS],
            height_sum: 0,
            win_sector: ArrayVec::new(),
            moves: ArrayVec::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Clears the board back to the empty starting state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Drops a token for `player` into `column`.
    ///
    /// Fails without touching the board if the column is full. On success the token
    /// lands on top of the column and the game status is recomputed.
    pub fn place(&mut self, column: Column, player: PlayerId) -> Result<Placement, InvalidMoveError> {
        let col = column.index();
        let row = usize::from(self.heights[col]);
        if row >= ROWS {
            return Err(InvalidMoveError::ColumnFull { column });
        }

        let previous_status = self.status;
        let key = cell_key(row, col);
        self.cells[row][col] = Some(Token::new(player, row, col));
        if in_win_sector(row, col) {
            self.win_sector.push(key);
        }
        self.heights[col] += 1;
        self.height_sum += 1;
        self.moves.push(column);
        self.status = self.compute_status();

        Ok(Placement {
            column,
            row: key.0,
            previous_status,
        })
    }

    /// Raw 1-based form of [`Board::place`] for the input layer.
    ///
    /// Returns `false` for out-of-range numbers and full columns.
    pub fn try_place_number(&mut self, number: usize, player: PlayerId) -> bool {
        Column::new(number).is_some_and(|column| self.place(column, player).is_ok())
    }

    /// Reverts the most recent placement.
    ///
    /// Placements must be undone in reverse order of creation; debug builds assert this.
    pub fn undo(&mut self, placement: Placement) {
        debug_assert_eq!(
            self.moves.last(),
            Some(&placement.column),
            "placements must be undone in LIFO order"
        );
        debug_assert_eq!(
            usize::from(self.heights[placement.column.index()]),
            placement.row() + 1,
        );
        self.moves.pop();
        self.clear_top(placement.row(), placement.column.index());
        self.status = placement.previous_status;
    }

    /// Removes the top token of `column` and recomputes the game status.
    ///
    /// Undoes the most recent placement when no [`Placement`] is at hand, so
    /// `column` must be the last column played; debug builds assert this.
    /// Returns the removed token, or `None` if the column is empty.
    pub fn remove(&mut self, column: Column) -> Option<Token> {
        let col = column.index();
        let height = usize::from(self.heights[col]);
        if height == 0 {
            return None;
        }
        debug_assert_eq!(
            self.moves.last(),
            Some(&column),
            "only the most recent placement can be removed"
        );
        let row = height - 1;
        let token = self.cells[row][col];
        self.moves.pop();
        self.clear_top(row, col);
        self.status = self.compute_status();
        token
    }

    fn clear_top(&mut self, row: usize, col: usize) {
        self.cells[row][col] = None;
        if in_win_sector(row, col) {
            let key = cell_key(row, col);
            if let Some(pos) = self.win_sector.iter().rposition(|entry| *entry == key) {
                self.win_sector.remove(pos);
            }
        }
        self.heights[col] -= 1;
        self.height_sum -= 1;
    }

    fn compute_status(&self) -> GameStatus {
        let winner = self
            .win_sector
            .iter()
            .find_map(|&(row, col)| self.completed_line_owner(usize::from(row), usize::from(col)));
        match winner {
            Some(player) => GameStatus::Won(player),
            None if self.is_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }

    /// Owner of the token at `(row, col)` if it lies on a line of at least
    /// [`WIN_LENGTH`] same-owner tokens.
    fn completed_line_owner(&self, row: usize, col: usize) -> Option<PlayerId> {
        let owner = self.cells[row][col]?.owner();
        LINE_DIRECTIONS
            .iter()
            .any(|&(dr, dc)| {
                let forward = self.run_length(row, col, dr, dc, owner);
                let backward = self.run_length(row, col, -dr, -dc, owner);
                // the origin is counted by both runs
                forward + backward - 1 >= WIN_LENGTH
            })
            .then_some(owner)
    }

    /// Contiguous `owner` tokens starting at `(row, col)` and stepping by `(dr, dc)`.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, owner: PlayerId) -> usize {
        let mut count = 0;
        let mut pos = Some((row, col));
        while let Some((r, c)) = pos {
            if self.cells[r][c].map(Token::owner) != Some(owner) {
                break;
            }
            count += 1;
            pos = step(r, c, dr, dc);
        }
        count
    }

    /// Counts threat windows for `player`.
    ///
    /// For every token owned by `player` and each of the eight directions, the
    /// four-cell window starting at that token is inspected. Windows that leave the
    /// board or contain an opponent token are ignored. The same window is counted
    /// once per owned token inside it, so the numbers are a relative signal only.
    #[must_use]
    pub fn threats(&self, player: PlayerId) -> ThreatCounts {
        let mut counts = ThreatCounts::default();
        for token in self.tokens_of(player) {
            for &(dr, dc) in &WINDOW_DIRECTIONS {
                match self.window(token.row(), token.col(), dr, dc, player) {
                    Some((3, 1)) => counts.major += 1,
                    Some((2, 2)) => counts.minor += 1,
                    _ => {}
                }
            }
        }
        counts
    }

    #[must_use]
    pub fn major_threats(&self, player: PlayerId) -> usize {
        self.threats(player).major
    }

    #[must_use]
    pub fn minor_threats(&self, player: PlayerId) -> usize {
        self.threats(player).minor
    }

    /// `(own, empty)` cell counts of the window, `None` if it is blocked or off-board.
    fn window(&self, row: usize, col: usize, dr: isize, dc: isize, player: PlayerId) -> Option<(usize, usize)> {
        let mut own = 0;
        let mut empty = 0;
        let mut pos = (row, col);
        for i in 0..WIN_LENGTH {
            if i > 0 {
                pos = step(pos.0, pos.1, dr, dc)?;
            }
            match self.cells[pos.0][pos.1] {
                None => empty += 1,
                Some(token) if token.owner() == player => own += 1,
                Some(_) => return None,
            }
        }
        Some((own, empty))
    }

    /// Token at `(row, col)`, row 0 being the bottom row.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Token> {
        self.cells[row][col]
    }

    /// All tokens owned by `player`, bottom row first.
    pub fn tokens_of(&self, player: PlayerId) -> impl Iterator<Item = Token> + '_ {
        self.cells
            .iter()
            .flatten()
            .filter_map(|cell| *cell)
            .filter(move |token| token.owner() == player)
    }

    /// Number of tokens in `column`.
    #[must_use]
    pub fn height(&self, column: Column) -> usize {
        usize::from(self.heights[column.index()])
    }

    #[must_use]
    pub fn is_column_full(&self, column: Column) -> bool {
        self.height(column) >= ROWS
    }

    /// Columns that can still take a token, in left-to-right order.
    pub fn legal_columns(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL
            .into_iter()
            .filter(|column| !self.is_column_full(*column))
    }

    /// Number of tokens on the board.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.height_sum
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.height_sum == CELL_COUNT
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.status.winner()
    }

    /// Columns played so far, oldest first.
    #[must_use]
    pub fn moves(&self) -> &[Column] {
        &self.moves
    }

    /// In-sector token positions `(row, col)` in placement order.
    pub fn win_sector_tokens(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.win_sector
            .iter()
            .map(|&(row, col)| (usize::from(row), usize::from(col)))
    }

    /// Builds a board from ASCII art for testing.
    ///
    /// `X` is [`PlayerId::One`], `O` is [`PlayerId::Two`], `.` is empty. Rows are given
    /// top to bottom and must be exactly [`COLS`] cells wide; missing rows at the top
    /// are empty. Tokens are dropped bottom row first, so the art must obey gravity.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(lines.len() <= ROWS, "at most {ROWS} rows, got {}", lines.len());

        let mut board = Self::new();
        for (depth, line) in lines.iter().rev().enumerate() {
            let chars: Vec<char> = line
                .chars()
                .filter(|c| matches!(c, 'X' | 'O' | '.'))
                .collect();
            assert_eq!(chars.len(), COLS, "each row must have {COLS} cells, row {depth} from bottom");
            for (column, ch) in Column::ALL.into_iter().zip(chars) {
                let player = match ch {
                    'X' => PlayerId::One,
                    'O' => PlayerId::Two,
                    _ => continue,
                };
                assert_eq!(board.height(column), depth, "floating token in column {column}");
                let _ = board.place(column, player);
            }
        }
        board
    }
}

fn step(row: usize, col: usize, dr: isize, dc: isize) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    (r < ROWS && c < COLS).then_some((r, c))
}

#[cfg(test)]
mod tests {
    use std::iter;

    use super::*;

    fn col(n: usize) -> Column {
        Column::new(n).unwrap()
    }

    #[test]
    fn test_win_sector_constants() {
        assert_eq!(WIN_SECTOR_ROWS, 2..=2);
        assert_eq!(WIN_SECTOR_COLS, 3..=3);
        assert!(in_win_sector(2, 0));
        assert!(in_win_sector(0, 3));
        assert!(!in_win_sector(0, 0));
        assert!(!in_win_sector(5, 6));
    }

    #[test]
    fn test_every_line_crosses_win_sector() {
        for row in 0..ROWS {
            for c in 0..COLS {
                for &(dr, dc) in &LINE_DIRECTIONS {
                    let cells: Vec<(usize, usize)> =
                        iter::successors(Some((row, c)), |&(r, c)| step(r, c, dr, dc))
                            .take(WIN_LENGTH)
                            .collect();
                    if cells.len() == WIN_LENGTH {
                        assert!(
                            cells.iter().any(|&(r, c)| in_win_sector(r, c)),
                            "line {cells:?} misses the win sector"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_place_out_of_range_number() {
        let mut board = Board::new();
        assert!(!board.try_place_number(0, PlayerId::One));
        assert!(!board.try_place_number(8, PlayerId::One));
        assert_eq!(board, Board::new());
        assert!(board.try_place_number(1, PlayerId::One));
        assert_eq!(board.token_count(), 1);
    }

    #[test]
    fn test_place_full_column() {
        let mut board = Board::new();
        for i in 0..ROWS {
            let player = if i % 2 == 0 { PlayerId::One } else { PlayerId::Two };
            board.place(col(1), player).unwrap();
        }
        let before = board.clone();
        assert_eq!(
            board.place(col(1), PlayerId::One),
            Err(InvalidMoveError::ColumnFull { column: col(1) })
        );
        assert_eq!(board, before);
        assert!(board.is_column_full(col(1)));
        assert_eq!(board.legal_columns().count(), COLS - 1);
    }

    #[test]
    fn test_vertical_win_after_fourth_token() {
        let mut board = Board::new();
        for i in 0..3 {
            board.place(col(4), PlayerId::One).unwrap();
            assert!(!board.is_finished(), "finished after {} tokens", i + 1);
            assert_eq!(board.winner(), None);
        }
        board.place(col(4), PlayerId::One).unwrap();
        assert!(board.is_finished());
        assert_eq!(board.winner(), Some(PlayerId::One));
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new();
        for n in 1..=3 {
            board.place(col(n), PlayerId::Two).unwrap();
        }
        assert!(!board.is_finished());
        board.place(col(4), PlayerId::Two).unwrap();
        assert_eq!(board.status(), GameStatus::Won(PlayerId::Two));
    }

    #[test]
    fn test_diagonal_wins() {
        let rising = Board::from_ascii(
            "
            ...X...
            ..XO...
            .XOO...
            XOOX...
            ",
        );
        assert_eq!(rising.winner(), Some(PlayerId::One));

        let falling = Board::from_ascii(
            "
            ...O...
            ...XO..
            ...XXO.
            ...XXXO
            ",
        );
        assert_eq!(falling.winner(), Some(PlayerId::Two));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let board = Board::from_ascii(
            "
            .......
            OOO.XXX
            ",
        );
        assert_eq!(board.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_removing_any_winning_token_clears_win() {
        for removed in 1..=4 {
            let mut board = Board::new();
            for n in (1..=4).filter(|&n| n != removed).chain([removed]) {
                board.place(col(n), PlayerId::One).unwrap();
            }
            assert_eq!(board.winner(), Some(PlayerId::One));
            board.remove(col(removed)).unwrap();
            assert!(!board.is_finished());
            assert_eq!(board.winner(), None);
        }
    }

    #[test]
    fn test_place_then_undo_restores_board() {
        let sequence = [4, 4, 3, 5, 2, 6, 6, 1, 7, 3, 3, 5, 5, 2];
        let mut board = Board::new();
        for (i, &n) in sequence.iter().enumerate() {
            let player = if i % 2 == 0 { PlayerId::One } else { PlayerId::Two };
            for column in Column::ALL {
                let before = board.clone();
                let Ok(placement) = board.place(column, player) else {
                    continue;
                };
                board.undo(placement);
                assert_eq!(board, before, "undo of column {column} did not restore the board");
            }
            let _ = board.place(col(n), player);
        }
    }

    #[test]
    fn test_place_then_remove_restores_board() {
        let mut board = Board::from_ascii(
            "
            ...O...
            ..XX...
            .OXO...
            OXOXX..
            ",
        );
        for column in Column::ALL {
            let before = board.clone();
            board.place(column, PlayerId::Two).unwrap();
            board.remove(column).unwrap();
            assert_eq!(board, before);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "only the most recent placement can be removed")]
    fn test_remove_out_of_order_panics() {
        let mut board = Board::new();
        board.place(col(2), PlayerId::One).unwrap();
        board.place(col(5), PlayerId::Two).unwrap();
        board.remove(col(2));
    }

    #[test]
    fn test_remove_empty_column() {
        let mut board = Board::new();
        board.place(col(3), PlayerId::One).unwrap();
        assert_eq!(board.remove(col(6)), None);
        assert_eq!(board.remove(col(3)).map(Token::owner), Some(PlayerId::One));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_undo_restores_finished_state() {
        let mut board = Board::from_ascii(
            "
            .......
            X......
            X......
            X....OO
            ",
        );
        assert!(!board.is_finished());
        let placement = board.place(col(1), PlayerId::One).unwrap();
        assert!(board.is_finished());
        board.undo(placement);
        assert!(!board.is_finished());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = Board::from_ascii(
            "
            OXOXOXO
            OXOXOXO
            XOXOXOX
            XOXOXOX
            OXOXOXO
            OXOXOXO
            ",
        );
        assert!(board.is_full());
        assert!(board.is_finished());
        assert_eq!(board.winner(), None);
        assert_eq!(board.status(), GameStatus::Draw);
    }

    #[test]
    fn test_win_sector_tracks_in_sector_tokens() {
        let mut board = Board::new();
        let a = board.place(col(1), PlayerId::One).unwrap();
        assert_eq!(board.win_sector_tokens().count(), 0);
        let b = board.place(col(4), PlayerId::Two).unwrap();
        assert_eq!(board.win_sector_tokens().collect::<Vec<_>>(), vec![(0, 3)]);
        board.undo(b);
        board.undo(a);
        assert_eq!(board.win_sector_tokens().count(), 0);
    }

    #[test]
    fn test_threat_counts() {
        // rightwards from (0,0): XXX. is major, from (0,1): XX.. is minor;
        // every other window is off-board or holds a single token
        let board = Board::from_ascii("XXX....");
        let threats = board.threats(PlayerId::One);
        assert_eq!(threats.major, 1);
        assert_eq!(threats.minor, 1);
        assert_eq!(board.threats(PlayerId::Two), ThreatCounts::default());
    }

    #[test]
    fn test_threats_blocked_by_opponent() {
        let board = Board::from_ascii("XXXO...");
        assert_eq!(board.major_threats(PlayerId::One), 0);
        assert_eq!(board.minor_threats(PlayerId::One), 0);
    }

    #[test]
    fn test_reset() {
        let mut board = Board::from_ascii("XOXOXOX");
        board.reset();
        assert_eq!(board, Board::new());
        assert!(board.moves().is_empty());
    }
}
