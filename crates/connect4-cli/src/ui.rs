use std::{
    fmt,
    io::{self, BufRead, Write as _},
};

use connect4_engine::{Board, COLS, Column, Player, PlayerId, ROWS};

const SEPARATOR: &str = "-----------------------------";

/// Text rendering of a board, top row first.
///
/// Rows are numbered from the bottom, columns along the footer.
pub struct BoardView<'a>(pub &'a Board);

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            writeln!(f, "  {SEPARATOR}")?;
            write!(f, "{} ", row + 1)?;
            for col in 0..COLS {
                let glyph = self.0.cell(row, col).map_or(' ', |token| token.glyph());
                write!(f, "| {glyph} ")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "  {SEPARATOR}")?;
        write!(f, " ")?;
        for column in Column::ALL {
            write!(f, "   {column}")?;
        }
        Ok(())
    }
}

/// Line-oriented input a [`ConsolePlayer`] reads moves from.
pub trait LineInput {
    /// Reads one line into `buf`, returning the byte count (0 at end of input).
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl LineInput for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl LineInput for &[u8] {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Human player typing column numbers.
///
/// Unparsable lines are rejected here and asked again; full columns are left to
/// the match runner. End of input means the player has no move.
#[derive(Debug)]
pub struct ConsolePlayer<I = io::Stdin> {
    id: PlayerId,
    input: I,
}

impl ConsolePlayer {
    pub fn stdin(id: PlayerId) -> Self {
        Self::new(id, io::stdin())
    }
}

impl<I> ConsolePlayer<I>
where
    I: LineInput,
{
    pub fn new(id: PlayerId, input: I) -> Self {
        Self { id, input }
    }
}

impl<I> Player for ConsolePlayer<I>
where
    I: LineInput,
{
    fn id(&self) -> PlayerId {
        self.id
    }

    fn choose_move(&mut self, _board: &mut Board) -> Option<Column> {
        let mut line = String::new();
        loop {
            print!("Column (1-{COLS}): ");
            let _ = io::stdout().flush();

            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    log::error!("failed to read move for {}: {e}", self.id);
                    return None;
                }
            }
            match line.trim().parse::<Column>() {
                Ok(column) => return Some(column),
                Err(_) => println!("Invalid move - try again"),
            }
        }
    }
}
