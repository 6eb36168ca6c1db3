use crate::{Board, Column, PlayerId};

/// A participant that chooses moves.
///
/// Implementations may mutate `board` while deciding (search) but must restore it
/// before returning. Returning `None` means the player has no move; the match treats
/// that as a stalled game and ends it as a draw.
pub trait Player {
    /// Identity of the tokens this player drops.
    fn id(&self) -> PlayerId;

    /// Picks the column to play on `board`.
    fn choose_move(&mut self, board: &mut Board) -> Option<Column>;
}

impl<P> Player for &mut P
where
    P: Player + ?Sized,
{
    fn id(&self) -> PlayerId {
        (**self).id()
    }

    fn choose_move(&mut self, board: &mut Board) -> Option<Column> {
        (**self).choose_move(board)
    }
}

impl<P> Player for Box<P>
where
    P: Player + ?Sized,
{
    fn id(&self) -> PlayerId {
        (**self).id()
    }

    fn choose_move(&mut self, board: &mut Board) -> Option<Column> {
        (**self).choose_move(board)
    }
}
