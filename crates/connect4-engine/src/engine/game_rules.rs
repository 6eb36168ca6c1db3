use crate::{Board, Column, InvalidMoveError, Player, PlayerId};

/// Consecutive rejected moves after which a player is treated as stalled.
const MAX_CONSECUTIVE_REJECTIONS: usize = 64;

/// Turn order position in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// Result of a match from one seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum GameResult {
    Won,
    Lost,
    Drawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    winner: Option<Seat>,
    turns: usize,
}

impl MatchOutcome {
    #[must_use]
    pub const fn new(winner: Option<Seat>, turns: usize) -> Self {
        Self { winner, turns }
    }

    /// Seat of the winner, `None` for draws and stalled games.
    #[must_use]
    pub const fn winner(&self) -> Option<Seat> {
        self.winner
    }

    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Tokens on the board when the match ended.
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    #[must_use]
    pub fn result_for(&self, seat: Seat) -> GameResult {
        match self.winner {
            None => GameResult::Drawn,
            Some(winner) if winner == seat => GameResult::Won,
            Some(_) => GameResult::Lost,
        }
    }
}

/// Progress notifications emitted by [`play_match_observed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    TurnStarted {
        turn: usize,
        seat: Seat,
        player: PlayerId,
    },
    MoveRejected {
        seat: Seat,
        column: Column,
        error: InvalidMoveError,
    },
    Stalled {
        seat: Seat,
    },
    Finished(MatchOutcome),
}

/// Plays one game on `board` with `first` moving first.
///
/// The board is reset before the first move. See [`play_match_observed`].
pub fn play_match<A, B>(board: &mut Board, first: &mut A, second: &mut B) -> MatchOutcome
where
    A: Player + ?Sized,
    B: Player + ?Sized,
{
    play_match_observed(board, first, second, |_, _| {})
}

/// Plays one game on `board`, reporting every step to `observe`.
///
/// Players alternate starting with `first`. A rejected move (full column) is
/// reported and the same player is asked again. The game ends when the board is
/// won or full, or when a player has no move to offer, which counts as a draw.
pub fn play_match_observed<A, B, F>(
    board: &mut Board,
    first: &mut A,
    second: &mut B,
    mut observe: F,
) -> MatchOutcome
where
    A: Player + ?Sized,
    B: Player + ?Sized,
    F: FnMut(&Board, &TurnEvent),
{
    debug_assert_ne!(first.id(), second.id(), "players must use distinct tokens");
    board.reset();

    let mut turn = 1;
    let mut seat = Seat::First;
    let mut rejections = 0;
    while !board.is_finished() {
        let player = match seat {
            Seat::First => first.id(),
            Seat::Second => second.id(),
        };
        observe(board, &TurnEvent::TurnStarted { turn, seat, player });

        let chosen = match seat {
            Seat::First => first.choose_move(board),
            Seat::Second => second.choose_move(board),
        };
        let Some(column) = chosen else {
            log::debug!("{player} has no move on turn {turn}, ending as draw");
            observe(board, &TurnEvent::Stalled { seat });
            break;
        };

        match board.place(column, player) {
            Ok(_) => {
                turn += 1;
                seat = seat.other();
                rejections = 0;
            }
            Err(error) => {
                observe(board, &TurnEvent::MoveRejected { seat, column, error });
                rejections += 1;
                if rejections >= MAX_CONSECUTIVE_REJECTIONS {
                    log::warn!("{player} kept offering rejected moves, ending as draw");
                    observe(board, &TurnEvent::Stalled { seat });
                    break;
                }
            }
        }
    }

    let winner = board.winner().map(|owner| {
        if owner == first.id() {
            Seat::First
        } else {
            Seat::Second
        }
    });
    let outcome = MatchOutcome::new(winner, board.token_count());
    observe(board, &TurnEvent::Finished(outcome));
    outcome
}
