//! Minimax move selection with alpha-beta pruning.
//!
//! [`AiPlayer`] searches on the caller's [`Board`] directly. Every provisional
//! placement is reverted with [`Board::undo`] before the next sibling is tried, so
//! the board is unchanged when a search returns.
//!
//! Columns are always tried in [`Column::SEARCH_ORDER`] (centre out), both at the
//! root and inside the tree.
//!
//! # Tie-break
//!
//! At the root, a column with a strictly better score replaces the current best.
//! On an exact tie the new column wins with probability `1/k`, where `k` starts at
//! 2 and grows by one only when a tied column is taken. The choice is therefore
//! not uniform: among seven equal columns the last one in search order is picked
//! about 27% of the time and the first one under 2%.

use std::sync::Arc;

use connect4_engine::{Board, Column, Player, PlayerId};
use rand::Rng;

use crate::{evaluation, genome::Genome};

/// Plies searched below each root move unless configured otherwise.
pub const DEFAULT_SEARCH_DEPTH: u32 = 8;

#[derive(Debug, Clone)]
pub struct AiPlayer {
    id: PlayerId,
    genome: Arc<Genome>,
    depth: u32,
}

impl AiPlayer {
    #[must_use]
    pub fn new(id: PlayerId, genome: Arc<Genome>) -> Self {
        Self {
            id,
            genome,
            depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn genome(&self) -> &Arc<Genome> {
        &self.genome
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Static score of `board` from this player's side.
    #[must_use]
    pub fn evaluate(&self, board: &Board) -> i32 {
        evaluation::evaluate(&self.genome, board, self.id)
    }

    /// Depth-limited minimax with alpha-beta pruning.
    ///
    /// Leaves (depth exhausted or game over) score `evaluate × (depth + 1)`. When
    /// `maximizing` this player moves next, otherwise the opponent does.
    pub fn minimax(
        &self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        if depth == 0 || board.is_finished() {
            let multiplier = i32::try_from(depth).map_or(i32::MAX, |d| d.saturating_add(1));
            return self.evaluate(board).saturating_mul(multiplier);
        }

        let mover = if maximizing { self.id } else { self.id.opponent() };
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for column in Column::SEARCH_ORDER {
            let Ok(placement) = board.place(column, mover) else {
                continue;
            };
            let score = self.minimax(board, depth - 1, !maximizing, alpha, beta);
            board.undo(placement);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }

    /// Picks a column for this player, or `None` if every column is full.
    pub fn select_move<R>(&self, board: &mut Board, rng: &mut R) -> Option<Column>
    where
        R: Rng + ?Sized,
    {
        let mut best: Option<(Column, i32)> = None;
        let mut tie_bound = 2;
        for column in Column::SEARCH_ORDER {
            let Ok(placement) = board.place(column, self.id) else {
                continue;
            };
            let score = self.minimax(board, self.depth, false, i32::MIN, i32::MAX);
            board.undo(placement);

            match best {
                Some((_, best_score)) if score < best_score => {}
                Some((_, best_score)) if score == best_score => {
                    if rng.random_ratio(1, tie_bound) {
                        best = Some((column, score));
                        tie_bound += 1;
                    }
                }
                _ => best = Some((column, score)),
            }
        }
        if let Some((column, score)) = best {
            log::trace!("{} selects column {column} (score {score})", self.id);
        }
        best.map(|(column, _)| column)
    }
}

impl Player for AiPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn choose_move(&mut self, board: &mut Board) -> Option<Column> {
        self.select_move(board, &mut rand::rng())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::genome::GENOME_LEN;

    fn reference_ai(id: PlayerId, depth: u32) -> AiPlayer {
        AiPlayer::new(id, Arc::new(Genome::reference())).with_depth(depth)
    }

    #[test]
    fn test_depth_zero_is_plain_evaluation() {
        let ai = reference_ai(PlayerId::One, 0);
        let boards = [
            Board::new(),
            Board::from_ascii("XXO.O.."),
            Board::from_ascii(
                "
                X......
                X......
                X..O...
                X..OO..
                ",
            ),
        ];
        for mut board in boards {
            let expected = ai.evaluate(&board);
            assert_eq!(ai.minimax(&mut board, 0, true, i32::MIN, i32::MAX), expected);
            assert_eq!(ai.minimax(&mut board, 0, false, i32::MIN, i32::MAX), expected);
        }
    }

    #[test]
    fn test_finished_board_scales_by_remaining_depth() {
        let ai = reference_ai(PlayerId::Two, 0);
        let mut board = Board::from_ascii("OOOO.XX");
        let expected = ai.evaluate(&board) * 4;
        assert_eq!(ai.minimax(&mut board, 3, true, i32::MIN, i32::MAX), expected);
    }

    #[test]
    fn test_takes_immediate_win() {
        let ai = reference_ai(PlayerId::One, 2);
        let mut board = Board::from_ascii("XXX.OO.");
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert_eq!(ai.select_move(&mut board, &mut rng), Column::new(4));
    }

    #[test]
    fn test_blocks_opponent_win() {
        let ai = reference_ai(PlayerId::One, 2);
        let mut board = Board::from_ascii("OOO.XX.");
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        assert_eq!(ai.select_move(&mut board, &mut rng), Column::new(4));
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let ai = reference_ai(PlayerId::Two, 3);
        let mut board = Board::from_ascii(
            "
            ...O...
            ..XX...
            .OXO...
            OXOXX..
            ",
        );
        let before = board.clone();
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let column = ai.select_move(&mut board, &mut rng);
        assert!(column.is_some());
        assert_eq!(board, before);
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut ai = reference_ai(PlayerId::One, 2);
        let mut board = Board::from_ascii(
            "
            OXOXOXO
            OXOXOXO
            XOXOXOX
            XOXOXOX
            OXOXOXO
            OXOXOXO
            ",
        );
        assert_eq!(ai.choose_move(&mut board), None);
    }

    #[test]
    fn test_ties_are_broken_randomly() {
        let ai = AiPlayer::new(PlayerId::One, Arc::new(Genome::from_genes([0; GENOME_LEN])))
            .with_depth(0);
        let mut board = Board::new();
        let chosen: BTreeSet<Column> = (0..64)
            .map(|seed| {
                let mut rng = Pcg64Mcg::seed_from_u64(seed);
                ai.select_move(&mut board, &mut rng).unwrap()
            })
            .collect();
        assert!(chosen.len() > 1, "always picked {chosen:?}");
    }

    #[test]
    fn test_tie_bound_grows_only_on_replacement() {
        let ai = AiPlayer::new(PlayerId::One, Arc::new(Genome::from_genes([0; GENOME_LEN])))
            .with_depth(0);
        let mut board = Board::new();
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let samples = 20_000;
        let mut counts = [0_u32; 7];
        for _ in 0..samples {
            let column = ai.select_move(&mut board, &mut rng).unwrap();
            let rank = Column::SEARCH_ORDER
                .iter()
                .position(|c| *c == column)
                .unwrap();
            counts[rank] += 1;
        }
        let share = |rank: usize| f64::from(counts[rank]) / f64::from(samples);
        // first kept only if all six later ties are refused at 1/2: 1/64
        assert!(share(0) < 0.04, "first column share {}", share(0));
        assert!(share(6) > 0.22, "last column share {}", share(6));
        assert!(share(6) > share(0) * 5.0);
    }

    #[test]
    fn test_skips_full_columns() {
        let ai = reference_ai(PlayerId::One, 1);
        let mut board = Board::from_ascii(
            "
            ...O...
            ...X...
            ...O...
            ...X...
            ...O...
            ...X...
            ",
        );
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        let column = ai.select_move(&mut board, &mut rng).unwrap();
        assert_ne!(column.number(), 4);
    }
}
